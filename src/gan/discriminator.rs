//! CNN + highway discriminator: scores sequences as real or fake

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::MaliGanConfig;
use super::init::{constant, normal, xavier};
use super::{Parametrized, SequenceBatch};
use crate::autograd::{
    add, add_row_broadcast, add_scalar, concat_columns, dropout, embedding, matmul,
    max_pool_groups, mul, relu, scale, sigmoid, Tensor,
};
use crate::error::{Error, Result};

/// Column of the real class in scorer output
pub const REAL_CLASS: usize = 0;
/// Column of the fake class in scorer output
pub const FAKE_CLASS: usize = 1;

/// Maps a batch of sequences to `(batch_size, 2)` real/fake logits
///
/// Column [`REAL_CLASS`] is the real logit and [`FAKE_CLASS`] the fake one.
/// Scoring must not change the scorer: repeated calls on the same batch are
/// independent evaluations.
pub trait SequenceScorer {
    fn score(&self, batch: &SequenceBatch) -> Result<Array2<f32>>;
}

/// One valid 1-D convolution over token windows
struct Conv {
    width: usize,
    filters: usize,
    weight: Tensor, // (width · embedding) × filters
    bias: Tensor,
}

/// Embedding → convolutions with max-pool over time → highway → 2 logits
pub struct Discriminator {
    vocab_size: usize,
    embedding_size: usize,
    dropout_rate: f32,
    embedding: Tensor,
    convs: Vec<Conv>,
    highway_w: Tensor,
    highway_b: Tensor,
    out_w: Tensor,
    out_b: Tensor,
}

impl Discriminator {
    /// Create a discriminator with random initialization
    pub fn new(config: &MaliGanConfig) -> Result<Self> {
        Self::from_rng(config, &mut StdRng::from_os_rng())
    }

    /// Create a discriminator with a seed for reproducibility
    pub fn with_seed(config: &MaliGanConfig, seed: u64) -> Result<Self> {
        Self::from_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    pub fn from_rng<R: Rng + ?Sized>(config: &MaliGanConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let e = config.embedding_size;
        let features: usize = config.n_filters.iter().sum();

        let convs = config
            .n_filters
            .iter()
            .zip(&config.filters_size)
            .map(|(&filters, &width)| Conv {
                width,
                filters,
                weight: xavier(width * e, filters, rng),
                bias: constant(filters, 0.0),
            })
            .collect();

        Ok(Self {
            vocab_size: config.vocab_size,
            embedding_size: e,
            dropout_rate: config.dropout_rate,
            embedding: normal(config.vocab_size * e, (1.0 / e as f64).sqrt(), rng),
            convs,
            highway_w: xavier(features, features, rng),
            highway_b: constant(features, 0.0),
            out_w: xavier(features, 2, rng),
            out_b: constant(2, 0.0),
        })
    }

    /// Width of the pooled feature vector
    pub fn num_features(&self) -> usize {
        self.convs.iter().map(|c| c.filters).sum()
    }

    /// Logits without dropout
    pub fn forward(&self, x: &SequenceBatch) -> Result<Tensor> {
        self.forward_impl(x, None)
    }

    /// Logits with dropout before the output layer, for training updates
    pub fn forward_train(&self, x: &SequenceBatch, rng: &mut StdRng) -> Result<Tensor> {
        self.forward_impl(x, Some(rng))
    }

    fn forward_impl(&self, x: &SequenceBatch, rng: Option<&mut StdRng>) -> Result<Tensor> {
        let (rows, length) = x.shape();
        if x.vocab_size() > self.vocab_size {
            return Err(Error::ShapeMismatch {
                context: "discriminator vocabulary".into(),
                expected: vec![self.vocab_size],
                actual: vec![x.vocab_size()],
            });
        }
        let e = self.embedding_size;

        let mut pooled = Vec::with_capacity(self.convs.len());
        for conv in &self.convs {
            if conv.width > length {
                return Err(Error::ShapeMismatch {
                    context: format!("sequence shorter than filter width {}", conv.width),
                    expected: vec![conv.width],
                    actual: vec![length],
                });
            }
            let positions = length - conv.width + 1;

            // Consecutive windows of `width` tokens, one patch per output row
            let mut ids = Vec::with_capacity(rows * positions * conv.width);
            for b in 0..rows {
                let row = x.row(b);
                for p in 0..positions {
                    ids.extend(row.iter().skip(p).take(conv.width));
                }
            }
            let patches = embedding(&self.embedding, &ids, e);
            let k = conv.width * e;
            let activations = relu(&add_row_broadcast(
                &matmul(&patches, &conv.weight, rows * positions, k, conv.filters),
                &conv.bias,
                rows * positions,
                conv.filters,
            ));
            pooled.push(max_pool_groups(&activations, rows, positions, conv.filters));
        }

        let widths: Vec<usize> = self.convs.iter().map(|c| c.filters).collect();
        let parts: Vec<&Tensor> = pooled.iter().collect();
        let features = self.num_features();
        let h = concat_columns(&parts, &widths, rows);

        // Highway: t·relu(hw) + (1 − t)·h with t = σ(hw)
        let hw = add_row_broadcast(
            &matmul(&h, &self.highway_w, rows, features, features),
            &self.highway_b,
            rows,
            features,
        );
        let gate = sigmoid(&hw);
        let carry = add_scalar(&scale(&gate, -1.0), 1.0);
        let mut y = add(&mul(&gate, &relu(&hw)), &mul(&carry, &h));

        if let Some(rng) = rng {
            y = dropout(&y, self.dropout_rate, rng);
        }

        Ok(add_row_broadcast(
            &matmul(&y, &self.out_w, rows, features, 2),
            &self.out_b,
            rows,
            2,
        ))
    }
}

impl SequenceScorer for Discriminator {
    fn score(&self, batch: &SequenceBatch) -> Result<Array2<f32>> {
        let logits = self.forward(batch)?;
        Array2::from_shape_vec((batch.batch_size(), 2), logits.data().to_vec()).map_err(|e| {
            Error::ShapeMismatch {
                context: format!("scorer output: {e}"),
                expected: vec![batch.batch_size(), 2],
                actual: vec![logits.len()],
            }
        })
    }
}

impl Parametrized for Discriminator {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut out = vec![("embedding".to_string(), &self.embedding)];
        for (i, conv) in self.convs.iter().enumerate() {
            out.push((format!("conv{i}.w"), &conv.weight));
            out.push((format!("conv{i}.b"), &conv.bias));
        }
        out.push(("highway.w".to_string(), &self.highway_w));
        out.push(("highway.b".to_string(), &self.highway_b));
        out.push(("out.w".to_string(), &self.out_w));
        out.push(("out.b".to_string(), &self.out_b));
        out
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
        let Self { embedding, convs, highway_w, highway_b, out_w, out_b, .. } = self;
        let mut out = vec![("embedding".to_string(), embedding)];
        for (i, conv) in convs.iter_mut().enumerate() {
            out.push((format!("conv{i}.w"), &mut conv.weight));
            out.push((format!("conv{i}.b"), &mut conv.bias));
        }
        out.push(("highway.w".to_string(), highway_w));
        out.push(("highway.b".to_string(), highway_b));
        out.push(("out.w".to_string(), out_w));
        out.push(("out.b".to_string(), out_b));
        out
    }
}
