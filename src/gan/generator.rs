//! LSTM generator: autoregressive next-token sampler

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{validate_temperature, MaliGanConfig};
use super::init::{constant, normal, xavier};
use super::{Parametrized, SequenceBatch};
use crate::autograd::{
    add, add_row_broadcast, embedding, log_softmax_rows, matmul, mul, sigmoid, tanh,
};
use crate::error::{Error, Result};
use crate::Tensor;

/// Hidden and cell state of the generator's LSTM for one batch
///
/// The memory belongs to whoever drives the generator, not to the generator
/// itself. It must be reset before every independent run: `generate` does so
/// on entry, and a training forward pass always starts from fresh zeros.
#[derive(Debug, Clone)]
pub struct RecurrentMemory {
    h: Tensor,
    c: Tensor,
    batch_size: usize,
    hidden_size: usize,
}

impl RecurrentMemory {
    /// Zero memory for `batch_size` rows
    pub fn zeros(batch_size: usize, hidden_size: usize) -> Self {
        Self {
            h: Tensor::zeros(batch_size * hidden_size, false),
            c: Tensor::zeros(batch_size * hidden_size, false),
            batch_size,
            hidden_size,
        }
    }

    /// Clear state and resize for a new run of `batch_size` rows
    pub fn reset(&mut self, batch_size: usize) {
        *self = Self::zeros(batch_size, self.hidden_size);
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// `(batch_size, hidden_size)` hidden state, row-major
    pub fn hidden(&self) -> &Tensor {
        &self.h
    }

    pub fn cell(&self) -> &Tensor {
        &self.c
    }

    /// True when every entry of both states is zero
    pub fn is_zeroed(&self) -> bool {
        self.h.data().iter().chain(self.c.data().iter()).all(|&v| v == 0.0)
    }

    /// Cut the state off from the graph that produced it
    fn detach(&mut self) {
        self.h = self.h.detach();
        self.c = self.c.detach();
    }
}

/// Input and recurrent weights of one LSTM gate
struct Gate {
    w: Tensor, // embedding × hidden
    u: Tensor, // hidden × hidden
    b: Tensor, // hidden
}

impl Gate {
    fn new<R: Rng + ?Sized>(input: usize, hidden: usize, bias: f32, rng: &mut R) -> Self {
        Self {
            w: xavier(input, hidden, rng),
            u: xavier(hidden, hidden, rng),
            b: constant(hidden, bias),
        }
    }

    /// Pre-activation `x·W + h·U + b` for a batch
    fn forward(&self, x: &Tensor, h: &Tensor, rows: usize, input: usize, hidden: usize) -> Tensor {
        let xw = matmul(x, &self.w, rows, input, hidden);
        let hu = matmul(h, &self.u, rows, hidden, hidden);
        add_row_broadcast(&add(&xw, &hu), &self.b, rows, hidden)
    }

    fn named<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Tensor)>) {
        out.push((format!("{prefix}.w"), &self.w));
        out.push((format!("{prefix}.u"), &self.u));
        out.push((format!("{prefix}.b"), &self.b));
    }

    fn named_mut<'a>(&'a mut self, prefix: &str, out: &mut Vec<(String, &'a mut Tensor)>) {
        out.push((format!("{prefix}.w"), &mut self.w));
        out.push((format!("{prefix}.u"), &mut self.u));
        out.push((format!("{prefix}.b"), &mut self.b));
    }
}

/// Embedding → LSTM → linear projection to vocabulary logits
pub struct Generator {
    vocab_size: usize,
    embedding_size: usize,
    hidden_size: usize,
    embedding: Tensor,
    input_gate: Gate,
    forget_gate: Gate,
    cell_gate: Gate,
    output_gate: Gate,
    w_out: Tensor,
    b_out: Tensor,
}

impl Generator {
    /// Create a generator with random initialization
    pub fn new(config: &MaliGanConfig) -> Result<Self> {
        Self::from_rng(config, &mut StdRng::from_os_rng())
    }

    /// Create a generator with a seed for reproducibility
    pub fn with_seed(config: &MaliGanConfig, seed: u64) -> Result<Self> {
        Self::from_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    pub fn from_rng<R: Rng + ?Sized>(config: &MaliGanConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let (v, e, h) = (config.vocab_size, config.embedding_size, config.hidden_size);

        Ok(Self {
            vocab_size: v,
            embedding_size: e,
            hidden_size: h,
            embedding: normal(v * e, (1.0 / e as f64).sqrt(), rng),
            input_gate: Gate::new(e, h, 0.0, rng),
            // Forget gate starts open
            forget_gate: Gate::new(e, h, 1.0, rng),
            cell_gate: Gate::new(e, h, 0.0, rng),
            output_gate: Gate::new(e, h, 0.0, rng),
            w_out: xavier(h, v, rng),
            b_out: constant(v, 0.0),
        })
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Fresh zero memory sized for this generator
    pub fn memory(&self, batch_size: usize) -> RecurrentMemory {
        RecurrentMemory::zeros(batch_size, self.hidden_size)
    }

    /// Advance the LSTM one position
    ///
    /// Feeds one token per row, updates `memory` in place and returns the
    /// `(batch_size, vocab_size)` next-token logits.
    pub fn step(&self, tokens: &[u32], memory: &mut RecurrentMemory) -> Result<Tensor> {
        let rows = tokens.len();
        if rows != memory.batch_size || memory.hidden_size != self.hidden_size {
            return Err(Error::ShapeMismatch {
                context: "generator memory".into(),
                expected: vec![rows, self.hidden_size],
                actual: vec![memory.batch_size, memory.hidden_size],
            });
        }
        if let Some(&token) = tokens.iter().find(|&&t| t as usize >= self.vocab_size) {
            return Err(Error::TokenOutOfRange { token, vocab_size: self.vocab_size });
        }

        let (e, h) = (self.embedding_size, self.hidden_size);
        let x = embedding(&self.embedding, tokens, e);

        let i = sigmoid(&self.input_gate.forward(&x, &memory.h, rows, e, h));
        let f = sigmoid(&self.forget_gate.forward(&x, &memory.h, rows, e, h));
        let g = tanh(&self.cell_gate.forward(&x, &memory.h, rows, e, h));
        let o = sigmoid(&self.output_gate.forward(&x, &memory.h, rows, e, h));

        let c = add(&mul(&f, &memory.c), &mul(&i, &g));
        let h_next = mul(&o, &tanh(&c));

        let logits = add_row_broadcast(
            &matmul(&h_next, &self.w_out, rows, h, self.vocab_size),
            &self.b_out,
            rows,
            self.vocab_size,
        );

        memory.h = h_next;
        memory.c = c;
        Ok(logits)
    }

    /// Next-token logits for every position of `x`, feeding the true tokens
    ///
    /// Returns one `(batch_size, vocab_size)` tensor per position, starting
    /// from zero memory.
    pub fn forward(&self, x: &SequenceBatch) -> Result<Vec<Tensor>> {
        let mut memory = self.memory(x.batch_size());
        (0..x.length()).map(|t| self.step(&x.column(t), &mut memory)).collect()
    }

    /// Sample `batch_size` sequences of `length` tokens
    ///
    /// Resets `memory`, draws a uniform start token per row, then feeds each
    /// sampled token back in `length` times, dividing the logits by
    /// `temperature` before every draw. The returned `(x, y)` are the first
    /// and last `length` tokens of the resulting `length + 1` sequence, so
    /// `y[:, j] == x[:, j + 1]`.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        memory: &mut RecurrentMemory,
        batch_size: usize,
        length: usize,
        temperature: f32,
        rng: &mut R,
    ) -> Result<(SequenceBatch, SequenceBatch)> {
        validate_temperature(temperature)?;
        if batch_size == 0 || length == 0 {
            return Err(Error::InvalidConfig(format!(
                "generate needs batch_size >= 1 and length >= 1, got {batch_size} and {length}"
            )));
        }

        memory.reset(batch_size);
        let vocab = self.vocab_size as u32;
        let mut current: Vec<u32> =
            (0..batch_size).map(|_| rng.random_range(0..vocab)).collect();
        let mut sequences: Vec<Vec<u32>> = current.iter().map(|&t| vec![t]).collect();

        for _ in 0..length {
            let logits = self.step(&current, memory)?;
            // Sampling never backpropagates; keep the graph from growing
            memory.detach();

            let log_probs =
                tempered_log_probs(&logits.data().to_vec(), self.vocab_size, temperature);
            for (row, seq) in log_probs.chunks(self.vocab_size).zip(&mut sequences) {
                seq.push(sample_categorical(row, rng));
            }
            current = sequences.iter().map(|s| s[s.len() - 1]).collect();
        }

        let x: Vec<Vec<u32>> = sequences.iter().map(|s| s[..length].to_vec()).collect();
        let y: Vec<Vec<u32>> = sequences.iter().map(|s| s[1..].to_vec()).collect();
        Ok((
            SequenceBatch::from_rows(&x, self.vocab_size)?,
            SequenceBatch::from_rows(&y, self.vocab_size)?,
        ))
    }
}

/// Row-wise `log_softmax(logits / temperature)`
///
/// The max is subtracted before dividing, so the largest entry of each row
/// stays at 0 however small `temperature` is and the others can only fall
/// to `-inf`. Near-zero temperatures degrade to a greedy pick instead of NaN.
fn tempered_log_probs(logits: &[f32], classes: usize, temperature: f32) -> Vec<f32> {
    let mut scaled = Vec::with_capacity(logits.len());
    for row in logits.chunks(classes) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        scaled.extend(row.iter().map(|&x| (x - max) / temperature));
    }
    log_softmax_rows(&scaled, classes)
}

/// Inverse-CDF draw from one row of log-probabilities
fn sample_categorical<R: Rng + ?Sized>(log_probs: &[f32], rng: &mut R) -> u32 {
    let u: f32 = rng.random();
    let mut cumulative = 0.0;
    for (i, &lp) in log_probs.iter().enumerate() {
        cumulative += lp.exp();
        if u < cumulative {
            return i as u32;
        }
    }
    // Rounding left the total just under u; take the last token with mass
    log_probs
        .iter()
        .rposition(|&lp| lp > f32::NEG_INFINITY)
        .unwrap_or(log_probs.len() - 1) as u32
}

impl Parametrized for Generator {
    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        let mut out = vec![("embedding".to_string(), &self.embedding)];
        self.input_gate.named("lstm.input", &mut out);
        self.forget_gate.named("lstm.forget", &mut out);
        self.cell_gate.named("lstm.cell", &mut out);
        self.output_gate.named("lstm.output", &mut out);
        out.push(("out.w".to_string(), &self.w_out));
        out.push(("out.b".to_string(), &self.b_out));
        out
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
        let Self {
            embedding,
            input_gate,
            forget_gate,
            cell_gate,
            output_gate,
            w_out,
            b_out,
            ..
        } = self;
        let mut out = vec![("embedding".to_string(), embedding)];
        input_gate.named_mut("lstm.input", &mut out);
        forget_gate.named_mut("lstm.forget", &mut out);
        cell_gate.named_mut("lstm.cell", &mut out);
        output_gate.named_mut("lstm.output", &mut out);
        out.push(("out.w".to_string(), w_out));
        out.push(("out.b".to_string(), b_out));
        out
    }
}
