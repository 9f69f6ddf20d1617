//! Property-based gradient checks against central finite differences

use super::test_utils::gradient_gap;
use crate::autograd::{
    add, add_row_broadcast, concat_columns, embedding, matmul, max_pool_groups, mul, relu,
    sigmoid, sparse_cross_entropy, tanh, Tensor,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_add_mul_gradient(
        xy in prop::collection::vec((-5.0f32..5.0, -5.0f32..5.0), 2..16)
    ) {
        let (x, y): (Vec<f32>, Vec<f32>) = xy.into_iter().unzip();
        let other = Tensor::from_vec(y, false);
        let gap = gradient_gap(|a| add(&mul(a, &other), a), &x, 1e-3);
        prop_assert!(gap < 0.05, "gap {}", gap);
    }

    /// The gate product an LSTM cell computes: σ(x) · tanh(x)
    #[test]
    fn prop_gate_product_gradient(x in prop::collection::vec(-4.0f32..4.0, 1..16)) {
        let gap = gradient_gap(|a| mul(&sigmoid(a), &tanh(a)), &x, 1e-3);
        prop_assert!(gap < 0.02, "gap {}", gap);
    }

    #[test]
    fn prop_affine_layer_gradient(
        rows in 1usize..4,
        cols in 1usize..4,
        seed in prop::collection::vec(-2.0f32..2.0, 16),
    ) {
        // Gradient with respect to the bias of relu(x·W + b); stay off the kink
        let x = Tensor::from_vec(seed[..rows * 2].to_vec(), false);
        let w = Tensor::from_vec(seed[8..8 + 2 * cols].to_vec(), false);
        let bias: Vec<f32> = (0..cols).map(|j| 0.3 + 0.1 * j as f32).collect();
        let pre = matmul(&x, &w, rows, 2, cols);
        let clear_of_kink =
            pre.data().iter().enumerate().all(|(i, v)| (v + bias[i % cols]).abs() > 0.05);
        prop_assume!(clear_of_kink);

        let gap = gradient_gap(
            |b| relu(&add_row_broadcast(&matmul(&x, &w, rows, 2, cols), b, rows, cols)),
            &bias,
            1e-3,
        );
        prop_assert!(gap < 0.05, "gap {}", gap);
    }

    #[test]
    fn prop_matmul_gradient(
        m in 1usize..4,
        k in 1usize..4,
        n in 1usize..4,
        seed in prop::collection::vec(-2.0f32..2.0, 32),
    ) {
        let a: Vec<f32> = seed.iter().take(m * k).copied().collect();
        let b = Tensor::from_vec(seed.iter().rev().take(k * n).copied().collect(), false);
        let gap = gradient_gap(|t| matmul(t, &b, m, k, n), &a, 1e-2);
        prop_assert!(gap < 0.05, "gap {}", gap);
    }

    #[test]
    fn prop_embedding_gradient(
        table in prop::collection::vec(-1.0f32..1.0, 12),
        ids in prop::collection::vec(0u32..4, 1..8),
    ) {
        // Repeated ids must accumulate into the same table row
        let scale: Vec<f32> = (0..ids.len() * 3).map(|i| i as f32 * 0.1).collect();
        let weights = Tensor::from_vec(scale, false);
        let gap = gradient_gap(|t| mul(&embedding(t, &ids, 3), &weights), &table, 1e-3);
        prop_assert!(gap < 0.02, "gap {}", gap);
    }

    #[test]
    fn prop_conv_pool_concat_gradient(
        values in prop::collection::vec(-3.0f32..3.0, 12),
    ) {
        // 2 groups × 3 positions × 2 filters, pooled then joined with itself
        let mut sorted = values.clone();
        sorted.sort_by(f32::total_cmp);
        prop_assume!(sorted.windows(2).all(|w| w[1] - w[0] > 1e-2));

        let gap = gradient_gap(
            |a| {
                let pooled = max_pool_groups(a, 2, 3, 2);
                let doubled = add(&pooled, &pooled);
                concat_columns(&[&pooled, &doubled], &[2, 2], 2)
            },
            &values,
            1e-3,
        );
        prop_assert!(gap < 0.02, "gap {}", gap);
    }

    #[test]
    fn prop_weighted_cross_entropy_gradient(
        logits in prop::collection::vec(-3.0f32..3.0, 6),
        t0 in 0u32..3,
        t1 in 0u32..3,
        w0 in -1.0f32..1.0,
        w1 in -1.0f32..1.0,
    ) {
        let targets = [t0, t1];
        let weights = [w0, w1];
        let gap = gradient_gap(
            |t| sparse_cross_entropy(t, &targets, Some(&weights), 3),
            &logits,
            1e-3,
        );
        prop_assert!(gap < 0.02, "gap {}", gap);
    }
}
