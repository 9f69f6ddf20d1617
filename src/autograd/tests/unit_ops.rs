//! Unit tests for autograd operations (forward and backward)

use crate::autograd::{
    add, add_row_broadcast, add_scalar, backward, matmul, mul, relu, scale, sigmoid, sum, tanh,
    Tensor,
};
use approx::assert_abs_diff_eq;

#[test]
fn test_tensor_creation() {
    let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
    assert_eq!(t.len(), 3);
    assert!(t.requires_grad());
    assert!(t.grad().is_none());
}

#[test]
fn test_tensor_grad_accumulation() {
    let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);

    t.accumulate_grad(ndarray::arr1(&[1.0, 1.0, 1.0]));
    assert_eq!(t.grad().expect("gradient should be available")[0], 1.0);

    t.accumulate_grad(ndarray::arr1(&[1.0, 1.0, 1.0]));
    assert_eq!(t.grad().expect("gradient should be available")[0], 2.0);

    t.zero_grad();
    assert!(t.grad().is_none());
}

#[test]
fn test_clone_shares_gradient_slot() {
    let param = Tensor::from_vec(vec![1.0, 2.0], true);
    let captured = param.clone();
    captured.accumulate_grad(ndarray::arr1(&[0.5, 0.5]));
    assert_eq!(param.grad().unwrap().to_vec(), vec![0.5, 0.5]);
}

#[test]
fn test_detach_cuts_graph() {
    let a = Tensor::from_vec(vec![1.0, 2.0], true);
    let b = scale(&a, 3.0).detach();
    assert!(!b.requires_grad());
    assert!(b.backward_op().is_none());
    assert_eq!(b.data().to_vec(), vec![3.0, 6.0]);
}

#[test]
fn test_add_backward() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
    let b = Tensor::from_vec(vec![4.0, 5.0, 6.0], true);
    let mut c = add(&a, &b);

    backward(&mut c, Some(ndarray::arr1(&[1.0, 1.0, 1.0])));

    let grad_a = a.grad().expect("gradient should be available");
    let grad_b = b.grad().expect("gradient should be available");
    for i in 0..3 {
        assert_abs_diff_eq!(grad_a[i], 1.0);
        assert_abs_diff_eq!(grad_b[i], 1.0);
    }
}

#[test]
fn test_fan_out_accumulates_each_path_once() {
    // y = h * h + h, with h = 2x; dy/dx = 2 * (2h + 1) = 2 * 9 = 18 at x = 2
    let x = Tensor::from_vec(vec![2.0], true);
    let h = scale(&x, 2.0);
    let mut y = add(&mul(&h, &h), &h);
    backward(&mut y, None);

    assert_abs_diff_eq!(x.grad().unwrap()[0], 18.0, epsilon = 1e-5);
}

#[test]
fn test_recurrent_chain_gradient() {
    // h_{t+1} = tanh(w * h_t), loss = sum_t h_t over 3 steps, sharing w
    let w = Tensor::from_vec(vec![0.5], true);
    let mut h = Tensor::from_vec(vec![1.0], false);
    let mut outputs = Vec::new();
    for _ in 0..3 {
        h = tanh(&mul(&w, &h));
        outputs.push(h.clone());
    }
    let mut loss = outputs[1..].iter().fold(outputs[0].clone(), |acc, o| add(&acc, o));
    backward(&mut loss, None);

    // Finite difference on w
    let f = |wv: f32| {
        let mut hv = 1.0f32;
        let mut total = 0.0;
        for _ in 0..3 {
            hv = (wv * hv).tanh();
            total += hv;
        }
        total
    };
    let numerical = (f(0.5 + 1e-3) - f(0.5 - 1e-3)) / 2e-3;
    assert_abs_diff_eq!(w.grad().unwrap()[0], numerical, epsilon = 1e-2);
}

#[test]
fn test_add_row_broadcast_bias_grad() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], true);
    let bias = Tensor::from_vec(vec![10.0, 20.0, 30.0], true);
    let out = add_row_broadcast(&a, &bias, 2, 3);
    assert_eq!(out.data().to_vec(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);

    let mut loss = sum(&out);
    backward(&mut loss, None);
    assert_eq!(bias.grad().unwrap().to_vec(), vec![2.0, 2.0, 2.0]);
}

#[test]
fn test_add_scalar_and_relu() {
    let a = Tensor::from_vec(vec![-2.0, 0.5], true);
    let mut loss = sum(&relu(&add_scalar(&a, 1.0)));
    assert_abs_diff_eq!(loss.item(), 1.5);

    backward(&mut loss, None);
    assert_eq!(a.grad().unwrap().to_vec(), vec![0.0, 1.0]);
}

#[test]
fn test_sigmoid_forward() {
    let a = Tensor::from_vec(vec![0.0], false);
    assert_abs_diff_eq!(sigmoid(&a).data()[0], 0.5);
}

#[test]
fn test_matmul_backward_shapes() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], true); // 2×3
    let b = Tensor::from_vec(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0], true); // 3×2
    let mut loss = sum(&matmul(&a, &b, 2, 3, 2));
    backward(&mut loss, None);

    assert_eq!(a.grad().unwrap().len(), 6);
    assert_eq!(b.grad().unwrap().len(), 6);
    // ∂/∂a[i][p] = sum_j b[p][j]
    assert_eq!(a.grad().unwrap().to_vec(), vec![1.0, 1.0, 2.0, 1.0, 1.0, 2.0]);
}
