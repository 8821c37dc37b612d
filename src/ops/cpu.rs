//! Parallel CPU backend tensor operations
//!
//! # CPU Backend
//!
//! High-throughput CPU implementations of the operations a training step
//! needs. These are what `backprop::xyz` ends up calling.
//!
//! ## Features
//!
//! - Parallel execution using [`rayon`](https://docs.rs/rayon)
//! - Pure Rust, no `unsafe`
//!
//! ## Implemented Ops
//!
//! - `matmul`: Matrix multiplication with multithreading
//! - `matmul_forward`: The same product without a backward closure
//! - `add_bias`: Row-broadcast bias addition
//! - `mse` / `mse_loss`: Mean squared error, with and without autograd
//! - `sgd_step`: In-place gradient descent update of one parameter
//!
//! ## Design Goals
//!
//! - Deterministic results (given deterministic input)
//! - Modular: kernels are separate from shape validation

use rayon::prelude::*;

use super::{FnF64Ten64, FnToDoubleTen64};
use crate::tensors::{Ten64, Tensor, WithGrad};

/// Row-parallel `C = A × B` for row-major `A: m×k`, `B: k×n`.
fn gemm(a: &[f64], b: &[f64], m: usize, k: usize, n: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * n];
    if n == 0 {
        return out;
    }
    out.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
        for (j, cell) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for l in 0..k {
                sum += a[i * k + l] * b[l * n + j];
            }
            *cell = sum;
        }
    });
    out
}

fn transpose(data: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut out = vec![0.0; data.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

/// Forward-only `A × B` for `A: m×k`, `B: k×n`.
pub fn matmul_forward(a: &Ten64, b: &Ten64) -> Ten64 {
    let (m, k, n) = (a.shape[0], a.shape[1], b.shape[1]);
    Tensor::new(vec![m, n], gemm(&a.data, &b.data, m, k, n))
}

/// Performs a matrix multiplication `C = A × B` on two 2D tensors (`A: m×k`, `B: k×n`),
/// returning the result tensor and a closure for backpropagation.
///
/// # Returns
/// - Output tensor of shape `[m, n]`
/// - Backward function computing `(dL/dA, dL/dB) = (G·Bᵀ, Aᵀ·G)`
///
/// # Panics
/// - If the inner dimensions of `A` and `B` do not match.
pub fn matmul(a: &WithGrad<Ten64>, b: &WithGrad<Ten64>) -> (Ten64, Box<FnToDoubleTen64>) {
    let m = a.value.shape[0];
    let k = a.value.shape[1];
    let n = b.value.shape[1];
    assert_eq!(k, b.value.shape[0], "matmul shape mismatch");

    let out = matmul_forward(&a.value, &b.value);

    let a_t = transpose(&a.value.data, m, k);
    let b_t = transpose(&b.value.data, k, n);

    let back = move |grad: &Ten64| {
        let grad_a = gemm(&grad.data, &b_t, m, n, k);
        let grad_b = gemm(&a_t, &grad.data, k, m, n);
        (Tensor::new(vec![m, k], grad_a), Tensor::new(vec![k, n], grad_b))
    };

    (out, Box::new(back))
}

/// Adds `bias` (shape `[n]`) to every row of `input` (shape `[m, n]`).
///
/// The backward closure returns `(dL/dinput, dL/dbias)`; the bias gradient is
/// the column sum of the upstream gradient.
pub fn add_bias(input: &Ten64, bias: &Ten64) -> (Ten64, Box<FnToDoubleTen64>) {
    let n = bias.data.len();
    let mut data = input.data.clone();
    if n > 0 {
        data.par_chunks_mut(n).for_each(|row| {
            for (x, b) in row.iter_mut().zip(&bias.data) {
                *x += *b;
            }
        });
    }
    let out = Tensor::new(input.shape.clone(), data);

    let input_shape = input.shape.clone();
    let bias_shape = bias.shape.clone();
    let back = move |grad: &Ten64| {
        let mut grad_bias = vec![0.0; n];
        if n > 0 {
            for row in grad.data.chunks(n) {
                for (acc, g) in grad_bias.iter_mut().zip(row) {
                    *acc += *g;
                }
            }
        }
        (
            Tensor::new(input_shape.clone(), grad.data.clone()),
            Tensor::new(bias_shape.clone(), grad_bias),
        )
    };

    (out, Box::new(back))
}

/// Elements summed sequentially per parallel chunk; keeps the reduction order fixed.
const REDUCE_CHUNK: usize = 4096;

/// Mean of squared element-wise differences, reduced in parallel.
///
/// Partial sums are combined in chunk order, so the result does not depend
/// on thread scheduling. Empty input yields NaN.
pub fn mse(prediction: &[f64], target: &[f64]) -> f64 {
    let n = prediction.len() as f64;
    let partials: Vec<f64> = prediction
        .par_chunks(REDUCE_CHUNK)
        .zip(target.par_chunks(REDUCE_CHUNK))
        .map(|(pred, targ)| pred.iter().zip(targ).map(|(&y, &t)| (t - y).powi(2)).sum::<f64>())
        .collect();
    partials.iter().sum::<f64>() / n
}

/// Computes the mean squared error (MSE) between predictions and targets,
/// returning both the scalar loss and a gradient function.
///
/// # Formula
/// $$ L = \\frac{1}{n} \\sum_i (y_i - t_i)^2 $$
///
/// # Returns
/// - Scalar loss `f64`
/// - Backward function mapping upstream scalar gradient `dL` to a tensor of shape `prediction`
///
/// An empty prediction yields a NaN loss.
pub fn mse_loss<'a>(prediction: &'a WithGrad<Ten64>, target: &'a Ten64) -> (f64, Box<FnF64Ten64<'a>>) {
    let n = prediction.value.data.len() as f64;

    let loss = mse(&prediction.value.data, &target.data);

    let back = move |grad_output: f64| {
        let grad: Vec<f64> = prediction
            .value
            .data
            .par_iter()
            .zip(&target.data)
            .map(|(&y, &t)| 2.0 * (y - t) * grad_output / n)
            .collect();
        Tensor::new(prediction.value.shape.clone(), grad)
    };

    (loss, Box::new(back))
}

/// One vanilla gradient descent step on a single parameter, in place.
///
/// # Formula
/// $$ w := w - \\text{lr} \\cdot \\frac{\\partial L}{\\partial w} $$
pub fn sgd_step(param: &mut Ten64, grad: &Ten64, lr: f64) {
    param
        .data
        .par_iter_mut()
        .zip(&grad.data)
        .for_each(|(w, &g)| *w -= lr * g);
}
