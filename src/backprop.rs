//! Differentiable operations and the gradient descent update.
//!
//! # Backpropagation Primitives
//!
//! **Key Features:**
//! - **Matrix Multiplication:** m×k · k×n with gradient closures, or forward-only.
//! - **Bias Addition:** row-broadcast add with gradient closure.
//! - **Loss Computation (MSE):** Mean Squared Error with gradient generator.
//! - **Update (SGD):** In-place `param -= lr * grad` over a whole parameter set.
//!
//! ## Autograd Pattern
//!
//! Each operation follows a simple pattern:
//! 1. **Inputs** are references to `WithGrad<Ten64>` (or plain tensors).
//! 2. **Forward Pass** computes an output `Ten64`.
//! 3. **Backward Pass** returns a closure capturing what it needs to compute gradients.
//!
//! Unlike the raw kernels in [`crate::ops::cpu`], the functions here check
//! shapes and report mismatches as [`TrainError::ShapeMismatch`].

use crate::error::{Result, TrainError};
use crate::ops::{FnF64Ten64, FnToDoubleTen64, cpu};
use crate::tensors::{Ten64, WithGrad};

/// Performs matrix multiplication of two 2D tensors: `a` (m×k) · `b` (k×n).
///
/// # Returns
/// - `out`: Product tensor (m×n).
/// - `back`: Closure that given `dL/d(out)` returns `(dL/d(a), dL/d(b))`.
///
/// # Example
/// ```rust
/// use descent::{tensor, tensors::WithGrad, backprop::matmul};
///
/// let a = WithGrad::new(tensor!([[1.0, 2.0], [3.0, 4.0]]));
/// let b = WithGrad::new(tensor!([[1.0], [1.0]]));
/// let (out, _back) = matmul(&a, &b).unwrap();
/// assert_eq!(out.data, vec![3.0, 7.0]);
/// ```
pub fn matmul(a: &WithGrad<Ten64>, b: &WithGrad<Ten64>) -> Result<(Ten64, Box<FnToDoubleTen64>)> {
    check_matmul(&a.value, &b.value)?;
    Ok(cpu::matmul(a, b))
}

/// Matrix product without a backward closure, for forward passes.
///
/// # Errors
/// Same shape rules as [`matmul`].
pub fn matmul_forward(a: &Ten64, b: &Ten64) -> Result<Ten64> {
    check_matmul(a, b)?;
    Ok(cpu::matmul_forward(a, b))
}

fn check_matmul(a: &Ten64, b: &Ten64) -> Result<()> {
    match (a.shape.as_slice(), b.shape.as_slice()) {
        ([_, k], [k2, _]) if k == k2 => Ok(()),
        ([_, k], [_, n]) => Err(TrainError::shape(&[*k, *n], &b.shape)),
        (sa, sb) => Err(TrainError::shape(sa, sb)),
    }
}

/// Adds a `[n]` bias to every row of an `[m, n]` input.
///
/// # Returns
/// - `out`: input with the bias added row-wise.
/// - `back`: Closure returning `(dL/d(input), dL/d(bias))`.
pub fn add_bias(input: &Ten64, bias: &Ten64) -> Result<(Ten64, Box<FnToDoubleTen64>)> {
    let n = bias.len();
    if bias.shape.len() != 1 || input.shape.len() != 2 || input.shape[1] != n {
        let rows = input.shape.first().copied().unwrap_or(0);
        return Err(TrainError::shape(&[rows, n], &input.shape));
    }
    Ok(cpu::add_bias(input, bias))
}

/// Computes Mean Squared Error (MSE) loss: `mean((target - prediction)^2)`.
///
/// # Returns
/// - Scalar loss value
/// - Closure that maps `dL/dloss` into gradient tensor shape
///
/// # Errors
/// Returns [`TrainError::ShapeMismatch`] if `prediction` and `target` differ in shape.
pub fn mse_loss<'a>(prediction: &'a WithGrad<Ten64>, target: &'a Ten64) -> Result<(f64, Box<FnF64Ten64<'a>>)> {
    if prediction.value.shape != target.shape {
        return Err(TrainError::shape(&target.shape, &prediction.value.shape));
    }
    Ok(cpu::mse_loss(prediction, target))
}

/// Mean squared error without a backward closure.
pub fn mse(prediction: &Ten64, target: &Ten64) -> Result<f64> {
    if prediction.shape != target.shape {
        return Err(TrainError::shape(&target.shape, &prediction.shape));
    }
    Ok(cpu::mse(&prediction.data, &target.data))
}

/// Applies `param := param - lr * grad` to every aligned pair, in place.
///
/// All gradients must already be computed; nothing here reads a parameter
/// after another one has been written.
///
/// # Errors
/// - [`TrainError::GradientCount`] if the two sets differ in length.
/// - [`TrainError::ShapeMismatch`] if a gradient's shape differs from its parameter's.
///   Parameters are left untouched in both cases.
pub fn sgd(params: &mut [Ten64], grads: &[Ten64], lr: f64) -> Result<()> {
    if params.len() != grads.len() {
        return Err(TrainError::GradientCount { expected: params.len(), found: grads.len() });
    }
    if let Some((p, g)) = params.iter().zip(grads).find(|(p, g)| p.shape != g.shape) {
        return Err(TrainError::shape(&p.shape, &g.shape));
    }
    for (param, grad) in params.iter_mut().zip(grads) {
        cpu::sgd_step(param, grad, lr);
    }
    Ok(())
}
