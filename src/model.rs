//! Model capabilities and the built-in models.
//!
//! A model is a pure function of its current parameters plus an explicit,
//! ordered parameter list. Parameters are sized when the model is built and
//! keep their count and shapes for the model's whole life; the training loop
//! only ever borrows them.

use crate::backprop;
use crate::error::{Result, TrainError};
use crate::tensors::{Ten64, Tensor, WithGrad};

/// Something that maps an input batch to an output batch.
pub trait Model {
    /// Forward pass. Must not depend on anything but `inputs` and the parameters.
    fn apply(&self, inputs: &Ten64) -> Result<Ten64>;

    /// Read-only ordered view of the parameters.
    fn parameters(&self) -> &[Ten64];

    /// Mutable view of the same parameters, in the same order.
    fn parameters_mut(&mut self) -> &mut [Ten64];
}

/// A model that can turn `dL/d(output)` into one gradient per parameter.
pub trait Differentiable: Model {
    /// Returns `dL/d(param)` for every parameter, aligned with [`Model::parameters`].
    fn backward(&self, inputs: &Ten64, grad_output: &Ten64) -> Result<Vec<Ten64>>;
}

/// Overwrites a model's parameters, e.g. with a loaded checkpoint.
///
/// # Errors
/// [`TrainError::GradientCount`] or [`TrainError::ShapeMismatch`] when `tensors`
/// does not line up with the model's parameters. The model is unchanged on error.
pub fn assign<M: Model + ?Sized>(model: &mut M, tensors: Vec<Ten64>) -> Result<()> {
    let params = model.parameters_mut();
    if params.len() != tensors.len() {
        return Err(TrainError::GradientCount { expected: params.len(), found: tensors.len() });
    }
    if let Some((p, t)) = params.iter().zip(&tensors).find(|(p, t)| p.shape != t.shape) {
        return Err(TrainError::shape(&p.shape, &t.shape));
    }
    for (p, t) in params.iter_mut().zip(tensors) {
        *p = t;
    }
    Ok(())
}

/// Element-wise scaling by a single learned weight: `y = w * x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    params: [Ten64; 1],
}

impl Scale {
    pub fn new(weight: f64) -> Self {
        Self { params: [Tensor::scalar(weight)] }
    }

    pub fn weight(&self) -> f64 {
        self.params[0].data[0]
    }
}

impl Model for Scale {
    fn apply(&self, inputs: &Ten64) -> Result<Ten64> {
        let w = self.weight();
        Ok(Tensor::new(inputs.shape.clone(), inputs.data.iter().map(|x| w * x).collect()))
    }

    fn parameters(&self) -> &[Ten64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [Ten64] {
        &mut self.params
    }
}

impl Differentiable for Scale {
    fn backward(&self, inputs: &Ten64, grad_output: &Ten64) -> Result<Vec<Ten64>> {
        if inputs.shape != grad_output.shape {
            return Err(TrainError::shape(&inputs.shape, &grad_output.shape));
        }
        let dw = inputs.data.iter().zip(&grad_output.data).map(|(x, g)| x * g).sum();
        Ok(vec![Tensor::scalar(dw)])
    }
}

/// Fully connected layer: `y = x · W + b`.
///
/// Inputs are `[batch, in]`, outputs `[batch, out]`. Parameters are
/// `[W, b]` with `W: [in, out]` and `b: [out]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    params: [Ten64; 2],
}

impl Linear {
    /// A layer with all weights and biases at zero.
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn zeros(inputs: usize, outputs: usize) -> Self {
        assert!(inputs > 0 && outputs > 0, "linear layer needs non-zero dimensions");
        Self { params: [Tensor::zeros(vec![inputs, outputs]), Tensor::zeros(vec![outputs])] }
    }

    /// Builds a layer from explicit weights and bias.
    ///
    /// # Errors
    /// [`TrainError::ShapeMismatch`] unless `weights` is 2D and `bias` is `[weights.shape[1]]`.
    pub fn from_parts(weights: Ten64, bias: Ten64) -> Result<Self> {
        let outputs = match weights.shape.as_slice() {
            [i, o] if *i > 0 && *o > 0 => *o,
            _ => {
                let rows = weights.shape.first().copied().unwrap_or(1);
                return Err(TrainError::shape(&[rows, bias.len()], &weights.shape));
            }
        };
        if bias.shape != [outputs] {
            return Err(TrainError::shape(&[outputs], &bias.shape));
        }
        Ok(Self { params: [weights, bias] })
    }

    pub fn weights(&self) -> &Ten64 {
        &self.params[0]
    }

    pub fn bias(&self) -> &Ten64 {
        &self.params[1]
    }
}

impl Model for Linear {
    fn apply(&self, inputs: &Ten64) -> Result<Ten64> {
        let xw = backprop::matmul_forward(inputs, &self.params[0])?;
        let (y, _) = backprop::add_bias(&xw, &self.params[1])?;
        Ok(y)
    }

    fn parameters(&self) -> &[Ten64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [Ten64] {
        &mut self.params
    }
}

impl Differentiable for Linear {
    fn backward(&self, inputs: &Ten64, grad_output: &Ten64) -> Result<Vec<Ten64>> {
        let x = WithGrad::new(inputs.clone());
        let w = WithGrad::new(self.params[0].clone());
        let (xw, xw_back) = backprop::matmul(&x, &w)?;
        let (y, bias_back) = backprop::add_bias(&xw, &self.params[1])?;
        if y.shape != grad_output.shape {
            return Err(TrainError::shape(&y.shape, &grad_output.shape));
        }

        let (grad_xw, grad_b) = bias_back(grad_output);
        let (_, grad_w) = xw_back(&grad_xw);
        Ok(vec![grad_w, grad_b])
    }
}
