//! Gradient providers.
//!
//! A [`GradientProvider`] turns the loss of one iteration into one gradient
//! per model parameter, positionally aligned with [`Model::parameters`].
//! Providers only read the model; the training loop applies the update after
//! the whole gradient set exists.

use rayon::prelude::*;

use crate::backprop;
use crate::error::Result;
use crate::model::{Differentiable, Model};
use crate::tensors::{Ten64, Tensor, WithGrad};

/// Everything known about the loss of the current iteration.
#[derive(Debug, Clone, Copy)]
pub struct LossContext<'a> {
    pub inputs: &'a Ten64,
    pub targets: &'a Ten64,
    /// Output of the model on `inputs` for the current parameters.
    pub prediction: &'a Ten64,
    /// `mean((targets - prediction)^2)`.
    pub loss: f64,
}

pub trait GradientProvider<M: ?Sized> {
    /// `dL/d(param)` for every parameter of `model`, in parameter order.
    fn gradients(&self, model: &M, ctx: &LossContext<'_>) -> Result<Vec<Ten64>>;
}

/// Analytic gradients: the MSE backward closure feeds the model's own backward pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backprop;

impl<M: Differentiable + ?Sized> GradientProvider<M> for Backprop {
    fn gradients(&self, model: &M, ctx: &LossContext<'_>) -> Result<Vec<Ten64>> {
        let prediction = WithGrad::new(ctx.prediction.clone());
        let (_, loss_back) = backprop::mse_loss(&prediction, ctx.targets)?;
        let grad_output = loss_back(1.0);
        model.backward(ctx.inputs, &grad_output)
    }
}

/// Numerical gradients by central differences.
///
/// Works for any model that can be cloned. Every element is perturbed on its
/// own clone of the current parameters, so all gradients come from the same
/// snapshot even though they are evaluated in parallel.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifference {
    epsilon: f64,
}

impl Default for FiniteDifference {
    fn default() -> Self {
        Self { epsilon: 1e-6 }
    }
}

impl FiniteDifference {
    /// Central differences with step `epsilon`.
    ///
    /// # Panics
    /// Panics unless `epsilon` is finite and positive.
    pub fn new(epsilon: f64) -> Self {
        assert!(
            epsilon.is_finite() && epsilon > 0.0,
            "finite difference step must be finite and positive, got {epsilon}"
        );
        Self { epsilon }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn perturbed_loss<M: Model + Clone>(
        &self,
        model: &M,
        ctx: &LossContext<'_>,
        (param, index): (usize, usize),
        delta: f64,
    ) -> Result<f64> {
        let mut probe = model.clone();
        probe.parameters_mut()[param].data[index] += delta;
        let prediction = probe.apply(ctx.inputs)?;
        backprop::mse(&prediction, ctx.targets)
    }
}

impl<M: Model + Clone + Sync> GradientProvider<M> for FiniteDifference {
    fn gradients(&self, model: &M, ctx: &LossContext<'_>) -> Result<Vec<Ten64>> {
        let eps = self.epsilon;
        model
            .parameters()
            .iter()
            .enumerate()
            .map(|(p, param)| -> Result<Ten64> {
                let data = (0..param.len())
                    .into_par_iter()
                    .map(|i| -> Result<f64> {
                        let up = self.perturbed_loss(model, ctx, (p, i), eps)?;
                        let down = self.perturbed_loss(model, ctx, (p, i), -eps)?;
                        Ok((up - down) / (2.0 * eps))
                    })
                    .collect::<Result<Vec<f64>>>()?;
                Ok(Tensor::new(param.shape.clone(), data))
            })
            .collect()
    }
}
