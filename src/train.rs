//! The training loop controller.
//!
//! Vanilla gradient descent on the mean squared error with one early exit.
//! Each iteration, in order:
//!
//! 1. predict with the current parameters and compute the loss,
//! 2. fold the loss into the running minimum `best_loss`,
//! 3. stop if `best_loss < min_tol` (reported before this iteration's progress line),
//! 4. report progress every `verbose` iterations,
//! 5. compute all gradients, then update every parameter in place.
//!
//! Stopping is decided on the all-time best loss, not the current one, so a
//! single early low loss ends training even if later losses would be higher.
//!
//! ```rust
//! use descent::{tensor, config::TrainConfig, model::Scale, train::{Outcome, train}};
//!
//! let mut model = Scale::new(0.0);
//! let config = TrainConfig::default().with_learning_rate(0.1).with_max_epochs(1).with_verbose(0);
//! let report = train(&tensor!([1.0, 2.0, 3.0]), &tensor!([2.0, 4.0, 6.0]), &mut model, &config).unwrap();
//! assert_eq!(report.outcome, Outcome::Exhausted);
//! assert_eq!(report.state.updates, 1);
//! ```

use crate::backprop;
use crate::config::TrainConfig;
use crate::error::Result;
use crate::grad::{Backprop, GradientProvider, LossContext};
use crate::model::{Differentiable, Model};
use crate::report::{Reporter, TracingReporter, TrainEvent};
use crate::tensors::Ten64;

/// Loop bookkeeping, updated once per iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainingState {
    /// 0-based index of the last iteration that ran.
    pub epoch: usize,
    /// Number of loss evaluations performed.
    pub iterations: usize,
    /// Number of parameter updates applied.
    pub updates: usize,
    /// Lowest loss observed so far; `None` before the first iteration.
    pub best_loss: Option<f64>,
    /// Loss of the last iteration that ran.
    pub last_loss: Option<f64>,
}

impl TrainingState {
    /// Records the loss of iteration `epoch`; `best_loss` only moves on a strict improvement.
    fn observe(&mut self, epoch: usize, loss: f64) {
        self.epoch = epoch;
        self.iterations = epoch + 1;
        self.last_loss = Some(loss);
        if self.best_loss.is_none_or(|best| loss < best) {
            self.best_loss = Some(loss);
        }
    }

    fn below(&self, min_tol: f64) -> bool {
        self.best_loss.is_some_and(|best| best < min_tol)
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `best_loss` dropped below `min_tol`.
    Converged,
    /// All `max_epochs` iterations ran without reaching `min_tol`.
    Exhausted,
}

/// What [`Trainer::fit`] hands back once the loop stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingReport {
    /// Bookkeeping at the moment the loop stopped.
    pub state: TrainingState,
    pub outcome: Outcome,
}

impl TrainingReport {
    /// `true` if the loop stopped early because `best_loss < min_tol`.
    pub fn converged(&self) -> bool {
        self.outcome == Outcome::Converged
    }

    /// Shorthand for `state.best_loss`.
    pub fn best_loss(&self) -> Option<f64> {
        self.state.best_loss
    }
}

/// Runs the training loop with a configurable gradient provider and reporter.
#[derive(Debug, Clone)]
pub struct Trainer<G = Backprop, R = TracingReporter> {
    config: TrainConfig,
    gradients: G,
    reporter: R,
}

impl Trainer {
    /// Analytic gradients, progress through [`TracingReporter`].
    pub fn new(config: TrainConfig) -> Self {
        Self { config, gradients: Backprop, reporter: TracingReporter }
    }
}

impl<G, R> Trainer<G, R> {
    /// Swaps the gradient provider, e.g. for [`crate::grad::FiniteDifference`].
    pub fn with_gradients<H>(self, gradients: H) -> Trainer<H, R> {
        Trainer { config: self.config, gradients, reporter: self.reporter }
    }

    /// Swaps the event sink. Any `FnMut(&TrainEvent)` closure is a [`Reporter`].
    pub fn with_reporter<S>(self, reporter: S) -> Trainer<G, S> {
        Trainer { config: self.config, gradients: self.gradients, reporter }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn gradients(&self) -> &G {
        &self.gradients
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Consumes the trainer, returning the reporter with whatever it collected.
    pub fn into_reporter(self) -> R {
        self.reporter
    }
}

impl<G, R: Reporter> Trainer<G, R> {
    /// Fits `model` to `targets`, mutating its parameters in place.
    ///
    /// # Errors
    /// - Any error of [`TrainConfig::validate`], before the first iteration.
    /// - [`crate::TrainError::ShapeMismatch`] if a prediction does not match `targets`.
    /// - Whatever the model or gradient provider returns; the run stops there and
    ///   parameters keep the values of the last completed update.
    pub fn fit<M>(&mut self, model: &mut M, inputs: &Ten64, targets: &Ten64) -> Result<TrainingReport>
    where
        M: Model + ?Sized,
        G: GradientProvider<M>,
    {
        let config = self.config;
        config.validate()?;
        tracing::debug!(
            learning_rate = config.learning_rate,
            max_epochs = config.max_epochs,
            min_tol = config.min_tol,
            parameters = model.parameters().len(),
            "starting training"
        );

        let mut state = TrainingState::default();
        for epoch in 0..config.max_epochs {
            let prediction = model.apply(inputs)?;
            let loss = backprop::mse(&prediction, targets)?;
            state.observe(epoch, loss);

            if state.below(config.min_tol) {
                if config.verbose != 0 {
                    let best_loss = state.best_loss.unwrap_or(loss);
                    self.reporter.report(&TrainEvent::Converged { epoch, best_loss, min_tol: config.min_tol });
                }
                return Ok(self.finish(state, Outcome::Converged));
            }

            if config.reports_at(epoch) {
                self.reporter.report(&TrainEvent::Progress { epoch, loss });
            }

            let ctx = LossContext { inputs, targets, prediction: &prediction, loss };
            let grads = self.gradients.gradients(model, &ctx)?;
            backprop::sgd(model.parameters_mut(), &grads, config.learning_rate)?;
            state.updates += 1;
        }

        Ok(self.finish(state, Outcome::Exhausted))
    }

    fn finish(&self, state: TrainingState, outcome: Outcome) -> TrainingReport {
        tracing::debug!(
            ?outcome,
            iterations = state.iterations,
            updates = state.updates,
            best_loss = state.best_loss,
            "training finished"
        );
        TrainingReport { state, outcome }
    }
}

/// Trains a differentiable model with analytic gradients, logging through `tracing`.
///
/// Equivalent to `Trainer::new(*config).fit(model, inputs, targets)`.
pub fn train<M>(inputs: &Ten64, targets: &Ten64, model: &mut M, config: &TrainConfig) -> Result<TrainingReport>
where
    M: Differentiable + ?Sized,
{
    Trainer::new(*config).fit(model, inputs, targets)
}
