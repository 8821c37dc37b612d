//! Progress events and reporters.
//!
//! The training loop never prints. It hands [`TrainEvent`]s to a
//! [`Reporter`], and only when the configuration's `verbose` is non-zero.
//! [`TracingReporter`] is the default and logs through `tracing`; any
//! `FnMut(&TrainEvent)` closure works too.

use std::fmt;

/// Something worth telling the user about during training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainEvent {
    /// Loss of iteration `epoch` (the current loss, not the best so far).
    Progress { epoch: usize, loss: f64 },
    /// The best loss dropped below `min_tol` at iteration `epoch`.
    Converged { epoch: usize, best_loss: f64, min_tol: f64 },
}

impl fmt::Display for TrainEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progress { epoch, loss } => write!(f, "epoch {epoch}: loss {loss:.4}"),
            Self::Converged { epoch, best_loss, min_tol } => write!(
                f,
                "stopping early at epoch {epoch}: best loss {best_loss:.4e} is below min_tol {min_tol:e}"
            ),
        }
    }
}

/// Receives training events. Only called when `verbose` is non-zero.
pub trait Reporter {
    fn report(&mut self, event: &TrainEvent);
}

impl<F: FnMut(&TrainEvent)> Reporter for F {
    fn report(&mut self, event: &TrainEvent) {
        self(event)
    }
}

/// Logs every event at `info` level under the `descent::train` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: &TrainEvent) {
        match *event {
            TrainEvent::Progress { epoch, .. } => {
                tracing::info!(target: "descent::train", epoch, "{event}");
            }
            TrainEvent::Converged { epoch, best_loss, .. } => {
                tracing::info!(target: "descent::train", epoch, best_loss, "{event}");
            }
        }
    }
}
