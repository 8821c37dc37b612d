//! Training configuration.
//!
//! A [`TrainConfig`] is fixed for the duration of one training call. It can be
//! built in code with the `with_*` methods or read from JSON; missing JSON
//! fields fall back to [`TrainConfig::default`].
//!
//! ```rust
//! use descent::config::TrainConfig;
//!
//! let config = TrainConfig::from_json(r#"{ "learning_rate": 0.1, "verbose": 0 }"#).unwrap();
//! assert_eq!(config.learning_rate, 0.1);
//! assert_eq!(config.max_epochs, 1000);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Step size of the update `param -= learning_rate * grad`.
    pub learning_rate: f64,
    /// Upper bound on loop iterations.
    pub max_epochs: usize,
    /// Training stops once the best loss seen drops strictly below this.
    pub min_tol: f64,
    /// Report progress every `verbose` epochs; `0` silences all reports.
    pub verbose: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            max_epochs: 1000,
            min_tol: 1e-6,
            verbose: 100,
        }
    }
}

impl TrainConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    pub fn with_min_tol(mut self, min_tol: f64) -> Self {
        self.min_tol = min_tol;
        self
    }

    pub fn with_verbose(mut self, verbose: usize) -> Self {
        self.verbose = verbose;
        self
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// [`TrainError::Config`] on malformed JSON, or any error of [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the preconditions of a training run.
    ///
    /// A negative `min_tol` is accepted: a mean of squares never goes below
    /// zero, so such a run always uses all `max_epochs`.
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidLearningRate(self.learning_rate));
        }
        if self.max_epochs == 0 {
            return Err(TrainError::InvalidMaxEpochs(self.max_epochs));
        }
        if self.min_tol.is_nan() {
            return Err(TrainError::InvalidTolerance(self.min_tol));
        }
        Ok(())
    }

    /// Whether epoch `epoch` gets a progress report.
    pub fn reports_at(&self, epoch: usize) -> bool {
        self.verbose != 0 && epoch % self.verbose == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_learning_rate() {
        for lr in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let err = TrainConfig::default().with_learning_rate(lr).validate().unwrap_err();
            assert!(matches!(err, TrainError::InvalidLearningRate(_)));
        }
    }

    #[test]
    fn rejects_zero_epochs() {
        let err = TrainConfig::default().with_max_epochs(0).validate().unwrap_err();
        assert!(matches!(err, TrainError::InvalidMaxEpochs(0)));
    }

    #[test]
    fn rejects_nan_tolerance_but_not_negative() {
        let err = TrainConfig::default().with_min_tol(f64::NAN).validate().unwrap_err();
        assert!(matches!(err, TrainError::InvalidTolerance(_)));
        assert!(TrainConfig::default().with_min_tol(-1.0).validate().is_ok());
    }

    #[test]
    fn json_fills_missing_fields_from_default() {
        let config = TrainConfig::from_json(r#"{ "max_epochs": 5 }"#).unwrap();
        assert_eq!(config, TrainConfig::default().with_max_epochs(5));
    }

    #[test]
    fn json_errors_surface() {
        assert!(matches!(TrainConfig::from_json("{ not json"), Err(TrainError::Config(_))));
        assert!(matches!(
            TrainConfig::from_json(r#"{ "max_epochs": 0 }"#),
            Err(TrainError::InvalidMaxEpochs(0))
        ));
    }

    #[test]
    fn reports_on_multiples_of_verbose() {
        let config = TrainConfig::default().with_verbose(3);
        let hits: Vec<usize> = (0..10).filter(|&e| config.reports_at(e)).collect();
        assert_eq!(hits, vec![0, 3, 6, 9]);
        assert!(!TrainConfig::default().with_verbose(0).reports_at(0));
    }
}
