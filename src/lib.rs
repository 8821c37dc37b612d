//! descent: a small gradient-descent training loop in Rust.
//!
//! Fits a model's parameters to a batch of inputs and targets by vanilla
//! gradient descent on the mean squared error, stopping early once the best
//! loss seen so far drops below a tolerance.
//!
//! # Features
//!
//! - Multi-dimensional tensors with gradient buffers.
//! - Closure-based forward/backward operations on a parallel CPU backend.
//! - A plain `Model` capability interface with eagerly sized parameters.
//! - Pluggable gradient providers (analytic backprop or finite differences).
//! - Progress reporting through `tracing` or any closure.
//! - Parameter checkpoints in the `.bpat` binary format.
//!
//! # Modules
//!
//! - [`tensors`] — Core tensor data structures.
//! - [`backprop`] — Differentiable operations and the SGD update.
//! - [`model`] — Model capabilities and the built-in `Scale` / `Linear` models.
//! - [`grad`] — Gradient providers.
//! - [`config`] — Training configuration.
//! - [`report`] — Progress events and reporters.
//! - [`train`] — The training loop controller.
//! - [`modelio`] — Saving/loading of parameter sets.
//!
//! # Example
//!
//! ```rust
//! use descent::{tensor, config::TrainConfig, model::Scale, train::train};
//!
//! let x = tensor!([1.0, 2.0, 3.0]);
//! let y = tensor!([2.0, 4.0, 6.0]);
//! let mut model = Scale::new(0.0);
//! let config = TrainConfig::default().with_learning_rate(0.1).with_verbose(0);
//!
//! let report = train(&x, &y, &mut model, &config).unwrap();
//! assert!(report.converged());
//! assert!((model.weight() - 2.0).abs() < 1e-2);
//! ```

#![deny(unsafe_code)]

pub mod tensors;
pub mod ops;
pub mod backprop;
pub mod error;
pub mod config;
pub mod model;
pub mod grad;
pub mod report;
pub mod train;
pub mod modelio;

pub use error::{Result, TrainError};
