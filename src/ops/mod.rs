//! # Tensor Operation Kernels
//!
//! Raw numerical kernels behind [`crate::backprop`]. Only a CPU backend
//! exists; it is parallelised with `rayon`.
//!
//! ## Submodules
//!
//! - [`cpu`] — Multi-threaded CPU operations
//!
//! ## Extending
//!
//! To add a new operation:
//!
//! 1. Implement it in [`cpu`], returning the forward value and a backward closure
//! 2. Expose it through [`crate::backprop`] with backend-agnostic shape checks
//!
//! Kernels assume their inputs were shape-checked by the caller.

pub mod cpu;

use crate::tensors::Ten64;

pub type FnToDoubleTen64 = dyn Fn(&Ten64) -> (Ten64, Ten64);
pub type FnF64Ten64<'a> = dyn Fn(f64) -> Ten64 + 'a;
