//! vargrad - Variable-level bookkeeping for reverse-mode automatic
//! differentiation.
//!
//! This crate is the bookkeeping core of an autograd engine: it tracks
//! how each tensor was produced, accumulates gradients flowing
//! backward through that production graph, and detects when a value
//! captured for backward computation has been overwritten by an
//! in-place mutation after capture. Correctness in the presence of
//! mutable shared storage comes from lightweight generation counters,
//! not from immutability or copy-on-write of the graph itself.
//!
//! # Architecture
//!
//! ```text
//! Variable<T> ──(creator, output_nr)──► Function (shared, Rc)
//!     │ owns
//!     ├── DenseTensor<T>        data buffer
//!     ├── VersionCounter ◄──────┐ aliased read-only
//!     ├── Option<Variable<T>>   │ accumulated gradient
//!     └── save() ──► SavedVariable ── SavedRef
//! ```
//!
//! Graph traversal is the job of an external backward-pass driver: it
//! walks the graph in reverse topological order, runs each node's
//! backward computation, and routes the resulting gradients into
//! predecessor variables via [`Variable::backward`] and
//! [`Variable::apply`].
//!
//! # Example
//!
//! ```
//! use vargrad::{DenseTensor, Variable};
//!
//! // Leaf created by the user.
//! let data = DenseTensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
//! let mut w = Variable::leaf(Some(data), true, false).unwrap();
//!
//! // The forward pass captures data needed later for backward.
//! let saved = w.save();
//!
//! // The backward driver deposits gradients; fan-out sums additively.
//! let g = DenseTensor::from_vec(vec![0.5, 0.5], &[2]).unwrap();
//! let g = Variable::leaf(Some(g), false, true).unwrap();
//! w.backward(&g).unwrap();
//! w.backward(&g).unwrap();
//! assert_eq!(w.grad().unwrap().data().data(), &[1.0, 1.0]);
//!
//! // Snapshots detect later in-place mutation of their source.
//! assert!(saved.unpack().is_ok());
//! w.version().increment();
//! assert!(saved.unpack().is_err());
//! ```
//!
//! # Design Notes
//!
//! - Single-threaded computation graph: `Rc`/`Cell` sharing, no locks.
//!   Hosts that parallelize backward traversal must serialize access
//!   to any given variable.
//! - A variable's accumulated gradient is itself a variable, owned
//!   exclusively by the accumulating variable.
//! - Errors are typed and immediate ([`AutogradError`], classified by
//!   [`ErrorKind`]); nothing is retried or downgraded internally.

pub mod device;
pub mod error;
pub mod function;
pub mod saved;
pub mod scalar;
pub mod strides;
pub mod tensor;
pub mod variable;
pub mod version;

pub use device::{current_device, Device, DeviceGuard};
pub use error::{AutogradError, ErrorKind, TensorError};
pub use function::{Function, FunctionRef};
pub use saved::SavedVariable;
pub use scalar::Scalar;
pub use tensor::DenseTensor;
pub use variable::{BackwardHook, Variable, VariableList};
pub use version::{SavedRef, VersionCounter};
