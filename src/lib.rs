//! Shape and dtype inference for random tensor operators.
//!
//! # About
//!
//! When a computation graph is constructed, each operator's output shapes
//! and element types must be known before anything executes, so that
//! downstream consumers can be type-checked. For most operators this is a
//! simple function of the input shapes. Operators that sample random values
//! are less regular: their output shape may come from a compile-time
//! constant operand (the `shape` tuple of the distribution samplers), from
//! broadcasting that constant against parameter tensors (Gamma, Poisson),
//! or purely from attributes (Randperm).
//!
//! This crate implements that construction-time contract for a family of
//! random operators. Each operator validates its attributes when it is
//! created and validates its operands and computes output metadata when
//! [`Operator::infer`] is called. Inference runs once per operator
//! instantiation, is pure and synchronous, and fails with a descriptive
//! [`InferError`] on any contract violation; actual sampling is the hosting
//! runtime's concern.
//!
//! # Example
//!
//! ```
//! use randop::ops::StandardNormal;
//! use randop::{InputList, Operand, Operator};
//!
//! let op = StandardNormal::new(2, 0)?;
//! let operands = [Operand::const_int_tuple(&[4, 16])];
//! let outputs = op.infer(&InputList::from(&operands))?;
//! assert_eq!(outputs[0].to_string(), "f32 [4, 16]");
//! # Ok::<(), randop::InferError>(())
//! ```
//!
//! # Crate contents
//!
//! - [`ops`] — the operator implementations.
//! - [`expanders`] — the registry of graph-kernel expanders consumed by the
//!   fusion compiler.
//! - [`aicpu`] — static operator registrations for the AICPU hardware
//!   backend.

pub mod aicpu;
mod broadcast;
pub mod expanders;
mod operator;
pub mod ops;
mod value;

pub use broadcast::broadcast_shapes;
pub use operator::{InferError, InputList, OpKind, Operator, OutputList};
pub use value::{Constant, DataType, Operand, OutputMeta};
