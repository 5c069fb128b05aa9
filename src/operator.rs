//! The [`Operator`] trait for defining operators.

use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display};

use smallvec::SmallVec;

use crate::value::{DataType, Operand, OutputMeta};

/// Enum of the built-in operator kinds.
///
/// Each kind corresponds to one [`Operator`] implementation in [`crate::ops`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OpKind {
    StandardNormal,
    StandardLaplace,
    Gamma,
    Poisson,
    UniformInt,
    UniformReal,
    Randperm,
    RandomChoiceWithMask,
    RandomCategorical,
    Multinomial,
    UniformCandidateSampler,
    LogUniformCandidateSampler,
}

/// Possible reasons why constructing an operator or inferring its output
/// shapes may fail.
///
/// All variants are fatal to the operator instance or inference call that
/// produced them. Shape and dtype mismatches are programmer errors in the
/// graph definition, so there is no retry or recovery path: errors propagate
/// unchanged to the graph builder.
#[derive(Clone, Debug, PartialEq)]
pub enum InferError {
    /// An attribute supplied at construction time violates its schema.
    Configuration {
        op: &'static str,
        attr: &'static str,
        reason: String,
    },

    /// An operand whose value the operator requires to be a compile-time
    /// constant could not be resolved during graph construction.
    ShapeNotConstant {
        op: &'static str,
        operand: &'static str,
    },

    /// A resolved shape violates a positivity or rank constraint.
    InvalidShape { op: &'static str, reason: String },

    /// Two operand shapes have no valid broadcast alignment.
    IncompatibleShapes {
        op: &'static str,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    /// An operand's element type is not in the accepted set for its position.
    InvalidDtype {
        op: &'static str,
        operand: &'static str,
        actual: DataType,
        allowed: &'static [DataType],
    },

    /// The number of operands was less than the required number.
    MissingInputs,
}

impl Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::Configuration { op, attr, reason } => {
                write!(f, "invalid attribute \"{}\" for {}: {}", attr, op, reason)
            }
            InferError::ShapeNotConstant { op, operand } => {
                write!(f, "{} requires \"{}\" to be a compile-time constant", op, operand)
            }
            InferError::InvalidShape { op, reason } => {
                write!(f, "invalid shape for {}: {}", op, reason)
            }
            InferError::IncompatibleShapes { op, lhs, rhs } => {
                write!(f, "{} cannot broadcast shapes {:?} and {:?}", op, lhs, rhs)
            }
            InferError::InvalidDtype {
                op,
                operand,
                actual,
                allowed,
            } => {
                let allowed: Vec<String> = allowed.iter().map(|dt| dt.to_string()).collect();
                write!(
                    f,
                    "operand \"{}\" of {} has type {}, expected one of [{}]",
                    operand,
                    op,
                    actual,
                    allowed.join(", ")
                )
            }
            InferError::MissingInputs => write!(f, "required inputs were missing"),
        }
    }
}

impl Error for InferError {}

/// Inferred metadata for an operator's outputs, in declared output order.
///
/// This avoids allocations in the common case where an operator produces
/// exactly one output.
pub type OutputList = SmallVec<[OutputMeta; 1]>;

/// An operator describes a computation step in a data flow graph.
///
/// Operators take zero or more tensor-valued operands plus a set of
/// attributes fixed at graph construction time. This crate only models the
/// construction-time half of an operator's contract: validating its
/// attributes and operands and computing its output shapes and element
/// types. Execution is the hosting runtime's concern.
pub trait Operator: Debug {
    /// Return a display name for the operator.
    fn name(&self) -> &str;

    /// Return the kind of this operator.
    fn kind(&self) -> OpKind;

    /// Names of the operator's inputs, in declared order. Used for
    /// diagnostics.
    fn input_names(&self) -> &'static [&'static str];

    /// Names of the operator's outputs, in declared order.
    fn output_names(&self) -> &'static [&'static str];

    /// Validate the operands and compute the shape and element type of each
    /// output.
    ///
    /// `inputs` must list one descriptor per declared input, in declared
    /// order. Inference is pure apart from per-instance attribute resolution
    /// (see [`RandomCategorical`](crate::ops::RandomCategorical)): calling it
    /// twice with identical inputs yields identical outputs.
    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError>;
}

/// List of operand descriptors for an inference call.
///
/// Wraps a borrowed slice of [`Operand`]s with accessors that produce
/// appropriate errors when inputs are missing.
#[derive(Clone, Copy)]
pub struct InputList<'a> {
    inputs: &'a [Operand],
}

impl<'a> InputList<'a> {
    /// Construct an empty input list, for operators with no operands.
    pub fn new() -> InputList<'a> {
        InputList { inputs: &[] }
    }

    pub fn from(inputs: &'a [Operand]) -> InputList<'a> {
        InputList { inputs }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Get an optional input.
    pub fn get(&self, index: usize) -> Option<&'a Operand> {
        self.inputs.get(index)
    }

    /// Get a required operator input.
    pub fn require(&self, index: usize) -> Result<&'a Operand, InferError> {
        self.get(index).ok_or(InferError::MissingInputs)
    }

    /// Return an iterator over the operands.
    pub fn iter(&self) -> impl Iterator<Item = &'a Operand> {
        self.inputs.iter()
    }
}

impl Default for InputList<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> From<&'a [Operand]> for InputList<'a> {
    fn from(inputs: &'a [Operand]) -> InputList<'a> {
        InputList::from(inputs)
    }
}
