//! Implementations of the built-in operator kinds.
//!
//! Operators are grouped into modules by category. This module contains
//! validation helpers shared between the implementations.

use crate::operator::InferError;
use crate::value::{Constant, DataType, Operand};

mod candidate_sampling;
mod random;

pub use candidate_sampling::{LogUniformCandidateSampler, UniformCandidateSampler};
pub use random::{
    Gamma, Multinomial, Poisson, RandomCategorical, RandomChoiceWithMask, Randperm,
    StandardLaplace, StandardNormal, UniformInt, UniformReal,
};

/// Check that an attribute value is a non-negative integer.
pub(crate) fn check_non_negative(
    op: &'static str,
    attr: &'static str,
    value: i32,
) -> Result<(), InferError> {
    if value < 0 {
        Err(InferError::Configuration {
            op,
            attr,
            reason: format!("must be a non-negative integer, got {}", value),
        })
    } else {
        Ok(())
    }
}

/// Check that an attribute value is a positive integer.
pub(crate) fn check_positive(
    op: &'static str,
    attr: &'static str,
    value: i32,
) -> Result<(), InferError> {
    if value < 1 {
        Err(InferError::Configuration {
            op,
            attr,
            reason: format!("must be a positive integer, got {}", value),
        })
    } else {
        Ok(())
    }
}

/// Check that an operand's element type is one of `allowed`.
pub(crate) fn check_dtype(
    op: &'static str,
    name: &'static str,
    operand: &Operand,
    allowed: &'static [DataType],
) -> Result<DataType, InferError> {
    let actual = operand.dtype();
    if allowed.contains(&actual) {
        Ok(actual)
    } else {
        Err(InferError::InvalidDtype {
            op,
            operand: name,
            actual,
            allowed,
        })
    }
}

/// Check that an operand has exactly `ndim` dimensions.
pub(crate) fn check_ndim(
    op: &'static str,
    name: &'static str,
    operand: &Operand,
    ndim: usize,
) -> Result<(), InferError> {
    if operand.ndim() != ndim {
        Err(InferError::InvalidShape {
            op,
            reason: format!(
                "\"{}\" must have {} dims, got {}",
                name,
                ndim,
                operand.ndim()
            ),
        })
    } else {
        Ok(())
    }
}

/// Extract the value of an operand that must be a compile-time constant
/// tuple of positive integers, such as the `shape` input of the distribution
/// samplers.
pub(crate) fn const_shape_tuple(
    op: &'static str,
    name: &'static str,
    operand: &Operand,
) -> Result<Vec<usize>, InferError> {
    let Some(value) = operand.value() else {
        return Err(InferError::ShapeNotConstant { op, operand: name });
    };
    let Constant::IntTuple(dims) = value else {
        return Err(InferError::InvalidShape {
            op,
            reason: format!("\"{}\" must be a tuple of integers", name),
        });
    };

    let mut shape = Vec::with_capacity(dims.len());
    for (i, &dim) in dims.iter().enumerate() {
        if dim < 1 {
            return Err(InferError::InvalidShape {
                op,
                reason: format!("{}[{}] must be a positive integer, got {}", name, i, dim),
            });
        }
        shape.push(dim as usize);
    }
    Ok(shape)
}

/// Extract the value of an operand that must be a compile-time constant
/// scalar integer.
pub(crate) fn const_int(
    op: &'static str,
    name: &'static str,
    operand: &Operand,
) -> Result<i32, InferError> {
    match operand.value() {
        Some(Constant::Int(value)) => Ok(*value),
        Some(Constant::IntTuple(_)) => Err(InferError::InvalidShape {
            op,
            reason: format!("\"{}\" must be a scalar integer", name),
        }),
        None => Err(InferError::ShapeNotConstant { op, operand: name }),
    }
}
