//! Registry of graph-kernel expanders.
//!
//! The graph-kernel fusion compiler replaces certain composite operators
//! with graphs of primitive arithmetic kernels. The registry here maps the
//! name of each fusible operator to an expansion routine that validates the
//! operator's inputs and declares the output descriptors of the fused
//! computation; the rewrite itself is the compiler's job.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::operator::{InferError, InputList, OutputList};
use crate::ops::{check_dtype, check_ndim};
use crate::value::{DataType, OutputMeta};

const FLOAT_TYPES: &[DataType] = &[DataType::Float16, DataType::Float32, DataType::Float64];

/// Expansion routine for a fusible operator.
pub type ExpandFn = fn(&InputList) -> Result<OutputList, InferError>;

static EXPANDERS: LazyLock<FxHashMap<&'static str, ExpandFn>> = LazyLock::new(|| {
    let mut table: FxHashMap<&'static str, ExpandFn> = FxHashMap::default();
    table.insert("Gelu", expand_gelu);
    table.insert("GeluGrad", expand_gelu_grad);
    table.insert("LayerNorm", expand_layernorm);
    table.insert("Softmax", expand_softmax);
    table.insert("Square", expand_square);
    table.insert("BiasAdd", expand_bias_add);
    table.insert("BiasAddGrad", expand_bias_add_grad);
    table
});

/// Look up the expansion routine for a fusible operator.
pub fn get_expander(name: &str) -> Option<ExpandFn> {
    EXPANDERS.get(name).copied()
}

/// Return the names of all operators with a registered expander.
pub fn expander_names() -> impl Iterator<Item = &'static str> {
    EXPANDERS.keys().copied()
}

/// Expansion of an elementwise operator: one float input, output with the
/// same shape and dtype.
fn expand_elementwise(op: &'static str, inputs: &InputList) -> Result<OutputList, InferError> {
    let x = inputs.require(0)?;
    let dtype = check_dtype(op, "x", x, FLOAT_TYPES)?;
    Ok([OutputMeta::new(x.shape().to_vec(), dtype)].into())
}

fn expand_gelu(inputs: &InputList) -> Result<OutputList, InferError> {
    expand_elementwise("Gelu", inputs)
}

fn expand_softmax(inputs: &InputList) -> Result<OutputList, InferError> {
    expand_elementwise("Softmax", inputs)
}

fn expand_square(inputs: &InputList) -> Result<OutputList, InferError> {
    expand_elementwise("Square", inputs)
}

/// GeluGrad takes the upstream gradient `dy` plus the forward input and
/// output, and produces a gradient shaped like the forward input.
fn expand_gelu_grad(inputs: &InputList) -> Result<OutputList, InferError> {
    const NAME: &str = "GeluGrad";
    let dy = inputs.require(0)?;
    let x = inputs.require(1)?;
    let _y = inputs.require(2)?;
    check_dtype(NAME, "dy", dy, FLOAT_TYPES)?;
    let dtype = check_dtype(NAME, "x", x, FLOAT_TYPES)?;
    if dy.shape() != x.shape() {
        return Err(InferError::IncompatibleShapes {
            op: NAME,
            lhs: dy.shape().to_vec(),
            rhs: x.shape().to_vec(),
        });
    }
    Ok([OutputMeta::new(x.shape().to_vec(), dtype)].into())
}

/// LayerNorm normalizes over the trailing dimension and also emits the mean
/// and variance computed per normalization group.
fn expand_layernorm(inputs: &InputList) -> Result<OutputList, InferError> {
    const NAME: &str = "LayerNorm";
    let x = inputs.require(0)?;
    let gamma = inputs.require(1)?;
    let beta = inputs.require(2)?;
    let dtype = check_dtype(NAME, "x", x, FLOAT_TYPES)?;
    check_ndim(NAME, "gamma", gamma, 1)?;
    check_ndim(NAME, "beta", beta, 1)?;

    let x_shape = x.shape();
    let Some(&norm_dim) = x_shape.last() else {
        return Err(InferError::InvalidShape {
            op: NAME,
            reason: "\"x\" must have at least 1 dim".to_string(),
        });
    };
    if gamma.shape()[0] != norm_dim || beta.shape()[0] != norm_dim {
        return Err(InferError::InvalidShape {
            op: NAME,
            reason: format!(
                "\"gamma\" and \"beta\" must have shape [{}] to match the normalized dim",
                norm_dim
            ),
        });
    }

    // Mean and variance keep the reduced dim as size 1.
    let mut stats_shape = x_shape.to_vec();
    if let Some(last) = stats_shape.last_mut() {
        *last = 1;
    }

    let y = OutputMeta::new(x_shape.to_vec(), dtype);
    let mean = OutputMeta::new(stats_shape.clone(), dtype);
    let variance = OutputMeta::new(stats_shape, dtype);
    Ok([y, mean, variance].into_iter().collect())
}

fn expand_bias_add(inputs: &InputList) -> Result<OutputList, InferError> {
    const NAME: &str = "BiasAdd";
    let x = inputs.require(0)?;
    let bias = inputs.require(1)?;
    let dtype = check_dtype(NAME, "x", x, FLOAT_TYPES)?;
    check_ndim(NAME, "bias", bias, 1)?;

    let x_shape = x.shape();
    match x_shape.last() {
        Some(&channels) if channels == bias.shape()[0] => {}
        _ => {
            return Err(InferError::IncompatibleShapes {
                op: NAME,
                lhs: x_shape.to_vec(),
                rhs: bias.shape().to_vec(),
            });
        }
    }
    Ok([OutputMeta::new(x_shape.to_vec(), dtype)].into())
}

/// BiasAddGrad reduces the output gradient over all but the channel dim.
fn expand_bias_add_grad(inputs: &InputList) -> Result<OutputList, InferError> {
    const NAME: &str = "BiasAddGrad";
    let dout = inputs.require(0)?;
    let dtype = check_dtype(NAME, "dout", dout, FLOAT_TYPES)?;
    let Some(&channels) = dout.shape().last() else {
        return Err(InferError::InvalidShape {
            op: NAME,
            reason: "\"dout\" must have at least 1 dim".to_string(),
        });
    };
    Ok([OutputMeta::new(vec![channels], dtype)].into())
}
