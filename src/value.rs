//! Descriptor types for operator inputs and outputs.

use std::fmt;
use std::fmt::Display;

/// Enum specifying the element type of a tensor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    Float64,
    Bool,
}

impl DataType {
    /// Return the size of elements of this type in bytes.
    pub fn size(self) -> u8 {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Bool => 1,
            DataType::Int16 | DataType::UInt16 | DataType::Float16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => 8,
        }
    }

    /// Return true if this is a signed or unsigned integer type.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Return true if this is a floating point type.
    pub fn is_float(self) -> bool {
        matches!(
            self,
            DataType::Float16 | DataType::Float32 | DataType::Float64
        )
    }
}

impl Display for DataType {
    /// Format this enum value in the style of the corresponding Rust type
    /// (eg. "i32" for `DataType::Int32`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                DataType::Int8 => "i8",
                DataType::Int16 => "i16",
                DataType::Int32 => "i32",
                DataType::Int64 => "i64",
                DataType::UInt8 => "u8",
                DataType::UInt16 => "u16",
                DataType::UInt32 => "u32",
                DataType::UInt64 => "u64",
                DataType::Float16 => "f16",
                DataType::Float32 => "f32",
                DataType::Float64 => "f64",
                DataType::Bool => "bool",
            }
        )
    }
}

/// A value known at graph construction time.
///
/// Several operators require certain operands (eg. the `shape` operand of
/// the distribution samplers) to be compile-time constants. Inference fails
/// fast when such an operand's value is unresolved.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    /// A scalar integer, eg. a sample count or a seed.
    Int(i32),

    /// A tuple of integers, eg. a requested output shape.
    IntTuple(Vec<i32>),
}

/// Descriptor of one input operand at an inference call site.
///
/// An operand carries the shape and element type of the tensor that will
/// flow into the operator at execution time, plus the tensor's value when it
/// is resolvable at graph construction time.
#[derive(Clone, Debug, PartialEq)]
pub struct Operand {
    shape: Vec<usize>,
    dtype: DataType,
    value: Option<Constant>,
}

impl Operand {
    /// Describe a tensor operand whose value is only known at execution time.
    pub fn tensor(dtype: DataType, shape: &[usize]) -> Operand {
        Operand {
            shape: shape.to_vec(),
            dtype,
            value: None,
        }
    }

    /// Describe a scalar integer operand with a compile-time constant value.
    pub fn const_int(value: i32) -> Operand {
        Operand {
            shape: Vec::new(),
            dtype: DataType::Int32,
            value: Some(Constant::Int(value)),
        }
    }

    /// Describe a tuple-of-integers operand with a compile-time constant
    /// value, such as the `shape` input of the distribution samplers.
    pub fn const_int_tuple(values: &[i32]) -> Operand {
        Operand {
            shape: vec![values.len()],
            dtype: DataType::Int32,
            value: Some(Constant::IntTuple(values.to_vec())),
        }
    }

    /// Describe an operand whose contract requires a compile-time constant
    /// value which could not be resolved during graph construction.
    pub fn unresolved(dtype: DataType) -> Operand {
        Operand {
            shape: Vec::new(),
            dtype,
            value: None,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Return the number of dimensions of this operand.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Return the compile-time constant value of this operand, if resolved.
    pub fn value(&self) -> Option<&Constant> {
        self.value.as_ref()
    }
}

/// Inferred metadata for one operator output.
///
/// All operators in this crate produce fully resolved constant shapes, so
/// unlike the inputs there is no unresolved case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputMeta {
    pub shape: Vec<usize>,
    pub dtype: DataType,
}

impl OutputMeta {
    pub fn new(shape: Vec<usize>, dtype: DataType) -> OutputMeta {
        OutputMeta { shape, dtype }
    }
}

impl Display for OutputMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Produces strings such as "f32 [1, 16, 256]"
        write!(f, "{} {:?}", self.dtype, self.shape)
    }
}
