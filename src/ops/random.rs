//! Operators that sample random values at execution time.
//!
//! Inference for these operators only validates operands and computes output
//! metadata. Sampling itself happens in the execution runtime, which reads
//! the seed attributes as-is; a zero seed means the runtime picks one.

use std::cell::Cell;

use crate::broadcast::broadcast_shapes;
use crate::operator::{InferError, InputList, OpKind, Operator, OutputList};
use crate::ops::{
    check_dtype, check_ndim, check_non_negative, check_positive, const_int, const_shape_tuple,
};
use crate::value::{DataType, OutputMeta};

const FLOAT32: &[DataType] = &[DataType::Float32];
const INT32: &[DataType] = &[DataType::Int32];
const BOOL: &[DataType] = &[DataType::Bool];

/// Element types accepted for the logits of [`RandomCategorical`].
const LOGITS_TYPES: &[DataType] = &[DataType::Float32, DataType::Float16, DataType::Float64];

/// The signed and unsigned integer family, accepted as the output type of
/// [`Randperm`].
const INTEGER_TYPES: &[DataType] = &[
    DataType::Int8,
    DataType::Int16,
    DataType::Int32,
    DataType::Int64,
    DataType::UInt8,
    DataType::UInt16,
    DataType::UInt32,
    DataType::UInt64,
];

/// Output types accepted by [`RandomCategorical`].
const CATEGORICAL_TYPES: &[DataType] = &[DataType::Int16, DataType::Int32, DataType::Int64];

/// Infer the output of an operator whose single operand is a compile-time
/// constant shape tuple and whose output has that exact shape.
fn infer_from_const_shape(
    op: &'static str,
    inputs: &InputList,
    dtype: DataType,
) -> Result<OutputList, InferError> {
    let shape = const_shape_tuple(op, "shape", inputs.require(0)?)?;
    Ok([OutputMeta::new(shape, dtype)].into())
}

/// Samples from the standard normal (Gaussian) distribution.
#[derive(Debug)]
pub struct StandardNormal {
    seed: i32,
    seed2: i32,
}

impl StandardNormal {
    pub(crate) const NAME: &'static str = "StandardNormal";

    pub fn new(seed: i32, seed2: i32) -> Result<StandardNormal, InferError> {
        check_non_negative(Self::NAME, "seed", seed)?;
        check_non_negative(Self::NAME, "seed2", seed2)?;
        Ok(StandardNormal { seed, seed2 })
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn seed2(&self) -> i32 {
        self.seed2
    }
}

impl Operator for StandardNormal {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::StandardNormal
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["shape"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        infer_from_const_shape(Self::NAME, inputs, DataType::Float32)
    }
}

/// Samples from the standard Laplace distribution (mean 0, scale 1).
///
/// Unlike the other seeded samplers this accepts negative seeds.
#[derive(Debug)]
pub struct StandardLaplace {
    seed: i32,
    seed2: i32,
}

impl StandardLaplace {
    pub(crate) const NAME: &'static str = "StandardLaplace";

    pub fn new(seed: i32, seed2: i32) -> Result<StandardLaplace, InferError> {
        Ok(StandardLaplace { seed, seed2 })
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn seed2(&self) -> i32 {
        self.seed2
    }
}

impl Operator for StandardLaplace {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::StandardLaplace
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["shape"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        infer_from_const_shape(Self::NAME, inputs, DataType::Float32)
    }
}

/// Samples uniformly from the interval `[0, 1)`.
#[derive(Debug)]
pub struct UniformReal {
    seed: i32,
    seed2: i32,
}

impl UniformReal {
    pub(crate) const NAME: &'static str = "UniformReal";

    pub fn new(seed: i32, seed2: i32) -> Result<UniformReal, InferError> {
        check_non_negative(Self::NAME, "seed", seed)?;
        check_non_negative(Self::NAME, "seed2", seed2)?;
        Ok(UniformReal { seed, seed2 })
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn seed2(&self) -> i32 {
        self.seed2
    }
}

impl Operator for UniformReal {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::UniformReal
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["shape"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        infer_from_const_shape(Self::NAME, inputs, DataType::Float32)
    }
}

/// Samples from a Gamma distribution parametrized by `alpha` (shape) and
/// `beta` (scale) tensors.
///
/// The output shape is the requested `shape` broadcast against the shapes of
/// `alpha` and `beta`.
#[derive(Debug)]
pub struct Gamma {
    seed: i32,
    seed2: i32,
}

impl Gamma {
    pub(crate) const NAME: &'static str = "Gamma";

    pub fn new(seed: i32, seed2: i32) -> Result<Gamma, InferError> {
        check_non_negative(Self::NAME, "seed", seed)?;
        check_non_negative(Self::NAME, "seed2", seed2)?;
        Ok(Gamma { seed, seed2 })
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn seed2(&self) -> i32 {
        self.seed2
    }
}

impl Operator for Gamma {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::Gamma
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["shape", "alpha", "beta"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        let shape = const_shape_tuple(Self::NAME, "shape", inputs.require(0)?)?;
        let alpha = inputs.require(1)?;
        let beta = inputs.require(2)?;
        check_dtype(Self::NAME, "alpha", alpha, FLOAT32)?;
        check_dtype(Self::NAME, "beta", beta, FLOAT32)?;

        let params = broadcast_shapes(Self::NAME, alpha.shape(), beta.shape())?;
        let out_shape = broadcast_shapes(Self::NAME, &params, &shape)?;
        Ok([OutputMeta::new(out_shape, DataType::Float32)].into())
    }
}

/// Samples from a Poisson distribution parametrized by a `mean` tensor.
#[derive(Debug)]
pub struct Poisson {
    seed: i32,
    seed2: i32,
}

impl Poisson {
    pub(crate) const NAME: &'static str = "Poisson";

    pub fn new(seed: i32, seed2: i32) -> Result<Poisson, InferError> {
        check_non_negative(Self::NAME, "seed", seed)?;
        check_non_negative(Self::NAME, "seed2", seed2)?;
        Ok(Poisson { seed, seed2 })
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn seed2(&self) -> i32 {
        self.seed2
    }
}

impl Operator for Poisson {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::Poisson
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["shape", "mean"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        let shape = const_shape_tuple(Self::NAME, "shape", inputs.require(0)?)?;
        let mean = inputs.require(1)?;
        check_dtype(Self::NAME, "mean", mean, FLOAT32)?;

        let out_shape = broadcast_shapes(Self::NAME, mean.shape(), &shape)?;
        Ok([OutputMeta::new(out_shape, DataType::Int32)].into())
    }
}

/// Samples integers uniformly from `[minval, maxval)`.
///
/// `minval` and `maxval` must be scalar i32 tensors. Whether `minval <
/// maxval` actually holds is only known at execution time and is checked
/// there, not here.
#[derive(Debug)]
pub struct UniformInt {
    seed: i32,
    seed2: i32,
}

impl UniformInt {
    pub(crate) const NAME: &'static str = "UniformInt";

    pub fn new(seed: i32, seed2: i32) -> Result<UniformInt, InferError> {
        check_non_negative(Self::NAME, "seed", seed)?;
        check_non_negative(Self::NAME, "seed2", seed2)?;
        Ok(UniformInt { seed, seed2 })
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn seed2(&self) -> i32 {
        self.seed2
    }
}

impl Operator for UniformInt {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::UniformInt
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["shape", "minval", "maxval"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        let shape = const_shape_tuple(Self::NAME, "shape", inputs.require(0)?)?;
        let minval = inputs.require(1)?;
        let maxval = inputs.require(2)?;
        check_dtype(Self::NAME, "minval", minval, INT32)?;
        check_dtype(Self::NAME, "maxval", maxval, INT32)?;
        check_ndim(Self::NAME, "minval", minval, 0)?;
        check_ndim(Self::NAME, "maxval", maxval, 0)?;

        Ok([OutputMeta::new(shape, DataType::Int32)].into())
    }
}

/// Produces a random permutation of the integers `0..n`.
#[derive(Debug)]
pub struct Randperm {
    n: i32,
    dtype: DataType,
}

impl Randperm {
    pub(crate) const NAME: &'static str = "Randperm";

    pub fn new(n: i32, dtype: DataType) -> Result<Randperm, InferError> {
        check_positive(Self::NAME, "n", n)?;
        if !INTEGER_TYPES.contains(&dtype) {
            return Err(InferError::Configuration {
                op: Self::NAME,
                attr: "dtype",
                reason: format!("must be an integer type, got {}", dtype),
            });
        }
        Ok(Randperm { n, dtype })
    }

    pub fn n(&self) -> i32 {
        self.n
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

impl Operator for Randperm {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::Randperm
    }

    fn input_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, _inputs: &InputList) -> Result<OutputList, InferError> {
        Ok([OutputMeta::new(vec![self.n as usize], self.dtype)].into())
    }
}

/// Samples `count` indices of true elements from a boolean tensor, together
/// with a mask marking which of the sampled indices are valid.
#[derive(Debug)]
pub struct RandomChoiceWithMask {
    count: i32,
    seed: i32,
    seed2: i32,
}

impl RandomChoiceWithMask {
    pub(crate) const NAME: &'static str = "RandomChoiceWithMask";

    pub fn new(count: i32, seed: i32, seed2: i32) -> Result<RandomChoiceWithMask, InferError> {
        check_positive(Self::NAME, "count", count)?;
        Ok(RandomChoiceWithMask { count, seed, seed2 })
    }

    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn seed2(&self) -> i32 {
        self.seed2
    }
}

impl Operator for RandomChoiceWithMask {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::RandomChoiceWithMask
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["input_x"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["index", "mask"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        let input_x = inputs.require(0)?;
        check_dtype(Self::NAME, "input_x", input_x, BOOL)?;

        let ndim = input_x.ndim();
        if !(1..=5).contains(&ndim) {
            return Err(InferError::InvalidShape {
                op: Self::NAME,
                reason: format!("\"input_x\" rank must be in [1, 5], got {}", ndim),
            });
        }

        let count = self.count as usize;
        let index = OutputMeta::new(vec![count, ndim], DataType::Int32);
        let mask = OutputMeta::new(vec![count], DataType::Bool);
        Ok([index, mask].into_iter().collect())
    }
}

/// Samples class indices from a batch of categorical distributions described
/// by a `[batch_size, num_classes]` logits tensor.
///
/// The sample count and seed arrive as compile-time constant operands rather
/// than attributes. Inference resolves them and records the values on the
/// instance so downstream consumers can read them as ordinary attributes.
#[derive(Debug)]
pub struct RandomCategorical {
    dtype: DataType,
    num_samples: Cell<Option<i32>>,
    seed: Cell<Option<i32>>,
}

impl RandomCategorical {
    pub(crate) const NAME: &'static str = "RandomCategorical";

    pub fn new(dtype: DataType) -> Result<RandomCategorical, InferError> {
        if !CATEGORICAL_TYPES.contains(&dtype) {
            return Err(InferError::Configuration {
                op: Self::NAME,
                attr: "dtype",
                reason: format!("must be one of [i16, i32, i64], got {}", dtype),
            });
        }
        Ok(RandomCategorical {
            dtype,
            num_samples: Cell::new(None),
            seed: Cell::new(None),
        })
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// The sample count resolved by the last [`infer`](Operator::infer) call.
    pub fn num_samples(&self) -> Option<i32> {
        self.num_samples.get()
    }

    /// The seed resolved by the last [`infer`](Operator::infer) call.
    pub fn seed(&self) -> Option<i32> {
        self.seed.get()
    }
}

impl Operator for RandomCategorical {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::RandomCategorical
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["logits", "num_samples", "seed"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        let logits = inputs.require(0)?;
        check_dtype(Self::NAME, "logits", logits, LOGITS_TYPES)?;
        check_ndim(Self::NAME, "logits", logits, 2)?;

        let num_samples = const_int(Self::NAME, "num_samples", inputs.require(1)?)?;
        if num_samples < 1 {
            return Err(InferError::InvalidShape {
                op: Self::NAME,
                reason: format!("num_samples must be a positive integer, got {}", num_samples),
            });
        }
        let seed = const_int(Self::NAME, "seed", inputs.require(2)?)?;

        self.num_samples.set(Some(num_samples));
        self.seed.set(Some(seed));

        let out_shape = vec![logits.shape()[0], num_samples as usize];
        Ok([OutputMeta::new(out_shape, self.dtype)].into())
    }
}

/// Samples indices from per-row multinomial distributions.
///
/// Rows of `input` are unnormalized weights; they need not sum to one.
/// Whether the weights are non-negative and finite is execution data and is
/// not checked here.
#[derive(Debug)]
pub struct Multinomial {
    seed: i32,
    seed2: i32,
}

impl Multinomial {
    pub(crate) const NAME: &'static str = "Multinomial";

    pub fn new(seed: i32, seed2: i32) -> Result<Multinomial, InferError> {
        check_non_negative(Self::NAME, "seed", seed)?;
        check_non_negative(Self::NAME, "seed2", seed2)?;
        Ok(Multinomial { seed, seed2 })
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn seed2(&self) -> i32 {
        self.seed2
    }
}

impl Operator for Multinomial {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::Multinomial
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["input", "num_samples"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &["output"]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        let input = inputs.require(0)?;
        check_dtype(Self::NAME, "input", input, FLOAT32)?;
        let ndim = input.ndim();
        if ndim != 1 && ndim != 2 {
            return Err(InferError::InvalidShape {
                op: Self::NAME,
                reason: format!("\"input\" rank must be 1 or 2, got {}", ndim),
            });
        }

        let num_samples = const_int(Self::NAME, "num_samples", inputs.require(1)?)?;
        if num_samples < 1 {
            return Err(InferError::InvalidShape {
                op: Self::NAME,
                reason: format!("num_samples must be a positive integer, got {}", num_samples),
            });
        }

        let out_shape = if ndim == 1 {
            vec![num_samples as usize]
        } else {
            vec![input.shape()[0], num_samples as usize]
        };
        Ok([OutputMeta::new(out_shape, DataType::Int32)].into())
    }
}
