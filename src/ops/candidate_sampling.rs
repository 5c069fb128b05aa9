//! Candidate sampling operators, used to subsample large class spaces when
//! training classifiers.

use crate::operator::{InferError, InputList, OpKind, Operator, OutputList};
use crate::ops::{check_dtype, check_ndim, check_non_negative, check_positive};
use crate::value::{DataType, OutputMeta};

const INT32: &[DataType] = &[DataType::Int32];
const INT64: &[DataType] = &[DataType::Int64];

/// Check that the trailing dimension of the `true_classes` operand matches
/// the `num_true` attribute.
fn check_num_true(
    op: &'static str,
    true_classes_shape: &[usize],
    num_true: i32,
) -> Result<(), InferError> {
    if true_classes_shape[1] != num_true as usize {
        return Err(InferError::InvalidShape {
            op,
            reason: format!(
                "\"true_classes\" shape[1] ({}) must equal num_true ({})",
                true_classes_shape[1], num_true
            ),
        });
    }
    Ok(())
}

/// Samples `num_sampled` candidate classes uniformly from `[0, range_max)`.
///
/// If `unique` is set, candidates are drawn without replacement.
#[derive(Debug)]
pub struct UniformCandidateSampler {
    num_true: i32,
    num_sampled: i32,
    unique: bool,
    range_max: i32,
    seed: i32,
    remove_accidental_hits: bool,
}

impl UniformCandidateSampler {
    pub(crate) const NAME: &'static str = "UniformCandidateSampler";

    pub fn new(
        num_true: i32,
        num_sampled: i32,
        unique: bool,
        range_max: i32,
        seed: i32,
        remove_accidental_hits: bool,
    ) -> Result<UniformCandidateSampler, InferError> {
        check_positive(Self::NAME, "num_true", num_true)?;
        check_positive(Self::NAME, "num_sampled", num_sampled)?;
        check_positive(Self::NAME, "range_max", range_max)?;
        check_non_negative(Self::NAME, "seed", seed)?;
        if unique && num_sampled > range_max {
            return Err(InferError::Configuration {
                op: Self::NAME,
                attr: "num_sampled",
                reason: format!(
                    "must be <= range_max ({}) when unique is true, got {}",
                    range_max, num_sampled
                ),
            });
        }
        Ok(UniformCandidateSampler {
            num_true,
            num_sampled,
            unique,
            range_max,
            seed,
            remove_accidental_hits,
        })
    }

    pub fn num_true(&self) -> i32 {
        self.num_true
    }

    pub fn num_sampled(&self) -> i32 {
        self.num_sampled
    }

    pub fn unique(&self) -> bool {
        self.unique
    }

    pub fn range_max(&self) -> i32 {
        self.range_max
    }

    /// The seed, passed through to the execution runtime untouched. A zero
    /// value means the runtime reseeds randomly.
    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn remove_accidental_hits(&self) -> bool {
        self.remove_accidental_hits
    }
}

impl Operator for UniformCandidateSampler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::UniformCandidateSampler
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["true_classes"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &[
            "sampled_candidates",
            "true_expected_count",
            "sampled_expected_count",
        ]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        let true_classes = inputs.require(0)?;
        check_dtype(Self::NAME, "true_classes", true_classes, INT32)?;
        check_ndim(Self::NAME, "true_classes", true_classes, 2)?;
        check_num_true(Self::NAME, true_classes.shape(), self.num_true)?;

        let num_sampled = self.num_sampled as usize;
        let sampled_candidates = OutputMeta::new(vec![num_sampled], true_classes.dtype());
        let true_expected_count =
            OutputMeta::new(true_classes.shape().to_vec(), DataType::Float32);
        let sampled_expected_count = OutputMeta::new(vec![num_sampled], DataType::Float32);
        Ok([
            sampled_candidates,
            true_expected_count,
            sampled_expected_count,
        ]
        .into_iter()
        .collect())
    }
}

/// Samples candidate classes from `[0, range_max)` with a log-uniform
/// distribution, favouring lower class ids.
///
/// Unlike [`UniformCandidateSampler`] this requires i64 target classes.
#[derive(Debug)]
pub struct LogUniformCandidateSampler {
    num_true: i32,
    num_sampled: i32,
    unique: bool,
    range_max: i32,
    seed: i32,
}

impl LogUniformCandidateSampler {
    pub(crate) const NAME: &'static str = "LogUniformCandidateSampler";

    pub fn new(
        num_true: i32,
        num_sampled: i32,
        unique: bool,
        range_max: i32,
        seed: i32,
    ) -> Result<LogUniformCandidateSampler, InferError> {
        check_positive(Self::NAME, "num_true", num_true)?;
        check_positive(Self::NAME, "num_sampled", num_sampled)?;
        if unique && range_max < num_sampled {
            return Err(InferError::Configuration {
                op: Self::NAME,
                attr: "range_max",
                reason: format!(
                    "must be >= num_sampled ({}) when unique is true, got {}",
                    num_sampled, range_max
                ),
            });
        }
        Ok(LogUniformCandidateSampler {
            num_true,
            num_sampled,
            unique,
            range_max,
            seed,
        })
    }

    pub fn num_true(&self) -> i32 {
        self.num_true
    }

    pub fn num_sampled(&self) -> i32 {
        self.num_sampled
    }

    pub fn unique(&self) -> bool {
        self.unique
    }

    pub fn range_max(&self) -> i32 {
        self.range_max
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }
}

impl Operator for LogUniformCandidateSampler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn kind(&self) -> OpKind {
        OpKind::LogUniformCandidateSampler
    }

    fn input_names(&self) -> &'static [&'static str] {
        &["true_classes"]
    }

    fn output_names(&self) -> &'static [&'static str] {
        &[
            "sampled_candidates",
            "true_expected_count",
            "sampled_expected_count",
        ]
    }

    fn infer(&self, inputs: &InputList) -> Result<OutputList, InferError> {
        let true_classes = inputs.require(0)?;
        check_dtype(Self::NAME, "true_classes", true_classes, INT64)?;
        check_ndim(Self::NAME, "true_classes", true_classes, 2)?;
        check_num_true(Self::NAME, true_classes.shape(), self.num_true)?;

        let num_sampled = self.num_sampled as usize;
        let sampled_candidates = OutputMeta::new(vec![num_sampled], true_classes.dtype());
        let true_expected_count =
            OutputMeta::new(true_classes.shape().to_vec(), DataType::Float32);
        let sampled_expected_count = OutputMeta::new(vec![num_sampled], DataType::Float32);
        Ok([
            sampled_candidates,
            true_expected_count,
            sampled_expected_count,
        ]
        .into_iter()
        .collect())
    }
}

#[cfg(test)]
mod tests {
    use randop_testing::TestCases;

    use crate::operator::{InferError, InputList, Operator};
    use crate::value::{DataType, Operand, OutputMeta};

    use super::{LogUniformCandidateSampler, UniformCandidateSampler};

    #[test]
    fn test_uniform_candidate_sampler_infer() {
        let op = UniformCandidateSampler::new(1, 3, true, 4, 0, false).unwrap();
        let operands = [Operand::tensor(DataType::Int32, &[5, 1])];
        let outputs = op.infer(&InputList::from(&operands)).unwrap();

        assert_eq!(outputs.len(), op.output_names().len());
        assert_eq!(outputs[0], OutputMeta::new(vec![3], DataType::Int32));
        assert_eq!(outputs[1], OutputMeta::new(vec![5, 1], DataType::Float32));
        assert_eq!(outputs[2], OutputMeta::new(vec![3], DataType::Float32));
    }

    #[test]
    fn test_uniform_candidate_sampler_ctor() {
        #[derive(Debug)]
        struct Case {
            num_true: i32,
            num_sampled: i32,
            unique: bool,
            range_max: i32,
            seed: i32,
            expected_err_attr: Option<&'static str>,
        }

        let cases = [
            Case {
                num_true: 1,
                num_sampled: 3,
                unique: false,
                range_max: 4,
                seed: 0,
                expected_err_attr: None,
            },
            // num_sampled may exceed range_max when sampling with
            // replacement...
            Case {
                num_true: 1,
                num_sampled: 5,
                unique: false,
                range_max: 4,
                seed: 0,
                expected_err_attr: None,
            },
            // ...but not without.
            Case {
                num_true: 1,
                num_sampled: 5,
                unique: true,
                range_max: 4,
                seed: 0,
                expected_err_attr: Some("num_sampled"),
            },
            Case {
                num_true: 0,
                num_sampled: 3,
                unique: false,
                range_max: 4,
                seed: 0,
                expected_err_attr: Some("num_true"),
            },
            Case {
                num_true: 1,
                num_sampled: 0,
                unique: false,
                range_max: 4,
                seed: 0,
                expected_err_attr: Some("num_sampled"),
            },
            Case {
                num_true: 1,
                num_sampled: 3,
                unique: false,
                range_max: 0,
                seed: 0,
                expected_err_attr: Some("range_max"),
            },
            Case {
                num_true: 1,
                num_sampled: 3,
                unique: false,
                range_max: 4,
                seed: -1,
                expected_err_attr: Some("seed"),
            },
        ];

        cases.test_each(|case| {
            let result = UniformCandidateSampler::new(
                case.num_true,
                case.num_sampled,
                case.unique,
                case.range_max,
                case.seed,
                false,
            );
            match case.expected_err_attr {
                None => assert!(result.is_ok()),
                Some(expected_attr) => match result {
                    Err(InferError::Configuration { attr, .. }) => {
                        assert_eq!(attr, expected_attr)
                    }
                    other => panic!("expected Configuration error, got {:?}", other),
                },
            }
        });
    }

    #[test]
    fn test_uniform_candidate_sampler_invalid_operand() {
        let op = UniformCandidateSampler::new(2, 3, false, 10, 0, false).unwrap();

        // num_true mismatch.
        let operands = [Operand::tensor(DataType::Int32, &[5, 1])];
        assert_eq!(
            op.infer(&InputList::from(&operands)).err().unwrap(),
            InferError::InvalidShape {
                op: "UniformCandidateSampler",
                reason: "\"true_classes\" shape[1] (1) must equal num_true (2)".to_string(),
            }
        );

        // Rank must be 2.
        let operands = [Operand::tensor(DataType::Int32, &[5])];
        assert!(matches!(
            op.infer(&InputList::from(&operands)),
            Err(InferError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_log_uniform_candidate_sampler_infer() {
        let op = LogUniformCandidateSampler::new(2, 5, true, 5, 0).unwrap();
        let operands = [Operand::tensor(DataType::Int64, &[3, 2])];
        let outputs = op.infer(&InputList::from(&operands)).unwrap();

        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0], OutputMeta::new(vec![5], DataType::Int64));
        assert_eq!(outputs[1], OutputMeta::new(vec![3, 2], DataType::Float32));
        assert_eq!(outputs[2], OutputMeta::new(vec![5], DataType::Float32));
    }

    #[test]
    fn test_candidate_sampler_dtype_asymmetry() {
        // The log-uniform sampler requires i64 target classes where the
        // uniform sampler requires i32.
        let log_op = LogUniformCandidateSampler::new(1, 5, true, 5, 0).unwrap();
        let operands = [Operand::tensor(DataType::Int32, &[3, 1])];
        assert_eq!(
            log_op.infer(&InputList::from(&operands)).err().unwrap(),
            InferError::InvalidDtype {
                op: "LogUniformCandidateSampler",
                operand: "true_classes",
                actual: DataType::Int32,
                allowed: &[DataType::Int64],
            }
        );

        let uniform_op = UniformCandidateSampler::new(1, 3, false, 4, 0, false).unwrap();
        let operands = [Operand::tensor(DataType::Int64, &[3, 1])];
        assert_eq!(
            uniform_op.infer(&InputList::from(&operands)).err().unwrap(),
            InferError::InvalidDtype {
                op: "UniformCandidateSampler",
                operand: "true_classes",
                actual: DataType::Int64,
                allowed: &[DataType::Int32],
            }
        );
    }

    #[test]
    fn test_log_uniform_candidate_sampler_ctor() {
        assert!(matches!(
            LogUniformCandidateSampler::new(1, 6, true, 5, 0),
            Err(InferError::Configuration {
                attr: "range_max",
                ..
            })
        ));
        // With replacement the limit does not apply.
        assert!(LogUniformCandidateSampler::new(1, 6, false, 5, 0).is_ok());
        // Seed may be any integer here.
        assert!(LogUniformCandidateSampler::new(1, 5, true, 5, -7).is_ok());
    }
}
