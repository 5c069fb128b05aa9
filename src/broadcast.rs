//! Shape broadcasting following NumPy's rules.

use crate::operator::InferError;

/// Compute the result of broadcasting `lhs` and `rhs` together.
///
/// Dimensions are compared from the trailing edge. Two dimensions are
/// compatible if they are equal or one of them is 1; the shorter shape is
/// treated as if padded with leading 1-sized dimensions. See
/// <https://numpy.org/doc/stable/user/basics.broadcasting.html>.
///
/// `op` names the operator on whose behalf the broadcast is performed and is
/// reported in errors.
pub fn broadcast_shapes(
    op: &'static str,
    lhs: &[usize],
    rhs: &[usize],
) -> Result<Vec<usize>, InferError> {
    let ndim = lhs.len().max(rhs.len());
    let lhs_pad = ndim - lhs.len();
    let rhs_pad = ndim - rhs.len();

    let mut result = Vec::with_capacity(ndim);
    for i in 0..ndim {
        let a = if i < lhs_pad { 1 } else { lhs[i - lhs_pad] };
        let b = if i < rhs_pad { 1 } else { rhs[i - rhs_pad] };
        let dim = match (a, b) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(InferError::IncompatibleShapes {
                    op,
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                });
            }
        };
        result.push(dim);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use randop_testing::TestCases;

    use super::broadcast_shapes;
    use crate::operator::InferError;

    #[test]
    fn test_broadcast_shapes() {
        #[derive(Debug)]
        struct Case {
            lhs: Vec<usize>,
            rhs: Vec<usize>,
            expected: Vec<usize>,
        }

        let cases = [
            Case {
                lhs: vec![4, 16],
                rhs: vec![4, 16],
                expected: vec![4, 16],
            },
            Case {
                lhs: vec![3, 1],
                rhs: vec![1, 5],
                expected: vec![3, 5],
            },
            // Shorter shape is padded with leading 1s.
            Case {
                lhs: vec![2],
                rhs: vec![3, 2],
                expected: vec![3, 2],
            },
            // Scalar broadcasts against anything.
            Case {
                lhs: vec![],
                rhs: vec![2, 2],
                expected: vec![2, 2],
            },
            Case {
                lhs: vec![],
                rhs: vec![],
                expected: vec![],
            },
            // Zero-sized dims broadcast only against 1 or an equal dim.
            Case {
                lhs: vec![0],
                rhs: vec![1],
                expected: vec![0],
            },
        ];

        cases.test_each(|case| {
            let result = broadcast_shapes("Test", &case.lhs, &case.rhs).unwrap();
            assert_eq!(result, case.expected);

            // Broadcasting is symmetric.
            let result = broadcast_shapes("Test", &case.rhs, &case.lhs).unwrap();
            assert_eq!(result, case.expected);
        });
    }

    #[test]
    fn test_broadcast_shapes_incompatible() {
        let err = broadcast_shapes("Gamma", &[2, 3], &[4, 5]).err().unwrap();
        assert_eq!(
            err,
            InferError::IncompatibleShapes {
                op: "Gamma",
                lhs: vec![2, 3],
                rhs: vec![4, 5],
            }
        );

        let err = broadcast_shapes("Gamma", &[2, 3], &[3, 3, 4]).err().unwrap();
        assert!(matches!(err, InferError::IncompatibleShapes { .. }));
    }
}
