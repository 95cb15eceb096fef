//! Binary operator implementations.

use super::EvalError;
use super::expr::{BinaryOp, ComparisonOp};

/// Evaluate a binary operation on two integers.
///
/// Uses wrapping arithmetic to prevent panics on overflow. Division
/// truncates toward zero and the remainder takes the sign of the dividend,
/// so `(a / b) * b + a % b == a`.
pub(super) fn eval_binary_int(op: BinaryOp, left: i64, right: i64) -> Result<i64, EvalError> {
    match op {
        BinaryOp::Add => Ok(left.wrapping_add(right)),
        BinaryOp::Sub => Ok(left.wrapping_sub(right)),
        BinaryOp::Mul => Ok(left.wrapping_mul(right)),
        BinaryOp::Div => {
            if right == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                // Use wrapping_div to handle i64::MIN / -1 case
                Ok(left.wrapping_div(right))
            }
        }
        BinaryOp::Rem => {
            if right == 0 {
                Err(EvalError::ModuloByZero)
            } else {
                Ok(left.wrapping_rem(right))
            }
        }
    }
}

pub(super) fn eval_comparison(op: ComparisonOp, left: i64, right: i64) -> bool {
    match op {
        ComparisonOp::Eq => left == right,
        ComparisonOp::Neq => left != right,
        ComparisonOp::Lt => left < right,
        ComparisonOp::Gt => left > right,
        ComparisonOp::Le => left <= right,
        ComparisonOp::Ge => left >= right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_add() {
        assert_eq!(eval_binary_int(BinaryOp::Add, 2, 3).unwrap(), 5);
        assert_eq!(eval_binary_int(BinaryOp::Add, -5, 3).unwrap(), -2);
    }

    #[test]
    fn test_int_sub() {
        assert_eq!(eval_binary_int(BinaryOp::Sub, 10, 4).unwrap(), 6);
        assert_eq!(eval_binary_int(BinaryOp::Sub, 3, 10).unwrap(), -7);
    }

    #[test]
    fn test_int_div_truncates_toward_zero() {
        assert_eq!(eval_binary_int(BinaryOp::Div, 7, 2).unwrap(), 3);
        assert_eq!(eval_binary_int(BinaryOp::Div, -7, 2).unwrap(), -3);
        assert_eq!(eval_binary_int(BinaryOp::Div, 7, -2).unwrap(), -3);
        assert_eq!(eval_binary_int(BinaryOp::Div, -7, -2).unwrap(), 3);
    }

    #[test]
    fn test_int_rem_follows_dividend() {
        assert_eq!(eval_binary_int(BinaryOp::Rem, 7, 3).unwrap(), 1);
        assert_eq!(eval_binary_int(BinaryOp::Rem, -7, 2).unwrap(), -1);
        assert_eq!(eval_binary_int(BinaryOp::Rem, 7, -2).unwrap(), 1);
    }

    #[test]
    fn test_div_and_rem_identity() {
        for (a, b) in [(17, 5), (-17, 5), (17, -5), (-17, -5), (0, 3)] {
            let q = eval_binary_int(BinaryOp::Div, a, b).unwrap();
            let r = eval_binary_int(BinaryOp::Rem, a, b).unwrap();
            assert_eq!(q * b + r, a, "a = {}, b = {}", a, b);
        }
    }

    #[test]
    fn test_int_div_by_zero() {
        let result = eval_binary_int(BinaryOp::Div, 10, 0);
        assert!(matches!(result, Err(EvalError::DivisionByZero)));
        let result = eval_binary_int(BinaryOp::Rem, 10, 0);
        assert!(matches!(result, Err(EvalError::ModuloByZero)));
    }

    #[test]
    fn test_int_wrapping_overflow() {
        // Test that we wrap on overflow rather than panic
        let result = eval_binary_int(BinaryOp::Add, i64::MAX, 1).unwrap();
        assert_eq!(result, i64::MIN);

        let result = eval_binary_int(BinaryOp::Div, i64::MIN, -1).unwrap();
        assert_eq!(result, i64::MIN);

        let result = eval_binary_int(BinaryOp::Rem, i64::MIN, -1).unwrap();
        assert_eq!(result, 0);
    }

    #[test]
    fn test_comparisons() {
        assert!(eval_comparison(ComparisonOp::Lt, 1, 2));
        assert!(!eval_comparison(ComparisonOp::Gt, 1, 2));
        assert!(eval_comparison(ComparisonOp::Le, 2, 2));
        assert!(eval_comparison(ComparisonOp::Ge, 3, 2));
        assert!(eval_comparison(ComparisonOp::Eq, -1, -1));
        assert!(eval_comparison(ComparisonOp::Neq, 0, 1));
    }
}
