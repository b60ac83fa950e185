use miette::SourceSpan;
use tracing::trace;

use crate::{
    error::{CalcError, source},
    lex::{Op, Token, TokenKind},
    parse::Rpn,
};

/// Runs a postfix sequence on a value stack.
///
/// Every non-number token pops two values, `b` from the top and then `a`,
/// and pushes one. `√` follows the same rule: it takes the root of `a` and
/// drops `b` unused. A number literal that fails to parse is treated like an
/// unrecognised operator.
pub fn eval_rpn(rpn: &Rpn<'_>) -> Result<f64, CalcError> {
    let whole = rpn.whole();
    let mut stack: Vec<f64> = Vec::new();

    for token in rpn.tokens() {
        if token.kind == TokenKind::Number {
            if let Ok(n) = token.literal.parse::<f64>() {
                stack.push(n);
                trace!(literal = token.literal, ?stack, "push");
                continue;
            }
        }

        let [.., a, b] = stack[..] else {
            return Err(CalcError::InsufficientOperands {
                src: source(whole),
                bad_bit: token.span(),
                op: token.literal.to_string(),
            });
        };
        stack.truncate(stack.len() - 2);

        let value = match token.kind {
            TokenKind::Operator(op) => apply(op, a, b, whole, token)?,
            _ => {
                return Err(CalcError::UnknownOperator {
                    src: source(whole),
                    bad_bit: token.span(),
                    op: token.literal.to_string(),
                });
            }
        };
        stack.push(value);
        trace!(op = token.literal, a, b, ?stack, "reduce");
    }

    match stack[..] {
        [value] => Ok(value),
        _ => Err(CalcError::ResultMismatch {
            src: source(whole),
            bad_bit: SourceSpan::from(0..whole.len()),
            remaining: stack.len(),
        }),
    }
}

fn apply(op: Op, a: f64, b: f64, whole: &str, token: &Token<'_>) -> Result<f64, CalcError> {
    Ok(match op {
        Op::Plus => a + b,
        Op::Minus => a - b,
        Op::Star => a * b,
        Op::Slash => {
            if b == 0.0 {
                return Err(CalcError::DivisionByZero {
                    src: source(whole),
                    bad_bit: token.span(),
                });
            }
            a / b
        }
        Op::Caret => pow_truncated(a, b),
        Op::Root => {
            if a < 0.0 {
                return Err(CalcError::NegativeSqrt {
                    src: source(whole),
                    bad_bit: token.span(),
                    value: a,
                });
            }
            a.sqrt()
        }
    })
}

/// Multiplies `1.0` by `a` exactly `b as i64` times.
///
/// `b` is truncated toward zero, and a count of zero or less leaves the
/// identity, so `2^-1` and `2^0.5` are both `1`. The loop ends early once the
/// accumulator is zero, infinite or NaN, or `|a| == 1`; from then on only the
/// sign can still change.
pub fn pow_truncated(a: f64, b: f64) -> f64 {
    let count = b as i64;
    let mut result = 1.0;
    let mut done = 0;
    while done < count {
        result *= a;
        done += 1;
        if result == 0.0 || !result.is_finite() || a.abs() == 1.0 {
            if a.is_sign_negative() && (count - done) % 2 == 1 {
                result = -result;
            }
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::Parser;

    fn run(input: &str) -> Result<f64, CalcError> {
        eval_rpn(&Parser::new(input).to_rpn().expect("converts"))
    }

    #[rstest]
    #[case("2+3*4", 14.0)]
    #[case("(2+3)*4", 20.0)]
    #[case("2-3-4", -5.0)]
    #[case("8/2/2", 2.0)]
    #[case("7/2", 3.5)]
    #[case("2^3", 8.0)]
    #[case("2^10", 1024.0)]
    #[case("2^0", 1.0)]
    #[case("2^(0-1)", 1.0)]
    #[case("2^2.9", 4.0)]
    #[case("2^3^2", 64.0)]
    #[case("4√9", 2.0)]
    #[case("4√0", 2.0)]
    #[case("9√4+1", 4.0)]
    #[case("1.5+.5", 2.0)]
    #[case("3.", 3.0)]
    fn evaluates(#[case] input: &str, #[case] expected: f64) {
        assert_eq!(run(input).expect("evaluates"), expected);
    }

    #[rstest]
    #[case("√9")]
    #[case("9√")]
    #[case("1+")]
    #[case("2^-1")]
    #[case("1.2.3")]
    #[case("1+1.2.3")]
    fn insufficient_operands(#[case] input: &str) {
        assert!(matches!(
            run(input),
            Err(CalcError::InsufficientOperands { .. })
        ));
    }

    #[test]
    fn insufficient_operands_names_the_operator() {
        match run("9√") {
            Err(CalcError::InsufficientOperands { op, bad_bit, .. }) => {
                assert_eq!(op, "√");
                assert_eq!(bad_bit.offset(), 1);
            }
            other => panic!("expected InsufficientOperands, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero() {
        assert!(matches!(run("10/0"), Err(CalcError::DivisionByZero { .. })));
        assert!(matches!(
            run("1/(2-2)"),
            Err(CalcError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn negative_root() {
        match run("(0-4)√9") {
            Err(CalcError::NegativeSqrt { value, .. }) => assert_eq!(value, -4.0),
            other => panic!("expected NegativeSqrt, got {other:?}"),
        }
    }

    #[test]
    fn malformed_literal_becomes_unknown_operator() {
        match run("1+2*3.3.3") {
            Err(CalcError::UnknownOperator { op, .. }) => assert_eq!(op, "3.3.3"),
            other => panic!("expected UnknownOperator, got {other:?}"),
        }
    }

    #[rstest]
    #[case("", 0)]
    #[case("()", 0)]
    #[case("12.(3)", 2)]
    fn result_mismatch(#[case] input: &str, #[case] left: usize) {
        match run(input) {
            Err(CalcError::ResultMismatch { remaining, .. }) => assert_eq!(remaining, left),
            other => panic!("expected ResultMismatch, got {other:?}"),
        }
    }

    #[rstest]
    #[case(2.0, 3.0, 8.0)]
    #[case(2.0, 0.0, 1.0)]
    #[case(2.0, -1.0, 1.0)]
    #[case(2.0, -0.5, 1.0)]
    #[case(2.0, 2.9, 4.0)]
    #[case(-2.0, 3.0, -8.0)]
    #[case(-2.0, 2.0, 4.0)]
    #[case(1.0, 1e18, 1.0)]
    #[case(-1.0, 1e15, 1.0)]
    #[case(-1.0, 1e15 + 1.0, -1.0)]
    #[case(0.5, 1e12, 0.0)]
    #[case(10.0, 1e12, f64::INFINITY)]
    #[case(-10.0, 1e12, f64::INFINITY)]
    #[case(-10.0, 1e12 + 1.0, f64::NEG_INFINITY)]
    #[case(2.0, f64::NAN, 1.0)]
    fn truncated_power(#[case] a: f64, #[case] b: f64, #[case] expected: f64) {
        assert_eq!(pow_truncated(a, b), expected);
    }

    #[test]
    fn truncated_power_keeps_nan() {
        assert!(pow_truncated(f64::NAN, 2.0).is_nan());
    }

    #[test]
    fn truncated_power_matches_plain_loop_for_small_counts() {
        for a in [-3.0, -0.5, 0.0, 0.7, 1.5, 3.0] {
            for n in 0..40 {
                let mut expected = 1.0;
                for _ in 0..n {
                    expected *= a;
                }
                assert_eq!(pow_truncated(a, n as f64), expected, "{a}^{n}");
            }
        }
    }
}
