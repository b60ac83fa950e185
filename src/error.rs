use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Every way a single pipeline run can fail.
///
/// All variants point back into the whitespace-stripped expression, so a
/// caller holding a `CalcError` can render it as a full miette report.
#[derive(Error, Debug, Diagnostic)]
pub enum CalcError {
    #[error("Unexpected character '{token}'")]
    #[diagnostic(
        code(calc::invalid_character),
        help("only digits, `.` and `+-*/().^√` are allowed")
    )]
    InvalidCharacter {
        #[source_code]
        src: NamedSource<String>,

        #[label("this character")]
        bad_bit: SourceSpan,

        token: char,
    },

    #[error("Unbalanced parentheses")]
    #[diagnostic(
        code(calc::unbalanced_parentheses),
        help("every `(` needs a matching `)`")
    )]
    UnbalancedParentheses {
        #[source_code]
        src: NamedSource<String>,

        #[label("no partner for this one")]
        bad_bit: SourceSpan,
    },

    #[error("Not enough operands for '{op}'")]
    #[diagnostic(
        code(calc::insufficient_operands),
        help("every operator, `√` included, takes a value on each side")
    )]
    InsufficientOperands {
        #[source_code]
        src: NamedSource<String>,

        #[label("needs two operands")]
        bad_bit: SourceSpan,

        op: String,
    },

    #[error("Division by zero")]
    #[diagnostic(code(calc::division_by_zero))]
    DivisionByZero {
        #[source_code]
        src: NamedSource<String>,

        #[label("right-hand side is zero")]
        bad_bit: SourceSpan,
    },

    #[error("Square root of a negative number ({value})")]
    #[diagnostic(
        code(calc::negative_sqrt),
        help("the value on the left of `√` must not be negative")
    )]
    NegativeSqrt {
        #[source_code]
        src: NamedSource<String>,

        #[label("applied here")]
        bad_bit: SourceSpan,

        value: f64,
    },

    #[error("Unknown operator '{op}'")]
    #[diagnostic(code(calc::unknown_operator))]
    UnknownOperator {
        #[source_code]
        src: NamedSource<String>,

        #[label("not an operator or a number")]
        bad_bit: SourceSpan,

        op: String,
    },

    #[error("Expression did not reduce to a single value ({remaining} left)")]
    #[diagnostic(
        code(calc::result_mismatch),
        help("check for missing operators between numbers")
    )]
    ResultMismatch {
        #[source_code]
        src: NamedSource<String>,

        #[label("this expression")]
        bad_bit: SourceSpan,

        remaining: usize,
    },
}

pub(crate) fn source(whole: &str) -> NamedSource<String> {
    NamedSource::new("<expression>", whole.to_string())
}
