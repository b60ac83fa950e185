pub mod error;
pub mod eval;
pub mod lex;
pub mod parse;
pub mod session;

use tracing::debug;

pub use error::CalcError;
pub use lex::Lexer;
pub use parse::Parser;
pub use session::Session;

/// Shown in place of the final result when the primary run fails.
pub const ERROR_MARKER: &str = "Error";

/// Validates, converts and evaluates an already whitespace-stripped expression.
pub fn calculate(expr: &str) -> Result<f64, CalcError> {
    lex::validate(expr)?;
    let rpn = Parser::new(expr).to_rpn()?;
    debug!(%rpn, "converted to postfix");
    eval::eval_rpn(&rpn)
}

/// Fixed two-decimal rendering used for both results.
pub fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

/// Outcome of both pipeline runs for one submission.
#[derive(Debug)]
pub struct Evaluation {
    /// The expression with whitespace removed.
    pub expression: String,
    pub result: Result<f64, CalcError>,
    /// Value of the expression with every `(` removed, if that run succeeded.
    /// Only computed when `result` is `Ok`.
    pub intermediate: Option<f64>,
}

impl Evaluation {
    pub fn new(input: &str) -> Self {
        let expression = lex::strip_whitespace(input);
        let result = calculate(&expression);
        debug!(%expression, ?result, "final run");

        let intermediate = match result {
            Ok(_) => {
                let relaxed = expression.replace('(', "");
                match calculate(&relaxed) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        debug!(%relaxed, error = %e, "intermediate run failed");
                        None
                    }
                }
            }
            Err(_) => None,
        };

        Evaluation {
            expression,
            result,
            intermediate,
        }
    }

    /// Renders `(final, intermediate)` for display.
    pub fn render(&self) -> (String, String) {
        match &self.result {
            Ok(value) => (
                format_value(*value),
                self.intermediate.map(format_value).unwrap_or_default(),
            ),
            Err(e) => (ERROR_MARKER.to_string(), e.to_string()),
        }
    }
}

/// Evaluates user input and returns the final and intermediate strings.
///
/// Never fails: a failing primary run yields [`ERROR_MARKER`] and the error
/// message, and a failing intermediate run yields an empty string.
pub fn evaluate(expression: &str) -> (String, String) {
    Evaluation::new(expression).render()
}
