use std::fmt::Display;

use miette::SourceSpan;
use tracing::trace;

use crate::{
    Lexer,
    error::{CalcError, source},
    lex::{Token, TokenKind},
};

/// Shunting-yard converter from infix tokens to postfix order.
pub struct Parser<'de> {
    whole: &'de str,
    lexer: Lexer<'de>,
}

/// A postfix token sequence. Never contains parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct Rpn<'de> {
    pub(crate) whole: &'de str,
    tokens: Vec<Token<'de>>,
}

impl<'de> Rpn<'de> {
    pub fn tokens(&self) -> &[Token<'de>] {
        &self.tokens
    }

    /// The expression this sequence was converted from.
    pub fn whole(&self) -> &'de str {
        self.whole
    }
}

impl Display for Rpn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens = self.tokens.iter();
        if let Some(first) = tokens.next() {
            write!(f, "{}", first.literal)?;
        }
        for token in tokens {
            write!(f, " {}", token.literal)?;
        }
        Ok(())
    }
}

impl<'de> Parser<'de> {
    pub fn new(whole: &'de str) -> Self {
        Parser {
            whole,
            lexer: Lexer::new(whole),
        }
    }

    pub fn to_rpn(self) -> Result<Rpn<'de>, CalcError> {
        let whole = self.whole;
        let unbalanced = |bad_bit: SourceSpan| CalcError::UnbalancedParentheses {
            src: source(whole),
            bad_bit,
        };

        let mut output: Vec<Token<'de>> = Vec::new();
        let mut operators: Vec<Token<'de>> = Vec::new();

        for token in self.lexer {
            let token = token?;
            match token.kind {
                TokenKind::Number => output.push(token),
                TokenKind::Operator(op) => {
                    // `>=` makes every operator left-associative, `^` included.
                    while let Some(top) = operators.pop() {
                        match top.kind {
                            TokenKind::Operator(prev) if prev.precedence() >= op.precedence() => {
                                output.push(top);
                            }
                            _ => {
                                operators.push(top);
                                break;
                            }
                        }
                    }
                    operators.push(token);
                }
                TokenKind::LeftParen => operators.push(token),
                TokenKind::RightParen => loop {
                    let Some(top) = operators.pop() else {
                        return Err(unbalanced(token.span()));
                    };
                    if top.kind == TokenKind::LeftParen {
                        break;
                    }
                    output.push(top);
                },
            }
            trace!(?token, depth = operators.len(), "shunted");
        }

        while let Some(top) = operators.pop() {
            if matches!(top.kind, TokenKind::LeftParen | TokenKind::RightParen) {
                return Err(unbalanced(top.span()));
            }
            output.push(top);
        }

        Ok(Rpn {
            whole,
            tokens: output,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn rpn(input: &str) -> String {
        Parser::new(input).to_rpn().expect("converts").to_string()
    }

    #[rstest]
    #[case("2+3*4", "2 3 4 * +")]
    #[case("(2+3)*4", "2 3 + 4 *")]
    #[case("2-3-4", "2 3 - 4 -")]
    #[case("8/2/2", "8 2 / 2 /")]
    #[case("2^3^2", "2 3 ^ 2 ^")]
    #[case("4√9", "4 9 √")]
    #[case("2*3√4", "2 3 4 √ *")]
    #[case("2^-1", "2 ^ 1 -")]
    #[case("((1))", "1")]
    #[case("1.2.3+4", "1.2.3 4 +")]
    #[case("", "")]
    fn converts_to_postfix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(rpn(input), expected);
    }

    #[rstest]
    #[case("5+(3", 2)]
    #[case("3)", 1)]
    #[case("(", 0)]
    #[case("2+3)*4", 3)]
    #[case("(1))", 3)]
    fn unbalanced_parentheses(#[case] input: &str, #[case] at: usize) {
        match Parser::new(input).to_rpn() {
            Err(CalcError::UnbalancedParentheses { bad_bit, .. }) => {
                assert_eq!(bad_bit.offset(), at);
            }
            other => panic!("expected UnbalancedParentheses, got {other:?}"),
        }
    }

    #[test]
    fn consecutive_operators_are_not_rejected_here() {
        assert_eq!(rpn("1++2"), "1 + 2 +");
    }

    #[test]
    fn output_never_contains_parentheses() {
        let rpn = Parser::new("((1+2)*(3-(4/5)))").to_rpn().expect("converts");
        assert!(
            rpn.tokens()
                .iter()
                .all(|t| !matches!(t.kind, TokenKind::LeftParen | TokenKind::RightParen))
        );
        assert_eq!(rpn.whole(), "((1+2)*(3-(4/5)))");
    }
}
