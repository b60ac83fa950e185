use std::fmt::Display;

use miette::SourceSpan;

use crate::error::{CalcError, source};

/// Characters other than digits that an expression may contain.
pub const SYMBOLS: &str = "+-*/().^√";

/// Removes every whitespace character, so `"2 + 3"` becomes `"2+3"`.
pub fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Rejects the expression at the first character outside the alphabet.
pub fn validate(expr: &str) -> Result<(), CalcError> {
    match expr
        .char_indices()
        .find(|&(_, c)| !c.is_ascii_digit() && !SYMBOLS.contains(c))
    {
        Some((offset, token)) => Err(CalcError::InvalidCharacter {
            src: source(expr),
            bad_bit: SourceSpan::from(offset..offset + token.len_utf8()),
            token,
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Root,
}

impl Op {
    pub fn from_char(c: char) -> Option<Op> {
        Some(match c {
            '+' => Op::Plus,
            '-' => Op::Minus,
            '*' => Op::Star,
            '/' => Op::Slash,
            '^' => Op::Caret,
            '√' => Op::Root,
            _ => return None,
        })
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Plus => '+',
            Op::Minus => '-',
            Op::Star => '*',
            Op::Slash => '/',
            Op::Caret => '^',
            Op::Root => '√',
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Op::Plus | Op::Minus => 1,
            Op::Star | Op::Slash => 2,
            Op::Caret | Op::Root => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    /// Byte offset of `literal` in the stripped expression.
    pub offset: usize,
}

impl Token<'_> {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.offset..self.offset + self.literal.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// The literal is kept as written; it is only parsed during evaluation.
    Number,
    Operator(Op),
    LeftParen,
    RightParen,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number => write!(f, "NUMBER {lit}"),
            TokenKind::Operator(Op::Plus) => write!(f, "PLUS {lit}"),
            TokenKind::Operator(Op::Minus) => write!(f, "MINUS {lit}"),
            TokenKind::Operator(Op::Star) => write!(f, "STAR {lit}"),
            TokenKind::Operator(Op::Slash) => write!(f, "SLASH {lit}"),
            TokenKind::Operator(Op::Caret) => write!(f, "CARET {lit}"),
            TokenKind::Operator(Op::Root) => write!(f, "ROOT {lit}"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit}"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit}"),
        }
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    pub byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }

    pub fn whole(&self) -> &'de str {
        self.whole
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, CalcError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chars = self.rest.chars();
        let c = chars.next()?;
        let literal = &self.rest[..c.len_utf8()];
        let cur = self.rest;
        let offset = self.byte;
        self.rest = chars.as_str();
        self.byte += c.len_utf8();

        let process = |kind: TokenKind| Some(Ok(Token { kind, literal, offset }));

        match c {
            '(' => process(TokenKind::LeftParen),
            ')' => process(TokenKind::RightParen),
            '0'..='9' | '.' => {
                // Greedy: `1.2.3` stays one literal and is rejected only when parsed.
                let first_non_digit = cur
                    .find(|c| !matches!(c, '0'..='9' | '.'))
                    .unwrap_or(cur.len());

                let literal = &cur[..first_non_digit];

                let extra_bytes = literal.len() - c.len_utf8();
                self.byte += extra_bytes;
                self.rest = &self.rest[extra_bytes..];

                Some(Ok(Token {
                    kind: TokenKind::Number,
                    literal,
                    offset,
                }))
            }
            c => match Op::from_char(c) {
                Some(op) => process(TokenKind::Operator(op)),
                None => Some(Err(CalcError::InvalidCharacter {
                    src: source(self.whole),
                    bad_bit: SourceSpan::from(offset..self.byte),
                    token: c,
                })),
            },
        }
    }
}
