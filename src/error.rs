//! The recoverable half of the two-tier error model: a single `ParseError`
//! type covering every lexical and grammatical failure. The other tier
//! (fatal invariant violations — an unimplemented operator reaching
//! `compute`, killing a node with remaining users, and so on) is never a
//! `Result` at all; those paths `panic!` directly at the point of the
//! violation, per the error-handling design.

use core::fmt;

use crate::lexer::LexError;

/// A recoverable failure while tokenizing or parsing a source file. Carries
/// just enough to build a one-line diagnostic; the CLI is the only thing
/// that turns this into process output (via `anyhow`) and an exit code.
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub pos: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, pos: usize) -> Self {
        ParseError {
            message: message.into(),
            pos,
        }
    }

    pub(crate) fn from_lex(e: LexError) -> Self {
        ParseError {
            message: e.message,
            pos: e.pos,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error at byte {}: {}", self.pos, self.message)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_message() {
        let err = ParseError::new("unexpected token ';'", 12);
        assert_eq!(err.to_string(), "parse error at byte 12: unexpected token ';'");
    }
}
