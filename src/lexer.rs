//! A one-token-lookahead scanner over the source text.
//!
//! `Lexer` never buffers a token stream; `Parser` (in [`crate::parser`])
//! pulls tokens one at a time with [`Lexer::next_token`]/[`Lexer::next_binary_op`]
//! and decides from context which one it needs next — mirroring the
//! original tokenizer's split between "read whatever's next" and "read
//! specifically a binary operator".

use crate::ir::SourceSpan;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    EndOfFile,
    EndOfLine,
    Comma,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    If,
    Else,
    While,
    VarDecl,
    FunctionDecl,
    Return,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftCurly,
    RightCurly,
    Identifier,
    DataType,
    /// An operator symbol, unresolved as unary/binary — [`crate::op::Op`]
    /// disambiguates by parse position.
    Symbol,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub pos: usize,
}

impl Token {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::new(self.text.clone(), self.pos)
    }

    pub fn eof(pos: usize) -> Self {
        Token {
            text: String::new(),
            kind: TokenKind::EndOfFile,
            pos,
        }
    }
}

/// A recoverable lexical failure. In practice the only one: an unterminated
/// string literal. Every other byte the scanner doesn't recognize still
/// comes back as a one-char `Symbol` token rather than an error — same as
/// the original tokenizer's catch-all `Undefined` tag — leaving it to the
/// parser to decide whether that token was expected anywhere. Folded into
/// the same error channel [`crate::parser::ParseError`] uses.
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub pos: usize,
}

pub struct Lexer<'a> {
    source: &'a [u8],
    at: usize,
}

fn is_white(c: u8) -> bool {
    matches!(c, b' ' | b'\n' | b'\t' | b'\r')
}

fn is_num(c: u8) -> bool {
    c.is_ascii_digit()
}

fn is_alpha(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphabetic()
}

fn is_alphanum(c: u8) -> bool {
    is_num(c) || is_alpha(c)
}

fn is_bracket(c: u8) -> bool {
    matches!(c, b'[' | b']' | b'{' | b'}' | b'(' | b')')
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source: source.as_bytes(),
            at: 0,
        }
    }

    fn eof(&self) -> bool {
        self.at >= self.source.len()
    }

    /// Current byte offset, for error reporting on productions that need a
    /// position before they've read a token of their own (e.g. an empty
    /// block).
    pub fn pos(&self) -> usize {
        self.at
    }

    fn peek(&self) -> u8 {
        if self.eof() {
            0
        } else {
            self.source[self.at]
        }
    }

    fn is_at_comment(&self) -> bool {
        self.peek() == b'#'
    }

    fn skip_white(&mut self) {
        while is_white(self.peek()) {
            self.at += 1;
        }
    }

    fn skip_comment(&mut self) {
        if !self.is_at_comment() {
            return;
        }
        while !self.eof() && self.peek() != b'\n' {
            self.at += 1;
        }
    }

    fn skip_white_and_comment(&mut self) {
        self.skip_white();
        while self.is_at_comment() {
            self.skip_comment();
            self.skip_white();
        }
    }

    /// The next non-whitespace, non-comment byte, without consuming it.
    /// Used by the parser to look past an expression for its terminator.
    pub fn peek_non_white(&mut self) -> u8 {
        self.skip_white_and_comment();
        self.peek()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }

    fn parse_number_literal(&mut self) -> (String, TokenKind) {
        let start = self.at;
        while is_num(self.peek()) {
            self.at += 1;
        }
        let mut kind = TokenKind::IntLiteral;
        if self.peek() == b'.' {
            kind = TokenKind::FloatLiteral;
            self.at += 1;
            while is_num(self.peek()) {
                self.at += 1;
            }
        }
        (self.slice(start, self.at), kind)
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.at;
        while is_alphanum(self.peek()) {
            self.at += 1;
        }
        self.slice(start, self.at)
    }

    fn parse_string_literal(&mut self) -> Result<String, LexError> {
        let start = self.at;
        self.at += 1;
        while !self.eof() && self.peek() != b'"' {
            if self.peek() == b'\\' {
                self.at += 1;
            }
            self.at += 1;
        }
        if self.eof() {
            return Err(LexError {
                message: "unterminated string literal".to_string(),
                pos: start,
            });
        }
        self.at += 1;
        Ok(self.slice(start, self.at))
    }

    /// Identifier optionally suffixed by repeated `*`, e.g. `Int***`.
    pub fn next_type(&mut self) -> Result<Token, LexError> {
        self.skip_white_and_comment();
        if self.eof() {
            return Ok(Token::eof(self.at));
        }
        let start = self.at;
        let mut text = self.parse_identifier();
        while self.peek() == b'*' {
            text.push('*');
            self.at += 1;
        }
        Ok(Token {
            text,
            kind: TokenKind::DataType,
            pos: start,
        })
    }

    /// Read specifically a binary-operator-shaped token: the two-char forms
    /// `next_token` can't produce, plus bare `=` and arbitrary punctuation.
    /// Never fails — an unrecognized byte still becomes a one-char token,
    /// same as the original tokenizer's `Undefined`-tagged fallback; it is
    /// the parser's job (mirroring `Parser::read_binop`) to reject a token
    /// whose text isn't a known operator symbol.
    pub fn next_binary_op(&mut self) -> Token {
        self.skip_white_and_comment();
        if self.eof() {
            return Token::eof(self.at);
        }
        let start = self.at;
        let c = self.peek();
        match c {
            b'+' | b'-' | b'*' | b'/' | b'%' | b'^' => {
                self.at += 1;
            }
            b'&' | b'|' | b'=' => {
                self.at += 1;
                if self.peek() == c {
                    self.at += 1;
                }
            }
            b'<' | b'>' => {
                self.at += 1;
                if self.peek() == b'=' {
                    self.at += 1;
                }
            }
            _ => {
                self.at += 1;
            }
        }
        self.symbol_token(start)
    }

    fn symbol_token(&self, start: usize) -> Token {
        Token {
            text: self.slice(start, self.at),
            kind: TokenKind::Symbol,
            pos: start,
        }
    }

    /// Read a unary-position operator: always consumes exactly one byte. The
    /// recognized unary symbols are `- ! ~ & *`; anything else still comes
    /// back as a one-char `Symbol` token rather than an error — this is also
    /// how `next_token` falls through for punctuation it doesn't otherwise
    /// recognize (e.g. `:` in a `let` type annotation), matching the
    /// original's catch-all `Undefined`-tagged single-char token.
    pub fn next_unary_op(&mut self) -> Token {
        self.skip_white_and_comment();
        if self.eof() {
            return Token::eof(self.at);
        }
        let start = self.at;
        self.at += 1;
        self.symbol_token(start)
    }

    /// Read whatever the next token is, dispatching keywords. Cannot
    /// produce `DataType`; use [`Lexer::next_type`] when the grammar
    /// position expects one.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_white_and_comment();
        if self.eof() {
            return Ok(Token::eof(self.at));
        }
        let start = self.at;
        let c = self.peek();

        if c == b';' {
            self.at += 1;
            return Ok(Token { text: ";".into(), kind: TokenKind::EndOfLine, pos: start });
        }
        if c == b',' {
            self.at += 1;
            return Ok(Token { text: ",".into(), kind: TokenKind::Comma, pos: start });
        }
        if c == b'"' {
            let text = self.parse_string_literal()?;
            return Ok(Token { text, kind: TokenKind::StringLiteral, pos: start });
        }
        if is_bracket(c) {
            self.at += 1;
            let kind = match c {
                b'(' => TokenKind::LeftParen,
                b')' => TokenKind::RightParen,
                b'[' => TokenKind::LeftBracket,
                b']' => TokenKind::RightBracket,
                b'{' => TokenKind::LeftCurly,
                b'}' => TokenKind::RightCurly,
                _ => unreachable!("is_bracket only matches these bytes"),
            };
            return Ok(Token { text: (c as char).to_string(), kind, pos: start });
        }
        if is_num(c) {
            let (text, kind) = self.parse_number_literal();
            return Ok(Token { text, kind, pos: start });
        }
        if is_alpha(c) {
            let text = self.parse_identifier();
            let kind = match text.as_str() {
                "if" => TokenKind::If,
                "else" => TokenKind::Else,
                "while" => TokenKind::While,
                "let" => TokenKind::VarDecl,
                "fn" => TokenKind::FunctionDecl,
                "return" => TokenKind::Return,
                _ => TokenKind::Identifier,
            };
            return Ok(Token { text, kind, pos: start });
        }
        // Anything else is assumed to be the start of a unary operator, or
        // just punctuation the parser will reject itself (e.g. `:`).
        Ok(self.next_unary_op())
    }
}
