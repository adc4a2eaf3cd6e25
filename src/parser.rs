//! The parser driver: consumes the token stream, builds nodes through
//! [`CompilationUnit`]'s `make_*` methods (never `Graph::build_*` directly),
//! and is the sole mutator of the live [`crate::ir::ScopeNode`] stack.
//!
//! Primary expressions use a Shunting-Yard operator-precedence loop over
//! [`crate::op::Op`]; `if`/`else` is modeled by duplicating the scope,
//! threading each branch's projection as `$ctrl`, and merging the two
//! branch scopes back into one via a `Region` plus one `Phi` per name whose
//! value differs between branches.

use std::collections::BTreeSet;

use crate::arena::Arena;
use crate::error::ParseError;
use crate::ir::{Graph, NodeId, ScopeNode, SourceSpan, CTRL_NAME};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::op::Op;
use crate::peephole::peephole;
use crate::types::TypePool;
use crate::unit::CompilationUnit;

fn is_terminal(c: u8) -> bool {
    matches!(c, b')' | b']' | b'}' | b';' | b',' | 0)
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    pub unit: CompilationUnit,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(source),
            unit: CompilationUnit::new(),
        }
    }

    /// Parse every top-level statement in the source, returning the
    /// finished [`CompilationUnit`] so its graph can be inspected or
    /// printed. Consumes `self`; there is nothing useful left to do with
    /// the parser once the program has been read.
    pub fn parse_program(mut self) -> Result<CompilationUnit, ParseError> {
        loop {
            match self.lexer.peek_non_white() {
                0 => break,
                b';' => {
                    self.next_token()?;
                    continue;
                }
                _ => {}
            }
            self.parse_top_expr()?;
        }
        Ok(self.unit)
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.lexer.next_token().map_err(ParseError::from_lex)
    }

    fn expect_kind(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        let tok = self.next_token()?;
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(ParseError::new(format!("{message}, found '{}'", tok.text), tok.pos))
        }
    }

    /// Reads one operator-shaped token and checks its text, covering both
    /// `=` (the `let`/assignment initializer marker) and `:` (the `let`
    /// type-annotation separator) — neither has a dedicated `TokenKind`, so
    /// both are read the same way the original reads arbitrary literal
    /// punctuation: via `next_binary_op` and a text comparison.
    fn expect_text(&mut self, text: &str) -> Result<Token, ParseError> {
        let tok = self.lexer.next_binary_op();
        if tok.text == text {
            Ok(tok)
        } else {
            Err(ParseError::new(format!("expected '{text}', found '{}'", tok.text), tok.pos))
        }
    }

    fn parse_top_expr(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.next_token()?;
        match tok.kind {
            TokenKind::Return => {
                let expr = self.parse_primary()?;
                self.expect_kind(TokenKind::EndOfLine, "expected ';' after return expression")?;
                Ok(self.unit.make_ret(expr, Some(tok.span())))
            }

            TokenKind::VarDecl => {
                let name_tok = self.next_token()?;
                if name_tok.kind != TokenKind::Identifier {
                    return Err(ParseError::new(
                        format!("expected a variable name after 'let', found '{}'", name_tok.text),
                        name_tok.pos,
                    ));
                }
                self.expect_text(":")
                    .map_err(|_| ParseError::new("expected type when declaring a variable", tok.pos))?;
                self.lexer.next_type().map_err(ParseError::from_lex)?;
                self.expect_text("=")
                    .map_err(|_| ParseError::new("variable declaration without initialization", tok.pos))?;
                let init = self.parse_primary()?;
                self.unit.scope.define(&mut self.unit.graph, &name_tok.text, init);
                self.expect_kind(TokenKind::EndOfLine, "expected ';' after variable declaration")?;
                Ok(init)
            }

            TokenKind::Identifier => {
                self.expect_text("=").map_err(|_| {
                    ParseError::new(
                        "a top-level expression starting with an identifier must be an assignment",
                        tok.pos,
                    )
                })?;
                let new_value = self.parse_primary()?;
                self.unit
                    .scope
                    .update(&mut self.unit.graph, &tok.text, new_value)
                    .ok_or_else(|| ParseError::new(format!("assignment to undeclared name '{}'", tok.text), tok.pos))?;
                self.expect_kind(TokenKind::EndOfLine, "expected ';' after assignment")?;
                Ok(new_value)
            }

            TokenKind::LeftCurly => {
                let result = self.parse_block()?;
                self.expect_kind(TokenKind::EndOfLine, "expected ';' after block")?;
                Ok(result)
            }

            TokenKind::If => {
                let result = self.parse_if(tok.span())?;
                self.expect_kind(TokenKind::EndOfLine, "expected ';' after if statement")?;
                Ok(result)
            }

            // `parse_program` already skips stray `;` before ever calling
            // here, so the only way to see one is a caller bug.
            TokenKind::EndOfLine => unreachable!("parse_program skips stray ';' before calling parse_top_expr"),
            TokenKind::EndOfFile => unreachable!("parse_program checks for eof before calling parse_top_expr"),

            other => Err(ParseError::new(
                format!("unexpected token {other:?} ('{}') at the start of a statement", tok.text),
                tok.pos,
            )),
        }
    }

    /// Assumes the leading `{` has already been consumed. Returns the value
    /// of the last statement in the block; a block with no statements is a
    /// recoverable error, not an empty value.
    fn parse_block(&mut self) -> Result<NodeId, ParseError> {
        let start_pos = self.lexer.pos();
        self.unit.scope.push();
        let mut last = None;
        while self.lexer.peek_non_white() != b'}' {
            last = Some(self.parse_top_expr()?);
        }
        self.unit.scope.pop(&mut self.unit.graph);
        let result = last.ok_or_else(|| ParseError::new("empty block is not allowed", start_pos))?;
        self.expect_kind(TokenKind::RightCurly, "expected '}' to close block")?;
        Ok(result)
    }

    fn parse_if(&mut self, if_token: SourceSpan) -> Result<NodeId, ParseError> {
        self.expect_kind(TokenKind::LeftParen, "expected '(' after 'if'")?;
        let condition = self.parse_primary()?;
        self.expect_kind(TokenKind::RightParen, "condition has to end with ')'")?;

        let if_node = self.unit.make_if(condition, Some(if_token.clone()));
        let proj_true = self.unit.make_proj(0, if_node, None);
        let proj_false = self.unit.make_proj(1, if_node, None);

        let scope_false = self.unit.scope.duplicate(&mut self.unit.graph);
        peephole(&mut self.unit.graph, &mut self.unit.pool, self.unit.start, scope_false.node);

        // True side: mutate the live scope in place.
        self.unit.set_ctrl(proj_true);
        self.expect_kind(TokenKind::LeftCurly, "expected '{' after 'if' condition")?;
        self.parse_block()?;

        // False side: install the duplicate as the live scope for its block.
        let true_scope = std::mem::replace(&mut self.unit.scope, scope_false);
        self.unit.set_ctrl(proj_false);
        if self.lexer.peek_non_white() != b';' {
            self.expect_kind(TokenKind::Else, "expected 'else' clause")?;
            self.expect_kind(TokenKind::LeftCurly, "expected '{' after 'else'")?;
            self.parse_block()?;
        }
        let false_scope = std::mem::replace(&mut self.unit.scope, true_scope);

        merge_if_scopes(
            &mut self.unit.graph,
            &mut self.unit.pool,
            &self.unit.arena,
            self.unit.start,
            &mut self.unit.scope,
            false_scope,
            if_token,
        );

        Ok(self.unit.ctrl())
    }

    fn parse_primary(&mut self) -> Result<NodeId, ParseError> {
        let mut val_stack: Vec<NodeId> = Vec::new();
        let mut op_stack: Vec<Op> = Vec::new();

        val_stack.push(self.parse_unary_term()?);

        loop {
            if is_terminal(self.lexer.peek_non_white()) {
                while let Some(op) = op_stack.pop() {
                    let rhs = val_stack.pop().expect("shunting-yard stack underflow");
                    let lhs = val_stack.pop().expect("shunting-yard stack underflow");
                    val_stack.push(self.unit.make_binop(op.node_kind(), lhs, rhs, None));
                }
                return Ok(val_stack.pop().expect("primary expression produced no value"));
            }

            let op_tok = self.lexer.next_binary_op();
            let op = Op::binary_from_symbol(&op_tok.text)
                .ok_or_else(|| ParseError::new(format!("expected a binary operator, found '{}'", op_tok.text), op_tok.pos))?;
            if op == Op::Assignment {
                panic!("'=' cannot appear inside an expression");
            }

            while let Some(&top) = op_stack.last() {
                if top.has_precedence_over(op) {
                    op_stack.pop();
                    let rhs = val_stack.pop().expect("shunting-yard stack underflow");
                    let lhs = val_stack.pop().expect("shunting-yard stack underflow");
                    val_stack.push(self.unit.make_binop(top.node_kind(), lhs, rhs, None));
                } else {
                    break;
                }
            }
            op_stack.push(op);
            val_stack.push(self.parse_unary_term()?);
        }
    }

    fn parse_unary_term(&mut self) -> Result<NodeId, ParseError> {
        let c = self.lexer.peek_non_white();
        if matches!(c, b'-' | b'!' | b'~' | b'&' | b'*') {
            let tok = self.lexer.next_unary_op();
            let op = Op::unary_from_symbol(&tok.text)
                .ok_or_else(|| ParseError::new(format!("unknown unary operator '{}'", tok.text), tok.pos))?;
            let rhs = self.parse_unary_term()?;
            return Ok(self.unit.make_unop(op.node_kind(), rhs, Some(tok.span())));
        }
        self.parse_term()
    }

    fn parse_term(&mut self) -> Result<NodeId, ParseError> {
        let tok = self.next_token()?;
        match tok.kind {
            TokenKind::IntLiteral => {
                let value: i64 = tok
                    .text
                    .parse()
                    .map_err(|_| ParseError::new(format!("malformed integer literal '{}'", tok.text), tok.pos))?;
                Ok(self.unit.make_const(value, Some(tok.span())))
            }

            TokenKind::Identifier => self
                .unit
                .scope
                .find(&self.unit.graph, &tok.text)
                .ok_or_else(|| ParseError::new(format!("variable '{}' is not defined", tok.text), tok.pos)),

            TokenKind::LeftParen => {
                let expr = self.parse_primary()?;
                self.expect_kind(TokenKind::RightParen, "expected ')' after reading an expression that starts with '('")?;
                Ok(expr)
            }

            // The type lattice has no representation for text; a string
            // can't be a value in this language, only ever reach here as a
            // syntax error.
            TokenKind::StringLiteral => Err(ParseError::new(
                "string literals cannot be used as expression values",
                tok.pos,
            )),

            // Parseable per the grammar, but this crate never constructs a
            // floating-point `Const` node: `CompilationUnit::make_const`
            // only has an integer overload, matching this front end's
            // arithmetic-only `compute`/`apply` coverage.
            TokenKind::FloatLiteral => Err(ParseError::new(
                "floating point literals are not supported as expression operands",
                tok.pos,
            )),

            TokenKind::EndOfLine => Err(ParseError::new("expected an expression, but ';' found", tok.pos)),
            TokenKind::EndOfFile => Err(ParseError::new("unexpected end of input while parsing an expression", tok.pos)),

            other => Err(ParseError::new(format!("unexpected token {other:?} ('{}')", tok.text), tok.pos)),
        }
    }
}

/// Parse an entire source string into a finished [`CompilationUnit`].
pub fn parse(source: &str) -> Result<CompilationUnit, ParseError> {
    Parser::new(source).parse_program()
}

/// Merge two branch scopes that started life as the same [`ScopeNode`]
/// (via `duplicate`) back into one: a `Region` over both branches' `$ctrl`,
/// and a `Phi` keyed to that `Region` for every name whose bound value
/// differs between them. `true_scope` is mutated into the merged scope;
/// `false_scope` is consumed and killed once nothing references it.
///
/// Not ported from anywhere — the original's `NodeScope::merge()` is
/// declared and called from the parser driver but its body is not present
/// anywhere in the retrieved sources. This is built from the parser
/// driver's prose description instead: duplicate preserves frame structure
/// (and therefore name-to-slot correspondence) across both scopes, so a
/// plain per-name comparison is enough to decide which bindings need a
/// `Phi`.
///
/// Takes the unit's fields apart rather than `&mut CompilationUnit` so the
/// caller can hold `&mut self.unit.scope` and the rest of `self.unit`
/// simultaneously; it open-codes the build-then-peephole pattern
/// `CompilationUnit::make_region`/`make_phi` wrap for the same reason.
fn merge_if_scopes(
    graph: &mut Graph,
    pool: &mut TypePool,
    arena: &Arena,
    start: NodeId,
    true_scope: &mut ScopeNode,
    false_scope: ScopeNode,
    token: SourceSpan,
) {
    let true_ctrl = true_scope.ctrl(graph);
    let false_ctrl = false_scope.ctrl(graph);
    let ctrls = arena.alloc_slice_copy(&[true_ctrl, false_ctrl]);
    let region = graph.build_region(ctrls, Some(token));
    let region = peephole(graph, pool, start, region);

    let mut names: BTreeSet<&str> = true_scope.innermost_names().collect();
    names.extend(false_scope.innermost_names());

    for name in names {
        if name == CTRL_NAME {
            continue;
        }
        let on_true = true_scope.find(graph, name);
        let on_false = false_scope.find(graph, name);
        if let (Some(l), Some(r)) = (on_true, on_false) {
            if l != r {
                let data = arena.alloc_slice_copy(&[l, r]);
                let phi = graph.build_phi(region, data, None);
                let phi = peephole(graph, pool, start, phi);
                true_scope
                    .update(graph, name, phi)
                    .expect("name collected from true_scope's own frames is bound there");
            }
        }
    }
    true_scope
        .update(graph, CTRL_NAME, region)
        .expect("scope invariant: $ctrl is always bound");

    debug_assert!(
        graph.is_unused(false_scope.node),
        "false_scope is never referenced by anything but the live scope field"
    );
    graph.kill(false_scope.node);
}
