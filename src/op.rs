//! The source language's operator alphabet: precedence, associativity, and
//! the arithmetic semantics `compute` relies on.
//!
//! Only `Op::symbol_of`'s arithmetic members (`Add Sub Mul Div Mod Neg`) map
//! onto a [`crate::ir::NodeKind`]; everything else in this enum parses fine
//! (the grammar in the parser driver does not distinguish arithmetic from
//! bitwise/logical/comparison operators) but `Op::node_kind` panics for
//! them. That boundary is deliberate: the grammar is complete, the lattice
//! is not, and committing an unimplemented operator to a node is a fatal
//! invariant violation, not a recoverable parse error.

use crate::ir::NodeKind;

/// A lexed operator, before it has been resolved to unary or binary use at
/// an ambiguous lexeme (`- * &`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Neg,
    LogiNot,
    BitNot,

    Add,
    Sub,
    Mul,
    Div,
    Mod,
    LogiOr,
    LogiAnd,
    BitOr,
    BitAnd,
    BitXor,
    Eq,
    Less,
    Greater,
    LessEq,
    GreaterEq,

    /// Right-associative, lowest priority; handled specially by the parser
    /// rather than folded into the Shunting-Yard stack.
    Assignment,
}

impl Op {
    /// Lex a unary-position operator symbol. `-` is the only ambiguous
    /// lexeme usable here; `! ~` are unambiguously unary.
    pub fn unary_from_symbol(sym: &str) -> Option<Op> {
        match sym {
            "-" => Some(Op::Neg),
            "!" => Some(Op::LogiNot),
            "~" => Some(Op::BitNot),
            _ => None,
        }
    }

    /// Lex a binary-position operator symbol.
    pub fn binary_from_symbol(sym: &str) -> Option<Op> {
        match sym {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            "/" => Some(Op::Div),
            "%" => Some(Op::Mod),
            "&" => Some(Op::BitAnd),
            "|" => Some(Op::BitOr),
            "^" => Some(Op::BitXor),
            "&&" => Some(Op::LogiAnd),
            "||" => Some(Op::LogiOr),
            "==" => Some(Op::Eq),
            "<" => Some(Op::Less),
            ">" => Some(Op::Greater),
            "<=" => Some(Op::LessEq),
            ">=" => Some(Op::GreaterEq),
            "=" => Some(Op::Assignment),
            _ => None,
        }
    }

    /// High binds tighter; `0` is reserved for `Assignment`, which the
    /// Shunting-Yard loop never folds through this table (it is
    /// right-associative and handled at the top-level-expression grammar,
    /// not inside `primary`).
    pub fn precedence(self) -> u8 {
        match self {
            Op::Neg | Op::LogiNot | Op::BitNot => 10,
            Op::Mul | Op::Div | Op::Mod => 8,
            Op::Add | Op::Sub => 6,
            Op::BitAnd | Op::BitXor | Op::BitOr => 4,
            Op::Eq | Op::Less | Op::Greater | Op::LessEq | Op::GreaterEq => 3,
            Op::LogiAnd | Op::LogiOr => 2,
            Op::Assignment => 0,
        }
    }

    /// `true` iff `self` should be applied before folding in `next` — i.e.
    /// `self`'s precedence is at least `next`'s. Assignment never has
    /// precedence over anything (it is lowest and right-associative).
    pub fn has_precedence_over(self, next: Op) -> bool {
        if self.precedence() == 0 {
            return false;
        }
        self.precedence() >= next.precedence()
    }

    /// The `NodeKind` a binary `Op` constructs. Panics for every operator
    /// beyond arithmetic — a fatal invariant violation, since the lattice in
    /// `compute` has no representation for logical/bitwise/comparison
    /// values.
    pub fn node_kind(self) -> NodeKind {
        match self {
            Op::Add => NodeKind::Add,
            Op::Sub => NodeKind::Sub,
            Op::Mul => NodeKind::Mul,
            Op::Div => NodeKind::Div,
            Op::Mod => NodeKind::Mod,
            Op::Neg => NodeKind::Neg,
            other => panic!("operator {other:?} has no arithmetic node representation"),
        }
    }

    /// Integer arithmetic for `compute`'s constant-folding branch. Division
    /// and modulo by zero yield `0` rather than trapping, per the source
    /// language's arithmetic contract.
    pub fn apply(self, l: i64, r: i64) -> i64 {
        match self {
            Op::Add => l.wrapping_add(r),
            Op::Sub => l.wrapping_sub(r),
            Op::Mul => l.wrapping_mul(r),
            Op::Div => {
                if r == 0 {
                    0
                } else {
                    l.wrapping_div(r)
                }
            }
            Op::Mod => {
                if r == 0 {
                    0
                } else {
                    l.wrapping_rem(r)
                }
            }
            other => panic!("apply called on non-arithmetic operator {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_orders_arithmetic_above_comparison() {
        assert!(Op::Mul.has_precedence_over(Op::Add));
        assert!(Op::Add.has_precedence_over(Op::Eq));
        assert!(!Op::Eq.has_precedence_over(Op::Add));
    }

    #[test]
    fn assignment_never_has_precedence() {
        assert!(!Op::Assignment.has_precedence_over(Op::Add));
    }

    #[test]
    fn div_and_mod_by_zero_yield_zero() {
        assert_eq!(Op::Div.apply(5, 0), 0);
        assert_eq!(Op::Mod.apply(5, 0), 0);
    }

    #[test]
    fn arithmetic_symbols_map_to_node_kinds() {
        assert!(Op::Add.node_kind().is_add());
        assert!(matches!(Op::Mul.node_kind(), NodeKind::Mul));
    }

    #[test]
    #[should_panic]
    fn bitwise_operator_has_no_node_kind() {
        let _ = Op::BitAnd.node_kind();
    }
}
