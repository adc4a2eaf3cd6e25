//! `nodegraph_ir`: a sea-of-nodes intermediate representation, its
//! three-level type lattice, and an on-the-fly peephole optimizer, fronted
//! by a small expression-language tokenizer/parser/printer so the IR is
//! exercisable end to end from the `nodegraphc` binary (`src/bin/nodegraphc.rs`).
//!
//! Dependency order mirrors the crate's module layout: `arena` → `types`
//! → `ir` → `peephole` → `unit` → `lexer` → `parser` → `printer`.

pub mod arena;
pub(crate) mod ctxhash;
pub mod error;
pub(crate) mod fx;
pub mod ir;
pub mod lexer;
pub mod op;
pub mod parser;
pub mod peephole;
pub mod printer;
pub mod types;
pub mod unit;
