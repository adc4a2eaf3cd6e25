//! Opaque node references.
//!
//! A `Node` never refers to another node through a Rust reference or raw
//! pointer: the graph is cyclic (`Region`/`Phi` back-edges) and nodes are
//! killed and recreated as peephole rewrites run, which raw references
//! can't survive under the borrow checker. Instead every edge is a
//! `NodeId`, a plain index into the owning [`super::Graph`]'s node table.

use core::fmt;

/// An index into a [`super::Graph`]'s node table. Stable for the lifetime
/// of the graph; never reused, even after the node it names is killed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "node table exhausted");
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Provenance only: the source lexeme and byte offset a node was built
/// from, if it was built directly from a token rather than synthesized by
/// peephole (e.g. the rewritten `Add`/`Mul` nodes idealize fabricates).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSpan {
    pub text: String,
    pub pos: usize,
}

impl SourceSpan {
    pub fn new(text: impl Into<String>, pos: usize) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        let id = NodeId::new(7);
        assert_eq!(id.index(), 7);
        assert_eq!(format!("{id}"), "n7");
    }

    #[test]
    fn source_span_carries_lexeme_and_offset() {
        let span = SourceSpan::new("return", 12);
        assert_eq!(span.text, "return");
        assert_eq!(span.pos, 12);
    }
}
