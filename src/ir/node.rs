//! Node kinds and the per-node record stored in a [`super::Graph`].
//!
//! `Node` is a tagged union: one common header (token, input/output edges,
//! best-known type) plus a [`NodeKind`] that carries whatever extra payload
//! a particular kind needs (`Proj`'s index, `Const`'s folded value, `Start`'s
//! argument tuple). `compute`/`idealize` in [`crate::peephole`] match on the
//! tag exhaustively instead of downcasting, which is the ordinary way to get
//! kind polymorphism without inheritance in Rust.

use smallvec::SmallVec;

use super::entities::{NodeId, SourceSpan};
use crate::types::TypeId;

/// The node kinds this IR distinguishes. `Undefined` is a sentinel the
/// graph never actually constructs; it exists so `compute`/`idealize` have
/// an exhaustive arm to panic from, mirroring the fatal-invariant tier in
/// the error design rather than leaving a silent gap.
#[derive(Debug)]
pub enum NodeKind {
    Undefined,
    /// Lexical scope: `input = [ctrl, v0, v1, ...]`, one slot per name bound
    /// anywhere on the live frame stack (see [`super::scope::ScopeNode`]).
    Scope,
    /// Selects one element of a `Tuple`-typed producer (`If`'s branches,
    /// `Start`'s formal parameters). `input = [tuple]`.
    Proj { index: u32 },
    /// Root of the graph. No inputs; the formal argument types live in
    /// `args` as an already-interned `Tuple` type.
    Start { args: TypeId },
    /// `input = [ctrl, expr]`.
    Ret,
    /// Control split. `input = [ctrl, condition]`.
    If,
    /// Control merge. `input = [ctrl0, ctrl1, ...]`, two or more.
    Region,
    /// Value merge. `input = [region, data0, data1, ...]`, one data input
    /// per region predecessor.
    Phi,
    /// `input = [ctrl]`. `value` is the folded constant this node carries;
    /// `compute` simply returns it back out (it does not depend on `ctrl`).
    Const { value: TypeId },
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `input = [rhs]`.
    Neg,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Undefined => "Undefined",
            NodeKind::Scope => "Scope",
            NodeKind::Proj { .. } => "Proj",
            NodeKind::Start { .. } => "Start",
            NodeKind::Ret => "Ret",
            NodeKind::If => "If",
            NodeKind::Region => "Region",
            NodeKind::Phi => "Phi",
            NodeKind::Const { .. } => "Const",
            NodeKind::Add => "Add",
            NodeKind::Sub => "Sub",
            NodeKind::Mul => "Mul",
            NodeKind::Div => "Div",
            NodeKind::Mod => "Mod",
            NodeKind::Neg => "Neg",
        }
    }

    pub fn is_add(&self) -> bool {
        matches!(self, NodeKind::Add)
    }

    pub fn is_const(&self) -> bool {
        matches!(self, NodeKind::Const { .. })
    }
}

/// Inline capacity for edge lists. Most nodes here have 0-3 inputs; `Scope`
/// and `Region`/`Phi` can exceed it and spill to the heap like any
/// `SmallVec`.
pub(super) type InputList = SmallVec<[Option<NodeId>; 4]>;
pub(super) type OutputList = SmallVec<[NodeId; 4]>;

/// One node's full record. `ty: None` iff the node is dead — see
/// [`super::Graph::is_dead`].
pub struct Node {
    pub(super) kind: NodeKind,
    pub(super) token: Option<SourceSpan>,
    pub(super) input: InputList,
    pub(super) output: OutputList,
    pub(super) ty: Option<TypeId>,
}

impl Node {
    pub(super) fn new(kind: NodeKind, token: Option<SourceSpan>) -> Self {
        Self {
            kind,
            token,
            input: InputList::new(),
            output: OutputList::new(),
            ty: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn token(&self) -> Option<&SourceSpan> {
        self.token.as_ref()
    }

    pub fn ty(&self) -> Option<TypeId> {
        self.ty
    }

    pub fn input(&self) -> &[Option<NodeId>] {
        &self.input
    }

    pub fn output(&self) -> &[NodeId] {
        &self.output
    }
}
