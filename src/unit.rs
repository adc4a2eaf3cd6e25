//! A `CompilationUnit` bundles everything one compilation needs: the node
//! graph, the type pool, a scratch arena, the `Start` node, and the live
//! lexical scope. Nothing here is a process-wide global — the original's
//! `START_NODE`/`SCOPE_NODE` statics become fields here instead, so two
//! units (e.g. two test cases, or two files compiled concurrently) never
//! share a hash-cons table.
//!
//! Every `make_*` method below is the "real" way to add a node to the
//! graph: build the raw edges, then run it through
//! [`crate::peephole::peephole`] so it is immediately typed, folded, and
//! idealized. `crate::parser` never calls a `Graph::build_*` method
//! directly — these wrappers are the whole point.

use crate::arena::Arena;
use crate::ir::{Graph, NodeId, NodeKind, ScopeNode, SourceSpan};
use crate::peephole::peephole;
use crate::types::{Kind, TypePool};

/// Reserved binding for the single formal parameter every program receives,
/// at `Proj(1, Start)`.
pub const ARG_NAME: &str = "arg";

pub struct CompilationUnit {
    pub graph: Graph,
    pub pool: TypePool,
    pub arena: Arena,
    pub start: NodeId,
    pub scope: ScopeNode,
}

impl CompilationUnit {
    /// Build a fresh unit: a `Start` with args `(Ctrl, Int:Bottom)`, a
    /// `Scope` whose `$ctrl` is `Proj(0, Start)`, with `arg` already bound
    /// to `Proj(1, Start)`.
    pub fn new() -> Self {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let arena = Arena::new();

        let ctrl_ty = pool.ctrl();
        let arg_ty = pool.bottom_of(Kind::Int);
        let args = pool.tuple(&[ctrl_ty, arg_ty]);
        let start = graph.build_start(args);
        let start = peephole(&mut graph, &mut pool, start, start);

        let ctrl_proj = graph.build_proj(0, start, None);
        let ctrl_proj = peephole(&mut graph, &mut pool, start, ctrl_proj);
        let arg_proj = graph.build_proj(1, start, None);
        let arg_proj = peephole(&mut graph, &mut pool, start, arg_proj);

        let mut scope = ScopeNode::new(&mut graph, ctrl_proj);
        peephole(&mut graph, &mut pool, start, scope.node);
        scope.define(&mut graph, ARG_NAME, arg_proj);

        Self {
            graph,
            pool,
            arena,
            start,
            scope,
        }
    }

    /// The unit's current control token, read off the live scope.
    pub fn ctrl(&self) -> NodeId {
        self.scope.ctrl(&self.graph)
    }

    pub fn set_ctrl(&mut self, ctrl: NodeId) {
        self.scope
            .update(&mut self.graph, crate::ir::CTRL_NAME, ctrl)
            .expect("scope invariant: $ctrl is always bound");
    }

    pub fn make_const(&mut self, value: i64, token: Option<SourceSpan>) -> NodeId {
        let ty = self.pool.int_const(value);
        let n = self.graph.build_const(ty, self.start, token);
        peephole(&mut self.graph, &mut self.pool, self.start, n)
    }

    pub fn make_binop(&mut self, kind: NodeKind, lhs: NodeId, rhs: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.graph.build_binop(kind, lhs, rhs, token);
        peephole(&mut self.graph, &mut self.pool, self.start, n)
    }

    pub fn make_unop(&mut self, kind: NodeKind, rhs: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.graph.build_unop(kind, rhs, token);
        peephole(&mut self.graph, &mut self.pool, self.start, n)
    }

    pub fn make_proj(&mut self, index: u32, tuple: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.graph.build_proj(index, tuple, token);
        peephole(&mut self.graph, &mut self.pool, self.start, n)
    }

    pub fn make_if(&mut self, condition: NodeId, token: Option<SourceSpan>) -> NodeId {
        let ctrl = self.ctrl();
        let n = self.graph.build_if(ctrl, condition, token);
        peephole(&mut self.graph, &mut self.pool, self.start, n)
    }

    pub fn make_region(&mut self, ctrls: &[NodeId], token: Option<SourceSpan>) -> NodeId {
        let n = self.graph.build_region(ctrls, token);
        peephole(&mut self.graph, &mut self.pool, self.start, n)
    }

    pub fn make_phi(&mut self, region: NodeId, data: &[NodeId], token: Option<SourceSpan>) -> NodeId {
        let n = self.graph.build_phi(region, data, token);
        peephole(&mut self.graph, &mut self.pool, self.start, n)
    }

    pub fn make_ret(&mut self, expr: NodeId, token: Option<SourceSpan>) -> NodeId {
        let ctrl = self.ctrl();
        let n = self.graph.build_ret(ctrl, expr, token);
        peephole(&mut self.graph, &mut self.pool, self.start, n)
    }
}

impl Default for CompilationUnit {
    fn default() -> Self {
        Self::new()
    }
}
