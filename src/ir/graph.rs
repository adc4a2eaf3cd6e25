//! The primary node store and def-use edge bookkeeping.
//!
//! `Graph` is a growable slot table addressed by [`NodeId`] — the
//! arena-of-indices design the original's notes call for in place of raw
//! back-pointers, since Region/Phi control cycles make raw references
//! impossible to thread through the borrow checker. `output` lists are just
//! back-references expressed as `NodeId`s; [`Graph`] is responsible for
//! keeping every `input`/`output` pair in the dual-edge invariant described
//! in the node graph primitives.

use super::entities::{NodeId, SourceSpan};
use super::node::{Node, NodeKind};
use crate::types::TypeId;

/// Owns every node built during one compilation unit. Dropping the `Graph`
/// reclaims every node's storage at once; nothing about it is shared across
/// units (see [`crate::unit::CompilationUnit`]).
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a fresh, disconnected node: no inputs, no outputs, no type.
    /// Callers push inputs with [`Graph::push_input`] and then normalize
    /// through `crate::peephole::peephole`, which assigns the type.
    pub fn new_node(&mut self, kind: NodeKind, token: Option<SourceSpan>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(kind, token));
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn token(&self, id: NodeId) -> Option<&SourceSpan> {
        self.node(id).token()
    }

    pub fn ty(&self, id: NodeId) -> Option<TypeId> {
        self.node(id).ty
    }

    pub fn set_type(&mut self, id: NodeId, ty: Option<TypeId>) {
        self.node_mut(id).ty = ty;
    }

    pub fn input(&self, id: NodeId) -> &[Option<NodeId>] {
        self.node(id).input()
    }

    pub fn input_len(&self, id: NodeId) -> usize {
        self.node(id).input.len()
    }

    pub fn output(&self, id: NodeId) -> &[NodeId] {
        self.node(id).output()
    }

    /// A node is unused iff nothing names it as an input.
    pub fn is_unused(&self, id: NodeId) -> bool {
        self.node(id).output.is_empty()
    }

    /// A node is dead iff it has no users, no remaining inputs, and no type
    /// — the three conditions `kill` drives it to.
    pub fn is_dead(&self, id: NodeId) -> bool {
        let n = self.node(id);
        n.output.is_empty() && n.input.is_empty() && n.ty.is_none()
    }

    /// Live nodes in ascending id order, for the printer and tests.
    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len())
            .map(NodeId::new)
            .filter(move |&id| !self.is_dead(id))
    }

    pub fn live_count(&self) -> usize {
        self.live_nodes().count()
    }

    fn remove_output_once(&mut self, def: NodeId, user: NodeId) {
        let outputs = &mut self.node_mut(def).output;
        if let Some(pos) = outputs.iter().position(|&o| o == user) {
            outputs.remove(pos);
        }
    }

    /// Kill `def` if it just lost its last user, unless it is already dead
    /// (its `ty` is already `None`). The `ty` check is the re-entrancy guard
    /// the design notes call for: a broken cycle of otherwise-dead
    /// Region/Phi nodes must not be killed twice.
    fn kill_if_unused(&mut self, def: NodeId) {
        if self.node(def).ty.is_some() && self.is_unused(def) {
            self.kill(def);
        }
    }

    /// Append `input` to `n`'s input list, wiring the dual output edge.
    pub fn push_input(&mut self, n: NodeId, input: Option<NodeId>) {
        self.node_mut(n).input.push(input);
        if let Some(d) = input {
            self.node_mut(d).output.push(n);
        }
    }

    /// Drop `n`'s last input, tearing down its dual output edge and
    /// recursively killing the old input if it is now unused.
    pub fn pop_input(&mut self, n: NodeId) {
        let last = self
            .node_mut(n)
            .input
            .pop()
            .expect("pop_input on a node with no inputs");
        if let Some(d) = last {
            self.remove_output_once(d, n);
            self.kill_if_unused(d);
        }
    }

    /// Drop `n`'s last `count` inputs, in reverse order (matches `kill`'s
    /// and `ScopeNode::pop`'s use of this as a frame-sized batch pop).
    pub fn pop_inputs(&mut self, n: NodeId, count: usize) {
        for _ in 0..count {
            self.pop_input(n);
        }
    }

    /// Rewire input slot `i` of `n` to `new`, no-op if unchanged. Tears down
    /// the old dual edge (killing the old def if it becomes unused) and
    /// wires the new one.
    pub fn set_input(&mut self, n: NodeId, i: usize, new: Option<NodeId>) {
        let old = self.node(n).input[i];
        if old == new {
            return;
        }
        if let Some(d) = new {
            self.node_mut(d).output.push(n);
        }
        self.node_mut(n).input[i] = new;
        if let Some(d) = old {
            self.remove_output_once(d, n);
            self.kill_if_unused(d);
        }
    }

    /// Add a fake self-referential user to `id`, so it reads as used no
    /// matter what real edges are torn down while it is held. Paired with
    /// [`Graph::unkeep`] around a [`Graph::kill`] of some other node that
    /// might transitively tear down `id`'s last real edge — e.g. an
    /// idealize rule rewriting `n` to one of `n`'s own inputs, where
    /// killing the now-dead `n` must not also reclaim the input it was
    /// rewritten to.
    pub fn keep(&mut self, id: NodeId) {
        self.node_mut(id).output.push(id);
    }

    /// Undo a prior [`Graph::keep`], then reclaim `id` if that was the only
    /// thing keeping it alive.
    pub fn unkeep(&mut self, id: NodeId) {
        self.remove_output_once(id, id);
        self.kill_if_unused(id);
    }

    /// Detach every input of `n` and mark it dead. `n` must already be
    /// unused; this is the sole reclamation mechanism in the graph.
    pub fn kill(&mut self, n: NodeId) {
        debug_assert!(
            self.is_unused(n),
            "kill called on node {n} with remaining users"
        );
        self.pop_inputs(n, self.input_len(n));
        self.node_mut(n).ty = None;
        debug_assert!(self.is_dead(n));
    }

    // -- raw node construction -------------------------------------------
    //
    // These build a node's edges per the §3.2 input-shape table and return
    // it unpeepholed. `crate::peephole::peephole` is the only thing that
    // should normalize a node's type and rewrite it; callers that want a
    // fully-normalized node (the parser, `idealize`'s own sub-expressions)
    // route the id this returns through that function themselves.

    pub fn build_start(&mut self, args: TypeId) -> NodeId {
        self.new_node(NodeKind::Start { args }, None)
    }

    pub fn build_const(&mut self, value: TypeId, ctrl: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.new_node(NodeKind::Const { value }, token);
        self.push_input(n, Some(ctrl));
        n
    }

    pub fn build_ret(&mut self, ctrl: NodeId, expr: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.new_node(NodeKind::Ret, token);
        self.push_input(n, Some(ctrl));
        self.push_input(n, Some(expr));
        n
    }

    pub fn build_proj(&mut self, index: u32, tuple: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.new_node(NodeKind::Proj { index }, token);
        self.push_input(n, Some(tuple));
        n
    }

    pub fn build_if(&mut self, ctrl: NodeId, condition: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.new_node(NodeKind::If, token);
        self.push_input(n, Some(ctrl));
        self.push_input(n, Some(condition));
        n
    }

    pub fn build_region(&mut self, ctrls: &[NodeId], token: Option<SourceSpan>) -> NodeId {
        debug_assert!(ctrls.len() >= 2, "Region needs two or more predecessors");
        let n = self.new_node(NodeKind::Region, token);
        for &c in ctrls {
            self.push_input(n, Some(c));
        }
        n
    }

    pub fn build_phi(&mut self, region: NodeId, data: &[NodeId], token: Option<SourceSpan>) -> NodeId {
        let n = self.new_node(NodeKind::Phi, token);
        self.push_input(n, Some(region));
        for &d in data {
            self.push_input(n, Some(d));
        }
        n
    }

    pub fn build_binop(&mut self, kind: NodeKind, lhs: NodeId, rhs: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.new_node(kind, token);
        self.push_input(n, Some(lhs));
        self.push_input(n, Some(rhs));
        n
    }

    pub fn build_unop(&mut self, kind: NodeKind, rhs: NodeId, token: Option<SourceSpan>) -> NodeId {
        let n = self.new_node(kind, token);
        self.push_input(n, Some(rhs));
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Kind, TypePool};

    fn int_node(graph: &mut Graph, pool: &mut TypePool, v: i64) -> NodeId {
        let ty = pool.int_const(v);
        let n = graph.new_node(NodeKind::Const { value: ty }, None);
        graph.push_input(n, None); // Const's [ctrl] slot; untested here
        graph.set_type(n, Some(ty));
        n
    }

    #[test]
    fn push_and_pop_input_maintain_dual_edges() {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let a = int_node(&mut graph, &mut pool, 1);
        let add = graph.new_node(NodeKind::Add, None);
        graph.push_input(add, Some(a));
        assert_eq!(graph.output(a), &[add]);
        graph.pop_input(add);
        // `a` lost its only user and had no inputs of its own: it dies.
        assert!(graph.is_dead(a));
    }

    #[test]
    fn set_input_rewires_and_kills_orphan() {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let a = int_node(&mut graph, &mut pool, 1);
        let b = int_node(&mut graph, &mut pool, 2);
        let add = graph.new_node(NodeKind::Add, None);
        graph.push_input(add, Some(a));
        graph.set_input(add, 0, Some(b));
        assert!(graph.is_dead(a));
        assert_eq!(graph.output(b), &[add]);
    }

    #[test]
    fn set_input_same_value_is_noop() {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let a = int_node(&mut graph, &mut pool, 1);
        let add = graph.new_node(NodeKind::Add, None);
        graph.push_input(add, Some(a));
        graph.set_input(add, 0, Some(a));
        assert_eq!(graph.output(a), &[add]);
    }

    #[test]
    fn killing_shared_user_drops_whole_unused_subgraph() {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let a = int_node(&mut graph, &mut pool, 1);
        let b = int_node(&mut graph, &mut pool, 2);
        let add = graph.new_node(NodeKind::Add, None);
        graph.push_input(add, Some(a));
        graph.push_input(add, Some(b));
        let before = graph.live_count();
        graph.kill(add);
        assert!(graph.is_dead(a));
        assert!(graph.is_dead(b));
        assert_eq!(graph.live_count(), before - 3);
    }
}
