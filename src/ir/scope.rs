//! The lexical scope node: a stack of frames mapping source names to input
//! slots on a single `Scope`-kind [`NodeId`].
//!
//! The zeroth input slot is always the current control token, keyed by
//! [`CTRL_NAME`]. `push`/`pop` open and close lexical blocks; `define`
//! appends a fresh slot; `find`/`update` read and rewrite a name's slot,
//! walking frames innermost-first. `duplicate` is how `if`/`else` branches
//! get independent, mutable name bindings that still alias the same
//! upstream defs (see the parser's control-split construction).

use crate::fx::FxHashMap;

use super::entities::NodeId;
use super::graph::Graph;
use super::node::NodeKind;

/// Reserved name for the control-token slot every `Scope` node carries as
/// input 0.
pub const CTRL_NAME: &str = "$ctrl";

/// One lexical block: the names it declared, mapped to their slot index in
/// the owning `Scope` node's input list.
type Frame = FxHashMap<String, usize>;

/// A `Scope`-kind node plus the frame stack that gives its raw input slots
/// names. The node and the frame stack always travel together; there is no
/// way to construct one without the other outside this module.
pub struct ScopeNode {
    pub node: NodeId,
    frames: Vec<Frame>,
}

impl ScopeNode {
    /// Build a fresh `Scope` node with a single frame containing only
    /// `$ctrl`, bound to `ctrl`. The caller is responsible for passing this
    /// node through `crate::peephole::peephole` (it is pass-through, but
    /// still needs `compute` to assign its `Pure:Bottom` type).
    pub fn new(graph: &mut Graph, ctrl: NodeId) -> Self {
        let node = graph.new_node(NodeKind::Scope, None);
        let mut scope = ScopeNode {
            node,
            frames: vec![Frame::default()],
        };
        scope.define(graph, CTRL_NAME, ctrl);
        scope
    }

    /// Push a new, empty innermost frame.
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the innermost frame, dropping as many trailing inputs from the
    /// `Scope` node as that frame declared.
    pub fn pop(&mut self, graph: &mut Graph) {
        let frame = self.frames.pop().expect("scope pop without matching push");
        graph.pop_inputs(self.node, frame.len());
    }

    /// Bind `name` to a fresh input slot holding `value` in the innermost
    /// frame.
    pub fn define(&mut self, graph: &mut Graph, name: &str, value: NodeId) -> NodeId {
        let index = graph.input_len(self.node);
        graph.push_input(self.node, Some(value));
        self.frames
            .last_mut()
            .expect("scope always has at least one frame")
            .insert(name.to_string(), index);
        value
    }

    /// Look up `name`, searching frames innermost-first.
    pub fn find(&self, graph: &Graph, name: &str) -> Option<NodeId> {
        let index = self.slot_of(name)?;
        graph.input(self.node)[index]
    }

    /// Rewrite the value bound to `name`, if it exists. Returns `None` if
    /// `name` is not declared on any live frame.
    pub fn update(&self, graph: &mut Graph, name: &str, value: NodeId) -> Option<NodeId> {
        let index = self.slot_of(name)?;
        graph.set_input(self.node, index, Some(value));
        Some(value)
    }

    fn slot_of(&self, name: &str) -> Option<usize> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    /// The current control token ($ctrl is always bound on the outermost
    /// frame and never popped until the whole scope dies).
    pub fn ctrl(&self, graph: &Graph) -> NodeId {
        self.find(graph, CTRL_NAME)
            .expect("scope invariant: $ctrl is always bound")
    }

    /// Deep-copy the frame stack into a brand-new `Scope` node that shares
    /// the same underlying data nodes as inputs — each shared def gains one
    /// more outgoing edge, but no node is cloned. Used to give `if`/`else`
    /// branches independent mutable bindings starting from the same
    /// pre-branch state.
    ///
    /// Leaves the new node's type unset, like [`ScopeNode::new`]; the caller
    /// is expected to route it through `crate::peephole::peephole` once,
    /// which assigns `Pure:Bottom` via `compute`.
    pub fn duplicate(&self, graph: &mut Graph) -> ScopeNode {
        let node = graph.new_node(NodeKind::Scope, None);
        let inputs: Vec<Option<NodeId>> = graph.input(self.node).to_vec();
        for input in inputs {
            graph.push_input(node, input);
        }
        ScopeNode {
            node,
            frames: self.frames.clone(),
        }
    }

    /// Names declared on the innermost frame, for the `if`/`else` merge to
    /// decide which bindings actually need a `Phi`.
    pub fn innermost_names(&self) -> impl Iterator<Item = &str> {
        self.frames
            .iter()
            .flat_map(|frame| frame.keys())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypePool;

    fn start_like(graph: &mut Graph, pool: &mut TypePool) -> NodeId {
        let ctrl_ty = pool.ctrl();
        let n = graph.new_node(NodeKind::Start { args: ctrl_ty }, None);
        graph.set_type(n, Some(ctrl_ty));
        n
    }

    #[test]
    fn push_pop_restores_input_length() {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let ctrl = start_like(&mut graph, &mut pool);
        let mut scope = ScopeNode::new(&mut graph, ctrl);
        let before = graph.input_len(scope.node);

        scope.push();
        let x_ty = pool.int_const(1);
        let x = graph.new_node(NodeKind::Const { value: x_ty }, None);
        graph.set_type(x, Some(x_ty));
        scope.define(&mut graph, "x", x);
        assert_eq!(graph.input_len(scope.node), before + 1);

        scope.pop(&mut graph);
        assert_eq!(graph.input_len(scope.node), before);
    }

    #[test]
    fn find_walks_frames_innermost_first() {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let ctrl = start_like(&mut graph, &mut pool);
        let mut scope = ScopeNode::new(&mut graph, ctrl);

        let outer_ty = pool.int_const(1);
        let outer = graph.new_node(NodeKind::Const { value: outer_ty }, None);
        graph.set_type(outer, Some(outer_ty));
        scope.define(&mut graph, "x", outer);

        scope.push();
        let inner_ty = pool.int_const(2);
        let inner = graph.new_node(NodeKind::Const { value: inner_ty }, None);
        graph.set_type(inner, Some(inner_ty));
        scope.define(&mut graph, "x", inner);

        assert_eq!(scope.find(&graph, "x"), Some(inner));
        scope.pop(&mut graph);
        assert_eq!(scope.find(&graph, "x"), Some(outer));
    }

    #[test]
    fn duplicate_shares_defs_and_adds_output_edges() {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let ctrl = start_like(&mut graph, &mut pool);
        let scope = ScopeNode::new(&mut graph, ctrl);
        let before = graph.output(ctrl).len();

        let dup = scope.duplicate(&mut graph);
        assert_eq!(graph.output(ctrl).len(), before + 1);
        assert_eq!(dup.find(&graph, CTRL_NAME), Some(ctrl));
        assert_ne!(dup.node, scope.node);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let ctrl = start_like(&mut graph, &mut pool);
        let scope = ScopeNode::new(&mut graph, ctrl);
        assert_eq!(scope.find(&graph, "nope"), None);
    }
}
