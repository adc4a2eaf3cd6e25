//! `idealize`: the local algebraic rewrite rules applied once `compute` has
//! assigned a node's type and it has turned out not to be an outright
//! constant. Returns the rewritten (but not yet re-peepholed) node; `None`
//! means no rewrite applies.
//!
//! Every rule here assumes its node's operand types are not *both*
//! constant — `super::peephole`'s constant-fold step (step 2 of the
//! contract) would already have replaced the node with a `Const` before
//! `idealize` ever runs.

use crate::ir::{Graph, NodeId, NodeKind};
use crate::types::{is_constant, Type, TypePool};

/// Total order used to canonicalize commutative operand pairs: constants
/// sort to the right, otherwise higher `uid` sorts to the right. This is
/// what keeps repeated peepholing from oscillating between `a+b` and
/// `b+a`.
fn should_swap(graph: &Graph, left: NodeId, right: NodeId) -> bool {
    if graph.kind(right).is_const() {
        return false;
    }
    if graph.kind(left).is_const() {
        return true;
    }
    left.index() > right.index()
}

fn is_int_const(pool: &TypePool, graph: &Graph, n: NodeId) -> bool {
    let Some(ty) = graph.ty(n) else { return false };
    is_constant(pool, ty) && matches!(pool.get(ty), Type::Int(..))
}

fn swap_inputs(graph: &mut Graph, n: NodeId) {
    let lhs = graph.input(n)[0];
    let rhs = graph.input(n)[1];
    graph.set_input(n, 0, rhs);
    graph.set_input(n, 1, lhs);
}

/// `idealize(n)`, dispatched by kind. `start` is needed to root freshly
/// fabricated `Const` nodes, matching `Const`'s `[ctrl]` input shape.
pub fn idealize(graph: &mut Graph, pool: &mut TypePool, start: NodeId, n: NodeId) -> Option<NodeId> {
    match graph.kind(n) {
        NodeKind::Scope
        | NodeKind::Start { .. }
        | NodeKind::Ret
        | NodeKind::Proj { .. }
        | NodeKind::Const { .. }
        | NodeKind::If
        | NodeKind::Region
        // Phi's rewrite rules are reserved (commented out in the system this
        // was distilled from); treated as a no-op here too.
        | NodeKind::Phi => None,

        NodeKind::Add => idealize_add(graph, pool, start, n),
        NodeKind::Sub => idealize_sub(graph, pool, start, n),
        NodeKind::Mul => idealize_mul(graph, pool, n),
        NodeKind::Div => idealize_div(graph, pool, n),
        NodeKind::Mod => idealize_mod(graph, pool, start, n),
        NodeKind::Neg => None,

        NodeKind::Undefined => panic!("idealize called on an Undefined node"),
    }
}

fn idealize_add(graph: &mut Graph, pool: &mut TypePool, start: NodeId, n: NodeId) -> Option<NodeId> {
    let lhs = graph.input(n)[0].unwrap();
    let rhs = graph.input(n)[1].unwrap();
    debug_assert!(
        !(is_int_const(pool, graph, lhs) && is_int_const(pool, graph, rhs)),
        "peephole should have already constant-folded this Add"
    );

    // x + 0 -> x (0 + x canonicalizes to x + 0 via should_swap, below).
    if is_zero(pool, graph, rhs) {
        return Some(lhs);
    }

    // x + x -> x * 2.
    if lhs == rhs {
        let two = pool.int_const(2);
        let multiplier = graph.build_const(two, start, None);
        let multiplier = super::peephole(graph, pool, start, multiplier);
        let mul = graph.build_binop(NodeKind::Mul, lhs, multiplier, None);
        return Some(mul);
    }

    // Canonicalize: adds on the left, everything else on the right.
    if !graph.kind(lhs).is_add() && graph.kind(rhs).is_add() {
        swap_inputs(graph, n);
        return Some(n);
    }

    // x + (y + z) -> (x + y) + z: rotate to remove the Add on the right.
    if graph.kind(rhs).is_add() {
        let rhs_lhs = graph.input(rhs)[0].unwrap();
        let rhs_rhs = graph.input(rhs)[1].unwrap();
        let new_lhs = graph.build_binop(NodeKind::Add, lhs, rhs_lhs, None);
        let new_lhs = super::peephole(graph, pool, start, new_lhs);
        let add = graph.build_binop(NodeKind::Add, new_lhs, rhs_rhs, None);
        return Some(add);
    }

    // Now lhs is Add or not-Add, rhs is never Add.
    if !graph.kind(lhs).is_add() {
        if should_swap(graph, lhs, rhs) {
            swap_inputs(graph, n);
            return Some(n);
        }
        return None;
    }

    // lhs is Add, rhs is not: (x + con1) + con2 -> x + (con1 + con2), which
    // then folds the constants together.
    let lhs_lhs = graph.input(lhs)[0].unwrap();
    let lhs_rhs = graph.input(lhs)[1].unwrap();
    if graph.kind(lhs_rhs).is_const() && graph.kind(rhs).is_const() {
        let new_rhs = graph.build_binop(NodeKind::Add, lhs_rhs, rhs, None);
        let new_rhs = super::peephole(graph, pool, start, new_rhs);
        let add = graph.build_binop(NodeKind::Add, lhs_lhs, new_rhs, None);
        return Some(add);
    }

    // Sort along the spine: (x + y) + z -> (x + z) + y, if that orders
    // better.
    if should_swap(graph, lhs_rhs, rhs) {
        let new_lhs = graph.build_binop(NodeKind::Add, lhs_lhs, rhs, None);
        let new_lhs = super::peephole(graph, pool, start, new_lhs);
        let add = graph.build_binop(NodeKind::Add, new_lhs, lhs_rhs, None);
        return Some(add);
    }

    None
}

fn idealize_sub(graph: &mut Graph, pool: &mut TypePool, _start: NodeId, n: NodeId) -> Option<NodeId> {
    let lhs = graph.input(n)[0].unwrap();
    let rhs = graph.input(n)[1].unwrap();

    if is_zero(pool, graph, rhs) {
        return Some(lhs);
    }
    if is_zero(pool, graph, lhs) {
        let neg = graph.build_unop(NodeKind::Neg, rhs, None);
        return Some(neg);
    }
    None
}

fn idealize_mul(graph: &mut Graph, pool: &TypePool, n: NodeId) -> Option<NodeId> {
    let lhs = graph.input(n)[0].unwrap();
    let rhs = graph.input(n)[1].unwrap();

    if is_one(pool, graph, rhs) {
        return Some(lhs);
    }
    if graph.kind(lhs).is_const() && !graph.kind(rhs).is_const() {
        swap_inputs(graph, n);
        return Some(n);
    }
    None
}

fn idealize_div(graph: &mut Graph, pool: &TypePool, n: NodeId) -> Option<NodeId> {
    let lhs = graph.input(n)[0].unwrap();
    let rhs = graph.input(n)[1].unwrap();
    if is_one(pool, graph, rhs) {
        return Some(lhs);
    }
    None
}

fn idealize_mod(graph: &mut Graph, pool: &mut TypePool, start: NodeId, n: NodeId) -> Option<NodeId> {
    let rhs = graph.input(n)[1].unwrap();
    if is_one(pool, graph, rhs) {
        let zero = pool.int_const(0);
        let const_node = graph.build_const(zero, start, None);
        return Some(const_node);
    }
    None
}

fn is_zero(pool: &TypePool, graph: &Graph, n: NodeId) -> bool {
    int_value_of(pool, graph, n) == Some(0)
}

fn is_one(pool: &TypePool, graph: &Graph, n: NodeId) -> bool {
    int_value_of(pool, graph, n) == Some(1)
}

fn int_value_of(pool: &TypePool, graph: &Graph, n: NodeId) -> Option<i64> {
    let ty = graph.ty(n)?;
    match pool.get(ty) {
        Type::Int(_, r) if r.is_const() => Some(r.min),
        _ => None,
    }
}
