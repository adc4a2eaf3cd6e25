//! The peephole optimizer: the single entry point every freshly built node
//! is normalized through before anything else is allowed to see it.
//!
//! `peephole` runs three steps in order, synchronously, per node:
//!
//! 1. `compute` assigns the node's type from its already-typed inputs.
//! 2. If that type is constant — with the Ctrl-kind exception the
//!    `REDESIGN FLAGS` section calls for — fold the node to a fresh `Const`
//!    rooted at `start` and recurse, so the replacement itself gets
//!    typed/idealized/interned the same way.
//! 3. Otherwise try `idealize`'s local rewrites; if one applies, recurse on
//!    the rewrite and kill the original if it is now unused. If none
//!    applies, the node is already in normal form.
//!
//! Every public `Graph::build_*` + `peephole` pair is how this crate
//! constructs a "real" (normalized, interned-by-construction) node; raw
//! `build_*` calls on their own only exist so `idealize`'s rewrites have
//! something to build before recursing back into this function.

mod compute;
mod idealize;

use crate::ir::{Graph, NodeId, NodeKind};
use crate::types::{is_constant, Kind, TypePool};

pub use compute::compute;
pub use idealize::idealize;

/// Normalize `n` to a fixed point: type it, fold it if constant, idealize
/// it if not, and repeat on whatever the fold/rewrite produced. `start` is
/// the graph's `Start` node, needed to root any `Const` this fabricates.
pub fn peephole(graph: &mut Graph, pool: &mut TypePool, start: NodeId, n: NodeId) -> NodeId {
    let ty = compute(graph, pool, n);
    graph.set_type(n, Some(ty));

    // `is_constant` always answers yes for Ctrl, so anything whose computed
    // type is Ctrl-kinded (Region, and a Start's/If's control Proj) would
    // otherwise constant-fold into a nonsensical Const-carrying-Ctrl node.
    // This crate excludes the whole Ctrl kind from step 2, not just Region,
    // per the REDESIGN FLAGS note (`compute` never hands Ctrl to anything
    // else besides Region and a control Proj in practice).
    let is_ctrl_typed = pool.get(ty).kind() == Kind::Ctrl;
    let foldable = !is_ctrl_typed && is_constant(pool, ty);

    if foldable {
        if let NodeKind::Const { .. } = graph.kind(n) {
            return n;
        }
        let token = graph.token(n).cloned();
        let folded = graph.build_const(ty, start, token);
        let folded = peephole(graph, pool, start, folded);
        kill_if_now_unused(graph, n, folded);
        return folded;
    }

    if let Some(rewritten) = idealize(graph, pool, start, n) {
        if rewritten == n {
            // In-place rewrites (operand swaps) still need re-typing before
            // any further idealize rule runs against the new shape.
            return peephole(graph, pool, start, n);
        }
        let rewritten = peephole(graph, pool, start, rewritten);
        kill_if_now_unused(graph, n, rewritten);
        return rewritten;
    }

    n
}

/// `n` has just been replaced by `replacement` everywhere its callers used
/// it; if nothing still points at the original, it can be reclaimed.
///
/// `replacement` is often one of `n`'s own inputs (an identity rewrite like
/// `x + 0 -> x` returns `x` itself). `kill` tears down every one of `n`'s
/// inputs and reclaims any that drop to zero users — if `n` was
/// `replacement`'s only other user, that would reclaim `replacement` out
/// from under the caller that is about to receive it as the live result.
/// `keep`/`unkeep` bracket the kill with a temporary extra user so
/// `replacement` survives `n`'s teardown no matter how deep the shared
/// edge sits.
fn kill_if_now_unused(graph: &mut Graph, n: NodeId, replacement: NodeId) {
    if n != replacement && graph.is_unused(n) && graph.ty(n).is_some() {
        graph.keep(replacement);
        graph.kill(n);
        graph.unkeep(replacement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Kind, Type};

    fn start_and_pool() -> (Graph, TypePool, NodeId) {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let ctrl = pool.ctrl();
        let int_ty = pool.bottom_of(Kind::Int);
        let args = pool.tuple(&[ctrl, int_ty]);
        let start = graph.build_start(args);
        graph.set_type(start, Some(args));
        (graph, pool, start)
    }

    #[test]
    fn constant_add_folds_to_a_single_const_node() {
        let (mut graph, mut pool, start) = start_and_pool();
        let one = pool.int_const(1);
        let two = pool.int_const(2);
        let a = graph.build_const(one, start, None);
        let a = peephole(&mut graph, &mut pool, start, a);
        let b = graph.build_const(two, start, None);
        let b = peephole(&mut graph, &mut pool, start, b);
        let add = graph.build_binop(NodeKind::Add, a, b, None);
        let result = peephole(&mut graph, &mut pool, start, add);

        assert!(matches!(graph.kind(result), NodeKind::Const { .. }));
        match pool.get(graph.ty(result).unwrap()) {
            Type::Int(_, r) => assert_eq!(r.min, 3),
            other => panic!("expected Int, got {other:?}"),
        }
        // The original Add and its two now-unused Const operands are gone.
        assert!(graph.is_dead(add));
    }

    #[test]
    fn region_is_never_folded_despite_being_constant() {
        let (mut graph, mut pool, start) = start_and_pool();
        let proj0 = graph.build_proj(0, start, None);
        let proj0 = peephole(&mut graph, &mut pool, start, proj0);
        let region = graph.build_region(&[proj0, proj0], None);
        let result = peephole(&mut graph, &mut pool, start, region);
        assert!(matches!(graph.kind(result), NodeKind::Region));
    }

    #[test]
    fn identity_rewrite_does_not_kill_the_node_it_returns() {
        // arg*arg*1 idealizes its outer Mul to its own lhs (arg*arg); that
        // lhs has no other user, so killing the outer Mul must not also
        // reclaim the inner one out from under the result being returned.
        let (mut graph, mut pool, start) = start_and_pool();
        let arg = graph.build_proj(1, start, None);
        let arg = peephole(&mut graph, &mut pool, start, arg);
        let inner = graph.build_binop(NodeKind::Mul, arg, arg, None);
        let inner = peephole(&mut graph, &mut pool, start, inner);
        let one = pool.int_const(1);
        let one = graph.build_const(one, start, None);
        let one = peephole(&mut graph, &mut pool, start, one);
        let outer = graph.build_binop(NodeKind::Mul, inner, one, None);
        let result = peephole(&mut graph, &mut pool, start, outer);

        assert_eq!(result, inner);
        assert!(!graph.is_dead(result));
        assert!(graph.ty(result).is_some());
    }

    #[test]
    fn idealize_rewrite_runs_to_a_fixed_point() {
        // (arg + 0) + arg should settle to arg * 2, not stop after one
        // rewrite step.
        let (mut graph, mut pool, start) = start_and_pool();
        let arg = graph.build_proj(1, start, None);
        let arg = peephole(&mut graph, &mut pool, start, arg);
        let zero = pool.int_const(0);
        let zero = graph.build_const(zero, start, None);
        let zero = peephole(&mut graph, &mut pool, start, zero);
        let lhs = graph.build_binop(NodeKind::Add, arg, zero, None);
        let lhs = peephole(&mut graph, &mut pool, start, lhs);
        assert_eq!(lhs, arg);

        let add = graph.build_binop(NodeKind::Add, lhs, arg, None);
        let result = peephole(&mut graph, &mut pool, start, add);
        assert!(matches!(graph.kind(result), NodeKind::Mul));
    }
}
