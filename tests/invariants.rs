//! Property tests for the invariants named in the design's "testable
//! properties" section: dual edges, interning, the meet algebra, peephole
//! idempotence, constant folding, Add's canonical form, the dead-code
//! cascade, and scope stack balance.

use proptest::prelude::*;

use nodegraph_ir::ir::{Graph, NodeId, NodeKind};
use nodegraph_ir::peephole::peephole;
use nodegraph_ir::types::{Kind, Level, Range, Type, TypePool};
use nodegraph_ir::unit::CompilationUnit;

/// Every non-null `n.input[i] = d` must show up exactly once in `d.output`
/// for each occurrence of `n` at that slot — i.e. `d.output`'s count of `n`
/// equals the number of `n`'s input slots pointing at `d`.
fn dual_edges_hold(graph: &Graph, n: NodeId) {
    let mut expected_counts: std::collections::HashMap<NodeId, usize> = std::collections::HashMap::new();
    for slot in graph.input(n) {
        if let Some(d) = slot {
            *expected_counts.entry(*d).or_insert(0) += 1;
        }
    }
    for (d, count) in expected_counts {
        let actual = graph.output(d).iter().filter(|&&o| o == n).count();
        assert_eq!(actual, count, "dual edge mismatch between {n} and {d}");
    }
}

proptest! {
    /// Invariant 1: dual edges survive any sequence of const/add builds,
    /// each immediately run through peephole, which itself rewires inputs
    /// via `set_input`/`kill`.
    #[test]
    fn dual_edges_survive_arithmetic_chains(values in prop::collection::vec(-1000i64..1000, 1..12)) {
        let mut unit = CompilationUnit::new();
        let mut acc = unit.make_const(values[0], None);
        for &v in &values[1..] {
            let c = unit.make_const(v, None);
            acc = unit.make_binop(NodeKind::Add, acc, c, None);
            dual_edges_hold(&unit.graph, acc);
        }
        for id in unit.graph.live_nodes().collect::<Vec<_>>() {
            dual_edges_hold(&unit.graph, id);
        }
    }

    /// Invariant 2: interning two structurally-equal `Type`s always returns
    /// the same id, and two structurally-different ones never collide.
    #[test]
    fn interning_matches_structural_equality(a in -1000i64..1000, b in -1000i64..1000) {
        let mut pool = TypePool::new();
        let t1 = pool.request(Type::Int(Level::Known, Range::single(a)));
        let t2 = pool.request(Type::Int(Level::Known, Range::single(a)));
        prop_assert_eq!(t1, t2);
        if a != b {
            let t3 = pool.request(Type::Int(Level::Known, Range::single(b)));
            prop_assert_ne!(t1, t3);
        }
    }

    /// Invariant 3: `meet` is commutative, and `meet(a, Top_of(kind)) = a`,
    /// `meet(a, Bottom_of(kind)) = Bottom_of(kind)`.
    #[test]
    fn meet_identities_hold(a in -1000i64..1000, b in -1000i64..1000) {
        let mut pool = TypePool::new();
        let ta = pool.int_const(a);
        let tb = pool.int_const(b);
        prop_assert_eq!(pool.meet(ta, tb), pool.meet(tb, ta));

        let top = pool.top_of(Kind::Int);
        prop_assert_eq!(pool.meet(ta, top), ta);
        prop_assert_eq!(pool.meet(top, ta), ta);

        let bottom = pool.bottom_of(Kind::Int);
        prop_assert_eq!(pool.meet(ta, bottom), bottom);
        prop_assert_eq!(pool.meet(bottom, ta), bottom);
    }

    /// Invariant 4: running a already-normalized node back through
    /// `peephole` is a no-op — it returns the same id.
    #[test]
    fn peephole_is_idempotent(a in -1000i64..1000, b in -1000i64..1000) {
        let mut unit = CompilationUnit::new();
        let lhs = unit.make_const(a, None);
        let rhs = unit.make_const(b, None);
        let sum = unit.make_binop(NodeKind::Add, lhs, rhs, None);
        let again = peephole(&mut unit.graph, &mut unit.pool, unit.start, sum);
        prop_assert_eq!(again, sum);
    }

    /// Invariant 5: folding Add/Sub/Mul/Div/Mod of two constant ints always
    /// produces a `Const` node whose value matches plain `i64` arithmetic,
    /// with div/mod by zero landing on 0 rather than trapping.
    #[test]
    fn arithmetic_on_constants_folds_to_the_right_value(
        a in -1000i64..1000,
        b in -1000i64..1000,
    ) {
        let mut unit = CompilationUnit::new();
        let lhs = unit.make_const(a, None);
        let rhs = unit.make_const(b, None);

        fn check(unit: &mut CompilationUnit, kind: NodeKind, lhs: NodeId, rhs: NodeId, expected: i64) {
            let result = unit.make_binop(kind, lhs, rhs, None);
            assert!(matches!(unit.graph.kind(result), NodeKind::Const { .. }));
            let ty = unit.graph.ty(result).unwrap();
            assert_eq!(nodegraph_ir::types::int_value(&unit.pool, ty), expected);
        }

        check(&mut unit, NodeKind::Add, lhs, rhs, a.wrapping_add(b));
        check(&mut unit, NodeKind::Sub, lhs, rhs, a.wrapping_sub(b));
        check(&mut unit, NodeKind::Mul, lhs, rhs, a.wrapping_mul(b));
        check(&mut unit, NodeKind::Div, lhs, rhs, if b == 0 { 0 } else { a.wrapping_div(b) });
        check(&mut unit, NodeKind::Mod, lhs, rhs, if b == 0 { 0 } else { a.wrapping_rem(b) });
    }

    /// Invariant 6: after peephole, an Add never has its right-hand input
    /// be another Add (the spine left-leans), and a Const only appears on
    /// the left when the right is also a Const (which would have folded).
    #[test]
    fn add_spine_is_left_leaning(values in prop::collection::vec(-100i64..100, 3..8), var in -100i64..100) {
        let mut unit = CompilationUnit::new();
        let arg = unit.scope.find(&unit.graph, nodegraph_ir::unit::ARG_NAME).unwrap();
        let first = unit.make_const(var, None);
        let mut acc = unit.make_binop(NodeKind::Add, arg, first, None);
        for &v in &values {
            let c = unit.make_const(v, None);
            acc = unit.make_binop(NodeKind::Add, acc, c, None);
        }
        if let NodeKind::Add = unit.graph.kind(acc) {
            let rhs = unit.graph.input(acc)[1].unwrap();
            prop_assert!(!unit.graph.kind(rhs).is_add());
        }
    }

    /// Invariant 7: killing a node whose subgraph is otherwise entirely
    /// unused drops the live count by exactly that subgraph's size.
    #[test]
    fn killing_an_unused_subgraph_drops_its_full_size(depth in 1usize..6) {
        let mut graph = Graph::new();
        let mut pool = TypePool::new();
        let mut prev = {
            let ty = pool.int_const(1);
            let n = graph.new_node(NodeKind::Const { value: ty }, None);
            graph.push_input(n, None);
            graph.set_type(n, Some(ty));
            n
        };
        let mut chain = vec![prev];
        for _ in 0..depth {
            let n = graph.new_node(NodeKind::Neg, None);
            graph.push_input(n, Some(prev));
            let ty = pool.int_const(0);
            graph.set_type(n, Some(ty));
            prev = n;
            chain.push(n);
        }
        let before = graph.live_count();
        graph.kill(prev);
        prop_assert_eq!(graph.live_count(), before - chain.len());
        for id in chain {
            prop_assert!(graph.is_dead(id));
        }
    }

    /// Invariant 8: a balanced sequence of `push`/`pop` on the scope leaves
    /// its input-slot count exactly where it started. Names are generated
    /// distinct (`v0`, `v1`, ...) since `pop` drops as many trailing inputs
    /// as the frame has distinct keys — shadowing the same name twice
    /// within one frame is a separate concern from stack balance.
    #[test]
    fn scope_push_pop_is_balanced(count in 0usize..6) {
        let mut unit = CompilationUnit::new();
        let before = unit.graph.input_len(unit.scope.node);
        unit.scope.push();
        for i in 0..count {
            let v = unit.make_const(i as i64, None);
            let name = format!("v{i}");
            unit.scope.define(&mut unit.graph, &name, v);
        }
        unit.scope.pop(&mut unit.graph);
        prop_assert_eq!(unit.graph.input_len(unit.scope.node), before);
    }
}
