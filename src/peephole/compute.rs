//! `compute`: bottom-up type refinement. Assigns every node's best-known
//! lattice position purely from its inputs' already-known types — it never
//! looks at outputs and never mutates the graph's edges, only (via the
//! caller in [`super::peephole`]) the node's own `ty` slot.

use crate::ir::{Graph, NodeId, NodeKind};
use crate::op::Op;
use crate::types::{is_constant, Type, TypeId, TypePool};

fn input_ty(graph: &Graph, n: NodeId, slot: usize) -> TypeId {
    let def = graph.input(n)[slot].unwrap_or_else(|| panic!("compute: node {n} input {slot} is null"));
    graph
        .ty(def)
        .unwrap_or_else(|| panic!("compute: node {n} input {slot} has no type yet"))
}

fn binary_arith_type(pool: &mut TypePool, op: Op, lt: TypeId, rt: TypeId) -> TypeId {
    if is_constant(pool, lt) && is_constant(pool, rt) {
        match (pool.get(lt).clone(), pool.get(rt).clone()) {
            (Type::Int(_, l), Type::Int(_, r)) => pool.int_const(op.apply(l.min, r.min)),
            _ => pool.meet(lt, rt),
        }
    } else {
        pool.meet(lt, rt)
    }
}

/// Compute `n`'s type from its inputs. Panics on `Undefined` (a node that
/// should never exist) and on a `Proj` whose producer did not turn out to
/// be a `Tuple` — both fatal invariant violations, not recoverable parse
/// errors.
pub fn compute(graph: &Graph, pool: &mut TypePool, n: NodeId) -> TypeId {
    let ty = match graph.kind(n) {
        NodeKind::Undefined => panic!("compute called on an Undefined node"),

        NodeKind::Scope | NodeKind::Ret => pool.bottom(),

        NodeKind::Start { args } => *args,

        NodeKind::Const { value } => *value,

        NodeKind::If => {
            let ctrl = pool.ctrl();
            pool.tuple(&[ctrl, ctrl])
        }

        NodeKind::Region => pool.ctrl(),

        NodeKind::Proj { index } => {
            let tuple_ty = input_ty(graph, n, 0);
            match pool.get(tuple_ty) {
                Type::Tuple(_, elems) => elems
                    .get(*index as usize)
                    .copied()
                    .unwrap_or_else(|| panic!("Proj index {index} out of range for {n}")),
                other => panic!("Proj's producer is not a Tuple type: {other:?}"),
            }
        }

        NodeKind::Phi => pool.bottom(),

        NodeKind::Neg => {
            let rt = input_ty(graph, n, 0);
            if is_constant(pool, rt) {
                if let Type::Int(_, r) = pool.get(rt) {
                    pool.int_const(-r.min)
                } else {
                    rt
                }
            } else {
                rt
            }
        }

        NodeKind::Add => binary_arith_type(pool, Op::Add, input_ty(graph, n, 0), input_ty(graph, n, 1)),
        NodeKind::Sub => binary_arith_type(pool, Op::Sub, input_ty(graph, n, 0), input_ty(graph, n, 1)),
        NodeKind::Mul => binary_arith_type(pool, Op::Mul, input_ty(graph, n, 0), input_ty(graph, n, 1)),
        NodeKind::Div => binary_arith_type(pool, Op::Div, input_ty(graph, n, 0), input_ty(graph, n, 1)),
        NodeKind::Mod => binary_arith_type(pool, Op::Mod, input_ty(graph, n, 0), input_ty(graph, n, 1)),
    };
    log::trace!("compute({n}: {}) -> {ty:?}", graph.kind(n).name());
    ty
}
