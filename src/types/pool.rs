//! Hash-consing storage for [`Type`]s.
//!
//! The pool is a single growable `Vec<Type>` addressed by [`TypeId`],
//! backed by a [`crate::ctxhash::CtxHashMap`] keyed on the `Type` value
//! itself. Looking a value up before allocating an id (rather than the
//! allocate-then-compare-by-id trick some hash-cons tables use) avoids any
//! self-referential borrow between the interning table and the backing
//! store, at the cost of one clone of the candidate `Type` per `request`
//! call — cheap, since every variant here is small or a short tuple slice.

use super::{hash_type_value, Kind, Level, Range, Type, TypeId};
use crate::ctxhash::{CtxEq, CtxHash, CtxHashMap};
use std::hash::Hasher;

struct TypeCtx;

impl CtxEq<Type, Type> for TypeCtx {
    fn ctx_eq(&self, a: &Type, b: &Type) -> bool {
        a == b
    }
}

impl CtxHash<Type> for TypeCtx {
    fn ctx_hash<H: Hasher>(&self, state: &mut H, value: &Type) {
        hash_type_value(state, value)
    }
}

/// Owns every [`Type`] interned during one compilation unit.
pub struct TypePool {
    types: Vec<Type>,
    table: CtxHashMap<Type, TypeId>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            table: CtxHashMap::with_capacity(64),
        }
    }

    /// Intern `t`, returning its canonical id. Structurally-equal values
    /// always return the same id.
    pub fn request(&mut self, t: Type) -> TypeId {
        let ctx = TypeCtx;
        if let Some(&id) = self.table.get(&t, &ctx) {
            return id;
        }
        let id = TypeId::new(self.types.len());
        self.types.push(t.clone());
        self.table.insert(t, id, &ctx);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    // -- convenience constructors, mirroring the common singleton accessors
    // a hand-consing pool for this lattice would expose --

    pub fn top(&mut self) -> TypeId {
        self.request(Type::Pure(Level::Top))
    }

    pub fn bottom(&mut self) -> TypeId {
        self.request(Type::Pure(Level::Bottom))
    }

    pub fn top_of(&mut self, kind: Kind) -> TypeId {
        self.request(Self::at_level(kind, Level::Top))
    }

    pub fn bottom_of(&mut self, kind: Kind) -> TypeId {
        self.request(Self::at_level(kind, Level::Bottom))
    }

    fn at_level(kind: Kind, level: Level) -> Type {
        match kind {
            Kind::Pure => Type::Pure(level),
            Kind::Ctrl => Type::Ctrl(level),
            Kind::Bool => Type::Bool(level, Range { min: 0, max: 0 }),
            Kind::Int => Type::Int(level, Range { min: 0, max: 0 }),
            Kind::Float => Type::Float(level, Range { min: 0.0, max: 0.0 }),
            Kind::Tuple => Type::Tuple(level, Box::new([])),
        }
    }

    pub fn ctrl(&mut self) -> TypeId {
        self.request(Type::Ctrl(Level::Known))
    }

    pub fn bool_any(&mut self) -> TypeId {
        self.request(Type::Bool(Level::Known, Range { min: 0, max: 1 }))
    }

    pub fn bool_false(&mut self) -> TypeId {
        self.request(Type::Bool(Level::Known, Range::single(0)))
    }

    pub fn bool_true(&mut self) -> TypeId {
        self.request(Type::Bool(Level::Known, Range::single(1)))
    }

    /// A fully-unconstrained `Int` of the given byte width (1/2/4/8).
    pub fn int_sized(&mut self, bytes: u32) -> TypeId {
        let bits = bytes * 8;
        let (min, max) = if bits >= 64 {
            (i64::MIN, i64::MAX)
        } else {
            let half = 1i64 << (bits - 1);
            (-half, half - 1)
        };
        self.request(Type::Int(Level::Known, Range { min, max }))
    }

    pub fn int_const(&mut self, v: i64) -> TypeId {
        self.request(Type::Int(Level::Known, Range::single(v)))
    }

    pub fn float_const(&mut self, v: f64) -> TypeId {
        self.request(Type::Float(Level::Known, Range::single(v)))
    }

    /// Interns a `Known` tuple. The element slice is deep-copied into a
    /// freshly boxed allocation owned by the pool entry.
    pub fn tuple(&mut self, elems: &[TypeId]) -> TypeId {
        self.request(Type::Tuple(Level::Known, elems.to_vec().into_boxed_slice()))
    }

    /// The lattice meet (greatest lower bound) of `a` and `b`.
    pub fn meet(&mut self, a: TypeId, b: TypeId) -> TypeId {
        let ta = self.get(a).clone();
        let tb = self.get(b).clone();

        if ta.kind() != tb.kind() {
            return self.bottom();
        }
        let kind = ta.kind();
        let (la, lb) = (ta.level(), tb.level());

        if la == Level::Top {
            return b;
        }
        if lb == Level::Top {
            return a;
        }
        if la == Level::Bottom {
            return a;
        }
        if lb == Level::Bottom {
            return b;
        }

        match (ta, tb) {
            (Type::Pure(_), Type::Pure(_)) | (Type::Ctrl(_), Type::Ctrl(_)) => a,
            (Type::Bool(_, ra), Type::Bool(_, rb)) => {
                let (min, max) = (ra.min.max(rb.min), ra.max.min(rb.max));
                if min > max {
                    self.bottom_of(kind)
                } else {
                    self.request(Type::Bool(Level::Known, Range { min, max }))
                }
            }
            (Type::Int(_, ra), Type::Int(_, rb)) => {
                let (min, max) = (ra.min.max(rb.min), ra.max.min(rb.max));
                if min > max {
                    self.bottom_of(kind)
                } else {
                    self.request(Type::Int(Level::Known, Range { min, max }))
                }
            }
            (Type::Float(_, ra), Type::Float(_, rb)) => {
                let (min, max) = (ra.min.max(rb.min), ra.max.min(rb.max));
                if min > max {
                    self.bottom_of(kind)
                } else {
                    self.request(Type::Float(Level::Known, Range { min, max }))
                }
            }
            (Type::Tuple(_, ea), Type::Tuple(_, eb)) => {
                if ea.len() != eb.len() {
                    return self.bottom();
                }
                let mut elems = Vec::with_capacity(ea.len());
                for i in 0..ea.len() {
                    elems.push(self.meet(ea[i], eb[i]));
                }
                self.request(Type::Tuple(Level::Known, elems.into_boxed_slice()))
            }
            _ => unreachable!("kind equality already checked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups_structurally_equal_values() {
        let mut pool = TypePool::new();
        let a = pool.int_const(42);
        let b = pool.int_const(42);
        assert_eq!(a, b);
        let c = pool.int_const(43);
        assert_ne!(a, c);
    }

    #[test]
    fn top_ignores_payload() {
        let mut pool = TypePool::new();
        let a = pool.top_of(Kind::Int);
        let b = pool.request(Type::Int(Level::Top, Range { min: 5, max: 9 }));
        assert_eq!(a, b);
    }

    #[test]
    fn meet_is_commutative_and_idempotent() {
        let mut pool = TypePool::new();
        let a = pool.int_const(3);
        let b = pool.int_sized(4);
        assert_eq!(pool.meet(a, b), pool.meet(b, a));
        assert_eq!(pool.meet(a, a), a);
    }

    #[test]
    fn meet_with_top_returns_other() {
        let mut pool = TypePool::new();
        let top = pool.top_of(Kind::Int);
        let five = pool.int_const(5);
        assert_eq!(pool.meet(top, five), five);
        assert_eq!(pool.meet(five, top), five);
    }

    #[test]
    fn meet_with_bottom_returns_bottom() {
        let mut pool = TypePool::new();
        let bottom = pool.bottom_of(Kind::Int);
        let five = pool.int_const(5);
        assert_eq!(pool.meet(bottom, five), bottom);
    }

    #[test]
    fn meet_of_disjoint_ranges_is_bottom() {
        let mut pool = TypePool::new();
        let a = pool.int_const(1);
        let b = pool.int_const(2);
        let m = pool.meet(a, b);
        assert_eq!(pool.get(m).kind(), Kind::Int);
        assert_eq!(pool.get(m).level(), Level::Bottom);
    }

    #[test]
    fn different_kinds_meet_to_pure_bottom() {
        let mut pool = TypePool::new();
        let i = pool.int_const(1);
        let c = pool.ctrl();
        let m = pool.meet(i, c);
        assert_eq!(pool.get(m).kind(), Kind::Pure);
        assert_eq!(pool.get(m).level(), Level::Bottom);
    }

    #[test]
    fn tuple_meet_is_pointwise() {
        let mut pool = TypePool::new();
        let a1 = pool.int_const(1);
        let a2 = pool.int_sized(4);
        let b1 = pool.int_sized(4);
        let b2 = pool.int_const(2);
        let ta = pool.tuple(&[a1, a2]);
        let tb = pool.tuple(&[b1, b2]);
        let m = pool.meet(ta, tb);
        match pool.get(m).clone() {
            Type::Tuple(Level::Known, elems) => {
                assert_eq!(elems.len(), 2);
                assert_eq!(elems[0], a1);
            }
            other => panic!("expected tuple, got {other:?}"),
        }
    }
}
