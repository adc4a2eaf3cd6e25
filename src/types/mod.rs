//! The type lattice: a small, hash-consed set of type shapes used by the
//! peephole engine to track what is known about a node's value.
//!
//! Every [`Type`] sits at one of three lattice levels (`Top`, `Known`,
//! `Bottom`) within one of six kinds. Two types are structurally equal iff
//! they compare equal; the pool in [`pool`] guarantees structural equality
//! implies reference (here: index) equality, so callers can compare
//! [`TypeId`]s directly instead of deref-and-compare.

pub mod pool;

use core::fmt;

pub use pool::TypePool;

/// Where a type sits in the `Top ⊑ Known ⊑ Bottom` lattice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// No information yet (identity element for `meet`).
    Top,
    /// A specific, possibly-narrowed value or range.
    Known,
    /// Fully unconstrained / contradictory (absorbing element for `meet`).
    Bottom,
}

/// Which axis of the lattice a type belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// Placeholder "any" type, used only as the `Pure:Bottom` error/void
    /// sentinel and for nodes with no data meaning (e.g. `Scope`, `Ret`).
    Pure,
    /// A control-flow token.
    Ctrl,
    Bool,
    Int,
    Float,
    Tuple,
}

/// An opaque reference to an interned [`Type`] in a [`TypePool`].
///
/// Two `TypeId`s compare equal iff the `Type`s they name are structurally
/// equal; the pool enforces this at `request` time, so the index itself is
/// a valid proxy for deep equality.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize);
        Self(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The canonical, owned representation of a type. Tuple children are
/// stored as resolved [`TypeId`]s; the payload slice itself is owned by
/// the `Tuple` variant so the pool can hand out a stable reference without
/// borrowing from the caller's scratch buffer.
#[derive(Clone, Debug)]
pub enum Type {
    Pure(Level),
    Ctrl(Level),
    Bool(Level, Range<i64>),
    Int(Level, Range<i64>),
    Float(Level, Range<f64>),
    Tuple(Level, Box<[TypeId]>),
}

// `Top`/`Bottom` ignore payload: two `Top` ints with different stored
// ranges are the same type. Only `Known` compares payload. Hand-written
// rather than derived so this rule is enforced in exactly one place.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        use Type::*;
        match (self, other) {
            (Pure(a), Pure(b)) | (Ctrl(a), Ctrl(b)) => a == b,
            (Bool(a, ra), Bool(b, rb)) | (Int(a, ra), Int(b, rb)) => {
                a == b && (*a != Level::Known || ra == rb)
            }
            (Float(a, ra), Float(b, rb)) => a == b && (*a != Level::Known || ra == rb),
            (Tuple(a, ea), Tuple(b, eb)) => a == b && (*a != Level::Known || ea == eb),
            _ => false,
        }
    }
}

fn hash_type_value<H: core::hash::Hasher>(state: &mut H, t: &Type) {
    use core::hash::Hash;
    core::mem::discriminant(t).hash(state);
    match t {
        Type::Pure(l) | Type::Ctrl(l) => l.hash(state),
        Type::Bool(l, r) | Type::Int(l, r) => {
            l.hash(state);
            if *l == Level::Known {
                r.min.hash(state);
                r.max.hash(state);
            }
        }
        Type::Float(l, r) => {
            l.hash(state);
            if *l == Level::Known {
                r.min.to_bits().hash(state);
                r.max.to_bits().hash(state);
            }
        }
        Type::Tuple(l, elems) => {
            l.hash(state);
            if *l == Level::Known {
                for e in elems.iter() {
                    e.hash(state);
                }
            }
        }
    }
}

/// An inclusive `[min, max]` range. `min > max` never occurs on a `Known`
/// value that made it through `meet` or a pool constructor; an empty
/// intersection collapses to `Bottom` instead, per the meet rules.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + PartialEq> Range<T> {
    pub fn single(v: T) -> Self {
        Range { min: v, max: v }
    }

    pub fn is_const(&self) -> bool {
        self.min == self.max
    }
}

impl Type {
    pub fn kind(&self) -> Kind {
        match self {
            Type::Pure(_) => Kind::Pure,
            Type::Ctrl(_) => Kind::Ctrl,
            Type::Bool(..) => Kind::Bool,
            Type::Int(..) => Kind::Int,
            Type::Float(..) => Kind::Float,
            Type::Tuple(..) => Kind::Tuple,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Type::Pure(l) | Type::Ctrl(l) => *l,
            Type::Bool(l, _) | Type::Int(l, _) => *l,
            Type::Float(l, _) => *l,
            Type::Tuple(l, _) => *l,
        }
    }
}

/// `constant(t)` per the lattice's constant-folding contract:
///
/// - a `Ctrl` type is always considered constant (it carries no payload to
///   vary),
/// - a `Known` `Bool`/`Int`/`Float` is constant iff its range is a single
///   point,
/// - a `Tuple` is constant only at `Top` (i.e. essentially never, once a
///   real tuple has been computed — see the `REDESIGN FLAGS` note on why
///   peephole special-cases `Region` rather than trusting this literally),
/// - `Pure` is never constant.
pub fn is_constant(pool: &TypePool, id: TypeId) -> bool {
    match pool.get(id) {
        Type::Pure(_) => false,
        Type::Ctrl(_) => true,
        Type::Bool(Level::Known, r) | Type::Int(Level::Known, r) => r.is_const(),
        Type::Float(Level::Known, r) => r.is_const(),
        Type::Tuple(Level::Top, _) => true,
        _ => false,
    }
}

/// The constant payload of a `Known` integer type, if `is_constant` holds
/// for it. Panics if `id` does not name a constant `Int`/`Bool` — callers
/// must check `is_constant` (or match on `Kind::Int`/`Kind::Bool`) first.
pub fn int_value(pool: &TypePool, id: TypeId) -> i64 {
    match pool.get(id) {
        Type::Int(Level::Known, r) | Type::Bool(Level::Known, r) if r.is_const() => r.min,
        other => panic!("int_value called on non-constant type {other:?}"),
    }
}
