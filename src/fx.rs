//! Fast, non-cryptographic hashing for internal maps.
//!
//! Everything in this crate that hashes structural or lexical keys (the
//! type pool's intern table, via `FxHasher`; a scope's name-to-slot frames,
//! via `FxHashMap`) goes through `rustc_hash` rather than the default
//! SipHash-based `std` hasher; none of it is exposed to untrusted input, so
//! the speed is free.

pub(crate) use rustc_hash::FxHashMap;
pub(crate) use rustc_hash::FxHasher;
