//! tiered-dict: an insertion-ordered dictionary for a dynamic object
//! model, with fast paths for primitive integer and text keys.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a mapping whose keys are arbitrary host values, where the
//!   common primitive keys never pay for protocol dispatch, and whose
//!   iteration order is first-insertion order.
//! - Layers:
//!   - Tables<P>: partitioned storage. Integer keys, text keys (with a
//!     reverse index from protocol hash to text) and generic keys (one
//!     collision chain per protocol hash). Each entry carries a rank;
//!     a version counter moves on every key-count change.
//!   - Dict<P>: public mutation API over `Tables`, or over a foreign
//!     host object whose named slots are the entries. Owns the missing
//!     key hook dispatch, update sources, merge operators, repr and the
//!     live length that views check against.
//!   - Views: snapshots of keys, values or items plus a length check;
//!     keys and items expose set algebra through `ValueSet`.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (values share data through `Rc`).
//! - Hashing and equality of non-primitive keys go through an injected
//!   `Protocol`, in the role a `BuildHasher` plays for std maps.
//! - A key is classified once per operation (`KeyClass`) and routed by
//!   that classification.
//! - One logical key occupies exactly one partition, even when a generic
//!   key compares equal to a primitive one.
//!
//! Reentrancy policy
//! - Protocol callbacks (hash, eq, repr) run user code and may reach
//!   other dictionaries. Shared dictionaries live behind `DictRef`, whose
//!   borrows fail with a `RuntimeError` rather than panicking when user
//!   code re-enters a dictionary that is being mutated.
//! - Bulk copies from a shared source re-check the source version after
//!   each insert and stop with "dict mutated during update".
//! - Rendering guards each dictionary with a re-entry flag; a cycle
//!   renders as `{...}`.
//! - Equality has its own flag: comparing a dictionary that is already
//!   being compared fails with a `RuntimeError` instead of recursing.
//!
//! Notes and non-goals
//! - No thread safety, no persistence, no custom allocators.
//! - `popitem` removes the most recently inserted entry.
//! - `Tables` is an implementation detail; the `bench_internal` feature
//!   exposes it for benchmarks only.

mod class;
mod dict;
mod error;
mod foreign;
mod protocol;
mod proxy;
mod reentrancy;
mod repr;
mod set;
mod source;
#[cfg(feature = "bench_internal")]
pub mod tables;
#[cfg(not(feature = "bench_internal"))]
mod tables;
mod tables_proptest;
mod testing;
mod value;
mod views;

// Public surface
pub use class::{DictClass, MissingHook};
pub use dict::{Dict, DictRef, OpResult};
pub use error::{DictError, ErrorKind};
pub use foreign::ForeignObject;
pub use protocol::{DynObject, DynProtocol, ObjectRef, Protocol};
pub use proxy::MappingProxy;
pub use set::ValueSet;
pub use source::{Mapping, Source};
pub use value::{KeyClass, Value};
pub use views::{ItemsView, KeysView, SetView, ValuesView, ViewIter};
