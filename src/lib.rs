//! structpatch - RFC 6902 JSON Patch generation from typed values
//!
//! Two values of the same type are walked side by side and every difference
//! becomes an `add`, `remove` or `replace` operation addressed by an RFC 6901
//! JSON Pointer. Sequences can be compared by element identity instead of
//! position, and both the filtering and the construction of operations are
//! pluggable.

pub mod diffable;
pub mod error;
pub mod handler;
pub mod options;
pub mod patch;
pub mod pointer;
pub mod predicate;
mod walker;

#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}

/// Derive macro to generate [`diffable::Diffable`](crate::diffable::Diffable) implementations.
pub use structpatch_derive::Diffable;

pub use diffable::{Diffable, Field, Node, Shape};
pub use error::{PatchError, PatchResult};
pub use handler::{DefaultHandler, Handler};
pub use options::{DEFAULT_MAX_DEPTH, IgnorePattern, Options};
pub use patch::{OpKind, Operation, PatchList, create_json_patch, create_three_way_json_patch};
pub use pointer::Pointer;
pub use predicate::{AllowAll, Predicate, PredicateFns};
