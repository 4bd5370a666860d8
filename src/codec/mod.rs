//! Container codec: the self-describing binary layout for gtype values,
//! with its builder, iterator, and the equality/containment/hash
//! algorithms.
//!
//! A serialized value is a length-prefixed buffer whose root is a
//! container; see `binary` for the exact layout. `Gtype` owns the buffer,
//! `ContainerRef` and the iterator borrow it.

pub mod binary;
pub mod builder;
pub mod compare;
pub mod ext;
pub mod iterator;
pub mod serialize;

pub use binary::{ContainerRef, Gtype};
pub use builder::{build_list, build_map, BuildToken, Builder};
pub use compare::{compare_values, deep_contains, hash_value};
pub use iterator::{GtypeIterator, IterToken};

/// Maximum nesting depth for the builder, parser, and decode recursion.
pub const MAX_NESTING_DEPTH: usize = 64;
