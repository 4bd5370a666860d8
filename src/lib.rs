//! gval — graph value engine.
//!
//! The tagged, self-describing value format (`gtype`) used throughout a
//! property-graph query engine, together with the variable-length-edge
//! path finder that walks an in-memory graph cache.
//!
//! - [`value`] / [`codec`]: the in-memory tagged union, its binary
//!   container form, builder, iterator, ordering, containment, hashing
//! - [`scalar`]: the scalar type algebra (numeric, temporal, network,
//!   geometric, text-search, range, vector)
//! - [`entity`]: vertex / edge / path composite containers
//! - [`parser`]: the JSON-superset text form with `::type` annotations
//! - [`funcs`]: operators, accessors, casts, math, aggregates
//! - [`vle`]: the bounded-DFS path engine and edge-uniqueness checks
//!
//! Values are immutable once built; iterators and the path finder borrow
//! their inputs and carry no locks. All state a traversal allocates is
//! owned by the finder, so dropping it releases everything at once.

pub mod codec;
pub mod entity;
pub mod error;
pub mod funcs;
pub mod parser;
pub mod scalar;
pub mod value;
pub mod vle;

pub use codec::{Builder, Gtype, GtypeIterator};
pub use error::{GraphError, Result};
pub use parser::{parse, render};
pub use value::GtypeValue;
pub use vle::{EdgeDirection, EdgePrototype, GraphCache, GraphCatalog, VlePathFinder};
