//! Variable-length-edge path finding: bounded-depth DFS over an
//! in-memory graph cache, with edge-uniqueness enforcement across rows.

pub mod cache;
pub mod engine;
pub mod queue;
pub mod uniqueness;

pub use cache::{EdgeEntry, GraphCache, GraphCatalog, VertexEntry};
pub use engine::{EdgeDirection, EdgePrototype, PathContainer, VlePathFinder};
pub use uniqueness::{edge_contained_in_variable_edge, enforce_edge_uniqueness, match_vles};
