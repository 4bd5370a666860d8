//! Scalar type algebra
//!
//! Each scalar family owns its payload representation, text in/out forms,
//! and operator implementations. The families plug into the container codec
//! through the extended-header mechanism in `codec::ext`.

pub mod geometric;
pub mod network;
pub mod numeric;
pub mod range;
pub mod temporal;
pub mod text;
pub mod tsearch;
pub mod vector;

pub use geometric::{Box2D, Box3D, Circle, GBox, GPath, Line, LSeg, Point, Polygon, Spheroid};
pub use network::{Mac, Mac8};
pub use range::{MultiRange, RangeBound, RangeScalar, RangeSubtype, RangeValue};
pub use tsearch::{TsQuery, TsVector};
pub use vector::VectorData;
