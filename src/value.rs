//! The in-memory tagged value representation.
//!
//! `GtypeValue` is the deserialized form of a gtype container — convenient
//! for manipulation, in contrast to the binary form owned by
//! [`crate::codec::Gtype`]. Every operator entry point matches exhaustively
//! over the variants it accepts.

use ipnet::IpNet;
use rust_decimal::Decimal;

use crate::entity::{Edge, Vertex};
use crate::scalar::geometric::{Box2D, Box3D, Circle, GBox, GPath, LSeg, Line, Point, Polygon, Spheroid};
use crate::scalar::network::{Mac, Mac8};
use crate::scalar::range::{MultiRange, RangeValue};
use crate::scalar::temporal::Interval;
use crate::scalar::tsearch::{TsQuery, TsVector};
use crate::scalar::vector::VectorData;

#[derive(Debug, Clone)]
pub enum GtypeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Numeric(Decimal),
    String(String),
    Timestamp(i64),
    TimestampTz(i64),
    Date(i32),
    Time(i64),
    TimeTz { micros: i64, offset_secs: i32 },
    IntervalValue(Interval),
    Inet(IpNet),
    Cidr(IpNet),
    Mac(Mac),
    Mac8(Mac8),
    Point(Point),
    LSeg(LSeg),
    Line(Line),
    GBox(GBox),
    GPath(GPath),
    Polygon(Polygon),
    Circle(Circle),
    Box2D(Box2D),
    Box3D(Box3D),
    Spheroid(Spheroid),
    /// Opaque geometry blob owned by the geometry bridge.
    Gserialized(Vec<u8>),
    TsVector(TsVector),
    TsQuery(TsQuery),
    Bytea(Vec<u8>),
    Range(RangeValue),
    MultiRange(MultiRange),
    Vector(VectorData),
    /// `raw_scalar` marks the canonical one-element wrapper for a bare
    /// scalar at the container root.
    Array {
        elems: Vec<GtypeValue>,
        raw_scalar: bool,
    },
    /// Key/value pairs, strictly sorted and unique once built.
    Object(Vec<(String, GtypeValue)>),
    /// A container kept in serialized form, plus its header flags.
    Binary { flags: u32, bytes: Vec<u8> },
    Vertex(Box<Vertex>),
    Edge(Box<Edge>),
    /// Alternating vertex/edge sequence, vertex-bracketed, odd length.
    Path(Vec<GtypeValue>),
    /// Alternating edge/vertex sequence, edge-bracketed. An alternation
    /// with an edge at both ends over k edges holds 2k-1 elements, so
    /// the length is always odd.
    PartialPath(Vec<GtypeValue>),
}

impl GtypeValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            GtypeValue::Null => "null",
            GtypeValue::Bool(_) => "boolean",
            GtypeValue::Integer(_) => "integer",
            GtypeValue::Float(_) => "float",
            GtypeValue::Numeric(_) => "numeric",
            GtypeValue::String(_) => "string",
            GtypeValue::Timestamp(_) => "timestamp",
            GtypeValue::TimestampTz(_) => "timestamptz",
            GtypeValue::Date(_) => "date",
            GtypeValue::Time(_) => "time",
            GtypeValue::TimeTz { .. } => "timetz",
            GtypeValue::IntervalValue(_) => "interval",
            GtypeValue::Inet(_) => "inet",
            GtypeValue::Cidr(_) => "cidr",
            GtypeValue::Mac(_) => "macaddr",
            GtypeValue::Mac8(_) => "macaddr8",
            GtypeValue::Point(_) => "point",
            GtypeValue::LSeg(_) => "lseg",
            GtypeValue::Line(_) => "line",
            GtypeValue::GBox(_) => "box",
            GtypeValue::GPath(_) => "path",
            GtypeValue::Polygon(_) => "polygon",
            GtypeValue::Circle(_) => "circle",
            GtypeValue::Box2D(_) => "box2d",
            GtypeValue::Box3D(_) => "box3d",
            GtypeValue::Spheroid(_) => "spheroid",
            GtypeValue::Gserialized(_) => "geometry",
            GtypeValue::TsVector(_) => "tsvector",
            GtypeValue::TsQuery(_) => "tsquery",
            GtypeValue::Bytea(_) => "bytea",
            GtypeValue::Range(_) => "range",
            GtypeValue::MultiRange(_) => "multirange",
            GtypeValue::Vector(_) => "vector",
            GtypeValue::Array { .. } => "list",
            GtypeValue::Object(_) => "map",
            GtypeValue::Binary { .. } => "binary",
            GtypeValue::Vertex(_) => "vertex",
            GtypeValue::Edge(_) => "edge",
            GtypeValue::Path(_) => "path",
            GtypeValue::PartialPath(_) => "partial path",
        }
    }

    /// Cross-family ordering rank. NULL sorts first, then BOOL, STRING,
    /// the numeric family, the remaining scalar families in declaration
    /// order, then ARRAY, OBJECT, BINARY.
    pub fn kind_rank(&self) -> u8 {
        match self {
            GtypeValue::Null => 0,
            GtypeValue::Bool(_) => 1,
            GtypeValue::String(_) => 2,
            GtypeValue::Integer(_) | GtypeValue::Float(_) | GtypeValue::Numeric(_) => 3,
            GtypeValue::Timestamp(_) | GtypeValue::TimestampTz(_) | GtypeValue::Date(_) => 4,
            GtypeValue::Time(_) => 5,
            GtypeValue::TimeTz { .. } => 6,
            GtypeValue::IntervalValue(_) => 7,
            GtypeValue::Inet(_) | GtypeValue::Cidr(_) => 8,
            GtypeValue::Mac(_) => 9,
            GtypeValue::Mac8(_) => 10,
            GtypeValue::Point(_) => 11,
            GtypeValue::LSeg(_) => 12,
            GtypeValue::Line(_) => 13,
            GtypeValue::GBox(_) => 14,
            GtypeValue::GPath(_) => 15,
            GtypeValue::Polygon(_) => 16,
            GtypeValue::Circle(_) => 17,
            GtypeValue::Box2D(_) => 18,
            GtypeValue::Box3D(_) => 19,
            GtypeValue::Spheroid(_) => 20,
            GtypeValue::Gserialized(_) => 21,
            GtypeValue::TsVector(_) => 22,
            GtypeValue::TsQuery(_) => 23,
            GtypeValue::Bytea(_) => 24,
            GtypeValue::Range(_) => 25,
            GtypeValue::MultiRange(_) => 26,
            GtypeValue::Vector(_) => 27,
            GtypeValue::Vertex(_) => 28,
            GtypeValue::Edge(_) => 29,
            GtypeValue::Path(_) => 30,
            GtypeValue::PartialPath(_) => 31,
            GtypeValue::Array { .. } => 32,
            GtypeValue::Object(_) => 33,
            GtypeValue::Binary { .. } => 34,
        }
    }

    /// Everything except the ARRAY/OBJECT/BINARY containers counts as a
    /// scalar; composite entities ride the extended-scalar mechanism.
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            GtypeValue::Array { .. } | GtypeValue::Object(_) | GtypeValue::Binary { .. }
        )
    }

    pub fn is_numeric_family(&self) -> bool {
        matches!(
            self,
            GtypeValue::Integer(_) | GtypeValue::Float(_) | GtypeValue::Numeric(_)
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, GtypeValue::Null)
    }

    /// Wrap a bare scalar in the canonical raw-scalar array form.
    pub fn wrap_raw_scalar(self) -> GtypeValue {
        debug_assert!(self.is_scalar());
        GtypeValue::Array {
            elems: vec![self],
            raw_scalar: true,
        }
    }

    /// Unwrap a raw-scalar array back to its single element.
    pub fn unwrap_raw_scalar(self) -> GtypeValue {
        match self {
            GtypeValue::Array {
                mut elems,
                raw_scalar: true,
            } if elems.len() == 1 => elems.remove(0),
            other => other,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            GtypeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GtypeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GtypeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, GtypeValue)]> {
        match self {
            GtypeValue::Object(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[GtypeValue]> {
        match self {
            GtypeValue::Array { elems, .. } => Some(elems),
            _ => None,
        }
    }

    /// Binary search over the sorted pair list.
    pub fn object_get(&self, key: &str) -> Option<&GtypeValue> {
        let pairs = self.as_object()?;
        pairs
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|i| &pairs[i].1)
    }
}

impl From<i64> for GtypeValue {
    fn from(v: i64) -> Self {
        GtypeValue::Integer(v)
    }
}

impl From<f64> for GtypeValue {
    fn from(v: f64) -> Self {
        GtypeValue::Float(v)
    }
}

impl From<bool> for GtypeValue {
    fn from(v: bool) -> Self {
        GtypeValue::Bool(v)
    }
}

impl From<&str> for GtypeValue {
    fn from(v: &str) -> Self {
        GtypeValue::String(v.to_string())
    }
}

impl From<String> for GtypeValue {
    fn from(v: String) -> Self {
        GtypeValue::String(v)
    }
}

/// Equality is defined through the total order so that NaN equals itself
/// and `2 == 2.0` across the numeric family, matching operator semantics.
impl PartialEq for GtypeValue {
    fn eq(&self, other: &Self) -> bool {
        crate::codec::compare::compare_values(self, other) == std::cmp::Ordering::Equal
    }
}

impl Eq for GtypeValue {}

// ── serde_json interop ─────────────────────────────────────────────

impl From<serde_json::Value> for GtypeValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => GtypeValue::Null,
            serde_json::Value::Bool(b) => GtypeValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    GtypeValue::Integer(i)
                } else {
                    GtypeValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => GtypeValue::String(s),
            serde_json::Value::Array(items) => GtypeValue::Array {
                elems: items.into_iter().map(GtypeValue::from).collect(),
                raw_scalar: false,
            },
            serde_json::Value::Object(map) => {
                let mut pairs: Vec<(String, GtypeValue)> = map
                    .into_iter()
                    .map(|(k, v)| (k, GtypeValue::from(v)))
                    .collect();
                pairs.sort_by(|a, b| a.0.cmp(&b.0));
                GtypeValue::Object(pairs)
            }
        }
    }
}

impl GtypeValue {
    /// Lossy bridge to JSON: non-JSON scalar families render to their
    /// text form, composites to their display form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            GtypeValue::Null => serde_json::Value::Null,
            GtypeValue::Bool(b) => serde_json::Value::Bool(*b),
            GtypeValue::Integer(i) => serde_json::Value::from(*i),
            GtypeValue::Float(f) if f.is_finite() => serde_json::Value::from(*f),
            GtypeValue::String(s) => serde_json::Value::String(s.clone()),
            GtypeValue::Array { elems, raw_scalar } => {
                if *raw_scalar && elems.len() == 1 {
                    elems[0].to_json()
                } else {
                    serde_json::Value::Array(elems.iter().map(|e| e.to_json()).collect())
                }
            }
            GtypeValue::Object(pairs) => serde_json::Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            other => serde_json::Value::String(crate::parser::render::render_scalar_text(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_rank_core_order() {
        let null = GtypeValue::Null;
        let b = GtypeValue::Bool(true);
        let s = GtypeValue::String("a".into());
        let n = GtypeValue::Integer(1);
        let arr = GtypeValue::Array {
            elems: vec![],
            raw_scalar: false,
        };
        let obj = GtypeValue::Object(vec![]);
        let bin = GtypeValue::Binary {
            flags: 0,
            bytes: vec![],
        };
        let ranks = [
            null.kind_rank(),
            b.kind_rank(),
            s.kind_rank(),
            n.kind_rank(),
            arr.kind_rank(),
            obj.kind_rank(),
            bin.kind_rank(),
        ];
        let mut sorted = ranks;
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_raw_scalar_wrap_unwrap() {
        let v = GtypeValue::Integer(7).wrap_raw_scalar();
        match &v {
            GtypeValue::Array { elems, raw_scalar } => {
                assert!(*raw_scalar);
                assert_eq!(elems.len(), 1);
            }
            _ => panic!("expected raw scalar array"),
        }
        assert_eq!(v.unwrap_raw_scalar(), GtypeValue::Integer(7));
    }

    #[test]
    fn test_numeric_family_equality() {
        assert_eq!(GtypeValue::Integer(2), GtypeValue::Float(2.0));
        assert_eq!(GtypeValue::Float(f64::NAN), GtypeValue::Float(f64::NAN));
        assert_ne!(GtypeValue::Integer(2), GtypeValue::String("2".into()));
    }

    #[test]
    fn test_from_json_sorts_object_keys() {
        let v: GtypeValue = serde_json::json!({"b": 2, "a": 1}).into();
        let pairs = v.as_object().unwrap();
        assert_eq!(pairs[0].0, "a");
        assert_eq!(pairs[1].0, "b");
    }

    #[test]
    fn test_object_get() {
        let v: GtypeValue = serde_json::json!({"x": 1, "y": "two"}).into();
        assert_eq!(v.object_get("x"), Some(&GtypeValue::Integer(1)));
        assert_eq!(v.object_get("z"), None);
    }
}
