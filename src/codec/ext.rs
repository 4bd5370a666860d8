//! Extended-scalar serialization.
//!
//! Scalar families outside the core entry types (string, numeric, bool,
//! null) are encoded behind a u32 type-tag header inside an
//! EXTENDED-typed child. New families plug in here without touching the
//! container walker.

use std::net::{Ipv4Addr, Ipv6Addr};

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use rust_decimal::Decimal;

use crate::entity::{Edge, Vertex};
use crate::error::{GraphError, Result};
use crate::scalar::geometric::{
    Box2D, Box3D, Circle, GBox, GPath, LSeg, Line, Point, Polygon, Spheroid,
};
use crate::scalar::range::{MultiRange, RangeBound, RangeScalar, RangeSubtype, RangeValue};
use crate::scalar::temporal::Interval;
use crate::scalar::tsearch::{Lexeme, TsQuery, TsVector};
use crate::scalar::vector::VectorData;
use crate::value::GtypeValue;

// Extended header tags. Append-only: decoders reject unknown tags.
pub const EXT_INTEGER: u32 = 0;
pub const EXT_FLOAT: u32 = 1;
pub const EXT_VERTEX: u32 = 2;
pub const EXT_EDGE: u32 = 3;
pub const EXT_PATH: u32 = 4;
pub const EXT_PARTIAL_PATH: u32 = 5;
pub const EXT_TIMESTAMP: u32 = 6;
pub const EXT_TIMESTAMPTZ: u32 = 7;
pub const EXT_DATE: u32 = 8;
pub const EXT_TIME: u32 = 9;
pub const EXT_TIMETZ: u32 = 10;
pub const EXT_INTERVAL: u32 = 11;
pub const EXT_INET: u32 = 12;
pub const EXT_CIDR: u32 = 13;
pub const EXT_MAC: u32 = 14;
pub const EXT_MAC8: u32 = 15;
pub const EXT_POINT: u32 = 16;
pub const EXT_LSEG: u32 = 17;
pub const EXT_LINE: u32 = 18;
pub const EXT_BOX: u32 = 19;
pub const EXT_GPATH: u32 = 20;
pub const EXT_POLYGON: u32 = 21;
pub const EXT_CIRCLE: u32 = 22;
pub const EXT_BOX2D: u32 = 23;
pub const EXT_BOX3D: u32 = 24;
pub const EXT_SPHEROID: u32 = 25;
pub const EXT_GSERIALIZED: u32 = 26;
pub const EXT_BYTEA: u32 = 27;
pub const EXT_TSVECTOR: u32 = 28;
pub const EXT_TSQUERY: u32 = 29;
pub const EXT_RANGE: u32 = 30;
pub const EXT_MULTIRANGE: u32 = 31;
pub const EXT_VECTOR: u32 = 32;

// ── Byte cursor helpers ────────────────────────────────────────────

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let out = self
            .bytes
            .get(self.pos..self.pos + n)
            .ok_or_else(|| GraphError::Internal("extended payload truncated".into()))?;
        self.pos += n;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self) -> Result<i32> {
        Ok(self.u32()? as i32)
    }

    fn i64(&mut self) -> Result<i64> {
        let b = self.take(8)?;
        Ok(i64::from_le_bytes(b.try_into().unwrap()))
    }

    fn f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.i64()? as u64))
    }

    fn rest(&mut self) -> &'a [u8] {
        let out = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        out
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }
}

fn put_f64(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_bits().to_le_bytes());
}

fn put_point(out: &mut Vec<u8>, p: &Point) {
    put_f64(out, p.x);
    put_f64(out, p.y);
}

fn read_point(r: &mut Reader<'_>) -> Result<Point> {
    Ok(Point {
        x: r.f64()?,
        y: r.f64()?,
    })
}

// ── Encode ─────────────────────────────────────────────────────────

/// Serialize a non-core scalar. Returns None when the value belongs to a
/// core entry type (string/numeric/bool/null) or is a container.
pub fn serialize_scalar(val: &GtypeValue) -> Result<Option<(u32, Vec<u8>)>> {
    let mut out = Vec::new();
    let tag = match val {
        GtypeValue::Integer(i) => {
            out.extend_from_slice(&i.to_le_bytes());
            EXT_INTEGER
        }
        GtypeValue::Float(f) => {
            put_f64(&mut out, *f);
            EXT_FLOAT
        }
        GtypeValue::Timestamp(t) => {
            out.extend_from_slice(&t.to_le_bytes());
            EXT_TIMESTAMP
        }
        GtypeValue::TimestampTz(t) => {
            out.extend_from_slice(&t.to_le_bytes());
            EXT_TIMESTAMPTZ
        }
        GtypeValue::Date(d) => {
            out.extend_from_slice(&d.to_le_bytes());
            EXT_DATE
        }
        GtypeValue::Time(t) => {
            out.extend_from_slice(&t.to_le_bytes());
            EXT_TIME
        }
        GtypeValue::TimeTz { micros, offset_secs } => {
            out.extend_from_slice(&micros.to_le_bytes());
            out.extend_from_slice(&offset_secs.to_le_bytes());
            EXT_TIMETZ
        }
        GtypeValue::IntervalValue(iv) => {
            out.extend_from_slice(&iv.months.to_le_bytes());
            out.extend_from_slice(&iv.days.to_le_bytes());
            out.extend_from_slice(&iv.micros.to_le_bytes());
            EXT_INTERVAL
        }
        GtypeValue::Inet(net) => {
            put_net(&mut out, net);
            EXT_INET
        }
        GtypeValue::Cidr(net) => {
            put_net(&mut out, net);
            EXT_CIDR
        }
        GtypeValue::Mac(m) => {
            out.extend_from_slice(m);
            EXT_MAC
        }
        GtypeValue::Mac8(m) => {
            out.extend_from_slice(m);
            EXT_MAC8
        }
        GtypeValue::Point(p) => {
            put_point(&mut out, p);
            EXT_POINT
        }
        GtypeValue::LSeg(l) => {
            put_point(&mut out, &l.p0);
            put_point(&mut out, &l.p1);
            EXT_LSEG
        }
        GtypeValue::Line(l) => {
            put_f64(&mut out, l.a);
            put_f64(&mut out, l.b);
            put_f64(&mut out, l.c);
            EXT_LINE
        }
        GtypeValue::GBox(b) => {
            put_point(&mut out, &b.high);
            put_point(&mut out, &b.low);
            EXT_BOX
        }
        GtypeValue::GPath(p) => {
            out.push(p.closed as u8);
            out.extend_from_slice(&[0u8; 3]);
            out.extend_from_slice(&(p.points.len() as u32).to_le_bytes());
            for pt in &p.points {
                put_point(&mut out, pt);
            }
            EXT_GPATH
        }
        GtypeValue::Polygon(p) => {
            out.extend_from_slice(&(p.points.len() as u32).to_le_bytes());
            for pt in &p.points {
                put_point(&mut out, pt);
            }
            EXT_POLYGON
        }
        GtypeValue::Circle(c) => {
            put_point(&mut out, &c.center);
            put_f64(&mut out, c.radius);
            EXT_CIRCLE
        }
        GtypeValue::Box2D(b) => {
            put_f64(&mut out, b.xmin);
            put_f64(&mut out, b.ymin);
            put_f64(&mut out, b.xmax);
            put_f64(&mut out, b.ymax);
            EXT_BOX2D
        }
        GtypeValue::Box3D(b) => {
            put_f64(&mut out, b.xmin);
            put_f64(&mut out, b.ymin);
            put_f64(&mut out, b.zmin);
            put_f64(&mut out, b.xmax);
            put_f64(&mut out, b.ymax);
            put_f64(&mut out, b.zmax);
            EXT_BOX3D
        }
        GtypeValue::Spheroid(s) => {
            put_f64(&mut out, s.a);
            put_f64(&mut out, s.b);
            EXT_SPHEROID
        }
        GtypeValue::Gserialized(bytes) => {
            out.extend_from_slice(bytes);
            EXT_GSERIALIZED
        }
        GtypeValue::Bytea(bytes) => {
            out.extend_from_slice(bytes);
            EXT_BYTEA
        }
        GtypeValue::TsVector(v) => {
            put_tsvector(&mut out, v);
            EXT_TSVECTOR
        }
        GtypeValue::TsQuery(q) => {
            put_tsquery(&mut out, q);
            EXT_TSQUERY
        }
        GtypeValue::Range(r) => {
            put_range(&mut out, r);
            EXT_RANGE
        }
        GtypeValue::MultiRange(m) => {
            out.push(subtype_code(m.subtype));
            out.extend_from_slice(&[0u8; 3]);
            out.extend_from_slice(&(m.ranges.len() as u32).to_le_bytes());
            for r in &m.ranges {
                put_range(&mut out, r);
            }
            EXT_MULTIRANGE
        }
        GtypeValue::Vector(v) => {
            out.extend_from_slice(&(v.dim() as u32).to_le_bytes());
            for x in v.values() {
                put_f64(&mut out, *x);
            }
            EXT_VECTOR
        }
        GtypeValue::Vertex(v) => {
            put_vertex(&mut out, v)?;
            EXT_VERTEX
        }
        GtypeValue::Edge(e) => {
            put_edge(&mut out, e)?;
            EXT_EDGE
        }
        GtypeValue::Path(elems) => {
            put_entity_seq(&mut out, elems)?;
            EXT_PATH
        }
        GtypeValue::PartialPath(elems) => {
            put_entity_seq(&mut out, elems)?;
            EXT_PARTIAL_PATH
        }
        // core entry types and containers are not extended scalars
        _ => return Ok(None),
    };
    Ok(Some((tag, out)))
}

fn put_net(out: &mut Vec<u8>, net: &IpNet) {
    match net {
        IpNet::V4(n) => {
            out.push(4);
            out.push(n.prefix_len());
            out.extend_from_slice(&[0u8; 2]);
            out.extend_from_slice(&n.addr().octets());
        }
        IpNet::V6(n) => {
            out.push(6);
            out.push(n.prefix_len());
            out.extend_from_slice(&[0u8; 2]);
            out.extend_from_slice(&n.addr().octets());
        }
    }
}

fn read_net(r: &mut Reader<'_>) -> Result<IpNet> {
    let family = r.u8()?;
    let prefix = r.u8()?;
    r.take(2)?;
    match family {
        4 => {
            let b = r.take(4)?;
            let addr = Ipv4Addr::new(b[0], b[1], b[2], b[3]);
            Ipv4Net::new(addr, prefix)
                .map(IpNet::V4)
                .map_err(|_| bad_payload("inet prefix"))
        }
        6 => {
            let b: [u8; 16] = r.take(16)?.try_into().unwrap();
            Ipv6Net::new(Ipv6Addr::from(b), prefix)
                .map(IpNet::V6)
                .map_err(|_| bad_payload("inet prefix"))
        }
        _ => Err(bad_payload("inet family")),
    }
}

fn put_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn read_string(r: &mut Reader<'_>) -> Result<String> {
    let len = r.u32()? as usize;
    let bytes = r.take(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| bad_payload("string"))
}

fn put_tsvector(out: &mut Vec<u8>, v: &TsVector) {
    out.extend_from_slice(&(v.lexemes.len() as u32).to_le_bytes());
    for l in &v.lexemes {
        put_string(out, &l.word);
        out.extend_from_slice(&(l.positions.len() as u16).to_le_bytes());
        for p in &l.positions {
            out.extend_from_slice(&p.to_le_bytes());
        }
    }
}

fn read_tsvector(r: &mut Reader<'_>) -> Result<TsVector> {
    let n = r.u32()? as usize;
    let mut lexemes = Vec::with_capacity(n);
    for _ in 0..n {
        let word = read_string(r)?;
        let npos = r.u16()? as usize;
        let mut positions = Vec::with_capacity(npos);
        for _ in 0..npos {
            positions.push(r.u16()?);
        }
        lexemes.push(Lexeme { word, positions });
    }
    Ok(TsVector { lexemes })
}

fn put_tsquery(out: &mut Vec<u8>, q: &TsQuery) {
    match q {
        TsQuery::Lexeme(w) => {
            out.push(0);
            put_string(out, w);
        }
        TsQuery::Not(inner) => {
            out.push(1);
            put_tsquery(out, inner);
        }
        TsQuery::And(l, r) => {
            out.push(2);
            put_tsquery(out, l);
            put_tsquery(out, r);
        }
        TsQuery::Or(l, r) => {
            out.push(3);
            put_tsquery(out, l);
            put_tsquery(out, r);
        }
        TsQuery::Phrase(l, r, dist) => {
            out.push(4);
            out.extend_from_slice(&dist.to_le_bytes());
            put_tsquery(out, l);
            put_tsquery(out, r);
        }
    }
}

fn read_tsquery(r: &mut Reader<'_>) -> Result<TsQuery> {
    match r.u8()? {
        0 => Ok(TsQuery::Lexeme(read_string(r)?)),
        1 => Ok(TsQuery::Not(Box::new(read_tsquery(r)?))),
        2 => Ok(TsQuery::And(
            Box::new(read_tsquery(r)?),
            Box::new(read_tsquery(r)?),
        )),
        3 => Ok(TsQuery::Or(
            Box::new(read_tsquery(r)?),
            Box::new(read_tsquery(r)?),
        )),
        4 => {
            let dist = r.u16()?;
            Ok(TsQuery::Phrase(
                Box::new(read_tsquery(r)?),
                Box::new(read_tsquery(r)?),
                dist,
            ))
        }
        _ => Err(bad_payload("tsquery node")),
    }
}

fn subtype_code(s: RangeSubtype) -> u8 {
    match s {
        RangeSubtype::Int => 0,
        RangeSubtype::Numeric => 1,
        RangeSubtype::Ts => 2,
        RangeSubtype::TsTz => 3,
        RangeSubtype::Date => 4,
    }
}

fn subtype_from(code: u8) -> Result<RangeSubtype> {
    match code {
        0 => Ok(RangeSubtype::Int),
        1 => Ok(RangeSubtype::Numeric),
        2 => Ok(RangeSubtype::Ts),
        3 => Ok(RangeSubtype::TsTz),
        4 => Ok(RangeSubtype::Date),
        _ => Err(bad_payload("range subtype")),
    }
}

const RANGE_EMPTY: u8 = 0x01;
const RANGE_LOWER_INF: u8 = 0x02;
const RANGE_LOWER_INC: u8 = 0x04;
const RANGE_UPPER_INF: u8 = 0x08;
const RANGE_UPPER_INC: u8 = 0x10;

fn put_range(out: &mut Vec<u8>, r: &RangeValue) {
    out.push(subtype_code(r.subtype));
    let mut flags = 0u8;
    if r.empty {
        flags |= RANGE_EMPTY;
    }
    if r.lower.value.is_none() {
        flags |= RANGE_LOWER_INF;
    }
    if r.lower.inclusive {
        flags |= RANGE_LOWER_INC;
    }
    if r.upper.value.is_none() {
        flags |= RANGE_UPPER_INF;
    }
    if r.upper.inclusive {
        flags |= RANGE_UPPER_INC;
    }
    out.push(flags);
    if let Some(v) = &r.lower.value {
        put_range_scalar(out, v);
    }
    if let Some(v) = &r.upper.value {
        put_range_scalar(out, v);
    }
}

fn put_range_scalar(out: &mut Vec<u8>, v: &RangeScalar) {
    match v {
        RangeScalar::Int(i) | RangeScalar::Ts(i) | RangeScalar::TsTz(i) => {
            out.extend_from_slice(&i.to_le_bytes())
        }
        RangeScalar::Numeric(d) => out.extend_from_slice(&d.serialize()),
        RangeScalar::Date(d) => out.extend_from_slice(&d.to_le_bytes()),
    }
}

fn read_range_scalar(r: &mut Reader<'_>, subtype: RangeSubtype) -> Result<RangeScalar> {
    Ok(match subtype {
        RangeSubtype::Int => RangeScalar::Int(r.i64()?),
        RangeSubtype::Ts => RangeScalar::Ts(r.i64()?),
        RangeSubtype::TsTz => RangeScalar::TsTz(r.i64()?),
        RangeSubtype::Numeric => {
            let b: [u8; 16] = r.take(16)?.try_into().unwrap();
            RangeScalar::Numeric(Decimal::deserialize(b))
        }
        RangeSubtype::Date => RangeScalar::Date(r.i32()?),
    })
}

fn read_range(r: &mut Reader<'_>) -> Result<RangeValue> {
    let subtype = subtype_from(r.u8()?)?;
    let flags = r.u8()?;
    if flags & RANGE_EMPTY != 0 {
        return Ok(RangeValue::empty(subtype));
    }
    let lower = if flags & RANGE_LOWER_INF != 0 {
        RangeBound::infinite()
    } else {
        RangeBound {
            value: Some(read_range_scalar(r, subtype)?),
            inclusive: flags & RANGE_LOWER_INC != 0,
        }
    };
    let upper = if flags & RANGE_UPPER_INF != 0 {
        RangeBound::infinite()
    } else {
        RangeBound {
            value: Some(read_range_scalar(r, subtype)?),
            inclusive: flags & RANGE_UPPER_INC != 0,
        }
    };
    RangeValue::new(subtype, lower, upper)
}

fn put_vertex(out: &mut Vec<u8>, v: &Vertex) -> Result<()> {
    out.extend_from_slice(&v.id.to_le_bytes());
    put_string(out, &v.label);
    while out.len() % 4 != 0 {
        out.push(0);
    }
    let props = crate::codec::serialize::serialize_root(&v.properties)?;
    out.extend_from_slice(props.as_bytes());
    Ok(())
}

fn read_vertex(r: &mut Reader<'_>) -> Result<Vertex> {
    let id = r.i64()?;
    let label = read_string(r)?;
    while r.pos % 4 != 0 {
        r.u8()?;
    }
    let props = read_blob(r)?;
    Vertex::build(id, label, props)
}

fn put_edge(out: &mut Vec<u8>, e: &Edge) -> Result<()> {
    out.extend_from_slice(&e.id.to_le_bytes());
    out.extend_from_slice(&e.start_id.to_le_bytes());
    out.extend_from_slice(&e.end_id.to_le_bytes());
    put_string(out, &e.label);
    while out.len() % 4 != 0 {
        out.push(0);
    }
    let props = crate::codec::serialize::serialize_root(&e.properties)?;
    out.extend_from_slice(props.as_bytes());
    Ok(())
}

fn read_edge(r: &mut Reader<'_>) -> Result<Edge> {
    let id = r.i64()?;
    let start_id = r.i64()?;
    let end_id = r.i64()?;
    let label = read_string(r)?;
    while r.pos % 4 != 0 {
        r.u8()?;
    }
    let props = read_blob(r)?;
    Edge::build(id, start_id, end_id, label, props)
}

/// Read a nested length-prefixed gtype blob and decode it back to a value.
fn read_blob(r: &mut Reader<'_>) -> Result<GtypeValue> {
    let len = u32::from_le_bytes(
        r.bytes
            .get(r.pos..r.pos + 4)
            .ok_or_else(|| bad_payload("nested blob"))?
            .try_into()
            .unwrap(),
    ) as usize;
    let bytes = r.take(len)?;
    crate::codec::binary::Gtype::from_bytes(bytes.to_vec())?.to_value()
}

/// Entity sequences (path / partial path) are a count followed by
/// tag-prefixed, length-delimited elements, each 4-aligned.
fn put_entity_seq(out: &mut Vec<u8>, elems: &[GtypeValue]) -> Result<()> {
    out.extend_from_slice(&(elems.len() as u32).to_le_bytes());
    for elem in elems {
        let (tag, payload) = serialize_scalar(elem)?.ok_or_else(|| {
            GraphError::Internal(format!(
                "{} cannot appear inside a path sequence",
                elem.type_name()
            ))
        })?;
        out.extend_from_slice(&((payload.len() + 4) as u32).to_le_bytes());
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&payload);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }
    Ok(())
}

fn read_entity_seq(r: &mut Reader<'_>) -> Result<Vec<GtypeValue>> {
    let n = r.u32()? as usize;
    let mut elems = Vec::with_capacity(n);
    for _ in 0..n {
        let len = r.u32()? as usize;
        let body = r.take(len)?;
        let mut br = Reader::new(body);
        let tag = br.u32()?;
        elems.push(deserialize(tag, br.rest())?);
        while r.pos % 4 != 0 {
            r.u8()?;
        }
    }
    Ok(elems)
}

fn bad_payload(what: &str) -> GraphError {
    GraphError::Internal(format!("malformed extended payload: {}", what))
}

// ── Decode ─────────────────────────────────────────────────────────

pub fn deserialize(tag: u32, payload: &[u8]) -> Result<GtypeValue> {
    let mut r = Reader::new(payload);
    let value = match tag {
        EXT_INTEGER => GtypeValue::Integer(r.i64()?),
        EXT_FLOAT => GtypeValue::Float(r.f64()?),
        EXT_TIMESTAMP => GtypeValue::Timestamp(r.i64()?),
        EXT_TIMESTAMPTZ => GtypeValue::TimestampTz(r.i64()?),
        EXT_DATE => GtypeValue::Date(r.i32()?),
        EXT_TIME => GtypeValue::Time(r.i64()?),
        EXT_TIMETZ => GtypeValue::TimeTz {
            micros: r.i64()?,
            offset_secs: r.i32()?,
        },
        EXT_INTERVAL => GtypeValue::IntervalValue(Interval {
            months: r.i32()?,
            days: r.i32()?,
            micros: r.i64()?,
        }),
        EXT_INET => GtypeValue::Inet(read_net(&mut r)?),
        EXT_CIDR => GtypeValue::Cidr(read_net(&mut r)?),
        EXT_MAC => {
            let b: [u8; 6] = r.take(6)?.try_into().unwrap();
            GtypeValue::Mac(b)
        }
        EXT_MAC8 => {
            let b: [u8; 8] = r.take(8)?.try_into().unwrap();
            GtypeValue::Mac8(b)
        }
        EXT_POINT => GtypeValue::Point(read_point(&mut r)?),
        EXT_LSEG => GtypeValue::LSeg(LSeg {
            p0: read_point(&mut r)?,
            p1: read_point(&mut r)?,
        }),
        EXT_LINE => GtypeValue::Line(Line {
            a: r.f64()?,
            b: r.f64()?,
            c: r.f64()?,
        }),
        EXT_BOX => GtypeValue::GBox(GBox {
            high: read_point(&mut r)?,
            low: read_point(&mut r)?,
        }),
        EXT_GPATH => {
            let closed = r.u8()? != 0;
            r.take(3)?;
            let n = r.u32()? as usize;
            let mut points = Vec::with_capacity(n);
            for _ in 0..n {
                points.push(read_point(&mut r)?);
            }
            GtypeValue::GPath(GPath { closed, points })
        }
        EXT_POLYGON => {
            let n = r.u32()? as usize;
            let mut points = Vec::with_capacity(n);
            for _ in 0..n {
                points.push(read_point(&mut r)?);
            }
            GtypeValue::Polygon(Polygon { points })
        }
        EXT_CIRCLE => GtypeValue::Circle(Circle {
            center: read_point(&mut r)?,
            radius: r.f64()?,
        }),
        EXT_BOX2D => GtypeValue::Box2D(Box2D {
            xmin: r.f64()?,
            ymin: r.f64()?,
            xmax: r.f64()?,
            ymax: r.f64()?,
        }),
        EXT_BOX3D => GtypeValue::Box3D(Box3D {
            xmin: r.f64()?,
            ymin: r.f64()?,
            zmin: r.f64()?,
            xmax: r.f64()?,
            ymax: r.f64()?,
            zmax: r.f64()?,
        }),
        EXT_SPHEROID => GtypeValue::Spheroid(Spheroid {
            a: r.f64()?,
            b: r.f64()?,
        }),
        EXT_GSERIALIZED => GtypeValue::Gserialized(r.rest().to_vec()),
        EXT_BYTEA => GtypeValue::Bytea(r.rest().to_vec()),
        EXT_TSVECTOR => GtypeValue::TsVector(read_tsvector(&mut r)?),
        EXT_TSQUERY => GtypeValue::TsQuery(read_tsquery(&mut r)?),
        EXT_RANGE => GtypeValue::Range(read_range(&mut r)?),
        EXT_MULTIRANGE => {
            let subtype = subtype_from(r.u8()?)?;
            r.take(3)?;
            let n = r.u32()? as usize;
            let mut ranges = Vec::with_capacity(n);
            for _ in 0..n {
                ranges.push(read_range(&mut r)?);
            }
            GtypeValue::MultiRange(MultiRange::new(subtype, ranges)?)
        }
        EXT_VECTOR => {
            let dim = r.u32()? as usize;
            let mut values = Vec::with_capacity(dim);
            for _ in 0..dim {
                values.push(r.f64()?);
            }
            GtypeValue::Vector(VectorData::new(values)?)
        }
        EXT_VERTEX => GtypeValue::Vertex(Box::new(read_vertex(&mut r)?)),
        EXT_EDGE => GtypeValue::Edge(Box::new(read_edge(&mut r)?)),
        EXT_PATH => GtypeValue::Path(read_entity_seq(&mut r)?),
        EXT_PARTIAL_PATH => GtypeValue::PartialPath(read_entity_seq(&mut r)?),
        other => {
            return Err(GraphError::Internal(format!(
                "unknown extended header tag {}",
                other
            )))
        }
    };
    if !r.done() {
        return Err(GraphError::Internal(
            "trailing bytes in extended scalar payload".into(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::network::parse_mac;
    use crate::scalar::tsearch::parse_tsquery;

    fn roundtrip(v: GtypeValue) {
        let (tag, payload) = serialize_scalar(&v).unwrap().expect("extended scalar");
        let back = deserialize(tag, &payload).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_primitive_roundtrips() {
        roundtrip(GtypeValue::Integer(-42));
        roundtrip(GtypeValue::Float(3.5));
        roundtrip(GtypeValue::Timestamp(123_456_789));
        roundtrip(GtypeValue::Date(-10));
        roundtrip(GtypeValue::TimeTz {
            micros: 3600 * 1_000_000,
            offset_secs: -5 * 3600,
        });
        roundtrip(GtypeValue::IntervalValue(Interval {
            months: 14,
            days: 3,
            micros: 99,
        }));
    }

    #[test]
    fn test_network_roundtrips() {
        roundtrip(GtypeValue::Inet("192.168.1.0/24".parse().unwrap()));
        roundtrip(GtypeValue::Inet("::1/128".parse().unwrap()));
        roundtrip(GtypeValue::Mac(parse_mac("08:00:2b:01:02:03").unwrap()));
    }

    #[test]
    fn test_geometry_roundtrips() {
        roundtrip(GtypeValue::Point(Point { x: 1.0, y: -2.0 }));
        roundtrip(GtypeValue::GPath(GPath {
            closed: true,
            points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 1.0 }],
        }));
        roundtrip(GtypeValue::Circle(Circle {
            center: Point { x: 1.0, y: 2.0 },
            radius: 3.0,
        }));
    }

    #[test]
    fn test_tsearch_roundtrips() {
        roundtrip(GtypeValue::TsVector(
            crate::scalar::tsearch::parse_tsvector("'cat':3 'fat':2,4").unwrap(),
        ));
        roundtrip(GtypeValue::TsQuery(
            parse_tsquery("'fat' & ( 'cat' | !'rat' )").unwrap(),
        ));
    }

    #[test]
    fn test_range_roundtrips() {
        let r = RangeValue::new(
            RangeSubtype::Int,
            RangeBound {
                value: Some(RangeScalar::Int(1)),
                inclusive: true,
            },
            RangeBound {
                value: Some(RangeScalar::Int(10)),
                inclusive: false,
            },
        )
        .unwrap();
        roundtrip(GtypeValue::Range(r.clone()));
        roundtrip(GtypeValue::MultiRange(
            MultiRange::new(RangeSubtype::Int, vec![r]).unwrap(),
        ));
        roundtrip(GtypeValue::Range(RangeValue::empty(RangeSubtype::Date)));
    }

    #[test]
    fn test_vector_roundtrip() {
        roundtrip(GtypeValue::Vector(
            VectorData::new(vec![1.0, 2.5, -3.25]).unwrap(),
        ));
    }

    #[test]
    fn test_entity_roundtrips() {
        let props = GtypeValue::Object(vec![("k".into(), GtypeValue::Integer(1))]);
        let v = Vertex::build(7, "Person", props.clone()).unwrap();
        roundtrip(GtypeValue::Vertex(Box::new(v.clone())));
        let e = Edge::build(8, 7, 9, "KNOWS", props).unwrap();
        roundtrip(GtypeValue::Edge(Box::new(e.clone())));
        roundtrip(GtypeValue::Path(vec![
            GtypeValue::Vertex(Box::new(v.clone())),
            GtypeValue::Edge(Box::new(e.clone())),
            GtypeValue::Vertex(Box::new(v)),
        ]));
    }

    #[test]
    fn test_unknown_tag_is_internal_error() {
        assert!(deserialize(9999, &[]).is_err());
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let (tag, mut payload) = serialize_scalar(&GtypeValue::Integer(7))
            .unwrap()
            .unwrap();
        payload.push(0xAB);
        let err = deserialize(tag, &payload).unwrap_err();
        assert!(err.to_string().contains("trailing bytes"));
    }

    #[test]
    fn test_core_types_are_not_extended() {
        assert!(serialize_scalar(&GtypeValue::Null).unwrap().is_none());
        assert!(serialize_scalar(&GtypeValue::Bool(true)).unwrap().is_none());
        assert!(serialize_scalar(&GtypeValue::String("x".into()))
            .unwrap()
            .is_none());
    }
}
