//! Text out-form. The inverse of `parse` for every value the text form
//! can express: scalars keep their `::type` annotations so the round
//! trip preserves types (`2.0::numeric` stays numeric).

use std::fmt::Write as _;

use crate::scalar::{geometric, network, temporal, tsearch};
use crate::value::GtypeValue;

/// Render a value to its text form.
pub fn render(v: &GtypeValue) -> String {
    let mut out = String::new();
    render_into(&mut out, v);
    out
}

fn render_into(out: &mut String, v: &GtypeValue) {
    match v {
        GtypeValue::Array {
            elems,
            raw_scalar: true,
        } if elems.len() == 1 => render_into(out, &elems[0]),
        GtypeValue::Array { elems, .. } => {
            out.push('[');
            for (i, e) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_into(out, e);
            }
            out.push(']');
        }
        GtypeValue::Object(pairs) => {
            out.push('{');
            for (i, (k, val)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_quoted(out, k);
                out.push_str(": ");
                render_into(out, val);
            }
            out.push('}');
        }
        GtypeValue::Null => out.push_str("null"),
        GtypeValue::Bool(true) => out.push_str("true"),
        GtypeValue::Bool(false) => out.push_str("false"),
        GtypeValue::Integer(i) => {
            let _ = write!(out, "{}", i);
        }
        GtypeValue::Float(f) => push_float(out, *f),
        GtypeValue::Numeric(d) => {
            let _ = write!(out, "{}::numeric", d);
        }
        GtypeValue::String(s) => push_quoted(out, s),

        GtypeValue::Timestamp(_)
        | GtypeValue::TimestampTz(_)
        | GtypeValue::Date(_)
        | GtypeValue::Time(_)
        | GtypeValue::TimeTz { .. }
        | GtypeValue::IntervalValue(_)
        | GtypeValue::Inet(_)
        | GtypeValue::Cidr(_)
        | GtypeValue::Mac(_)
        | GtypeValue::Mac8(_) => {
            push_quoted(out, &render_scalar_text(v));
            out.push_str("::");
            out.push_str(annotation_of(v));
        }

        GtypeValue::Vertex(vx) => {
            out.push_str("{\"id\": ");
            let _ = write!(out, "{}", vx.id);
            out.push_str(", \"label\": ");
            push_quoted(out, &vx.label);
            out.push_str(", \"properties\": ");
            render_into(out, &vx.properties);
            out.push('}');
        }
        GtypeValue::Edge(e) => {
            out.push_str("{\"id\": ");
            let _ = write!(out, "{}", e.id);
            out.push_str(", \"start_id\": ");
            let _ = write!(out, "{}", e.start_id);
            out.push_str(", \"end_id\": ");
            let _ = write!(out, "{}", e.end_id);
            out.push_str(", \"label\": ");
            push_quoted(out, &e.label);
            out.push_str(", \"properties\": ");
            render_into(out, &e.properties);
            out.push('}');
        }
        GtypeValue::Path(elems) | GtypeValue::PartialPath(elems) => {
            out.push('[');
            for (i, e) in elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_into(out, e);
            }
            out.push(']');
        }

        // families without an annotation render as their quoted text form
        other => push_quoted(out, &render_scalar_text(other)),
    }
}

fn annotation_of(v: &GtypeValue) -> &'static str {
    match v {
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
        _ => "",
    }
}

/// Bare text form of a scalar, without quoting or annotations. Used by
/// `->>`, the JSON bridge, and display rendering.
pub fn render_scalar_text(v: &GtypeValue) -> String {
    match v {
        GtypeValue::Null => "null".to_string(),
        GtypeValue::Bool(true) => "true".to_string(),
        GtypeValue::Bool(false) => "false".to_string(),
        GtypeValue::Integer(i) => i.to_string(),
        GtypeValue::Float(f) => {
            let mut s = String::new();
            push_float(&mut s, *f);
            s
        }
        GtypeValue::Numeric(d) => d.to_string(),
        GtypeValue::String(s) => s.clone(),
        GtypeValue::Timestamp(t) => temporal::render_timestamp(*t).unwrap_or_default(),
        GtypeValue::TimestampTz(t) => temporal::render_timestamptz(*t).unwrap_or_default(),
        GtypeValue::Date(d) => temporal::render_date(*d).unwrap_or_default(),
        GtypeValue::Time(t) => temporal::render_time(*t).unwrap_or_default(),
        GtypeValue::TimeTz { micros, offset_secs } => {
            temporal::render_timetz(*micros, *offset_secs).unwrap_or_default()
        }
        GtypeValue::IntervalValue(iv) => temporal::render_interval(iv),
        GtypeValue::Inet(n) => network::render_inet(n),
        GtypeValue::Cidr(n) => network::render_cidr(n),
        GtypeValue::Mac(m) => network::render_mac(m),
        GtypeValue::Mac8(m) => network::render_mac8(m),
        GtypeValue::Point(p) => geometric::render_point(p),
        GtypeValue::LSeg(l) => geometric::render_lseg(l),
        GtypeValue::Line(l) => geometric::render_line(l),
        GtypeValue::GBox(b) => geometric::render_box(b),
        GtypeValue::GPath(p) => geometric::render_path(p),
        GtypeValue::Polygon(p) => geometric::render_polygon(p),
        GtypeValue::Circle(c) => geometric::render_circle(c),
        GtypeValue::Box2D(b) => geometric::render_box2d(b),
        GtypeValue::Box3D(b) => geometric::render_box3d(b),
        GtypeValue::Spheroid(s) => geometric::render_spheroid(s),
        GtypeValue::Gserialized(bytes)
        | GtypeValue::Bytea(bytes)
        | GtypeValue::Binary { bytes, .. } => {
            let mut s = String::with_capacity(2 + bytes.len() * 2);
            s.push_str("\\x");
            for b in bytes {
                let _ = write!(s, "{:02x}", b);
            }
            s
        }
        GtypeValue::TsVector(t) => tsearch::render_tsvector(t),
        GtypeValue::TsQuery(q) => tsearch::render_tsquery(q),
        GtypeValue::Range(r) => render_range(r),
        GtypeValue::MultiRange(m) => {
            let parts: Vec<String> = m.ranges.iter().map(render_range).collect();
            format!("{{{}}}", parts.join(","))
        }
        GtypeValue::Vector(vec) => {
            let mut s = String::from("[");
            for (i, x) in vec.values().iter().enumerate() {
                if i > 0 {
                    s.push(',');
                }
                push_float(&mut s, *x);
            }
            s.push(']');
            s
        }
        other => render(other),
    }
}

fn render_range(r: &crate::scalar::range::RangeValue) -> String {
    use crate::scalar::range::RangeScalar;
    if r.empty {
        return "empty".to_string();
    }
    let bound = |v: &Option<RangeScalar>| -> String {
        match v {
            None => String::new(),
            Some(RangeScalar::Int(i)) => i.to_string(),
            Some(RangeScalar::Numeric(d)) => d.to_string(),
            Some(RangeScalar::Ts(t)) => temporal::render_timestamp(*t).unwrap_or_default(),
            Some(RangeScalar::TsTz(t)) => temporal::render_timestamptz(*t).unwrap_or_default(),
            Some(RangeScalar::Date(d)) => temporal::render_date(*d).unwrap_or_default(),
        }
    };
    format!(
        "{}{},{}{}",
        if r.lower.inclusive { '[' } else { '(' },
        bound(&r.lower.value),
        bound(&r.upper.value),
        if r.upper.inclusive { ']' } else { ')' },
    )
}

/// Floats must stay recognisably floats in the text form, so integral
/// values keep one fractional digit.
fn push_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f == f64::INFINITY {
        out.push_str("Infinity");
    } else if f == f64::NEG_INFINITY {
        out.push_str("-Infinity");
    } else if f == f.trunc() && f.abs() < 1e15 {
        let _ = write!(out, "{:.1}", f);
    } else {
        let _ = write!(out, "{}", f);
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
