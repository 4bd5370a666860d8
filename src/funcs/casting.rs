//! Scalar cast surface: the `to*` functions exposed to the query
//! front-end. NULL input casts to NULL; impossible casts raise a type
//! error, malformed text raises an input error.

use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::{GraphError, Result};
use crate::parser::render::render_scalar_text;
use crate::scalar::vector::VectorData;
use crate::scalar::{network, temporal};
use crate::value::GtypeValue;

fn cast_err(from: &GtypeValue, to: &'static str) -> GraphError {
    GraphError::InvalidCast {
        from: from.type_name(),
        to,
    }
}

pub fn to_integer(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Integer(i) => Ok(GtypeValue::Integer(*i)),
        GtypeValue::Float(f) => {
            if !f.is_finite() || *f < i64::MIN as f64 || *f > i64::MAX as f64 {
                return Err(GraphError::Overflow("float to integer cast"));
            }
            Ok(GtypeValue::Integer(*f as i64))
        }
        GtypeValue::Numeric(d) => d
            .trunc()
            .to_i64()
            .map(GtypeValue::Integer)
            .ok_or(GraphError::Overflow("numeric to integer cast")),
        GtypeValue::Bool(b) => Ok(GtypeValue::Integer(*b as i64)),
        GtypeValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map(GtypeValue::Integer)
            .map_err(|_| GraphError::InvalidInput {
                target: "integer",
                input: s.clone(),
            }),
        other => Err(cast_err(other, "integer")),
    }
}

pub fn to_float(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Integer(i) => Ok(GtypeValue::Float(*i as f64)),
        GtypeValue::Float(f) => Ok(GtypeValue::Float(*f)),
        GtypeValue::Numeric(d) => d
            .to_f64()
            .map(GtypeValue::Float)
            .ok_or(GraphError::Overflow("numeric to float cast")),
        GtypeValue::String(s) => match s.trim() {
            "NaN" => Ok(GtypeValue::Float(f64::NAN)),
            "Inf" | "Infinity" => Ok(GtypeValue::Float(f64::INFINITY)),
            "-Inf" | "-Infinity" => Ok(GtypeValue::Float(f64::NEG_INFINITY)),
            t => t
                .parse::<f64>()
                .map(GtypeValue::Float)
                .map_err(|_| GraphError::InvalidInput {
                    target: "float",
                    input: s.clone(),
                }),
        },
        other => Err(cast_err(other, "float")),
    }
}

pub fn to_numeric(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Integer(i) => Ok(GtypeValue::Numeric(Decimal::from(*i))),
        GtypeValue::Float(f) => Decimal::from_f64(*f)
            .map(GtypeValue::Numeric)
            .ok_or_else(|| GraphError::Domain("cannot cast non-finite float to numeric".into())),
        GtypeValue::Numeric(d) => Ok(GtypeValue::Numeric(*d)),
        GtypeValue::String(s) => Decimal::from_str(s.trim())
            .map(GtypeValue::Numeric)
            .map_err(|_| GraphError::InvalidInput {
                target: "numeric",
                input: s.clone(),
            }),
        other => Err(cast_err(other, "numeric")),
    }
}

pub fn to_bool(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Bool(b) => Ok(GtypeValue::Bool(*b)),
        GtypeValue::Integer(i) => Ok(GtypeValue::Bool(*i != 0)),
        GtypeValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "on" | "1" => Ok(GtypeValue::Bool(true)),
            "false" | "f" | "no" | "off" | "0" => Ok(GtypeValue::Bool(false)),
            _ => Err(GraphError::InvalidInput {
                target: "boolean",
                input: s.clone(),
            }),
        },
        other => Err(cast_err(other, "boolean")),
    }
}

pub fn to_string_value(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::String(s) => Ok(GtypeValue::String(s.clone())),
        scalar if scalar.is_scalar() => Ok(GtypeValue::String(render_scalar_text(scalar))),
        container => Ok(GtypeValue::String(crate::parser::render(container))),
    }
}

pub fn to_timestamp(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Timestamp(t) | GtypeValue::TimestampTz(t) => Ok(GtypeValue::Timestamp(*t)),
        GtypeValue::Date(d) => temporal::date_add_interval(*d, &Default::default())
            .map(GtypeValue::Timestamp),
        // integers are epoch microseconds
        GtypeValue::Integer(i) => Ok(GtypeValue::Timestamp(*i)),
        GtypeValue::String(s) => temporal::parse_timestamp(s).map(GtypeValue::Timestamp),
        other => Err(cast_err(other, "timestamp")),
    }
}

pub fn to_timestamptz(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Timestamp(t) | GtypeValue::TimestampTz(t) => {
            Ok(GtypeValue::TimestampTz(*t))
        }
        GtypeValue::Date(d) => temporal::date_add_interval(*d, &Default::default())
            .map(GtypeValue::TimestampTz),
        GtypeValue::Integer(i) => Ok(GtypeValue::TimestampTz(*i)),
        GtypeValue::String(s) => temporal::parse_timestamptz(s).map(GtypeValue::TimestampTz),
        other => Err(cast_err(other, "timestamptz")),
    }
}

pub fn to_date(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Date(d) => Ok(GtypeValue::Date(*d)),
        GtypeValue::Timestamp(t) | GtypeValue::TimestampTz(t) => Ok(GtypeValue::Date(
            t.div_euclid(temporal::MICROS_PER_DAY) as i32,
        )),
        GtypeValue::String(s) => temporal::parse_date(s).map(GtypeValue::Date),
        other => Err(cast_err(other, "date")),
    }
}

pub fn to_time(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Time(t) => Ok(GtypeValue::Time(*t)),
        GtypeValue::TimeTz { micros, .. } => Ok(GtypeValue::Time(*micros)),
        GtypeValue::Timestamp(t) | GtypeValue::TimestampTz(t) => {
            Ok(GtypeValue::Time(t.rem_euclid(temporal::MICROS_PER_DAY)))
        }
        GtypeValue::String(s) => temporal::parse_time(s).map(GtypeValue::Time),
        other => Err(cast_err(other, "time")),
    }
}

pub fn to_timetz(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::TimeTz { micros, offset_secs } => Ok(GtypeValue::TimeTz {
            micros: *micros,
            offset_secs: *offset_secs,
        }),
        GtypeValue::Time(t) => Ok(GtypeValue::TimeTz {
            micros: *t,
            offset_secs: 0,
        }),
        GtypeValue::String(s) => temporal::parse_timetz(s).map(|(micros, offset_secs)| {
            GtypeValue::TimeTz {
                micros,
                offset_secs,
            }
        }),
        other => Err(cast_err(other, "timetz")),
    }
}

pub fn to_interval(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::IntervalValue(iv) => Ok(GtypeValue::IntervalValue(*iv)),
        GtypeValue::String(s) => temporal::parse_interval(s).map(GtypeValue::IntervalValue),
        other => Err(cast_err(other, "interval")),
    }
}

/// `toVector` accepts a numeric list or the `[x,y,z]` text form.
pub fn to_vector(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Vector(vec) => Ok(GtypeValue::Vector(vec.clone())),
        GtypeValue::Array { elems, .. } => {
            let mut values = Vec::with_capacity(elems.len());
            for e in elems {
                match to_float(e)? {
                    GtypeValue::Float(f) => values.push(f),
                    _ => return Err(cast_err(v, "vector")),
                }
            }
            VectorData::new(values).map(GtypeValue::Vector)
        }
        GtypeValue::String(s) => {
            let t = s.trim();
            let inner = t
                .strip_prefix('[')
                .and_then(|t| t.strip_suffix(']'))
                .ok_or_else(|| GraphError::InvalidInput {
                    target: "vector",
                    input: s.clone(),
                })?;
            let mut values = Vec::new();
            for part in inner.split(',') {
                values.push(part.trim().parse::<f64>().map_err(|_| {
                    GraphError::InvalidInput {
                        target: "vector",
                        input: s.clone(),
                    }
                })?);
            }
            VectorData::new(values).map(GtypeValue::Vector)
        }
        other => Err(cast_err(other, "vector")),
    }
}

pub fn to_inet(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Inet(n) | GtypeValue::Cidr(n) => Ok(GtypeValue::Inet(*n)),
        GtypeValue::String(s) => network::parse_inet(s).map(GtypeValue::Inet),
        other => Err(cast_err(other, "inet")),
    }
}

pub fn to_cidr(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Cidr(n) => Ok(GtypeValue::Cidr(*n)),
        // an inet value truncates to its network
        GtypeValue::Inet(n) => Ok(GtypeValue::Cidr(network::network(n))),
        GtypeValue::String(s) => network::parse_cidr(s).map(GtypeValue::Cidr),
        other => Err(cast_err(other, "cidr")),
    }
}

pub fn to_macaddr(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Mac(m) => Ok(GtypeValue::Mac(*m)),
        GtypeValue::Mac8(m) => network::mac8_to_mac(m).map(GtypeValue::Mac),
        GtypeValue::String(s) => network::parse_mac(s).map(GtypeValue::Mac),
        other => Err(cast_err(other, "macaddr")),
    }
}

pub fn to_macaddr8(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Mac8(m) => Ok(GtypeValue::Mac8(*m)),
        GtypeValue::Mac(m) => Ok(GtypeValue::Mac8(network::mac_to_mac8(m))),
        GtypeValue::String(s) => network::parse_mac8(s).map(GtypeValue::Mac8),
        other => Err(cast_err(other, "macaddr8")),
    }
}

/// `toBytea` accepts the `\x…` hex text form.
pub fn to_bytea(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Bytea(b) => Ok(GtypeValue::Bytea(b.clone())),
        GtypeValue::String(s) => {
            let hex = s.strip_prefix("\\x").ok_or_else(|| GraphError::InvalidInput {
                target: "bytea",
                input: s.clone(),
            })?;
            if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(GraphError::InvalidInput {
                    target: "bytea",
                    input: s.clone(),
                });
            }
            let mut out = Vec::with_capacity(hex.len() / 2);
            for i in (0..hex.len()).step_by(2) {
                out.push(u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0));
            }
            Ok(GtypeValue::Bytea(out))
        }
        other => Err(cast_err(other, "bytea")),
    }
}
