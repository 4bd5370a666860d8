//! Polymorphic operator dispatch.
//!
//! `+ - * / % ^` over the numeric family with the documented extra
//! shapes: string concatenation, element-wise vector arithmetic, interval
//! arithmetic on temporal values, and inet/integer addition. Comparison
//! operators run through the total order; containment through
//! `deep_contains`.

use std::cmp::Ordering;

use crate::codec::compare::{compare_values, deep_contains};
use crate::error::{GraphError, Result};
use crate::parser::render::render_scalar_text;
use crate::scalar::{network, numeric, temporal, text};
use crate::value::GtypeValue;

fn mismatch(op: &'static str, lhs: &GtypeValue, rhs: &GtypeValue) -> GraphError {
    GraphError::TypeMismatch {
        op,
        left: lhs.type_name(),
        right: rhs.type_name(),
    }
}

pub fn add(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    use GtypeValue::*;

    if numeric::is_numeric_pair(lhs, rhs) {
        return numeric::add(lhs, rhs);
    }
    // `+` concatenates strings; a numeric operand is auto-stringified
    match (lhs, rhs) {
        (String(a), String(b)) => return Ok(String(format!("{}{}", a, b))),
        (String(a), b) if b.is_numeric_family() => {
            return Ok(String(format!("{}{}", a, render_scalar_text(b))))
        }
        (a, String(b)) if a.is_numeric_family() => {
            return Ok(String(format!("{}{}", render_scalar_text(a), b)))
        }
        _ => {}
    }
    if let (Vector(a), Vector(b)) = (lhs, rhs) {
        return a.add(b).map(Vector);
    }
    if let Some(r) = temporal::temporal_add(lhs, rhs) {
        return r;
    }
    match (lhs, rhs) {
        (Inet(n), Integer(i)) | (Integer(i), Inet(n)) => network::inet_add(n, *i).map(Inet),
        _ => Err(mismatch("+", lhs, rhs)),
    }
}

pub fn sub(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    use GtypeValue::*;

    if numeric::is_numeric_pair(lhs, rhs) {
        return numeric::sub(lhs, rhs);
    }
    if let (Vector(a), Vector(b)) = (lhs, rhs) {
        return a.sub(b).map(Vector);
    }
    if let Some(r) = temporal::temporal_sub(lhs, rhs) {
        return r;
    }
    match (lhs, rhs) {
        (Inet(n), Integer(i)) => network::inet_add(n, -*i).map(Inet),
        (Inet(a), Inet(b)) => network::inet_diff(a, b).map(Integer),
        _ => Err(mismatch("-", lhs, rhs)),
    }
}

pub fn mul(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    use GtypeValue::*;

    if numeric::is_numeric_pair(lhs, rhs) {
        return numeric::mul(lhs, rhs);
    }
    if let (Vector(a), Vector(b)) = (lhs, rhs) {
        return a.mul(b).map(Vector);
    }
    Err(mismatch("*", lhs, rhs))
}

pub fn div(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    if numeric::is_numeric_pair(lhs, rhs) {
        return numeric::div(lhs, rhs);
    }
    Err(mismatch("/", lhs, rhs))
}

pub fn rem(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    if numeric::is_numeric_pair(lhs, rhs) {
        return numeric::rem(lhs, rhs);
    }
    Err(mismatch("%", lhs, rhs))
}

pub fn pow(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    if numeric::is_numeric_pair(lhs, rhs) {
        return numeric::pow(lhs, rhs);
    }
    Err(mismatch("^", lhs, rhs))
}

pub fn neg(v: &GtypeValue) -> Result<GtypeValue> {
    numeric::neg(v)
}

// ── Comparison ─────────────────────────────────────────────────────

pub fn eq(lhs: &GtypeValue, rhs: &GtypeValue) -> bool {
    compare_values(lhs, rhs) == Ordering::Equal
}

pub fn ne(lhs: &GtypeValue, rhs: &GtypeValue) -> bool {
    !eq(lhs, rhs)
}

pub fn lt(lhs: &GtypeValue, rhs: &GtypeValue) -> bool {
    compare_values(lhs, rhs) == Ordering::Less
}

pub fn le(lhs: &GtypeValue, rhs: &GtypeValue) -> bool {
    compare_values(lhs, rhs) != Ordering::Greater
}

pub fn gt(lhs: &GtypeValue, rhs: &GtypeValue) -> bool {
    compare_values(lhs, rhs) == Ordering::Greater
}

pub fn ge(lhs: &GtypeValue, rhs: &GtypeValue) -> bool {
    compare_values(lhs, rhs) != Ordering::Less
}

// ── String match family ────────────────────────────────────────────

fn both_strings<'a>(
    op: &'static str,
    lhs: &'a GtypeValue,
    rhs: &'a GtypeValue,
) -> Result<(&'a str, &'a str)> {
    match (lhs, rhs) {
        (GtypeValue::String(a), GtypeValue::String(b)) => Ok((a, b)),
        _ => Err(mismatch(op, lhs, rhs)),
    }
}

pub fn starts_with(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<bool> {
    let (a, b) = both_strings("STARTS WITH", lhs, rhs)?;
    Ok(text::starts_with(a, b))
}

pub fn ends_with(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<bool> {
    let (a, b) = both_strings("ENDS WITH", lhs, rhs)?;
    Ok(text::ends_with(a, b))
}

pub fn string_contains(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<bool> {
    let (a, b) = both_strings("CONTAINS", lhs, rhs)?;
    Ok(text::contains(a, b))
}

pub fn regex_match(lhs: &GtypeValue, rhs: &GtypeValue, case_insensitive: bool) -> Result<bool> {
    let (a, b) = both_strings("=~", lhs, rhs)?;
    text::regex_match(a, b, case_insensitive)
}

pub fn regex_not_match(
    lhs: &GtypeValue,
    rhs: &GtypeValue,
    case_insensitive: bool,
) -> Result<bool> {
    regex_match(lhs, rhs, case_insensitive).map(|m| !m)
}

// ── Containment ────────────────────────────────────────────────────

/// `doc @> pattern`
pub fn contains(doc: &GtypeValue, pattern: &GtypeValue) -> bool {
    deep_contains(doc, pattern)
}

/// `pattern <@ doc`
pub fn contained_by(pattern: &GtypeValue, doc: &GtypeValue) -> bool {
    deep_contains(doc, pattern)
}
