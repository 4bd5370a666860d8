//! Range and multirange scalar families over int / numeric / timestamp /
//! timestamptz / date elements.
//!
//! Constructors take the `[]`, `[)`, `(]`, `()` flag pairs; malformed
//! flags are a domain error. A multirange is a normalised (sorted,
//! merged) list of non-empty ranges.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::error::{GraphError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSubtype {
    Int,
    Numeric,
    Ts,
    TsTz,
    Date,
}

impl RangeSubtype {
    pub fn name(&self) -> &'static str {
        match self {
            RangeSubtype::Int => "intrange",
            RangeSubtype::Numeric => "numrange",
            RangeSubtype::Ts => "tsrange",
            RangeSubtype::TsTz => "tstzrange",
            RangeSubtype::Date => "daterange",
        }
    }
}

/// A range bound element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeScalar {
    Int(i64),
    Numeric(Decimal),
    Ts(i64),
    TsTz(i64),
    Date(i32),
}

impl RangeScalar {
    pub fn subtype(&self) -> RangeSubtype {
        match self {
            RangeScalar::Int(_) => RangeSubtype::Int,
            RangeScalar::Numeric(_) => RangeSubtype::Numeric,
            RangeScalar::Ts(_) => RangeSubtype::Ts,
            RangeScalar::TsTz(_) => RangeSubtype::TsTz,
            RangeScalar::Date(_) => RangeSubtype::Date,
        }
    }

    fn cmp_same(&self, other: &RangeScalar) -> Ordering {
        match (self, other) {
            (RangeScalar::Int(a), RangeScalar::Int(b)) => a.cmp(b),
            (RangeScalar::Numeric(a), RangeScalar::Numeric(b)) => a.cmp(b),
            (RangeScalar::Ts(a), RangeScalar::Ts(b)) => a.cmp(b),
            (RangeScalar::TsTz(a), RangeScalar::TsTz(b)) => a.cmp(b),
            (RangeScalar::Date(a), RangeScalar::Date(b)) => a.cmp(b),
            // caller guarantees matching subtypes
            _ => Ordering::Equal,
        }
    }
}

/// One end of a range. `value: None` means an infinite bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeBound {
    pub value: Option<RangeScalar>,
    pub inclusive: bool,
}

impl RangeBound {
    pub fn infinite() -> Self {
        RangeBound {
            value: None,
            inclusive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeValue {
    pub subtype: RangeSubtype,
    pub empty: bool,
    pub lower: RangeBound,
    pub upper: RangeBound,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultiRange {
    pub subtype: RangeSubtype,
    pub ranges: Vec<RangeValue>,
}

/// Parse a `[]`-style flag pair into (lower_inclusive, upper_inclusive).
pub fn parse_flags(flags: &str) -> Result<(bool, bool)> {
    let mut chars = flags.chars();
    let (lo, hi, rest) = (chars.next(), chars.next(), chars.next());
    let lower = match lo {
        Some('[') => true,
        Some('(') => false,
        _ => return Err(bad_flags(flags)),
    };
    let upper = match hi {
        Some(']') => true,
        Some(')') => false,
        _ => return Err(bad_flags(flags)),
    };
    if rest.is_some() {
        return Err(bad_flags(flags));
    }
    Ok((lower, upper))
}

fn bad_flags(flags: &str) -> GraphError {
    GraphError::Domain(format!("invalid range bound flags: \"{}\"", flags))
}

impl RangeValue {
    /// Construct a range; bounds of `None` are infinite. A degenerate
    /// range (lower > upper, or equal with an exclusive end) collapses
    /// to empty.
    pub fn new(
        subtype: RangeSubtype,
        lower: RangeBound,
        upper: RangeBound,
    ) -> Result<Self> {
        if let Some(v) = &lower.value {
            if v.subtype() != subtype {
                return Err(subtype_mismatch(subtype, v));
            }
        }
        if let Some(v) = &upper.value {
            if v.subtype() != subtype {
                return Err(subtype_mismatch(subtype, v));
            }
        }
        let empty = match (&lower.value, &upper.value) {
            (Some(l), Some(u)) => match l.cmp_same(u) {
                Ordering::Greater => {
                    return Err(GraphError::Domain(
                        "range lower bound must be less than or equal to range upper bound"
                            .into(),
                    ))
                }
                Ordering::Equal => !(lower.inclusive && upper.inclusive),
                Ordering::Less => false,
            },
            _ => false,
        };
        Ok(RangeValue {
            subtype,
            empty,
            lower,
            upper,
        })
    }

    pub fn empty(subtype: RangeSubtype) -> Self {
        RangeValue {
            subtype,
            empty: true,
            lower: RangeBound::infinite(),
            upper: RangeBound::infinite(),
        }
    }

    pub fn contains_elem(&self, elem: &RangeScalar) -> bool {
        if self.empty || elem.subtype() != self.subtype {
            return false;
        }
        let above_lower = match &self.lower.value {
            None => true,
            Some(l) => match l.cmp_same(elem) {
                Ordering::Less => true,
                Ordering::Equal => self.lower.inclusive,
                Ordering::Greater => false,
            },
        };
        let below_upper = match &self.upper.value {
            None => true,
            Some(u) => match elem.cmp_same(u) {
                Ordering::Less => true,
                Ordering::Equal => self.upper.inclusive,
                Ordering::Greater => false,
            },
        };
        above_lower && below_upper
    }

    pub fn contains_range(&self, other: &RangeValue) -> bool {
        if other.empty {
            return true;
        }
        if self.empty || self.subtype != other.subtype {
            return false;
        }
        bound_cmp_lower(&self.lower, &other.lower) != Ordering::Greater
            && bound_cmp_upper(&self.upper, &other.upper) != Ordering::Less
    }

    pub fn overlaps(&self, other: &RangeValue) -> bool {
        if self.empty || other.empty || self.subtype != other.subtype {
            return false;
        }
        bound_lower_le_upper(&self.lower, &other.upper)
            && bound_lower_le_upper(&other.lower, &self.upper)
    }
}

fn subtype_mismatch(subtype: RangeSubtype, v: &RangeScalar) -> GraphError {
    GraphError::TypeMismatch {
        op: "range constructor",
        left: subtype.name(),
        right: v.subtype().name(),
    }
}

/// Compare lower bounds: infinite sorts first; at equal values an
/// inclusive bound starts earlier.
fn bound_cmp_lower(a: &RangeBound, b: &RangeBound) -> Ordering {
    match (&a.value, &b.value) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x
            .cmp_same(y)
            .then_with(|| b.inclusive.cmp(&a.inclusive)),
    }
}

/// Compare upper bounds: infinite sorts last; at equal values an
/// inclusive bound ends later.
fn bound_cmp_upper(a: &RangeBound, b: &RangeBound) -> Ordering {
    match (&a.value, &b.value) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x
            .cmp_same(y)
            .then_with(|| a.inclusive.cmp(&b.inclusive)),
    }
}

/// True when a lower bound admits values at or below an upper bound.
fn bound_lower_le_upper(lower: &RangeBound, upper: &RangeBound) -> bool {
    match (&lower.value, &upper.value) {
        (None, _) | (_, None) => true,
        (Some(l), Some(u)) => match l.cmp_same(u) {
            Ordering::Less => true,
            Ordering::Equal => lower.inclusive && upper.inclusive,
            Ordering::Greater => false,
        },
    }
}

pub fn cmp_range(a: &RangeValue, b: &RangeValue) -> Ordering {
    match (a.empty, b.empty) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => bound_cmp_lower(&a.lower, &b.lower)
            .then_with(|| bound_cmp_upper(&a.upper, &b.upper)),
    }
}

impl MultiRange {
    /// Build a normalised multirange: empties dropped, ranges sorted by
    /// lower bound, overlapping or adjacent-touching ranges merged.
    pub fn new(subtype: RangeSubtype, mut ranges: Vec<RangeValue>) -> Result<Self> {
        for r in &ranges {
            if r.subtype != subtype {
                return Err(GraphError::TypeMismatch {
                    op: "multirange constructor",
                    left: subtype.name(),
                    right: r.subtype.name(),
                });
            }
        }
        ranges.retain(|r| !r.empty);
        ranges.sort_by(cmp_range);

        let mut merged: Vec<RangeValue> = Vec::with_capacity(ranges.len());
        for r in ranges {
            match merged.last_mut() {
                Some(last) if last.overlaps(&r) || touches(last, &r) => {
                    if bound_cmp_upper(&r.upper, &last.upper) == Ordering::Greater {
                        last.upper = r.upper;
                    }
                }
                _ => merged.push(r),
            }
        }
        Ok(MultiRange {
            subtype,
            ranges: merged,
        })
    }

    pub fn contains_elem(&self, elem: &RangeScalar) -> bool {
        self.ranges.iter().any(|r| r.contains_elem(elem))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Adjacent ranges like `[1,3)` and `[3,5)` merge.
fn touches(a: &RangeValue, b: &RangeValue) -> bool {
    match (&a.upper.value, &b.lower.value) {
        (Some(u), Some(l)) => {
            u.cmp_same(l) == Ordering::Equal && (a.upper.inclusive || b.lower.inclusive)
        }
        _ => false,
    }
}

pub fn cmp_multirange(a: &MultiRange, b: &MultiRange) -> Ordering {
    for (ra, rb) in a.ranges.iter().zip(b.ranges.iter()) {
        let o = cmp_range(ra, rb);
        if o != Ordering::Equal {
            return o;
        }
    }
    a.ranges.len().cmp(&b.ranges.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ib(v: i64, inclusive: bool) -> RangeBound {
        RangeBound {
            value: Some(RangeScalar::Int(v)),
            inclusive,
        }
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!(parse_flags("[]").unwrap(), (true, true));
        assert_eq!(parse_flags("[)").unwrap(), (true, false));
        assert_eq!(parse_flags("(]").unwrap(), (false, true));
        assert_eq!(parse_flags("()").unwrap(), (false, false));
        assert!(parse_flags("[").is_err());
        assert!(parse_flags("[})").is_err());
        assert!(parse_flags("][").is_err());
    }

    #[test]
    fn test_contains_elem() {
        let r = RangeValue::new(RangeSubtype::Int, ib(1, true), ib(5, false)).unwrap();
        assert!(r.contains_elem(&RangeScalar::Int(1)));
        assert!(r.contains_elem(&RangeScalar::Int(4)));
        assert!(!r.contains_elem(&RangeScalar::Int(5)));
        assert!(!r.contains_elem(&RangeScalar::Int(0)));
    }

    #[test]
    fn test_degenerate_collapses_to_empty() {
        let r = RangeValue::new(RangeSubtype::Int, ib(3, true), ib(3, false)).unwrap();
        assert!(r.empty);
        let r = RangeValue::new(RangeSubtype::Int, ib(3, true), ib(3, true)).unwrap();
        assert!(!r.empty);
    }

    #[test]
    fn test_reversed_bounds_error() {
        assert!(RangeValue::new(RangeSubtype::Int, ib(5, true), ib(1, true)).is_err());
    }

    #[test]
    fn test_contains_and_overlap() {
        let outer = RangeValue::new(RangeSubtype::Int, ib(0, true), ib(10, true)).unwrap();
        let inner = RangeValue::new(RangeSubtype::Int, ib(2, true), ib(5, false)).unwrap();
        let other = RangeValue::new(RangeSubtype::Int, ib(8, true), ib(20, false)).unwrap();
        assert!(outer.contains_range(&inner));
        assert!(!inner.contains_range(&outer));
        assert!(outer.overlaps(&other));
        assert!(!inner.overlaps(&other));
    }

    #[test]
    fn test_infinite_bounds() {
        let r = RangeValue::new(RangeSubtype::Int, RangeBound::infinite(), ib(0, false))
            .unwrap();
        assert!(r.contains_elem(&RangeScalar::Int(i64::MIN)));
        assert!(!r.contains_elem(&RangeScalar::Int(0)));
    }

    #[test]
    fn test_multirange_normalises() {
        let a = RangeValue::new(RangeSubtype::Int, ib(1, true), ib(3, false)).unwrap();
        let b = RangeValue::new(RangeSubtype::Int, ib(3, true), ib(5, false)).unwrap();
        let c = RangeValue::new(RangeSubtype::Int, ib(8, true), ib(9, false)).unwrap();
        let m = MultiRange::new(RangeSubtype::Int, vec![c.clone(), b, a]).unwrap();
        assert_eq!(m.ranges.len(), 2);
        assert!(m.contains_elem(&RangeScalar::Int(4)));
        assert!(!m.contains_elem(&RangeScalar::Int(6)));
    }
}
