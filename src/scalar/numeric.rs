//! Numeric-family arithmetic and comparison.
//!
//! The family is Integer / Float / Numeric with left-to-right promotion
//! Numeric > Float > Integer: any operand of a higher tier promotes the
//! whole operation to that tier.

use std::cmp::Ordering;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

/// A numeric-family pair promoted to a common tier.
enum Promoted {
    Int(i64, i64),
    Float(f64, f64),
    Num(Decimal, Decimal),
}

fn to_decimal(v: &GtypeValue) -> Option<Decimal> {
    match v {
        GtypeValue::Integer(i) => Some(Decimal::from(*i)),
        GtypeValue::Float(f) => Decimal::from_f64(*f),
        GtypeValue::Numeric(d) => Some(*d),
        _ => None,
    }
}

fn as_float(v: &GtypeValue) -> Option<f64> {
    match v {
        GtypeValue::Integer(i) => Some(*i as f64),
        GtypeValue::Float(f) => Some(*f),
        GtypeValue::Numeric(d) => d.to_f64(),
        _ => None,
    }
}

/// True when both operands belong to the numeric family.
pub fn is_numeric_pair(lhs: &GtypeValue, rhs: &GtypeValue) -> bool {
    lhs.is_numeric_family() && rhs.is_numeric_family()
}

fn promote(op: &'static str, lhs: &GtypeValue, rhs: &GtypeValue) -> Result<Promoted> {
    match (lhs, rhs) {
        (GtypeValue::Integer(a), GtypeValue::Integer(b)) => Ok(Promoted::Int(*a, *b)),
        (GtypeValue::Numeric(_), _) | (_, GtypeValue::Numeric(_)) => {
            let a = to_decimal(lhs);
            let b = to_decimal(rhs);
            match (a, b) {
                (Some(a), Some(b)) => Ok(Promoted::Num(a, b)),
                // a non-finite float cannot enter decimal arithmetic
                _ => Err(GraphError::Domain(format!(
                    "non-finite operand in numeric {}",
                    op
                ))),
            }
        }
        _ => {
            let a = as_float(lhs).ok_or_else(|| type_mismatch(op, lhs, rhs))?;
            let b = as_float(rhs).ok_or_else(|| type_mismatch(op, lhs, rhs))?;
            Ok(Promoted::Float(a, b))
        }
    }
}

fn type_mismatch(op: &'static str, lhs: &GtypeValue, rhs: &GtypeValue) -> GraphError {
    GraphError::TypeMismatch {
        op,
        left: lhs.type_name(),
        right: rhs.type_name(),
    }
}

pub fn add(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    match promote("+", lhs, rhs)? {
        Promoted::Int(a, b) => a
            .checked_add(b)
            .map(GtypeValue::Integer)
            .ok_or(GraphError::Overflow("integer addition")),
        Promoted::Float(a, b) => Ok(GtypeValue::Float(a + b)),
        Promoted::Num(a, b) => a
            .checked_add(b)
            .map(GtypeValue::Numeric)
            .ok_or(GraphError::Overflow("numeric addition")),
    }
}

pub fn sub(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    match promote("-", lhs, rhs)? {
        Promoted::Int(a, b) => a
            .checked_sub(b)
            .map(GtypeValue::Integer)
            .ok_or(GraphError::Overflow("integer subtraction")),
        Promoted::Float(a, b) => Ok(GtypeValue::Float(a - b)),
        Promoted::Num(a, b) => a
            .checked_sub(b)
            .map(GtypeValue::Numeric)
            .ok_or(GraphError::Overflow("numeric subtraction")),
    }
}

pub fn mul(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    match promote("*", lhs, rhs)? {
        Promoted::Int(a, b) => a
            .checked_mul(b)
            .map(GtypeValue::Integer)
            .ok_or(GraphError::Overflow("integer multiplication")),
        Promoted::Float(a, b) => Ok(GtypeValue::Float(a * b)),
        Promoted::Num(a, b) => a
            .checked_mul(b)
            .map(GtypeValue::Numeric)
            .ok_or(GraphError::Overflow("numeric multiplication")),
    }
}

pub fn div(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    match promote("/", lhs, rhs)? {
        Promoted::Int(a, b) => {
            if b == 0 {
                return Err(GraphError::DivisionByZero);
            }
            a.checked_div(b)
                .map(GtypeValue::Integer)
                .ok_or(GraphError::Overflow("integer division"))
        }
        Promoted::Float(a, b) => {
            if b == 0.0 {
                return Err(GraphError::DivisionByZero);
            }
            Ok(GtypeValue::Float(a / b))
        }
        Promoted::Num(a, b) => {
            if b.is_zero() {
                return Err(GraphError::DivisionByZero);
            }
            a.checked_div(b)
                .map(GtypeValue::Numeric)
                .ok_or(GraphError::Overflow("numeric division"))
        }
    }
}

pub fn rem(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    match promote("%", lhs, rhs)? {
        Promoted::Int(a, b) => {
            if b == 0 {
                return Err(GraphError::DivisionByZero);
            }
            a.checked_rem(b)
                .map(GtypeValue::Integer)
                .ok_or(GraphError::Overflow("integer modulo"))
        }
        Promoted::Float(a, b) => {
            if b == 0.0 {
                return Err(GraphError::DivisionByZero);
            }
            Ok(GtypeValue::Float(a % b))
        }
        Promoted::Num(a, b) => {
            if b.is_zero() {
                return Err(GraphError::DivisionByZero);
            }
            a.checked_rem(b)
                .map(GtypeValue::Numeric)
                .ok_or(GraphError::Overflow("numeric modulo"))
        }
    }
}

/// Exponentiation. Integer and float pairs compute in float; a numeric
/// operand with an integral exponent stays in decimal.
pub fn pow(lhs: &GtypeValue, rhs: &GtypeValue) -> Result<GtypeValue> {
    match promote("^", lhs, rhs)? {
        Promoted::Num(a, b) if b.fract().is_zero() => {
            let exp = b
                .to_i64()
                .ok_or(GraphError::Overflow("numeric exponent"))?;
            a.checked_powi(exp)
                .map(GtypeValue::Numeric)
                .ok_or(GraphError::Overflow("numeric power"))
        }
        Promoted::Num(a, b) => {
            let base = a.to_f64().ok_or(GraphError::Overflow("numeric power"))?;
            let exp = b.to_f64().ok_or(GraphError::Overflow("numeric power"))?;
            Ok(GtypeValue::Float(base.powf(exp)))
        }
        Promoted::Int(a, b) => Ok(GtypeValue::Float((a as f64).powf(b as f64))),
        Promoted::Float(a, b) => Ok(GtypeValue::Float(a.powf(b))),
    }
}

pub fn neg(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Integer(i) => i
            .checked_neg()
            .map(GtypeValue::Integer)
            .ok_or(GraphError::Overflow("integer negation")),
        GtypeValue::Float(f) => Ok(GtypeValue::Float(-f)),
        GtypeValue::Numeric(d) => Ok(GtypeValue::Numeric(-*d)),
        other => Err(GraphError::TypeMismatch {
            op: "-",
            left: "unary",
            right: other.type_name(),
        }),
    }
}

/// Compare two numeric-family values as arbitrary-precision reals.
///
/// Non-finite floats sort NaN last, -Inf first, matching float total order.
pub fn compare(lhs: &GtypeValue, rhs: &GtypeValue) -> Ordering {
    if let (GtypeValue::Integer(a), GtypeValue::Integer(b)) = (lhs, rhs) {
        return a.cmp(b);
    }

    // non-finite floats cannot be lifted to decimal
    let lf = matches!(lhs, GtypeValue::Float(f) if !f.is_finite());
    let rf = matches!(rhs, GtypeValue::Float(f) if !f.is_finite());
    if lf || rf {
        let a = as_float(lhs).unwrap_or(f64::NAN);
        let b = as_float(rhs).unwrap_or(f64::NAN);
        return a.total_cmp(&b);
    }

    match (to_decimal(lhs), to_decimal(rhs)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn num(s: &str) -> GtypeValue {
        GtypeValue::Numeric(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_int_float_promotes_to_float() {
        let r = add(&GtypeValue::Integer(3), &GtypeValue::Float(4.5)).unwrap();
        assert_eq!(r, GtypeValue::Float(7.5));
    }

    #[test]
    fn test_numeric_wins_promotion() {
        let r = add(&GtypeValue::Integer(1), &num("2.5")).unwrap();
        assert_eq!(r, num("3.5"));
        let r = mul(&GtypeValue::Float(2.0), &num("1.5")).unwrap();
        assert_eq!(r, num("3.0"));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            div(&num("3"), &GtypeValue::Integer(0)),
            Err(GraphError::DivisionByZero)
        );
        assert_eq!(
            rem(&GtypeValue::Integer(3), &GtypeValue::Integer(0)),
            Err(GraphError::DivisionByZero)
        );
    }

    #[test]
    fn test_integer_overflow_errors() {
        let r = add(&GtypeValue::Integer(i64::MAX), &GtypeValue::Integer(1));
        assert_eq!(r, Err(GraphError::Overflow("integer addition")));
        let r = neg(&GtypeValue::Integer(i64::MIN));
        assert_eq!(r, Err(GraphError::Overflow("integer negation")));
    }

    #[test]
    fn test_pow() {
        assert_eq!(
            pow(&GtypeValue::Integer(2), &GtypeValue::Integer(10)).unwrap(),
            GtypeValue::Float(1024.0)
        );
        assert_eq!(
            pow(&num("2"), &GtypeValue::Integer(3)).unwrap(),
            num("8")
        );
    }

    #[test]
    fn test_compare_across_family() {
        assert_eq!(
            compare(&GtypeValue::Integer(2), &GtypeValue::Float(2.0)),
            Ordering::Equal
        );
        assert_eq!(
            compare(&num("2.5"), &GtypeValue::Integer(2)),
            Ordering::Greater
        );
        assert_eq!(
            compare(&GtypeValue::Float(f64::NAN), &GtypeValue::Integer(i64::MAX)),
            Ordering::Greater
        );
    }
}
