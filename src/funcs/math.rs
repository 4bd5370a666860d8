//! Math function surface over the numeric family.
//!
//! Trigonometric, logarithmic, and root functions compute in float;
//! abs / sign / ceil / floor / round preserve the input family.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

fn float_arg(name: &'static str, v: &GtypeValue) -> Result<f64> {
    match v {
        GtypeValue::Integer(i) => Ok(*i as f64),
        GtypeValue::Float(f) => Ok(*f),
        GtypeValue::Numeric(d) => d.to_f64().ok_or(GraphError::Overflow(name)),
        other => Err(GraphError::TypeMismatch {
            op: name,
            left: "number",
            right: other.type_name(),
        }),
    }
}

macro_rules! float_fn {
    ($name:ident, $op:expr) => {
        pub fn $name(v: &GtypeValue) -> Result<GtypeValue> {
            if v.is_null() {
                return Ok(GtypeValue::Null);
            }
            let f: fn(f64) -> f64 = $op;
            Ok(GtypeValue::Float(f(float_arg(stringify!($name), v)?)))
        }
    };
}

float_fn!(sin, f64::sin);
float_fn!(cos, f64::cos);
float_fn!(tan, f64::tan);
float_fn!(cot, |x| 1.0 / x.tan());
float_fn!(asin, f64::asin);
float_fn!(acos, f64::acos);
float_fn!(atan, f64::atan);
float_fn!(sinh, f64::sinh);
float_fn!(cosh, f64::cosh);
float_fn!(tanh, f64::tanh);
float_fn!(exp, f64::exp);
float_fn!(sqrt, f64::sqrt);
float_fn!(cbrt, f64::cbrt);
float_fn!(degrees, f64::to_degrees);
float_fn!(radians, f64::to_radians);

pub fn atan2(y: &GtypeValue, x: &GtypeValue) -> Result<GtypeValue> {
    if y.is_null() || x.is_null() {
        return Ok(GtypeValue::Null);
    }
    Ok(GtypeValue::Float(
        float_arg("atan2", y)?.atan2(float_arg("atan2", x)?),
    ))
}

/// Natural logarithm; non-positive input is a domain error.
pub fn log(v: &GtypeValue) -> Result<GtypeValue> {
    if v.is_null() {
        return Ok(GtypeValue::Null);
    }
    let f = float_arg("log", v)?;
    if f <= 0.0 {
        return Err(GraphError::Domain(
            "cannot take logarithm of a non-positive number".into(),
        ));
    }
    Ok(GtypeValue::Float(f.ln()))
}

pub fn log10(v: &GtypeValue) -> Result<GtypeValue> {
    if v.is_null() {
        return Ok(GtypeValue::Null);
    }
    let f = float_arg("log10", v)?;
    if f <= 0.0 {
        return Err(GraphError::Domain(
            "cannot take logarithm of a non-positive number".into(),
        ));
    }
    Ok(GtypeValue::Float(f.log10()))
}

pub fn abs(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Integer(i) => i
            .checked_abs()
            .map(GtypeValue::Integer)
            .ok_or(GraphError::Overflow("abs")),
        GtypeValue::Float(f) => Ok(GtypeValue::Float(f.abs())),
        GtypeValue::Numeric(d) => Ok(GtypeValue::Numeric(d.abs())),
        other => Err(GraphError::TypeMismatch {
            op: "abs",
            left: "number",
            right: other.type_name(),
        }),
    }
}

pub fn sign(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Integer(i) => Ok(GtypeValue::Integer(i.signum())),
        GtypeValue::Float(f) => Ok(GtypeValue::Float(if *f == 0.0 {
            0.0
        } else {
            f.signum()
        })),
        GtypeValue::Numeric(d) => {
            let s = if d.is_zero() {
                0
            } else if d.is_sign_negative() {
                -1
            } else {
                1
            };
            Ok(GtypeValue::Numeric(Decimal::from(s)))
        }
        other => Err(GraphError::TypeMismatch {
            op: "sign",
            left: "number",
            right: other.type_name(),
        }),
    }
}

pub fn ceil(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Integer(i) => Ok(GtypeValue::Integer(*i)),
        GtypeValue::Float(f) => Ok(GtypeValue::Float(f.ceil())),
        GtypeValue::Numeric(d) => Ok(GtypeValue::Numeric(d.ceil())),
        other => Err(GraphError::TypeMismatch {
            op: "ceil",
            left: "number",
            right: other.type_name(),
        }),
    }
}

pub fn floor(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Integer(i) => Ok(GtypeValue::Integer(*i)),
        GtypeValue::Float(f) => Ok(GtypeValue::Float(f.floor())),
        GtypeValue::Numeric(d) => Ok(GtypeValue::Numeric(d.floor())),
        other => Err(GraphError::TypeMismatch {
            op: "floor",
            left: "number",
            right: other.type_name(),
        }),
    }
}

/// Round half away from zero, like the numeric types do.
pub fn round(v: &GtypeValue) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Integer(i) => Ok(GtypeValue::Integer(*i)),
        GtypeValue::Float(f) => Ok(GtypeValue::Float(f.round())),
        GtypeValue::Numeric(d) => Ok(GtypeValue::Numeric(
            d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )),
        other => Err(GraphError::TypeMismatch {
            op: "round",
            left: "number",
            right: other.type_name(),
        }),
    }
}

/// Round to `digits` decimal places.
pub fn round_to(v: &GtypeValue, digits: i64) -> Result<GtypeValue> {
    match v {
        GtypeValue::Null => Ok(GtypeValue::Null),
        GtypeValue::Numeric(d) => {
            let dp = digits.clamp(0, 28) as u32;
            Ok(GtypeValue::Numeric(d.round_dp_with_strategy(
                dp,
                RoundingStrategy::MidpointAwayFromZero,
            )))
        }
        other => {
            let f = float_arg("round", other)?;
            let factor = 10f64.powi(digits.clamp(-15, 15) as i32);
            Ok(GtypeValue::Float((f * factor).round() / factor))
        }
    }
}

pub fn gcd(a: &GtypeValue, b: &GtypeValue) -> Result<GtypeValue> {
    if a.is_null() || b.is_null() {
        return Ok(GtypeValue::Null);
    }
    match (a, b) {
        (GtypeValue::Integer(x), GtypeValue::Integer(y)) => {
            Ok(GtypeValue::Integer(gcd_i64(*x, *y)?))
        }
        _ => Err(GraphError::TypeMismatch {
            op: "gcd",
            left: a.type_name(),
            right: b.type_name(),
        }),
    }
}

pub fn lcm(a: &GtypeValue, b: &GtypeValue) -> Result<GtypeValue> {
    if a.is_null() || b.is_null() {
        return Ok(GtypeValue::Null);
    }
    match (a, b) {
        (GtypeValue::Integer(x), GtypeValue::Integer(y)) => {
            if *x == 0 || *y == 0 {
                return Ok(GtypeValue::Integer(0));
            }
            let g = gcd_i64(*x, *y)?;
            (x / g)
                .checked_mul(*y)
                .and_then(i64::checked_abs)
                .map(GtypeValue::Integer)
                .ok_or(GraphError::Overflow("lcm"))
        }
        _ => Err(GraphError::TypeMismatch {
            op: "lcm",
            left: a.type_name(),
            right: b.type_name(),
        }),
    }
}

fn gcd_i64(mut a: i64, mut b: i64) -> Result<i64> {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a.checked_abs().ok_or(GraphError::Overflow("gcd"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_trig_and_roots() {
        assert_eq!(
            sqrt(&GtypeValue::Integer(9)).unwrap(),
            GtypeValue::Float(3.0)
        );
        assert_eq!(
            cbrt(&GtypeValue::Float(27.0)).unwrap(),
            GtypeValue::Float(3.0)
        );
        match sin(&GtypeValue::Integer(0)).unwrap() {
            GtypeValue::Float(f) => assert!(f.abs() < 1e-12),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_log_domain() {
        assert!(log(&GtypeValue::Integer(0)).is_err());
        assert!(log(&GtypeValue::Integer(-5)).is_err());
        assert_eq!(
            log10(&GtypeValue::Integer(1000)).unwrap(),
            GtypeValue::Float(3.0)
        );
    }

    #[test]
    fn test_family_preserving_functions() {
        assert_eq!(abs(&GtypeValue::Integer(-3)).unwrap(), GtypeValue::Integer(3));
        assert_eq!(
            ceil(&GtypeValue::Float(1.2)).unwrap(),
            GtypeValue::Float(2.0)
        );
        let d = GtypeValue::Numeric(Decimal::from_str("-2.5").unwrap());
        assert_eq!(
            round(&d).unwrap(),
            GtypeValue::Numeric(Decimal::from_str("-3").unwrap())
        );
        assert_eq!(sign(&GtypeValue::Integer(-9)).unwrap(), GtypeValue::Integer(-1));
    }

    #[test]
    fn test_round_to_digits() {
        assert_eq!(
            round_to(&GtypeValue::Float(1.2345), 2).unwrap(),
            GtypeValue::Float(1.23)
        );
        let d = GtypeValue::Numeric(Decimal::from_str("1.2345").unwrap());
        assert_eq!(
            round_to(&d, 2).unwrap(),
            GtypeValue::Numeric(Decimal::from_str("1.23").unwrap())
        );
    }

    #[test]
    fn test_gcd_lcm() {
        assert_eq!(
            gcd(&GtypeValue::Integer(12), &GtypeValue::Integer(18)).unwrap(),
            GtypeValue::Integer(6)
        );
        assert_eq!(
            lcm(&GtypeValue::Integer(4), &GtypeValue::Integer(6)).unwrap(),
            GtypeValue::Integer(12)
        );
        assert_eq!(
            gcd(&GtypeValue::Integer(0), &GtypeValue::Integer(5)).unwrap(),
            GtypeValue::Integer(5)
        );
        assert_eq!(
            lcm(&GtypeValue::Integer(0), &GtypeValue::Integer(5)).unwrap(),
            GtypeValue::Integer(0)
        );
    }

    #[test]
    fn test_null_passthrough() {
        assert_eq!(sin(&GtypeValue::Null).unwrap(), GtypeValue::Null);
        assert_eq!(abs(&GtypeValue::Null).unwrap(), GtypeValue::Null);
    }
}
