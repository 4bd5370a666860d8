//! Fixed-dimension f64 vector scalar and its distance functions.
//!
//! Distances are expressed as fold functions over element pairs with an
//! optional finaliser, so every function shares one accumulation loop.

use std::cmp::Ordering;

use crate::error::{GraphError, Result};

pub const VECTOR_MAX_DIM: usize = 16_000;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorData {
    values: Vec<f64>,
}

impl VectorData {
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(GraphError::Domain(
                "vector must have at least 1 dimension".into(),
            ));
        }
        if values.len() > VECTOR_MAX_DIM {
            return Err(GraphError::LimitExceeded(format!(
                "vector cannot have more than {} dimensions",
                VECTOR_MAX_DIM
            )));
        }
        for v in &values {
            if !v.is_finite() {
                return Err(GraphError::Domain(
                    "NaN or infinity not allowed in vector".into(),
                ));
            }
        }
        Ok(VectorData { values })
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn check_dims(&self, other: &VectorData) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(GraphError::Domain(format!(
                "different vector dimensions {} and {}",
                self.dim(),
                other.dim()
            )));
        }
        Ok(())
    }

    fn zip_map(&self, other: &VectorData, f: impl Fn(f64, f64) -> f64) -> Result<VectorData> {
        self.check_dims(other)?;
        let out: Vec<f64> = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| f(*a, *b))
            .collect();
        if out.iter().any(|v| !v.is_finite()) {
            return Err(GraphError::Domain("value out of range: overflow".into()));
        }
        VectorData::new(out)
    }

    pub fn add(&self, other: &VectorData) -> Result<VectorData> {
        self.zip_map(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &VectorData) -> Result<VectorData> {
        self.zip_map(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &VectorData) -> Result<VectorData> {
        self.zip_map(other, |a, b| a * b)
    }
}

// ── Distance functions ─────────────────────────────────────────────

fn fold(
    lhs: &VectorData,
    rhs: &VectorData,
    acc: impl Fn(f64, f64, f64) -> f64,
    finish: impl Fn(f64) -> f64,
) -> Result<f64> {
    lhs.check_dims(rhs)?;
    let mut distance = 0.0;
    for (a, b) in lhs.values.iter().zip(rhs.values.iter()) {
        distance = acc(distance, *a, *b);
    }
    Ok(finish(distance))
}

pub fn l2_squared_distance(lhs: &VectorData, rhs: &VectorData) -> Result<f64> {
    fold(lhs, rhs, |d, a, b| d + (a - b) * (a - b), |d| d)
}

pub fn l2_distance(lhs: &VectorData, rhs: &VectorData) -> Result<f64> {
    fold(lhs, rhs, |d, a, b| d + (a - b) * (a - b), f64::sqrt)
}

pub fn inner_product(lhs: &VectorData, rhs: &VectorData) -> Result<f64> {
    fold(lhs, rhs, |d, a, b| d + a * b, |d| d)
}

pub fn negative_inner_product(lhs: &VectorData, rhs: &VectorData) -> Result<f64> {
    fold(lhs, rhs, |d, a, b| d + a * b, |d| -d)
}

pub fn cosine_distance(lhs: &VectorData, rhs: &VectorData) -> Result<f64> {
    lhs.check_dims(rhs)?;
    let dot = inner_product(lhs, rhs)?;
    let denom = lhs.norm() * rhs.norm();
    if denom == 0.0 {
        return Err(GraphError::Domain(
            "cosine distance undefined for zero vector".into(),
        ));
    }
    // clamp against rounding drift outside [-1, 1]
    Ok(1.0 - (dot / denom).clamp(-1.0, 1.0))
}

pub fn spherical_distance(lhs: &VectorData, rhs: &VectorData) -> Result<f64> {
    let dot = inner_product(lhs, rhs)?;
    let denom = lhs.norm() * rhs.norm();
    if denom == 0.0 {
        return Err(GraphError::Domain(
            "spherical distance undefined for zero vector".into(),
        ));
    }
    Ok((dot / denom).clamp(-1.0, 1.0).acos() / std::f64::consts::PI)
}

pub fn l1_distance(lhs: &VectorData, rhs: &VectorData) -> Result<f64> {
    fold(lhs, rhs, |d, a, b| d + (a - b).abs(), |d| d)
}

pub fn cmp_vector(a: &VectorData, b: &VectorData) -> Ordering {
    for (x, y) in a.values.iter().zip(b.values.iter()) {
        let o = x.total_cmp(y);
        if o != Ordering::Equal {
            return o;
        }
    }
    a.dim().cmp(&b.dim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec2(values: &[f64]) -> VectorData {
        VectorData::new(values.to_vec()).unwrap()
    }

    #[test]
    fn test_constructor_limits() {
        assert!(VectorData::new(vec![]).is_err());
        assert!(VectorData::new(vec![f64::NAN]).is_err());
        assert!(VectorData::new(vec![f64::INFINITY]).is_err());
        assert!(matches!(
            VectorData::new(vec![0.0; VECTOR_MAX_DIM + 1]),
            Err(GraphError::LimitExceeded(_))
        ));
        assert!(VectorData::new(vec![0.0; 3]).is_ok());
    }

    #[test]
    fn test_elementwise_add() {
        let r = vec2(&[1.0, 2.0, 3.0]).add(&vec2(&[4.0, 5.0, 6.0])).unwrap();
        assert_eq!(r.values(), &[5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(
            vec2(&[1.0, 2.0]).add(&vec2(&[1.0])),
            Err(GraphError::Domain(_))
        ));
        assert!(l2_distance(&vec2(&[1.0]), &vec2(&[1.0, 2.0])).is_err());
    }

    #[test]
    fn test_elementwise_overflow() {
        let r = vec2(&[f64::MAX]).mul(&vec2(&[2.0]));
        assert!(matches!(r, Err(GraphError::Domain(_))));
    }

    #[test]
    fn test_l2() {
        let d = l2_distance(&vec2(&[0.0, 0.0]), &vec2(&[3.0, 4.0])).unwrap();
        assert_eq!(d, 5.0);
        let d2 = l2_squared_distance(&vec2(&[0.0, 0.0]), &vec2(&[3.0, 4.0])).unwrap();
        assert_eq!(d2, 25.0);
    }

    #[test]
    fn test_inner_product() {
        let a = vec2(&[1.0, 2.0]);
        let b = vec2(&[3.0, 4.0]);
        assert_eq!(inner_product(&a, &b).unwrap(), 11.0);
        assert_eq!(negative_inner_product(&a, &b).unwrap(), -11.0);
    }

    #[test]
    fn test_cosine() {
        let d = cosine_distance(&vec2(&[1.0, 0.0]), &vec2(&[0.0, 1.0])).unwrap();
        assert!((d - 1.0).abs() < 1e-12);
        let same = cosine_distance(&vec2(&[2.0, 0.0]), &vec2(&[4.0, 0.0])).unwrap();
        assert!(same.abs() < 1e-12);
        assert!(cosine_distance(&vec2(&[0.0]), &vec2(&[1.0])).is_err());
    }

    #[test]
    fn test_l1_and_spherical() {
        assert_eq!(
            l1_distance(&vec2(&[1.0, 2.0]), &vec2(&[3.0, 0.0])).unwrap(),
            4.0
        );
        let d = spherical_distance(&vec2(&[1.0, 0.0]), &vec2(&[-1.0, 0.0])).unwrap();
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_norm() {
        assert_eq!(vec2(&[3.0, 4.0]).norm(), 5.0);
    }
}
