//! Aggregate accumulators: init / accumulate / finalize, the shape the
//! query engine drives one row at a time. NULL inputs are skipped
//! silently; empty aggregates finalize to NULL (or 0 for count-like).

use rust_decimal::prelude::*;

use crate::codec::compare::compare_values;
use crate::error::{GraphError, Result};
use crate::funcs::ops;
use crate::value::GtypeValue;

fn float_of(name: &'static str, v: &GtypeValue) -> Result<f64> {
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

// ── sum ────────────────────────────────────────────────────────────

/// `sum` promotes across the numeric family like `+` does.
#[derive(Debug, Default)]
pub struct SumAgg {
    state: Option<GtypeValue>,
}

impl SumAgg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accum(&mut self, v: &GtypeValue) -> Result<()> {
        if v.is_null() {
            return Ok(());
        }
        self.state = Some(match self.state.take() {
            None => v.clone(),
            Some(acc) => ops::add(&acc, v)?,
        });
        Ok(())
    }

    pub fn finalize(self) -> GtypeValue {
        self.state.unwrap_or(GtypeValue::Null)
    }
}

// ── min / max ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct MinMaxAgg {
    best: Option<GtypeValue>,
    is_min: bool,
}

impl MinMaxAgg {
    pub fn min() -> Self {
        MinMaxAgg {
            best: None,
            is_min: true,
        }
    }

    pub fn max() -> Self {
        MinMaxAgg {
            best: None,
            is_min: false,
        }
    }

    pub fn accum(&mut self, v: &GtypeValue) {
        if v.is_null() {
            return;
        }
        let replace = match &self.best {
            None => true,
            Some(b) => {
                let ord = compare_values(v, b);
                if self.is_min {
                    ord == std::cmp::Ordering::Less
                } else {
                    ord == std::cmp::Ordering::Greater
                }
            }
        };
        if replace {
            self.best = Some(v.clone());
        }
    }

    pub fn finalize(self) -> GtypeValue {
        self.best.unwrap_or(GtypeValue::Null)
    }
}

// ── collect ────────────────────────────────────────────────────────

/// `collect` gathers non-NULL inputs into a list.
#[derive(Debug, Default)]
pub struct CollectAgg {
    items: Vec<GtypeValue>,
}

impl CollectAgg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accum(&mut self, v: &GtypeValue) {
        if !v.is_null() {
            self.items.push(v.clone());
        }
    }

    pub fn finalize(self) -> GtypeValue {
        GtypeValue::Array {
            elems: self.items,
            raw_scalar: false,
        }
    }
}

// ── avg / stddev ───────────────────────────────────────────────────

/// Shared moment state for avg, stddev_samp and stddev_pop.
#[derive(Debug, Default)]
pub struct StddevAgg {
    n: u64,
    sum: f64,
    sum_sq: f64,
}

impl StddevAgg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accum(&mut self, v: &GtypeValue) -> Result<()> {
        if v.is_null() {
            return Ok(());
        }
        let f = float_of("stddev", v)?;
        self.n += 1;
        self.sum += f;
        self.sum_sq += f * f;
        Ok(())
    }

    pub fn avg(&self) -> GtypeValue {
        if self.n == 0 {
            GtypeValue::Null
        } else {
            GtypeValue::Float(self.sum / self.n as f64)
        }
    }

    pub fn stddev_samp(&self) -> GtypeValue {
        if self.n < 2 {
            return GtypeValue::Null;
        }
        let n = self.n as f64;
        let var = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        GtypeValue::Float(var.max(0.0).sqrt())
    }

    pub fn stddev_pop(&self) -> GtypeValue {
        if self.n == 0 {
            return GtypeValue::Null;
        }
        let n = self.n as f64;
        let var = (self.sum_sq - self.sum * self.sum / n) / n;
        GtypeValue::Float(var.max(0.0).sqrt())
    }
}

// ── percentiles ────────────────────────────────────────────────────

/// State for percentile_cont (interpolating) and percentile_disc.
#[derive(Debug, Default)]
pub struct PercentileAgg {
    values: Vec<f64>,
}

impl PercentileAgg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accum(&mut self, v: &GtypeValue) -> Result<()> {
        if v.is_null() {
            return Ok(());
        }
        self.values.push(float_of("percentile", v)?);
        Ok(())
    }

    fn sorted(&self) -> Vec<f64> {
        let mut vs = self.values.clone();
        vs.sort_by(|a, b| a.total_cmp(b));
        vs
    }

    /// Continuous percentile with linear interpolation.
    pub fn percentile_cont(&self, fraction: f64) -> Result<GtypeValue> {
        check_fraction(fraction)?;
        let vs = self.sorted();
        if vs.is_empty() {
            return Ok(GtypeValue::Null);
        }
        let pos = fraction * (vs.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        let value = if lo == hi {
            vs[lo]
        } else {
            vs[lo] + (pos - lo as f64) * (vs[hi] - vs[lo])
        };
        Ok(GtypeValue::Float(value))
    }

    /// Discrete percentile: the first value at or beyond the fraction.
    pub fn percentile_disc(&self, fraction: f64) -> Result<GtypeValue> {
        check_fraction(fraction)?;
        let vs = self.sorted();
        if vs.is_empty() {
            return Ok(GtypeValue::Null);
        }
        let idx = ((fraction * vs.len() as f64).ceil() as usize).max(1) - 1;
        Ok(GtypeValue::Float(vs[idx.min(vs.len() - 1)]))
    }
}

fn check_fraction(fraction: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(GraphError::Domain(format!(
            "percentile fraction {} is not between 0 and 1",
            fraction
        )));
    }
    Ok(())
}

// ── two-column statistics ──────────────────────────────────────────

/// Shared (x, y) moment state for corr, covar_* and the regr_* family.
/// Rows where either side is NULL are skipped whole.
#[derive(Debug, Default)]
pub struct CorrAgg {
    n: u64,
    sx: f64,
    sxx: f64,
    sy: f64,
    syy: f64,
    sxy: f64,
}

impl CorrAgg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accum(&mut self, y: &GtypeValue, x: &GtypeValue) -> Result<()> {
        if y.is_null() || x.is_null() {
            return Ok(());
        }
        let fy = float_of("corr", y)?;
        let fx = float_of("corr", x)?;
        self.n += 1;
        self.sx += fx;
        self.sxx += fx * fx;
        self.sy += fy;
        self.syy += fy * fy;
        self.sxy += fx * fy;
        Ok(())
    }

    fn cov_terms(&self) -> Option<(f64, f64, f64, f64)> {
        if self.n == 0 {
            return None;
        }
        let n = self.n as f64;
        let cxx = self.sxx - self.sx * self.sx / n;
        let cyy = self.syy - self.sy * self.sy / n;
        let cxy = self.sxy - self.sx * self.sy / n;
        Some((n, cxx, cyy, cxy))
    }

    pub fn corr(&self) -> GtypeValue {
        match self.cov_terms() {
            Some((_, cxx, cyy, cxy)) if cxx > 0.0 && cyy > 0.0 => {
                GtypeValue::Float(cxy / (cxx * cyy).sqrt())
            }
            _ => GtypeValue::Null,
        }
    }

    pub fn covar_pop(&self) -> GtypeValue {
        match self.cov_terms() {
            Some((n, _, _, cxy)) => GtypeValue::Float(cxy / n),
            None => GtypeValue::Null,
        }
    }

    pub fn covar_samp(&self) -> GtypeValue {
        match self.cov_terms() {
            Some((n, _, _, cxy)) if n > 1.0 => GtypeValue::Float(cxy / (n - 1.0)),
            _ => GtypeValue::Null,
        }
    }

    pub fn regr_count(&self) -> GtypeValue {
        GtypeValue::Integer(self.n as i64)
    }

    pub fn regr_avgx(&self) -> GtypeValue {
        if self.n == 0 {
            GtypeValue::Null
        } else {
            GtypeValue::Float(self.sx / self.n as f64)
        }
    }

    pub fn regr_avgy(&self) -> GtypeValue {
        if self.n == 0 {
            GtypeValue::Null
        } else {
            GtypeValue::Float(self.sy / self.n as f64)
        }
    }

    pub fn regr_sxx(&self) -> GtypeValue {
        match self.cov_terms() {
            Some((_, cxx, _, _)) => GtypeValue::Float(cxx),
            None => GtypeValue::Null,
        }
    }

    pub fn regr_syy(&self) -> GtypeValue {
        match self.cov_terms() {
            Some((_, _, cyy, _)) => GtypeValue::Float(cyy),
            None => GtypeValue::Null,
        }
    }

    pub fn regr_sxy(&self) -> GtypeValue {
        match self.cov_terms() {
            Some((_, _, _, cxy)) => GtypeValue::Float(cxy),
            None => GtypeValue::Null,
        }
    }

    pub fn regr_slope(&self) -> GtypeValue {
        match self.cov_terms() {
            Some((_, cxx, _, cxy)) if cxx != 0.0 => GtypeValue::Float(cxy / cxx),
            _ => GtypeValue::Null,
        }
    }

    pub fn regr_intercept(&self) -> GtypeValue {
        match (self.regr_slope(), self.n) {
            (GtypeValue::Float(slope), n) if n > 0 => {
                let nf = n as f64;
                GtypeValue::Float(self.sy / nf - slope * self.sx / nf)
            }
            _ => GtypeValue::Null,
        }
    }

    pub fn regr_r2(&self) -> GtypeValue {
        match self.cov_terms() {
            Some((_, cxx, cyy, cxy)) if cxx != 0.0 && cyy != 0.0 => {
                GtypeValue::Float((cxy * cxy) / (cxx * cyy))
            }
            Some((_, cxx, cyy, _)) if cxx != 0.0 && cyy == 0.0 => GtypeValue::Float(1.0),
            _ => GtypeValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn ints(vals: &[i64]) -> Vec<GtypeValue> {
        vals.iter().map(|i| GtypeValue::Integer(*i)).collect()
    }

    #[test]
    fn test_sum_promotes_and_skips_null() {
        let mut agg = SumAgg::new();
        for v in ints(&[1, 2]) {
            agg.accum(&v).unwrap();
        }
        agg.accum(&GtypeValue::Null).unwrap();
        agg.accum(&GtypeValue::Float(0.5)).unwrap();
        assert_eq!(agg.finalize(), GtypeValue::Float(3.5));
    }

    #[test]
    fn test_sum_of_nothing_is_null() {
        let mut agg = SumAgg::new();
        agg.accum(&GtypeValue::Null).unwrap();
        assert_eq!(agg.finalize(), GtypeValue::Null);
    }

    #[test]
    fn test_sum_numeric_stays_numeric() {
        let mut agg = SumAgg::new();
        agg.accum(&GtypeValue::Numeric(Decimal::from_str("1.10").unwrap()))
            .unwrap();
        agg.accum(&GtypeValue::Integer(2)).unwrap();
        assert_eq!(
            agg.finalize(),
            GtypeValue::Numeric(Decimal::from_str("3.10").unwrap())
        );
    }

    #[test]
    fn test_min_max() {
        let mut mn = MinMaxAgg::min();
        let mut mx = MinMaxAgg::max();
        for v in ints(&[5, 1, 9, 3]) {
            mn.accum(&v);
            mx.accum(&v);
        }
        mn.accum(&GtypeValue::Null);
        assert_eq!(mn.finalize(), GtypeValue::Integer(1));
        assert_eq!(mx.finalize(), GtypeValue::Integer(9));
    }

    #[test]
    fn test_collect_skips_null() {
        let mut agg = CollectAgg::new();
        agg.accum(&GtypeValue::Integer(1));
        agg.accum(&GtypeValue::Null);
        agg.accum(&GtypeValue::Integer(2));
        assert_eq!(agg.finalize(), serde_json::json!([1, 2]).into());
    }

    #[test]
    fn test_stddev() {
        let mut agg = StddevAgg::new();
        for v in ints(&[2, 4, 4, 4, 5, 5, 7, 9]) {
            agg.accum(&v).unwrap();
        }
        match agg.stddev_pop() {
            GtypeValue::Float(f) => assert!((f - 2.0).abs() < 1e-12),
            other => panic!("expected float, got {:?}", other),
        }
        match agg.avg() {
            GtypeValue::Float(f) => assert!((f - 5.0).abs() < 1e-12),
            other => panic!("expected float, got {:?}", other),
        }
        let mut one = StddevAgg::new();
        one.accum(&GtypeValue::Integer(5)).unwrap();
        assert_eq!(one.stddev_samp(), GtypeValue::Null);
    }

    #[test]
    fn test_percentiles() {
        let mut agg = PercentileAgg::new();
        for v in ints(&[1, 2, 3, 4]) {
            agg.accum(&v).unwrap();
        }
        assert_eq!(
            agg.percentile_cont(0.5).unwrap(),
            GtypeValue::Float(2.5)
        );
        assert_eq!(
            agg.percentile_disc(0.5).unwrap(),
            GtypeValue::Float(2.0)
        );
        assert!(agg.percentile_cont(1.5).is_err());
        assert_eq!(
            PercentileAgg::new().percentile_cont(0.5).unwrap(),
            GtypeValue::Null
        );
    }

    #[test]
    fn test_corr_family() {
        let mut agg = CorrAgg::new();
        // y = 2x + 1, perfectly correlated
        for x in 1..=5 {
            agg.accum(
                &GtypeValue::Integer(2 * x + 1),
                &GtypeValue::Integer(x),
            )
            .unwrap();
        }
        match agg.corr() {
            GtypeValue::Float(f) => assert!((f - 1.0).abs() < 1e-12),
            other => panic!("expected float, got {:?}", other),
        }
        match agg.regr_slope() {
            GtypeValue::Float(f) => assert!((f - 2.0).abs() < 1e-12),
            other => panic!("expected float, got {:?}", other),
        }
        match agg.regr_intercept() {
            GtypeValue::Float(f) => assert!((f - 1.0).abs() < 1e-12),
            other => panic!("expected float, got {:?}", other),
        }
        assert_eq!(agg.regr_count(), GtypeValue::Integer(5));
        match agg.regr_r2() {
            GtypeValue::Float(f) => assert!((f - 1.0).abs() < 1e-12),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_corr_skips_half_null_rows() {
        let mut agg = CorrAgg::new();
        agg.accum(&GtypeValue::Null, &GtypeValue::Integer(1)).unwrap();
        agg.accum(&GtypeValue::Integer(1), &GtypeValue::Null).unwrap();
        assert_eq!(agg.regr_count(), GtypeValue::Integer(0));
        assert_eq!(agg.covar_pop(), GtypeValue::Null);
    }
}
