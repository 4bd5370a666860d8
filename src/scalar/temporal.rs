//! Temporal scalar families: timestamp, timestamptz, date, time, timetz,
//! interval.
//!
//! Internal representations are integral — microseconds since 2000-01-01
//! (timestamps), days since 2000-01-01 (dates), microseconds since midnight
//! (times). chrono is used only at the text boundary and for calendar-aware
//! interval arithmetic. Out-forms follow the XSD date-time shapes.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::error::{GraphError, Result};
use crate::value::GtypeValue;

pub const MICROS_PER_SEC: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SEC;

/// An interval as stored: months and days kept separate so calendar
/// arithmetic stays calendar-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

fn epoch_date() -> NaiveDate {
    // checked constant, in range for chrono
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn epoch_datetime() -> NaiveDateTime {
    epoch_date().and_hms_opt(0, 0, 0).unwrap()
}

pub fn timestamp_to_datetime(micros: i64) -> Result<NaiveDateTime> {
    epoch_datetime()
        .checked_add_signed(TimeDelta::microseconds(micros))
        .ok_or_else(|| GraphError::Domain("timestamp out of range".into()))
}

pub fn datetime_to_timestamp(dt: NaiveDateTime) -> i64 {
    dt.signed_duration_since(epoch_datetime())
        .num_microseconds()
        .unwrap_or(0)
}

pub fn date_to_naive(days: i32) -> Result<NaiveDate> {
    epoch_date()
        .checked_add_signed(TimeDelta::days(days as i64))
        .ok_or_else(|| GraphError::Domain("date out of range".into()))
}

pub fn naive_to_date(d: NaiveDate) -> i32 {
    d.signed_duration_since(epoch_date()).num_days() as i32
}

fn time_to_naive(micros: i64) -> Result<NaiveTime> {
    let secs = (micros / MICROS_PER_SEC) as u32;
    let frac_micros = (micros % MICROS_PER_SEC) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, frac_micros * 1000)
        .ok_or_else(|| GraphError::Domain("time out of range".into()))
}

fn naive_to_time(t: NaiveTime) -> i64 {
    t.num_seconds_from_midnight() as i64 * MICROS_PER_SEC + (t.nanosecond() / 1000) as i64
}

// ── Text in-forms ──────────────────────────────────────────────────

const TS_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
];

pub fn parse_timestamp(s: &str) -> Result<i64> {
    let s = s.trim();
    for fmt in TS_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(datetime_to_timestamp(dt));
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(datetime_to_timestamp(d.and_hms_opt(0, 0, 0).unwrap()));
        }
    }
    // accept a zoned literal by normalising to UTC wall time
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime_to_timestamp(dt.naive_utc()));
    }
    Err(GraphError::InvalidInput {
        target: "timestamp",
        input: s.to_string(),
    })
}

pub fn parse_timestamptz(s: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime_to_timestamp(dt.naive_utc()));
    }
    // space-separated offset forms, then zoneless input treated as UTC
    for fmt in &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(datetime_to_timestamp(dt.naive_utc()));
        }
    }
    parse_timestamp(s).map_err(|_| GraphError::InvalidInput {
        target: "timestamptz",
        input: s.to_string(),
    })
}

pub fn parse_date(s: &str) -> Result<i32> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map(naive_to_date)
        .map_err(|_| GraphError::InvalidInput {
            target: "date",
            input: s.to_string(),
        })
}

pub fn parse_time(s: &str) -> Result<i64> {
    let s = s.trim();
    for fmt in &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Ok(naive_to_time(t));
        }
    }
    Err(GraphError::InvalidInput {
        target: "time",
        input: s.to_string(),
    })
}

pub fn parse_timetz(s: &str) -> Result<(i64, i32)> {
    let s = s.trim();
    // split a trailing +HH[:MM] / -HH[:MM] / Z offset from the clock part
    let (clock, offset_secs) = split_time_offset(s)?;
    let micros = parse_time(clock)?;
    Ok((micros, offset_secs))
}

fn split_time_offset(s: &str) -> Result<(&str, i32)> {
    if let Some(rest) = s.strip_suffix('Z') {
        return Ok((rest, 0));
    }
    if let Some(pos) = s.rfind(['+', '-']) {
        if pos > 0 && s.as_bytes()[..pos].contains(&b':') {
            let (clock, off) = s.split_at(pos);
            let sign = if off.starts_with('-') { -1 } else { 1 };
            let body = &off[1..];
            let (h, m) = match body.split_once(':') {
                Some((h, m)) => (h, m),
                None => (body, "0"),
            };
            let hours: i32 = h.parse().map_err(|_| bad_timetz(s))?;
            let mins: i32 = m.parse().map_err(|_| bad_timetz(s))?;
            return Ok((clock, sign * (hours * 3600 + mins * 60)));
        }
    }
    Ok((s, 0))
}

fn bad_timetz(s: &str) -> GraphError {
    GraphError::InvalidInput {
        target: "timetz",
        input: s.to_string(),
    }
}

/// Parse an interval from either PostgreSQL unit syntax
/// (`1 year 2 mons 3 days 04:05:06`) or a plain `HH:MM:SS` tail.
pub fn parse_interval(s: &str) -> Result<Interval> {
    let s = s.trim();
    if s.is_empty() {
        return Err(GraphError::InvalidInput {
            target: "interval",
            input: s.to_string(),
        });
    }

    let mut iv = Interval::default();
    let mut toks = s.split_whitespace().peekable();
    while let Some(tok) = toks.next() {
        if tok.contains(':') {
            iv.micros += parse_clock_micros(tok, s)?;
            continue;
        }
        let qty: i64 = tok.parse().map_err(|_| GraphError::InvalidInput {
            target: "interval",
            input: s.to_string(),
        })?;
        let unit = toks.next().ok_or_else(|| GraphError::InvalidInput {
            target: "interval",
            input: s.to_string(),
        })?;
        match unit.trim_end_matches('s') {
            "year" | "yr" => iv.months += (qty * 12) as i32,
            "mon" | "month" => iv.months += qty as i32,
            "week" => iv.days += (qty * 7) as i32,
            "day" => iv.days += qty as i32,
            "hour" | "hr" => iv.micros += qty * 3600 * MICROS_PER_SEC,
            "min" | "minute" => iv.micros += qty * 60 * MICROS_PER_SEC,
            "sec" | "second" => iv.micros += qty * MICROS_PER_SEC,
            _ => {
                return Err(GraphError::InvalidInput {
                    target: "interval",
                    input: s.to_string(),
                })
            }
        }
    }
    Ok(iv)
}

fn parse_clock_micros(tok: &str, whole: &str) -> Result<i64> {
    let neg = tok.starts_with('-');
    let body = tok.trim_start_matches(['-', '+']);
    let micros = parse_time(body).map_err(|_| GraphError::InvalidInput {
        target: "interval",
        input: whole.to_string(),
    })?;
    Ok(if neg { -micros } else { micros })
}

// ── Text out-forms ─────────────────────────────────────────────────

fn push_fraction(out: &mut String, micros_frac: i64) {
    if micros_frac != 0 {
        let s = format!(".{:06}", micros_frac);
        out.push_str(s.trim_end_matches('0'));
    }
}

pub fn render_timestamp(micros: i64) -> Result<String> {
    let dt = timestamp_to_datetime(micros)?;
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    push_fraction(&mut out, micros.rem_euclid(MICROS_PER_SEC));
    Ok(out)
}

pub fn render_timestamptz(micros: i64) -> Result<String> {
    let mut out = render_timestamp(micros)?;
    out.push('Z');
    Ok(out)
}

pub fn render_date(days: i32) -> Result<String> {
    Ok(date_to_naive(days)?.format("%Y-%m-%d").to_string())
}

pub fn render_time(micros: i64) -> Result<String> {
    let t = time_to_naive(micros)?;
    let mut out = t.format("%H:%M:%S").to_string();
    push_fraction(&mut out, micros.rem_euclid(MICROS_PER_SEC));
    Ok(out)
}

pub fn render_timetz(micros: i64, offset_secs: i32) -> Result<String> {
    let mut out = render_time(micros)?;
    if offset_secs == 0 {
        out.push('Z');
    } else {
        let sign = if offset_secs < 0 { '-' } else { '+' };
        let abs = offset_secs.abs();
        out.push_str(&format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60));
    }
    Ok(out)
}

pub fn render_interval(iv: &Interval) -> String {
    let mut parts: Vec<String> = Vec::new();
    let years = iv.months / 12;
    let months = iv.months % 12;
    if years != 0 {
        parts.push(format!("{} year{}", years, plural(years)));
    }
    if months != 0 {
        parts.push(format!("{} mon{}", months, plural(months)));
    }
    if iv.days != 0 {
        parts.push(format!("{} day{}", iv.days, plural(iv.days)));
    }
    if iv.micros != 0 || parts.is_empty() {
        let neg = iv.micros < 0;
        let abs = iv.micros.abs();
        let mut clock = format!(
            "{}{:02}:{:02}:{:02}",
            if neg { "-" } else { "" },
            abs / (3600 * MICROS_PER_SEC),
            (abs / (60 * MICROS_PER_SEC)) % 60,
            (abs / MICROS_PER_SEC) % 60
        );
        push_fraction(&mut clock, abs % MICROS_PER_SEC);
        parts.push(clock);
    }
    parts.join(" ")
}

fn plural(n: i32) -> &'static str {
    if n.abs() == 1 {
        ""
    } else {
        "s"
    }
}

// ── Arithmetic ─────────────────────────────────────────────────────

/// Add an interval to a timestamp (months are calendar-aware, then days,
/// then the micro component).
pub fn timestamp_add_interval(micros: i64, iv: &Interval) -> Result<i64> {
    let dt = timestamp_to_datetime(micros)?;
    let dt = add_months(dt, iv.months)?;
    let dt = dt
        .checked_add_signed(TimeDelta::days(iv.days as i64))
        .and_then(|d| d.checked_add_signed(TimeDelta::microseconds(iv.micros)))
        .ok_or_else(|| GraphError::Domain("timestamp out of range".into()))?;
    Ok(datetime_to_timestamp(dt))
}

pub fn timestamp_sub_interval(micros: i64, iv: &Interval) -> Result<i64> {
    timestamp_add_interval(micros, &interval_neg(iv)?)
}

fn add_months(dt: NaiveDateTime, months: i32) -> Result<NaiveDateTime> {
    let out = if months >= 0 {
        dt.checked_add_months(Months::new(months as u32))
    } else {
        dt.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    out.ok_or_else(|| GraphError::Domain("timestamp out of range".into()))
}

/// `date ± interval` produces a timestamptz per the operator table.
pub fn date_add_interval(days: i32, iv: &Interval) -> Result<i64> {
    let base = datetime_to_timestamp(date_to_naive(days)?.and_hms_opt(0, 0, 0).unwrap());
    timestamp_add_interval(base, iv)
}

pub fn date_sub_interval(days: i32, iv: &Interval) -> Result<i64> {
    date_add_interval(days, &interval_neg(iv)?)
}

pub fn time_add_interval(micros: i64, iv: &Interval) -> i64 {
    (micros + iv.micros).rem_euclid(MICROS_PER_DAY)
}

pub fn interval_add(a: &Interval, b: &Interval) -> Result<Interval> {
    Ok(Interval {
        months: a
            .months
            .checked_add(b.months)
            .ok_or(GraphError::Overflow("interval months"))?,
        days: a
            .days
            .checked_add(b.days)
            .ok_or(GraphError::Overflow("interval days"))?,
        micros: a
            .micros
            .checked_add(b.micros)
            .ok_or(GraphError::Overflow("interval micros"))?,
    })
}

pub fn interval_sub(a: &Interval, b: &Interval) -> Result<Interval> {
    interval_add(a, &interval_neg(b)?)
}

pub fn interval_neg(iv: &Interval) -> Result<Interval> {
    Ok(Interval {
        months: iv
            .months
            .checked_neg()
            .ok_or(GraphError::Overflow("interval months"))?,
        days: iv
            .days
            .checked_neg()
            .ok_or(GraphError::Overflow("interval days"))?,
        micros: iv
            .micros
            .checked_neg()
            .ok_or(GraphError::Overflow("interval micros"))?,
    })
}

/// Fixed-order comparison key: an interval flattened to micros with the
/// 30-day month convention.
pub fn interval_cmp_key(iv: &Interval) -> i128 {
    iv.micros as i128
        + iv.days as i128 * MICROS_PER_DAY as i128
        + iv.months as i128 * 30 * MICROS_PER_DAY as i128
}

/// Dispatch `+` over temporal operand shapes. Returns None when the pair
/// is not a temporal addition (caller falls through to other families).
pub fn temporal_add(lhs: &GtypeValue, rhs: &GtypeValue) -> Option<Result<GtypeValue>> {
    use GtypeValue::*;
    let r = match (lhs, rhs) {
        (Timestamp(t), IntervalValue(iv)) | (IntervalValue(iv), Timestamp(t)) => {
            timestamp_add_interval(*t, iv).map(Timestamp)
        }
        (TimestampTz(t), IntervalValue(iv)) | (IntervalValue(iv), TimestampTz(t)) => {
            timestamp_add_interval(*t, iv).map(TimestampTz)
        }
        (Date(d), IntervalValue(iv)) | (IntervalValue(iv), Date(d)) => {
            date_add_interval(*d, iv).map(TimestampTz)
        }
        (Time(t), IntervalValue(iv)) | (IntervalValue(iv), Time(t)) => {
            Ok(Time(time_add_interval(*t, iv)))
        }
        (TimeTz { micros, offset_secs }, IntervalValue(iv)) => Ok(TimeTz {
            micros: time_add_interval(*micros, iv),
            offset_secs: *offset_secs,
        }),
        (IntervalValue(a), IntervalValue(b)) => interval_add(a, b).map(IntervalValue),
        _ => return None,
    };
    Some(r)
}

/// Dispatch `-` over temporal operand shapes.
pub fn temporal_sub(lhs: &GtypeValue, rhs: &GtypeValue) -> Option<Result<GtypeValue>> {
    use GtypeValue::*;
    let r = match (lhs, rhs) {
        (Timestamp(t), IntervalValue(iv)) => timestamp_sub_interval(*t, iv).map(Timestamp),
        (TimestampTz(t), IntervalValue(iv)) => timestamp_sub_interval(*t, iv).map(TimestampTz),
        (Date(d), IntervalValue(iv)) => date_sub_interval(*d, iv).map(TimestampTz),
        (Time(t), IntervalValue(iv)) => Ok(Time(time_add_interval(
            *t,
            &Interval {
                months: 0,
                days: 0,
                micros: -iv.micros,
            },
        ))),
        (IntervalValue(a), IntervalValue(b)) => interval_sub(a, b).map(IntervalValue),
        (Timestamp(a), Timestamp(b)) | (TimestampTz(a), TimestampTz(b)) => Ok(IntervalValue(
            Interval {
                months: 0,
                days: 0,
                micros: a - b,
            },
        )),
        _ => return None,
    };
    Some(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_roundtrip() {
        let micros = parse_timestamp("2023-06-01T12:30:45.5").unwrap();
        assert_eq!(render_timestamp(micros).unwrap(), "2023-06-01T12:30:45.5");
        let whole = parse_timestamp("2023-06-01 12:30:45").unwrap();
        assert_eq!(render_timestamp(whole).unwrap(), "2023-06-01T12:30:45");
    }

    #[test]
    fn test_timestamptz_normalises_to_utc() {
        let a = parse_timestamptz("2023-06-01T12:00:00+02:00").unwrap();
        let b = parse_timestamptz("2023-06-01T10:00:00Z").unwrap();
        assert_eq!(a, b);
        assert_eq!(render_timestamptz(a).unwrap(), "2023-06-01T10:00:00Z");
    }

    #[test]
    fn test_date_roundtrip_and_epoch() {
        assert_eq!(parse_date("2000-01-01").unwrap(), 0);
        let d = parse_date("2000-02-01").unwrap();
        assert_eq!(d, 31);
        assert_eq!(render_date(d).unwrap(), "2000-02-01");
    }

    #[test]
    fn test_interval_parse_render() {
        let iv = parse_interval("1 year 2 mons 3 days 04:05:06").unwrap();
        assert_eq!(iv.months, 14);
        assert_eq!(iv.days, 3);
        assert_eq!(iv.micros, (4 * 3600 + 5 * 60 + 6) * MICROS_PER_SEC);
        assert_eq!(render_interval(&iv), "1 year 2 mons 3 days 04:05:06");
    }

    #[test]
    fn test_timestamp_plus_interval_is_calendar_aware() {
        let jan31 = parse_timestamp("2023-01-31T00:00:00").unwrap();
        let iv = parse_interval("1 mon").unwrap();
        let feb = timestamp_add_interval(jan31, &iv).unwrap();
        assert_eq!(render_timestamp(feb).unwrap(), "2023-02-28T00:00:00");
    }

    #[test]
    fn test_time_wraps_at_midnight() {
        let t = parse_time("23:00:00").unwrap();
        let iv = parse_interval("2 hours").unwrap();
        assert_eq!(
            render_time(time_add_interval(t, &iv)).unwrap(),
            "01:00:00"
        );
    }

    #[test]
    fn test_timetz_offset() {
        let (micros, off) = parse_timetz("10:00:00+05:30").unwrap();
        assert_eq!(off, 5 * 3600 + 30 * 60);
        assert_eq!(render_timetz(micros, off).unwrap(), "10:00:00+05:30");
    }

    #[test]
    fn test_timestamp_diff_gives_interval() {
        let a = GtypeValue::Timestamp(parse_timestamp("2023-01-02T00:00:00").unwrap());
        let b = GtypeValue::Timestamp(parse_timestamp("2023-01-01T00:00:00").unwrap());
        let d = temporal_sub(&a, &b).unwrap().unwrap();
        assert_eq!(
            d,
            GtypeValue::IntervalValue(Interval {
                months: 0,
                days: 0,
                micros: MICROS_PER_DAY
            })
        );
    }
}
