//! Coordinate values, their hashable keys, and datetime/tolerance helpers.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Value kind of an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Numeric,
    Datetime,
    /// Unordered labels; only selections apply.
    Categorical,
}

impl AxisKind {
    /// Default slicing tolerance (datetime in seconds; categorical axes never slice).
    pub fn default_tolerance(self) -> f64 {
        match self {
            AxisKind::Numeric => 1e-12,
            AxisKind::Datetime => 1e-6,
            AxisKind::Categorical => 0.0,
        }
    }
}

/// One coordinate value as seen by callers and accessors.
///
/// JSON form is untagged: numbers, ISO datetimes (`"2017-01-02T12:00:00"`) and
/// any other string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coord {
    Num(f64),
    Time(NaiveDateTime),
    Text(String),
}

impl Coord {
    /// Position on a continuous axis: numbers as-is, datetimes as epoch seconds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Coord::Num(v) => Some(*v),
            Coord::Time(t) => Some(datetime_to_seconds(t)),
            Coord::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Coord::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Coord::Time(t) => Some(*t),
            Coord::Text(s) => parse_datetime(s),
            Coord::Num(_) => None,
        }
    }

    /// Hashable identity used for child keys and dedup.
    pub fn key(&self) -> CoordKey {
        match self {
            Coord::Num(v) => CoordKey::Num(if *v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }),
            Coord::Time(t) => CoordKey::Time(t.and_utc().timestamp_nanos_opt().unwrap_or(i64::MAX)),
            Coord::Text(s) => CoordKey::Text(s.clone()),
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coord::Num(v) => write!(f, "{v}"),
            Coord::Time(t) => write!(f, "{}", t.format("%Y-%m-%dT%H:%M:%S")),
            Coord::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Coord {
    fn from(v: f64) -> Self {
        Coord::Num(v)
    }
}

impl From<&str> for Coord {
    fn from(s: &str) -> Self {
        Coord::Text(s.to_string())
    }
}

impl From<String> for Coord {
    fn from(s: String) -> Self {
        Coord::Text(s)
    }
}

impl From<NaiveDateTime> for Coord {
    fn from(t: NaiveDateTime) -> Self {
        Coord::Time(t)
    }
}

/// Exact, hashable form of a [`Coord`] (`-0.0` folds onto `0.0`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoordKey {
    Num(u64),
    Time(i64),
    Text(String),
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y%m%dT%H%M%S",
    "%Y%m%d%H%M%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Parse the datetime spellings accepted in requests and merged axes.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Seconds since the Unix epoch (UTC) with sub-second precision.
pub fn datetime_to_seconds(t: &NaiveDateTime) -> f64 {
    let utc = t.and_utc();
    utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9
}

/// Inverse of [`datetime_to_seconds`]; sub-microsecond noise is rounded away.
pub fn seconds_to_datetime(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * 1e6).round();
    let whole = micros.div_euclid(1e6) as i64;
    let nanos = (micros.rem_euclid(1e6) as u32) * 1_000;
    DateTime::from_timestamp(whole, nanos).map(|dt| dt.naive_utc())
}

/// Round `v` to the number of decimals implied by `tol` (`round(v, -log10(tol))`).
///
/// Values too large to scale without losing integer precision are returned unchanged.
pub fn round_to_tolerance(v: f64, tol: f64) -> f64 {
    if !(tol > 0.0) || !v.is_finite() {
        return v;
    }
    let digits = (-tol.log10()).round() as i32;
    let scale = 10f64.powi(digits);
    let scaled = v * scale;
    if scaled.abs() >= 2f64.powi(52) {
        return v;
    }
    let r = scaled.round() / scale;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}
