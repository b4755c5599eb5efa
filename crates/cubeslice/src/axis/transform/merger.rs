//! Merger: two raw axes (a date and a time of day) exposed as one datetime axis.

use chrono::NaiveDateTime;

use crate::axis::value::{datetime_to_seconds, parse_datetime};
use crate::axis::Coord;
use crate::error::ConfigError;

/// Merged values closer than this (seconds) are the same instant.
const MERGE_EPS: f64 = 1e-6;

/// Joins raw `axis` and raw `with` as `parse(first + l0 + second + l1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Merger {
    axis: String,
    with: String,
    linkers: [String; 2],
    /// `(epoch seconds, first raw, second raw)` sorted by time.
    table: Vec<(f64, Coord, Coord)>,
}

impl Merger {
    /// Build the merge table from every `(first, second)` pair the dataset holds.
    pub fn new(
        axis: impl Into<String>,
        with: impl Into<String>,
        linkers: [String; 2],
        firsts: &[Coord],
        seconds: &[Coord],
    ) -> Result<Self, ConfigError> {
        let axis = axis.into();
        let with = with.into();
        let mut table = Vec::with_capacity(firsts.len() * seconds.len());
        for f in firsts {
            for s in seconds {
                let text = merge_text(f, s, &linkers);
                let t = parse_datetime(&text).ok_or_else(|| ConfigError::InvalidTransformation {
                    axis: axis.clone(),
                    kind: "merge",
                    reason: format!("`{text}` is not a datetime"),
                })?;
                table.push((datetime_to_seconds(&t), f.clone(), s.clone()));
            }
        }
        table.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { axis, with, linkers, table })
    }

    pub fn axis(&self) -> &str {
        &self.axis
    }

    pub fn with(&self) -> &str {
        &self.with
    }

    pub fn linkers(&self) -> &[String; 2] {
        &self.linkers
    }

    /// Merged instant of two raw values.
    pub fn merge(&self, first: &Coord, second: &Coord) -> Option<NaiveDateTime> {
        parse_datetime(&merge_text(first, second, &self.linkers))
    }

    /// Raw `(first, second)` of a merged instant. Instants the dataset holds
    /// map back to its own raw values; anything else falls back to
    /// `(%Y%m%d, %H%M%S)` text with the trailing linker stripped.
    pub fn unmerge(&self, merged: &NaiveDateTime) -> (Coord, Coord) {
        let secs = datetime_to_seconds(merged);
        if let Some((_, f, s)) = self.find(secs) {
            return (f.clone(), s.clone());
        }
        let first = merged.format("%Y%m%d").to_string();
        let second = merged.format("%H%M%S").to_string();
        let second = second
            .strip_suffix(self.linkers[1].as_str())
            .map(str::to_string)
            .unwrap_or(second);
        (Coord::Text(first), Coord::Text(second))
    }

    fn find(&self, secs: f64) -> Option<&(f64, Coord, Coord)> {
        let i = self.table.partition_point(|e| e.0 < secs - MERGE_EPS);
        self.table.get(i).filter(|e| (e.0 - secs).abs() <= MERGE_EPS)
    }

    /// Merged values (epoch seconds) within `[lo, up]`, ascending.
    pub fn values_in(&self, lo: f64, up: f64) -> Vec<f64> {
        let start = self.table.partition_point(|e| e.0 < lo);
        let mut out: Vec<f64> = self.table[start..]
            .iter()
            .take_while(|e| e.0 <= up)
            .map(|e| e.0)
            .collect();
        out.dedup();
        out
    }

    /// Bounds of the merged axis in epoch seconds.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.table.first()?.0, self.table.last()?.0))
    }
}

/// `first + l0 + second + l1`. Datetimes contribute `%Y%m%d`; numeric times
/// of day are `HHMM` integers.
fn merge_text(first: &Coord, second: &Coord, linkers: &[String; 2]) -> String {
    let first = match first {
        Coord::Time(t) => t.format("%Y%m%d").to_string(),
        Coord::Num(v) => format!("{}", v.round() as i64),
        Coord::Text(s) => s.clone(),
    };
    let second = match second {
        Coord::Time(t) => t.format("%H%M").to_string(),
        Coord::Num(v) => format!("{:04}", v.round() as i64),
        Coord::Text(s) => s.clone(),
    };
    format!("{first}{}{second}{}", linkers[0], linkers[1])
}
