//! Monthly time series and the month-matching policy used for CPI lookups.

use chrono::{Datelike, NaiveDate};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::str::FromStr;

/// A calendar month, ordered chronologically. Serializes as "YYYY-MM" so
/// it can key JSON maps in cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        MonthKey { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months since year zero; lookup distances are computed on this.
    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    pub fn months_between(self, other: MonthKey) -> i64 {
        other.ordinal() - self.ordinal()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid month key: {s:?}"))?;
        let year: i32 = y.parse().map_err(|_| format!("invalid year in {s:?}"))?;
        let month: u32 = m.parse().map_err(|_| format!("invalid month in {s:?}"))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in {s:?}"));
        }
        Ok(MonthKey { year, month })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MonthKeyVisitor;

        impl Visitor<'_> for MonthKeyVisitor {
            type Value = MonthKey;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a \"YYYY-MM\" month key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MonthKey, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(MonthKeyVisitor)
    }
}

/// How a month lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Requested month present in the series.
    Exact,
    /// Linear interpolation between the bracketing months.
    Interpolated,
    /// Value of the chronologically nearest month (ties go earlier).
    Nearest(MonthKey),
}

/// A month lookup result: the index value and how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthMatch {
    pub value: f64,
    pub kind: MatchKind,
}

/// Ordered month → index mapping. Values are non-negative index levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries(BTreeMap<MonthKey, f64>);

impl TimeSeries {
    pub fn new() -> Self {
        TimeSeries(BTreeMap::new())
    }

    pub fn insert(&mut self, month: MonthKey, value: f64) {
        self.0.insert(month, value);
    }

    pub fn get(&self, month: MonthKey) -> Option<f64> {
        self.0.get(&month).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Resolve a month against this series.
    ///
    /// Policy, in order: exact match; linear interpolation in time when
    /// both a strictly-earlier and a strictly-later month exist; value of
    /// the nearest month otherwise, equidistant candidates resolving to
    /// the earlier month. An empty series yields `None`.
    pub fn lookup(&self, month: MonthKey) -> Option<MonthMatch> {
        if let Some(value) = self.get(month) {
            return Some(MonthMatch {
                value,
                kind: MatchKind::Exact,
            });
        }

        let before = self.0.range(..month).next_back();
        let after = self
            .0
            .range((Bound::Excluded(month), Bound::Unbounded))
            .next();

        if let (Some((&m0, &v0)), Some((&m1, &v1))) = (before, after) {
            let span = m0.months_between(m1) as f64;
            let offset = m0.months_between(month) as f64;
            let value = v0 + (v1 - v0) * offset / span;
            return Some(MonthMatch {
                value,
                kind: MatchKind::Interpolated,
            });
        }

        // Nearest month; (distance, month) keeps ties on the earlier side.
        let (&nearest, &value) = self
            .0
            .iter()
            .min_by_key(|&(&m, _)| (month.months_between(m).abs(), m))?;
        Some(MonthMatch {
            value,
            kind: MatchKind::Nearest(nearest),
        })
    }
}

impl FromIterator<(MonthKey, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (MonthKey, f64)>>(iter: I) -> Self {
        TimeSeries(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn series(points: &[(&str, f64)]) -> TimeSeries {
        points.iter().map(|(m, v)| (month(m), *v)).collect()
    }

    #[test]
    fn test_month_key_roundtrip() {
        let m = month("2023-03");
        assert_eq!(m, MonthKey::new(2023, 3));
        assert_eq!(m.to_string(), "2023-03");
    }

    #[test]
    fn test_month_key_ordering_and_distance() {
        assert!(month("2023-12") < month("2024-01"));
        assert_eq!(month("2023-01").months_between(month("2023-03")), 2);
        assert_eq!(month("2024-02").months_between(month("2023-11")), -3);
    }

    #[test]
    fn test_invalid_month_key() {
        assert!("2023".parse::<MonthKey>().is_err());
        assert!("2023-13".parse::<MonthKey>().is_err());
        assert!("abcd-01".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_exact_match() {
        let s = series(&[("2023-01", 100.0), ("2023-03", 106.0)]);
        let m = s.lookup(month("2023-01")).unwrap();
        assert_eq!(m.value, 100.0);
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[test]
    fn test_interpolated_midpoint() {
        let s = series(&[("2023-01", 100.0), ("2023-03", 106.0)]);
        let m = s.lookup(month("2023-02")).unwrap();
        assert!((m.value - 103.0).abs() < 1e-9);
        assert_eq!(m.kind, MatchKind::Interpolated);
    }

    #[test]
    fn test_interpolation_weights_by_month_distance() {
        let s = series(&[("2023-01", 100.0), ("2023-04", 106.0)]);
        let m = s.lookup(month("2023-02")).unwrap();
        assert!((m.value - 102.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_outside_span() {
        let s = series(&[("2023-01", 100.0), ("2023-03", 106.0)]);
        let m = s.lookup(month("2023-06")).unwrap();
        assert_eq!(m.value, 106.0);
        assert_eq!(m.kind, MatchKind::Nearest(month("2023-03")));
    }

    #[test]
    fn test_interpolation_wins_over_nearest_when_bracketed() {
        let s = series(&[("2023-01", 100.0), ("2023-05", 110.0)]);
        assert_eq!(
            s.lookup(month("2023-03")).unwrap().kind,
            MatchKind::Interpolated
        );
    }

    #[test]
    fn test_single_point_series_uses_nearest() {
        let s = series(&[("2023-01", 100.0)]);
        let m = s.lookup(month("2024-06")).unwrap();
        assert_eq!(m.kind, MatchKind::Nearest(month("2023-01")));
        assert_eq!(m.value, 100.0);
    }

    #[test]
    fn test_empty_series_yields_none() {
        let s = TimeSeries::new();
        assert!(s.lookup(month("2023-01")).is_none());
    }

    #[test]
    fn test_series_serde_roundtrip() {
        let s = series(&[("2023-01", 100.0), ("2023-03", 106.0)]);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"2023-01\""));
        let back: TimeSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
