use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Running statistics of one station. Temperatures are fixed-point tenths of a degree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    pub name: Vec<u8>,
    pub min: i32,
    pub max: i32,
    pub sum: i64,
    pub count: u64,
}

impl StationStats {
    pub fn new(name: &[u8], temperature: i32) -> Self {
        Self {
            name: name.to_vec(),
            min: temperature,
            max: temperature,
            sum: temperature as i64,
            count: 1,
        }
    }

    /// Fold one more sample in. Both bounds are checked on every sample.
    #[inline]
    pub fn record(&mut self, temperature: i32) {
        if temperature < self.min {
            self.min = temperature;
        }
        if temperature > self.max {
            self.max = temperature;
        }
        self.sum += temperature as i64;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &StationStats) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Mean in degrees.
    pub fn mean(&self) -> f64 {
        self.sum as f64 / 10.0 / self.count as f64
    }

    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn summary(&self) -> StationSummary {
        StationSummary {
            name: self.name_lossy().into_owned(),
            min: self.min as f64 / 10.0,
            mean: (self.mean() * 10.0).round() / 10.0,
            max: self.max as f64 / 10.0,
            count: self.count,
        }
    }
}

/// Renders as `name=min/mean/max`, one fractional digit each.
impl fmt::Display for StationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}/{:.1}/{}",
            self.name_lossy(),
            Tenths(self.min as i64),
            self.mean(),
            Tenths(self.max as i64)
        )
    }
}

/// Fixed-point tenths printed without going through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenths(pub i64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
    }
}

/// Serializable view of a finished station aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub name: String,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_updates_both_bounds() {
        let mut stats = StationStats::new(b"Bergen", 0);
        stats.record(-86);
        stats.record(120);
        stats.record(35);

        assert_eq!(stats.min, -86);
        assert_eq!(stats.max, 120);
        assert_eq!(stats.sum, 69);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_merge() {
        let mut left = StationStats::new(b"Kabul", 60);
        left.record(-20);
        let mut right = StationStats::new(b"Kabul", 310);
        right.record(10);

        left.merge(&right);

        assert_eq!(left.min, -20);
        assert_eq!(left.max, 310);
        assert_eq!(left.sum, 360);
        assert_eq!(left.count, 4);
    }

    #[test]
    fn test_display_formats_one_decimal() {
        let mut stats = StationStats::new("Abéché".as_bytes(), 471);
        assert_eq!(stats.to_string(), "Abéché=47.1/47.1/47.1");

        stats.record(-5);
        assert_eq!(stats.to_string(), "Abéché=-0.5/23.3/47.1");
    }

    #[test]
    fn test_tenths() {
        assert_eq!(Tenths(0).to_string(), "0.0");
        assert_eq!(Tenths(-50).to_string(), "-5.0");
        assert_eq!(Tenths(-9).to_string(), "-0.9");
        assert_eq!(Tenths(999).to_string(), "99.9");
    }

    #[test]
    fn test_summary() {
        let mut stats = StationStats::new(b"Omaha", 195);
        stats.record(200);
        let summary = stats.summary();

        assert_eq!(summary.name, "Omaha");
        assert_eq!(summary.min, 19.5);
        assert_eq!(summary.max, 20.0);
        assert_eq!(summary.mean, 19.8);
        assert_eq!(summary.count, 2);
    }
}
