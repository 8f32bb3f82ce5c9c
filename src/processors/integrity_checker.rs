use crate::models::StationStats;

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub total_stations: usize,
    pub total_samples: u64,
    pub expected_samples: u64,
    pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct IntegrityViolation {
    pub station: String,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    EmptyStation,
    MinGreaterThanMax,
    MeanOutOfBounds,
    OutOfOrder,
    SampleCountMismatch,
}

/// Checks a finished, sorted result against the aggregation invariants.
pub struct IntegrityChecker;

impl IntegrityChecker {
    pub fn new() -> Self {
        Self
    }

    /// `expected_samples` is the number of lines the pipeline parsed.
    pub fn check_integrity(
        &self,
        stations: &[StationStats],
        expected_samples: u64,
    ) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_stations: stations.len(),
            total_samples: 0,
            expected_samples,
            violations: Vec::new(),
        };

        for (i, stats) in stations.iter().enumerate() {
            report.total_samples += stats.count;
            self.check_station(stats, &mut report);

            if let Some(previous) = i.checked_sub(1).map(|p| &stations[p]) {
                if previous.name >= stats.name {
                    report.violations.push(IntegrityViolation {
                        station: stats.name_lossy().into_owned(),
                        violation_type: ViolationType::OutOfOrder,
                        details: format!("follows {:?}", previous.name_lossy()),
                    });
                }
            }
        }

        if report.total_samples != expected_samples {
            report.violations.push(IntegrityViolation {
                station: String::new(),
                violation_type: ViolationType::SampleCountMismatch,
                details: format!(
                    "{} samples aggregated, {} lines parsed",
                    report.total_samples, expected_samples
                ),
            });
        }

        report
    }

    fn check_station(&self, stats: &StationStats, report: &mut IntegrityReport) {
        let station = || stats.name_lossy().into_owned();

        if stats.count == 0 {
            report.violations.push(IntegrityViolation {
                station: station(),
                violation_type: ViolationType::EmptyStation,
                details: "station has no samples".to_string(),
            });
            return;
        }

        if stats.min > stats.max {
            report.violations.push(IntegrityViolation {
                station: station(),
                violation_type: ViolationType::MinGreaterThanMax,
                details: format!("min {} > max {}", stats.min, stats.max),
            });
        }

        // min <= sum / count <= max, in exact integer arithmetic
        let count = stats.count as i128;
        let sum = stats.sum as i128;
        if sum < stats.min as i128 * count || sum > stats.max as i128 * count {
            report.violations.push(IntegrityViolation {
                station: station(),
                violation_type: ViolationType::MeanOutOfBounds,
                details: format!(
                    "mean {:.2} outside [{}, {}]",
                    stats.mean(),
                    stats.min as f64 / 10.0,
                    stats.max as f64 / 10.0
                ),
            });
        }
    }

    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();
        summary.push_str("Integrity Report\n");
        summary.push_str("================\n");
        summary.push_str(&format!("Stations: {}\n", report.total_stations));
        summary.push_str(&format!(
            "Samples: {} (lines parsed: {})\n",
            report.total_samples, report.expected_samples
        ));

        if report.is_clean() {
            summary.push_str("No violations found\n");
        } else {
            summary.push_str(&format!("Violations: {}\n", report.violations.len()));
            for violation in report.violations.iter().take(10) {
                summary.push_str(&format!(
                    "  - {:?} {}: {}\n",
                    violation.violation_type, violation.station, violation.details
                ));
            }
            if report.violations.len() > 10 {
                summary.push_str(&format!("  ... and {} more\n", report.violations.len() - 10));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}
