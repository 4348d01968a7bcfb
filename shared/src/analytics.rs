use serde::{Deserialize, Serialize};

use crate::record::{ViolationKind, ViolationRecord};

/// Counts derived from one batch of results. Never persisted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct AnalyticsSummary {
    pub total_violations: usize,
    pub violation_events: usize,
    pub no_helmet_count: usize,
    pub speeding_count: usize,
    pub red_light_count: usize,
    pub license_plate_issues: usize,
    pub processing_time_secs: f64,
}

impl AnalyticsSummary {
    pub fn from_records(records: &[ViolationRecord], processing_time_secs: f64) -> Self {
        records.iter().flat_map(|r| r.kinds()).fold(
            Self {
                total_violations: records.len(),
                processing_time_secs: processing_time_secs.max(0.0),
                ..Self::default()
            },
            |mut summary, kind| {
                summary.violation_events += 1;
                match kind {
                    ViolationKind::NoHelmet => summary.no_helmet_count += 1,
                    ViolationKind::Speeding => summary.speeding_count += 1,
                    ViolationKind::RedLight => summary.red_light_count += 1,
                    ViolationKind::LicensePlate => summary.license_plate_issues += 1,
                    _ => {}
                }
                summary
            },
        )
    }

    /// Violations outside the four tracked categories.
    pub fn other_count(&self) -> usize {
        self.violation_events
            - self.no_helmet_count
            - self.speeding_count
            - self.red_light_count
            - self.license_plate_issues
    }

    /// Share of all violation events in `count`, as a percentage.
    pub fn share(&self, count: usize) -> f64 {
        if self.violation_events == 0 {
            0.0
        } else {
            count as f64 / self.violation_events as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(violations: &[&str]) -> ViolationRecord {
        ViolationRecord {
            id: "VIO-7".into(),
            timestamp: Utc::now().into(),
            location: None,
            plate_number: "XYZ789".into(),
            vehicle_type: "Motorcycle".into(),
            violations: violations.iter().map(|v| v.to_string()).collect(),
            confidence: 0.89,
            screenshot: String::new(),
        }
    }

    #[test]
    fn empty_batch_is_all_zero() {
        let summary = AnalyticsSummary::from_records(&[], 0.0);
        assert_eq!(summary, AnalyticsSummary::default());
        assert_eq!(summary.share(0), 0.0);
    }

    #[test]
    fn counts_each_category() {
        let records = vec![
            record(&["No helmet", "Speeding"]),
            record(&["No helmet"]),
            record(&["Running a red light", "License plate not visible", "Illegal turn"]),
        ];

        let summary = AnalyticsSummary::from_records(&records, 11.5);

        assert_eq!(summary.total_violations, 3);
        assert_eq!(summary.violation_events, 6);
        assert_eq!(summary.no_helmet_count, 2);
        assert_eq!(summary.speeding_count, 1);
        assert_eq!(summary.red_light_count, 1);
        assert_eq!(summary.license_plate_issues, 1);
        assert_eq!(summary.other_count(), 1);
        assert_eq!(summary.processing_time_secs, 11.5);
    }

    #[test]
    fn category_counts_never_exceed_events() {
        let records = vec![
            record(&["helmet", "speed", "speed", "red light"]),
            record(&[]),
            record(&["Parking violation"]),
        ];
        let s = AnalyticsSummary::from_records(&records, 1.0);
        let tracked = s.no_helmet_count + s.speeding_count + s.red_light_count + s.license_plate_issues;
        assert!(tracked <= s.violation_events);
        assert_eq!(s.violation_events, 5);
        assert_eq!(s.share(s.speeding_count), 40.0);
    }

    #[test]
    fn negative_processing_time_is_clamped() {
        assert_eq!(AnalyticsSummary::from_records(&[], -3.0).processing_time_secs, 0.0);
    }
}
