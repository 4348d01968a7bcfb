//! Canned detection results for contract tests and demo mode.
//!
//! Field values are fixed; only identifiers and timestamps (and the digits of
//! real-time plates) vary between calls.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::record::ViolationRecord;

pub const PLACEHOLDER_SCREENSHOT: &str = "/placeholder.svg?height=200&width=320";

fn violation_id(rng: &mut impl Rng) -> String {
    format!("VIO-{}", rng.random_range(0..10_000))
}

fn realtime_plate(rng: &mut impl Rng) -> String {
    format!("RT{}", rng.random_range(0..10_000))
}

fn violations(items: &[&str]) -> Vec<String> {
    items.iter().map(|v| v.to_string()).collect()
}

/// The two-record answer used as the golden upload response.
pub fn sample_results() -> Vec<ViolationRecord> {
    let mut rng = rand::rng();
    let now = Utc::now();
    vec![
        ViolationRecord {
            id: violation_id(&mut rng),
            timestamp: now.into(),
            location: Some(String::new()),
            plate_number: "AB0658".into(),
            vehicle_type: "Motorcycle".into(),
            violations: violations(&["No helmet", "Speeding"]),
            confidence: 0.94,
            screenshot: PLACEHOLDER_SCREENSHOT.into(),
        },
        ViolationRecord {
            id: violation_id(&mut rng),
            timestamp: (now - Duration::seconds(120)).into(),
            location: Some(String::new()),
            plate_number: "XYZ789".into(),
            vehicle_type: "Motorcycle".into(),
            violations: violations(&["No helmet"]),
            confidence: 0.89,
            screenshot: PLACEHOLDER_SCREENSHOT.into(),
        },
    ]
}

/// What one analyzed webcam frame yields in demo mode.
pub fn realtime_results() -> Vec<ViolationRecord> {
    let mut rng = rand::rng();
    let now = Utc::now();
    vec![
        ViolationRecord {
            id: violation_id(&mut rng),
            timestamp: now.into(),
            location: Some(String::new()),
            plate_number: realtime_plate(&mut rng),
            vehicle_type: "Motorcycle".into(),
            violations: violations(&["No helmet", "Speeding"]),
            confidence: 0.91,
            screenshot: PLACEHOLDER_SCREENSHOT.into(),
        },
        ViolationRecord {
            id: violation_id(&mut rng),
            timestamp: now.into(),
            location: Some(String::new()),
            plate_number: realtime_plate(&mut rng),
            vehicle_type: "Car".into(),
            violations: violations(&["Lane violation"]),
            confidence: 0.86,
            screenshot: PLACEHOLDER_SCREENSHOT.into(),
        },
    ]
}
