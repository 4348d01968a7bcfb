use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// One detected traffic infraction, exactly as the detection backend reports it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViolationRecord {
    pub id: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub plate_number: String,
    pub vehicle_type: String,
    pub violations: Vec<String>,
    /// Detector confidence in `0.0..=1.0`.
    pub confidence: f64,
    pub screenshot: String,
}

impl ViolationRecord {
    pub fn kinds(&self) -> impl Iterator<Item = ViolationKind> + '_ {
        self.violations.iter().map(|v| ViolationKind::classify(v))
    }

    /// Highest severity among this record's violations, if it has any.
    pub fn severity(&self) -> Option<Severity> {
        self.kinds().map(|k| k.severity()).max()
    }

    pub fn has_valid_confidence(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence)
    }

    /// Confidence rendered the way the dashboard shows it, e.g. `94.0%`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }

    pub fn matches_plate(&self, needle: &str) -> bool {
        self.plate_number
            .to_lowercase()
            .contains(&needle.trim().to_lowercase())
    }

    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.kinds().any(|k| k == kind)
    }
}

/// An RFC 3339 timestamp that keeps the text it was parsed from, so records
/// are re-encoded byte for byte (offset and fraction digits included).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    instant: DateTime<Utc>,
}

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self {
            raw: instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            instant,
        }
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let instant = DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc);
        Ok(Self {
            raw: raw.to_string(),
            instant,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, EnumString)]
pub enum ViolationKind {
    #[strum(serialize = "No helmet")]
    NoHelmet,
    #[strum(serialize = "Speeding")]
    Speeding,
    #[strum(serialize = "Red light")]
    RedLight,
    #[strum(serialize = "License plate")]
    LicensePlate,
    #[strum(serialize = "Lane violation")]
    Lane,
    #[strum(serialize = "Illegal turn")]
    IllegalTurn,
    #[strum(serialize = "Parking")]
    Parking,
    #[strum(serialize = "Overtaking")]
    Overtaking,
    #[strum(serialize = "Other")]
    Other,
}

impl ViolationKind {
    /// Backends describe violations as free text ("Helmet not worn",
    /// "Running a red light"), so classification is by keyword.
    pub fn classify(description: &str) -> Self {
        let text = description.to_lowercase();
        if text.contains("helmet") {
            Self::NoHelmet
        } else if text.contains("speed") {
            Self::Speeding
        } else if text.contains("red light") {
            Self::RedLight
        } else if text.contains("license plate") {
            Self::LicensePlate
        } else if text.contains("lane") {
            Self::Lane
        } else if text.contains("turn") {
            Self::IllegalTurn
        } else if text.contains("parking") {
            Self::Parking
        } else if text.contains("overtak") {
            Self::Overtaking
        } else {
            Self::Other
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::Speeding | Self::RedLight => Severity::Critical,
            Self::NoHelmet | Self::LicensePlate => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

/// Ordered so that `max()` picks the most serious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}
