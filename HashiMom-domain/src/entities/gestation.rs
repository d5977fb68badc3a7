use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Gestational-age bucket used to select reference ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Trimester {
    /// Completed weeks 0 through 12
    T1,
    /// Completed weeks 13 through 27
    T2,
    /// Completed week 28 onwards
    T3,
}

impl Trimester {
    /// Classify completed gestational weeks
    pub fn from_weeks(weeks: i64) -> Self {
        if weeks <= 12 {
            Trimester::T1
        } else if weeks <= 27 {
            Trimester::T2
        } else {
            Trimester::T3
        }
    }

    /// Label as stored and sent over the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Trimester::T1 => "T1",
            Trimester::T2 => "T2",
            Trimester::T3 => "T3",
        }
    }
}

impl fmt::Display for Trimester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trimester {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T1" => Ok(Trimester::T1),
            "T2" => Ok(Trimester::T2),
            "T3" => Ok(Trimester::T3),
            other => Err(format!("Unknown trimester: {}", other)),
        }
    }
}

/// Label used when no trimester can be determined
pub const UNKNOWN_TRIMESTER: &str = "-";

/// Serde helpers for an optional trimester written as "T1"/"T2"/"T3" or "-"
pub mod trimester_label {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{Trimester, UNKNOWN_TRIMESTER};

    pub fn serialize<S>(value: &Option<Trimester>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(trimester) => serializer.serialize_str(trimester.as_str()),
            None => serializer.serialize_str(UNKNOWN_TRIMESTER),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Trimester>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        if label == UNKNOWN_TRIMESTER {
            return Ok(None);
        }
        label.parse().map(Some).map_err(de::Error::custom)
    }
}

/// Result of the gestational calculator
///
/// All fields are absent together: either the input date was missing or it
/// lies after the reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestationalAge {
    /// Completed weeks since the last menstrual period
    pub weeks: Option<i64>,

    /// Remaining days, 0 through 6
    pub days: Option<i64>,

    #[serde(with = "trimester_label")]
    pub trimester: Option<Trimester>,
}

impl GestationalAge {
    /// The result used when no age can be computed
    pub const fn unknown() -> Self {
        Self {
            weeks: None,
            days: None,
            trimester: None,
        }
    }

    /// Trimester label, "-" when unknown
    pub fn trimester_label(&self) -> &'static str {
        self.trimester.map_or(UNKNOWN_TRIMESTER, |t| t.as_str())
    }
}

impl Default for GestationalAge {
    fn default() -> Self {
        Self::unknown()
    }
}
