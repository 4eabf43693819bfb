//! Bar interval and history window requested from a provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
}

impl BarInterval {
    /// Provider-facing code (`"1d"`, `"5m"`, ...).
    pub fn code(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::OneWeek => "1wk",
        }
    }

    /// Nominal length of one bar.
    pub fn duration(self) -> chrono::Duration {
        match self {
            Self::OneMinute => chrono::Duration::minutes(1),
            Self::FiveMinutes => chrono::Duration::minutes(5),
            Self::FifteenMinutes => chrono::Duration::minutes(15),
            Self::ThirtyMinutes => chrono::Duration::minutes(30),
            Self::OneHour => chrono::Duration::hours(1),
            Self::OneDay => chrono::Duration::days(1),
            Self::OneWeek => chrono::Duration::weeks(1),
        }
    }
}

impl Default for BarInterval {
    fn default() -> Self {
        Self::OneDay
    }
}

impl fmt::Display for BarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BarInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::OneMinute),
            "5m" => Ok(Self::FiveMinutes),
            "15m" => Ok(Self::FifteenMinutes),
            "30m" => Ok(Self::ThirtyMinutes),
            "1h" => Ok(Self::OneHour),
            "1d" => Ok(Self::OneDay),
            "1wk" => Ok(Self::OneWeek),
            other => Err(format!(
                "unknown bar interval '{other}'. Valid: 1m, 5m, 15m, 30m, 1h, 1d, 1wk"
            )),
        }
    }
}

/// How far back to ask the provider for history, in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookback {
    pub days: u32,
}

impl Lookback {
    pub fn days(days: u32) -> Self {
        Self { days }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days)
    }
}
