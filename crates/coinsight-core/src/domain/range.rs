use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Requested history window for a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRange {
    /// The last `n` days, `n >= 1`.
    Days(u32),
    /// The longest history the provider offers.
    Max,
}

impl SeriesRange {
    pub fn days(days: u32) -> Result<Self, ValidationError> {
        if days == 0 {
            return Err(ValidationError::InvalidRange {
                value: days.to_string(),
            });
        }
        Ok(Self::Days(days))
    }

    /// Value of the `days` query parameter understood by pair-list providers.
    pub fn query_value(self) -> String {
        match self {
            Self::Days(days) => days.to_string(),
            Self::Max => String::from("max"),
        }
    }
}

impl Default for SeriesRange {
    fn default() -> Self {
        Self::Days(7)
    }
}

impl Display for SeriesRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Days(days) => write!(f, "{days}d"),
            Self::Max => f.write_str("max"),
        }
    }
}

impl FromStr for SeriesRange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized == "max" {
            return Ok(Self::Max);
        }

        let digits = normalized.strip_suffix('d').unwrap_or(&normalized);
        digits
            .parse::<u32>()
            .ok()
            .filter(|days| *days > 0)
            .map(Self::Days)
            .ok_or(ValidationError::InvalidRange { value: normalized })
    }
}
