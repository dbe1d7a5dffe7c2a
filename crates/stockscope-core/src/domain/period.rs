use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const UNITS: [&str; 4] = ["wk", "mo", "d", "y"];

/// Relative lookback period understood by the remote service (`1mo`, `100d`, `ytd`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period(String);

impl Period {
    /// Periods offered by the range selector.
    pub const PRESETS: [&'static str; 4] = ["1mo", "3mo", "6mo", "1y"];
    pub const DEFAULT: &'static str = "1mo";

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_lowercase();
        if normalized == "ytd" || normalized == "max" {
            return Ok(Self(normalized));
        }

        let invalid = || ValidationError::InvalidPeriod {
            value: input.trim().to_owned(),
        };

        let unit = UNITS
            .iter()
            .find(|unit| normalized.ends_with(*unit))
            .ok_or_else(invalid)?;
        let count = &normalized[..normalized.len() - unit.len()];
        if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        match count.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self(normalized)),
            _ => Err(invalid()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Period {
    fn default() -> Self {
        Self(String::from(Self::DEFAULT))
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Period {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_presets() {
        for preset in Period::PRESETS {
            assert_eq!(Period::parse(preset).expect("preset").as_str(), preset);
        }
    }

    #[test]
    fn normalizes_case_and_accepts_keywords() {
        assert_eq!(Period::parse(" 3MO ").expect("must parse").as_str(), "3mo");
        assert_eq!(Period::parse("YTD").expect("must parse").as_str(), "ytd");
        assert_eq!(Period::parse("100d").expect("must parse").as_str(), "100d");
        assert_eq!(Period::parse("2wk").expect("must parse").as_str(), "2wk");
    }

    #[test]
    fn rejects_invalid_period() {
        for raw in ["", "mo", "0d", "1h", "-1y", "one month"] {
            let err = Period::parse(raw).expect_err("must fail");
            assert!(matches!(err, ValidationError::InvalidPeriod { .. }), "{raw}");
        }
    }
}
