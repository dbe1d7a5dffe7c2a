use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::domain::range::{format_date, parse_date};

/// Chart description consumed verbatim by the external charting renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub layout: Value,
}

impl ChartData {
    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    /// Layout title text, when the renderer layout carries one.
    pub fn title(&self) -> Option<&str> {
        let title = self.layout.get("title")?;
        title
            .as_str()
            .or_else(|| title.get("text").and_then(Value::as_str))
    }
}

/// Direction of the price trend over the requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

impl Display for TrendDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" | "upward" | "uptrend" | "bullish" => Ok(Self::Up),
            "down" | "downward" | "downtrend" | "bearish" => Ok(Self::Down),
            "flat" | "sideways" | "neutral" => Ok(Self::Flat),
            other => Err(format!("unrecognized trend direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volatility {
    /// Annualized volatility, in percent.
    pub value: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomalies {
    #[serde(serialize_with = "serialize_dates")]
    pub dates: Vec<Date>,
    pub description: String,
}

fn serialize_dates<S>(dates: &[Date], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(dates.iter().map(|date| format_date(*date)))
}

/// Derived market statistics for one ticker and range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsSummary {
    pub ticker: String,
    pub volatility: Volatility,
    pub trend: Trend,
    pub anomalies: Anomalies,
}

/// Response body of the insights endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct InsightsWire {
    #[serde(default)]
    ticker: String,
    volatility: VolatilityWire,
    trend: TrendWire,
    anomalies: AnomaliesWire,
}

#[derive(Debug, Deserialize)]
struct VolatilityWire {
    annualized_volatility_percent: f64,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TrendWire {
    direction: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct AnomaliesWire {
    #[serde(default)]
    high_volume_dates: Vec<String>,
    #[serde(default)]
    description: String,
}

impl InsightsWire {
    pub(crate) fn into_summary(self) -> Result<InsightsSummary, String> {
        let direction = TrendDirection::from_str(&self.trend.direction)?;
        let mut dates = self
            .anomalies
            .high_volume_dates
            .iter()
            .map(|raw| parse_date("anomaly", raw).map_err(|error| error.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        dates.sort_unstable();

        Ok(InsightsSummary {
            ticker: self.ticker,
            volatility: Volatility {
                value: self.volatility.annualized_volatility_percent,
                description: self.volatility.description,
            },
            trend: Trend {
                direction,
                description: self.trend.description,
            },
            anomalies: Anomalies {
                dates,
                description: self.anomalies.description,
            },
        })
    }
}
