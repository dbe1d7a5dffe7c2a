use serde::Serialize;

use crate::domain::range::format_date;
use crate::{CoreError, MaWindow, PlotSpec, PlotType, RangeSpec, Ticker};

/// Validated payload for `POST /api/plot`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlotRequest {
    pub ticker: Ticker,
    pub plot: PlotSpec,
    pub range: RangeSpec,
}

/// Body shape of the plot endpoint. Optional members are omitted, never null.
#[derive(Debug, Serialize)]
struct PlotPayload<'a> {
    ticker: &'a str,
    plot_type: PlotType,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ma_window: Option<u16>,
}

impl PlotRequest {
    pub fn new(ticker: Ticker, plot: PlotSpec, range: RangeSpec) -> Self {
        Self {
            ticker,
            plot,
            range,
        }
    }

    pub const fn plot_type(&self) -> PlotType {
        self.plot.plot_type()
    }

    pub const fn window(&self) -> Option<MaWindow> {
        self.plot.window()
    }

    pub fn insights(&self) -> InsightsRequest {
        InsightsRequest::new(self.ticker.clone(), self.range.clone())
    }

    /// Wire JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, CoreError> {
        Ok(serde_json::to_value(self.payload())?)
    }

    /// Wire JSON body; identical requests serialize to identical bytes.
    pub fn to_body(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(&self.payload())?)
    }

    fn payload(&self) -> PlotPayload<'_> {
        let (period, start, end) = match &self.range {
            RangeSpec::Period(period) => (Some(period.as_str()), None, None),
            RangeSpec::Dates { start, end } => {
                (None, Some(format_date(*start)), Some(format_date(*end)))
            }
        };

        PlotPayload {
            ticker: self.ticker.as_str(),
            plot_type: self.plot_type(),
            period,
            start,
            end,
            ma_window: self.window().map(MaWindow::get),
        }
    }
}

/// Validated request for `GET /api/insights/{ticker}`; plot selection plays no part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InsightsRequest {
    pub ticker: Ticker,
    pub range: RangeSpec,
}

impl InsightsRequest {
    pub fn new(ticker: Ticker, range: RangeSpec) -> Self {
        Self { ticker, range }
    }

    /// Path and query relative to the service base URL, percent-encoded.
    pub fn path_and_query(&self) -> String {
        let query = self
            .range
            .query_pairs()
            .into_iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        format!(
            "/api/insights/{}?{query}",
            urlencoding::encode(self.ticker.as_str())
        )
    }
}
