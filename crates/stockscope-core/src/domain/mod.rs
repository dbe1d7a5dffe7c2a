//! # Domain Models
//!
//! Request and response types exchanged with the market service.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Validated, upper-cased exchange symbol |
//! | [`Period`] | Relative lookback (`1mo`, `100d`, `ytd`) |
//! | [`FilterMode`] | Period vs explicit date range |
//! | [`RangeSpec`] | Validated range sent to both endpoints |
//! | [`PlotType`] | Chart kind selected on the form |
//! | [`MaWindow`] | Moving-average window (10..=300, default 20) |
//! | [`PlotSpec`] | Plot kind with its auxiliary parameters |
//! | [`PlotRequest`] | Payload of the plot endpoint |
//! | [`InsightsRequest`] | Ticker + range for the insights endpoint |
//! | [`ChartData`] | Opaque renderer description |
//! | [`InsightsSummary`] | Volatility, trend, and volume anomalies |
//!
//! ## Validation
//!
//! Construction validates every invariant, so a built request is always
//! sendable:
//!
//! ```rust
//! use stockscope_core::{RangeSpec, ValidationError};
//! use time::macros::date;
//!
//! let today = date!(2024 - 06 - 15);
//! let reversed = RangeSpec::dates(date!(2024 - 06 - 01), date!(2024 - 05 - 01), today);
//! assert_eq!(reversed, Err(ValidationError::InvalidRange));
//! ```

mod market;
mod period;
mod plot;
pub(crate) mod range;
mod request;
mod ticker;

pub(crate) use market::InsightsWire;
pub use market::{Anomalies, ChartData, InsightsSummary, Trend, TrendDirection, Volatility};
pub use period::Period;
pub use plot::{MaWindow, PlotSpec, PlotType};
pub use range::{format_date, parse_date, FilterMode, RangeSpec};
pub use request::{InsightsRequest, PlotRequest};
pub use ticker::Ticker;
