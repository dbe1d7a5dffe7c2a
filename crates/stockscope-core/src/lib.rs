//! # Stockscope Core
//!
//! Form-to-request mapping and request orchestration for the Stockscope
//! market dashboard.
//!
//! ## Overview
//!
//! - **Domain types** for tickers, periods, date ranges, and plot selections
//! - **Payload builder** turning raw form fields into validated requests
//! - **Fetch lifecycle** with sequence-numbered tickets so late responses never
//!   overwrite newer ones
//! - **Orchestrators** for the chart and insights streams, each refetching only
//!   when its own inputs change
//! - **Form controller** with an explicit commit policy
//! - **HTTP market API** over `reqwest`
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Market service contract and HTTP implementation |
//! | [`clock`] | Source of "today" for date validation |
//! | [`config`] | Client configuration |
//! | [`dashboard`] | Event loop owning form, streams, and in-flight calls |
//! | [`domain`] | Request and response models |
//! | [`error`] | Validation, fetch, and core error types |
//! | [`form`] | Form fields, visibility, and commit policy |
//! | [`http_client`] | HTTP client abstraction |
//! | [`lifecycle`] | Per-stream async state machine |
//! | [`orchestrator`] | Stream orchestrators |
//! | [`payload`] | Form snapshot to request mapping |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockscope_core::{ClientConfig, CommitPolicy, Dashboard, FieldEdit, HttpMarketApi};
//!
//! #[tokio::main]
//! async fn main() {
//!     let api = Arc::new(HttpMarketApi::new(ClientConfig::default()));
//!     let mut dashboard = Dashboard::new(api, CommitPolicy::OnSubmit);
//!
//!     dashboard.apply(FieldEdit::Ticker("NVDA".into()));
//!     dashboard.submit();
//!     dashboard.settle().await;
//!
//!     if let Some(chart) = dashboard.plot_state().success() {
//!         println!("{} traces", chart.trace_count());
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Input problems are [`ValidationError`]s and never reach the network.
//! Failed calls surface as a [`FetchError`] on the stream state:
//!
//! ```rust
//! use stockscope_core::{FetchError, FetchErrorKind};
//!
//! fn describe(error: &FetchError) -> &str {
//!     match error.kind() {
//!         FetchErrorKind::Service => error.message(),
//!         FetchErrorKind::Transport | FetchErrorKind::InvalidResponse => "try again later",
//!     }
//! }
//!
//! assert_eq!(describe(&FetchError::service("Invalid ticker")), "Invalid ticker");
//! ```

pub mod api;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod form;
pub mod http_client;
pub mod lifecycle;
pub mod orchestrator;
pub mod payload;

// Re-export commonly used types at crate root

// Remote API
pub use api::{ApiFuture, HttpMarketApi, MarketApi};

// Clock
pub use clock::{Clock, FixedClock, SystemClock};

// Configuration
pub use config::ClientConfig;

// Event loop
pub use dashboard::{Dashboard, Update};

// Domain models
pub use domain::{
    format_date, parse_date, Anomalies, ChartData, FilterMode, InsightsRequest, InsightsSummary,
    MaWindow, Period, PlotRequest, PlotSpec, PlotType, RangeSpec, Ticker, Trend, TrendDirection,
    Volatility,
};

// Error types
pub use error::{CoreError, FetchError, FetchErrorKind, ValidationError};

// Form
pub use form::{
    CommitPolicy, Field, FieldEdit, FieldSet, FormController, FormSnapshot, Publication,
};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Lifecycle
pub use lifecycle::{AsyncResult, FetchLifecycle, Resolution, StreamId, Ticket};

// Orchestrators
pub use orchestrator::{
    InsightsOrchestrator, InsightsStream, Orchestrator, PlotOrchestrator, PlotStream, StreamSpec,
};
