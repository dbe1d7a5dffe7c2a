//! Keeps each stream's state consistent with the latest published form snapshot.
//!
//! An [`Orchestrator`] declares the fields it depends on. It is consulted only
//! when a publication changes one of them, and it re-fetches only when its
//! derived key (the effective inputs for its endpoint) actually changed.
//!
//! | Stream | Dependencies | Key |
//! |--------|--------------|-----|
//! | [`PlotStream`] | all fields | ticker, active range, plot type, window if moving average |
//! | [`InsightsStream`] | ticker, mode, period, dates | ticker, active range |

use time::Date;
use tracing::debug;

use crate::api::{ApiFuture, MarketApi};
use crate::form::{Field, FieldSet, FormSnapshot, Publication};
use crate::lifecycle::{AsyncResult, FetchLifecycle, Resolution, StreamId, Ticket};
use crate::{
    payload, ChartData, FetchError, FilterMode, InsightsRequest, InsightsSummary, PlotRequest,
    PlotType, ValidationError,
};

/// Static description of one request stream.
pub trait StreamSpec {
    type Request: Clone + Send + 'static;
    type Data: std::fmt::Debug + Send + 'static;
    type Key: std::fmt::Debug + PartialEq;

    const STREAM: StreamId;
    const DEPENDENCIES: FieldSet;

    /// Effective inputs; equal keys never trigger a second fetch.
    fn key(snapshot: &FormSnapshot) -> Self::Key;

    fn build(snapshot: &FormSnapshot, today: Date) -> Result<Self::Request, ValidationError>;

    fn fetch(api: &dyn MarketApi, request: Self::Request) -> ApiFuture<Self::Data>;
}

/// Active range fields as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeKey {
    Period(String),
    Dates { start: String, end: String },
}

impl RangeKey {
    fn from_snapshot(snapshot: &FormSnapshot) -> Self {
        match snapshot.filter_mode {
            FilterMode::ByPeriod => Self::Period(snapshot.period.trim().to_ascii_lowercase()),
            FilterMode::ByDateRange => Self::Dates {
                start: snapshot.start_date.trim().to_owned(),
                end: snapshot.end_date.trim().to_owned(),
            },
        }
    }
}

fn ticker_key(snapshot: &FormSnapshot) -> String {
    snapshot.ticker.trim().to_ascii_uppercase()
}

/// Chart stream: `POST /api/plot`.
#[derive(Debug)]
pub struct PlotStream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotKey {
    ticker: String,
    range: RangeKey,
    plot_type: PlotType,
    window: Option<u32>,
}

impl StreamSpec for PlotStream {
    type Request = PlotRequest;
    type Data = ChartData;
    type Key = PlotKey;

    const STREAM: StreamId = StreamId::Plot;
    const DEPENDENCIES: FieldSet = FieldSet::ALL;

    fn key(snapshot: &FormSnapshot) -> PlotKey {
        PlotKey {
            ticker: ticker_key(snapshot),
            range: RangeKey::from_snapshot(snapshot),
            plot_type: snapshot.plot_type,
            window: (snapshot.plot_type == PlotType::MovingAverage).then_some(snapshot.window),
        }
    }

    fn build(snapshot: &FormSnapshot, today: Date) -> Result<PlotRequest, ValidationError> {
        payload::build(snapshot, today)
    }

    fn fetch(api: &dyn MarketApi, request: PlotRequest) -> ApiFuture<ChartData> {
        api.plot(request)
    }
}

/// Insights stream: `GET /api/insights/{ticker}`. Plot selection is not a dependency.
#[derive(Debug)]
pub struct InsightsStream;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsKey {
    ticker: String,
    range: RangeKey,
}

impl StreamSpec for InsightsStream {
    type Request = InsightsRequest;
    type Data = InsightsSummary;
    type Key = InsightsKey;

    const STREAM: StreamId = StreamId::Insights;
    const DEPENDENCIES: FieldSet = FieldSet::of(&[
        Field::Ticker,
        Field::FilterMode,
        Field::Period,
        Field::StartDate,
        Field::EndDate,
    ]);

    fn key(snapshot: &FormSnapshot) -> InsightsKey {
        InsightsKey {
            ticker: ticker_key(snapshot),
            range: RangeKey::from_snapshot(snapshot),
        }
    }

    fn build(snapshot: &FormSnapshot, today: Date) -> Result<InsightsRequest, ValidationError> {
        payload::build_insights(snapshot, today)
    }

    fn fetch(api: &dyn MarketApi, request: InsightsRequest) -> ApiFuture<InsightsSummary> {
        api.insights(request)
    }
}

/// Drives one [`FetchLifecycle`] from form publications.
#[derive(Debug)]
pub struct Orchestrator<S: StreamSpec> {
    lifecycle: FetchLifecycle<S::Data>,
    last_key: Option<S::Key>,
    validation: Option<ValidationError>,
}

pub type PlotOrchestrator = Orchestrator<PlotStream>;
pub type InsightsOrchestrator = Orchestrator<InsightsStream>;

impl<S: StreamSpec> Default for Orchestrator<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StreamSpec> Orchestrator<S> {
    pub fn new() -> Self {
        Self {
            lifecycle: FetchLifecycle::new(S::STREAM),
            last_key: None,
            validation: None,
        }
    }

    pub const fn stream(&self) -> StreamId {
        S::STREAM
    }

    pub const fn dependencies(&self) -> FieldSet {
        S::DEPENDENCIES
    }

    /// React to a publication; ignored unless it touches a dependency.
    pub fn on_publish(
        &mut self,
        publication: &Publication,
        today: Date,
    ) -> Option<(Ticket, S::Request)> {
        if !publication.changed.intersects(S::DEPENDENCIES) {
            return None;
        }
        self.on_change(&publication.snapshot, today)
    }

    /// Re-derive the request from `snapshot`. Returns the ticket and request
    /// the caller must send, or `None` when nothing is to be fetched: the key is
    /// unchanged, or the inputs failed validation (recorded in
    /// [`Self::validation_error`], in-flight requests superseded).
    pub fn on_change(
        &mut self,
        snapshot: &FormSnapshot,
        today: Date,
    ) -> Option<(Ticket, S::Request)> {
        let key = S::key(snapshot);
        if self.last_key.as_ref() == Some(&key) {
            return None;
        }

        match S::build(snapshot, today) {
            Ok(request) => {
                self.last_key = Some(key);
                self.validation = None;
                self.lifecycle.trigger(Some(request))
            }
            Err(error) => {
                // Range checks depend on `today`, so rejected inputs are
                // validated again on the next change instead of being deduped.
                debug!(stream = S::STREAM.as_str(), %error, "inputs failed validation");
                self.last_key = None;
                self.validation = Some(error);
                self.lifecycle.supersede();
                None
            }
        }
    }

    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<S::Data, FetchError>) -> Resolution {
        self.lifecycle.resolve(ticket, outcome)
    }

    pub fn state(&self) -> &AsyncResult<S::Data> {
        self.lifecycle.state()
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation.as_ref()
    }

    pub fn lifecycle(&self) -> &FetchLifecycle<S::Data> {
        &self.lifecycle
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    const TODAY: Date = date!(2024 - 06 - 15);

    fn nvda() -> FormSnapshot {
        FormSnapshot {
            ticker: String::from("nvda"),
            ..FormSnapshot::default()
        }
    }

    fn publish(snapshot: &FormSnapshot, changed: FieldSet) -> Publication {
        Publication {
            snapshot: snapshot.clone(),
            changed,
        }
    }

    #[test]
    fn valid_inputs_trigger_loading() {
        let mut plot = PlotOrchestrator::new();
        let (ticket, request) = plot
            .on_publish(&publish(&nvda(), FieldSet::ALL), TODAY)
            .expect("fetch issued");

        assert_eq!(ticket.stream(), StreamId::Plot);
        assert_eq!(request.ticker.as_str(), "NVDA");
        assert!(plot.state().is_loading());
    }

    #[test]
    fn empty_ticker_records_validation_and_stays_idle() {
        let mut plot = PlotOrchestrator::new();
        let issued = plot.on_publish(&publish(&FormSnapshot::default(), FieldSet::ALL), TODAY);

        assert!(issued.is_none());
        assert!(plot.state().is_idle());
        assert_eq!(plot.validation_error(), Some(&ValidationError::EmptyTicker));
    }

    #[test]
    fn unchanged_key_does_not_refetch() {
        let mut plot = PlotOrchestrator::new();
        let mut fields = nvda();
        assert!(plot.on_change(&fields, TODAY).is_some());

        fields.ticker = String::from(" NVDA ");
        assert!(plot.on_change(&fields, TODAY).is_none());

        // Window is not an input of a close plot.
        fields.window = 99;
        assert!(plot.on_change(&fields, TODAY).is_none());

        // Hidden date fields are not inputs in period mode.
        fields.start_date = String::from("2024-01-01");
        assert!(plot.on_change(&fields, TODAY).is_none());
    }

    #[test]
    fn insights_ignore_plot_only_publications() {
        let mut insights = InsightsOrchestrator::new();
        let mut fields = nvda();
        assert!(insights.on_publish(&publish(&fields, FieldSet::ALL), TODAY).is_some());

        fields.plot_type = PlotType::MovingAverage;
        fields.window = 50;
        let changed = FieldSet::of(&[Field::PlotType, Field::Window]);
        assert!(insights.on_publish(&publish(&fields, changed), TODAY).is_none());
        assert_eq!(insights.lifecycle().latest_seq(), 1);
    }

    #[test]
    fn validation_failure_supersedes_in_flight_request() {
        let mut plot = PlotOrchestrator::new();
        let mut fields = nvda();
        let (ticket, _) = plot.on_change(&fields, TODAY).expect("fetch issued");

        fields.ticker.clear();
        assert!(plot.on_change(&fields, TODAY).is_none());
        assert!(plot.state().is_idle());

        assert_eq!(plot.resolve(ticket, Ok(ChartData::default())), Resolution::Stale);
        assert!(plot.state().is_idle());
    }

    #[test]
    fn correcting_input_clears_validation_error() {
        let mut plot = PlotOrchestrator::new();
        let mut fields = nvda();
        fields.filter_mode = FilterMode::ByDateRange;
        fields.start_date = String::from("2024-06-01");
        fields.end_date = String::from("2024-05-01");
        assert!(plot.on_change(&fields, TODAY).is_none());
        assert_eq!(plot.validation_error(), Some(&ValidationError::InvalidRange));

        fields.end_date = String::from("2024-06-10");
        assert!(plot.on_change(&fields, TODAY).is_some());
        assert!(plot.validation_error().is_none());
    }

    #[test]
    fn future_range_is_revalidated_once_the_day_arrives() {
        let mut insights = InsightsOrchestrator::new();
        let mut fields = nvda();
        fields.filter_mode = FilterMode::ByDateRange;
        fields.start_date = String::from("2024-06-01");
        fields.end_date = String::from("2024-06-16");
        assert!(insights.on_change(&fields, TODAY).is_none());
        assert_eq!(insights.validation_error(), Some(&ValidationError::InvalidRange));

        let tomorrow = date!(2024 - 06 - 16);
        let (_, request) = insights.on_change(&fields, tomorrow).expect("fetch issued");

        assert!(insights.validation_error().is_none());
        assert!(request.path_and_query().contains("end_date=2024-06-16"));
    }

    #[test]
    fn resubmitting_invalid_inputs_keeps_the_error_without_fetching() {
        let mut plot = PlotOrchestrator::new();
        let fields = FormSnapshot::default();

        assert!(plot.on_change(&fields, TODAY).is_none());
        assert!(plot.on_change(&fields, TODAY).is_none());

        assert_eq!(plot.validation_error(), Some(&ValidationError::EmptyTicker));
        assert!(plot.state().is_idle());
    }
}
