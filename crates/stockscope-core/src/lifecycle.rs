//! Per-stream fetch state machine with stale-response suppression.
//!
//! ```text
//! Idle ──trigger──▶ Loading ──resolve(latest)──▶ Success | Error
//!   ▲                  ▲                               │
//!   └──supersede───────┴──────────trigger──────────────┘
//! ```
//!
//! Every trigger hands out a [`Ticket`] carrying a monotonically increasing
//! sequence number. Only the ticket with the latest number may change the
//! state; any earlier ticket resolves as [`Resolution::Stale`] and its outcome is
//! dropped. In-flight transport is never cancelled.

use std::fmt::{Display, Formatter};

use tracing::debug;

use crate::FetchError;

/// Logical request stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamId {
    Plot,
    Insights,
}

impl StreamId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plot => "plot",
            Self::Insights => "insights",
        }
    }
}

impl Display for StreamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one issued request on one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    stream: StreamId,
    seq: u64,
}

impl Ticket {
    pub const fn stream(self) -> StreamId {
        self.stream
    }

    pub const fn seq(self) -> u64 {
        self.seq
    }
}

/// What happened to a resolved outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The outcome belonged to the latest request and is now the visible state.
    Applied,
    /// A newer request superseded this one; the outcome was dropped.
    Stale,
}

/// Visible state of one stream.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncResult<T> {
    Idle,
    Loading,
    Success(T),
    Error(FetchError),
}

impl<T> Default for AsyncResult<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> AsyncResult<T> {
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub const fn success(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub const fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }
}

/// State machine for one stream.
#[derive(Debug)]
pub struct FetchLifecycle<T> {
    stream: StreamId,
    latest_seq: u64,
    state: AsyncResult<T>,
}

impl<T> FetchLifecycle<T> {
    pub fn new(stream: StreamId) -> Self {
        Self {
            stream,
            latest_seq: 0,
            state: AsyncResult::Idle,
        }
    }

    /// Issue a request. `None` leaves the state untouched and issues nothing;
    /// otherwise the stream moves to Loading and the caller must perform exactly
    /// one network call for the returned ticket.
    pub fn trigger<R>(&mut self, request: Option<R>) -> Option<(Ticket, R)> {
        let request = request?;
        self.latest_seq += 1;
        self.state = AsyncResult::Loading;

        let ticket = Ticket {
            stream: self.stream,
            seq: self.latest_seq,
        };
        debug!(stream = %self.stream, seq = ticket.seq, "request triggered");
        Some((ticket, request))
    }

    /// Apply an outcome if `ticket` is still the latest one issued on this stream.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<T, FetchError>) -> Resolution {
        if !self.is_current(ticket) {
            debug!(
                stream = %self.stream,
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding stale response"
            );
            return Resolution::Stale;
        }

        self.state = match outcome {
            Ok(data) => AsyncResult::Success(data),
            Err(error) => AsyncResult::Error(error),
        };
        Resolution::Applied
    }

    /// Invalidate every outstanding ticket without issuing a request. A pending
    /// Loading state falls back to Idle; settled states are kept.
    pub fn supersede(&mut self) {
        self.latest_seq += 1;
        if self.state.is_loading() {
            self.state = AsyncResult::Idle;
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.stream == self.stream && ticket.seq == self.latest_seq
    }

    pub const fn stream(&self) -> StreamId {
        self.stream
    }

    pub const fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub const fn state(&self) -> &AsyncResult<T> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot_stream() -> FetchLifecycle<&'static str> {
        FetchLifecycle::new(StreamId::Plot)
    }

    #[test]
    fn missing_request_stays_idle() {
        let mut lifecycle = plot_stream();
        assert!(lifecycle.trigger::<()>(None).is_none());
        assert!(lifecycle.state().is_idle());
        assert_eq!(lifecycle.latest_seq(), 0);
    }

    #[test]
    fn trigger_moves_to_loading_with_increasing_sequence() {
        let mut lifecycle = plot_stream();
        let (first, _) = lifecycle.trigger(Some("a")).expect("issued");
        let (second, _) = lifecycle.trigger(Some("b")).expect("issued");

        assert!(lifecycle.state().is_loading());
        assert!(second.seq() > first.seq());
        assert_eq!(second.stream(), StreamId::Plot);
    }

    #[test]
    fn latest_success_replaces_prior_error() {
        let mut lifecycle = plot_stream();
        let (ticket, _) = lifecycle.trigger(Some(())).expect("issued");
        lifecycle.resolve(ticket, Err(FetchError::transport()));
        assert!(lifecycle.state().error().is_some());

        let (ticket, _) = lifecycle.trigger(Some(())).expect("issued");
        assert!(lifecycle.state().is_loading());
        assert_eq!(lifecycle.resolve(ticket, Ok("chart")), Resolution::Applied);
        assert_eq!(lifecycle.state(), &AsyncResult::Success("chart"));
    }

    #[test]
    fn out_of_order_response_is_stale() {
        let mut lifecycle = plot_stream();
        let (t1, _) = lifecycle.trigger(Some(())).expect("issued");
        let (t2, _) = lifecycle.trigger(Some(())).expect("issued");

        assert_eq!(lifecycle.resolve(t2, Ok("second")), Resolution::Applied);
        assert_eq!(lifecycle.resolve(t1, Ok("first")), Resolution::Stale);
        assert_eq!(lifecycle.state(), &AsyncResult::Success("second"));
    }

    #[test]
    fn stale_error_does_not_clobber_loading() {
        let mut lifecycle = plot_stream();
        let (t1, _) = lifecycle.trigger(Some(())).expect("issued");
        let _t2 = lifecycle.trigger(Some(())).expect("issued");

        assert_eq!(
            lifecycle.resolve(t1, Err(FetchError::service("boom"))),
            Resolution::Stale
        );
        assert!(lifecycle.state().is_loading());
    }

    #[test]
    fn supersede_drops_pending_and_returns_to_idle() {
        let mut lifecycle = plot_stream();
        let (ticket, _) = lifecycle.trigger(Some(())).expect("issued");
        lifecycle.supersede();

        assert!(lifecycle.state().is_idle());
        assert_eq!(lifecycle.resolve(ticket, Ok("late")), Resolution::Stale);
        assert!(lifecycle.state().is_idle());
    }

    #[test]
    fn supersede_keeps_settled_state() {
        let mut lifecycle = plot_stream();
        let (ticket, _) = lifecycle.trigger(Some(())).expect("issued");
        lifecycle.resolve(ticket, Ok("chart"));
        lifecycle.supersede();
        assert_eq!(lifecycle.state().success(), Some(&"chart"));
    }

    #[test]
    fn ticket_from_other_stream_is_stale() {
        let mut plot = plot_stream();
        let mut insights = FetchLifecycle::<&'static str>::new(StreamId::Insights);
        let _ = plot.trigger(Some(())).expect("issued");
        let (foreign, _) = insights.trigger(Some(())).expect("issued");

        assert_eq!(plot.resolve(foreign, Ok("wrong")), Resolution::Stale);
    }
}
