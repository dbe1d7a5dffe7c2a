//! Event loop tying the form, both orchestrators, and the market API together.
//!
//! All state mutation happens on the task that owns the [`Dashboard`]. Network
//! calls run as spawned tasks that own their request and hand back
//! `(ticket, outcome)`; [`Dashboard::next_update`] applies those one at a time,
//! so a slow early response can never overwrite a newer one. A call whose task
//! panics resolves its ticket as a transport error.
//!
//! ```rust,ignore
//! let mut dashboard = Dashboard::new(Arc::new(HttpMarketApi::new(config)), CommitPolicy::OnSubmit);
//! dashboard.apply(FieldEdit::Ticker("nvda".into()));
//! dashboard.submit();
//! dashboard.settle().await;
//! println!("{}", dashboard.plot_state().tag());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{Id, JoinSet};
use tracing::{error, info, warn};

use crate::api::{ApiFuture, MarketApi};
use crate::clock::{Clock, SystemClock};
use crate::form::{CommitPolicy, FieldEdit, FormController, Publication};
use crate::lifecycle::{AsyncResult, Resolution, StreamId, Ticket};
use crate::orchestrator::{
    InsightsOrchestrator, InsightsStream, PlotOrchestrator, PlotStream, StreamSpec,
};
use crate::{ChartData, FetchError, InsightsSummary};

/// Outcome of one finished network call.
#[derive(Debug)]
enum Completion {
    Plot(Ticket, Result<ChartData, FetchError>),
    Insights(Ticket, Result<InsightsSummary, FetchError>),
}

impl Completion {
    /// Stand-in for a call whose task ended without producing an outcome.
    fn lost(ticket: Ticket) -> Self {
        match ticket.stream() {
            StreamId::Plot => Self::Plot(ticket, Err(FetchError::transport())),
            StreamId::Insights => Self::Insights(ticket, Err(FetchError::transport())),
        }
    }
}

/// A completion that was resolved against its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    pub ticket: Ticket,
    pub resolution: Resolution,
}

impl Update {
    pub const fn stream(&self) -> StreamId {
        self.ticket.stream()
    }

    pub const fn is_stale(&self) -> bool {
        matches!(self.resolution, Resolution::Stale)
    }
}

/// Owns the form and both request streams for one session.
pub struct Dashboard {
    form: FormController,
    plot: PlotOrchestrator,
    insights: InsightsOrchestrator,
    api: Arc<dyn MarketApi>,
    clock: Arc<dyn Clock>,
    in_flight: JoinSet<Completion>,
    tickets: HashMap<Id, Ticket>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn MarketApi>, policy: CommitPolicy) -> Self {
        Self::with_form(api, FormController::new(policy))
    }

    pub fn with_form(api: Arc<dyn MarketApi>, form: FormController) -> Self {
        Self {
            form,
            plot: PlotOrchestrator::new(),
            insights: InsightsOrchestrator::new(),
            api,
            clock: Arc::new(SystemClock),
            in_flight: JoinSet::new(),
            tickets: HashMap::new(),
        }
    }

    /// Replace the source of "today" used for date-range validation.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record one input event. Returns the tickets of any requests it started.
    /// Must be called within a tokio runtime.
    pub fn apply(&mut self, edit: FieldEdit) -> Vec<Ticket> {
        match self.form.apply(edit) {
            Some(publication) => self.dispatch(&publication),
            None => Vec::new(),
        }
    }

    /// The explicit commit step. Must be called within a tokio runtime.
    pub fn submit(&mut self) -> Vec<Ticket> {
        let publication = self.form.submit();
        self.dispatch(&publication)
    }

    fn dispatch(&mut self, publication: &Publication) -> Vec<Ticket> {
        let today = self.clock.today();
        let mut issued = Vec::with_capacity(2);

        if let Some((ticket, request)) = self.plot.on_publish(publication, today) {
            info!(
                stream = "plot",
                seq = ticket.seq(),
                ticker = %request.ticker,
                plot_type = %request.plot_type(),
                range = %request.range,
                "fetching plot"
            );
            let call = PlotStream::fetch(self.api.as_ref(), request);
            self.spawn(ticket, call, move |outcome| Completion::Plot(ticket, outcome));
            issued.push(ticket);
        }

        if let Some((ticket, request)) = self.insights.on_publish(publication, today) {
            info!(
                stream = "insights",
                seq = ticket.seq(),
                ticker = %request.ticker,
                range = %request.range,
                "fetching insights"
            );
            let call = InsightsStream::fetch(self.api.as_ref(), request);
            self.spawn(ticket, call, move |outcome| {
                Completion::Insights(ticket, outcome)
            });
            issued.push(ticket);
        }

        issued
    }

    fn spawn<T, F>(&mut self, ticket: Ticket, call: ApiFuture<T>, complete: F)
    where
        T: Send + 'static,
        F: FnOnce(Result<T, FetchError>) -> Completion + Send + 'static,
    {
        let task = self.in_flight.spawn(async move { complete(call.await) });
        self.tickets.insert(task.id(), ticket);
    }

    /// Wait for the next network call to finish and resolve it. Returns `None`
    /// once nothing is in flight.
    pub async fn next_update(&mut self) -> Option<Update> {
        loop {
            match self.in_flight.join_next_with_id().await? {
                Ok((id, completion)) => {
                    self.tickets.remove(&id);
                    return Some(self.resolve(completion));
                }
                Err(join_error) => {
                    let Some(ticket) = self.tickets.remove(&join_error.id()) else {
                        error!(error = %join_error, "untracked fetch task did not complete");
                        continue;
                    };
                    error!(
                        stream = %ticket.stream(),
                        seq = ticket.seq(),
                        error = %join_error,
                        "fetch task did not complete"
                    );
                    return Some(self.resolve(Completion::lost(ticket)));
                }
            }
        }
    }

    /// Resolve every in-flight call, in completion order.
    pub async fn settle(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    fn resolve(&mut self, completion: Completion) -> Update {
        let (ticket, resolution) = match completion {
            Completion::Plot(ticket, outcome) => {
                log_outcome(ticket, &outcome);
                (ticket, self.plot.resolve(ticket, outcome))
            }
            Completion::Insights(ticket, outcome) => {
                log_outcome(ticket, &outcome);
                (ticket, self.insights.resolve(ticket, outcome))
            }
        };
        Update { ticket, resolution }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn plot(&self) -> &PlotOrchestrator {
        &self.plot
    }

    pub fn insights(&self) -> &InsightsOrchestrator {
        &self.insights
    }

    pub fn plot_state(&self) -> &AsyncResult<ChartData> {
        self.plot.state()
    }

    pub fn insights_state(&self) -> &AsyncResult<InsightsSummary> {
        self.insights.state()
    }
}

fn log_outcome<T>(ticket: Ticket, outcome: &Result<T, FetchError>) {
    match outcome {
        Ok(_) => info!(stream = %ticket.stream(), seq = ticket.seq(), "response received"),
        Err(error) => warn!(
            stream = %ticket.stream(),
            seq = ticket.seq(),
            kind = error.kind().as_str(),
            %error,
            "request failed"
        ),
    }
}
