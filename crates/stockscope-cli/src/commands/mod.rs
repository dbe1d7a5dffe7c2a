mod insights;
mod plot;
mod show;
mod watch;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use stockscope_core::{
    Clock, FormSnapshot, HttpMarketApi, MarketApi, Orchestrator, StreamSpec, SystemClock,
};
use time::Date;

use crate::cli::{Cli, Command, PlotSelectArgs, RangeArgs};
use crate::config;
use crate::error::CliError;

pub struct CommandOutput {
    /// Printed as one JSON document; `None` when the command streamed its own output.
    pub data: Option<Value>,
    pub exit_code: u8,
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let config = config::resolve(cli)?;
    let api: Arc<dyn MarketApi> = Arc::new(HttpMarketApi::new(config));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match &cli.command {
        Command::Plot(args) => plot::run(args, api.as_ref(), clock.today()).await,
        Command::Insights(args) => insights::run(args, api.as_ref(), clock.today()).await,
        Command::Show(args) => show::run(args, api, clock).await,
        Command::Watch(args) => watch::run(args, api, clock).await,
    }
}

/// Form fields equivalent to the given flags.
fn snapshot(ticker: &str, range: &RangeArgs, plot: Option<&PlotSelectArgs>) -> FormSnapshot {
    let mut snapshot = FormSnapshot {
        ticker: ticker.to_owned(),
        filter_mode: range.filter_mode(),
        ..FormSnapshot::default()
    };
    if let Some(period) = &range.period {
        snapshot.period.clone_from(period);
    }
    if let Some(start) = &range.start {
        snapshot.start_date.clone_from(start);
    }
    if let Some(end) = &range.end {
        snapshot.end_date.clone_from(end);
    }
    if let Some(plot) = plot {
        snapshot.plot_type = plot.plot_type;
        snapshot.window = plot.ma_window;
    }
    snapshot
}

/// Validate, fetch, and resolve a single request on one stream.
async fn fetch_once<S>(
    snapshot: &FormSnapshot,
    api: &dyn MarketApi,
    today: Date,
) -> Result<Orchestrator<S>, CliError>
where
    S: StreamSpec,
    S::Data: Serialize,
{
    let mut orchestrator = Orchestrator::<S>::new();
    let issued = orchestrator.on_change(snapshot, today);
    if let Some(error) = orchestrator.validation_error() {
        return Err(CliError::Validation(error.clone()));
    }

    if let Some((ticket, request)) = issued {
        let outcome = S::fetch(api, request).await;
        orchestrator.resolve(ticket, outcome);
    }
    Ok(orchestrator)
}

#[cfg(test)]
mod tests {
    use stockscope_core::{FilterMode, PlotType};

    use super::*;

    #[test]
    fn flags_map_onto_form_fields() {
        let range = RangeArgs {
            period: None,
            start: Some(String::from("2024-01-02")),
            end: Some(String::from("2024-02-01")),
        };
        let plot = PlotSelectArgs {
            plot_type: PlotType::MovingAverage,
            ma_window: 50,
        };

        let fields = snapshot("nvda", &range, Some(&plot));

        assert_eq!(fields.ticker, "nvda");
        assert_eq!(fields.filter_mode, FilterMode::ByDateRange);
        assert_eq!(fields.start_date, "2024-01-02");
        assert_eq!(fields.period, "1mo");
        assert_eq!(fields.plot_type, PlotType::MovingAverage);
        assert_eq!(fields.window, 50);
    }
}
