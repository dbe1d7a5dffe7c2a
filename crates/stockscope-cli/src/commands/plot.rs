use std::path::Path;

use stockscope_core::{ChartData, MarketApi, PlotStream};
use time::Date;
use tracing::info;

use crate::cli::PlotArgs;
use crate::error::CliError;
use crate::output::{exit_code, StreamReport};

use super::CommandOutput;

pub async fn run(
    args: &PlotArgs,
    api: &dyn MarketApi,
    today: Date,
) -> Result<CommandOutput, CliError> {
    let fields = super::snapshot(&args.ticker, &args.range, Some(&args.plot));
    let plot = super::fetch_once::<PlotStream>(&fields, api, today).await?;

    if let (Some(path), Some(chart)) = (&args.output, plot.state().success()) {
        write_chart(path, chart)?;
    }

    let report = StreamReport::new("plot", plot.state(), None)?;
    Ok(CommandOutput {
        exit_code: exit_code(std::slice::from_ref(&report)),
        data: Some(serde_json::to_value(report)?),
    })
}

fn write_chart(path: &Path, chart: &ChartData) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(chart)?;
    std::fs::write(path, payload)?;
    info!(path = %path.display(), traces = chart.trace_count(), "chart written");
    Ok(())
}
