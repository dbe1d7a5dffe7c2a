use stockscope_core::{InsightsStream, MarketApi};
use time::Date;

use crate::cli::InsightsArgs;
use crate::error::CliError;
use crate::output::{exit_code, StreamReport};

use super::CommandOutput;

pub async fn run(
    args: &InsightsArgs,
    api: &dyn MarketApi,
    today: Date,
) -> Result<CommandOutput, CliError> {
    let fields = super::snapshot(&args.ticker, &args.range, None);
    let insights = super::fetch_once::<InsightsStream>(&fields, api, today).await?;

    let report = StreamReport::new("insights", insights.state(), None)?;
    Ok(CommandOutput {
        exit_code: exit_code(std::slice::from_ref(&report)),
        data: Some(serde_json::to_value(report)?),
    })
}
