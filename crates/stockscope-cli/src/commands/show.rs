use std::sync::Arc;

use serde_json::json;
use stockscope_core::{Clock, CommitPolicy, Dashboard, FormController, MarketApi};

use crate::cli::ShowArgs;
use crate::error::CliError;
use crate::output::{exit_code, StreamReport};

use super::CommandOutput;

/// One submit of the whole form; waits for both streams.
pub async fn run(
    args: &ShowArgs,
    api: Arc<dyn MarketApi>,
    clock: Arc<dyn Clock>,
) -> Result<CommandOutput, CliError> {
    let fields = super::snapshot(&args.ticker, &args.range, Some(&args.plot));
    let form = FormController::with_fields(CommitPolicy::OnSubmit, fields);
    let mut dashboard = Dashboard::with_form(api, form).with_clock(clock);

    dashboard.submit();
    dashboard.settle().await;

    let reports = [
        StreamReport::new(
            "plot",
            dashboard.plot_state(),
            dashboard.plot().validation_error(),
        )?,
        StreamReport::new(
            "insights",
            dashboard.insights_state(),
            dashboard.insights().validation_error(),
        )?,
    ];
    let exit_code = exit_code(&reports);
    let [plot, insights] = reports;

    Ok(CommandOutput {
        data: Some(json!({ "plot": plot, "insights": insights })),
        exit_code,
    })
}
