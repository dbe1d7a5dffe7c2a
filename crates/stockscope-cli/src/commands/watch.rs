//! Interactive session: one form edit per stdin line, one NDJSON event per
//! state change on stdout.
//!
//! ```text
//! ticker NVDA        mode period|dates     period 6mo
//! start 2024-01-02   end 2024-03-28        type moving-average
//! window 50          submit                state
//! quit
//! ```

use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{json, Value};
use stockscope_core::{
    Clock, Dashboard, FieldEdit, FilterMode, MarketApi, PlotType, Resolution, StreamId, Ticket,
    Update,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output::stream_writer::{NdjsonStreamWriter, WatchEventType};
use crate::output::{exit_code, StreamReport};

use super::CommandOutput;

#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchCommand {
    Edit(FieldEdit),
    Submit,
    State,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
fn parse_line(line: &str) -> Result<Option<WatchCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, value) = match line.split_once(char::is_whitespace) {
        Some((verb, value)) => (verb, value.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "ticker" => WatchCommand::Edit(FieldEdit::Ticker(value.to_owned())),
        "mode" => WatchCommand::Edit(FieldEdit::FilterMode(
            FilterMode::from_str(value).map_err(|error| error.to_string())?,
        )),
        "period" => WatchCommand::Edit(FieldEdit::Period(value.to_owned())),
        "start" => WatchCommand::Edit(FieldEdit::StartDate(value.to_owned())),
        "end" => WatchCommand::Edit(FieldEdit::EndDate(value.to_owned())),
        "type" => WatchCommand::Edit(FieldEdit::PlotType(
            PlotType::from_str(value).map_err(|error| error.to_string())?,
        )),
        "window" => {
            let window = value
                .parse::<u32>()
                .map_err(|_| format!("window must be a whole number of days, got '{value}'"))?;
            WatchCommand::Edit(FieldEdit::Window(window))
        }
        "submit" => WatchCommand::Submit,
        "state" => WatchCommand::State,
        "quit" | "exit" => WatchCommand::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

pub async fn run(
    args: &WatchArgs,
    api: Arc<dyn MarketApi>,
    clock: Arc<dyn Clock>,
) -> Result<CommandOutput, CliError> {
    let mut dashboard = Dashboard::new(api, args.policy).with_clock(clock);
    let mut writer = NdjsonStreamWriter::new(std::io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    writer.emit(
        WatchEventType::Ready,
        Some(json!({ "policy": args.policy.as_str() })),
    )?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed, settling in-flight requests");
                    for update in dashboard.settle().await {
                        emit_update(&mut writer, &dashboard, update)?;
                    }
                    break;
                };
                match parse_line(&line) {
                    Ok(None) => {}
                    Ok(Some(WatchCommand::Quit)) => break,
                    Ok(Some(command)) => handle(&mut writer, &mut dashboard, command)?,
                    Err(reason) => writer.emit(
                        WatchEventType::Rejected,
                        Some(json!({ "input": line, "reason": reason })),
                    )?,
                }
            }
            Some(update) = dashboard.next_update(), if dashboard.in_flight() > 0 => {
                emit_update(&mut writer, &dashboard, update)?;
            }
        }
    }

    let code = exit_code(&reports(&dashboard)?);
    writer.emit(WatchEventType::End, Some(json!({ "exit_code": code })))?;

    Ok(CommandOutput {
        data: None,
        exit_code: code,
    })
}

fn handle<W: Write>(
    writer: &mut NdjsonStreamWriter<W>,
    dashboard: &mut Dashboard,
    command: WatchCommand,
) -> Result<(), CliError> {
    let issued = match command {
        WatchCommand::Edit(edit) => dashboard.apply(edit),
        WatchCommand::Submit if !dashboard.form().can_submit() => {
            return writer.emit(
                WatchEventType::Rejected,
                Some(json!({ "input": "submit", "reason": "a ticker is required" })),
            );
        }
        WatchCommand::Submit => dashboard.submit(),
        WatchCommand::State => {
            return writer.emit(WatchEventType::State, Some(state(dashboard)?));
        }
        WatchCommand::Quit => return Ok(()),
    };

    let plot_error = dashboard.plot().validation_error().map(ToString::to_string);
    let insights_error = dashboard.insights().validation_error().map(ToString::to_string);
    if issued.is_empty() && plot_error.is_none() && insights_error.is_none() {
        return Ok(());
    }

    let requests = issued.iter().map(ticket_json).collect::<Vec<_>>();
    writer.emit(
        WatchEventType::Dispatched,
        Some(json!({
            "requests": requests,
            "validation": { "plot": plot_error, "insights": insights_error },
        })),
    )
}

fn emit_update<W: Write>(
    writer: &mut NdjsonStreamWriter<W>,
    dashboard: &Dashboard,
    update: Update,
) -> Result<(), CliError> {
    let mut data = ticket_json(&update.ticket);
    data["resolution"] = Value::from(match update.resolution {
        Resolution::Applied => "applied",
        Resolution::Stale => "stale",
    });
    if update.resolution == Resolution::Applied {
        let report = match update.stream() {
            StreamId::Plot => StreamReport::new("plot", dashboard.plot_state(), None)?,
            StreamId::Insights => {
                StreamReport::new("insights", dashboard.insights_state(), None)?
            }
        };
        data["report"] = serde_json::to_value(report)?;
    }
    writer.emit(WatchEventType::Update, Some(data))
}

fn ticket_json(ticket: &Ticket) -> Value {
    json!({ "stream": ticket.stream().as_str(), "seq": ticket.seq() })
}

fn reports(dashboard: &Dashboard) -> Result<[StreamReport; 2], CliError> {
    Ok([
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
    ])
}

fn state(dashboard: &Dashboard) -> Result<Value, CliError> {
    let form = dashboard.form();
    let fields = form.fields();
    let [plot, insights] = reports(dashboard)?;
    let visible = form
        .visible_fields()
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>();

    Ok(json!({
        "form": {
            "ticker": fields.ticker,
            "mode": fields.filter_mode.as_str(),
            "period": fields.period,
            "start": fields.start_date,
            "end": fields.end_date,
            "plot_type": fields.plot_type.as_str(),
            "window": fields.window,
            "visible": visible,
            "can_submit": form.can_submit(),
            "submitted": form.has_submitted(),
        },
        "in_flight": dashboard.in_flight(),
        "plot": plot,
        "insights": insights,
    }))
}
