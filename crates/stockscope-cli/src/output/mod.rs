pub mod stream_writer;

use serde::Serialize;
use serde_json::Value;
use stockscope_core::{AsyncResult, FetchError, ValidationError};

use crate::error::CliError;

/// Serializable view of one stream's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamReport {
    pub stream: &'static str,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl From<&FetchError> for ErrorReport {
    fn from(error: &FetchError) -> Self {
        Self {
            kind: error.kind().as_str(),
            message: error.message().to_owned(),
        }
    }
}

impl StreamReport {
    pub fn new<T: Serialize>(
        stream: &'static str,
        state: &AsyncResult<T>,
        validation: Option<&ValidationError>,
    ) -> Result<Self, CliError> {
        let data = state.success().map(serde_json::to_value).transpose()?;
        Ok(Self {
            stream,
            state: state.tag(),
            data,
            error: state.error().map(ErrorReport::from),
            validation_error: validation.map(ToString::to_string),
        })
    }

    pub const fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub const fn invalid(&self) -> bool {
        self.validation_error.is_some()
    }
}

/// Exit code for a finished command: 2 if any input was invalid, 3 if any
/// stream ended in an error, otherwise 0.
pub fn exit_code(reports: &[StreamReport]) -> u8 {
    if reports.iter().any(StreamReport::invalid) {
        2
    } else if reports.iter().any(StreamReport::failed) {
        3
    } else {
        0
    }
}

pub fn render(value: &Value, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{payload}");
    Ok(())
}
