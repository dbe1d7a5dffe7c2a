use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Pre-flight validation errors raised while turning form fields into a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty ticker")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("invalid period '{value}', expected e.g. 5d, 1wk, 1mo, 1y, ytd or max")]
    InvalidPeriod { value: String },

    #[error("{field} date is required")]
    MissingDate { field: &'static str },
    #[error("{field} date must be YYYY-MM-DD: '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("invalid range")]
    InvalidRange,

    #[error("invalid plot type '{value}', expected one of close, volume, moving_average, volume_weighted")]
    InvalidPlotType { value: String },
    #[error("invalid filter mode '{value}', expected period or dates")]
    InvalidFilterMode { value: String },
    #[error("moving average window {value} outside {min}..={max}")]
    WindowOutOfRange { value: u32, min: u16, max: u16 },
}

/// Classification of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The service could not be reached or the exchange broke down mid-flight.
    Transport,
    /// The service answered with an explicit `error` field.
    Service,
    /// The service answered with a body that is neither a payload nor an error.
    InvalidResponse,
}

impl FetchErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Service => "service",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

/// Error surfaced through [`crate::AsyncResult::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub const TRANSPORT_MESSAGE: &'static str = "service unreachable";
    pub const INVALID_RESPONSE_MESSAGE: &'static str = "malformed response from service";

    /// Transport failures carry a generic message; the cause goes to the log.
    pub fn transport() -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: String::from(Self::TRANSPORT_MESSAGE),
        }
    }

    /// Service-reported error, surfaced verbatim.
    pub fn service(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Service,
            message: message.into(),
        }
    }

    pub fn invalid_response() -> Self {
        Self {
            kind: FetchErrorKind::InvalidResponse,
            message: String::from(Self::INVALID_RESPONSE_MESSAGE),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
