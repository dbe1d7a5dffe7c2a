use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] stockscope_core::ValidationError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_categories_to_exit_codes() {
        assert_eq!(
            CliError::from(stockscope_core::ValidationError::EmptyTicker).exit_code(),
            2
        );
        assert_eq!(CliError::Config(String::from("bad timeout")).exit_code(), 2);
        assert_eq!(
            CliError::from(std::io::Error::other("disk full")).exit_code(),
            10
        );
    }
}
