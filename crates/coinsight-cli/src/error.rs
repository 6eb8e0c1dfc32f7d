use coinsight_core::{SourceError, SourceErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] coinsight_core::ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Source(error) => match error.kind() {
                SourceErrorKind::InvalidInput | SourceErrorKind::UnknownSymbol => 2,
                SourceErrorKind::UpstreamUnavailable | SourceErrorKind::Internal => 3,
            },
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
