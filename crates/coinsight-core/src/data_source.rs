//! Data source traits and the structured source error.
//!
//! | Trait | Operations | Implementations |
//! |-------|------------|-----------------|
//! | [`MarketDataSource`] | quote, series | CoinGecko, Binance |
//! | [`NewsSource`] | headlines | CryptoPanic |
//!
//! Both traits return boxed futures so adapters can be held as trait objects
//! inside the [`Dashboard`](crate::Dashboard).

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{AssetId, Headline, HistoricalSeries, ProviderId, Quote, SeriesRange, ValidationError};

/// Boxed future returned by source traits.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure, non-success status, or an empty/unreadable body.
    UpstreamUnavailable,
    /// The asset is missing from the static table or the provider response.
    UnknownSymbol,
    /// Caller-supplied input was empty or malformed.
    InvalidInput,
    /// A validation failure that is neither caller input nor provider data.
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::UpstreamUnavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn unknown_symbol(provider: ProviderId, asset: &AssetId) -> Self {
        Self {
            kind: SourceErrorKind::UnknownSymbol,
            message: format!("asset '{asset}' is not known to {provider}"),
            retryable: false,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidInput,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UpstreamUnavailable => "source.upstream_unavailable",
            SourceErrorKind::UnknownSymbol => "source.unknown_symbol",
            SourceErrorKind::InvalidInput => "source.invalid_input",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Conversion for caller-supplied values. Adapters classify invalid provider
/// values as `UpstreamUnavailable` themselves.
impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::EmptyQuestion
            | ValidationError::EmptyAsset
            | ValidationError::AssetTooLong { .. }
            | ValidationError::AssetInvalidChar { .. }
            | ValidationError::InvalidRange { .. } => Self::invalid_input(error.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

/// Price and history provider contract.
///
/// Implementations translate the asset through [`crate::assets`] and must
/// fail with [`SourceErrorKind::UnknownSymbol`] for unmapped assets.
pub trait MarketDataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Current price with 24h change fields always populated.
    fn quote<'a>(&'a self, asset: &'a AssetId) -> SourceFuture<'a, Quote>;

    /// Price history, strictly ordered by timestamp.
    fn series<'a>(
        &'a self,
        asset: &'a AssetId,
        range: SeriesRange,
    ) -> SourceFuture<'a, HistoricalSeries>;
}

/// Headline provider contract.
///
/// Errors are returned as-is; turning them into a renderable sentinel is the
/// job of [`NewsAggregator`](crate::NewsAggregator).
pub trait NewsSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// At most `limit` headlines in provider order.
    fn headlines<'a>(&'a self, asset: &'a AssetId, limit: usize) -> SourceFuture<'a, Vec<Headline>>;
}
