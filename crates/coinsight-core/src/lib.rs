//! # Coinsight Core
//!
//! Data and context layer for a crypto market dashboard: normalized quotes,
//! historical price series, news headlines and prompts for a locally hosted
//! text generator.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (CoinGecko, Binance, CryptoPanic) |
//! | [`assets`] | Static asset table mapping ids to provider names |
//! | [`cache`] | TTL memoization with per-key synchronization |
//! | [`config`] | Environment-driven dashboard configuration |
//! | [`dashboard`] | The [`Dashboard`] context object |
//! | [`data_source`] | Source traits and the structured source error |
//! | [`domain`] | Domain models (Quote, HistoricalSeries, Headline, Insight) |
//! | [`error`] | Validation errors |
//! | [`generator`] | Text-generation trait and completion client |
//! | [`http_client`] | HTTP client abstraction |
//! | [`insight`] | Prompt assembly under a character budget |
//! | [`news`] | News aggregator that degrades instead of failing |
//! | [`retry`] | Bounded retries with backoff |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coinsight_core::{AssetId, Dashboard, DashboardConfig, SeriesRange};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dashboard = Dashboard::from_config(&DashboardConfig::from_env()?)?;
//!     let bitcoin = AssetId::parse("bitcoin")?;
//!
//!     let quote = dashboard.get_quote(&bitcoin).await?;
//!     println!("BTC ${} ({}%)", quote.price(), quote.change_percent());
//!
//!     let series = dashboard.get_series(&bitcoin, SeriesRange::days(30)?).await?;
//!     println!("{} daily points", series.len());
//!
//!     for headline in &dashboard.get_news(&bitcoin).await {
//!         println!("- {}", headline.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Dashboard     │────▶│ CacheStore       │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Market / News   │────▶│ RetryingHttp     │
//! │ sources, model  │     │ Client (reqwest) │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use coinsight_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::UpstreamUnavailable => "provider is down, try later",
//!         SourceErrorKind::UnknownSymbol => "asset is not supported",
//!         SourceErrorKind::InvalidInput => "check your input",
//!         SourceErrorKind::Internal => "unexpected internal failure",
//!     }
//! }
//! ```
//!
//! News never fails outward: [`Dashboard::get_news`] returns a one-element
//! sentinel list instead.
//!
//! ## Security
//!
//! - API tokens are read from the environment and masked in logs
//! - All provider traffic goes over HTTPS via reqwest

pub mod adapters;
pub mod assets;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod generator;
pub mod http_client;
pub mod insight;
pub mod news;
pub mod retry;
pub mod source;

// Adapter implementations
pub use adapters::{BinanceAdapter, CoinGeckoAdapter, CryptoPanicAdapter};

// Static asset table
pub use assets::AssetListing;

// Caching
pub use cache::{CacheMode, CacheStore};

// Configuration
pub use config::DashboardConfig;

// Context object
pub use dashboard::Dashboard;

// Data source traits and errors
pub use data_source::{MarketDataSource, NewsSource, SourceError, SourceErrorKind, SourceFuture};

// Domain models
pub use domain::{
    parse_decimal, AssetId, Headline, HistoricalSeries, Insight, NewsList, PricePoint, Quote,
    SeriesRange, UtcDateTime,
};

// Error types
pub use error::ValidationError;

// Text generation
pub use generator::{CompletionClient, TextGenerator};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpFuture, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Prompt assembly
pub use insight::{build_prompt, build_summary_prompt, PromptBuilder};

// News
pub use news::NewsAggregator;

// Retry logic
pub use retry::{Backoff, RetryConfig, RetryingHttpClient};

// Source identifiers
pub use source::ProviderId;
