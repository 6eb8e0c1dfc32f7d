//! CLI argument definitions for coinsight.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `assets` | List supported assets |
//! | `quote` | Current price with 24h change |
//! | `series` | Daily price history |
//! | `news` | Latest headlines |
//! | `ask` | Ask the local model about an asset |
//! | `summarize` | Summarize the latest headlines |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--quote-source` | env or `coingecko` | Quote provider |
//! | `--series-source` | env or `coingecko` | Series provider |
//! | `--timeout-ms` | env or `10000` | Per-request timeout |
//!
//! # Examples
//!
//! ```bash
//! coinsight quote bitcoin
//! coinsight series ethereum --days 30 --format table
//! coinsight ask dogecoin "Why is the price moving today?"
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use coinsight_core::ProviderId;

/// Crypto market dashboard: prices, history, news and local-model insights.
#[derive(Debug, Parser)]
#[command(name = "coinsight", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Provider for current quotes (overrides COINSIGHT_QUOTE_SOURCE).
    #[arg(long, global = true, value_enum)]
    pub quote_source: Option<MarketSource>,

    /// Provider for price history (overrides COINSIGHT_SERIES_SOURCE).
    #[arg(long, global = true, value_enum)]
    pub series_source: Option<MarketSource>,

    /// Request timeout in milliseconds (overrides COINSIGHT_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminal display.
    Table,
    /// Single JSON object.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketSource {
    Coingecko,
    Binance,
}

impl From<MarketSource> for ProviderId {
    fn from(source: MarketSource) -> Self {
        match source {
            MarketSource::Coingecko => Self::Coingecko,
            MarketSource::Binance => Self::Binance,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List supported assets and their provider identifiers.
    Assets,

    /// Current USD price with 24h change.
    ///
    ///   coinsight quote bitcoin
    ///   coinsight quote solana --quote-source binance
    Quote(AssetArgs),

    /// Daily USD price history.
    ///
    ///   coinsight series bitcoin
    ///   coinsight series bitcoin --days 90
    ///   coinsight series litecoin --max
    Series(SeriesArgs),

    /// Latest headlines for an asset.
    News(AssetArgs),

    /// Ask the local model a question, with price and news as context.
    ///
    ///   coinsight ask bitcoin "Why is the price fluctuating today?"
    Ask(AskArgs),

    /// Summarize the latest headlines with the local model.
    Summarize(AssetArgs),
}

#[derive(Debug, Args)]
pub struct AssetArgs {
    /// Asset id, e.g. bitcoin, ethereum, dogecoin.
    pub asset: String,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Asset id, e.g. bitcoin.
    pub asset: String,

    /// Number of days of history.
    #[arg(long, default_value_t = 7, conflicts_with = "max")]
    pub days: u32,

    /// Full history available from the provider.
    #[arg(long, default_value_t = false)]
    pub max: bool,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Asset id, e.g. bitcoin.
    pub asset: String,

    /// Free-text question; multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}
