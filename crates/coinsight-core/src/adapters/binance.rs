use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::{ensure_usable, invalid_value, parse_json, send};
use crate::assets;
use crate::data_source::{MarketDataSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::{
    parse_decimal, AssetId, HistoricalSeries, PricePoint, ProviderId, Quote, SeriesRange,
    UtcDateTime,
};

pub const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Upper bound Binance accepts for `limit` on `/api/v3/klines`.
pub const MAX_KLINES_PER_CALL: usize = 1000;

/// Page cap for one series request; 10 pages of daily candles covers ~27 years.
pub const MAX_KLINE_PAGES: usize = 10;

/// Binance error code for an unknown trading pair.
const INVALID_SYMBOL_CODE: i64 = -1121;

const DAY_MS: i64 = 86_400_000;

/// Binance adapter: 24h ticker quotes and daily kline series.
#[derive(Clone)]
pub struct BinanceAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl BinanceAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(BINANCE_BASE_URL),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn pair(asset: &AssetId) -> Result<&'static str, SourceError> {
        assets::lookup(asset)
            .map(|listing| listing.binance_pair)
            .ok_or_else(|| SourceError::unknown_symbol(ProviderId::Binance, asset))
    }

    /// Execute a request, mapping Binance's invalid-symbol rejection to
    /// `UnknownSymbol` before the generic status handling.
    async fn get_body(&self, asset: &AssetId, endpoint: String) -> Result<String, SourceError> {
        let request = HttpRequest::get(endpoint).with_timeout_ms(self.timeout_ms);
        let url = request.redacted_url();
        let response = send(self.http_client.as_ref(), ProviderId::Binance, request).await?;

        if response.status == 400 && is_invalid_symbol(&response.body) {
            tracing::debug!(%url, "binance rejected symbol");
            return Err(SourceError::unknown_symbol(ProviderId::Binance, asset));
        }

        Ok(ensure_usable(ProviderId::Binance, &url, response)?.body)
    }

    async fn fetch_quote(&self, asset: &AssetId) -> Result<Quote, SourceError> {
        let pair = Self::pair(asset)?;
        let endpoint = format!("{}/api/v3/ticker/24hr?symbol={pair}", self.base_url);
        let body = self.get_body(asset, endpoint).await?;
        let ticker: TickerResponse = parse_json(ProviderId::Binance, &body)?;

        if !ticker.symbol.eq_ignore_ascii_case(pair) {
            return Err(SourceError::unknown_symbol(ProviderId::Binance, asset));
        }

        let invalid = invalid_value(ProviderId::Binance);
        let price = parse_decimal("lastPrice", &ticker.last_price).map_err(&invalid)?;
        let change_absolute = ticker
            .price_change
            .as_deref()
            .map(|value| parse_decimal("priceChange", value))
            .transpose()
            .map_err(&invalid)?
            .unwrap_or_default();
        let change_percent = ticker
            .price_change_percent
            .as_deref()
            .map(|value| parse_decimal("priceChangePercent", value))
            .transpose()
            .map_err(&invalid)?
            .unwrap_or_default();

        // closeTime is the end of Binance's rolling window, not when we fetched.
        Quote::new(
            asset.clone(),
            price,
            change_absolute,
            change_percent,
            UtcDateTime::now(),
        )
        .map_err(invalid)
    }

    async fn fetch_series(
        &self,
        asset: &AssetId,
        range: SeriesRange,
    ) -> Result<HistoricalSeries, SourceError> {
        let pair = Self::pair(asset)?;
        let now = UtcDateTime::now();
        let mut start_ms = match range {
            SeriesRange::Days(days) => now.saturating_sub_days(days).unix_millis(),
            SeriesRange::Max => 0,
        };

        let mut points = Vec::new();
        let mut pages = 0;

        loop {
            let endpoint = format!(
                "{}/api/v3/klines?symbol={pair}&interval=1d&startTime={start_ms}&limit={MAX_KLINES_PER_CALL}",
                self.base_url
            );
            let body = self.get_body(asset, endpoint).await?;
            let rows: Vec<Vec<Value>> = parse_json(ProviderId::Binance, &body)?;
            pages += 1;

            let page_len = rows.len();
            let mut last_open = None;
            for row in &rows {
                let point = normalize_kline(row)?;
                last_open = Some(point.timestamp.unix_millis());
                points.push(point);
            }

            if page_len < MAX_KLINES_PER_CALL {
                break;
            }
            if pages >= MAX_KLINE_PAGES {
                tracing::warn!(
                    %asset,
                    pages,
                    points = points.len(),
                    "kline page limit reached, series truncated"
                );
                break;
            }
            match last_open {
                Some(open) if open + DAY_MS > start_ms => start_ms = open + DAY_MS,
                _ => break,
            }
        }

        Ok(HistoricalSeries::from_unordered(
            asset.clone(),
            ProviderId::Binance,
            points,
        ))
    }
}

impl MarketDataSource for BinanceAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Binance
    }

    fn quote<'a>(&'a self, asset: &'a AssetId) -> SourceFuture<'a, Quote> {
        Box::pin(self.fetch_quote(asset))
    }

    fn series<'a>(
        &'a self,
        asset: &'a AssetId,
        range: SeriesRange,
    ) -> SourceFuture<'a, HistoricalSeries> {
        Box::pin(self.fetch_series(asset, range))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerResponse {
    symbol: String,
    last_price: String,
    #[serde(default)]
    price_change: Option<String>,
    #[serde(default)]
    price_change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    code: i64,
}

fn is_invalid_symbol(body: &str) -> bool {
    serde_json::from_str::<BinanceErrorBody>(body)
        .map(|error| error.code == INVALID_SYMBOL_CODE)
        .unwrap_or(false)
}

/// Kline rows are positional: `[open_time, open, high, low, close, ...]`.
fn normalize_kline(row: &[Value]) -> Result<PricePoint, SourceError> {
    let open_time = row.first().and_then(Value::as_i64).ok_or_else(|| {
        SourceError::upstream_unavailable("binance kline row is missing its open time")
    })?;
    let close = match row.get(4) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => {
            return Err(SourceError::upstream_unavailable(
                "binance kline row is missing its close price",
            ))
        }
    };

    let invalid = invalid_value(ProviderId::Binance);
    let timestamp = UtcDateTime::from_unix_millis(open_time).map_err(&invalid)?;
    let price = parse_decimal("close", &close).map_err(&invalid)?;
    PricePoint::new(timestamp, price).map_err(invalid)
}
