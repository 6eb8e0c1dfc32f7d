//! Provider adapters.
//!
//! | Adapter | Provider | Payload shapes |
//! |---------|----------|----------------|
//! | [`CoinGeckoAdapter`] | CoinGecko | simple price, `[epoch_ms, price]` pairs |
//! | [`BinanceAdapter`] | Binance | 24h ticker, OHLC klines |
//! | [`CryptoPanicAdapter`] | CryptoPanic | news posts |

mod binance;
mod coingecko;
mod cryptopanic;

pub use binance::{BinanceAdapter, BINANCE_BASE_URL, MAX_KLINES_PER_CALL, MAX_KLINE_PAGES};
pub use coingecko::{CoinGeckoAdapter, COINGECKO_BASE_URL};
pub use cryptopanic::{CryptoPanicAdapter, CRYPTOPANIC_BASE_URL};

use serde::de::DeserializeOwned;

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::{ProviderId, ValidationError};

/// Execute `request` and return the raw response if it carries a usable body.
///
/// Transport errors, non-2xx statuses and empty bodies all map to
/// `UpstreamUnavailable`.
pub(crate) async fn fetch(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<HttpResponse, SourceError> {
    let url = request.redacted_url();
    let response = send(http_client, provider, request).await?;
    ensure_usable(provider, &url, response)
}

pub(crate) async fn send(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<HttpResponse, SourceError> {
    http_client.execute(request).await.map_err(|error| {
        SourceError::upstream_unavailable(format!(
            "{provider} transport error: {}",
            error.message()
        ))
    })
}

pub(crate) fn ensure_usable(
    provider: ProviderId,
    url: &str,
    response: HttpResponse,
) -> Result<HttpResponse, SourceError> {
    if !response.is_success() {
        tracing::debug!(%provider, %url, status = response.status, "upstream returned error status");
        return Err(SourceError::upstream_unavailable(format!(
            "{provider} returned status {}",
            response.status
        )));
    }

    if response.body.trim().is_empty() {
        return Err(SourceError::upstream_unavailable(format!(
            "{provider} returned an empty body"
        )));
    }

    Ok(response)
}

/// A provider value that fails domain validation makes the payload unusable.
pub(crate) fn invalid_value(provider: ProviderId) -> impl Fn(ValidationError) -> SourceError {
    move |error| SourceError::upstream_unavailable(format!("{provider} sent an invalid value: {error}"))
}

pub(crate) fn parse_json<T: DeserializeOwned>(
    provider: ProviderId,
    body: &str,
) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| {
        SourceError::upstream_unavailable(format!("failed to parse {provider} response: {e}"))
    })
}

pub(crate) async fn fetch_json<T: DeserializeOwned>(
    http_client: &dyn HttpClient,
    provider: ProviderId,
    request: HttpRequest,
) -> Result<T, SourceError> {
    let response = fetch(http_client, provider, request).await?;
    parse_json(provider, &response.body)
}
