use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Number;

use crate::adapters::{fetch_json, invalid_value};
use crate::assets;
use crate::data_source::{MarketDataSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::{
    parse_decimal, AssetId, HistoricalSeries, PricePoint, ProviderId, Quote, SeriesRange,
    UtcDateTime,
};

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko adapter: simple-price quotes and `market_chart` pair series.
#[derive(Clone)]
pub struct CoinGeckoAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl CoinGeckoAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(COINGECKO_BASE_URL),
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

    fn coin_id(asset: &AssetId) -> Result<&'static str, SourceError> {
        assets::lookup(asset)
            .map(|listing| listing.coingecko_id)
            .ok_or_else(|| SourceError::unknown_symbol(ProviderId::Coingecko, asset))
    }

    async fn fetch_quote(&self, asset: &AssetId) -> Result<Quote, SourceError> {
        let coin_id = Self::coin_id(asset)?;
        let endpoint = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.base_url,
            urlencoding::encode(coin_id)
        );
        let request = HttpRequest::get(endpoint).with_timeout_ms(self.timeout_ms);

        let mut payload: HashMap<String, SimplePriceEntry> =
            fetch_json(self.http_client.as_ref(), ProviderId::Coingecko, request).await?;

        let entry = payload
            .remove(coin_id)
            .ok_or_else(|| SourceError::unknown_symbol(ProviderId::Coingecko, asset))?;
        let price = entry
            .usd
            .ok_or_else(|| SourceError::unknown_symbol(ProviderId::Coingecko, asset))?;

        normalize_simple_price(asset.clone(), &price, entry.usd_24h_change.as_ref())
    }

    async fn fetch_series(
        &self,
        asset: &AssetId,
        range: SeriesRange,
    ) -> Result<HistoricalSeries, SourceError> {
        let coin_id = Self::coin_id(asset)?;
        let endpoint = format!(
            "{}/coins/{}/market_chart?vs_currency=usd&days={}",
            self.base_url,
            urlencoding::encode(coin_id),
            range.query_value()
        );
        let request = HttpRequest::get(endpoint).with_timeout_ms(self.timeout_ms);

        let payload: MarketChartResponse =
            fetch_json(self.http_client.as_ref(), ProviderId::Coingecko, request).await?;

        let points = payload
            .prices
            .iter()
            .map(|(timestamp, price)| normalize_pair(timestamp, price))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HistoricalSeries::from_unordered(
            asset.clone(),
            ProviderId::Coingecko,
            points,
        ))
    }
}

impl MarketDataSource for CoinGeckoAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Coingecko
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
struct SimplePriceEntry {
    #[serde(default)]
    usd: Option<Number>,
    #[serde(default)]
    usd_24h_change: Option<Number>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    #[serde(default)]
    prices: Vec<(Number, Number)>,
}

fn normalize_simple_price(
    asset: AssetId,
    price: &Number,
    change_percent: Option<&Number>,
) -> Result<Quote, SourceError> {
    let invalid = invalid_value(ProviderId::Coingecko);
    let price = parse_decimal("price", &price.to_string()).map_err(&invalid)?;
    let as_of = UtcDateTime::now();

    let quote = match change_percent {
        Some(percent) => {
            let percent =
                parse_decimal("usd_24h_change", &percent.to_string()).map_err(&invalid)?;
            Quote::from_percent_change(asset, price, percent.round_dp(8), as_of)
        }
        None => Quote::price_only(asset, price, as_of),
    };
    quote.map_err(invalid)
}

fn normalize_pair(timestamp: &Number, price: &Number) -> Result<PricePoint, SourceError> {
    let millis = timestamp
        .as_i64()
        .or_else(|| timestamp.as_f64().map(|value| value as i64))
        .ok_or_else(|| {
            SourceError::upstream_unavailable(format!("invalid coingecko timestamp '{timestamp}'"))
        })?;

    let invalid = invalid_value(ProviderId::Coingecko);
    let ts = UtcDateTime::from_unix_millis(millis).map_err(&invalid)?;
    let price = parse_decimal("price", &price.to_string()).map_err(&invalid)?;
    PricePoint::new(ts, price).map_err(invalid)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpFuture, HttpResponse};

    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn returning(body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(HttpResponse::ok_json(body)),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn bitcoin() -> AssetId {
        AssetId::parse("bitcoin").expect("valid asset")
    }

    #[tokio::test]
    async fn simple_price_without_change_defaults_to_zero() {
        let client = RecordingHttpClient::returning(r#"{"bitcoin": {"usd": 65000.12}}"#);
        let adapter = CoinGeckoAdapter::new(client.clone());

        let quote = adapter.quote(&bitcoin()).await.expect("quote");

        assert_eq!(quote.price(), dec!(65000.12));
        assert_eq!(quote.change_absolute(), Decimal::ZERO);
        assert_eq!(quote.change_percent(), Decimal::ZERO);
        assert_eq!(
            client.urls(),
            vec![String::from(
                "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd&include_24hr_change=true"
            )]
        );
    }

    #[tokio::test]
    async fn simple_price_with_change_populates_both_fields() {
        let client =
            RecordingHttpClient::returning(r#"{"bitcoin": {"usd": 110.0, "usd_24h_change": 10.0}}"#);
        let adapter = CoinGeckoAdapter::new(client);

        let quote = adapter.quote(&bitcoin()).await.expect("quote");

        assert_eq!(quote.change_percent(), dec!(10));
        assert_eq!(quote.change_absolute(), dec!(10));
    }

    #[tokio::test]
    async fn missing_coin_in_response_is_unknown_symbol() {
        let adapter = CoinGeckoAdapter::new(RecordingHttpClient::returning("{}"));

        let error = adapter.quote(&bitcoin()).await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::UnknownSymbol);
    }

    #[tokio::test]
    async fn unmapped_asset_never_reaches_network() {
        let client = RecordingHttpClient::returning("{}");
        let adapter = CoinGeckoAdapter::new(client.clone());
        let asset = AssetId::parse("notacoin").expect("valid");

        let error = adapter.quote(&asset).await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::UnknownSymbol);
        assert!(client.urls().is_empty());
    }

    #[tokio::test]
    async fn market_chart_pairs_become_ordered_points() {
        let client = RecordingHttpClient::returning(
            r#"{"prices": [[3000, 11.0], [1000, 10.0], [2000, 10.5]], "market_caps": []}"#,
        );
        let adapter = CoinGeckoAdapter::new(client.clone()).with_base_url("https://mirror.test/v3/");

        let series = adapter
            .series(&bitcoin(), SeriesRange::Max)
            .await
            .expect("series");

        let millis = series.points().iter().map(|p| p.timestamp.unix_millis()).collect::<Vec<_>>();
        assert_eq!(millis, vec![1000, 2000, 3000]);
        assert_eq!(series.points()[1].price, dec!(10.5));
        assert_eq!(
            client.urls(),
            vec![String::from(
                "https://mirror.test/v3/coins/bitcoin/market_chart?vs_currency=usd&days=max"
            )]
        );
    }

    #[tokio::test]
    async fn malformed_body_is_upstream_unavailable() {
        let adapter = CoinGeckoAdapter::new(RecordingHttpClient::returning("<html>busy</html>"));

        let error = adapter.quote(&bitcoin()).await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::UpstreamUnavailable);
    }
}
