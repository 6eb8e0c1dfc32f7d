use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use coinsight_core::{
    AssetId, BinanceAdapter, CoinGeckoAdapter, HttpClient, MarketDataSource, ProviderId,
    SeriesRange, SourceErrorKind, UtcDateTime,
};
use rust_decimal::Decimal;

#[path = "../support/mod.rs"]
mod support;

use support::{kline, ScriptedHttpClient, BITCOIN_CHART, BITCOIN_PRICE};

struct ProviderCase {
    id: ProviderId,
    build: fn(Arc<dyn HttpClient>) -> Arc<dyn MarketDataSource>,
    healthy: fn() -> Arc<ScriptedHttpClient>,
}

fn coingecko(http: Arc<dyn HttpClient>) -> Arc<dyn MarketDataSource> {
    Arc::new(CoinGeckoAdapter::new(http))
}

fn binance(http: Arc<dyn HttpClient>) -> Arc<dyn MarketDataSource> {
    Arc::new(BinanceAdapter::new(http))
}

fn coingecko_routes() -> Arc<ScriptedHttpClient> {
    ScriptedHttpClient::new()
        .route("/simple/price", BITCOIN_PRICE)
        .route("/market_chart", BITCOIN_CHART)
}

fn binance_routes() -> Arc<ScriptedHttpClient> {
    let klines = format!(
        "[{},{},{}]",
        kline(3000, "11.0"),
        kline(1000, "10.0"),
        kline(2000, "10.5")
    );
    ScriptedHttpClient::new()
        .route(
            "/ticker/24hr",
            r#"{"symbol":"BTCUSDT","lastPrice":"65000.12","priceChange":"120.5","priceChangePercent":"0.19","closeTime":1700000000000}"#,
        )
        .route("/klines", &klines)
}

fn provider_cases() -> Vec<ProviderCase> {
    vec![
        ProviderCase {
            id: ProviderId::Coingecko,
            build: coingecko,
            healthy: coingecko_routes,
        },
        ProviderCase {
            id: ProviderId::Binance,
            build: binance,
            healthy: binance_routes,
        },
    ]
}

fn bitcoin() -> AssetId {
    AssetId::parse("bitcoin").expect("valid asset")
}

#[test]
fn quote_is_non_negative_and_fresh_for_all_providers() {
    for case in provider_cases() {
        let source = (case.build)((case.healthy)());
        let before = UtcDateTime::now();

        let quote = block_on(source.quote(&bitcoin())).unwrap_or_else(|error| {
            panic!("provider '{}' quote failed: {error}", case.id)
        });

        assert_eq!(source.id(), case.id);
        assert_eq!(quote.symbol(), &bitcoin(), "provider '{}': symbol", case.id);
        assert!(
            quote.price() >= Decimal::ZERO,
            "provider '{}': price must be non-negative",
            case.id
        );
        assert!(
            quote.as_of() >= before,
            "provider '{}': as_of must not predate the request",
            case.id
        );
    }
}

#[test]
fn series_is_strictly_increasing_for_all_providers() {
    for case in provider_cases() {
        let source = (case.build)((case.healthy)());

        let series = block_on(source.series(&bitcoin(), SeriesRange::Max)).unwrap_or_else(
            |error| panic!("provider '{}' series failed: {error}", case.id),
        );

        assert_eq!(series.len(), 3, "provider '{}': point count", case.id);
        assert_eq!(series.provider(), case.id);
        assert!(
            series
                .points()
                .windows(2)
                .all(|pair| pair[0].timestamp < pair[1].timestamp),
            "provider '{}': timestamps must strictly increase",
            case.id
        );
    }
}

#[test]
fn unmapped_asset_is_unknown_symbol_for_all_providers() {
    let asset = AssetId::parse("not-a-coin").expect("valid asset");

    for case in provider_cases() {
        let http = (case.healthy)();
        let source = (case.build)(http.clone());

        let quote_error = block_on(source.quote(&asset)).expect_err("quote must fail");
        let series_error =
            block_on(source.series(&asset, SeriesRange::Days(7))).expect_err("series must fail");

        assert_eq!(quote_error.kind(), SourceErrorKind::UnknownSymbol, "provider '{}'", case.id);
        assert_eq!(series_error.kind(), SourceErrorKind::UnknownSymbol, "provider '{}'", case.id);
        assert_eq!(http.calls(), 0, "provider '{}': no request expected", case.id);
    }
}

#[test]
fn error_status_is_upstream_unavailable_for_all_providers() {
    for case in provider_cases() {
        let http = ScriptedHttpClient::new().route_status("/", 503, "Service Unavailable");
        let source = (case.build)(http);

        let quote_error = block_on(source.quote(&bitcoin())).expect_err("quote must fail");
        let series_error =
            block_on(source.series(&bitcoin(), SeriesRange::Days(7))).expect_err("series must fail");

        assert_eq!(
            quote_error.kind(),
            SourceErrorKind::UpstreamUnavailable,
            "provider '{}'",
            case.id
        );
        assert!(quote_error.retryable());
        assert_eq!(
            series_error.kind(),
            SourceErrorKind::UpstreamUnavailable,
            "provider '{}'",
            case.id
        );
    }
}

#[test]
fn empty_body_is_upstream_unavailable_for_all_providers() {
    for case in provider_cases() {
        let source = (case.build)(ScriptedHttpClient::new().route("/", "  "));

        let error = block_on(source.quote(&bitcoin())).expect_err("quote must fail");

        assert_eq!(error.kind(), SourceErrorKind::UpstreamUnavailable, "provider '{}'", case.id);
    }
}

fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
    unsafe { Waker::from_raw(noop_raw_waker()) }
}

fn noop_raw_waker() -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
}

unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
    noop_raw_waker()
}

unsafe fn noop_raw_waker_wake(_: *const ()) {}

unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

unsafe fn noop_raw_waker_drop(_: *const ()) {}

static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
    noop_raw_waker_clone,
    noop_raw_waker_wake,
    noop_raw_waker_wake_by_ref,
    noop_raw_waker_drop,
);
