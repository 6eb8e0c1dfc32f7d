//! The dashboard context.
//!
//! A [`Dashboard`] is built once per process and owns every provider handle,
//! the text generator and the memoization stores. Nothing here is global.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{BinanceAdapter, CoinGeckoAdapter, CryptoPanicAdapter};
use crate::cache::{CacheMode, CacheStore};
use crate::config::{DashboardConfig, DEFAULT_QUOTE_TTL, DEFAULT_SERIES_TTL};
use crate::data_source::{MarketDataSource, NewsSource, SourceError};
use crate::generator::{CompletionClient, TextGenerator, INSIGHT_MAX_TOKENS, SUMMARY_MAX_TOKENS};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::insight::PromptBuilder;
use crate::news::NewsAggregator;
use crate::retry::{RetryConfig, RetryingHttpClient};
use crate::{
    AssetId, HistoricalSeries, Insight, NewsList, ProviderId, Quote, SeriesRange, UtcDateTime,
    ValidationError,
};

#[derive(Clone)]
pub struct Dashboard {
    quote_source: Arc<dyn MarketDataSource>,
    series_source: Arc<dyn MarketDataSource>,
    news: NewsAggregator,
    generator: Arc<dyn TextGenerator>,
    prompts: PromptBuilder,
    quote_cache: CacheStore<Quote>,
    series_cache: CacheStore<HistoricalSeries>,
    quote_ttl: Duration,
    series_ttl: Duration,
    cache_mode: CacheMode,
}

impl Dashboard {
    pub fn new(
        quote_source: Arc<dyn MarketDataSource>,
        series_source: Arc<dyn MarketDataSource>,
        news: NewsAggregator,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            quote_source,
            series_source,
            news,
            generator,
            prompts: PromptBuilder::default(),
            quote_cache: CacheStore::new(),
            series_cache: CacheStore::new(),
            quote_ttl: DEFAULT_QUOTE_TTL,
            series_ttl: DEFAULT_SERIES_TTL,
            cache_mode: CacheMode::Use,
        }
    }

    /// Wire production adapters over a retrying reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSource`] when a configured market
    /// source cannot serve quotes or series.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, ValidationError> {
        let transport: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        Self::from_config_with_transport(config, transport)
    }

    /// [`from_config`](Self::from_config) over a caller-supplied transport.
    pub fn from_config_with_transport(
        config: &DashboardConfig,
        transport: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        let http: Arc<dyn HttpClient> = Arc::new(RetryingHttpClient::new(
            transport,
            RetryConfig::exponential(config.max_retries),
        ));

        let quote_source = market_source(config.quote_source, &http, config.request_timeout_ms)?;
        let series_source = market_source(config.series_source, &http, config.request_timeout_ms)?;

        let news_source: Arc<dyn NewsSource> = Arc::new(
            CryptoPanicAdapter::new(http.clone(), config.cryptopanic_token.clone())
                .with_timeout_ms(config.request_timeout_ms),
        );
        let generator: Arc<dyn TextGenerator> = Arc::new(
            CompletionClient::new(http)
                .with_base_url(config.generator_url.clone())
                .with_api_key(config.generator_api_key.clone()),
        );

        Ok(Self::new(
            quote_source,
            series_source,
            NewsAggregator::new(news_source).with_limit(config.news_limit),
            generator,
        )
        .with_quote_ttl(config.quote_ttl)
        .with_series_ttl(config.series_ttl)
        .with_prompt_builder(PromptBuilder::new(config.prompt_char_budget)))
    }

    pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
        self.quote_ttl = ttl;
        self
    }

    pub fn with_series_ttl(mut self, ttl: Duration) -> Self {
        self.series_ttl = ttl;
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn quote_source(&self) -> ProviderId {
        self.quote_source.id()
    }

    pub fn series_source(&self) -> ProviderId {
        self.series_source.id()
    }

    /// Current quote, memoized per provider and asset for the quote TTL.
    pub async fn get_quote(&self, asset: &AssetId) -> Result<Quote, SourceError> {
        let source = &self.quote_source;
        let key = format!("quote:{}:{asset}", source.id());
        self.quote_cache
            .get_or_compute_with(self.cache_mode, &key, self.quote_ttl, || source.quote(asset))
            .await
    }

    /// Price history, memoized per provider, asset and range.
    pub async fn get_series(
        &self,
        asset: &AssetId,
        range: SeriesRange,
    ) -> Result<HistoricalSeries, SourceError> {
        let source = &self.series_source;
        let key = format!("series:{}:{asset}:{range}", source.id());
        self.series_cache
            .get_or_compute_with(self.cache_mode, &key, self.series_ttl, || {
                source.series(asset, range)
            })
            .await
    }

    /// Latest headlines; never fails.
    pub async fn get_news(&self, asset: &AssetId) -> NewsList {
        self.news.get_news(asset).await
    }

    /// Answer a free-text question using the current quote and headlines as
    /// context.
    ///
    /// A blank question fails before any network call. Quote failures surface;
    /// news failures only degrade the context.
    pub async fn ask(&self, asset: &AssetId, question: &str) -> Result<Insight, SourceError> {
        if question.trim().is_empty() {
            return Err(ValidationError::EmptyQuestion.into());
        }

        let quote = self.get_quote(asset).await?;
        let news = self.get_news(asset).await;
        let prompt = self.prompts.insight(question, &quote, &news)?;
        let text = self.generator.generate(&prompt, INSIGHT_MAX_TOKENS).await?;

        Ok(Insight {
            symbol: asset.clone(),
            question: Some(question.trim().to_owned()),
            text,
            generated_at: UtcDateTime::now(),
        })
    }

    /// Short digest of the latest headlines.
    ///
    /// Degraded news is reported as `UpstreamUnavailable` rather than sent to
    /// the model.
    pub async fn summarize_news(&self, asset: &AssetId) -> Result<Insight, SourceError> {
        let news = self.get_news(asset).await;
        if news.is_degraded() {
            let reason = news
                .headlines()
                .first()
                .map(|sentinel| sentinel.title.clone())
                .unwrap_or_default();
            return Err(SourceError::upstream_unavailable(reason));
        }

        let text = if news.is_empty() {
            format!("No recent news for {asset}.")
        } else {
            let prompt = self.prompts.summary(&news);
            self.generator.generate(&prompt, SUMMARY_MAX_TOKENS).await?
        };

        Ok(Insight {
            symbol: asset.clone(),
            question: None,
            text,
            generated_at: UtcDateTime::now(),
        })
    }

    /// Drop every memoized quote and series.
    pub fn clear_caches(&self) {
        self.quote_cache.clear();
        self.series_cache.clear();
    }
}

fn market_source(
    provider: ProviderId,
    http: &Arc<dyn HttpClient>,
    timeout_ms: u64,
) -> Result<Arc<dyn MarketDataSource>, ValidationError> {
    match provider {
        ProviderId::Coingecko => Ok(Arc::new(
            CoinGeckoAdapter::new(http.clone()).with_timeout_ms(timeout_ms),
        )),
        ProviderId::Binance => Ok(Arc::new(
            BinanceAdapter::new(http.clone()).with_timeout_ms(timeout_ms),
        )),
        other => Err(ValidationError::InvalidSource {
            value: other.to_string(),
        }),
    }
}
