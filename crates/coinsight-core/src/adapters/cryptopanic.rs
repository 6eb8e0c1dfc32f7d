use std::sync::Arc;

use serde::Deserialize;

use crate::adapters::fetch_json;
use crate::assets;
use crate::data_source::{NewsSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::{AssetId, Headline, ProviderId, UtcDateTime};

pub const CRYPTOPANIC_BASE_URL: &str = "https://cryptopanic.com/api/v1";

/// CryptoPanic news adapter.
///
/// Requests are authenticated with a query-string token; without one every
/// call fails with `InvalidInput` so the aggregator can degrade.
#[derive(Clone)]
pub struct CryptoPanicAdapter {
    http_client: Arc<dyn HttpClient>,
    auth_token: Option<String>,
    base_url: String,
    timeout_ms: u64,
}

impl CryptoPanicAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, auth_token: Option<String>) -> Self {
        Self {
            http_client,
            auth_token: auth_token.filter(|token| !token.trim().is_empty()),
            base_url: String::from(CRYPTOPANIC_BASE_URL),
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

    pub fn has_token(&self) -> bool {
        self.auth_token.is_some()
    }

    async fn fetch_headlines(
        &self,
        asset: &AssetId,
        limit: usize,
    ) -> Result<Vec<Headline>, SourceError> {
        let token = self
            .auth_token
            .as_deref()
            .ok_or_else(|| SourceError::invalid_input("CryptoPanic API token is not configured"))?;
        let ticker = assets::lookup(asset)
            .map(|listing| listing.news_ticker)
            .ok_or_else(|| SourceError::unknown_symbol(ProviderId::Cryptopanic, asset))?;

        let endpoint = format!(
            "{}/posts/?auth_token={}&currencies={ticker}&kind=news",
            self.base_url,
            urlencoding::encode(token)
        );
        let request = HttpRequest::get(endpoint).with_timeout_ms(self.timeout_ms);

        let payload: PostsResponse =
            fetch_json(self.http_client.as_ref(), ProviderId::Cryptopanic, request).await?;

        Ok(payload
            .results
            .into_iter()
            .filter_map(normalize_post)
            .take(limit)
            .collect())
    }
}

impl NewsSource for CryptoPanicAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Cryptopanic
    }

    fn headlines<'a>(&'a self, asset: &'a AssetId, limit: usize) -> SourceFuture<'a, Vec<Headline>> {
        Box::pin(self.fetch_headlines(asset, limit))
    }
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: Option<PostSource>,
}

#[derive(Debug, Deserialize)]
struct PostSource {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

/// Posts without a title carry nothing renderable and are skipped.
fn normalize_post(post: Post) -> Option<Headline> {
    let title = post.title?.trim().to_owned();
    if title.is_empty() {
        return None;
    }

    let source = post
        .source
        .and_then(|source| source.title.or(source.domain))
        .or(post.domain)
        .unwrap_or_default();
    let published_at = post
        .published_at
        .as_deref()
        .and_then(UtcDateTime::parse_normalized);

    Some(
        Headline::new(title, post.url.unwrap_or_default(), source)
            .with_published_at(published_at)
            .with_summary(post.summary.or(post.description)),
    )
}
