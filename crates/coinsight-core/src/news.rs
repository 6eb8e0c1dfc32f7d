use std::sync::Arc;

use crate::data_source::NewsSource;
use crate::{AssetId, NewsList};

/// Headlines shown per asset when no limit is configured.
pub const DEFAULT_NEWS_LIMIT: usize = 5;

/// Wraps a [`NewsSource`] so that news retrieval never fails outward.
///
/// Any source error becomes a one-element [`NewsList::unavailable`] sentinel;
/// a missing news panel must not stop the rest of the dashboard rendering.
#[derive(Clone)]
pub struct NewsAggregator {
    source: Arc<dyn NewsSource>,
    limit: usize,
}

impl NewsAggregator {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self {
            source,
            limit: DEFAULT_NEWS_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }

    pub async fn get_news(&self, asset: &AssetId) -> NewsList {
        match self.source.headlines(asset, self.limit).await {
            Ok(headlines) => NewsList::new(headlines, self.limit),
            Err(error) => {
                tracing::warn!(
                    %asset,
                    provider = %self.source.id(),
                    code = error.code(),
                    "news unavailable: {}",
                    error.message()
                );
                NewsList::unavailable(error.message())
            }
        }
    }
}
