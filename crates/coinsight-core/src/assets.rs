//! Static asset table.
//!
//! Every provider names assets differently: CoinGecko uses slugs, Binance uses
//! USDT trading pairs, CryptoPanic uses currency tickers. The table below is
//! the only place these names are declared. Assets missing from it are
//! rejected with [`SourceErrorKind::UnknownSymbol`](crate::SourceErrorKind);
//! there is no fallback asset.

use serde::Serialize;

use crate::AssetId;

/// Provider identifiers for one supported asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetListing {
    pub id: &'static str,
    pub name: &'static str,
    pub coingecko_id: &'static str,
    pub binance_pair: &'static str,
    pub news_ticker: &'static str,
}

pub const ASSETS: &[AssetListing] = &[
    AssetListing {
        id: "bitcoin",
        name: "Bitcoin",
        coingecko_id: "bitcoin",
        binance_pair: "BTCUSDT",
        news_ticker: "BTC",
    },
    AssetListing {
        id: "ethereum",
        name: "Ethereum",
        coingecko_id: "ethereum",
        binance_pair: "ETHUSDT",
        news_ticker: "ETH",
    },
    AssetListing {
        id: "dogecoin",
        name: "Dogecoin",
        coingecko_id: "dogecoin",
        binance_pair: "DOGEUSDT",
        news_ticker: "DOGE",
    },
    AssetListing {
        id: "solana",
        name: "Solana",
        coingecko_id: "solana",
        binance_pair: "SOLUSDT",
        news_ticker: "SOL",
    },
    AssetListing {
        id: "cardano",
        name: "Cardano",
        coingecko_id: "cardano",
        binance_pair: "ADAUSDT",
        news_ticker: "ADA",
    },
    AssetListing {
        id: "ripple",
        name: "XRP",
        coingecko_id: "ripple",
        binance_pair: "XRPUSDT",
        news_ticker: "XRP",
    },
    AssetListing {
        id: "litecoin",
        name: "Litecoin",
        coingecko_id: "litecoin",
        binance_pair: "LTCUSDT",
        news_ticker: "LTC",
    },
];

pub fn lookup(asset: &AssetId) -> Option<&'static AssetListing> {
    ASSETS.iter().find(|listing| listing.id == asset.as_str())
}
