//! # Domain Models
//!
//! Canonical domain types shared by every provider adapter.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AssetId`] | Human-readable asset name (`bitcoin`) |
//! | [`Quote`] | Price with 24h absolute and percent change |
//! | [`PricePoint`] | One timestamped price sample |
//! | [`HistoricalSeries`] | Strictly time-ordered price samples |
//! | [`Headline`] | One news item |
//! | [`NewsList`] | Bounded, provider-ordered headlines |
//! | [`Insight`] | Generated commentary |
//! | [`SeriesRange`] | Day count or provider maximum |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Constructors validate their invariants: prices are never negative and a
//! [`HistoricalSeries`] never holds duplicate or out-of-order timestamps.

mod asset;
mod models;
mod range;
mod timestamp;

pub use asset::AssetId;
pub use models::{
    parse_decimal, Headline, HistoricalSeries, Insight, NewsList, PricePoint, Quote,
};
pub use range::SeriesRange;
pub use timestamp::UtcDateTime;
