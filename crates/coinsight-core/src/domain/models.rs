use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AssetId, ProviderId, UtcDateTime, ValidationError};

/// Canonical point-in-time price snapshot for one asset.
///
/// Change fields are always populated; providers that only report a price
/// produce zero changes. Built only through the validating constructors, so
/// the price is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    symbol: AssetId,
    price: Decimal,
    change_absolute: Decimal,
    change_percent: Decimal,
    as_of: UtcDateTime,
}

impl Quote {
    pub fn new(
        symbol: AssetId,
        price: Decimal,
        change_absolute: Decimal,
        change_percent: Decimal,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;

        Ok(Self {
            symbol,
            price,
            change_absolute,
            change_percent,
            as_of,
        })
    }

    /// Quote from a price-only payload.
    pub fn price_only(
        symbol: AssetId,
        price: Decimal,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        Self::new(symbol, price, Decimal::ZERO, Decimal::ZERO, as_of)
    }

    /// Quote from a price plus a 24h percentage; the absolute change is derived
    /// from the implied reference price `price / (1 + pct/100)`.
    pub fn from_percent_change(
        symbol: AssetId,
        price: Decimal,
        change_percent: Decimal,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        let factor = Decimal::ONE + change_percent / Decimal::ONE_HUNDRED;
        let change_absolute = if factor.is_zero() {
            Decimal::ZERO
        } else {
            (price - price / factor).round_dp(8)
        };
        Self::new(symbol, price, change_absolute, change_percent, as_of)
    }

    pub fn symbol(&self) -> &AssetId {
        &self.symbol
    }

    pub const fn price(&self) -> Decimal {
        self.price
    }

    pub const fn change_absolute(&self) -> Decimal {
        self.change_absolute
    }

    pub const fn change_percent(&self) -> Decimal {
        self.change_percent
    }

    pub const fn as_of(&self) -> UtcDateTime {
        self.as_of
    }
}

/// One timestamped sample of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: UtcDateTime,
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(timestamp: UtcDateTime, price: Decimal) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        Ok(Self { timestamp, price })
    }
}

/// Ordered price history: timestamps are strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoricalSeries {
    symbol: AssetId,
    provider: ProviderId,
    points: Vec<PricePoint>,
}

impl HistoricalSeries {
    /// Sorts by timestamp and drops duplicates. When two samples share a
    /// timestamp the one received last is kept.
    pub fn from_unordered(symbol: AssetId, provider: ProviderId, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|point| point.timestamp);

        let mut normalized: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match normalized.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => normalized.push(point),
            }
        }

        Self {
            symbol,
            provider,
            points: normalized,
        }
    }

    pub fn symbol(&self) -> &AssetId {
        &self.symbol
    }

    pub const fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// One news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: Option<UtcDateTime>,
    pub summary: Option<String>,
}

impl Headline {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            published_at: None,
            summary: None,
        }
    }

    pub fn with_published_at(mut self, published_at: Option<UtcDateTime>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary.filter(|text| !text.trim().is_empty());
        self
    }
}

/// Provider-ordered, bounded list of headlines.
///
/// A degraded list holds exactly one sentinel headline describing why news
/// could not be loaded, so callers always render the same type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsList {
    headlines: Vec<Headline>,
    degraded: bool,
}

impl NewsList {
    pub fn new(mut headlines: Vec<Headline>, limit: usize) -> Self {
        headlines.truncate(limit);
        Self {
            headlines,
            degraded: false,
        }
    }

    pub fn unavailable(reason: impl AsRef<str>) -> Self {
        Self {
            headlines: vec![Headline::new(
                format!("News unavailable: {}", reason.as_ref()),
                "",
                "",
            )],
            degraded: true,
        }
    }

    pub fn headlines(&self) -> &[Headline] {
        &self.headlines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Headline> {
        self.headlines.iter()
    }

    pub fn len(&self) -> usize {
        self.headlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headlines.is_empty()
    }

    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }
}

impl<'a> IntoIterator for &'a NewsList {
    type Item = &'a Headline;
    type IntoIter = std::slice::Iter<'a, Headline>;

    fn into_iter(self) -> Self::IntoIter {
        self.headlines.iter()
    }
}

/// Generated commentary for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub symbol: AssetId,
    pub question: Option<String>,
    pub text: String,
    pub generated_at: UtcDateTime,
}

/// Parse a decimal from its textual form, accepting scientific notation.
pub fn parse_decimal(field: &'static str, input: &str) -> Result<Decimal, ValidationError> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::InvalidDecimal {
            field,
            value: input.to_owned(),
        })
}

fn validate_non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn asset() -> AssetId {
        AssetId::parse("bitcoin").expect("valid asset")
    }

    fn ts(millis: i64) -> UtcDateTime {
        UtcDateTime::from_unix_millis(millis).expect("in range")
    }

    #[test]
    fn rejects_negative_price() {
        let err = Quote::price_only(asset(), dec!(-1), UtcDateTime::now()).expect_err("must fail");
        assert_eq!(err, ValidationError::NegativeValue { field: "price" });
    }

    #[test]
    fn quote_serializes_through_accessor_fields() {
        let quote = Quote::new(asset(), dec!(65000.12), dec!(-1.5), dec!(-0.01), ts(1_000))
            .expect("valid");

        let value = serde_json::to_value(&quote).expect("serializable");

        assert_eq!(value["symbol"], "bitcoin");
        assert_eq!(value["price"], "65000.12");
        assert_eq!(value["change_absolute"], "-1.5");
        assert_eq!(value["as_of"], "1970-01-01T00:00:01Z");
        assert_eq!(quote.as_of(), ts(1_000));
    }

    #[test]
    fn price_only_quote_has_zero_changes() {
        let quote = Quote::price_only(asset(), dec!(65000.12), UtcDateTime::now()).expect("valid");
        assert_eq!(quote.change_absolute(), Decimal::ZERO);
        assert_eq!(quote.change_percent(), Decimal::ZERO);
    }

    #[test]
    fn derives_absolute_change_from_percent() {
        let quote =
            Quote::from_percent_change(asset(), dec!(110), dec!(10), UtcDateTime::now()).expect("valid");
        assert_eq!(quote.change_absolute(), dec!(10));
        assert_eq!(quote.change_percent(), dec!(10));
    }

    #[test]
    fn series_is_sorted_and_deduplicated() {
        let points = vec![
            PricePoint::new(ts(3_000), dec!(3)).expect("valid"),
            PricePoint::new(ts(1_000), dec!(1)).expect("valid"),
            PricePoint::new(ts(2_000), dec!(2)).expect("valid"),
            PricePoint::new(ts(2_000), dec!(2.5)).expect("valid"),
        ];

        let series = HistoricalSeries::from_unordered(asset(), ProviderId::Coingecko, points);

        let prices = series.points().iter().map(|p| p.price).collect::<Vec<_>>();
        assert_eq!(prices, vec![dec!(1), dec!(2.5), dec!(3)]);
        assert!(series
            .points()
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp));
    }

    #[test]
    fn news_list_is_bounded_and_keeps_order() {
        let headlines = (0..8)
            .map(|index| Headline::new(format!("h{index}"), "https://x.test", "x"))
            .collect::<Vec<_>>();

        let list = NewsList::new(headlines, 5);

        assert_eq!(list.len(), 5);
        assert_eq!(list.headlines()[0].title, "h0");
        assert_eq!(list.headlines()[4].title, "h4");
        assert!(!list.is_degraded());
    }

    #[test]
    fn unavailable_news_is_single_sentinel() {
        let list = NewsList::unavailable("timeout");
        assert!(list.is_degraded());
        assert_eq!(list.len(), 1);
        let sentinel = &list.headlines()[0];
        assert_eq!(sentinel.title, "News unavailable: timeout");
        assert!(sentinel.url.is_empty());
        assert!(sentinel.source.is_empty());
    }

    #[test]
    fn blank_summaries_are_dropped() {
        let headline = Headline::new("t", "u", "s").with_summary(Some(String::from("  ")));
        assert!(headline.summary.is_none());
    }

    #[test]
    fn parses_plain_and_scientific_decimals() {
        assert_eq!(parse_decimal("price", "10.50").expect("plain"), dec!(10.50));
        assert_eq!(parse_decimal("price", "1e-5").expect("sci"), dec!(0.00001));
        assert!(matches!(
            parse_decimal("price", "n/a"),
            Err(ValidationError::InvalidDecimal { .. })
        ));
    }
}
