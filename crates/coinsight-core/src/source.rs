use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Upstream services the core talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Coingecko,
    Binance,
    Cryptopanic,
    /// Completion server backing insights and summaries.
    Generator,
}

impl ProviderId {
    /// Providers that can serve quotes and historical series.
    pub const MARKET: [Self; 2] = [Self::Coingecko, Self::Binance];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coingecko => "coingecko",
            Self::Binance => "binance",
            Self::Cryptopanic => "cryptopanic",
            Self::Generator => "generator",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses market providers only; news and generator services are not selectable.
impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "coingecko" => Ok(Self::Coingecko),
            "binance" => Ok(Self::Binance),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_market_providers_case_insensitively() {
        assert_eq!(
            ProviderId::from_str(" Binance ").expect("must parse"),
            ProviderId::Binance
        );
        assert_eq!(
            ProviderId::from_str("coingecko").expect("must parse"),
            ProviderId::Coingecko
        );
    }

    #[test]
    fn news_provider_is_not_selectable() {
        let err = ProviderId::from_str("cryptopanic").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }
}
