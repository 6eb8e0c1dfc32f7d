use coinsight_core::assets::ASSETS;
use serde::Serialize;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct AssetsResponseData {
    assets: &'static [coinsight_core::AssetListing],
}

pub fn run() -> Result<CommandResult, CliError> {
    let data = serde_json::to_value(AssetsResponseData { assets: ASSETS })?;

    let mut rows = vec![["id", "name", "coingecko", "binance", "news"]
        .map(String::from)
        .to_vec()];
    rows.extend(ASSETS.iter().map(|listing| {
        vec![
            listing.id.to_owned(),
            listing.name.to_owned(),
            listing.coingecko_id.to_owned(),
            listing.binance_pair.to_owned(),
            listing.news_ticker.to_owned(),
        ]
    }));

    Ok(CommandResult::ok(data, rows))
}
