use coinsight_core::{Dashboard, Quote};
use serde::Serialize;

use crate::cli::AssetArgs;
use crate::error::CliError;

use super::{parse_asset, CommandResult};

#[derive(Debug, Serialize)]
struct QuoteResponseData {
    quote: Quote,
}

pub async fn run(args: &AssetArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let asset = parse_asset(&args.asset)?;
    let quote = dashboard.get_quote(&asset).await?;

    let rows = vec![
        vec![String::from("asset"), quote.symbol().to_string()],
        vec![String::from("price_usd"), quote.price().normalize().to_string()],
        vec![
            String::from("change_24h"),
            quote.change_absolute().normalize().to_string(),
        ],
        vec![
            String::from("change_24h_pct"),
            format!("{}%", quote.change_percent().round_dp(2)),
        ],
        vec![String::from("as_of"), quote.as_of().format_rfc3339()],
    ];
    let data = serde_json::to_value(QuoteResponseData { quote })?;

    Ok(CommandResult::ok(data, rows).with_source(dashboard.quote_source().as_str()))
}
