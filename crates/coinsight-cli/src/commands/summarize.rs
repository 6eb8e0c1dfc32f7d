use coinsight_core::{Dashboard, Insight};
use serde::Serialize;

use crate::cli::AssetArgs;
use crate::error::CliError;

use super::{parse_asset, CommandResult};

#[derive(Debug, Serialize)]
struct SummaryResponseData {
    summary: Insight,
}

pub async fn run(args: &AssetArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let asset = parse_asset(&args.asset)?;
    let summary = dashboard.summarize_news(&asset).await?;

    let rows = vec![vec![String::from("summary"), summary.text.clone()]];
    let data = serde_json::to_value(SummaryResponseData { summary })?;

    Ok(CommandResult::ok(data, rows)
        .with_source("cryptopanic")
        .with_source("generator"))
}
