use coinsight_core::{Dashboard, Insight};
use serde::Serialize;

use crate::cli::AskArgs;
use crate::error::CliError;

use super::{parse_asset, CommandResult};

#[derive(Debug, Serialize)]
struct AskResponseData {
    insight: Insight,
}

pub async fn run(args: &AskArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let asset = parse_asset(&args.asset)?;
    let question = args.question.join(" ");

    let insight = dashboard.ask(&asset, &question).await?;

    let rows = vec![
        vec![String::from("question"), question],
        vec![String::from("insight"), insight.text.clone()],
    ];
    let data = serde_json::to_value(AskResponseData { insight })?;

    Ok(CommandResult::ok(data, rows)
        .with_source(dashboard.quote_source().as_str())
        .with_source("cryptopanic")
        .with_source("generator"))
}
