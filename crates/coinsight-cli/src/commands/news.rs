use coinsight_core::{Dashboard, NewsList};
use serde::Serialize;

use crate::cli::AssetArgs;
use crate::error::CliError;

use super::{parse_asset, CommandResult};

#[derive(Debug, Serialize)]
struct NewsResponseData {
    news: NewsList,
}

pub async fn run(args: &AssetArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let asset = parse_asset(&args.asset)?;
    let news = dashboard.get_news(&asset).await;

    let mut rows = vec![vec![
        String::from("published"),
        String::from("source"),
        String::from("title"),
    ]];
    rows.extend(news.iter().map(|headline| {
        vec![
            headline
                .published_at
                .map(|at| at.format_rfc3339())
                .unwrap_or_else(|| String::from("-")),
            if headline.source.is_empty() {
                String::from("-")
            } else {
                headline.source.clone()
            },
            headline.title.clone(),
        ]
    }));

    let degraded = news.is_degraded();
    let mut result = CommandResult::ok(serde_json::to_value(NewsResponseData { news })?, rows)
        .with_source("cryptopanic");
    if degraded {
        result = result.with_warning("news could not be loaded");
    }
    Ok(result)
}
