use coinsight_core::{Dashboard, HistoricalSeries, SeriesRange};
use serde::Serialize;

use crate::cli::SeriesArgs;
use crate::error::CliError;

use super::{parse_asset, CommandResult};

#[derive(Debug, Serialize)]
struct SeriesResponseData {
    range: String,
    series: HistoricalSeries,
}

pub async fn run(args: &SeriesArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let asset = parse_asset(&args.asset)?;
    let range = if args.max {
        SeriesRange::Max
    } else {
        SeriesRange::days(args.days)?
    };

    let series = dashboard.get_series(&asset, range).await?;

    let mut rows = vec![vec![String::from("timestamp"), String::from("price_usd")]];
    rows.extend(series.points().iter().map(|point| {
        vec![
            point.timestamp.format_rfc3339(),
            point.price.normalize().to_string(),
        ]
    }));

    let mut result = CommandResult::ok(
        serde_json::to_value(SeriesResponseData {
            range: range.to_string(),
            series: series.clone(),
        })?,
        rows,
    )
    .with_source(series.provider().as_str());
    if series.is_empty() {
        result = result.with_warning(format!("no price history returned for {asset}"));
    }
    Ok(result)
}
