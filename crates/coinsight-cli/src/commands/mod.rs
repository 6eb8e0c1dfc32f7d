mod ask;
mod assets;
mod news;
mod quote;
mod series;
mod summarize;

use coinsight_core::{AssetId, Dashboard, DashboardConfig, UtcDateTime};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Report;

/// Payload and table rows produced by one command.
pub struct CommandResult {
    pub data: Value,
    pub rows: Vec<Vec<String>>,
    pub sources: Vec<String>,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value, rows: Vec<Vec<String>>) -> Self {
        Self {
            data,
            rows,
            sources: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let (name, result) = match &cli.command {
        Command::Assets => ("assets", assets::run()?),
        Command::Quote(args) => ("quote", quote::run(args, &dashboard(cli)?).await?),
        Command::Series(args) => ("series", series::run(args, &dashboard(cli)?).await?),
        Command::News(args) => ("news", news::run(args, &dashboard(cli)?).await?),
        Command::Ask(args) => ("ask", ask::run(args, &dashboard(cli)?).await?),
        Command::Summarize(args) => ("summarize", summarize::run(args, &dashboard(cli)?).await?),
    };

    let CommandResult {
        data,
        rows,
        sources,
        warnings,
    } = result;

    Ok(Report {
        command: name,
        generated_at: UtcDateTime::now().format_rfc3339(),
        sources,
        warnings,
        data,
        rows,
    })
}

/// Environment configuration with CLI flags applied on top.
fn config(cli: &Cli) -> Result<DashboardConfig, CliError> {
    let mut config = DashboardConfig::from_env()?;
    if let Some(source) = cli.quote_source {
        config.quote_source = source.into();
    }
    if let Some(source) = cli.series_source {
        config.series_source = source.into();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

/// Each invocation builds a fresh dashboard, so its caches start empty.
fn dashboard(cli: &Cli) -> Result<Dashboard, CliError> {
    Ok(Dashboard::from_config(&config(cli)?)?)
}

fn parse_asset(raw: &str) -> Result<AssetId, CliError> {
    Ok(AssetId::parse(raw)?)
}
