use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// One command's output: the payload plus what produced it.
#[derive(Debug, Serialize)]
pub struct Report {
    pub command: &'static str,
    pub generated_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub data: Value,
    /// Human-readable rows for table output; not serialized.
    #[serde(skip)]
    pub rows: Vec<Vec<String>>,
}

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(report)),
    }

    Ok(())
}

fn render_table(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("command     : {}\n", report.command));
    out.push_str(&format!("generated_at: {}\n", report.generated_at));
    if !report.sources.is_empty() {
        out.push_str(&format!("sources     : {}\n", report.sources.join(",")));
    }

    if !report.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &report.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    out.push('\n');
    out.push_str(&align_rows(&report.rows));
    out
}

/// Left-align every column to its widest cell; the last column is not padded.
fn align_rows(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths = (0..columns)
        .map(|column| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let mut out = String::new();
    for row in rows {
        let mut line = String::new();
        for (column, cell) in row.iter().enumerate() {
            if column + 1 == row.len() {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{cell:<width$}  ", width = widths[column]));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn report() -> Report {
        Report {
            command: "quote",
            generated_at: String::from("2024-01-01T00:00:00Z"),
            sources: vec![String::from("coingecko")],
            warnings: Vec::new(),
            data: json!({"price": "1.5"}),
            rows: vec![
                vec![String::from("asset"), String::from("bitcoin")],
                vec![String::from("price"), String::from("1.5")],
            ],
        }
    }

    #[test]
    fn json_omits_rows_and_empty_warnings() {
        let value = serde_json::to_value(report()).expect("serializes");

        assert_eq!(value["command"], "quote");
        assert_eq!(value["data"]["price"], "1.5");
        assert!(value.get("rows").is_none());
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn table_aligns_columns() {
        let text = render_table(&report());

        assert!(text.contains("sources     : coingecko\n"));
        assert!(text.contains("asset  bitcoin\n"));
        assert!(text.contains("price  1.5\n"));
    }
}
