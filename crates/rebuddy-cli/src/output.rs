//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use rebuddy_capture::UploadOutcome;
use rebuddy_capture::picker::empty_message;
use rebuddy_models::{Catalog, HealthResponse, LabelItem};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn to_json(value: &impl serde::Serialize) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

/// Render a (possibly filtered) catalog. `query` names the filter for the empty state.
pub(crate) fn render_catalog(
    catalog: &Catalog,
    query: Option<&str>,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(catalog),
        OutputFormat::Table => {
            if catalog.is_empty() {
                return Ok(query.map_or_else(|| "No labels available.".to_string(), empty_message));
            }
            let mut lines = vec![format!("{:<28} NAME", "VALUE")];
            match catalog {
                Catalog::Flat(items) => lines.extend(items.iter().map(item_row)),
                Catalog::Grouped(categories) => {
                    for category in categories {
                        lines.push(format!("[{}]", category.category));
                        lines.extend(category.items.iter().map(item_row));
                    }
                }
            }
            Ok(lines.join("\n"))
        }
    }
}

fn item_row(item: &LabelItem) -> String {
    format!("{:<28} {}", item.value, item.display_name)
}

pub(crate) fn render_outcome(outcome: &UploadOutcome, format: OutputFormat) -> CliResult<String> {
    match (format, outcome) {
        (OutputFormat::Json, UploadOutcome::Uploaded { s3_key, label }) => {
            to_json(&json!({"success": true, "s3_key": s3_key, "label": label}))
        }
        (OutputFormat::Json, UploadOutcome::Failed { message }) => {
            to_json(&json!({"success": false, "error": message}))
        }
        (OutputFormat::Table, UploadOutcome::Uploaded { s3_key, label }) => {
            Ok(format!("Saved as '{label}'.\nkey: {s3_key}"))
        }
        (OutputFormat::Table, UploadOutcome::Failed { message }) => {
            Ok(format!("Not saved. {message}"))
        }
    }
}

pub(crate) fn render_health(health: &HealthResponse, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(health),
        OutputFormat::Table => Ok(format!(
            "status: {}\nversion: {}",
            health.status, health.version
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebuddy_test_support::{grouped_catalog, single_item_catalog};

    #[test]
    fn flat_catalog_renders_one_row_per_item() -> CliResult<()> {
        let text = render_catalog(&single_item_catalog(), None, OutputFormat::Table)?;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("bottle"));
        assert!(lines[1].ends_with("Plastic Bottle"));
        Ok(())
    }

    #[test]
    fn grouped_catalog_renders_category_headings() -> CliResult<()> {
        let text = render_catalog(&grouped_catalog(), None, OutputFormat::Table)?;
        assert!(text.contains("[Glass]"));
        assert!(text.contains("Aluminum Can"));
        Ok(())
    }

    #[test]
    fn empty_catalog_names_the_query() -> CliResult<()> {
        let text = render_catalog(&Catalog::default(), Some("xyz"), OutputFormat::Table)?;
        assert_eq!(text, "No items match \"xyz\"");
        Ok(())
    }

    #[test]
    fn json_catalog_keeps_the_wire_shape() -> CliResult<()> {
        let text = render_catalog(&single_item_catalog(), None, OutputFormat::Json)?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(CliError::failure)?;
        assert_eq!(value["items"][0]["value"], "bottle");
        assert_eq!(value["total_count"], 1);
        Ok(())
    }

    #[test]
    fn outcomes_render_in_both_formats() -> CliResult<()> {
        let uploaded = UploadOutcome::Uploaded {
            s3_key: "k1".into(),
            label: "recyclable".into(),
        };
        assert_eq!(
            render_outcome(&uploaded, OutputFormat::Table)?,
            "Saved as 'recyclable'.\nkey: k1"
        );
        let failed = UploadOutcome::Failed {
            message: "Upload failed (500): boom".into(),
        };
        assert!(render_outcome(&failed, OutputFormat::Json)?.contains("\"success\": false"));
        Ok(())
    }
}
