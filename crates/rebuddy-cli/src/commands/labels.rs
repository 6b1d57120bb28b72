use rebuddy_capture::filter_catalog;
use rebuddy_models::Catalog;

use crate::cli::LabelsArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_catalog;

pub(crate) async fn handle_labels(ctx: &AppContext, args: LabelsArgs) -> CliResult<()> {
    let catalog = ctx.load_catalog().await?;
    let selected = select_labels(&catalog, &args)?;
    println!(
        "{}",
        render_catalog(&selected, args.query.as_deref(), ctx.output)?
    );
    Ok(())
}

/// Apply the category and query filters from `args`.
fn select_labels(catalog: &Catalog, args: &LabelsArgs) -> CliResult<Catalog> {
    let scoped = match (&args.category, catalog) {
        (None, _) => catalog.clone(),
        (Some(name), Catalog::Grouped(categories)) => {
            let category = categories
                .iter()
                .find(|category| category.category.eq_ignore_ascii_case(name))
                .ok_or_else(|| CliError::validation(format!("unknown category '{name}'")))?;
            Catalog::Grouped(vec![category.clone()])
        }
        (Some(_), Catalog::Flat(_)) => {
            return Err(CliError::validation(
                "--category requires a grouped catalog; this server returns a flat list",
            ));
        }
    };
    Ok(match args.query.as_deref() {
        Some(query) => filter_catalog(&scoped, query),
        None => scoped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use rebuddy_test_support::{grouped_catalog, single_item_catalog};
    use serde_json::json;

    use crate::cli::OutputFormat;
    use crate::client::test_support::context_for;

    fn args(query: Option<&str>, category: Option<&str>) -> LabelsArgs {
        LabelsArgs {
            query: query.map(str::to_string),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn category_and_query_combine() -> CliResult<()> {
        let selected = select_labels(&grouped_catalog(), &args(Some("bottle"), Some("glass")))?;
        let values: Vec<_> = selected.items().map(|item| item.value.as_str()).collect();
        assert_eq!(values, vec!["glass-bottle", "wine-bottle"]);
        Ok(())
    }

    #[test]
    fn unknown_category_is_a_validation_error() {
        let err = select_labels(&grouped_catalog(), &args(None, Some("Textiles")))
            .expect_err("unknown category");
        assert_eq!(err.exit_code(), 2);

        let err = select_labels(&single_item_catalog(), &args(None, Some("Glass")))
            .expect_err("flat catalogs have no categories");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn labels_fetches_the_catalog_once() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/labels");
            then.status(200).json_body(json!({
                "items": [{"value": "bottle", "display_name": "Plastic Bottle"}],
                "total_count": 1
            }));
        });

        let ctx = context_for(&server, OutputFormat::Table)?;
        handle_labels(&ctx, args(Some("bot"), None))
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        mock.assert_hits(1);
        Ok(())
    }
}
