//! Shared context, error types, and argument parsers for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use rebuddy_capture::{CatalogLoader, LabelApi, UploadPipeline};
use rebuddy_models::Catalog;
use url::Url;

use crate::cli::OutputFormat;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) api: Arc<dyn LabelApi>,
    pub(crate) timeout: Duration,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Upload pipeline whose deadline leaves room for the client timeout.
    pub(crate) fn pipeline(&self) -> UploadPipeline {
        UploadPipeline::new(Arc::clone(&self.api)).with_deadline(self.timeout + GRACE)
    }

    /// Catalog loader whose deadline leaves room for the client timeout.
    pub(crate) fn catalog_loader(&self) -> CatalogLoader {
        CatalogLoader::activate_with_deadline(Arc::clone(&self.api), self.timeout + GRACE)
    }

    /// Fetch the catalog once through a loader, failing on a load error.
    pub(crate) async fn load_catalog(&self) -> CliResult<Catalog> {
        let state = self.catalog_loader().settled().await;
        match state.error {
            Some(message) => Err(CliError::failure(anyhow::anyhow!(message))),
            None => Ok(state.catalog),
        }
    }
}

const GRACE: Duration = Duration::from_secs(1);

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    rebuddy_capture::config::parse_base_url(input).map_err(|err| format!("{err}"))
}

/// Parse the request timeout provided to the CLI.
pub(crate) fn parse_timeout(input: &str) -> Result<Duration, String> {
    rebuddy_capture::config::parse_timeout_secs(input).map_err(|err| format!("{err}"))
}
