//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rebuddy_capture::HttpTransport;
use rebuddy_capture::TransportConfig;
use rebuddy_capture::config::{DEFAULT_API_URL, ENV_API_URL, ENV_TIMEOUT_SECS};
use rebuddy_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, TelemetryError};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, parse_timeout, parse_url};
use crate::commands::capture::handle_capture;
use crate::commands::health::handle_health;
use crate::commands::labels::handle_labels;
use crate::commands::upload::handle_upload;

const ENV_LOG_LEVEL: &str = "REBUDDY_LOG_LEVEL";

/// Parses CLI arguments, executes the requested command, and reports
/// failures on stderr. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli) {
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    let command_name = command_label(&cli.command);
    debug!(command = command_name, "dispatching");
    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn init_logging(cli: &Cli) -> CliResult<()> {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.into(),
        build_sha: env!("CARGO_PKG_VERSION"),
    };
    rebuddy_telemetry::init_logging(&config).map_err(|err| match err {
        TelemetryError::InvalidLevel { .. } => CliError::validation(err.to_string()),
        TelemetryError::SubscriberInstall { .. } => CliError::failure(err),
    })
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let ctx = build_context(&cli)?;
    match cli.command {
        Command::Labels(args) => handle_labels(&ctx, args).await,
        Command::Upload(args) => handle_upload(&ctx, args).await,
        Command::Capture(args) => handle_capture(&ctx, args).await,
        Command::Health => handle_health(&ctx).await,
    }
}

fn build_context(cli: &Cli) -> CliResult<AppContext> {
    let config = TransportConfig::new(cli.api_url.clone(), cli.timeout);
    let trace_id = Uuid::new_v4().to_string();
    let transport = HttpTransport::with_request_id(&config, &trace_id).map_err(CliError::failure)?;
    Ok(AppContext {
        api: Arc::new(transport),
        timeout: cli.timeout,
        output: cli.output,
    })
}

#[derive(Parser)]
#[command(
    name = "rebuddy",
    version,
    about = "Capture, label, and upload photos of recyclable items"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = ENV_API_URL,
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = ENV_TIMEOUT_SECS,
        value_parser = parse_timeout,
        default_value = "10",
        help = "Per-request timeout in seconds"
    )]
    pub(crate) timeout: Duration,
    #[arg(long, global = true, env = ENV_LOG_LEVEL, default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub(crate) log_format: LogFormatArg,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the label catalog, optionally filtered.
    Labels(LabelsArgs),
    /// Upload one photo with a label.
    Upload(UploadArgs),
    /// Interactive capture, label, and upload loop.
    Capture(CaptureArgs),
    /// Check API health.
    Health,
}

#[derive(Args, Default)]
pub(crate) struct LabelsArgs {
    #[arg(long, short, help = "Only show items whose name contains this text")]
    pub(crate) query: Option<String>,
    #[arg(long, help = "Only show this category of a grouped catalog")]
    pub(crate) category: Option<String>,
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    #[arg(help = "Path to the photo")]
    pub(crate) file: PathBuf,
    #[arg(long, short, help = "Label value, e.g. aluminum-can")]
    pub(crate) label: String,
    #[arg(long, help = "Reject labels missing from the server catalog")]
    pub(crate) check: bool,
}

#[derive(Args, Default)]
pub(crate) struct CaptureArgs {
    #[arg(long, help = "Use the two-button recyclable / not recyclable labels")]
    pub(crate) quick: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Labels(_) => "labels",
        Command::Upload(_) => "upload",
        Command::Capture(_) => "capture",
        Command::Health => "health",
    }
}
