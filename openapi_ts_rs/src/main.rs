//! Binary to generate TypeScript models from an OpenAPI document.
//!
//! Usage: `openapi-ts -i openapi.yaml -o generated/`
//!
//! Writes one `models/<Name>.ts` file per component schema under the output
//! directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use openapi_ts_rs::{GenerateSettings, PropertyOrder, generate_from_file};
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Generate TypeScript models from OpenAPI component schemas.
#[derive(Parser, Debug)]
#[command(name = "openapi-ts", version, about)]
struct Cli {
    /// Path to the input OpenAPI document (YAML or JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output folder for generated code
    #[arg(short, long)]
    output: PathBuf,

    /// Log level (error, warn, info, debug, trace); `RUST_LOG` takes precedence
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Field order inside each generated model
    #[arg(long, value_enum, default_value_t = OrderArg::Sorted)]
    property_order: OrderArg,

    /// Fail instead of emitting `any[]` / `Record<string, any>` fallbacks
    #[arg(long)]
    deny_unsupported_shapes: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Sorted,
    Declared,
}

impl From<OrderArg> for PropertyOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Sorted => Self::Sorted,
            OrderArg::Declared => Self::Declared,
        }
    }
}

/// Installs the fmt subscriber. Returns false when `level` did not parse.
fn init_logging(level: &str) -> bool {
    let parsed: Option<LevelFilter> = level.parse().ok();
    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(parsed.unwrap_or(LevelFilter::INFO).into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();
    parsed.is_some()
}

fn main() -> ExitCode {
    let cli: Cli = Cli::parse();

    if !init_logging(&cli.log_level) {
        warn!("Invalid log level '{}', defaulting to info", cli.log_level);
    }
    info!(input = %cli.input.display(), output = %cli.output.display(), "Generating models");

    let settings: GenerateSettings = GenerateSettings {
        property_order: cli.property_order.into(),
        deny_unsupported_shapes: cli.deny_unsupported_shapes,
    };
    match generate_from_file(&cli.input, &cli.output, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
