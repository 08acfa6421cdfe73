//! # strain CLI entry point
//!
//! Parses command-line arguments, initializes logging, and dispatches to
//! subcommand handlers. Verdict lines go to stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use strain_build::{LogScanner, ServiceImageKeys};
use strain_cli::config::{run_config_env, run_config_value, ConfigEnvArgs, ConfigValueArgs};
use strain_cli::image::{run_image_tag, run_target_key, ImageTagArgs, TargetKeyArgs};
use strain_cli::scan::{run_scan_log, ScanLogArgs};
use strain_cli::validate::{run_validate, CheckSet, ValidateArgs};
use strain_repo::ProbeConfig;

/// Strain toolchain for the image-build pipeline.
///
/// Validates strain configuration files before a build, generates image
/// tags, exports strain values to CI, and scans build logs.
#[derive(Parser, Debug)]
#[command(name = "strain", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// YAML file overriding the strain keys the validators read.
    #[arg(long, value_name = "FILE", global = true)]
    keys: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate fields and repository reachability.
    Validate(ValidateArgs),

    /// Validate fields only: schema and cross-field rules.
    ValidateFields(ValidateArgs),

    /// Validate repository reachability only.
    ValidateRepos(ValidateArgs),

    /// Generate a dynamic image tag for a service.
    ImageTag(ImageTagArgs),

    /// Print the strain key that holds a service's image.
    TargetKey(TargetKeyArgs),

    /// Print `KEY=value` lines for required and optional strain keys.
    ConfigEnv(ConfigEnvArgs),

    /// Print the value of a single strain key.
    ConfigValue(ConfigValueArgs),

    /// Scan a build log for known error and warning text.
    ScanLog(ScanLogArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    tracing::debug!("strain CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match strain_cli::load_keys(cli.keys.as_deref()) {
        Err(e) => Err(e),
        Ok(keys) => {
            let probe = ProbeConfig::from_env();
            match cli.command {
                Commands::Validate(args) => run_validate(&args, CheckSet::All, &keys, &probe).await,
                Commands::ValidateFields(args) => {
                    run_validate(&args, CheckSet::Fields, &keys, &probe).await
                }
                Commands::ValidateRepos(args) => {
                    run_validate(&args, CheckSet::Repositories, &keys, &probe).await
                }
                Commands::ImageTag(args) => {
                    run_image_tag(&args, &keys, &ServiceImageKeys::default())
                }
                Commands::TargetKey(args) => run_target_key(&args, &ServiceImageKeys::default()),
                Commands::ConfigEnv(args) => run_config_env(&args),
                Commands::ConfigValue(args) => run_config_value(&args),
                Commands::ScanLog(args) => LogScanner::standard()
                    .map_err(anyhow::Error::from)
                    .and_then(|scanner| run_scan_log(&args, &scanner)),
            }
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// Verbosity picks the level unless `RUST_LOG` is set.
fn init_tracing(verbose: u8, format: LogFormat) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
