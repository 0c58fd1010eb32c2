use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cwvars::aws::client::InventoryClient;
use cwvars::config::Config;
use cwvars::{Inventory, Resolver};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Resolve a dashboard template-variable query
#[derive(Parser, Debug)]
#[command(name = "cwvars", version, about, long_about = None)]
struct Args {
    /// Query type (regions, namespaces, metrics, dimension_keys, dimension_values,
    /// ebs_volume_ids, ec2_instance_attribute, resource_arns)
    #[arg(short, long)]
    query_type: String,

    /// Query parameters as a JSON object
    #[arg(short, long, default_value = "{}")]
    params: String,

    /// Region to use for the `default` alias
    #[arg(short, long)]
    region: Option<String>,

    /// Inventory gateway base URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("cwvars started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cwvars").join("cwvars.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cwvars").join("cwvars.log");
    }
    PathBuf::from("cwvars.log")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    if let Some(region) = &args.region {
        config.default_region = Some(region.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = Some(endpoint.clone());
    }

    let params: Value = serde_json::from_str(&args.params).context("--params is not valid JSON")?;

    let client = InventoryClient::new(
        &config.effective_endpoint(),
        &config.effective_region(),
        config.token(),
    )?;
    let resolver = Resolver::new(
        Inventory::from_client(Arc::new(client)),
        config.resolver_options(),
    );

    match resolver.resolve_raw(&args.query_type, &params).await {
        Ok(items) => {
            println!("{}", serde_json::to_string_pretty(&items)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!("Query failed: {:?}", err);
            eprintln!("Error: {}", err.user_message());
            Ok(if err.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
