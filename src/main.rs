use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use erp_dashboard_lib::activity::ActivityFeed;
use erp_dashboard_lib::error::{DashboardError, DashboardResult};
use erp_dashboard_lib::export;
use erp_dashboard_lib::fetcher::{DataFetcher, QueryOptions};
use erp_dashboard_lib::registry::{default_registry, ModuleKey};
use erp_dashboard_lib::settings::FetchMode;

#[derive(Parser)]
#[command(name = "erp-dashboard", version, about = "Query, summarize and export ERP module data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List configured modules
    Modules,
    /// Fetch one page of a module with aggregations
    Fetch {
        module: String,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Merged recent activity across all modules
    Activity {
        /// `sequential` or `concurrent`
        #[arg(long, default_value = "sequential")]
        mode: String,
        /// Print per-module record counts instead of the feed
        #[arg(long)]
        overview: bool,
    },
    /// Export a module page as CSV
    Export {
        module: String,
        #[command(flatten)]
        query: QueryArgs,
        /// Output file, or directory to write `<module>_export_<date>.csv` into
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct QueryArgs {
    #[arg(long, default_value_t = 10)]
    limit: usize,
    #[arg(long, default_value = "id")]
    order_by: String,
    #[arg(long)]
    ascending: bool,
    /// Equality filter as column=value; repeatable
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, Value)>,
}

impl QueryArgs {
    fn to_options(&self) -> QueryOptions {
        self.filters.iter().fold(
            QueryOptions::default()
                .limit(self.limit)
                .order_by(&self.order_by, self.ascending),
            |options, (column, value)| options.filter(column, value.clone()),
        )
    }
}

// Numbers, booleans and null keep their JSON type; anything else is text.
fn parse_filter(raw: &str) -> Result<(String, Value), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{}'", raw))?;
    let value = serde_json::from_str::<Value>(value)
        .ok()
        .filter(|v| !v.is_object() && !v.is_array())
        .unwrap_or_else(|| Value::String(value.to_string()));
    Ok((column.trim().to_string(), value))
}

fn print_json<T: serde::Serialize>(value: &T) -> DashboardResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| DashboardError::Export(format!("Failed to serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

async fn run(cli: Cli) -> DashboardResult<()> {
    match cli.command {
        Command::Modules => {
            let descriptors: Vec<_> = default_registry().descriptors().collect();
            print_json(&descriptors)
        }
        Command::Fetch { module, query } => {
            let fetcher = erp_dashboard_lib::connect_from_env()?;
            let result = fetcher.fetch_by_name(&module, &query.to_options()).await?;
            print_json(&result)
        }
        Command::Activity { mode, overview } => {
            let fetcher = erp_dashboard_lib::connect_from_env()?;
            let mode = FetchMode::from_str(&mode);
            let report = ActivityFeed::new(fetcher).mode(mode).fetch().await;
            if overview {
                print_json(&report.overview())
            } else {
                print_json(&report.records())
            }
        }
        Command::Export { module, query, out } => {
            let fetcher = erp_dashboard_lib::connect_from_env()?;
            export_module(&fetcher, &module, &query, out).await
        }
    }
}

async fn export_module(
    fetcher: &DataFetcher,
    module: &str,
    query: &QueryArgs,
    out: Option<PathBuf>,
) -> DashboardResult<()> {
    let key: ModuleKey = module.parse()?;
    let result = fetcher.fetch(key, &query.to_options()).await?;
    if let Some(error) = result.error {
        return Err(DashboardError::ExternalStore(error));
    }

    match out {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(export::export_file_name(key, chrono::Local::now().date_naive()))
            } else {
                path
            };
            let mut file = std::fs::File::create(&path)?;
            export::write_csv(&mut file, &result.rows, &[])?;
            log::info!("[export] Wrote {} rows to {:?}", result.rows.len(), path);
            Ok(())
        }
        None => export::write_csv(&mut std::io::stdout().lock(), &result.rows, &[]),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
