use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use fwscope_logs::{FilterChoices, FirewallLog, LogFilters, LogView, LogWorker, WorkerResponse};
use fwscope_stores::ToastStore;

mod config;
mod output;

use config::ViewerConfig;

/// fwscope - filter and sort firewall logs newest first
#[derive(Parser, Debug)]
#[command(name = "fwscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON array of newly arrived log records ("-" reads stdin)
    #[arg(value_name = "NEW_LOGS")]
    new_logs: PathBuf,

    /// JSON array of the records currently on display
    #[arg(long, value_name = "FILE")]
    current: Option<PathBuf>,

    /// Only show records with this action (e.g. pass, block)
    #[arg(long)]
    action: Option<String>,

    /// Only show records from this interface
    #[arg(long)]
    interface: Option<String>,

    /// Only show records whose label contains this text (e.g. in, out)
    #[arg(long)]
    direction: Option<String>,

    /// Maximum number of records to show
    #[arg(long)]
    limit: Option<usize>,

    /// TOML config file with default limit and filters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the raw `processedlogs` message instead of a table
    #[arg(long)]
    json: bool,

    /// List the actions, interfaces and directions present in the input
    #[arg(long)]
    list_filters: bool,
}

impl Args {
    /// Command line filters override the configured ones criterion by criterion
    fn filters(&self, configured: &LogFilters) -> LogFilters {
        let pick = |flag: &Option<String>, fallback: &str| {
            flag.clone().unwrap_or_else(|| fallback.to_string())
        };
        LogFilters {
            action: pick(&self.action, &configured.action),
            interface: pick(&self.interface, &configured.interface),
            direction: pick(&self.direction, &configured.direction),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let filters = args.filters(&config.filters);
    let limit = args.limit.unwrap_or(config.limit);
    let toasts = ToastStore::new();

    let new_logs = read_batch(&args.new_logs)?;
    let view = LogView::new(limit);
    if let Some(path) = &args.current {
        view.replace(read_batch(path)?);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list_filters {
        let current = view.all();
        let choices = FilterChoices::from_logs(new_logs.iter().chain(current.iter()));
        output::write_choices(&mut out, &choices)?;
        return Ok(());
    }

    let received = new_logs.len() + view.len();
    tracing::debug!(received, limit, ?filters, "processing logs");

    let mut worker = LogWorker::spawn();
    let processed = worker.process(view.request(new_logs, &filters)).await?;
    worker.shutdown();
    view.replace(processed);

    if view.is_empty() && received > 0 {
        toasts.warning("No logs match the current filters", Some(Duration::ZERO));
    } else {
        toasts.info(
            format!("Showing {} of {} logs", view.len(), received),
            Some(config.toast_duration()),
        );
    }

    if args.json {
        let message = WorkerResponse::ProcessedLogs { logs: view.all() };
        serde_json::to_writer_pretty(&mut out, &message)?;
        writeln!(out)?;
    } else {
        output::write_table(&mut out, &view.all())?;
        output::write_summary(&mut out, &view.action_counts())?;
    }

    for toast in toasts.toasts() {
        eprintln!("[{}] {}", toast.kind.as_str(), toast.message);
    }

    Ok(())
}

/// Read a JSON array of log records from a file or stdin
fn read_batch(path: &Path) -> Result<Vec<FirewallLog>> {
    let content = if path == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read logs from stdin")?;
        content
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read logs from {}", path.display()))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse logs in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_filters_override_config() {
        let args = Args::parse_from(["fwscope", "logs.json", "--action", "pass", "--limit", "5"]);
        let configured = LogFilters::new("block", "wan", "in");

        assert_eq!(args.filters(&configured), LogFilters::new("pass", "wan", "in"));
        assert_eq!(args.limit, Some(5));
    }

    #[test]
    fn test_empty_flag_clears_configured_filter() {
        let args = Args::parse_from(["fwscope", "-", "--interface", ""]);
        let configured = LogFilters::new("", "wan", "");

        assert_eq!(args.filters(&configured), LogFilters::default());
        assert_eq!(args.new_logs, PathBuf::from("-"));
    }

    #[test]
    fn test_read_batch_reports_path() {
        let err = read_batch(Path::new("/nonexistent/logs.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/logs.json"));
    }
}
