//! gatecast - gate-token forecast normalization CLI

mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use gatecast_core::analytics::{hourly_flow_split, summarize_forecast, GateAnalytics};
use gatecast_core::timeseries::zero_fill_hours;
use gatecast_core::{
    fetch_snapshot, ColorScheme, CoreError, DashboardQuery, EventBus, ForecastClient,
    ForecastEvent, GatecastConfig, LivePoller, PollerConfig, Preferences, QualityCounters,
    ResponseCache,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "gatecast",
    version,
    about = "Gate-token forecast normalization and metrics",
    long_about = "Validates forecasting API payloads, zero-fills hourly series and derives\n\
                  flow balance, capacity utilization and risk levels.\n\
                  \n\
                  Examples:\n\
                    gatecast summary next8h.json             # Summarize a saved response\n\
                    gatecast summary next8h.json --json      # Machine-readable summary\n\
                    gatecast zero-fill hourly.json --start 2024-01-31T23:00 --hours 24\n\
                    gatecast flow movetype_hourly.json       # IN/OUT balance\n\
                    gatecast fetch -t T2 --mode today        # Query the live API once\n\
                    gatecast watch -t T1                     # Refresh every interval\n\
                    gatecast theme toggle                    # Switch dark/light\n\
                  \n\
                  Environment Variables:\n\
                    GATECAST_API_URL                 # Override the API base URL\n\
                    GATECAST_CONFIG                  # Path to config.toml\n\
                    GATECAST_NO_COLOR                # Disable ANSI colors (log-friendly)\n\
                    RUST_LOG                         # Log filter (default: gatecast=info)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (default: <config dir>/gatecast/config.toml)
    #[arg(long, global = true, env = "GATECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "GATECAST_NO_COLOR")]
    no_color: bool,
}

/// Dashboard filters, as in a dashboard link
#[derive(Args)]
struct QueryArgs {
    /// Terminal id (default: preference, then T1)
    #[arg(long, short = 't')]
    terminal: Option<String>,
    /// IN, OUT or ALL
    #[arg(long)]
    move_type: Option<String>,
    /// EMPTY, FULL, EXP, UNK or ALL
    #[arg(long)]
    desig: Option<String>,
    /// next8h, today or custom
    #[arg(long)]
    mode: Option<String>,
    /// Custom window start, YYYY-MM-DDTHH:MM
    #[arg(long)]
    start: Option<String>,
    /// Custom window end, YYYY-MM-DDTHH:MM
    #[arg(long)]
    end: Option<String>,
}

impl QueryArgs {
    fn into_query(self, prefs: &Preferences) -> DashboardQuery {
        DashboardQuery::new(
            self.terminal.or_else(|| prefs.default_terminal.clone()),
            self.move_type,
            self.desig,
            self.mode.as_deref(),
            self.start,
            self.end,
        )
    }
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a saved forecast response (next8h or range)
    Summary {
        /// JSON file with `horizon_hours`, or a bare points array
        file: PathBuf,
        /// Override capacity per hour
        #[arg(long)]
        capacity: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Zero-fill saved hourly rows into a contiguous series
    ZeroFill {
        /// JSON file with `points`, or a bare rows array
        file: PathBuf,
        /// First hour of the series
        #[arg(long)]
        start: String,
        /// Number of hourly buckets
        #[arg(long, default_value = "8")]
        hours: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// IN/OUT balance and capacity of saved hourly rows
    Flow {
        /// JSON file with `points`, or a bare rows array
        file: PathBuf,
        /// Override capacity per hour
        #[arg(long)]
        capacity: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch and summarize one window from the API
    Fetch {
        #[command(flatten)]
        query: QueryArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Poll the API and print each refresh until Ctrl-C
    Watch {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Show or change the color scheme preference
    Theme {
        #[arg(value_parser = ["dark", "light", "toggle"])]
        action: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.no_color);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        if let Some(hint) = err.downcast_ref::<CoreError>().and_then(CoreError::suggestion) {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}

fn init_tracing(no_color: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatecast=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!no_color),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let no_color = cli.no_color;
    let config =
        GatecastConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Summary {
            file,
            capacity,
            json,
        } => run_summary(&config, &file, capacity, json, no_color),
        Command::ZeroFill {
            file,
            start,
            hours,
            json,
        } => run_zero_fill(&file, &start, hours, json, no_color),
        Command::Flow {
            file,
            capacity,
            json,
        } => run_flow(&config, &file, capacity, json, no_color),
        Command::Fetch { query, json } => {
            let query = query.into_query(&load_preferences());
            run_fetch(&config, query, json, no_color).await
        }
        Command::Watch { query } => {
            let query = query.into_query(&load_preferences());
            run_watch(&config, query, no_color).await
        }
        Command::Theme { action } => run_theme(action.as_deref()),
    }
}

fn load_preferences() -> Preferences {
    Preferences::default_dir()
        .map(|dir| Preferences::load(&dir))
        .unwrap_or_default()
}

fn build_client(config: &GatecastConfig) -> Result<ForecastClient> {
    let client = ForecastClient::new(config).context("Failed to build API client")?;
    Ok(client.with_cache(ResponseCache::new(config.cache_ttl())))
}

fn run_summary(
    config: &GatecastConfig,
    file: &Path,
    capacity: Option<f64>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let body = cli::read_json(file)?;
    let (mut response, report) = cli::load_forecast(&body, config.default_capacity_per_hour);
    if let Some(capacity) = capacity {
        response.capacity_per_hour = capacity;
    }

    let summary = summarize_forecast(&response, None, None);
    println!("{}", cli::format_summary(&response, &summary, json, no_color));
    if let Some(quality) = cli::format_quality(&report) {
        eprintln!("{quality}");
    }
    Ok(())
}

fn run_zero_fill(file: &Path, start: &str, hours: usize, json: bool, no_color: bool) -> Result<()> {
    let body = cli::read_json(file)?;
    let (points, report) = cli::load_time_points(&body);
    let filled = zero_fill_hours(start, hours, &points)?;

    println!("{}", cli::format_zero_fill(&filled, json, no_color));
    if let Some(quality) = cli::format_quality(&report) {
        eprintln!("{quality}");
    }
    Ok(())
}

fn run_flow(
    config: &GatecastConfig,
    file: &Path,
    capacity: Option<f64>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let body = cli::read_json(file)?;
    let (points, report) = cli::load_time_points(&body);
    let capacity = capacity.unwrap_or(config.default_capacity_per_hour);

    let counters = QualityCounters::new();
    let analytics = GateAnalytics::compute_with(&points, capacity, &counters);
    let hourly = hourly_flow_split(&points);
    println!("{}", cli::format_flow(&analytics, &hourly, json, no_color));
    if let Some(quality) = cli::format_quality(&report) {
        eprintln!("{quality}");
    }
    let counts = counters.snapshot();
    if !counts.is_empty() {
        eprintln!("Ignored in flow balance:{}", cli::format_counts(&counts));
    }
    Ok(())
}

async fn run_fetch(
    config: &GatecastConfig,
    query: DashboardQuery,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let client = build_client(config)?;
    let now = Utc::now().with_timezone(&config.offset());
    let snapshot = fetch_snapshot(&client, &query, now).await?;

    if !json {
        println!("{}", cli::format_snapshot_header(&snapshot));
    }
    println!(
        "{}",
        cli::format_summary(&snapshot.response, &snapshot.summary, json, no_color)
    );

    let counts = client.counters().snapshot();
    if !counts.is_empty() {
        eprintln!("Data quality:{}", cli::format_counts(&counts));
    }
    Ok(())
}

async fn run_watch(config: &GatecastConfig, query: DashboardQuery, no_color: bool) -> Result<()> {
    let client = Arc::new(build_client(config)?);
    let bus = EventBus::default_capacity();
    let mut rx = bus.subscribe();
    let poller = LivePoller::start(client, query, PollerConfig::from_config(config), bus);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(ForecastEvent::Updated(snapshot)) => {
                    println!("{}", cli::format_snapshot_header(&snapshot));
                    println!(
                        "{}\n",
                        cli::format_summary(&snapshot.response, &snapshot.summary, false, no_color)
                    );
                }
                Ok(ForecastEvent::FetchFailed(message)) => eprintln!("Refresh failed: {message}"),
                Ok(ForecastEvent::DataQuality(counts)) => {
                    eprintln!("Data quality:{}", cli::format_counts(&counts));
                }
                Ok(ForecastEvent::Stopped) | Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Display fell behind, skipped refreshes");
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    poller.stop().await;
    Ok(())
}

fn run_theme(action: Option<&str>) -> Result<()> {
    let dir = Preferences::default_dir().context("Could not determine cache directory")?;
    let mut prefs = Preferences::load(&dir);

    let Some(action) = action else {
        println!("{}", prefs.color_scheme);
        return Ok(());
    };

    prefs.color_scheme = match action {
        "toggle" => prefs.color_scheme.toggle(),
        other => ColorScheme::parse(other)
            .with_context(|| format!("Unknown color scheme '{other}'"))?,
    };
    prefs.save(&dir)?;
    println!("{}", prefs.color_scheme);
    Ok(())
}
