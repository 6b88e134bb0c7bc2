use clap::{Args, Parser, Subcommand, ValueEnum};
use headroom_core::ResourceDimension;
use headroom_scorer::{
    default_dimensions, ApiSnapshot, ClusterScorer, ManifestSnapshot, ScoreReport, ScoringConfig,
    SnapshotProvider,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "headroom", about = "Cluster resource availability scorer")]
struct Cli {
    /// Log line format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the cluster once and print the result
    Score {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scoring: ScoringArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },
    /// Re-score the cluster on an interval until interrupted
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        scoring: ScoringArgs,
        /// Seconds between scoring passes
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Cluster manifest (JSON or YAML) with `nodes` and `pods` lists
    #[arg(long, env = "HEADROOM_MANIFEST", conflicts_with = "api_url")]
    manifest: Option<PathBuf>,
    /// Base URL of a Kubernetes-compatible API server
    #[arg(long, env = "HEADROOM_API_URL")]
    api_url: Option<String>,
    /// Bearer token sent to the API server
    #[arg(long, env = "HEADROOM_API_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Args)]
struct ScoringArgs {
    /// YAML scoring configuration
    #[arg(long, env = "HEADROOM_CONFIG", conflicts_with = "preset")]
    config: Option<PathBuf>,
    /// Built-in scoring configuration
    #[arg(long, value_enum)]
    preset: Option<Preset>,
    /// Resource to score; repeatable (default: cpu and memory)
    #[arg(long = "dimension", value_name = "RESOURCE")]
    dimensions: Vec<ResourceDimension>,
    /// Do not add pod overhead to requests
    #[arg(long)]
    no_overhead: bool,
    /// Ignore ephemeral-storage requests
    #[arg(long)]
    no_ephemeral_storage_isolation: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    NonZeroRequests,
    RequestedOnly,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
    /// Named scores (`cpuAvailable`, `memAvailable`, ...)
    Placement,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format);

    match cli.command {
        Commands::Score {
            source,
            scoring,
            output,
        } => run_score(&source, &scoring, output).await,
        Commands::Watch {
            source,
            scoring,
            interval_secs,
        } => run_watch(&source, &scoring, Duration::from_secs(interval_secs)).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Score once and print the report
async fn run_score(
    source: &SourceArgs,
    scoring: &ScoringArgs,
    output: OutputFormat,
) -> miette::Result<()> {
    let scorer = create_scorer(source, scoring)?;
    let dimensions = resolve_dimensions(scoring);

    let report = scorer.compute_scores(&dimensions).await?;
    println!("{}", render(&report, output)?);

    Ok(())
}

/// Score on an interval until ctrl-c
async fn run_watch(
    source: &SourceArgs,
    scoring: &ScoringArgs,
    interval: Duration,
) -> miette::Result<()> {
    let scorer = create_scorer(source, scoring)?;
    let dimensions = resolve_dimensions(scoring);

    info!(
        "Scoring every {}s, dimensions: {:?}",
        interval.as_secs(),
        dimensions
    );

    let token = CancellationToken::new();
    let loop_token = token.clone();
    let handle = tokio::spawn(async move {
        loop {
            match scorer.compute_scores(&dimensions).await {
                Ok(report) => match render(&report, OutputFormat::Placement) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Failed to render scores: {}", e),
                },
                Err(e) => error!("Scoring pass failed: {}", e),
            }

            tokio::select! {
                _ = loop_token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| miette::miette!("Failed to listen for ctrl-c: {}", e))?;

    info!("Shutting down");
    token.cancel();
    wait_for_watch(handle).await;

    Ok(())
}

/// Join the watch task, logging it if the task panicked or was aborted
async fn wait_for_watch(handle: tokio::task::JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            error!("Watch task ended abnormally: {}", e);
            false
        }
    }
}

fn create_scorer(source: &SourceArgs, scoring: &ScoringArgs) -> miette::Result<ClusterScorer> {
    let provider = create_provider(source)?;
    let config = resolve_config(scoring)?;

    info!(
        "Using {} snapshot provider with config {:?}",
        provider.name(),
        config
    );

    Ok(ClusterScorer::new(provider, config))
}

fn create_provider(source: &SourceArgs) -> miette::Result<Arc<dyn SnapshotProvider>> {
    match (&source.manifest, &source.api_url) {
        (Some(path), _) => Ok(Arc::new(ManifestSnapshot::new(path))),
        (None, Some(url)) => {
            let mut provider = ApiSnapshot::new(url);
            if let Some(token) = &source.token {
                provider = provider.with_bearer_token(token);
            }
            Ok(Arc::new(provider))
        }
        (None, None) => Err(miette::miette!(
            help = "Pass --manifest <file> or --api-url <url>",
            "No snapshot source configured"
        )),
    }
}

/// Config file or preset first, then flag overrides
fn resolve_config(scoring: &ScoringArgs) -> miette::Result<ScoringConfig> {
    let mut config = match (&scoring.config, scoring.preset) {
        (Some(path), _) => ScoringConfig::load(path)?,
        (None, Some(Preset::RequestedOnly)) => ScoringConfig::requested_only(),
        (None, Some(Preset::NonZeroRequests)) | (None, None) => ScoringConfig::non_zero_requests(),
    };

    if scoring.no_overhead {
        config.enable_overhead = false;
    }
    if scoring.no_ephemeral_storage_isolation {
        config.enable_ephemeral_storage_isolation = false;
    }

    Ok(config)
}

fn resolve_dimensions(scoring: &ScoringArgs) -> Vec<ResourceDimension> {
    if scoring.dimensions.is_empty() {
        default_dimensions()
    } else {
        scoring.dimensions.clone()
    }
}

fn render(report: &ScoreReport, output: OutputFormat) -> miette::Result<String> {
    let rendered = match output {
        OutputFormat::Json => headroom_core::to_json_pretty(report)?,
        OutputFormat::Yaml => headroom_core::to_yaml(report)?,
        OutputFormat::Placement => headroom_core::to_json(&report.placement_scores())?,
    };
    Ok(rendered)
}
