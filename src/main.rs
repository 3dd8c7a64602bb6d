//! skill-cohort CLI
//!
//! # Commands
//!
//! - `run`: fit clusters over a JSON profile list, save assignments and
//!   analysis, and optionally select candidates from the same fit.
//! - `summary`: print the condensed view of a saved analysis.
//!
//! Exit code 1 on error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use skill_cohort::persist;
use skill_cohort::{Algorithm, ClusterConfig, Label, SelectionRequest, SkillClusterer};

/// Cluster professional profiles by skill vocabulary
#[derive(Parser)]
#[command(name = "skill-cohort")]
#[command(version)]
#[command(about = "Cluster professional profiles by skill vocabulary and select representative candidates")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit clusters and write artifacts
    Run(RunArgs),
    /// Print the top skills per cluster from a saved analysis
    Summary(SummaryArgs),
}

#[derive(Args)]
struct RunArgs {
    /// JSON array of profiles: [{"id": .., "skills": [..]}, ..]
    #[arg(long)]
    input: PathBuf,

    /// Directory for the JSON artifacts
    #[arg(long, default_value = "results")]
    outdir: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// kmeans, agglomerative or dbscan
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// Target cluster count for kmeans and agglomerative
    #[arg(long)]
    n_clusters: Option<usize>,

    /// Minimum number of profiles a skill must appear in
    #[arg(long)]
    min_skill_freq: Option<usize>,

    /// Maximum fraction of profiles a skill may appear in
    #[arg(long)]
    max_df: Option<f64>,

    /// Cluster raw tf-idf vectors instead of the SVD projection
    #[arg(long)]
    no_dim_reduction: bool,

    /// SVD components to keep
    #[arg(long)]
    dim_components: Option<usize>,

    /// DBSCAN neighborhood radius
    #[arg(long)]
    dbscan_eps: Option<f32>,

    /// DBSCAN minimum neighborhood population
    #[arg(long)]
    dbscan_min_samples: Option<usize>,

    /// Seed for k-means restarts
    #[arg(long)]
    random_state: Option<u64>,

    /// Candidates to select per cluster, e.g. --select 0=5 --select -1=2
    #[arg(long = "select", value_name = "LABEL=COUNT", value_parser = parse_quota, allow_hyphen_values = true)]
    select: Vec<(Label, i64)>,
}

#[derive(Args)]
struct SummaryArgs {
    /// Saved cluster_analysis.json
    #[arg(long)]
    analysis: PathBuf,

    /// Skills to show per cluster
    #[arg(long, default_value_t = 3)]
    top: usize,
}

fn parse_quota(raw: &str) -> std::result::Result<(Label, i64), String> {
    let (label, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=COUNT, got '{raw}'"))?;
    let label = label
        .trim()
        .parse::<Label>()
        .map_err(|e| format!("bad label '{label}': {e}"))?;
    let count = count
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad count '{count}': {e}"))?;
    Ok((label, count))
}

impl RunArgs {
    fn resolve_config(&self) -> Result<ClusterConfig> {
        let mut config = match &self.config {
            Some(path) => ClusterConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ClusterConfig::default(),
        };
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(k) = self.n_clusters {
            config.n_clusters = Some(k);
        }
        if let Some(v) = self.min_skill_freq {
            config.min_skill_freq = v;
        }
        if let Some(v) = self.max_df {
            config.max_df = v;
        }
        if self.no_dim_reduction {
            config.dim_reduction = false;
        }
        if let Some(v) = self.dim_components {
            config.dim_components = v;
        }
        if let Some(v) = self.dbscan_eps {
            config.dbscan_eps = v;
        }
        if let Some(v) = self.dbscan_min_samples {
            config.dbscan_min_samples = v;
        }
        if let Some(v) = self.random_state {
            config.random_state = v;
        }
        Ok(config)
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let profiles = persist::load_profiles(&args.input)
        .with_context(|| format!("reading profiles from {}", args.input.display()))?;

    let model = SkillClusterer::new(config)
        .fit(&profiles)
        .context("clustering failed")?;
    let artifacts = persist::save_fit(&args.outdir, &model)
        .with_context(|| format!("writing artifacts to {}", args.outdir.display()))?;
    info!(
        assignments = %artifacts.assignments.display(),
        analysis = %artifacts.analysis.display(),
        "wrote fit artifacts"
    );

    if !args.select.is_empty() {
        let request: SelectionRequest = args.select.iter().copied().collect();
        let selection = model.select(&request);
        persist::save_selection(&args.outdir, &selection)
            .with_context(|| format!("writing selection to {}", args.outdir.display()))?;
        println!("{}", serde_json::to_string_pretty(&selection)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&model.analysis().summary(3))?);
    }
    Ok(())
}

fn summary(args: SummaryArgs) -> Result<()> {
    let analysis = persist::load_analysis(&args.analysis)
        .with_context(|| format!("reading analysis {}", args.analysis.display()))?;
    println!("{}", serde_json::to_string_pretty(&analysis.summary(args.top))?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Summary(args) => summary(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
