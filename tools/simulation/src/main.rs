use {
    clap::Parser,
    simulation::{
        config::SimulationConfig,
        engine::SimEngine,
        export::{export_json, write_to_file},
    },
    std::path::PathBuf,
    tracing::info,
    tracing_subscriber::EnvFilter,
};

/// Crowdfund ledger simulation
///
/// Drives seeded bots against the ledger, checks its invariants after
/// every step and prints or writes a JSON report.
#[derive(Debug, Parser)]
#[clap(name = "crowdfund-sim", version)]
struct Args {
    /// JSON config file; defaults apply to omitted fields
    #[clap(long, short, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the configured seed
    #[clap(long, short)]
    seed: Option<u64>,

    /// Override the configured step count
    #[clap(long)]
    steps: Option<usize>,

    /// Exercise the multi-token ledger
    #[clap(long)]
    multi_token: bool,

    /// Write the report here instead of stdout
    #[clap(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    config.multi_token |= args.multi_token;
    config.validate()?;

    let report = SimEngine::new(config)?.run()?;
    info!(summary = %report.metrics.summary(), "report ready");

    match &args.output {
        Some(path) => {
            write_to_file(&report, path)?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", export_json(&report)?),
    }
    Ok(())
}
