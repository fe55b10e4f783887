use anyhow::Result;
use clap::Parser;
use log::info;
use sparring::{Experiment, ExperimentConfig, RandomAgentBuilder, RandomAgentConfig};
use std::path::PathBuf;

/// Trains the random baseline against every enemy, run after run.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of runs, negative for running until interrupted
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    runs: i64,

    /// Experiment configuration in YAML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root of the output files, overrides the configuration
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Environment steps per enemy and weighting, overrides the configuration
    #[arg(long)]
    total_timesteps: Option<usize>,

    /// Unnormalized probabilities of Idle, Left, Right, Shoot and Jump
    #[arg(long, num_args = 5, value_delimiter = ',')]
    action_weights: Option<Vec<f32>>,
}

fn experiment_config(args: &Args) -> Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(dir) = &args.output_dir {
        config = config.output_dir(dir);
    }
    if let Some(n) = args.total_timesteps {
        config = config.total_timesteps(n);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = experiment_config(&args)?;
    info!("{}", serde_yaml::to_string(&config)?);

    let agent_config = match &args.action_weights {
        Some(w) => RandomAgentConfig::default().action_weights(w.clone()),
        None => RandomAgentConfig::default(),
    };
    let builder = RandomAgentBuilder::new(agent_config);

    let runs = usize::try_from(args.runs).ok();
    let n_runs = Experiment::new(config).run(runs, &builder)?;
    info!("Finished {} runs", n_runs);
    Ok(())
}
