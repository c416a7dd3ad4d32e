mod config;

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;
use machine_learning::training::{LogReporter, TrainerBuilder};

use config::RunConfig;

const CONFIG_ENV: &str = "TRAINING_CONFIG";

fn main() -> Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .or_else(|| env::var(CONFIG_ENV).ok())
        .map(PathBuf::from)
        .with_context(|| format!("usage: training-engine <run.json> (or set {CONFIG_ENV})"))?;

    let config = RunConfig::from_path(&path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));

    let train = config.train.load(base_dir).context("loading the training set")?;
    let test = config.test.load(base_dir).context("loading the test set")?;
    info!("loaded {} training and {} test examples", train.len(), test.len());

    let mut trainer = TrainerBuilder::new()
        .build(&config.trainer, train, test)
        .context("building the trainer")?;

    let history = trainer
        .train(&mut LogReporter::new())
        .context("training failed")?;

    let final_metrics = trainer.evaluate().context("evaluating the trained model")?;
    info!(
        loss = final_metrics.loss,
        accuracy = final_metrics.accuracy;
        "final test metrics"
    );

    let json = serde_json::to_string_pretty(&history)?;
    match config.output {
        Some(output) => {
            fs::write(&output, json)
                .with_context(|| format!("writing history to {}", output.display()))?;
            info!("history written to {}", output.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
