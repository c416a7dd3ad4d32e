use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use machine_learning::{dataset::Dataset, specs::TrainerSpec};
use serde::Deserialize;

/// Where a dataset comes from.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Local { path: PathBuf },
    Inline(Dataset),
}

impl DataSource {
    /// Loads the dataset, reading relative paths from `base_dir`.
    pub fn load(self, base_dir: &Path) -> Result<Dataset> {
        match self {
            DataSource::Inline(dataset) => Ok(dataset),
            DataSource::Local { path } => {
                let path = base_dir.join(path);
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("reading dataset {}", path.display()))?;

                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing dataset {}", path.display()))
            }
        }
    }
}

/// A whole training run: the trainer spec plus where its data comes from and where the history
/// goes.
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    #[serde(flatten)]
    pub trainer: TrainerSpec,
    pub train: DataSource,
    pub test: DataSource,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading run config {}", path.display()))?;

        serde_json::from_str(&raw)
            .with_context(|| format!("parsing run config {}", path.display()))
    }
}
