//! Command line and JSON configuration

use crate::error::AppError;
use clap::Parser;
use galaxy_generator::ParameterSet;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "galaxy", about = "Procedural galaxy point cloud", version)]
pub struct Args {
    /// JSON file with galaxy parameters (missing fields use defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for a reproducible galaxy layout
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Override the particle count
    #[arg(long, allow_negative_numbers = true)]
    pub count: Option<i64>,

    /// Start from the GPU-animated defaults
    #[arg(long)]
    pub animated: bool,
}

impl Args {
    /// The first parameter snapshot to commit.
    pub fn initial_parameters(&self) -> Result<ParameterSet, AppError> {
        let mut params = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| AppError::ConfigIo {
                    path: path.clone(),
                    source,
                })?;
                log::info!("Loaded parameters from {}", path.display());
                parse_parameters(&text)?
            }
            None if self.animated => ParameterSet::animated(),
            None => ParameterSet::default(),
        };
        if let Some(count) = self.count {
            params.count = count;
        }
        Ok(params)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                log::info!("Using seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        }
    }
}

pub fn parse_parameters(text: &str) -> Result<ParameterSet, AppError> {
    Ok(serde_json::from_str(text)?)
}
