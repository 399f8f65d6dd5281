use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "rental-explorer", version, about = "Explore short-term rental listings")]
pub struct Cli {
    /// Listings file (.csv.gz, .csv or .parquet); overrides the config file
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolve the effective configuration: defaults, then the config file,
    /// then command-line overrides.
    pub fn into_config(self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(data) = self.data {
            config.data_path = data;
        }
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Listings file loaded at startup.
    pub data_path: PathBuf,
    /// Neighbourhoods selected on first render, when present in the data.
    pub preferred_neighbourhoods: Vec<String>,
    /// Quantile used as the default upper price bound.
    pub price_quantile: f64,
    /// Maximum rows shown in the detail table.
    pub table_row_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/listings.csv.gz"),
            preferred_neighbourhoods: vec![
                "Centro".to_string(),
                "Salamanca".to_string(),
                "Chamberí".to_string(),
            ],
            price_quantile: 0.99,
            table_row_limit: 100,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        anyhow::ensure!(
            (0.0..=1.0).contains(&config.price_quantile),
            "price_quantile must be within 0..=1, got {}",
            config.price_quantile
        );
        Ok(config)
    }
}
