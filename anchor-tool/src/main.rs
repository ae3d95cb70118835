use anchor_tool::config::Config;
use anyhow::{Context, Result};
use clap::Parser;
use std::{
    env,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
/// Estimate anchor boxes by IoU k-means clustering
enum Opts {
    /// Cluster box shapes into k anchors
    Cluster {
        #[clap(long, default_value = "anchors.json5")]
        /// configuration file
        config_file: PathBuf,
        #[clap(long)]
        /// override the number of anchors
        k: Option<NonZeroUsize>,
        #[clap(long)]
        /// override the random seed
        seed: Option<u64>,
    },
    /// Cluster box shapes for a range of k and compare mean IoU
    Sweep {
        #[clap(long, default_value = "anchors.json5")]
        /// configuration file
        config_file: PathBuf,
        #[clap(long, default_value = "1")]
        /// the smallest k
        min_k: usize,
        #[clap(long)]
        /// the largest k
        max_k: usize,
    },
}

#[tokio::main]
pub async fn main() -> Result<()> {
    // setup tracing
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).compact();
    let filter_layer = {
        let filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            filter.add_directive(LevelFilter::INFO.into())
        } else {
            filter
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    // parse arguments
    match Opts::parse() {
        Opts::Cluster {
            config_file,
            k,
            seed,
        } => {
            let mut config = open_config(&config_file)?;
            if let Some(k) = k {
                config.clustering.k = k;
            }
            if let Some(seed) = seed {
                config.clustering.seed = Some(seed);
            }
            anchor_tool::cluster(Arc::new(config)).await?;
        }
        Opts::Sweep {
            config_file,
            min_k,
            max_k,
        } => {
            let config = open_config(&config_file)?;
            anchor_tool::sweep(Arc::new(config), min_k..=max_k).await?;
        }
    }

    Ok(())
}

fn open_config(config_file: &Path) -> Result<Config> {
    Config::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))
}
