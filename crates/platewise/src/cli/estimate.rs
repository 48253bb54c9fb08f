//! The `platewise estimate` command: one-shot estimate of a local image.

use clap::Args;
use platewise_core::{Config, EstimateInput, Estimator};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the `estimate` command.
#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Image file to estimate
    #[arg(required = true)]
    pub image: PathBuf,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the estimate command.
pub async fn execute(args: EstimateArgs, config: Config) -> anyhow::Result<()> {
    let start = Instant::now();
    let estimator = Estimator::load(&config).await?;
    tracing::debug!("Models loaded in {:?}", start.elapsed());

    let result = estimator
        .estimate_input(EstimateInput::from_path(&args.image))
        .await?;
    tracing::info!(
        "{} -> {} ({:?})",
        args.image.display(),
        result.dish_name,
        start.elapsed()
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}
