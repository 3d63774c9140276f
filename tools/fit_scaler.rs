//! Scaler Fitting Tool
//!
//! Fits the standard scaler on the 20 model features of the training dataset
//! and writes it where the inference server looks for it. Run once per
//! dataset or feature-schema change.

use anyhow::{Context, Result};
use clap::Parser;
use fitlab_inference::{scaler_fit::fit_from_csv, FEATURE_SCHEMA};
use std::fs::File;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "fit-scaler", about = "Fit the feature-subset scaler for the inference server")]
struct Args {
    /// Training dataset (CSV with a header row)
    #[arg(long, default_value = "AI/Dataset/Final_data.csv")]
    data: PathBuf,

    /// Where to write the fitted scaler
    #[arg(long, default_value = "AI/top20_scaler.json")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fit_scaler=info".parse()?)
                .add_directive("fitlab_inference=info".parse()?),
        )
        .init();

    let args = Args::parse();

    info!(path = %args.data.display(), "Loading dataset");
    let file = File::open(&args.data)
        .with_context(|| format!("Failed to open dataset {}", args.data.display()))?;

    let fit = fit_from_csv(file, &FEATURE_SCHEMA)?;
    if fit.scaler.n_features() != FEATURE_SCHEMA.len() {
        warn!(
            fitted = fit.scaler.n_features(),
            expected = FEATURE_SCHEMA.len(),
            "Scaler does not cover the full feature schema, predictions will report a dimension mismatch"
        );
    }

    fit.scaler.save(&args.output)?;
    info!(path = %args.output.display(), "Scaler saved");
    info!(
        features = fit.scaler.n_features(),
        rows = fit.rows,
        "Scaler fitted on {} features",
        fit.scaler.n_features()
    );

    Ok(())
}
