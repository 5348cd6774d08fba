use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::analyzers::{ForecastAnalyzer, HeatRiskDeriver};
use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::models::{FailureDiagnostic, ForecastRecord, ObservationStore};
use crate::processors::{Evaluator, ForecastContext, ForecastEngine, GapSynchronizer};
use crate::regression::ModelSet;
use crate::sources::VisualCrossingSource;
use crate::utils::generate_default_forecast_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::{ForecastWriter, OutputFormat};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::HeatIndex { temp, humidity } => {
            let (index, level) = HeatRiskDeriver::new().assess(temp, humidity);
            println!("Heat index: {}°C ({})", index, level);
        }

        Commands::Sync { today } => {
            let config = load_config(cli.config.as_deref())?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            run_sync(&config, today, cli.quiet).await?;
        }

        Commands::Forecast {
            horizon,
            format,
            output,
            sync,
            today,
        } => {
            let format = OutputFormat::parse(&format)?;
            let config = load_config(cli.config.as_deref())?;

            if sync {
                let today = today.unwrap_or_else(|| Local::now().date_naive());
                run_sync(&config, today, cli.quiet).await?;
            }

            let store = load_store(&config.store.path)?;
            let models = load_models(&config.models.dir)?;
            let context = ForecastContext::for_store(models, &store)
                .with_horizon(horizon.map_or(config.forecast.horizon, |h| h as usize));

            let progress = ProgressReporter::new_spinner("Forecasting...", cli.quiet);
            let batch = ForecastEngine::new(&context)
                .with_max_workers(config.workers)
                .forecast_store(&store)
                .context("Forecast run failed")?;

            let records: Vec<ForecastRecord> = batch.successes.into_iter().flatten().collect();
            let errors: Vec<FailureDiagnostic> =
                batch.failures.iter().map(FailureDiagnostic::from).collect();
            progress.finish_with_message(&format!(
                "Forecast {} records, {} locations failed",
                records.len(),
                errors.len()
            ));

            let writer = ForecastWriter::new(format);
            let to_stdout = output.as_deref() == Some(Path::new("-"));
            if to_stdout {
                writer.write_to(&records, &errors, std::io::stdout().lock())?;
            } else {
                let path: PathBuf =
                    output.unwrap_or_else(|| generate_default_forecast_filename(format.extension()));
                writer
                    .write_file(&records, &errors, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), records = records.len(), "Wrote forecast");

                println!("\n{}", ForecastAnalyzer::new().analyze(&records).summary());
                for error in &errors {
                    println!("⚠️  {}: {}", error.unit, error.error);
                }
                println!("\nForecast written to {}", path.display());
            }
        }

        Commands::Evaluate { holdout_days } => {
            let config = load_config(cli.config.as_deref())?;
            let store = load_store(&config.store.path)?;
            let models = load_models(&config.models.dir)?;
            let context = ForecastContext::for_store(models, &store);

            let report = Evaluator::new(&context)
                .with_holdout_days(holdout_days.unwrap_or(config.forecast.holdout_days))
                .evaluate(&store)
                .context("Evaluation failed")?;

            println!("{}", report.summary());
        }
    }

    Ok(())
}

async fn run_sync(config: &AppConfig, today: NaiveDate, quiet: bool) -> Result<()> {
    let source = VisualCrossingSource::new(config.source.base_url.clone(), config.api_key()?)
        .with_unit_group(config.source.unit_group.clone());
    let synchronizer = GapSynchronizer::new(Arc::new(source), config.locations.clone())
        .with_max_workers(config.workers);

    let progress = ProgressReporter::new(0, "Fetching missing days...", quiet);
    let report = synchronizer
        .synchronize_file(&config.store.path, today, Some(&progress))
        .await
        .with_context(|| format!("Failed to synchronize {}", config.store.path.display()))?;
    progress.finish_with_message("Synchronization complete");

    println!("{}", report.summary());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = AppConfig::load(path).context("Failed to load configuration")?;
    debug!(
        store = %config.store.path.display(),
        models = %config.models.dir.display(),
        workers = config.workers,
        "Loaded configuration"
    );
    Ok(config)
}

fn load_store(path: &Path) -> Result<ObservationStore> {
    let store = ObservationStore::load(path)
        .with_context(|| format!("Failed to load observation store {}", path.display()))?;
    info!(rows = store.len(), locations = store.locations().len(), "Loaded observation store");
    Ok(store)
}

fn load_models(dir: &Path) -> Result<ModelSet> {
    ModelSet::load_dir(dir).with_context(|| format!("Failed to load models from {}", dir.display()))
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "heatcast=debug"
    } else if quiet {
        "heatcast=warn"
    } else {
        "heatcast=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded.
    if let Err(error) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        debug!(%error, "Keeping the existing tracing subscriber");
    }
}
