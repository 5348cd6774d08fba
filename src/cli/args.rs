use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::parse_lenient_date;

#[derive(Parser)]
#[command(name = "heatcast")]
#[command(about = "Weather history sync and multi-day heat-risk forecasting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: heatcast.toml if present]"
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only log warnings and hide progress bars"
    )]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the days missing between the store's last date and yesterday
    Sync {
        #[arg(long, value_parser = parse_cli_date, help = "Treat this date as today [default: local date]")]
        today: Option<NaiveDate>,
    },

    /// Forecast every location in the store
    Forecast {
        #[arg(
            long,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Days to forecast [default: forecast.horizon]"
        )]
        horizon: Option<u64>,

        #[arg(short, long, default_value = "json", help = "Output format (json or csv)")]
        format: String,

        #[arg(
            short,
            long,
            help = "Output file, '-' for stdout [default: output/heatcast-forecast-{YYMMDD}.{ext}]"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Synchronize the store before forecasting")]
        sync: bool,

        #[arg(long, value_parser = parse_cli_date, requires = "sync", help = "Treat this date as today when syncing")]
        today: Option<NaiveDate>,
    },

    /// Score the models on the most recent days of the store
    Evaluate {
        #[arg(
            long,
            value_parser = clap::value_parser!(i64).range(1..),
            help = "Hold-out window in days [default: forecast.holdout_days]"
        )]
        holdout_days: Option<i64>,
    },

    /// Compute the heat index and risk level for one reading
    HeatIndex {
        #[arg(long, allow_hyphen_values = true, help = "Air temperature in °C")]
        temp: f64,

        #[arg(long, help = "Relative humidity in percent")]
        humidity: f64,
    },
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    parse_lenient_date(s).ok_or_else(|| format!("unrecognized date: '{}'", s))
}
