//! # EarningsRadar
//!
//! Command-line host for the earnings calendar and news aggregator.
//!
//! ## Usage
//!
//! ```sh
//! earnings_radar calendar --days 14 --format csv --output earnings.csv
//! earnings_radar news AAPL --max 5
//! earnings_radar stats --days 30 --popular
//! earnings_radar validate AAPL BRK.B 123456
//! ```
//!
//! ## Logging
//!
//! Logs go to stderr and, unless disabled in the config, are appended to a
//! log file (`earnings_radar.log` by default). `RUST_LOG` controls the level.

use chrono::NaiveDate;
use clap::Parser;
use earnings_radar::outputs::{csv, ical, json, table, write_output};
use earnings_radar::{
    CalendarReport, Clock, DateRange, EarningsAggregator, EarningsRecord, HttpFetcher, NewsFetcher,
    RadarConfig, RetryFetch, SystemClock, calendar_summary, filter_records, popular_tickers,
};
use itertools::Itertools;
use std::error::Error;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{
    CalendarArgs, CalendarFormat, Cli, Command, NewsArgs, NewsFormat, SelectArgs, StatsArgs,
    StatsFormat,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => RadarConfig::load(path)?,
        None => RadarConfig::default(),
    };

    init_tracing(args.log_file.as_deref().or(config.log_file.as_deref()));

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "earnings_radar starting up");
    debug!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Calendar(calendar_args) => run_calendar(&config, calendar_args).await?,
        Command::Stats(stats_args) => run_stats(&config, stats_args).await?,
        Command::News(news_args) => run_news(&config, news_args).await?,
        Command::Validate { symbols } => run_validate(&symbols),
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}

/// stderr layer plus an optional append-only file layer.
fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tfmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339());

    let mut open_error = None;
    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                tfmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(UtcTime::rfc_3339()),
            ),
            Err(e) => {
                open_error = Some((path.to_string(), e));
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some((path, e)) = open_error {
        warn!(%path, error = %e, "Could not open log file; logging to stderr only");
    }
}

fn build_fetcher(config: &RadarConfig) -> Result<RetryFetch<HttpFetcher>, Box<dyn Error>> {
    let http = HttpFetcher::new(&config.fetch)?;
    Ok(RetryFetch::new(
        http,
        config.fetch.max_retries,
        config.fetch.retry_base_delay(),
    ))
}

/// Calendar records after the selection filters, plus the unfiltered report.
struct Selection {
    report: CalendarReport,
    records: Vec<EarningsRecord>,
    today: NaiveDate,
}

async fn select_records(
    config: &RadarConfig,
    args: &SelectArgs,
) -> Result<Selection, Box<dyn Error>> {
    let date_range = match (args.from, args.to) {
        (None, None) => None,
        (from, to) => Some(DateRange::new(
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(NaiveDate::MAX),
        )?),
    };

    let clock = Arc::new(SystemClock);
    let aggregator =
        EarningsAggregator::from_config(build_fetcher(config)?, config, clock.clone())?;
    let report = aggregator.get_earnings_calendar(args.days, args.refresh).await;

    if let Some(degraded) = report.degraded() {
        warn!(error = %degraded, "Earnings data unavailable");
    } else if !report.failed_sources().is_empty() {
        warn!(
            failed = ?report.failed_sources(),
            "Some earnings sources failed; showing partial results"
        );
    }

    let mut tickers = args.tickers.clone();
    if args.popular {
        let available: Vec<String> =
            report.records.iter().map(|r| r.ticker.clone()).unique().collect();
        let popular = popular_tickers(&available);
        debug!(?popular, "Applied popular ticker preset");
        tickers.extend(popular);
    }

    let records = filter_records(&report.records, &tickers, date_range, args.search.as_deref());
    info!(total = report.records.len(), shown = records.len(), "Filtered earnings calendar");
    Ok(Selection {
        report,
        records,
        today: clock.today(),
    })
}

#[instrument(
    level = "info",
    skip_all,
    fields(days = args.select.days, refresh = args.select.refresh)
)]
async fn run_calendar(config: &RadarConfig, args: CalendarArgs) -> Result<(), Box<dyn Error>> {
    let Selection { report, records, today } = select_records(config, &args.select).await?;

    let content = match args.format {
        CalendarFormat::Table if records.is_empty() => {
            if report.is_degraded() {
                "Earnings data unavailable: every source failed. Try again later.".to_string()
            } else {
                "No earnings found for the selected filters.".to_string()
            }
        }
        CalendarFormat::Table => table::records_table(&records, today),
        CalendarFormat::Json => json::report_to_json(&CalendarReport {
            records,
            source_status: report.source_status.clone(),
        })?,
        CalendarFormat::Csv => csv::records_to_csv(&records)?,
        CalendarFormat::Ics => ical::records_to_ical(&records, SystemClock.now()),
    };

    write_output(args.output.as_deref(), &content).await?;
    Ok(())
}

#[instrument(
    level = "info",
    skip_all,
    fields(days = args.select.days, popular = args.select.popular)
)]
async fn run_stats(config: &RadarConfig, args: StatsArgs) -> Result<(), Box<dyn Error>> {
    let selection = select_records(config, &args.select).await?;
    let summary = calendar_summary(&selection.records, selection.today);

    let content = match args.format {
        StatsFormat::Table => table::summary_table(&summary),
        StatsFormat::Json => json::summary_to_json(&summary)?,
    };
    write_output(args.output.as_deref(), &content).await?;
    Ok(())
}

#[instrument(level = "info", skip_all, fields(tickers = ?args.tickers, max = args.max))]
async fn run_news(config: &RadarConfig, args: NewsArgs) -> Result<(), Box<dyn Error>> {
    let news = NewsFetcher::from_config(build_fetcher(config)?, config, Arc::new(SystemClock))?;
    let articles = match args.tickers.as_slice() {
        [ticker] => news.try_get_news(ticker, args.max).await?,
        tickers => news.get_news_for_tickers(tickers, args.max).await,
    };

    let content = match args.format {
        NewsFormat::Table if articles.is_empty() => {
            format!("No recent news found for {}.", args.tickers.join(", "))
        }
        NewsFormat::Table => table::articles_table(&articles),
        NewsFormat::Json => json::articles_to_json(&articles)?,
    };
    write_output(None, &content).await?;
    Ok(())
}

fn run_validate(symbols: &[String]) {
    for symbol in symbols {
        match earnings_radar::filters::parse_ticker(symbol) {
            Ok(cleaned) => println!("{symbol}\tvalid\t{cleaned}"),
            Err(e) => println!("{symbol}\tinvalid\t{e}"),
        }
    }
}
