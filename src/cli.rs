//! Command-line interface definitions for EarningsRadar.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. Global options can also be provided via environment variables.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for the EarningsRadar application.
///
/// # Examples
///
/// ```sh
/// # Next two weeks of earnings as a table
/// earnings_radar calendar --days 14
///
/// # Only a few tickers, exported for a calendar app
/// earnings_radar calendar --ticker AAPL --ticker MSFT --format ics --output earnings.ics
///
/// # Latest news for one ticker, or merged news for several
/// earnings_radar news NVDA --max 5
/// earnings_radar news AAPL MSFT GOOGL
///
/// # Headline counts for the popular tickers reporting this month
/// earnings_radar stats --days 30 --popular
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "EARNINGS_RADAR_CONFIG")]
    pub config: Option<String>,

    /// Append logs to this file in addition to stderr
    #[arg(long, global = true, env = "EARNINGS_RADAR_LOG_FILE")]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show upcoming earnings from all configured sources
    Calendar(CalendarArgs),

    /// Show headline counts and day-of-week/date breakdowns
    Stats(StatsArgs),

    /// Show recent news for one or more tickers
    News(NewsArgs),

    /// Check whether ticker symbols are well formed
    Validate {
        /// Symbols to check
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

/// Which earnings records a calendar-based command looks at.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Days ahead of today to include
    #[arg(short, long, default_value_t = 7)]
    pub days: i64,

    /// Ignore cached results and fetch again
    #[arg(long)]
    pub refresh: bool,

    /// Only show these tickers (repeatable)
    #[arg(short, long = "ticker")]
    pub tickers: Vec<String>,

    /// Add the popular-tickers preset to the ticker selection
    #[arg(long)]
    pub popular: bool,

    /// Case-insensitive company name or ticker search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Earliest report date to show (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest report date to show (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct CalendarArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    #[arg(short, long, value_enum, default_value_t = CalendarFormat::Table)]
    pub format: CalendarFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    #[arg(short, long, value_enum, default_value_t = StatsFormat::Table)]
    pub format: StatsFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Args, Debug)]
pub struct NewsArgs {
    /// Ticker symbols; several are merged into one list
    #[arg(required = true)]
    pub tickers: Vec<String>,

    /// Maximum number of articles per ticker
    #[arg(short, long, default_value_t = 10)]
    pub max: usize,

    #[arg(short, long, value_enum, default_value_t = NewsFormat::Table)]
    pub format: NewsFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarFormat {
    Table,
    Json,
    Csv,
    Ics,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsFormat {
    Table,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_defaults() {
        let cli = Cli::parse_from(["earnings_radar", "calendar"]);
        let Command::Calendar(args) = cli.command else {
            panic!("expected calendar subcommand");
        };
        assert_eq!(args.select.days, 7);
        assert!(!args.select.refresh);
        assert!(!args.select.popular);
        assert!(args.select.tickers.is_empty());
        assert_eq!(args.format, CalendarFormat::Table);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_calendar_filters_and_export() {
        let cli = Cli::parse_from([
            "earnings_radar",
            "--config",
            "radar.yaml",
            "calendar",
            "-d",
            "14",
            "--ticker",
            "AAPL",
            "-t",
            "msft",
            "--from",
            "2024-05-01",
            "--to",
            "2024-05-10",
            "--format",
            "ics",
            "-o",
            "earnings.ics",
            "--refresh",
        ]);
        assert_eq!(cli.config.as_deref(), Some("radar.yaml"));
        let Command::Calendar(args) = cli.command else {
            panic!("expected calendar subcommand");
        };
        assert_eq!(args.select.days, 14);
        assert_eq!(args.select.tickers, vec!["AAPL", "msft"]);
        assert_eq!(args.select.from, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(args.select.to, NaiveDate::from_ymd_opt(2024, 5, 10));
        assert_eq!(args.format, CalendarFormat::Ics);
        assert_eq!(args.output.as_deref(), Some("earnings.ics"));
        assert!(args.select.refresh);
    }

    #[test]
    fn test_stats_shares_selection_flags() {
        let cli = Cli::parse_from([
            "earnings_radar", "stats", "--days", "30", "--popular", "-f", "json",
        ]);
        let Command::Stats(args) = cli.command else {
            panic!("expected stats subcommand");
        };
        assert_eq!(args.select.days, 30);
        assert!(args.select.popular);
        assert_eq!(args.format, StatsFormat::Json);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_news_and_global_flag_after_subcommand() {
        let cli = Cli::parse_from([
            "earnings_radar", "news", "nvda", "--max", "3", "--log-file", "radar.log",
        ]);
        assert_eq!(cli.log_file.as_deref(), Some("radar.log"));
        let Command::News(args) = cli.command else {
            panic!("expected news subcommand");
        };
        assert_eq!(args.tickers, vec!["nvda"]);
        assert_eq!(args.max, 3);
        assert_eq!(args.format, NewsFormat::Table);
    }

    #[test]
    fn test_news_takes_several_tickers() {
        assert!(Cli::try_parse_from(["earnings_radar", "news"]).is_err());
        let cli = Cli::parse_from(["earnings_radar", "news", "AAPL", "MSFT", "-f", "json"]);
        let Command::News(args) = cli.command else {
            panic!("expected news subcommand");
        };
        assert_eq!(args.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(args.format, NewsFormat::Json);
    }

    #[test]
    fn test_validate_requires_symbols() {
        assert!(Cli::try_parse_from(["earnings_radar", "validate"]).is_err());
        let cli = Cli::parse_from(["earnings_radar", "validate", "AAPL", "123456"]);
        assert!(matches!(cli.command, Command::Validate { symbols } if symbols.len() == 2));
    }
}
