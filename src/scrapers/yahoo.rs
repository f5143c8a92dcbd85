//! Yahoo Finance earnings calendar scraper.
//!
//! Columns are located by their header labels because Yahoo reorders them
//! between redesigns. When a page has no "Earnings Date" column, every row is
//! reported on the page's `day` query parameter, which is the window start.

use super::{CalendarWindow, EarningsSite, make_record, text_of};
use crate::dates::{format_date, parse_calendar_date};
use crate::error::ParseError;
use crate::models::{EarningsRecord, SourceId};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("valid selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

const DEFAULT_URL: &str = "https://finance.yahoo.com/calendar/earnings";

#[derive(Debug, Clone)]
pub struct Yahoo {
    url: String,
}

impl Default for Yahoo {
    fn default() -> Self {
        Self::with_url(DEFAULT_URL)
    }
}

impl Yahoo {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Column positions for one table.
#[derive(Debug, Clone, Copy)]
struct Columns {
    symbol: usize,
    company: usize,
    time: usize,
    date: Option<usize>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            symbol: 0,
            company: 1,
            time: 2,
            date: None,
        }
    }
}

impl Columns {
    fn from_headers(table: ElementRef<'_>) -> Self {
        let mut columns = Columns::default();
        for (i, th) in table.select(&HEADER).enumerate() {
            let label = text_of(th).to_lowercase();
            if label.starts_with("symbol") {
                columns.symbol = i;
            } else if label.starts_with("company") {
                columns.company = i;
            } else if label.contains("call time") || label.contains("start time") {
                columns.time = i;
            } else if label.contains("earnings date") {
                columns.date = Some(i);
            }
        }
        columns
    }

    fn max_index(&self) -> usize {
        [self.symbol, self.company, self.time, self.date.unwrap_or(0)]
            .into_iter()
            .max()
            .unwrap_or(0)
    }
}

impl EarningsSite for Yahoo {
    fn id(&self) -> SourceId {
        SourceId::Yahoo
    }

    fn calendar_url(&self, window: &CalendarWindow) -> String {
        format!(
            "{}?from={}&to={}&day={}",
            self.url,
            format_date(window.today),
            format_date(window.end),
            format_date(window.today)
        )
    }

    #[instrument(level = "debug", skip_all)]
    fn parse(
        &self,
        html: &str,
        window: &CalendarWindow,
    ) -> Result<Vec<EarningsRecord>, ParseError> {
        let document = Html::parse_document(html);
        let tables: Vec<_> = document.select(&TABLE).collect();
        if tables.is_empty() {
            return Err(ParseError::new(self.id().name(), "no earnings table on page"));
        }

        let mut records = Vec::new();
        for table in tables {
            let columns = Columns::from_headers(table);
            for row in table.select(&ROW) {
                let cells: Vec<_> = row.select(&CELL).collect();
                if cells.len() < 4 || cells.len() <= columns.max_index() {
                    continue;
                }
                let Some(ticker) = cells[columns.symbol].select(&LINK).next().map(text_of) else {
                    continue;
                };

                let report_date = match columns.date {
                    Some(i) => {
                        let raw = date_part(&text_of(cells[i]));
                        match parse_calendar_date(&raw, window.today) {
                            Some(date) => date,
                            None => continue,
                        }
                    }
                    None => window.today,
                };

                let company = text_of(cells[columns.company]);
                let time = text_of(cells[columns.time]);
                let record = make_record(self.id(), &ticker, &company, report_date, &time);
                records.extend(record);
            }
        }

        info!(count = records.len(), "Parsed Yahoo Finance calendar");
        Ok(records)
    }
}

/// "May 1, 2024, 4 PMEDT" → "May 1, 2024".
fn date_part(raw: &str) -> String {
    let parts: Vec<&str> = raw.splitn(3, ',').collect();
    match parts.as_slice() {
        [month_day, year, _rest] => format!("{},{}", month_day.trim(), year),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportTime;
    use chrono::NaiveDate;

    fn window() -> CalendarWindow {
        CalendarWindow::new(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), 7)
    }

    #[test]
    fn url_carries_window() {
        let url = Yahoo::default().calendar_url(&window());
        assert_eq!(
            url,
            "https://finance.yahoo.com/calendar/earnings?from=2024-04-30&to=2024-05-07&day=2024-04-30"
        );
    }

    #[test]
    fn maps_columns_by_header() {
        let html = r#"
<table>
  <thead><tr><th>Symbol</th><th>Company</th><th>Earnings Date</th><th>Earnings Call Time</th><th>EPS Estimate</th></tr></thead>
  <tbody>
    <tr><td><a href="/quote/AAPL">AAPL</a></td><td>Apple Inc.</td><td>May 2, 2024, 4 PMEDT</td><td>After Market Close</td><td>1.50</td></tr>
    <tr><td><a href="/quote/XOM">XOM</a></td><td>Exxon Mobil Corp</td><td>not a date</td><td>Before Market Open</td><td>2.10</td></tr>
    <tr><td>no link</td><td>Skipped</td><td>May 2, 2024</td><td>TAS</td><td>-</td></tr>
  </tbody>
</table>"#;
        let records = Yahoo::default().parse(html, &window()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "AAPL");
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(records[0].report_time, ReportTime::AfterMarket);
    }

    #[test]
    fn without_date_column_uses_page_day() {
        let html = r#"
<table>
  <tr><th>Symbol</th><th>Company</th><th>Event Start Time</th><th>EPS Estimate</th></tr>
  <tr><td><a>msft</a></td><td>Microsoft Corporation</td><td>AMC</td><td>2.82</td></tr>
</table>"#;
        let records = Yahoo::default().parse(html, &window()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "MSFT");
        assert_eq!(records[0].report_date, window().today);
    }

    #[test]
    fn page_without_tables_is_parse_error() {
        assert!(Yahoo::default().parse("<html><body>consent</body></html>", &window()).is_err());
    }

    #[test]
    fn splits_date_from_time() {
        assert_eq!(date_part("May 1, 2024, 4 PMEDT"), "May 1, 2024");
        assert_eq!(date_part("May 1, 2024"), "May 1, 2024");
    }
}
