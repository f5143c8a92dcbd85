//! Finviz earnings calendar scraper.
//!
//! Finviz renders the calendar as one table. A row holding a single
//! `td[colspan]` is a day header ("Monday, February 5th"); the rows under it
//! are `[time, ticker link, company]` until the next header.

use super::{CalendarWindow, EarningsSite, make_record, text_of};
use crate::dates::parse_calendar_date;
use crate::error::ParseError;
use crate::models::{EarningsRecord, SourceId};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

static CALENDAR_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.calendar").expect("valid selector"));
static FALLBACK_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r##"table[bgcolor="#d3d3d3"]"##).expect("valid selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

const DEFAULT_URL: &str = "https://finviz.com/calendar.ashx";

#[derive(Debug, Clone)]
pub struct Finviz {
    url: String,
}

impl Default for Finviz {
    fn default() -> Self {
        Self::with_url(DEFAULT_URL)
    }
}

impl Finviz {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl EarningsSite for Finviz {
    fn id(&self) -> SourceId {
        SourceId::Finviz
    }

    fn calendar_url(&self, _window: &CalendarWindow) -> String {
        self.url.clone()
    }

    #[instrument(level = "debug", skip_all)]
    fn parse(
        &self,
        html: &str,
        window: &CalendarWindow,
    ) -> Result<Vec<EarningsRecord>, ParseError> {
        let document = Html::parse_document(html);
        let table = document
            .select(&CALENDAR_TABLE)
            .next()
            .or_else(|| document.select(&FALLBACK_TABLE).next())
            .ok_or_else(|| ParseError::new(self.id().name(), "calendar table not found"))?;

        let mut records = Vec::new();
        let mut current_date = None;

        for row in table.select(&ROW) {
            let cells: Vec<_> = row.select(&CELL).collect();

            if cells.len() == 1 && cells[0].value().attr("colspan").is_some() {
                let header = text_of(cells[0]);
                current_date = parse_calendar_date(&header, window.today);
                if current_date.is_none() {
                    debug!(%header, "Unparseable Finviz date header; skipping its rows");
                }
                continue;
            }

            let Some(date) = current_date else { continue };
            if cells.len() < 3 {
                continue;
            }
            let Some(ticker) = cells[1].select(&LINK).next().map(text_of) else {
                continue;
            };

            let time = text_of(cells[0]);
            let company = text_of(cells[2]);
            if let Some(record) = make_record(self.id(), &ticker, &company, date, &time) {
                records.push(record);
            }
        }

        info!(count = records.len(), "Parsed Finviz calendar");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportTime;
    use chrono::NaiveDate;

    fn window() -> CalendarWindow {
        CalendarWindow::new(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 30)
    }

    const PAGE: &str = r#"
<html><body>
<table class="calendar">
  <tr><td colspan="3">Monday, February 5th</td></tr>
  <tr><td>BMO</td><td><a href="/quote.ashx?t=cat">cat</a></td><td> Caterpillar  Inc. </td></tr>
  <tr><td>AMC</td><td><a href="/quote.ashx?t=pltr">PLTR</a></td><td>Palantir Technologies</td></tr>
  <tr><td>AMC</td><td>no link here</td><td>Skipped Corp</td></tr>
  <tr><td colspan="3">Tuesday, February 6th</td></tr>
  <tr><td>AMC</td><td><a href="/quote.ashx?t=cmg">CMG</a></td><td>Chipotle</td></tr>
</table>
</body></html>"#;

    #[test]
    fn parses_rows_under_date_headers() {
        let records = Finviz::default().parse(PAGE, &window()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].ticker, "CAT");
        assert_eq!(records[0].company_name, "Caterpillar Inc.");
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        assert_eq!(records[0].report_time, ReportTime::BeforeMarket);
        assert_eq!(records[0].source, SourceId::Finviz);

        assert_eq!(records[2].ticker, "CMG");
        assert_eq!(records[2].report_date, NaiveDate::from_ymd_opt(2024, 2, 6).unwrap());
        assert_eq!(records[2].report_time, ReportTime::AfterMarket);
    }

    #[test]
    fn rows_before_first_header_and_under_bad_headers_are_skipped() {
        let html = r##"
<table bgcolor="#d3d3d3">
  <tr><td>BMO</td><td><a>AAPL</a></td><td>Apple</td></tr>
  <tr><td colspan="3">Someday soon</td></tr>
  <tr><td>BMO</td><td><a>MSFT</a></td><td>Microsoft</td></tr>
</table>"##;
        let records = Finviz::default().parse(html, &window()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_table_is_parse_error() {
        let err = Finviz::default()
            .parse("<html><body><p>Access denied</p></body></html>", &window())
            .unwrap_err();
        assert_eq!(err.source_name, "finviz");
    }

    #[test]
    fn empty_table_is_empty_result() {
        let records = Finviz::default()
            .parse(r#"<table class="calendar"></table>"#, &window())
            .unwrap();
        assert!(records.is_empty());
    }
}
