//! MarketWatch earnings calendar scraper.
//!
//! The page holds one tab pane per day (`div[data-tab-pane="05/01/2024"]`),
//! each wrapping a table of `[ticker, company, time, ...]` rows. Older
//! layouts drop the pane and put the day in the table `caption` instead.

use super::{CalendarWindow, EarningsSite, make_record, text_of};
use crate::dates::parse_calendar_date;
use crate::error::ParseError;
use crate::models::{EarningsRecord, SourceId};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("valid selector"));
static CAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("caption").expect("valid selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

const DEFAULT_URL: &str = "https://www.marketwatch.com/tools/earnings-calendar";

#[derive(Debug, Clone)]
pub struct MarketWatch {
    url: String,
}

impl Default for MarketWatch {
    fn default() -> Self {
        Self::with_url(DEFAULT_URL)
    }
}

impl MarketWatch {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl EarningsSite for MarketWatch {
    fn id(&self) -> SourceId {
        SourceId::MarketWatch
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
        let tables: Vec<_> = document.select(&TABLE).collect();
        if tables.is_empty() {
            return Err(ParseError::new(self.id().name(), "no earnings tables on page"));
        }

        let mut records = Vec::new();
        for table in tables {
            let Some(date) = table_date(table, window.today) else {
                debug!("MarketWatch table without a usable date; skipping");
                continue;
            };

            for row in table.select(&ROW) {
                let cells: Vec<_> = row.select(&CELL).collect();
                if cells.len() < 3 {
                    continue;
                }
                let ticker = cells[0]
                    .select(&LINK)
                    .next()
                    .map(text_of)
                    .unwrap_or_else(|| text_of(cells[0]));
                let company = text_of(cells[1]);
                let time = text_of(cells[2]);
                if let Some(record) = make_record(self.id(), &ticker, &company, date, &time) {
                    records.push(record);
                }
            }
        }

        info!(count = records.len(), "Parsed MarketWatch calendar");
        Ok(records)
    }
}

/// Date of the nearest enclosing tab pane, else the table caption.
fn table_date(table: ElementRef<'_>, today: NaiveDate) -> Option<NaiveDate> {
    let pane = table
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find_map(|el| el.value().attr("data-tab-pane"))
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").ok());

    pane.or_else(|| {
        table
            .select(&CAPTION)
            .next()
            .and_then(|caption| parse_calendar_date(&text_of(caption), today))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportTime;

    fn window() -> CalendarWindow {
        CalendarWindow::new(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), 14)
    }

    #[test]
    fn reads_dates_from_tab_panes() {
        let html = r#"
<div class="tab__pane" data-tab-pane="05/01/2024">
  <table>
    <thead><tr><th>Symbol</th><th>Company</th><th>Time</th></tr></thead>
    <tbody>
      <tr><td><a href="/investing/stock/amd">AMD</a></td><td>Advanced Micro Devices Inc.</td><td>After Close</td></tr>
      <tr><td>MA</td><td>Mastercard Inc.</td><td>Before Open</td></tr>
    </tbody>
  </table>
</div>
<div class="tab__pane" data-tab-pane="05/02/2024">
  <table><tr><td>SQ</td><td>Block Inc.</td><td>--</td></tr></table>
</div>"#;
        let records = MarketWatch::default().parse(html, &window()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].ticker, "AMD");
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(records[0].report_time, ReportTime::AfterMarket);
        assert_eq!(records[1].ticker, "MA");
        assert_eq!(records[1].report_time, ReportTime::BeforeMarket);
        assert_eq!(records[2].report_date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(records[2].report_time, ReportTime::Unknown);
    }

    #[test]
    fn falls_back_to_caption() {
        let html = r#"<table><caption>Friday, May 3, 2024</caption>
<tr><td>CBOE</td><td>Cboe Global Markets</td><td>Before Open</td></tr></table>"#;
        let records = MarketWatch::default().parse(html, &window()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    }

    #[test]
    fn undated_table_is_skipped() {
        let html = r#"<table><tr><td>CBOE</td><td>Cboe</td><td>BMO</td></tr></table>"#;
        let records = MarketWatch::default().parse(html, &window()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn page_without_tables_is_parse_error() {
        let err = MarketWatch::default().parse("<p>blocked</p>", &window()).unwrap_err();
        assert_eq!(err.source_name, "marketwatch");
    }
}
