//! Investing.com earnings calendar scraper.
//!
//! The calendar table interleaves `td.theDay` rows ("Wednesday, May 1, 2024")
//! with company rows. The ticker is not in its own column: it appears in the
//! company link's `title` ("Apple Inc (AAPL)") or in the cell text.

use super::{CalendarWindow, EarningsSite, make_record, text_of};
use crate::dates::parse_calendar_date;
use crate::error::ParseError;
use crate::models::{EarningsRecord, SourceId};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, instrument};

static CALENDAR_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table#earningsCalendarData").expect("valid selector"));
static FALLBACK_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.genTbl").expect("valid selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static DAY_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.theDay").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));
static TOOLTIP: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[data-tooltip]").expect("valid selector"));
static PAREN_TICKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([A-Za-z0-9.\-]{1,8})\)").expect("valid ticker regex"));

const DEFAULT_URL: &str = "https://www.investing.com/earnings-calendar/";

#[derive(Debug, Clone)]
pub struct Investing {
    url: String,
}

impl Default for Investing {
    fn default() -> Self {
        Self::with_url(DEFAULT_URL)
    }
}

impl Investing {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl EarningsSite for Investing {
    fn id(&self) -> SourceId {
        SourceId::Investing
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
            .ok_or_else(|| ParseError::new(self.id().name(), "earnings table not found"))?;

        let mut records = Vec::new();
        let mut current_date = None;

        for row in table.select(&ROW) {
            if let Some(day) = row.select(&DAY_CELL).next() {
                current_date = parse_calendar_date(&text_of(day), window.today);
                continue;
            }

            let cells: Vec<_> = row.select(&CELL).collect();
            if cells.len() < 4 {
                continue;
            }
            let Some(date) = current_date else { continue };
            let Some(link) = cells[1].select(&LINK).next() else {
                continue;
            };

            let company = company_name(cells[1], link);
            if company.is_empty() {
                continue;
            }
            let Some(ticker) = ticker_for(link, cells[1], cells[0]) else {
                continue;
            };
            let time = time_label(row, &cells);

            if let Some(record) = make_record(self.id(), &ticker, &company, date, &time) {
                records.push(record);
            }
        }

        info!(count = records.len(), "Parsed Investing.com calendar");
        Ok(records)
    }
}

/// Company cell text without the "(TICK)" suffix, else the link text.
fn company_name(cell: ElementRef<'_>, link: ElementRef<'_>) -> String {
    let text = text_of(cell);
    let stripped = PAREN_TICKER.replace_all(&text, "");
    let stripped = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if stripped.is_empty() {
        text_of(link)
    } else {
        stripped
    }
}

/// Ticker from the link title, then the company cell text, then a short first cell.
fn ticker_for(
    link: ElementRef<'_>,
    company_cell: ElementRef<'_>,
    first_cell: ElementRef<'_>,
) -> Option<String> {
    let from_parens = |s: &str| {
        PAREN_TICKER
            .captures_iter(s)
            .last()
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    link.value()
        .attr("title")
        .and_then(from_parens)
        .or_else(|| from_parens(&text_of(company_cell)))
        .or_else(|| {
            let first = text_of(first_cell);
            (!first.is_empty() && first.len() <= 5).then_some(first)
        })
}

fn time_label(row: ElementRef<'_>, cells: &[ElementRef<'_>]) -> String {
    row.select(&TOOLTIP)
        .next()
        .and_then(|el| el.value().attr("data-tooltip"))
        .map(str::to_string)
        .unwrap_or_else(|| text_of(cells[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportTime;
    use chrono::NaiveDate;

    fn window() -> CalendarWindow {
        CalendarWindow::new(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), 30)
    }

    const PAGE: &str = r#"
<table id="earningsCalendarData">
  <thead><tr><th>Country</th><th>Company</th><th>EPS</th><th>Time</th></tr></thead>
  <tbody>
    <tr><td colspan="9" class="theDay">Wednesday, May 1, 2024</td></tr>
    <tr>
      <td class="flag"></td>
      <td class="earnCalCompany" title="Apple Inc"><span>Apple</span> (<a href="/equities/apple" title="Apple Inc (AAPL)">AAPL</a>)</td>
      <td>1.50</td>
      <td><span data-tooltip="After market close"></span></td>
    </tr>
    <tr>
      <td class="flag"></td>
      <td class="earnCalCompany">Qualcomm (<a href="/equities/qualcomm">QCOM</a>)</td>
      <td>2.30</td>
      <td>--</td>
    </tr>
    <tr><td colspan="9" class="theDay">Thursday, May 2, 2024</td></tr>
    <tr>
      <td class="flag"></td>
      <td class="earnCalCompany"><a href="/equities/amazon" title="Amazon.com Inc (AMZN)">Amazon.com Inc</a></td>
      <td>0.83</td>
      <td><span data-tooltip="Before market open"></span></td>
    </tr>
  </tbody>
</table>"#;

    #[test]
    fn parses_day_groups_and_tickers() {
        let records = Investing::default().parse(PAGE, &window()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].ticker, "AAPL");
        assert_eq!(records[0].company_name, "Apple");
        assert_eq!(records[0].report_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(records[0].report_time, ReportTime::AfterMarket);

        assert_eq!(records[1].ticker, "QCOM");
        assert_eq!(records[1].report_time, ReportTime::Unknown);

        assert_eq!(records[2].ticker, "AMZN");
        assert_eq!(records[2].company_name, "Amazon.com Inc");
        assert_eq!(records[2].report_date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(records[2].report_time, ReportTime::BeforeMarket);
    }

    #[test]
    fn falls_back_to_gen_tbl() {
        let html = r#"<table class="genTbl"><tr><td class="theDay">May 3, 2024</td></tr>
<tr><td>SHOP</td><td><a>Shopify</a></td><td>BMO</td><td></td></tr></table>"#;
        let records = Investing::default().parse(html, &window()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ticker, "SHOP");
        assert_eq!(records[0].report_time, ReportTime::BeforeMarket);
    }

    #[test]
    fn missing_table_is_parse_error() {
        assert!(Investing::default().parse("<div>captcha</div>", &window()).is_err());
    }
}
