//! CSV export of earnings records.
//!
//! Columns: ticker, company_name, report_date, report_time, source

use crate::dates::format_date;
use crate::error::ExportError;
use crate::models::EarningsRecord;

pub fn records_to_csv(records: &[EarningsRecord]) -> Result<String, ExportError> {
    let mut wtr = ::csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "company_name", "report_date", "report_time", "source"])?;

    for r in records {
        wtr.write_record([
            r.ticker.as_str(),
            r.company_name.as_str(),
            format_date(r.report_date).as_str(),
            r.report_time.as_str(),
            r.source.name(),
        ])?;
    }

    let data = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(data)?)
}
