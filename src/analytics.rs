//! Headline numbers and distributions over a set of earnings records.
//!
//! Everything here is pure; callers pass the records they already filtered
//! and the date they consider "today".

use crate::models::EarningsRecord;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

/// Reports this many days past today still count as "this week".
const WEEK_DAYS: u64 = 7;

/// Count of reports falling on one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub weekday: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSummary {
    pub total: usize,
    /// Reports dated `today`.
    pub today: usize,
    /// Reports from `today` through seven days out, inclusive.
    pub this_week: usize,
    /// Distinct tickers.
    pub unique_companies: usize,
    /// Monday first; weekdays without reports are omitted.
    pub by_weekday: Vec<WeekdayCount>,
    pub by_date: BTreeMap<NaiveDate, usize>,
}

/// Summarize `records` relative to `today`.
pub fn calendar_summary(records: &[EarningsRecord], today: NaiveDate) -> CalendarSummary {
    let week_end = today.checked_add_days(Days::new(WEEK_DAYS)).unwrap_or(NaiveDate::MAX);

    let by_date: BTreeMap<NaiveDate, usize> = records
        .iter()
        .map(|r| r.report_date)
        .counts()
        .into_iter()
        .collect();

    let by_weekday = records
        .iter()
        .map(|r| r.report_date.weekday())
        .counts()
        .into_iter()
        .sorted_by_key(|(day, _)| day.num_days_from_monday())
        .map(|(day, count)| WeekdayCount {
            weekday: weekday_name(day),
            count,
        })
        .collect();

    CalendarSummary {
        total: records.len(),
        today: by_date.get(&today).copied().unwrap_or(0),
        this_week: records
            .iter()
            .filter(|r| (today..=week_end).contains(&r.report_date))
            .count(),
        unique_companies: records.iter().map(|r| r.ticker.as_str()).unique().count(),
        by_weekday,
        by_date,
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
