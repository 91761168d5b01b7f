use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

use super::calendar::MonthGrid;
use crate::tracking::recap::DayRecap;
use crate::tracking::DailyTotals;

#[derive(Debug, Deserialize)]
pub struct PeriodRequest {
    pub user_id: i64,
    /// DD.MM.YYYY, the format users type in chat.
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct DayHistoryResponse {
    pub message: String,
    pub recap: DayRecap,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    #[serde(flatten)]
    pub grid: MonthGrid,
    pub prev: (i32, u8),
    pub next: (i32, u8),
}

#[derive(Debug, Serialize)]
pub struct PeriodResponse {
    pub message: String,
    pub start: Date,
    pub end: Date,
    pub days_counted: u32,
    pub totals: DailyTotals,
    pub averages: DailyTotals,
}

pub fn parse_date(s: &str) -> Option<Date> {
    let format = format_description!("[day].[month].[year]");
    Date::parse(s.trim(), &format).ok()
}
