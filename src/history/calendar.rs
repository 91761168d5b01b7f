//! Month grid for calendar navigation.
//!
//! Pure presentation over (year, month): Monday-first weeks with `None`
//! padding, plus prev/next month arithmetic that pages across year
//! boundaries without any bound.

use serde::Serialize;
use time::{Date, Month};

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u8,
    /// Monday-first rows; `None` cells pad the first and last week.
    pub weeks: Vec<[Option<u8>; 7]>,
}

pub fn month_grid(year: i32, month: u8) -> Option<MonthGrid> {
    let month_enum = Month::try_from(month).ok()?;
    let first = Date::from_calendar_date(year, month_enum, 1).ok()?;
    let days = time::util::days_in_year_month(year, month_enum);
    let offset = first.weekday().number_days_from_monday() as usize;

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = offset;
    for day in 1..=days {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }

    Some(MonthGrid { year, month, weeks })
}

pub fn prev_month(year: i32, month: u8) -> (i32, u8) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u8) -> (i32, u8) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
