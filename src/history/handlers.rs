use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{error, instrument};

use crate::state::AppState;

use super::calendar::{month_grid, next_month, prev_month};
use super::dto::{
    parse_date, CalendarResponse, DayHistoryResponse, PeriodRequest, PeriodResponse,
};
use super::services::{self, render_day, render_period};

const DATE_HINT: &str = "Invalid date, expected DD.MM.YYYY (e.g. 10.05.2025)";

#[instrument(skip(state))]
pub async fn day(
    State(state): State<AppState>,
    Path((user_id, date)): Path<(i64, String)>,
) -> Result<Json<DayHistoryResponse>, (StatusCode, String)> {
    let date = parse_date(&date).ok_or((StatusCode::BAD_REQUEST, DATE_HINT.into()))?;

    let recap = services::day_recap(&state, user_id, date)
        .await
        .map_err(internal)?;
    Ok(Json(DayHistoryResponse {
        message: render_day(&recap),
        recap,
    }))
}

#[instrument]
pub async fn calendar(
    Path((year, month)): Path<(i32, u8)>,
) -> Result<Json<CalendarResponse>, (StatusCode, String)> {
    let grid = month_grid(year, month).ok_or_else(|| {
        let reason = if (1..=12).contains(&month) {
            format!("year {year} is outside the supported calendar range")
        } else {
            format!("month must be 1..=12, got {month}")
        };
        (StatusCode::BAD_REQUEST, reason)
    })?;
    Ok(Json(CalendarResponse {
        prev: prev_month(year, month),
        next: next_month(year, month),
        grid,
    }))
}

#[instrument(skip(state))]
pub async fn period(
    State(state): State<AppState>,
    Json(body): Json<PeriodRequest>,
) -> Result<Json<PeriodResponse>, (StatusCode, String)> {
    let start = parse_date(&body.start).ok_or((StatusCode::BAD_REQUEST, DATE_HINT.into()))?;
    let end = parse_date(&body.end).ok_or((StatusCode::BAD_REQUEST, DATE_HINT.into()))?;
    if end < start {
        return Err((
            StatusCode::BAD_REQUEST,
            "End date is before the start date, enter a corrected end date".into(),
        ));
    }

    let summary = services::period_summary(&state, body.user_id, start, end)
        .await
        .map_err(internal)?;
    Ok(Json(PeriodResponse {
        message: render_period(&summary),
        start: summary.start,
        end: summary.end,
        days_counted: summary.days_counted,
        totals: summary.totals,
        averages: summary.averages,
    }))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "history query failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
