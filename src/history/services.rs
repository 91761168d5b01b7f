//! Historical day recaps and period aggregation over persisted entries.
//!
//! The pure cores (`summarize_period`, recap building) work on entry slices
//! so they are testable without a database; the async wrappers only run the
//! queries.

use std::collections::BTreeMap;

use time::Date;

use crate::entries::{self, EntryKind, LogEntry};
use crate::state::AppState;
use crate::tracking::recap::{build_recap, format_date, render_recap, render_totals, DayRecap};
use crate::tracking::DailyTotals;

#[derive(Debug, Clone, serde::Serialize)]
pub struct PeriodSummary {
    pub start: Date,
    pub end: Date,
    /// Days in range that actually contributed data.
    pub days_counted: u32,
    pub totals: DailyTotals,
    /// Per-day averages over `days_counted`, rounded.
    pub averages: DailyTotals,
}

pub async fn day_recap(state: &AppState, user_id: i64, date: Date) -> anyhow::Result<DayRecap> {
    let entries = entries::list_for_date(&state.db, user_id, date).await?;
    Ok(build_recap(date, &entries))
}

pub fn render_day(recap: &DayRecap) -> String {
    if recap.meals.is_empty() && recap.activities.is_empty() {
        return format!("📭 No data for {}.", format_date(recap.date));
    }
    render_recap(recap, None)
}

pub async fn period_summary(
    state: &AppState,
    user_id: i64,
    start: Date,
    end: Date,
) -> anyhow::Result<PeriodSummary> {
    let entries = entries::list_for_range(&state.db, user_id, start, end).await?;
    Ok(summarize_period(start, end, &entries))
}

/// Aggregates a date range. For each day the precomputed day-summary totals
/// win; a day without one is re-folded from its meal/activity entries; a day
/// with neither contributes nothing and is excluded from the averaging
/// denominator — an empty day is never counted as a zero-valued day.
pub fn summarize_period(start: Date, end: Date, entries: &[LogEntry]) -> PeriodSummary {
    let mut by_date: BTreeMap<Date, Vec<&LogEntry>> = BTreeMap::new();
    for entry in entries {
        by_date.entry(entry.entry_date).or_default().push(entry);
    }

    let mut totals = DailyTotals::default();
    let mut days_counted = 0u32;

    for (date, day_entries) in by_date {
        if date < start || date > end {
            continue;
        }
        let Some(day_totals) = day_totals(&day_entries) else {
            continue;
        };
        totals.calories_consumed += day_totals.calories_consumed;
        totals.calories_burned += day_totals.calories_burned;
        totals.protein += day_totals.protein;
        totals.fat += day_totals.fat;
        totals.carbs += day_totals.carbs;
        days_counted += 1;
    }

    let averages = if days_counted > 0 {
        let n = f64::from(days_counted);
        let avg = |v: i32| (f64::from(v) / n).round() as i32;
        DailyTotals {
            calories_consumed: avg(totals.calories_consumed),
            calories_burned: avg(totals.calories_burned),
            protein: avg(totals.protein),
            fat: avg(totals.fat),
            carbs: avg(totals.carbs),
        }
    } else {
        DailyTotals::default()
    };

    PeriodSummary {
        start,
        end,
        days_counted,
        totals,
        averages,
    }
}

fn day_totals(day_entries: &[&LogEntry]) -> Option<DailyTotals> {
    // Последняя за день сводка — источник истины
    if let Some(summary) = day_entries
        .iter()
        .rev()
        .find(|e| e.entry_kind() == Some(EntryKind::DaySummary))
    {
        return Some(summary.summary_totals());
    }

    let mut totals = DailyTotals::default();
    let mut any = false;
    for entry in day_entries {
        match entry.entry_kind() {
            Some(EntryKind::Meal) => {
                totals.add_meal(&entry.meal_facts());
                any = true;
            }
            Some(EntryKind::Activity) => {
                totals.add_activity(&entry.activity_facts());
                any = true;
            }
            _ => {}
        }
    }
    any.then_some(totals)
}

pub fn render_period(summary: &PeriodSummary) -> String {
    if summary.days_counted == 0 {
        return format!(
            "📭 No data for the period {}–{}.",
            format_date(summary.start),
            format_date(summary.end)
        );
    }
    format!(
        "📊 Period {}–{} ({} day(s) with data)\n\nTotals:\n{}\n\nDaily average:\n{}",
        format_date(summary.start),
        format_date(summary.end),
        summary.days_counted,
        render_totals(&summary.totals, None),
        render_totals(&summary.averages, None),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ActivityFacts, MealFacts};
    use crate::entries::NewEntry;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn persisted(new: NewEntry, seq: i64) -> LogEntry {
        LogEntry {
            id: Uuid::nil(),
            user_id: new.user_id,
            entry_date: new.entry_date,
            logged_at: OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(seq),
            kind: new.kind.as_str().into(),
            category: new.category,
            input_text: new.input_text,
            photo_ref: new.photo_ref,
            raw_analysis: new.raw_analysis,
            calories: new.calories,
            protein_g: new.protein_g,
            fat_g: new.fat_g,
            carbs_g: new.carbs_g,
            calories_burned: new.calories_burned,
            extra: new.extra,
        }
    }

    fn summary_entry(date: Date, totals: DailyTotals, seq: i64) -> LogEntry {
        persisted(
            NewEntry::day_summary(1, date, &totals, "recap".into(), serde_json::json!({})),
            seq,
        )
    }

    fn meal_entry(date: Date, calories: i32, seq: i64) -> LogEntry {
        persisted(
            NewEntry::meal(
                1,
                date,
                "lunch",
                None,
                None,
                String::new(),
                &MealFacts {
                    description: String::new(),
                    calories,
                    protein: 10,
                    fat: 5,
                    carbs: 20,
                },
            ),
            seq,
        )
    }

    fn totals(consumed: i32, burned: i32) -> DailyTotals {
        DailyTotals {
            calories_consumed: consumed,
            calories_burned: burned,
            protein: 100,
            fat: 50,
            carbs: 150,
        }
    }

    #[test]
    fn scenario_d_missing_middle_day_averages_over_two() {
        let entries = vec![
            summary_entry(date!(2025 - 05 - 01), totals(1800, 200), 0),
            summary_entry(date!(2025 - 05 - 03), totals(2200, 400), 1),
        ];
        let summary =
            summarize_period(date!(2025 - 05 - 01), date!(2025 - 05 - 03), &entries);
        assert_eq!(summary.days_counted, 2);
        assert_eq!(summary.totals.calories_consumed, 4000);
        assert_eq!(summary.averages.calories_consumed, 2000);
        assert_eq!(summary.averages.calories_burned, 300);
    }

    #[test]
    fn one_day_period_when_end_equals_start() {
        let entries = vec![summary_entry(date!(2025 - 05 - 01), totals(1800, 0), 0)];
        let summary =
            summarize_period(date!(2025 - 05 - 01), date!(2025 - 05 - 01), &entries);
        assert_eq!(summary.days_counted, 1);
        assert_eq!(summary.totals.calories_consumed, 1800);
        assert_eq!(summary.averages, summary.totals);
    }

    #[test]
    fn day_summary_wins_over_refold() {
        // Журнальная еда даёт 500 ккал, но сводка дня говорит 1800
        let entries = vec![
            meal_entry(date!(2025 - 05 - 02), 500, 0),
            summary_entry(date!(2025 - 05 - 02), totals(1800, 0), 1),
        ];
        let summary =
            summarize_period(date!(2025 - 05 - 01), date!(2025 - 05 - 03), &entries);
        assert_eq!(summary.days_counted, 1);
        assert_eq!(summary.totals.calories_consumed, 1800);
    }

    #[test]
    fn day_without_summary_is_refolded_from_entries() {
        let mut entries = vec![
            meal_entry(date!(2025 - 05 - 02), 500, 0),
            meal_entry(date!(2025 - 05 - 02), 300, 1),
        ];
        entries.push(persisted(
            NewEntry::activity(
                1,
                date!(2025 - 05 - 02),
                None,
                String::new(),
                &ActivityFacts {
                    description: String::new(),
                    calories_burned: 250,
                },
            ),
            2,
        ));
        let summary =
            summarize_period(date!(2025 - 05 - 02), date!(2025 - 05 - 02), &entries);
        assert_eq!(summary.days_counted, 1);
        assert_eq!(summary.totals.calories_consumed, 800);
        assert_eq!(summary.totals.calories_burned, 250);
    }

    #[test]
    fn query_only_day_is_excluded() {
        let entries = vec![
            persisted(
                NewEntry::query(1, date!(2025 - 05 - 02), "q".into(), "a".into()),
                0,
            ),
            summary_entry(date!(2025 - 05 - 03), totals(2000, 0), 1),
        ];
        let summary =
            summarize_period(date!(2025 - 05 - 01), date!(2025 - 05 - 03), &entries);
        assert_eq!(summary.days_counted, 1);
    }

    #[test]
    fn empty_period_reports_no_data() {
        let summary = summarize_period(date!(2025 - 05 - 01), date!(2025 - 05 - 07), &[]);
        assert_eq!(summary.days_counted, 0);
        assert_eq!(summary.totals, DailyTotals::default());
        assert!(render_period(&summary).contains("No data"));
    }

    #[test]
    fn latest_day_summary_of_a_day_wins() {
        let entries = vec![
            summary_entry(date!(2025 - 05 - 02), totals(1500, 0), 0),
            summary_entry(date!(2025 - 05 - 02), totals(1700, 0), 1),
        ];
        let summary =
            summarize_period(date!(2025 - 05 - 02), date!(2025 - 05 - 02), &entries);
        assert_eq!(summary.totals.calories_consumed, 1700);
    }
}
