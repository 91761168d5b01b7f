//! Day recap: categorized meal breakdown, activities, and re-folded totals.
//!
//! Built from persisted entries with the same summation rules as the live
//! session, so a historical recap and a live day-end recap agree for the same
//! entry set. Used by day-end and by the history day lookup.

use serde::Serialize;
use time::macros::format_description;
use time::Date;

use crate::analysis::{parse_activity, parse_meal};
use crate::entries::{EntryKind, LogEntry};

use super::totals::{DailyTotals, Goals};

const CATEGORY_ORDER: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

#[derive(Debug, Clone, Serialize)]
pub struct RecapMeal {
    pub category: String,
    pub description: String,
    pub calories: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecapActivity {
    pub description: String,
    pub calories_burned: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRecap {
    pub date: Date,
    pub meals: Vec<RecapMeal>,
    pub activities: Vec<RecapActivity>,
    pub totals: DailyTotals,
}

/// Folds the day's meal/activity entries; query and day-summary rows are
/// recap input for neither totals nor breakdown.
pub fn build_recap(date: Date, entries: &[LogEntry]) -> DayRecap {
    let mut totals = DailyTotals::default();
    let mut meals = Vec::new();
    let mut activities = Vec::new();

    for entry in entries {
        match entry.entry_kind() {
            Some(EntryKind::Meal) => {
                totals.add_meal(&entry.meal_facts());
                meals.push(RecapMeal {
                    category: entry.category.clone().unwrap_or_else(|| "other".into()),
                    description: describe_meal(entry),
                    calories: entry.calories,
                });
            }
            Some(EntryKind::Activity) => {
                totals.add_activity(&entry.activity_facts());
                activities.push(RecapActivity {
                    description: describe_activity(entry),
                    calories_burned: entry.calories_burned,
                });
            }
            _ => {}
        }
    }

    DayRecap {
        date,
        meals,
        activities,
        totals,
    }
}

fn describe_meal(entry: &LogEntry) -> String {
    let parsed = parse_meal(&entry.raw_analysis).description;
    if !parsed.is_empty() {
        return parsed;
    }
    entry.input_text.clone().unwrap_or_else(|| "—".into())
}

fn describe_activity(entry: &LogEntry) -> String {
    let parsed = parse_activity(&entry.raw_analysis).description;
    if !parsed.is_empty() {
        return parsed;
    }
    entry.input_text.clone().unwrap_or_else(|| "—".into())
}

/// Per-category calorie map persisted with the day-summary entry.
pub fn category_breakdown(recap: &DayRecap) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for category in CATEGORY_ORDER {
        let kcal: i32 = recap
            .meals
            .iter()
            .filter(|m| m.category == category)
            .map(|m| m.calories)
            .sum();
        if kcal > 0 {
            map.insert(category.into(), serde_json::json!(kcal));
        }
    }
    serde_json::Value::Object(map)
}

pub fn format_date(date: Date) -> String {
    let format = format_description!("[day].[month].[year]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

pub fn render_totals(totals: &DailyTotals, goals: Option<&Goals>) -> String {
    let mut out = format!(
        "Consumed: {} kcal, burned: {} kcal, net: {} kcal",
        totals.calories_consumed,
        totals.calories_burned,
        totals.net()
    );
    if let Some(goals) = goals {
        out.push_str(&format!(" ({})", totals.calorie_status(goals)));
        out.push_str(&format!(
            "\nProtein: {}/{} g, fat: {}/{} g, carbs: {}/{} g",
            totals.protein, goals.protein, totals.fat, goals.fat, totals.carbs, goals.carbs
        ));
    } else {
        out.push_str(&format!(
            "\nProtein: {} g, fat: {} g, carbs: {} g",
            totals.protein, totals.fat, totals.carbs
        ));
    }
    out
}

pub fn render_recap(recap: &DayRecap, goals: Option<&Goals>) -> String {
    let mut out = format!("📖 Day {}\n", format_date(recap.date));

    for category in CATEGORY_ORDER {
        let in_category: Vec<&RecapMeal> = recap
            .meals
            .iter()
            .filter(|m| m.category == category)
            .collect();
        if in_category.is_empty() {
            continue;
        }
        out.push_str(&format!("\n🍽 {}:\n", capitalize(category)));
        for meal in in_category {
            out.push_str(&format!("  • {} — {} kcal\n", meal.description, meal.calories));
        }
    }

    let other: Vec<&RecapMeal> = recap
        .meals
        .iter()
        .filter(|m| !CATEGORY_ORDER.contains(&m.category.as_str()))
        .collect();
    if !other.is_empty() {
        out.push_str("\n🍽 Other:\n");
        for meal in other {
            out.push_str(&format!("  • {} — {} kcal\n", meal.description, meal.calories));
        }
    }

    if !recap.activities.is_empty() {
        out.push_str("\n🏃 Activity:\n");
        for activity in &recap.activities {
            out.push_str(&format!(
                "  • {} — {} kcal burned\n",
                activity.description, activity.calories_burned
            ));
        }
    }

    out.push('\n');
    out.push_str(&render_totals(&recap.totals, goals));
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
