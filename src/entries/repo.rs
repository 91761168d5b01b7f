//! Append-only journal of user actions.
//!
//! One row per completed turn (meal, activity, free question) plus one
//! day-summary row at day-end. Rows are never updated or deleted here;
//! retention is someone else's problem. Ordering within a day is by
//! `logged_at`.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::analysis::{ActivityFacts, MealFacts};
use crate::tracking::DailyTotals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Meal,
    Activity,
    Query,
    DaySummary,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meal => "meal",
            Self::Activity => "activity",
            Self::Query => "query",
            Self::DaySummary => "day_summary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "meal" => Some(Self::Meal),
            "activity" => Some(Self::Activity),
            "query" => Some(Self::Query),
            "day_summary" => Some(Self::DaySummary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LogEntry {
    pub id: Uuid,
    pub user_id: i64,
    pub entry_date: Date,
    pub logged_at: OffsetDateTime,
    pub kind: String,
    pub category: Option<String>,
    pub input_text: Option<String>,
    pub photo_ref: Option<String>,
    pub raw_analysis: String,
    pub calories: i32,
    pub protein_g: i32,
    pub fat_g: i32,
    pub carbs_g: i32,
    pub calories_burned: i32,
    pub extra: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn entry_kind(&self) -> Option<EntryKind> {
        EntryKind::parse(&self.kind)
    }

    pub fn meal_facts(&self) -> MealFacts {
        MealFacts {
            description: String::new(),
            calories: self.calories,
            protein: self.protein_g,
            fat: self.fat_g,
            carbs: self.carbs_g,
        }
    }

    pub fn activity_facts(&self) -> ActivityFacts {
        ActivityFacts {
            description: String::new(),
            calories_burned: self.calories_burned,
        }
    }

    /// Day-summary rows carry the final fold of the day in the fact columns.
    pub fn summary_totals(&self) -> DailyTotals {
        DailyTotals {
            calories_consumed: self.calories,
            calories_burned: self.calories_burned,
            protein: self.protein_g,
            fat: self.fat_g,
            carbs: self.carbs_g,
        }
    }
}

/// Insert payload; `append` fills id and logged_at.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: i64,
    pub entry_date: Date,
    pub kind: EntryKind,
    pub category: Option<String>,
    pub input_text: Option<String>,
    pub photo_ref: Option<String>,
    pub raw_analysis: String,
    pub calories: i32,
    pub protein_g: i32,
    pub fat_g: i32,
    pub carbs_g: i32,
    pub calories_burned: i32,
    pub extra: Option<serde_json::Value>,
}

impl NewEntry {
    fn blank(user_id: i64, entry_date: Date, kind: EntryKind) -> Self {
        Self {
            user_id,
            entry_date,
            kind,
            category: None,
            input_text: None,
            photo_ref: None,
            raw_analysis: String::new(),
            calories: 0,
            protein_g: 0,
            fat_g: 0,
            carbs_g: 0,
            calories_burned: 0,
            extra: None,
        }
    }

    pub fn meal(
        user_id: i64,
        entry_date: Date,
        category: &str,
        input_text: Option<String>,
        photo_ref: Option<String>,
        raw_analysis: String,
        facts: &MealFacts,
    ) -> Self {
        Self {
            category: Some(category.to_string()),
            input_text,
            photo_ref,
            raw_analysis,
            calories: facts.calories,
            protein_g: facts.protein,
            fat_g: facts.fat,
            carbs_g: facts.carbs,
            ..Self::blank(user_id, entry_date, EntryKind::Meal)
        }
    }

    pub fn activity(
        user_id: i64,
        entry_date: Date,
        input_text: Option<String>,
        raw_analysis: String,
        facts: &ActivityFacts,
    ) -> Self {
        Self {
            input_text,
            raw_analysis,
            calories_burned: facts.calories_burned,
            ..Self::blank(user_id, entry_date, EntryKind::Activity)
        }
    }

    pub fn query(user_id: i64, entry_date: Date, question: String, answer: String) -> Self {
        Self {
            input_text: Some(question),
            raw_analysis: answer,
            ..Self::blank(user_id, entry_date, EntryKind::Query)
        }
    }

    pub fn day_summary(
        user_id: i64,
        entry_date: Date,
        totals: &DailyTotals,
        recap: String,
        breakdown: serde_json::Value,
    ) -> Self {
        Self {
            raw_analysis: recap,
            calories: totals.calories_consumed,
            protein_g: totals.protein,
            fat_g: totals.fat,
            carbs_g: totals.carbs,
            calories_burned: totals.calories_burned,
            extra: Some(breakdown),
            ..Self::blank(user_id, entry_date, EntryKind::DaySummary)
        }
    }
}

pub async fn append(db: &PgPool, entry: &NewEntry) -> anyhow::Result<LogEntry> {
    let row = sqlx::query_as::<_, LogEntry>(
        r#"
        INSERT INTO entries (user_id, entry_date, kind, category, input_text, photo_ref,
                             raw_analysis, calories, protein_g, fat_g, carbs_g,
                             calories_burned, extra)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING id, user_id, entry_date, logged_at, kind, category, input_text, photo_ref,
                  raw_analysis, calories, protein_g, fat_g, carbs_g, calories_burned, extra
        "#,
    )
    .bind(entry.user_id)
    .bind(entry.entry_date)
    .bind(entry.kind.as_str())
    .bind(&entry.category)
    .bind(&entry.input_text)
    .bind(&entry.photo_ref)
    .bind(&entry.raw_analysis)
    .bind(entry.calories)
    .bind(entry.protein_g)
    .bind(entry.fat_g)
    .bind(entry.carbs_g)
    .bind(entry.calories_burned)
    .bind(&entry.extra)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_for_date(db: &PgPool, user_id: i64, date: Date) -> anyhow::Result<Vec<LogEntry>> {
    let rows = sqlx::query_as::<_, LogEntry>(
        r#"
        SELECT id, user_id, entry_date, logged_at, kind, category, input_text, photo_ref,
               raw_analysis, calories, protein_g, fat_g, carbs_g, calories_burned, extra
        FROM entries
        WHERE user_id = $1 AND entry_date = $2
        ORDER BY logged_at ASC
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_for_range(
    db: &PgPool,
    user_id: i64,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<LogEntry>> {
    let rows = sqlx::query_as::<_, LogEntry>(
        r#"
        SELECT id, user_id, entry_date, logged_at, kind, category, input_text, photo_ref,
               raw_analysis, calories, protein_g, fat_g, carbs_g, calories_burned, extra
        FROM entries
        WHERE user_id = $1 AND entry_date >= $2 AND entry_date <= $3
        ORDER BY entry_date ASC, logged_at ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
