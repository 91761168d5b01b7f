use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::tracking::Goals;

/// Profile with derived daily goals, written by the survey/profile flow and
/// read-only everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub height_cm: i32,
    pub weight_kg: i32,
    pub age_years: i32,
    pub gender: String,
    pub goal: String,
    pub calories: i32,
    pub protein_g: i32,
    pub fat_g: i32,
    pub carbs_g: i32,
}

impl UserProfile {
    pub fn goals(&self) -> Goals {
        Goals {
            calories: self.calories,
            protein: self.protein_g,
            fat: self.fat_g,
            carbs: self.carbs_g,
        }
    }
}

const COLUMNS: &str = "user_id, height_cm, weight_kg, age_years, gender, goal, \
                       calories, protein_g, fat_g, carbs_g";

pub async fn get(db: &PgPool, user_id: i64) -> anyhow::Result<Option<UserProfile>> {
    let profile = sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {COLUMNS} FROM profiles WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

pub async fn upsert(db: &PgPool, profile: &UserProfile) -> anyhow::Result<UserProfile> {
    let row = sqlx::query_as::<_, UserProfile>(&format!(
        r#"
        INSERT INTO profiles (user_id, height_cm, weight_kg, age_years, gender, goal,
                              calories, protein_g, fat_g, carbs_g, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
        ON CONFLICT (user_id) DO UPDATE SET
            height_cm = EXCLUDED.height_cm,
            weight_kg = EXCLUDED.weight_kg,
            age_years = EXCLUDED.age_years,
            gender = EXCLUDED.gender,
            goal = EXCLUDED.goal,
            calories = EXCLUDED.calories,
            protein_g = EXCLUDED.protein_g,
            fat_g = EXCLUDED.fat_g,
            carbs_g = EXCLUDED.carbs_g,
            updated_at = now()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(profile.user_id)
    .bind(profile.height_cm)
    .bind(profile.weight_kg)
    .bind(profile.age_years)
    .bind(&profile.gender)
    .bind(&profile.goal)
    .bind(profile.calories)
    .bind(profile.protein_g)
    .bind(profile.fat_g)
    .bind(profile.carbs_g)
    .fetch_one(db)
    .await?;
    Ok(row)
}
