//! Daily goal derivation from profile attributes.
//!
//! Mifflin–St Jeor BMR with a sedentary activity factor, ±500 kcal for the
//! weight goal, protein at 1.5 g per kg of body weight, fat at 25% of
//! calories, carbs from the remainder.

use anyhow::bail;

use crate::tracking::Goals;

pub const GENDER_MALE: &str = "male";
pub const GENDER_FEMALE: &str = "female";

pub const GOAL_LOSE: &str = "lose_weight";
pub const GOAL_KEEP: &str = "keep_weight";
pub const GOAL_GAIN: &str = "gain_weight";

const ACTIVITY_FACTOR: f64 = 1.2;
const GOAL_ADJUST_KCAL: f64 = 500.0;

pub fn daily_goals(
    height_cm: i32,
    weight_kg: i32,
    age_years: i32,
    gender: &str,
    goal: &str,
) -> anyhow::Result<Goals> {
    if !(100..=250).contains(&height_cm) {
        bail!("height must be between 100 and 250 cm");
    }
    if !(30..=300).contains(&weight_kg) {
        bail!("weight must be between 30 and 300 kg");
    }
    if !(10..=120).contains(&age_years) {
        bail!("age must be between 10 and 120 years");
    }

    let h = f64::from(height_cm);
    let w = f64::from(weight_kg);
    let a = f64::from(age_years);

    let bmr = match gender {
        GENDER_MALE => 10.0 * w + 6.25 * h - 5.0 * a + 5.0,
        GENDER_FEMALE => 10.0 * w + 6.25 * h - 5.0 * a - 161.0,
        other => bail!("unknown gender {other:?}, expected male or female"),
    };

    let maintenance = bmr * ACTIVITY_FACTOR;
    let calories = match goal {
        GOAL_LOSE => maintenance - GOAL_ADJUST_KCAL,
        GOAL_GAIN => maintenance + GOAL_ADJUST_KCAL,
        GOAL_KEEP => maintenance,
        other => bail!("unknown goal {other:?}"),
    };

    let protein = w * 1.5;
    let fat = calories * 0.25 / 9.0;
    let carbs = (calories - protein * 4.0 - fat * 9.0) / 4.0;

    Ok(Goals {
        calories: calories.round() as i32,
        protein: protein.round() as i32,
        fat: fat.round() as i32,
        carbs: carbs.round() as i32,
    })
}
