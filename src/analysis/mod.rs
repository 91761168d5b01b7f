mod parser;

pub use parser::{parse_activity, parse_meal};

use serde::{Deserialize, Serialize};

/// Numeric facts extracted from a meal analysis. All grams/kcal, integers;
/// anything the model failed to report comes back as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealFacts {
    pub description: String,
    pub calories: i32,
    pub protein: i32,
    pub fat: i32,
    pub carbs: i32,
}

/// Numeric facts extracted from an activity analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFacts {
    pub description: String,
    pub calories_burned: i32,
}
