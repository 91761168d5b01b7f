//! Running per-day totals and goal arithmetic.
//!
//! Folding is plain component-wise addition, so it is commutative and
//! associative: live accumulation during an open day and historical replay
//! over the same entries always agree. Net calories and goal deltas are
//! derived on demand and never stored.

use serde::{Deserialize, Serialize};

use crate::analysis::{ActivityFacts, MealFacts};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub calories_consumed: i32,
    pub calories_burned: i32,
    pub protein: i32,
    pub fat: i32,
    pub carbs: i32,
}

/// Daily targets snapshotted from the profile at day-start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    pub calories: i32,
    pub protein: i32,
    pub fat: i32,
    pub carbs: i32,
}

impl DailyTotals {
    pub fn add_meal(&mut self, facts: &MealFacts) {
        self.calories_consumed += facts.calories.max(0);
        self.protein += facts.protein.max(0);
        self.fat += facts.fat.max(0);
        self.carbs += facts.carbs.max(0);
    }

    pub fn add_activity(&mut self, facts: &ActivityFacts) {
        self.calories_burned += facts.calories_burned.max(0);
    }

    /// consumed − burned, always derived.
    pub fn net(&self) -> i32 {
        self.calories_consumed - self.calories_burned
    }

    /// Positive when the user still has calories left for the day.
    pub fn remaining(&self, goals: &Goals) -> i32 {
        goals.calories - self.net()
    }

    /// "under target by N" / "over target by N" wording for recaps.
    pub fn calorie_status(&self, goals: &Goals) -> String {
        let remaining = self.remaining(goals);
        if remaining >= 0 {
            format!("under target by {remaining} kcal")
        } else {
            format!("over target by {} kcal", -remaining)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goals() -> Goals {
        Goals {
            calories: 2000,
            protein: 150,
            fat: 60,
            carbs: 200,
        }
    }

    fn meal(calories: i32, protein: i32, fat: i32, carbs: i32) -> MealFacts {
        MealFacts {
            description: String::new(),
            calories,
            protein,
            fat,
            carbs,
        }
    }

    #[test]
    fn scenario_a_single_meal() {
        let mut totals = DailyTotals::default();
        totals.add_meal(&meal(500, 30, 10, 60));
        assert_eq!(totals.calories_consumed, 500);
        assert_eq!(totals.protein, 30);
        assert_eq!(totals.fat, 10);
        assert_eq!(totals.carbs, 60);
        assert_eq!(totals.net(), 500);
    }

    #[test]
    fn scenario_b_activity_after_meal() {
        let mut totals = DailyTotals::default();
        totals.add_meal(&meal(500, 30, 10, 60));
        totals.add_activity(&ActivityFacts {
            description: String::new(),
            calories_burned: 300,
        });
        assert_eq!(totals.calories_burned, 300);
        assert_eq!(totals.net(), 200);
    }

    #[test]
    fn fold_is_order_independent() {
        let meals = [meal(500, 30, 10, 60), meal(320, 18, 9, 40), meal(150, 2, 1, 30)];
        let burns = [250, 120];

        let mut forward = DailyTotals::default();
        for m in &meals {
            forward.add_meal(m);
        }
        for b in burns {
            forward.add_activity(&ActivityFacts {
                description: String::new(),
                calories_burned: b,
            });
        }

        let mut shuffled = DailyTotals::default();
        shuffled.add_activity(&ActivityFacts {
            description: String::new(),
            calories_burned: burns[1],
        });
        shuffled.add_meal(&meals[2]);
        shuffled.add_meal(&meals[0]);
        shuffled.add_activity(&ActivityFacts {
            description: String::new(),
            calories_burned: burns[0],
        });
        shuffled.add_meal(&meals[1]);

        assert_eq!(forward, shuffled);
    }

    #[test]
    fn negative_facts_are_clamped_out() {
        let mut totals = DailyTotals::default();
        totals.add_meal(&meal(-100, -5, 3, 7));
        assert_eq!(totals.calories_consumed, 0);
        assert_eq!(totals.protein, 0);
        assert_eq!(totals.fat, 3);
        assert_eq!(totals.carbs, 7);
    }

    #[test]
    fn scenario_c_empty_day_is_under_by_full_goal() {
        let totals = DailyTotals::default();
        assert_eq!(totals.calorie_status(&goals()), "under target by 2000 kcal");
    }

    #[test]
    fn over_target_wording() {
        let mut totals = DailyTotals::default();
        totals.add_meal(&meal(2300, 0, 0, 0));
        assert_eq!(totals.calorie_status(&goals()), "over target by 300 kcal");
    }
}
