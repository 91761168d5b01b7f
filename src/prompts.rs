//! Prompt templates for the nutritionist agent.
//!
//! The response-format block is a contract with `analysis::parser`: the model
//! is asked to wrap its output in the tagged sections the parser looks for.
//! The parser tolerates the model ignoring the contract (everything degrades
//! to zero-valued facts), so changes here never break the conversation.

use crate::profile::UserProfile;

pub const RESPONSE_FORMAT_MEAL: &str = "\
Format your reply exactly as follows:
<analysis>
Short description of the dish(es) you identified.
</analysis>
<nutrients>
Calories: <integer> kcal
Protein: <integer> g
Fat: <integer> g
Carbs: <integer> g
</nutrients>
<recommendations>
One or two sentences of advice given the user's remaining daily targets.
</recommendations>";

pub const RESPONSE_FORMAT_ACTIVITY: &str = "\
Format your reply exactly as follows:
<analysis>
Short description of the activity you identified.
</analysis>
<nutrients>
Burned: <integer> kcal
</nutrients>
<recommendations>
One or two sentences of advice given the user's remaining daily targets.
</recommendations>";

/// Personalized system context sent with every model call for an open day.
pub fn system_context(profile: &UserProfile) -> String {
    format!(
        "You are a professional nutritionist and fitness coach helping the \
user achieve their wellness goals.

The user reports meals (as photos or text), physical activity, and sometimes \
asks general questions about healthy living. For meals, identify each dish \
and estimate its calories and macronutrients. For activities, estimate \
calories burned. Keep the running daily balance in mind when giving advice.

User profile:
- Height: {height} cm
- Weight: {weight} kg
- Age: {age} years
- Gender: {gender}
- Goal: {goal}
- Daily target: {calories} kcal
- Macronutrient targets: protein {protein} g, fat {fat} g, carbs {carbs} g",
        height = profile.height_cm,
        weight = profile.weight_kg,
        age = profile.age_years,
        gender = profile.gender,
        goal = profile.goal,
        calories = profile.calories,
        protein = profile.protein_g,
        fat = profile.fat_g,
        carbs = profile.carbs_g,
    )
}
