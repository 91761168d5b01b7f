use serde::{Deserialize, Serialize};
use time::Date;

use super::machine::{Action, ConversationState, EntryChoice, InputMedium};
use super::totals::{DailyTotals, Goals};

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub user_id: i64,
    pub selection: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub user_id: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PhotoRequest {
    pub user_id: i64,
    pub photo_ref: String,
    pub caption: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub message: String,
    pub state: ConversationState,
    pub totals: DailyTotals,
}

#[derive(Debug, Serialize)]
pub struct DayStartResponse {
    pub message: String,
    pub date: Date,
    pub goals: Goals,
}

#[derive(Debug, Serialize)]
pub struct DayEndResponse {
    pub message: String,
    pub date: Date,
    pub totals: DailyTotals,
}

/// Maps a keyboard selection delivered by the transport to a machine action.
pub fn selection_action(selection: &str) -> Option<Action> {
    let choice = match selection {
        "breakfast" => EntryChoice::Breakfast,
        "lunch" => EntryChoice::Lunch,
        "dinner" => EntryChoice::Dinner,
        "snack" => EntryChoice::Snack,
        "activity" => EntryChoice::Activity,
        "photo" => return Some(Action::SelectMedium(InputMedium::Photo)),
        "text" => return Some(Action::SelectMedium(InputMedium::Text)),
        _ => return None,
    };
    Some(Action::SelectEntryKind(choice))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_selections_map_to_actions() {
        assert_eq!(
            selection_action("lunch"),
            Some(Action::SelectEntryKind(EntryChoice::Lunch))
        );
        assert_eq!(
            selection_action("photo"),
            Some(Action::SelectMedium(InputMedium::Photo))
        );
        assert_eq!(selection_action("brunch"), None);
    }
}
