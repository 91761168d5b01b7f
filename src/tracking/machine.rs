//! Turn-by-turn conversation state machine.
//!
//! `transition` is pure: it maps (state, action) to the next state plus an
//! effect for the service layer to execute. Invalid combinations come back as
//! `TurnError` and leave the state untouched, which is how every re-prompt in
//! the flow works. The service layer only commits the returned state after
//! the effect (model call + insert) succeeds, so a failed attempt leaves the
//! user exactly where they were.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMedium {
    Photo,
    Text,
}

/// What the pending payload will be analyzed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "category")]
pub enum PayloadTarget {
    Meal(MealCategory),
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryChoice {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ConversationState {
    Idle,
    AwaitingEntryKind,
    AwaitingInputMedium { category: MealCategory },
    AwaitingPayload { target: PayloadTarget, medium: InputMedium },
    AwaitingFreeQuestion,
}

/// One discrete user action delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NewEntry,
    SelectEntryKind(EntryChoice),
    SelectMedium(InputMedium),
    Text(String),
    Photo {
        photo_ref: String,
        caption: Option<String>,
    },
    AskQuestion,
    Cancel,
}

/// What the service layer must do after a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PromptEntryKind,
    PromptMedium(MealCategory),
    PromptPayload(PayloadTarget, InputMedium),
    PromptQuestion,
    Analyze {
        target: PayloadTarget,
        text: Option<String>,
        photo_ref: Option<String>,
    },
    Answer {
        question: String,
    },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: ConversationState,
    pub effect: Effect,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("day is not started yet, use start-day first")]
    DayNotStarted,
    #[error("set up a profile first")]
    ProfileMissing,
    #[error("finish or cancel the current entry first")]
    EntryInProgress,
    #[error("nothing is expected right now, start a new entry or ask a question")]
    NothingExpected,
    #[error("a photo was requested, send a photo or cancel")]
    ExpectedPhoto,
    #[error("a text description was requested, send text or cancel")]
    ExpectedText,
    #[error("that selection is not available right now")]
    UnexpectedSelection,
    #[error("please pick one of the offered options")]
    ExpectedSelection,
    #[error("the previous message is still being processed, wait for it to finish")]
    Busy,
}

pub fn transition(state: ConversationState, action: Action) -> Result<Step, TurnError> {
    use ConversationState as S;

    match (state, action) {
        // Cancel is legal everywhere and never has side effects.
        (_, Action::Cancel) => Ok(Step {
            next: S::Idle,
            effect: Effect::Cancelled,
        }),

        (S::Idle, Action::NewEntry) => Ok(Step {
            next: S::AwaitingEntryKind,
            effect: Effect::PromptEntryKind,
        }),
        (S::Idle, Action::AskQuestion) => Ok(Step {
            next: S::AwaitingFreeQuestion,
            effect: Effect::PromptQuestion,
        }),
        (S::Idle, Action::Text(_) | Action::Photo { .. }) => Err(TurnError::NothingExpected),
        (S::Idle, Action::SelectEntryKind(_) | Action::SelectMedium(_)) => {
            Err(TurnError::UnexpectedSelection)
        }

        (S::AwaitingEntryKind, Action::SelectEntryKind(choice)) => {
            let meal = |category| Step {
                next: S::AwaitingInputMedium { category },
                effect: Effect::PromptMedium(category),
            };
            Ok(match choice {
                EntryChoice::Breakfast => meal(MealCategory::Breakfast),
                EntryChoice::Lunch => meal(MealCategory::Lunch),
                EntryChoice::Dinner => meal(MealCategory::Dinner),
                EntryChoice::Snack => meal(MealCategory::Snack),
                // Активность описывается только текстом, выбор медиума пропускаем
                EntryChoice::Activity => Step {
                    next: S::AwaitingPayload {
                        target: PayloadTarget::Activity,
                        medium: InputMedium::Text,
                    },
                    effect: Effect::PromptPayload(PayloadTarget::Activity, InputMedium::Text),
                },
            })
        }

        (S::AwaitingInputMedium { category }, Action::SelectMedium(medium)) => {
            let target = PayloadTarget::Meal(category);
            Ok(Step {
                next: S::AwaitingPayload { target, medium },
                effect: Effect::PromptPayload(target, medium),
            })
        }

        (S::AwaitingPayload { target, medium }, Action::Text(text)) => match medium {
            InputMedium::Text => Ok(Step {
                next: S::Idle,
                effect: Effect::Analyze {
                    target,
                    text: Some(text),
                    photo_ref: None,
                },
            }),
            InputMedium::Photo => Err(TurnError::ExpectedPhoto),
        },
        (S::AwaitingPayload { target, medium }, Action::Photo { photo_ref, caption }) => {
            match medium {
                InputMedium::Photo => Ok(Step {
                    next: S::Idle,
                    effect: Effect::Analyze {
                        target,
                        text: caption,
                        photo_ref: Some(photo_ref),
                    },
                }),
                InputMedium::Text => Err(TurnError::ExpectedText),
            }
        }

        (S::AwaitingFreeQuestion, Action::Text(question)) => Ok(Step {
            next: S::Idle,
            effect: Effect::Answer { question },
        }),
        (S::AwaitingFreeQuestion, Action::Photo { .. }) => Err(TurnError::ExpectedText),

        (_, Action::NewEntry | Action::AskQuestion) => Err(TurnError::EntryInProgress),
        (_, Action::SelectEntryKind(_) | Action::SelectMedium(_)) => {
            Err(TurnError::UnexpectedSelection)
        }
        (_, Action::Text(_) | Action::Photo { .. }) => Err(TurnError::ExpectedSelection),
    }
}
