//! Turn orchestration over the state machine.
//!
//! A turn locks the user's session, runs the pure transition, executes the
//! resulting effect, and only then commits the next state. For effects that
//! call collaborators the journal insert happens before any in-memory
//! mutation, so a failed write leaves both the session and the returned state
//! exactly as they were and the user can retry the same payload.

use thiserror::Error;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use crate::analysis::{parse_activity, parse_meal};
use crate::entries::{self, NewEntry};
use crate::model::Payload;
use crate::profile;
use crate::prompts;
use crate::state::AppState;

use super::machine::{
    transition, Action, ConversationState, Effect, InputMedium, PayloadTarget, TurnError,
};
use super::recap::{build_recap, category_breakdown, format_date, render_recap, render_totals, DayRecap};
use super::session::TrackingSession;
use super::totals::{DailyTotals, Goals};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error("temporary failure, please try again")]
    Transient(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct TurnOutcome {
    pub message: String,
    pub state: ConversationState,
    pub totals: DailyTotals,
}

#[derive(Debug)]
pub struct DayStart {
    pub date: Date,
    pub goals: Goals,
    pub message: String,
}

#[derive(Debug)]
pub struct DayEnd {
    pub date: Date,
    pub totals: DailyTotals,
    pub message: String,
}

/// Opens a tracking day: snapshots goals from the profile and creates a fresh
/// session. A stale session from an abandoned day is discarded here.
pub async fn start_day(state: &AppState, user_id: i64) -> Result<DayStart, ServiceError> {
    // Ход на предыдущей сессии ещё идёт — рестарт ждёт своей очереди
    let previous = state.sessions.get(user_id).await;
    let _stale = match previous.as_ref() {
        Some(handle) => Some(handle.try_lock().map_err(|_| TurnError::Busy)?),
        None => None,
    };

    let profile = profile::repo::get(&state.db, user_id)
        .await?
        .ok_or(TurnError::ProfileMissing)?;

    let date = OffsetDateTime::now_utc().date();
    let goals = profile.goals();
    let system_context = prompts::system_context(&profile);

    state
        .sessions
        .create(TrackingSession::new(user_id, date, goals, system_context))
        .await;
    info!(%user_id, %date, "day started");

    Ok(DayStart {
        date,
        goals,
        message: format!(
            "📅 Day {} started! Log meals and activity as you go.",
            format_date(date)
        ),
    })
}

/// Runs one user action against the session's state machine.
pub async fn act(state: &AppState, user_id: i64, action: Action) -> Result<TurnOutcome, ServiceError> {
    let handle = state
        .sessions
        .get(user_id)
        .await
        .ok_or(TurnError::DayNotStarted)?;
    let mut session = handle.try_lock().map_err(|_| TurnError::Busy)?;

    let step = transition(session.state, action)?;

    let message = match step.effect {
        Effect::PromptEntryKind => {
            "What would you like to log? Choose: breakfast, lunch, dinner, snack or activity."
                .to_string()
        }
        Effect::PromptMedium(category) => format!(
            "How will you log your {}? Send a photo or describe it in text.",
            category.as_str()
        ),
        Effect::PromptPayload(target, medium) => prompt_payload(target, medium),
        Effect::PromptQuestion => "What would you like to ask?".to_string(),
        Effect::Cancelled => "❌ Cancelled.".to_string(),
        Effect::Analyze {
            target,
            text,
            photo_ref,
        } => analyze_turn(state, &mut session, target, text, photo_ref).await?,
        Effect::Answer { question } => answer_turn(state, &mut session, question).await?,
    };

    // Переход фиксируем только после успешного эффекта
    session.state = step.next;

    Ok(TurnOutcome {
        message,
        state: session.state,
        totals: session.totals,
    })
}

/// Closes the day: final recap vs goals, model recommendation, day-summary
/// journal row, session cleared. Only reachable from `Idle`.
pub async fn end_day(state: &AppState, user_id: i64) -> Result<DayEnd, ServiceError> {
    let handle = state
        .sessions
        .get(user_id)
        .await
        .ok_or(TurnError::DayNotStarted)?;
    let session = handle.try_lock().map_err(|_| TurnError::Busy)?;

    if session.state != ConversationState::Idle {
        return Err(TurnError::EntryInProgress.into());
    }

    let entries = entries::list_for_date(&state.db, user_id, session.date).await?;
    let recap = build_recap(session.date, &entries);
    let recap_text = render_recap(&recap, Some(&session.goals));

    let request = format!(
        "The day is over. Here is the final recap:\n\n{recap_text}\n\n\
         Give a short recommendation for tomorrow based on how the day went."
    );
    let recommendation = state
        .model
        .complete(&session.system_context, &session.analyses, Payload::Text(request))
        .await
        .map_err(|e| {
            warn!(error = %e, %user_id, "day-end recommendation failed");
            ServiceError::Transient(e)
        })?;

    let message = format!(
        "✅ Day {} finished!\n\n{recap_text}\n\n{recommendation}",
        format_date(session.date)
    );

    let summary = summary_entry(user_id, &recap, message.clone());
    entries::append(&state.db, &summary).await?;

    let (date, totals) = (session.date, recap.totals);
    drop(session);
    state.sessions.clear(user_id).await;
    info!(%user_id, %date, "day finished");

    Ok(DayEnd {
        date,
        totals,
        message,
    })
}

/// Day-summary row for the closing day. Fact columns come from the recap
/// fold over the date's persisted rows, not the in-memory session: rows left
/// on the same date by a previously discarded session must count too, or the
/// stored totals diverge from the recap text rendered from the same fold.
fn summary_entry(user_id: i64, recap: &DayRecap, message: String) -> NewEntry {
    NewEntry::day_summary(
        user_id,
        recap.date,
        &recap.totals,
        message,
        category_breakdown(recap),
    )
}

fn prompt_payload(target: PayloadTarget, medium: InputMedium) -> String {
    match (target, medium) {
        (PayloadTarget::Meal(category), InputMedium::Photo) => {
            format!("📷 Send a photo of your {}.", category.as_str())
        }
        (PayloadTarget::Meal(category), InputMedium::Text) => {
            format!("✍️ Describe your {} in text.", category.as_str())
        }
        (PayloadTarget::Activity, _) => {
            "✍️ Describe your activity: what you did and for how long.".to_string()
        }
    }
}

async fn analyze_turn(
    state: &AppState,
    session: &mut TrackingSession,
    target: PayloadTarget,
    text: Option<String>,
    photo_ref: Option<String>,
) -> Result<String, ServiceError> {
    let payload = match photo_ref.clone() {
        Some(photo_ref) => Payload::Photo {
            photo_ref,
            caption: text.clone(),
        },
        None => Payload::Text(text.clone().unwrap_or_default()),
    };
    let format = match target {
        PayloadTarget::Meal(_) => prompts::RESPONSE_FORMAT_MEAL,
        PayloadTarget::Activity => prompts::RESPONSE_FORMAT_ACTIVITY,
    };
    let system_context = format!("{}\n\n{format}", session.system_context);

    let raw = state
        .model
        .complete(&system_context, &session.analyses, payload)
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %session.user_id, "analysis call failed");
            ServiceError::Transient(e)
        })?;

    // Сначала запись в журнал, потом изменение сессии
    let message = match target {
        PayloadTarget::Meal(category) => {
            let facts = parse_meal(&raw);
            let entry = NewEntry::meal(
                session.user_id,
                session.date,
                category.as_str(),
                text,
                photo_ref,
                raw.clone(),
                &facts,
            );
            entries::append(&state.db, &entry).await?;

            session.totals.add_meal(&facts);
            session.analyses.push(raw.clone());
            format!(
                "🍽 Meal analysis:\n{raw}\n\n{}",
                render_totals(&session.totals, Some(&session.goals))
            )
        }
        PayloadTarget::Activity => {
            let facts = parse_activity(&raw);
            let entry = NewEntry::activity(session.user_id, session.date, text, raw.clone(), &facts);
            entries::append(&state.db, &entry).await?;

            session.totals.add_activity(&facts);
            session.analyses.push(raw.clone());
            format!(
                "🏃 Activity analysis:\n{raw}\n\n{}",
                render_totals(&session.totals, Some(&session.goals))
            )
        }
    };
    Ok(message)
}

async fn answer_turn(
    state: &AppState,
    session: &mut TrackingSession,
    question: String,
) -> Result<String, ServiceError> {
    let context = format!(
        "Current daily status:\n{}\n\nUser question: {question}",
        render_totals(&session.totals, Some(&session.goals))
    );

    let answer = state
        .model
        .complete(&session.system_context, &session.analyses, Payload::Text(context))
        .await
        .map_err(|e| {
            warn!(error = %e, user_id = %session.user_id, "advice call failed");
            ServiceError::Transient(e)
        })?;

    let entry = NewEntry::query(session.user_id, session.date, question, answer.clone());
    entries::append(&state.db, &entry).await?;

    Ok(format!("💡 {answer}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MealFacts;
    use crate::entries::LogEntry;
    use crate::model::ModelClient;
    use crate::tracking::machine::EntryChoice;
    use axum::async_trait;
    use std::sync::Arc;
    use time::macros::date;
    use time::OffsetDateTime;
    use uuid::Uuid;

    struct DownModel;

    #[async_trait]
    impl ModelClient for DownModel {
        async fn complete(
            &self,
            _system_context: &str,
            _history: &[String],
            _payload: Payload,
        ) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    async fn open_session(state: &AppState, user_id: i64) {
        let goals = Goals {
            calories: 2000,
            protein: 150,
            fat: 60,
            carbs: 200,
        };
        state
            .sessions
            .create(TrackingSession::new(
                user_id,
                date!(2025 - 05 - 10),
                goals,
                "ctx".into(),
            ))
            .await;
    }

    #[tokio::test]
    async fn action_without_open_day_is_rejected() {
        let state = AppState::fake();
        let err = act(&state, 1, Action::NewEntry).await.unwrap_err();
        assert!(matches!(err, ServiceError::Turn(TurnError::DayNotStarted)));
    }

    #[tokio::test]
    async fn prompt_effects_advance_state_without_side_effects() {
        let state = AppState::fake();
        open_session(&state, 1).await;

        let outcome = act(&state, 1, Action::NewEntry).await.unwrap();
        assert_eq!(outcome.state, ConversationState::AwaitingEntryKind);
        assert!(outcome.message.contains("breakfast"));

        let outcome = act(&state, 1, Action::SelectEntryKind(EntryChoice::Activity))
            .await
            .unwrap();
        assert_eq!(
            outcome.state,
            ConversationState::AwaitingPayload {
                target: PayloadTarget::Activity,
                medium: InputMedium::Text,
            }
        );
        assert_eq!(outcome.totals, DailyTotals::default());
    }

    #[tokio::test]
    async fn cancel_resets_to_idle() {
        let state = AppState::fake();
        open_session(&state, 1).await;
        act(&state, 1, Action::NewEntry).await.unwrap();

        let outcome = act(&state, 1, Action::Cancel).await.unwrap();
        assert_eq!(outcome.state, ConversationState::Idle);
    }

    #[tokio::test]
    async fn invalid_action_leaves_state_unchanged() {
        let state = AppState::fake();
        open_session(&state, 1).await;
        act(&state, 1, Action::NewEntry).await.unwrap();

        let err = act(&state, 1, Action::Text("hi".into())).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Turn(TurnError::ExpectedSelection)
        ));

        // Всё ещё ждём выбор типа записи
        let outcome = act(&state, 1, Action::SelectEntryKind(EntryChoice::Snack))
            .await
            .unwrap();
        assert!(matches!(
            outcome.state,
            ConversationState::AwaitingInputMedium { .. }
        ));
    }

    async fn walk_to_payload(state: &AppState, user_id: i64) {
        act(state, user_id, Action::NewEntry).await.unwrap();
        act(state, user_id, Action::SelectEntryKind(EntryChoice::Lunch))
            .await
            .unwrap();
        act(state, user_id, Action::SelectMedium(InputMedium::Text))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_analysis_reverts_to_the_pre_attempt_state() {
        let mut state = AppState::fake();
        state.model = Arc::new(DownModel);
        open_session(&state, 1).await;
        walk_to_payload(&state, 1).await;

        let err = act(&state, 1, Action::Text("pasta".into())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transient(_)));

        let handle = state.sessions.get(1).await.unwrap();
        {
            let session = handle.try_lock().unwrap();
            assert!(matches!(
                session.state,
                ConversationState::AwaitingPayload { .. }
            ));
            assert_eq!(session.totals, DailyTotals::default());
            assert!(session.analyses.is_empty());
        }

        // Повтор того же ввода снова уходит в анализ, а не в ошибку состояния
        let err = act(&state, 1, Action::Text("pasta".into())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transient(_)));
    }

    #[tokio::test]
    async fn failed_journal_write_leaves_the_session_untouched() {
        let mut state = AppState::fake();
        // Модель отвечает, но журнал недоступен
        state.db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:9/closed")
            .unwrap();
        open_session(&state, 1).await;
        walk_to_payload(&state, 1).await;

        let err = act(&state, 1, Action::Text("pasta".into())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transient(_)));

        let handle = state.sessions.get(1).await.unwrap();
        let session = handle.try_lock().unwrap();
        assert!(matches!(
            session.state,
            ConversationState::AwaitingPayload { .. }
        ));
        assert_eq!(session.totals, DailyTotals::default());
        assert!(session.analyses.is_empty());
    }

    #[test]
    fn day_summary_counts_rows_left_by_a_discarded_session() {
        let d = date!(2025 - 05 - 10);
        let facts = MealFacts {
            description: "Omelette".into(),
            calories: 350,
            protein: 22,
            fat: 25,
            carbs: 4,
        };
        // Запись осталась от сессии, сброшенной повторным стартом того же дня
        let earlier = NewEntry::meal(
            1,
            d,
            "breakfast",
            None,
            None,
            "<analysis>Omelette</analysis>\n<nutrients>\nCalories: 350 kcal\nProtein: 22 g\nFat: 25 g\nCarbs: 4 g\n</nutrients>".into(),
            &facts,
        );
        let rows = vec![LogEntry {
            id: Uuid::nil(),
            user_id: earlier.user_id,
            entry_date: earlier.entry_date,
            logged_at: OffsetDateTime::UNIX_EPOCH,
            kind: earlier.kind.as_str().into(),
            category: earlier.category,
            input_text: earlier.input_text,
            photo_ref: earlier.photo_ref,
            raw_analysis: earlier.raw_analysis,
            calories: earlier.calories,
            protein_g: earlier.protein_g,
            fat_g: earlier.fat_g,
            carbs_g: earlier.carbs_g,
            calories_burned: earlier.calories_burned,
            extra: earlier.extra,
        }];

        let recap = build_recap(d, &rows);
        let entry = summary_entry(1, &recap, "recap".into());

        // Колонки итогов совпадают со свёрткой, из которой отрисован текст,
        // хотя свежая сессия этих записей не видела
        assert_eq!(entry.calories, 350);
        assert_eq!(entry.protein_g, 22);
        assert_eq!(entry.fat_g, 25);
        assert_eq!(entry.carbs_g, 4);
        assert_ne!(entry.calories, DailyTotals::default().calories_consumed);
    }

    #[tokio::test]
    async fn restart_mid_turn_is_rejected_as_busy() {
        let state = AppState::fake();
        open_session(&state, 1).await;
        let handle = state.sessions.get(1).await.unwrap();
        let _mid_turn = handle.lock().await;

        let err = start_day(&state, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Turn(TurnError::Busy)));
    }

    #[tokio::test]
    async fn concurrent_turn_is_rejected_as_busy() {
        let state = AppState::fake();
        open_session(&state, 1).await;

        let handle = state.sessions.get(1).await.unwrap();
        let _mid_turn = handle.lock().await;

        let err = act(&state, 1, Action::NewEntry).await.unwrap_err();
        assert!(matches!(err, ServiceError::Turn(TurnError::Busy)));
    }

    #[tokio::test]
    async fn end_day_requires_idle() {
        let state = AppState::fake();
        open_session(&state, 1).await;
        act(&state, 1, Action::NewEntry).await.unwrap();

        let err = end_day(&state, 1).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Turn(TurnError::EntryInProgress)
        ));
    }

    #[tokio::test]
    async fn end_day_without_open_day_is_rejected() {
        let state = AppState::fake();
        let err = end_day(&state, 9).await.unwrap_err();
        assert!(matches!(err, ServiceError::Turn(TurnError::DayNotStarted)));
    }
}
