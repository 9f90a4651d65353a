use crate::backend::BackendAction;
use crate::model::TestAttempt;
use crate::state::AppState;
use crate::test_session::SessionStatus;
use actix_web::web;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of advancing a test session's clock by one second.
#[derive(Debug)]
pub enum Countdown {
    Running,
    Stopped,
    Finished(TestAttempt),
}

/// One second of a test countdown. When the clock runs out the attempt is
/// recorded and sent to the backend.
pub fn tick_session(state: &AppState, session_id: Uuid) -> Countdown {
    let finished = {
        let mut store = state.lock();
        let Ok(session) = store.session_mut(session_id) else {
            debug!(%session_id, "session gone, countdown stopped");
            return Countdown::Stopped;
        };
        if session.status() != SessionStatus::InProgress {
            return Countdown::Stopped;
        }
        let outcome = session.tick();
        match outcome {
            Some(attempt) => store.record_attempt(attempt),
            None => return Countdown::Running,
        }
    };
    info!(
        %session_id,
        student_id = finished.student_id,
        score = finished.score,
        "time up, test auto-submitted"
    );
    state.backend.dispatch(BackendAction::SaveAttempt { attempt: finished.clone() });
    Countdown::Finished(finished)
}

/// Drives one test session's countdown, one tick per second, until the
/// session finishes or is removed.
pub fn spawn_test_countdown(state: web::Data<AppState>, session_id: Uuid) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            match tick_session(&state, session_id) {
                Countdown::Running => continue,
                Countdown::Stopped | Countdown::Finished(_) => return,
            }
        }
    });
}

/// Drives a student's focus timer until it is finished or replaced.
pub fn spawn_focus_countdown(state: web::Data<AppState>, student_id: i64, timer_id: Uuid) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await;
        loop {
            interval.tick().await;
            let change = {
                let mut store = state.lock();
                let timer = match store.focus_mut(student_id) {
                    Ok(timer) if timer.id == timer_id => timer,
                    _ => {
                        debug!(student_id, "focus session gone, timer stopped");
                        return;
                    }
                };
                timer.tick()
            };
            if let Some(change) = change {
                info!(student_id, from = ?change.from, to = ?change.to, "focus phase changed");
            }
        }
    });
}
