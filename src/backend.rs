use crate::model::{Exercise, StudySession, Test, TestAttempt, TimetableConfig, TopicStatus};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Payloads understood by the persistence backend, discriminated by `action`.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BackendAction {
    UpdateProgress {
        student_id: i64,
        topic_id: String,
        status: TopicStatus,
        exercise: Option<Exercise>,
        solved: Option<u32>,
        total: Option<u32>,
    },
    CreateTest {
        test: Test,
    },
    SaveAttempt {
        attempt: TestAttempt,
    },
    SaveTimetableConfig {
        student_id: i64,
        config: TimetableConfig,
    },
    SaveStudySession {
        session: StudySession,
    },
}

impl BackendAction {
    pub fn name(&self) -> &'static str {
        match self {
            BackendAction::UpdateProgress { .. } => "update_progress",
            BackendAction::CreateTest { .. } => "create_test",
            BackendAction::SaveAttempt { .. } => "save_attempt",
            BackendAction::SaveTimetableConfig { .. } => "save_timetable_config",
            BackendAction::SaveStudySession { .. } => "save_study_session",
        }
    }
}

/// Fire-and-forget client. Responses are never read and failures are only
/// logged.
#[derive(Clone)]
pub struct BackendClient {
    url: Option<String>,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(url: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { url, client }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(1))
    }

    pub fn enabled(&self) -> bool {
        self.url.is_some()
    }

    pub fn dispatch(&self, action: BackendAction) {
        let Some(url) = self.url.clone() else {
            debug!(action = action.name(), "demo mode, backend sync skipped");
            return;
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            let name = action.name();
            match client.post(&url).json(&action).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(action = name, status = %resp.status(), "backend sync sent");
                }
                Ok(resp) => {
                    warn!(action = name, status = %resp.status(), "backend sync rejected");
                }
                Err(e) => {
                    warn!(action = name, error = %e, "backend sync failed");
                }
            }
        });
    }
}
