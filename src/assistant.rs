use crate::error::{AppError, Result};
use crate::model::Subject;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const MOTIVATION_FALLBACKS: &[&str] = &[
    "Every problem you solve today is one less surprise in the exam hall. Keep going!",
    "Consistency beats intensity. One focused hour today matters more than a perfect plan.",
    "Toppers were once beginners who refused to quit. Open the next chapter.",
    "Your rank is built one concept at a time. Make today's concept count.",
];

const TIP_FALLBACKS: &[&str] = &[
    "Revise formulas from memory before opening your notes.",
    "Attempt a timed set of ten questions and review every mistake.",
    "Teach today's topic aloud in five minutes; gaps show up quickly.",
    "Mark questions you guessed on and revisit them tomorrow.",
];

const ASK_FALLBACK: &str =
    "The study assistant is unavailable right now. Please ask your mentor or try again later.";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Ai,
    Fallback,
}

#[derive(Debug, Serialize, Clone)]
pub struct AssistantReply {
    pub text: String,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Motivation { name: String, days_to_exam: Option<u32> },
    StudyTip { subject: Subject },
    Ask { question: String },
}

impl Prompt {
    pub fn render(&self) -> String {
        match self {
            Prompt::Motivation { name, days_to_exam } => {
                let countdown = days_to_exam
                    .map(|d| format!(" with {} days left until the exam", d))
                    .unwrap_or_default();
                format!(
                    "Write a short, warm motivational message (max 2 sentences) for {}, a JEE aspirant{}.",
                    name, countdown
                )
            }
            Prompt::StudyTip { subject } => format!(
                "Give one practical, specific study tip for JEE {} in under 40 words.",
                subject.name()
            ),
            Prompt::Ask { question } => format!(
                "You are a helpful JEE tutor. Answer concisely and accurately:\n{}",
                question
            ),
        }
    }

    fn fallback(&self) -> String {
        let pool = match self {
            Prompt::Motivation { .. } => MOTIVATION_FALLBACKS,
            Prompt::StudyTip { .. } => TIP_FALLBACKS,
            Prompt::Ask { .. } => return ASK_FALLBACK.to_string(),
        };
        pool.choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(ASK_FALLBACK)
            .to_string()
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

#[derive(Clone)]
pub struct Assistant {
    api_key: Option<String>,
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl Assistant {
    pub fn new(api_key: Option<String>, endpoint: String, model: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { api_key, endpoint, model, client }
    }

    pub fn offline() -> Self {
        Self::new(None, String::new(), String::new(), Duration::from_secs(1))
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Runs one prompt. Never fails: any problem yields the canned text.
    pub async fn reply(&self, prompt: Prompt) -> AssistantReply {
        let Some(key) = self.api_key.as_deref() else {
            debug!("no assistant credential configured, using fallback");
            return AssistantReply { text: prompt.fallback(), source: Source::Fallback };
        };
        match self.complete(key, &prompt.render()).await {
            Ok(text) => AssistantReply { text, source: Source::Ai },
            Err(e) => {
                warn!(error = %e, "assistant call failed, using fallback");
                AssistantReply { text: prompt.fallback(), source: Source::Fallback }
            }
        }
    }

    async fn complete(&self, key: &str, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": 200,
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("assistant request failed: {}", e)))?;
        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!("assistant returned {}", resp.status())));
        }
        let parsed: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("assistant response unreadable: {}", e)))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::Upstream("assistant returned no text".to_string()))
    }
}
