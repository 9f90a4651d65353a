use crate::assistant::Prompt;
use crate::error::{AppError, Result};
use crate::model::Subject;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct MotivationRequest {
    name: String,
    #[serde(default)]
    days_to_exam: Option<u32>,
}

#[derive(Deserialize)]
pub struct TipRequest {
    subject: Subject,
}

#[derive(Deserialize)]
pub struct AskRequest {
    question: String,
}

pub async fn motivation(
    state: web::Data<AppState>,
    req: web::Json<MotivationRequest>,
) -> HttpResponse {
    let req = req.into_inner();
    let reply = state
        .assistant
        .reply(Prompt::Motivation { name: req.name, days_to_exam: req.days_to_exam })
        .await;
    HttpResponse::Ok().json(reply)
}

pub async fn study_tip(state: web::Data<AppState>, req: web::Json<TipRequest>) -> HttpResponse {
    let reply = state.assistant.reply(Prompt::StudyTip { subject: req.subject }).await;
    HttpResponse::Ok().json(reply)
}

pub async fn ask(state: web::Data<AppState>, req: web::Json<AskRequest>) -> Result<HttpResponse> {
    let question = req.into_inner().question;
    if question.trim().is_empty() {
        return Err(AppError::Validation("question must not be empty".to_string()));
    }
    let reply = state.assistant.reply(Prompt::Ask { question }).await;
    Ok(HttpResponse::Ok().json(reply))
}
