use crate::backend::BackendAction;
use crate::error::Result;
use crate::state::AppState;
use crate::test_session::Navigation;
use crate::timer::spawn_test_countdown;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct BeginRequest {
    test_id: i64,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    question_id: i64,
    option: usize,
}

#[derive(Deserialize)]
pub struct ClearRequest {
    question_id: i64,
}

#[derive(Serialize)]
struct TestSummary {
    id: i64,
    name: String,
    subject: Option<crate::model::Subject>,
    duration_minutes: u32,
    question_count: usize,
    marks_correct: u32,
    marks_incorrect: u32,
}

// Published tests, without question content
pub async fn list_tests(state: web::Data<AppState>) -> HttpResponse {
    let tests: Vec<TestSummary> = state
        .lock()
        .tests(true)
        .into_iter()
        .map(|t| TestSummary {
            id: t.id,
            name: t.name,
            subject: t.subject,
            duration_minutes: t.duration_minutes,
            question_count: t.question_ids.len(),
            marks_correct: t.marks_correct,
            marks_incorrect: t.marks_incorrect,
        })
        .collect();
    HttpResponse::Ok().json(tests)
}

pub async fn begin_session(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<BeginRequest>,
) -> Result<HttpResponse> {
    let student_id = path.into_inner();
    let view = state.lock().begin_session(student_id, req.test_id)?.view();
    info!(session_id = %view.id, student_id, test_id = req.test_id, "test started");
    spawn_test_countdown(state.clone(), view.id);
    Ok(HttpResponse::Created().json(view))
}

pub async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let view = state.lock().session(path.into_inner())?.view();
    Ok(HttpResponse::Ok().json(view))
}

pub async fn answer(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<AnswerRequest>,
) -> Result<HttpResponse> {
    let mut store = state.lock();
    let session = store.session_mut(path.into_inner())?;
    session.select_answer(req.question_id, req.option)?;
    Ok(HttpResponse::Ok().json(session.view()))
}

pub async fn clear(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ClearRequest>,
) -> Result<HttpResponse> {
    let mut store = state.lock();
    let session = store.session_mut(path.into_inner())?;
    session.clear_answer(req.question_id)?;
    Ok(HttpResponse::Ok().json(session.view()))
}

pub async fn navigate(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    nav: web::Json<Navigation>,
) -> Result<HttpResponse> {
    let mut store = state.lock();
    let session = store.session_mut(path.into_inner())?;
    session.navigate(nav.into_inner())?;
    Ok(HttpResponse::Ok().json(session.view()))
}

pub async fn submit(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let session_id = path.into_inner();
    let (attempt, review) = {
        let mut store = state.lock();
        let session = store.session_mut(session_id)?;
        let attempt = session.submit()?;
        let review = session.review()?;
        (store.record_attempt(attempt), review)
    };
    info!(
        %session_id,
        student_id = attempt.student_id,
        score = attempt.score,
        "test submitted"
    );
    state.backend.dispatch(BackendAction::SaveAttempt { attempt: attempt.clone() });
    Ok(HttpResponse::Ok().json(json!({ "attempt": attempt, "review": review })))
}

pub async fn review(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let review = state.lock().session(path.into_inner())?.review()?;
    Ok(HttpResponse::Ok().json(review))
}

pub async fn list_attempts(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let store = state.lock();
    let student_id = path.into_inner();
    store.student(student_id)?;
    Ok(HttpResponse::Ok().json(store.attempts_for(student_id)))
}
