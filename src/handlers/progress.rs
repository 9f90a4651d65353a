use crate::backend::BackendAction;
use crate::error::{AppError, Result};
use crate::model::{Exercise, TopicProgress, TopicStatus};
use crate::state::AppState;
use crate::syllabus::catalog;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct StatusRequest {
    status: TopicStatus,
}

/// Raw counter input; negative values are clamped, not rejected.
#[derive(Deserialize)]
pub struct CounterRequest {
    solved: i64,
    total: i64,
}

#[derive(Deserialize)]
pub struct AdjustRequest {
    delta: i64,
}

fn parse_exercise(raw: &str) -> Result<Exercise> {
    Exercise::parse(raw).ok_or_else(|| AppError::Validation(format!("unknown exercise {}", raw)))
}

fn sync(state: &AppState, student_id: i64, topic_id: String, exercise: Option<Exercise>, progress: &TopicProgress) {
    let counter = exercise.and_then(|ex| progress.exercises.get(&ex).copied());
    state.backend.dispatch(BackendAction::UpdateProgress {
        student_id,
        topic_id,
        status: progress.status,
        exercise,
        solved: counter.map(|c| c.solved),
        total: counter.map(|c| c.total),
    });
}

pub async fn get_syllabus() -> HttpResponse {
    HttpResponse::Ok().json(catalog())
}

pub async fn get_progress(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let progress = state.lock().progress(path.into_inner())?;
    Ok(HttpResponse::Ok().json(progress.report()))
}

pub async fn set_status(
    state: web::Data<AppState>,
    path: web::Path<(i64, String)>,
    req: web::Json<StatusRequest>,
) -> Result<HttpResponse> {
    let (student_id, topic_id) = path.into_inner();
    let updated = state.lock().progress_mut(student_id)?.set_status(&topic_id, req.status)?;
    sync(&state, student_id, topic_id, None, &updated);
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn set_counter(
    state: web::Data<AppState>,
    path: web::Path<(i64, String, String)>,
    req: web::Json<CounterRequest>,
) -> Result<HttpResponse> {
    let (student_id, topic_id, exercise) = path.into_inner();
    let exercise = parse_exercise(&exercise)?;
    let updated = state
        .lock()
        .progress_mut(student_id)?
        .update_counter(&topic_id, exercise, req.solved, req.total)?;
    sync(&state, student_id, topic_id, Some(exercise), &updated);
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn adjust_counter(
    state: web::Data<AppState>,
    path: web::Path<(i64, String, String)>,
    req: web::Json<AdjustRequest>,
) -> Result<HttpResponse> {
    let (student_id, topic_id, exercise) = path.into_inner();
    let exercise = parse_exercise(&exercise)?;
    let updated = state
        .lock()
        .progress_mut(student_id)?
        .adjust_counter(&topic_id, exercise, req.delta)?;
    sync(&state, student_id, topic_id, Some(exercise), &updated);
    Ok(HttpResponse::Ok().json(updated))
}
