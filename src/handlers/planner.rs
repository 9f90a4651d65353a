use crate::backend::BackendAction;
use crate::error::{AppError, Result};
use crate::focus::{FocusSettings, FocusTimer};
use crate::model::{Subject, TimetableConfig};
use crate::state::AppState;
use crate::timer::spawn_focus_countdown;
use crate::timetable;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

#[derive(Deserialize)]
pub struct FocusRequest {
    subject: Subject,
    #[serde(default)]
    settings: Option<FocusSettings>,
}

pub async fn get_timetable(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let config = state.lock().timetable_config(path.into_inner())?;
    let schedule = timetable::generate(&config)?;
    Ok(HttpResponse::Ok().json(json!({ "config": config, "schedule": schedule })))
}

pub async fn save_timetable(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    config: web::Json<TimetableConfig>,
) -> Result<HttpResponse> {
    let student_id = path.into_inner();
    let config = config.into_inner();
    let schedule = timetable::generate(&config)?;
    state.lock().save_timetable_config(student_id, config.clone())?;
    state.backend.dispatch(BackendAction::SaveTimetableConfig {
        student_id,
        config: config.clone(),
    });
    Ok(HttpResponse::Ok().json(json!({ "config": config, "schedule": schedule })))
}

// Generates a schedule without saving the config
pub async fn preview_timetable(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    config: web::Json<TimetableConfig>,
) -> Result<HttpResponse> {
    state.lock().student(path.into_inner())?;
    let schedule = timetable::generate(&config)?;
    Ok(HttpResponse::Ok().json(schedule))
}

pub async fn get_focus(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let timer = state.lock().focus(path.into_inner())?.clone();
    Ok(HttpResponse::Ok().json(timer))
}

pub async fn start_focus(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<FocusRequest>,
) -> Result<HttpResponse> {
    let student_id = path.into_inner();
    let settings = req.settings.unwrap_or_default();
    let timer = FocusTimer::new(student_id, req.subject, settings)?;
    let timer = state.lock().start_focus(timer)?.clone();
    info!(student_id, subject = timer.subject.name(), "focus session started");
    spawn_focus_countdown(state.clone(), student_id, timer.id);
    Ok(HttpResponse::Created().json(timer))
}

pub async fn focus_action(
    state: web::Data<AppState>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse> {
    let (student_id, action) = path.into_inner();
    if action == "finish" {
        let session = state.lock().finish_focus(student_id)?;
        info!(
            student_id,
            focus_minutes = session.focus_minutes,
            cycles = session.cycles_completed,
            "focus session finished"
        );
        state.backend.dispatch(BackendAction::SaveStudySession { session: session.clone() });
        return Ok(HttpResponse::Ok().json(session));
    }

    let mut store = state.lock();
    let timer = store.focus_mut(student_id)?;
    match action.as_str() {
        "pause" => timer.pause()?,
        "resume" => timer.resume()?,
        "reset" => timer.reset(),
        "skip" => {
            let change = timer.skip();
            return Ok(HttpResponse::Ok().json(json!({ "timer": timer, "change": change })));
        }
        other => {
            return Err(AppError::Validation(format!("unknown focus action {}", other)));
        }
    }
    Ok(HttpResponse::Ok().json(&*timer))
}

pub async fn study_sessions(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let store = state.lock();
    let student_id = path.into_inner();
    store.student(student_id)?;
    Ok(HttpResponse::Ok().json(store.study_sessions(student_id)))
}
