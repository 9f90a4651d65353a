use crate::backend::BackendAction;
use crate::data::{export_attempts as attempts_csv, load_questions};
use crate::error::Result;
use crate::model::{NewNotification, NewQuestion, NewTest, NewUser, UserUpdate};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::info;

pub async fn list_users(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.lock().users())
}

pub async fn create_user(state: web::Data<AppState>, req: web::Json<NewUser>) -> Result<HttpResponse> {
    let user = state.lock().create_user(req.into_inner())?;
    info!(user_id = user.id, role = %user.role, "user created by admin");
    Ok(HttpResponse::Created().json(user))
}

pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<UserUpdate>,
) -> Result<HttpResponse> {
    let user = state.lock().update_user(path.into_inner(), req.into_inner())?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn delete_user(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let user = state.lock().delete_user(path.into_inner())?;
    info!(user_id = user.id, "user deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_questions(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.lock().questions())
}

pub async fn create_question(
    state: web::Data<AppState>,
    req: web::Json<NewQuestion>,
) -> Result<HttpResponse> {
    let question = state.lock().create_question(req.into_inner())?;
    Ok(HttpResponse::Created().json(question))
}

pub async fn update_question(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<NewQuestion>,
) -> Result<HttpResponse> {
    let question = state.lock().update_question(path.into_inner(), req.into_inner())?;
    Ok(HttpResponse::Ok().json(question))
}

pub async fn delete_question(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    state.lock().delete_question(path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

// Bulk question upload, CSV in the request body
pub async fn import_questions(state: web::Data<AppState>, body: String) -> Result<HttpResponse> {
    let parsed = load_questions(&body)?;
    let created = state.lock().import_questions(parsed)?;
    info!(count = created.len(), "questions imported");
    Ok(HttpResponse::Created().json(json!({
        "imported": created.len(),
        "questions": created,
    })))
}

pub async fn list_tests(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.lock().tests(false))
}

pub async fn create_test(state: web::Data<AppState>, req: web::Json<NewTest>) -> Result<HttpResponse> {
    let test = state.lock().create_test(req.into_inner())?;
    info!(test_id = test.id, questions = test.question_ids.len(), "test created");
    state.backend.dispatch(BackendAction::CreateTest { test: test.clone() });
    Ok(HttpResponse::Created().json(test))
}

pub async fn update_test(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    req: web::Json<NewTest>,
) -> Result<HttpResponse> {
    let test = state.lock().update_test(path.into_inner(), req.into_inner())?;
    Ok(HttpResponse::Ok().json(test))
}

pub async fn delete_test(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    state.lock().delete_test(path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn export_attempts(state: web::Data<AppState>) -> Result<HttpResponse> {
    let csv_text = attempts_csv(state.lock().all_attempts())?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(("Content-Disposition", "attachment; filename=\"attempts.csv\""))
        .body(csv_text))
}

pub async fn create_notification(
    state: web::Data<AppState>,
    req: web::Json<NewNotification>,
) -> Result<HttpResponse> {
    let notification = state.lock().create_notification(req.into_inner())?;
    info!(notification_id = notification.id, "notification broadcast");
    Ok(HttpResponse::Created().json(notification))
}

pub async fn delete_notification(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    state.lock().delete_notification(path.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}
