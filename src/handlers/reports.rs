use crate::analytics::StudentAnalytics;
use crate::error::{AppError, Result};
use crate::model::{Notification, Role, TestAttempt, User};
use crate::state::AppState;
use crate::syllabus::ProgressReport;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

const RECENT_ATTEMPTS: usize = 5;

#[derive(Deserialize)]
pub struct NotificationQuery {
    role: Option<Role>,
}

#[derive(Serialize)]
struct ParentDashboard {
    parent: User,
    student: User,
    progress: ProgressReport,
    analytics: StudentAnalytics,
    recent_attempts: Vec<TestAttempt>,
    notifications: Vec<Notification>,
}

pub async fn student_analytics(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let student_id = path.into_inner();
    let (attempts, progress) = {
        let store = state.lock();
        (store.attempts_for(student_id), store.progress(student_id)?)
    };
    let analytics = state.analyzer.student_analytics(&attempts, &progress);
    Ok(HttpResponse::Ok().json(analytics))
}

pub async fn parent_dashboard(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let parent_id = path.into_inner();
    let store = state.lock();
    let parent = store.user(parent_id)?.clone();
    if parent.role != Role::Parent {
        return Err(AppError::Validation(format!("user {} is not a parent", parent_id)));
    }
    let student_id = parent.student_id.ok_or_else(|| {
        AppError::NotFound(format!("parent {} has no linked student", parent_id))
    })?;
    let student = store.student(student_id)?.clone();
    let progress = store.progress(student_id)?;
    let attempts = store.attempts_for(student_id);
    let analytics = state.analyzer.student_analytics(&attempts, &progress);

    let mut recent_attempts = attempts;
    recent_attempts.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    recent_attempts.truncate(RECENT_ATTEMPTS);

    Ok(HttpResponse::Ok().json(ParentDashboard {
        parent,
        student,
        progress: progress.report(),
        analytics,
        recent_attempts,
        notifications: store.notifications(Some(Role::Parent)),
    }))
}

pub async fn list_notifications(
    state: web::Data<AppState>,
    query: web::Query<NotificationQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.lock().notifications(query.role))
}

// Platform-wide counts for the admin panel
pub async fn admin_overview(state: web::Data<AppState>) -> HttpResponse {
    let overview = {
        let store = state.lock();
        state.analyzer.platform_overview(
            store.user_counts(),
            store.tests(false).len(),
            store.question_count(),
            store.all_attempts(),
        )
    };
    HttpResponse::Ok().json(overview)
}
