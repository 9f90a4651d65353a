use crate::error::{AppError, Result};
use crate::model::{NewUser, Role, User, UserUpdate};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
    role: Role,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    message: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    user: NewUser,
    password: String,
}

// Demo login: any known email/role pair with the shared demo password
pub async fn login(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> HttpResponse {
    let user = state.lock().find_user_by_email(req.email.trim(), req.role).cloned();
    match user {
        Some(user) if req.password == state.config.demo_password => {
            info!(user_id = user.id, role = %user.role, "login");
            HttpResponse::Ok().json(LoginResponse {
                success: true,
                message: format!("Welcome back, {}", user.name),
                user: Some(user),
            })
        }
        _ => {
            warn!(email = %req.email, role = %req.role, "login rejected");
            HttpResponse::Unauthorized().json(LoginResponse {
                success: false,
                user: None,
                message: "Invalid email, password or role".to_string(),
            })
        }
    }
}

pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    if req.password.len() < 6 {
        return Err(AppError::Validation(
            "password must be at least 6 characters".to_string(),
        ));
    }
    if req.user.role == Role::Admin {
        return Err(AppError::Validation(
            "admin accounts are created by an administrator".to_string(),
        ));
    }
    let user = state.lock().create_user(req.user)?;
    info!(user_id = user.id, role = %user.role, "user registered");
    Ok(HttpResponse::Created().json(user))
}

pub async fn get_user(state: web::Data<AppState>, path: web::Path<i64>) -> Result<HttpResponse> {
    let user = state.lock().user(path.into_inner())?.clone();
    Ok(HttpResponse::Ok().json(user))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    update: web::Json<UserUpdate>,
) -> Result<HttpResponse> {
    let user = state.lock().update_user(path.into_inner(), update.into_inner())?;
    Ok(HttpResponse::Ok().json(user))
}
