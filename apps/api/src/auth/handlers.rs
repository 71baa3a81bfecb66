use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{Caller, Session};
use crate::baas::models::{self, User};
use crate::baas::BaasClient;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    /// Secret to send back as `X-Session` on later requests.
    pub secret: String,
    pub expire: String,
    pub user: User,
}

async fn open_session(baas: &BaasClient, email: &str, password: &str) -> Result<SessionResponse, AppError> {
    let session: models::Session = baas.create_email_password_session(email, password).await?;
    if session.secret.is_empty() {
        return Err(anyhow!("BaaS returned a session without a secret; is BAAS_API_KEY set?").into());
    }
    let user = baas.with_session(&session.secret).get_account().await?;
    Ok(SessionResponse {
        session_id: session.id,
        secret: session.secret,
        expire: session.expire,
        user,
    })
}

fn credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    credentials(&req.email, &req.password)?;
    let email = req.email.trim();
    state.baas.create_account(email, &req.password, req.name.trim()).await?;
    let session = open_session(&state.baas, email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    credentials(&req.email, &req.password)?;
    let session = open_session(&state.baas, req.email.trim(), &req.password).await?;
    info!("User {} logged in", session.user.id);
    Ok(Json(session))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<StatusCode, AppError> {
    state
        .baas
        .with_session(&session.secret)
        .delete_session("current")
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/me
pub async fn handle_me(caller: Caller) -> Json<User> {
    Json(caller.user)
}
