//! Session handling: request extractors that identify the caller, plus the
//! register/login/logout routes.

pub mod handlers;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::baas::models::User;
use crate::baas::BaasClient;
use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session";

/// The caller's BaaS session secret, read from `X-Session` or an
/// `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct Session {
    pub secret: String,
}

fn session_secret(parts: &Parts) -> Option<String> {
    let headers = &parts.headers;
    let from_custom = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);
    let from_bearer = || {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
    };
    from_custom
        .or_else(from_bearer)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_secret(parts)
            .map(|secret| Session { secret })
            .ok_or(AppError::Unauthorized)
    }
}

/// An authenticated caller: the account behind the session and a BaaS
/// client acting on its behalf.
#[derive(Clone)]
pub struct Caller {
    pub user: User,
    pub baas: BaasClient,
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let baas = state.baas.with_session(&session.secret);
        let user = baas.get_account().await?;
        Ok(Caller { user, baas })
    }
}
