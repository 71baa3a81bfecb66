use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{Caller, Session};
use crate::baas::models::{Membership, Team};
use crate::errors::AppError;
use crate::spaces::directory::{self, SpaceOverview, SpaceView};
use crate::spaces::join::{redeem_join_code, JoinOutcome};
use crate::spaces::join_code::validate_join_code;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SpaceNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    #[serde(rename = "joinCode")]
    pub join_code: String,
}

/// GET /api/v1/spaces
pub async fn handle_list_spaces(caller: Caller) -> Result<Json<Vec<SpaceView>>, AppError> {
    Ok(Json(directory::list_spaces(&caller.baas, &caller.user.id).await?))
}

/// POST /api/v1/spaces
pub async fn handle_create_space(
    caller: Caller,
    Json(req): Json<SpaceNameRequest>,
) -> Result<(StatusCode, Json<Team>), AppError> {
    let team = directory::create_space(&caller.baas, &caller.user, &req.name).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// GET /api/v1/spaces/:id
pub async fn handle_get_space(
    caller: Caller,
    Path(space_id): Path<String>,
) -> Result<Json<SpaceView>, AppError> {
    Ok(Json(directory::get_space(&caller.baas, &caller.user.id, &space_id).await?))
}

/// PATCH /api/v1/spaces/:id
pub async fn handle_rename_space(
    caller: Caller,
    Path(space_id): Path<String>,
    Json(req): Json<SpaceNameRequest>,
) -> Result<Json<Team>, AppError> {
    let team = directory::rename_space(&caller.baas, &caller.user, &space_id, &req.name).await?;
    Ok(Json(team))
}

/// DELETE /api/v1/spaces/:id
pub async fn handle_delete_space(
    caller: Caller,
    Path(space_id): Path<String>,
) -> Result<StatusCode, AppError> {
    directory::delete_space(&caller.baas, &caller.user, &space_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/spaces/:id/members
pub async fn handle_list_members(
    caller: Caller,
    Path(space_id): Path<String>,
) -> Result<Json<Vec<Membership>>, AppError> {
    Ok(Json(directory::list_members(&caller.baas, &space_id).await?))
}

/// GET /api/v1/spaces/:id/overview
pub async fn handle_space_overview(
    caller: Caller,
    Path(space_id): Path<String>,
) -> Json<SpaceOverview> {
    Json(directory::space_overview(&caller.baas, &space_id).await)
}

/// POST /api/v1/spaces/join
///
/// The code is checked before the caller's account is looked up, so a
/// malformed code never reaches the BaaS.
pub async fn handle_join_space(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<JoinRequest>,
) -> Result<Response, AppError> {
    validate_join_code(&req.join_code)?;

    let baas = state.baas.with_session(&session.secret);
    let user = baas.get_account().await?;
    let outcome = redeem_join_code(
        &baas,
        &state.config.join_function_id,
        &req.join_code,
        &user,
        &state.join_poll,
    )
    .await?;

    let (status, label) = match outcome {
        JoinOutcome::Joined => (StatusCode::OK, "success"),
        JoinOutcome::Rejected => (StatusCode::UNPROCESSABLE_ENTITY, "error"),
        JoinOutcome::NoResponse => (StatusCode::GATEWAY_TIMEOUT, "error"),
    };
    Ok((
        status,
        Json(json!({
            "status": label,
            "outcome": outcome,
            "message": outcome.message(),
        })),
    )
        .into_response())
}
