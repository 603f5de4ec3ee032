//! Invite issuance, redemption, validation, and stats handlers.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Path, Query, State};
use validator::Validate;

use invitegate_core::error::AppError;
use invitegate_entity::invite::stats::InviteStats;
use invitegate_service::CodeValidation;

use crate::dto::request::{IssueInviteRequest, RedeemRequest, StatsParams};
use crate::dto::response::{ApiEnvelope, InviteResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/invites
pub async fn issue(
    State(state): State<AppState>,
    Json(req): Json<IssueInviteRequest>,
) -> Result<Json<ApiEnvelope<InviteResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let invite = state
        .issuance
        .issue(&req.created_by, req.max_uses, req.expires_in_days)
        .await?;

    let display = state.codec.format(&invite.code);
    Ok(Json(ApiEnvelope::ok(InviteResponse::from_invite(
        invite, display,
    ))))
}

/// POST /api/invites/redeem
pub async fn redeem(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RedeemRequest>,
) -> Result<Json<ApiEnvelope<InviteResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let origin = addr.ip().to_string();
    let invite = state
        .redemption
        .redeem(&req.code, &req.identity, &origin)
        .await?;

    let display = state.codec.format(&invite.code);
    Ok(Json(ApiEnvelope::ok(InviteResponse::from_invite(
        invite, display,
    ))))
}

/// GET /api/invites/{code}/validate
pub async fn validate(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiEnvelope<CodeValidation>>, ApiError> {
    let check = state.redemption.validate_only(&code).await?;
    Ok(Json(ApiEnvelope::ok(check)))
}

/// GET /api/invites/stats?creator=
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<Json<ApiEnvelope<InviteStats>>, ApiError> {
    let stats = state.stats.for_creator(&params.creator).await?;
    Ok(Json(ApiEnvelope::ok(stats)))
}
