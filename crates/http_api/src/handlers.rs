use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use dashboard_app::{RangeParams, RecordsQuery};
use serde::{Deserialize, Serialize};

use crate::{
    cookies,
    errors::{HttpError, PlainError},
    state::HttpState,
};

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    authenticated: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    password: String,
}

pub async fn sync(
    State(state): State<HttpState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, PlainError> {
    let credentials = cookies::credentials(&headers);
    let report = state.app.services.sync.run(&credentials).await?;
    Ok(Json(report))
}

pub async fn login(
    State(state): State<HttpState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PlainError> {
    let Json(req) =
        payload.map_err(|rejection| PlainError::new(rejection.status(), rejection.body_text()))?;
    let token = state.app.services.session.login(&req.password)?;
    Ok((
        [(header::SET_COOKIE, cookies::session_cookie(&token))],
        Json(SuccessResponse { success: true }),
    ))
}

pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, cookies::expired_session_cookie())],
        Json(SuccessResponse { success: true }),
    )
}

pub async fn session(State(state): State<HttpState>, headers: HeaderMap) -> impl IntoResponse {
    let credentials = cookies::credentials(&headers);
    Json(SessionResponse {
        authenticated: state.app.services.session.is_authenticated(&credentials),
    })
}

pub async fn usage_summary(
    State(state): State<HttpState>,
    Query(params): Query<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.app.services.analytics.summary(&params)?))
}

pub async fn usage_models(
    State(state): State<HttpState>,
    Query(params): Query<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.app.services.analytics.models(&params)?))
}

pub async fn usage_routes(
    State(state): State<HttpState>,
    Query(params): Query<RangeParams>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.app.services.analytics.routes(&params)?))
}

pub async fn usage_records(
    State(state): State<HttpState>,
    Query(query): Query<RecordsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(state.app.services.analytics.records(&query)?))
}

pub async fn not_found() -> HttpError {
    HttpError::not_found()
}
