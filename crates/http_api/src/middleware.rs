use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{cookies, errors::HttpError, state::HttpState};

pub async fn require_auth(
    State(state): State<HttpState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    let credentials = cookies::credentials(req.headers());
    if !state.app.services.auth.authorize(&credentials) {
        tracing::debug!(path = %req.uri().path(), "rejected unauthenticated request");
        return Err(HttpError::unauthorized());
    }
    Ok(next.run(req).await)
}
