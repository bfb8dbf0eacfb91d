use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{error::ApiError, state::AppState, users::repo};

use super::{
    dto::{LoginRequest, LoginResponse},
    jwt::JwtKeys,
    password::verify_password,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Wrong email and wrong password produce the same result; the lookup and
/// the check are indistinguishable from outside.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.username = payload.username.trim().to_lowercase();

    let user = repo::find_user_by_email(&state.db, &payload.username).await?;

    if !verify_password(&payload.password, &user.password)? {
        warn!(user_id = user.user_id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.user_id, user.role)?;

    info!(user_id = user.user_id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.into_public(),
    }))
}
