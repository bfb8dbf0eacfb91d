use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    dto::{MessageResponse, UploadResponse},
    error::ApiError,
    state::AppState,
};

use super::{
    dto::{RegisterRequest, UpdateUserRequest},
    repo,
    repo_types::{PublicUser, Role},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(user_list_get)
                .post(user_post)
                .put(user_put_current)
                .delete(user_delete_current),
        )
        .route("/users/token", get(check_token))
        .route(
            "/users/:id",
            get(user_get).put(user_put).delete(user_delete),
        )
}

#[instrument(skip(state))]
pub async fn user_list_get(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = repo::list_users(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn user_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = repo::get_user(&state.db, id).await?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn user_post(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    payload.validate()?;
    let user = payload.into_new_user()?;
    let resp = repo::create_user(&state.db, &user).await?;
    info!(user_id = resp.id, "user registered");
    Ok(Json(resp))
}

/// Admin-only update of an arbitrary user, any field included.
#[instrument(skip(state, payload))]
pub async fn user_put(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if auth.role != Role::Admin {
        return Err(ApiError::Forbidden("Admin only".into()));
    }
    payload.validate()?;
    let changes = payload.into_changes()?;
    let resp = repo::update_user(&state.db, &changes, id).await?;
    info!(user_id = id, by = auth.user_id, "user updated");
    Ok(Json(resp))
}

/// Self-update of the authenticated user's own profile. Role changes are
/// reserved for admins acting through the by-id route.
#[instrument(skip(state, payload))]
pub async fn user_put_current(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.role.is_some() {
        return Err(ApiError::Forbidden("Admin only".into()));
    }
    payload.validate()?;
    let changes = payload.into_changes()?;
    let resp = repo::update_user(&state.db, &changes, auth.user_id).await?;
    info!(user_id = auth.user_id, "user updated own profile");
    Ok(Json(resp))
}

#[instrument(skip(state))]
pub async fn user_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if auth.role != Role::Admin {
        return Err(ApiError::Forbidden("Admin only".into()));
    }
    let resp = repo::delete_user(&state.db, id).await?;
    info!(user_id = id, by = auth.user_id, "user deleted");
    Ok(Json(resp))
}

#[instrument(skip(state))]
pub async fn user_delete_current(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let resp = repo::delete_user(&state.db, auth.user_id).await?;
    info!(user_id = auth.user_id, "user deleted own account");
    Ok(Json(resp))
}

/// Resolve the bearer token back to the current user's public profile.
#[instrument(skip(state))]
pub async fn check_token(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = repo::get_user(&state.db, auth.user_id).await?;
    Ok(Json(user))
}
