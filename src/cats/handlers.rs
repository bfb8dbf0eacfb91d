use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, Path, State},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use time::{macros::format_description, Date};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    dto::{MessageResponse, UploadResponse},
    error::ApiError,
    state::AppState,
};

use super::{
    dto::UpdateCatRequest,
    repo,
    repo_types::{Cat, NewCat},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cats", get(cat_list_get).post(cat_post))
        .route("/cats/:id", get(cat_get).put(cat_put).delete(cat_delete))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB pictures
}

#[instrument(skip(state))]
pub async fn cat_list_get(State(state): State<AppState>) -> Result<Json<Vec<Cat>>, ApiError> {
    let cats = repo::list_cats(&state.db).await?;
    Ok(Json(cats))
}

#[instrument(skip(state))]
pub async fn cat_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Cat>, ApiError> {
    let cat = repo::get_cat(&state.db, id).await?;
    Ok(Json(cat))
}

/// Multipart upload: a `cat` picture plus `cat_name`, `weight`, `birthdate`,
/// `lat` and `lng` fields. The owner is always the authenticated uploader.
#[instrument(skip(state, multipart))]
pub async fn cat_post(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut cat_name = None;
    let mut weight = None;
    let mut birthdate = None;
    let mut lat = None;
    let mut lng = None;
    let mut picture: Option<(Bytes, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("cat") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                picture = Some((data, content_type));
            }
            Some("cat_name") => cat_name = Some(text_field(field).await?),
            Some("weight") => weight = Some(parse_f64("weight", &text_field(field).await?)?),
            Some("birthdate") => birthdate = Some(parse_date(&text_field(field).await?)?),
            Some("lat") => lat = Some(parse_f64("lat", &text_field(field).await?)?),
            Some("lng") => lng = Some(parse_f64("lng", &text_field(field).await?)?),
            _ => {}
        }
    }

    let Some((data, content_type)) = picture else {
        return Err(ApiError::BadRequest("File is missing".into()));
    };
    let cat_name = cat_name.ok_or_else(|| ApiError::BadRequest("cat_name is missing".into()))?;
    let weight = weight.ok_or_else(|| ApiError::BadRequest("weight is missing".into()))?;
    let birthdate = birthdate.ok_or_else(|| ApiError::BadRequest("birthdate is missing".into()))?;
    let lat = lat.ok_or_else(|| ApiError::BadRequest("lat is missing".into()))?;
    let lng = lng.ok_or_else(|| ApiError::BadRequest("lng is missing".into()))?;

    if cat_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Cat name is empty".into()));
    }
    if !weight.is_finite() || weight <= 0.0 {
        return Err(ApiError::BadRequest("Weight not valid".into()));
    }

    let filename = format!("{}.{}", Uuid::new_v4(), extension_for(&content_type));
    state.files.save(&filename, data).await?;

    let cat = NewCat {
        cat_name: cat_name.trim().to_string(),
        weight,
        owner: auth.user_id,
        filename,
        birthdate,
        lat,
        lng,
    };
    let resp = repo::create_cat(&state.db, &cat).await?;
    info!(cat_id = resp.id, owner = auth.user_id, "cat added");
    Ok(Json(resp))
}

#[instrument(skip(state, payload))]
pub async fn cat_put(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCatRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate()?;
    let resp = repo::update_cat(&state.db, &payload.into_changes(), id, &auth).await?;
    info!(cat_id = id, by = auth.user_id, "cat updated");
    Ok(Json(resp))
}

#[instrument(skip(state))]
pub async fn cat_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (resp, filename) = repo::delete_cat(&state.db, id).await?;
    if let Err(e) = state.files.remove(&filename).await {
        warn!(error = %e, %filename, "stored picture could not be removed");
    }
    info!(cat_id = id, by = auth.user_id, "cat deleted");
    Ok(Json(resp))
}

async fn text_field(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ApiError::BadRequest(format!("{name} is not a number: {raw}")))
}

fn parse_date(raw: &str) -> Result<Date, ApiError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), &format)
        .map_err(|_| ApiError::BadRequest(format!("birthdate not valid: {raw}")))
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}
