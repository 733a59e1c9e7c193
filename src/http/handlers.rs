use crate::adapters::{Garment, User};
use crate::core::account::{hash_password, new_user_id, validate_registration};
use crate::core::upload::{public_url, stored_filename, validate_upload_type, UPLOAD_DIR};
use crate::core::{AssetStore, RegisterPayload, TryOnPayload};
use crate::http::response::{log_failure, RegisterSuccess, TryOnSuccess, UploadSuccess};
use crate::http::AppState;
use crate::utils::error::{Result, TryOnError};
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

pub async fn healthz_handler() -> &'static str {
    "ok"
}

/// POST /api/tryon
pub async fn tryon_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TryOnPayload>, JsonRejection>,
) -> Result<Json<TryOnSuccess>> {
    let Json(payload) = payload
        .map_err(|rejection| {
            TryOnError::input(format!("Invalid JSON body: {}", rejection.body_text()))
        })
        .inspect_err(|e| log_failure("try-on", e))?;

    tracing::info!(
        "Received try-on request: user={:?}, garment={:?}",
        payload.user_image_url,
        payload.garment_image_url
    );

    let result_image_url = state.engine.run(&payload).await?;
    Ok(Json(TryOnSuccess::new(result_image_url)))
}

/// GET /api/garments
pub async fn garments_handler(State(state): State<AppState>) -> Result<Json<Vec<Garment>>> {
    let garments = state
        .catalog
        .list_garments()
        .await
        .inspect_err(|e| log_failure("garment listing", e))?;
    tracing::debug!("Returning {} garments", garments.len());
    Ok(Json(garments))
}

/// POST /api/upload (multipart, field `file`)
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadSuccess>> {
    store_upload(&state, multipart)
        .await
        .inspect_err(|e| log_failure("upload", e))
}

async fn store_upload(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadSuccess>> {
    let limit = state.max_upload_bytes;
    let mut multipart = multipart.map_err(|rejection| TryOnError::UploadRejected {
        message: rejection.body_text(),
    })?;

    let mut upload: Option<(Option<String>, Option<String>, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        upload = Some((file_name, content_type, data));
        break;
    }

    let (file_name, content_type, data) = upload.ok_or_else(|| TryOnError::UploadRejected {
        message: "No file was found in the request.".to_string(),
    })?;

    validate_upload_type(content_type.as_deref())?;
    if data.len() > limit {
        return Err(TryOnError::UploadTooLarge { limit });
    }

    let now = Utc::now();
    let filename = stored_filename(file_name.as_deref().unwrap_or_default(), now);
    state
        .store
        .write_asset(&format!("{}/{}", UPLOAD_DIR, filename), &data)
        .await?;
    tracing::info!("Saved upload {} ({} bytes)", filename, data.len());

    let url = public_url(&filename);
    state.catalog.record_upload(&filename, &url, now).await?;

    Ok(Json(UploadSuccess::new(url)))
}

/// POST /api/register
pub async fn register_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterSuccess>)> {
    register(&state, payload)
        .await
        .inspect_err(|e| log_failure("registration", e))
}

async fn register(
    state: &AppState,
    payload: std::result::Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterSuccess>)> {
    let Json(payload) = payload.map_err(|rejection| {
        TryOnError::input(format!("Invalid JSON body: {}", rejection.body_text()))
    })?;
    let registration = validate_registration(&payload)?;

    if state
        .catalog
        .find_user_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(TryOnError::Conflict {
            message: "Email is already registered.".to_string(),
        });
    }

    let user = User {
        id: new_user_id(),
        email: registration.email,
        name: registration.name,
        hashed_password: Some(hash_password(registration.password).await?),
    };
    state.catalog.create_user(&user).await?;
    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(RegisterSuccess::new())))
}

fn multipart_error(e: MultipartError, limit: usize) -> TryOnError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        TryOnError::UploadTooLarge { limit }
    } else {
        TryOnError::UploadRejected {
            message: e.body_text(),
        }
    }
}
