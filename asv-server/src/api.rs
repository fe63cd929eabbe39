//! REST API, static files and the SSE telemetry stream

use crate::auth::{credentials_match, require_admin};
use crate::error::ServerError;
use crate::state::AppState;
use crate::storage;
use asv_core::model::{AdminConfig, ConfigPatch};
use asv_core::wire::{
    is_image, routes, ClearResponse, DeleteResponse, ImageList, LoginRequest, LoginResponse,
    UpdateResponse, UploadKind, UploadResponse,
};
use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, Path,
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt as FuturesStreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::info;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.config.uploads_dir());
    let assets = ServeDir::new(state.config.assets_dir());

    Router::new()
        .route("/", get(root))
        .route(routes::LOGIN, post(login))
        .route(routes::LOGOUT, post(logout))
        .route(routes::ADMIN_STATE, get(get_admin_state))
        .route(routes::ADMIN_UPDATE, post(update_admin_state))
        .route(
            routes::UPLOAD,
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(routes::IMAGES, get(list_images))
        .route(routes::CLEAR_IMAGES, delete(clear_images))
        .route("/api/images/:filename", delete(delete_image))
        .route(routes::TELEMETRY_STREAM, get(telemetry_stream))
        .nest_service(routes::UPLOADS, uploads)
        .nest_service(routes::ASSETS, assets)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "ASV Backend Ready" }))
}

// === Session Endpoints ===

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ServerError> {
    let Json(request) = body.map_err(|e| ServerError::bad_request("invalid_body", e.body_text()))?;

    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ServerError::bad_request(
            "missing_fields",
            "Username and password are required.",
        ));
    }
    if !credentials_match(&state.config, &request) {
        tracing::warn!("Rejected login for user {:?}", request.username);
        return Err(ServerError::InvalidCredentials);
    }

    let token = state.sessions.issue().await;
    info!("Admin {} logged in", request.username);
    Ok(Json(LoginResponse { token }))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ServerError> {
    let token = require_admin(&state, &headers).await?;
    state.sessions.revoke(&token).await;
    info!("Admin logged out");
    Ok(StatusCode::NO_CONTENT)
}

// === Admin State Endpoints ===

async fn get_admin_state(State(state): State<AppState>) -> Json<AdminConfig> {
    Json(state.admin.read().await.clone())
}

async fn update_admin_state(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ConfigPatch>, JsonRejection>,
) -> Result<Json<UpdateResponse>, ServerError> {
    require_admin(&state, &headers).await?;
    let Json(patch) = body.map_err(|e| ServerError::bad_request("invalid_body", e.body_text()))?;

    let new_state = {
        let mut admin = state.admin.write().await;
        let mut updated = admin.clone();
        updated.apply(&patch);
        storage::save_admin_config(&state.config.state_file(), &updated)?;
        *admin = updated.clone();
        updated
    };

    info!("Admin state updated: {:?}", patch);
    Ok(Json(UpdateResponse {
        status: "success".to_string(),
        new_state,
    }))
}

// === Upload Endpoint ===

#[derive(Deserialize)]
struct UploadQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn parse_kind(raw: &str) -> Result<UploadKind, ServerError> {
    raw.parse()
        .map_err(|e: String| ServerError::bad_request("invalid_type", e))
}

fn multipart_error(e: MultipartError) -> ServerError {
    ServerError::bad_request("invalid_upload", format!("Failed to read upload: {}", e))
}

/// Store a route file or gallery image. The kind comes from a `type` form
/// field or query parameter and defaults to `image`.
async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    require_admin(&state, &headers).await?;

    let mut kind = match query.kind.as_deref() {
        Some(raw) => parse_kind(raw)?,
        None => UploadKind::Image,
    };
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "type" => kind = parse_kind(&field.text().await.map_err(multipart_error)?)?,
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, data));
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| ServerError::bad_request("missing_file", "No file provided"))?;
    let file_name = storage::sanitize_filename(&file_name)?.to_string();
    if !kind.accepts(&file_name) {
        return Err(ServerError::bad_request(
            "unsupported_type",
            format!("{} is not a valid {} file", file_name, kind.as_str()),
        ));
    }

    let dir = state.config.uploads_dir();
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&file_name), &data).await?;
    info!("Stored {} upload {} ({} bytes)", kind.as_str(), file_name, data.len());

    Ok(Json(UploadResponse {
        status: "success".to_string(),
        filename: file_name,
    }))
}

// === Gallery Endpoints ===

async fn list_images(State(state): State<AppState>) -> Result<Json<ImageList>, ServerError> {
    let images = storage::list_images(&state.config.uploads_dir())?;
    Ok(Json(ImageList { images }))
}

async fn delete_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, ServerError> {
    require_admin(&state, &headers).await?;
    let filename = storage::sanitize_filename(&filename)?;
    let path = state.config.uploads_dir().join(filename);

    // Only gallery images can be deleted here
    if !is_image(filename) || !path.is_file() {
        return Err(ServerError::NotFound("File not found".to_string()));
    }
    tokio::fs::remove_file(&path).await?;
    info!("Deleted image {}", filename);

    Ok(Json(DeleteResponse {
        status: "success".to_string(),
        message: format!("{} deleted", filename),
    }))
}

async fn clear_images(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ClearResponse>, ServerError> {
    require_admin(&state, &headers).await?;
    let deleted_count = storage::clear_images(&state.config.uploads_dir())?;
    info!("Cleared {} images", deleted_count);

    Ok(Json(ClearResponse {
        status: "success".to_string(),
        deleted_count,
    }))
}

// === Telemetry Stream Endpoint ===

async fn telemetry_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(readout) => match serde_json::to_string(&readout) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(e) => {
                    tracing::error!("Failed to serialize readout: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Broadcast stream error: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
