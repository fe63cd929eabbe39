//! Backend API client
//!
//! `DashboardApi` is the seam between the dashboard state machine and the
//! network. `HttpApi` talks to `asv-server` over HTTP; tests substitute an
//! in-memory implementation.

use crate::error::DashboardError;
use crate::secret::Secret;
use crate::session::Credentials;
use asv_core::model::{AdminConfig, ConfigPatch, TrackId};
use asv_core::wire::{
    routes, ClearResponse, ErrorBody, ImageList, LoginResponse, UploadKind, UploadResponse,
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Default message when the server refuses a login without saying why
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// A file to upload: a route CSV or a gallery image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub kind: UploadKind,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Operations the dashboard performs against the backend
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Raw route text for a track
    async fn fetch_route(&self, track: TrackId) -> Result<String, DashboardError>;

    async fn fetch_config(&self) -> Result<AdminConfig, DashboardError>;

    async fn push_config(
        &self,
        token: &Secret,
        patch: &ConfigPatch,
    ) -> Result<(), DashboardError>;

    /// Exchange credentials for a bearer token
    async fn login(&self, credentials: &Credentials) -> Result<Secret, DashboardError>;

    /// Revoke a bearer token server-side
    async fn logout(&self, token: &Secret) -> Result<(), DashboardError>;

    async fn list_images(&self) -> Result<Vec<String>, DashboardError>;

    async fn delete_image(&self, token: &Secret, filename: &str) -> Result<(), DashboardError>;

    /// Delete every gallery image, returning how many were removed
    async fn clear_images(&self, token: &Secret) -> Result<u32, DashboardError>;

    /// Upload a file, returning the stored file name
    async fn upload(&self, token: &Secret, upload: &Upload) -> Result<String, DashboardError>;
}

/// HTTP implementation backed by `reqwest`
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn image_url(&self, filename: &str) -> Result<reqwest::Url, DashboardError> {
        let mut url = reqwest::Url::parse(&self.url(routes::IMAGES))
            .map_err(|e| DashboardError::Validation(format!("invalid API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DashboardError::Validation("API URL cannot carry a path".to_string()))?
            .push(filename);
        Ok(url)
    }
}

/// Login body borrowing from `Credentials`, so the password is not copied
/// into another `String`
#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// Send a request, mapping transport failures to `Unreachable`
async fn send(request: RequestBuilder) -> Result<Response, DashboardError> {
    request
        .send()
        .await
        .map_err(|e| DashboardError::Unreachable(e.to_string()))
}

/// Pass successful responses through; classify failures
async fn check(response: Response) -> Result<Response, DashboardError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(DashboardError::Unauthorized);
    }
    let reason = reason(response)
        .await
        .unwrap_or_else(|| format!("server responded with {status}"));
    Err(DashboardError::ServerRejected(reason))
}

/// Human-readable reason from an error response, when the server gave one
async fn reason(response: Response) -> Option<String> {
    match response.json::<ErrorBody>().await {
        Ok(body) if !body.detail.is_empty() => Some(body.detail),
        _ => None,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DashboardError> {
    response
        .json::<T>()
        .await
        .map_err(|e| DashboardError::ServerRejected(format!("unexpected response: {e}")))
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn fetch_route(&self, track: TrackId) -> Result<String, DashboardError> {
        let url = self.url(&format!("{}/{}", routes::UPLOADS, track.route_file()));
        let response = check(send(self.client.get(url)).await?).await?;
        response
            .text()
            .await
            .map_err(|e| DashboardError::Unreachable(e.to_string()))
    }

    async fn fetch_config(&self) -> Result<AdminConfig, DashboardError> {
        let request = self.client.get(self.url(routes::ADMIN_STATE));
        let response = check(send(request).await?).await?;
        decode(response).await
    }

    async fn push_config(
        &self,
        token: &Secret,
        patch: &ConfigPatch,
    ) -> Result<(), DashboardError> {
        let request = self
            .client
            .post(self.url(routes::ADMIN_UPDATE))
            .bearer_auth(token.expose())
            .json(patch);
        check(send(request).await?).await?;
        Ok(())
    }

    async fn login(&self, credentials: &Credentials) -> Result<Secret, DashboardError> {
        let body = LoginBody {
            username: &credentials.username,
            password: credentials.password.expose(),
        };
        let response = send(self.client.post(self.url(routes::LOGIN)).json(&body)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            let reason = reason(response)
                .await
                .unwrap_or_else(|| INVALID_CREDENTIALS.to_string());
            return Err(DashboardError::InvalidCredentials(reason));
        }
        let response = check(response).await?;
        let body: LoginResponse = decode(response).await?;
        Ok(Secret::new(body.token))
    }

    async fn logout(&self, token: &Secret) -> Result<(), DashboardError> {
        let request = self
            .client
            .post(self.url(routes::LOGOUT))
            .bearer_auth(token.expose());
        check(send(request).await?).await?;
        Ok(())
    }

    async fn list_images(&self) -> Result<Vec<String>, DashboardError> {
        let response = check(send(self.client.get(self.url(routes::IMAGES))).await?).await?;
        let list: ImageList = decode(response).await?;
        Ok(list.images)
    }

    async fn delete_image(&self, token: &Secret, filename: &str) -> Result<(), DashboardError> {
        let request = self
            .client
            .delete(self.image_url(filename)?)
            .bearer_auth(token.expose());
        check(send(request).await?).await?;
        Ok(())
    }

    async fn clear_images(&self, token: &Secret) -> Result<u32, DashboardError> {
        let request = self
            .client
            .delete(self.url(routes::CLEAR_IMAGES))
            .bearer_auth(token.expose());
        let response = check(send(request).await?).await?;
        let body: ClearResponse = decode(response).await?;
        Ok(body.deleted_count)
    }

    async fn upload(&self, token: &Secret, upload: &Upload) -> Result<String, DashboardError> {
        let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone());
        let form = reqwest::multipart::Form::new()
            .text("type", upload.kind.as_str())
            .part("file", part);
        let request = self
            .client
            .post(self.url(routes::UPLOAD))
            .bearer_auth(token.expose())
            .multipart(form);
        let response = check(send(request).await?).await?;
        let body: UploadResponse = decode(response).await?;
        Ok(body.filename)
    }
}
