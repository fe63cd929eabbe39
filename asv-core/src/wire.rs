//! JSON wire types and paths of the backend HTTP API

use crate::model::AdminConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Endpoint paths shared by the server router and the dashboard client
pub mod routes {
    pub const LOGIN: &str = "/api/login";
    pub const LOGOUT: &str = "/api/logout";
    pub const ADMIN_STATE: &str = "/api/admin/state";
    pub const ADMIN_UPDATE: &str = "/api/admin/update";
    pub const UPLOAD: &str = "/api/upload";
    pub const IMAGES: &str = "/api/images";
    pub const CLEAR_IMAGES: &str = "/api/images/all/clear";
    pub const TELEMETRY_STREAM: &str = "/api/telemetry/stream";
    pub const UPLOADS: &str = "/uploads";
    pub const ASSETS: &str = "/assets";
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Error payload returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: String,
    /// Machine-readable reason, e.g. `invalid_credentials`
    #[serde(default)]
    pub reason: String,
    /// Human-readable explanation
    #[serde(default)]
    pub detail: String,
}

impl ErrorBody {
    pub fn new(reason: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            reason: reason.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub status: String,
    pub new_state: AdminConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageList {
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub status: String,
    pub deleted_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub filename: String,
}

/// Upload discriminator: a route file or a gallery image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Csv,
    Image,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Image => "image",
        }
    }

    /// Whether `filename` has an extension this kind accepts
    pub fn accepts(&self, filename: &str) -> bool {
        match self {
            Self::Csv => has_extension(filename, &["csv"]),
            Self::Image => is_image(filename),
        }
    }
}

impl FromStr for UploadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "route" => Ok(Self::Csv),
            "image" => Ok(Self::Image),
            other => Err(format!("unknown upload type {other:?}")),
        }
    }
}

pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub fn is_image(filename: &str) -> bool {
    has_extension(filename, &IMAGE_EXTENSIONS)
}

fn has_extension(filename: &str, extensions: &[&str]) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
