//! Server settings from the environment

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "asv2025";

/// Name of the persisted admin state inside the uploads directory
pub const STATE_FILE: &str = "admin_state.json";

#[derive(Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Root of `uploads/` and `assets/`
    pub data_dir: PathBuf,
    pub admin_user: String,
    pub admin_password: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("data_dir", &self.data_dir)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"***")
            .finish()
    }
}

impl ServerConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            data_dir: data_dir.into(),
            admin_user: DEFAULT_ADMIN_USER.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }

    /// Read `ASV_BIND`, `ASV_DATA_DIR`, `ASV_ADMIN_USER` and `ASV_ADMIN_PASSWORD`
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let data_dir = var("ASV_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|dir| dir.join("asv-dashboard")))
            .unwrap_or_else(|| PathBuf::from("data"));
        let mut config = Self::with_data_dir(data_dir);

        if let Some(bind) = var("ASV_BIND") {
            match bind.parse() {
                Ok(addr) => config.bind = addr,
                Err(e) => warn!("Ignoring ASV_BIND={}: {}, using {}", bind, e, DEFAULT_BIND),
            }
        }
        if let Some(user) = var("ASV_ADMIN_USER") {
            config.admin_user = user;
        }
        if let Some(password) = var("ASV_ADMIN_PASSWORD") {
            config.admin_password = password;
        }
        config
    }

    /// Uploaded images and route files, served under `/uploads`
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Static assets, served under `/assets`
    pub fn assets_dir(&self) -> PathBuf {
        self.data_dir.join("assets")
    }

    pub fn state_file(&self) -> PathBuf {
        self.uploads_dir().join(STATE_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
