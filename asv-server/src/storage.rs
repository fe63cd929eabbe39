//! Files on disk: the persisted admin state and the upload directory

use crate::config::ServerConfig;
use crate::error::ServerError;
use asv_core::model::AdminConfig;
use asv_core::wire::is_image;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::{info, warn};

/// Create the uploads and assets directories
pub fn prepare_dirs(config: &ServerConfig) -> io::Result<()> {
    std::fs::create_dir_all(config.uploads_dir())?;
    std::fs::create_dir_all(config.assets_dir())?;
    Ok(())
}

/// Load the admin state, falling back to defaults when the file is missing
/// or unreadable
pub fn load_admin_config(path: &Path) -> AdminConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return AdminConfig::default(),
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            return AdminConfig::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(config) => {
            info!("Admin state loaded from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to parse {}: {}, using defaults", path.display(), e);
            AdminConfig::default()
        }
    }
}

pub fn save_admin_config(path: &Path, config: &AdminConfig) -> Result<(), ServerError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Reject names that could escape the upload directory
pub fn sanitize_filename(name: &str) -> Result<&str, ServerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServerError::bad_request("invalid_filename", "File name is empty"));
    }
    if name.contains(['/', '\\', '\0']) || name.contains("..") {
        return Err(ServerError::bad_request(
            "invalid_filename",
            format!("Invalid file name: {name}"),
        ));
    }
    Ok(name)
}

/// Image file names in `dir`, newest first. A missing directory is empty.
pub fn list_images(dir: &Path) -> io::Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut images: Vec<(SystemTime, String)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let metadata = entry.metadata()?;
        if !metadata.is_file() || !is_image(&name) {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        images.push((modified, name));
    }

    images.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(images.into_iter().map(|(_, name)| name).collect())
}

/// Delete every image in `dir`, returning how many were removed
pub fn clear_images(dir: &Path) -> io::Result<u32> {
    let mut count = 0;
    for name in list_images(dir)? {
        std::fs::remove_file(dir.join(&name))?;
        count += 1;
    }
    Ok(count)
}
