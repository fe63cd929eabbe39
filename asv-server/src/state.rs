//! Application state management

use crate::auth::SessionRegistry;
use crate::config::ServerConfig;
use crate::storage;
use asv_core::model::{AdminConfig, SensorReadout};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,

    /// Admin state, mirrored to `admin_state.json` on every update
    pub admin: Arc<RwLock<AdminConfig>>,

    /// Live bearer tokens
    pub sessions: SessionRegistry,

    /// Broadcast channel for sensor readouts
    /// Multiple consumers can subscribe to receive readouts
    pub telemetry_tx: broadcast::Sender<SensorReadout>,
}

impl AppState {
    /// Build state for `config`, loading any persisted admin state
    pub fn new(config: ServerConfig) -> Self {
        let admin = storage::load_admin_config(&config.state_file());
        let (telemetry_tx, _) = broadcast::channel(100);

        Self {
            config: Arc::new(config),
            admin: Arc::new(RwLock::new(admin)),
            sessions: SessionRegistry::new(),
            telemetry_tx,
        }
    }

    /// Subscribe to sensor readouts
    pub fn subscribe(&self) -> broadcast::Receiver<SensorReadout> {
        self.telemetry_tx.subscribe()
    }
}
