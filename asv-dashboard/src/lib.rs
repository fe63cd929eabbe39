//! ASV Dashboard
//!
//! The dashboard core: it loads a planned track onto a map, charts rolling
//! telemetry from a sensor source, and gates the admin configuration and
//! gallery behind a login session. All state lives in [`app::Dashboard`];
//! [`runtime::Runtime`] drives it against a [`api::DashboardApi`] backend.

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod config_sync;
pub mod error;
pub mod map;
pub mod notify;
pub mod prefs;
pub mod runtime;
pub mod secret;
pub mod session;
pub mod telemetry;
pub mod track_loader;

pub use api::{DashboardApi, HttpApi, Upload};
pub use app::{Command, Completion, Dashboard, Effect, Msg, View};
pub use error::DashboardError;
pub use secret::Secret;
