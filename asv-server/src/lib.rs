//! ASV Dashboard Server Library
//!
//! Exposes server components for integration testing.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod manager;
pub mod state;
pub mod storage;
