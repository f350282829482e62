//! HTTP handlers for the table server.
//!
//! Defines `AppState`, the shared state carried through axum extractors,
//! and re-exports the handler functions used by the router.

pub mod health;
pub mod table;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use table::{get_table, index_handler, post_table, TableResponseError};

use std::sync::Arc;
use std::time::Instant;

use super::{NetworkConfig, ShutdownController};
use crate::store::TableStore;

/// Shared application state passed to all axum handlers via `State`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TableStore>,
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}
