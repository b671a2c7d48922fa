//! Application state for the API server

use crate::{Config, MediaBroker};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone); provides access to the broker
/// and configuration.
#[derive(Clone)]
pub struct AppState {
    /// The broker instance handling job submission and tracking
    pub broker: Arc<MediaBroker>,

    /// Configuration (read access)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(broker: Arc<MediaBroker>, config: Arc<Config>) -> Self {
        Self { broker, config }
    }
}
