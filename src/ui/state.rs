//! Shared server state.

use std::sync::Arc;

use crate::domain::SessionRegistry;

/// Shared application state handed to every handler.
pub struct AppState {
    /// Session registry (data access layer abstraction)
    pub registry: Arc<dyn SessionRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }
}
