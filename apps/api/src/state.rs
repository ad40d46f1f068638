use std::sync::Arc;

use crate::application::store::ApplicationStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable persistence gateway. Default: `PgApplicationStore`.
    pub store: Arc<dyn ApplicationStore>,
}
