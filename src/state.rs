//! Application state shared across handlers

use std::sync::Arc;

use crate::routes::antiforgery::Antiforgery;
use crate::routes::todos::queries::TodoStore;

/// Built once in `main` and handed to the router; handlers never reach for
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub antiforgery: Antiforgery,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, antiforgery: Antiforgery) -> Self {
        Self { store, antiforgery }
    }
}
