use std::sync::Arc;
use crate::application::services::DetectionService;

/// Shared state handed to the axum handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Fetch, decode and detect for one request.
    pub detection: Arc<DetectionService>,
}
