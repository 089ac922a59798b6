use axum::{body::Bytes, extract::State, Json};
use tracing::{info, warn};

use crate::adapters::http::state::HttpState;
use crate::application::dto::{DetectRequest, DetectResponse};
use crate::domain::errors::DomainError;

/// `POST /detect`
pub async fn handle_detect(
    State(st): State<HttpState>,
    body: Bytes,
) -> Result<Json<DetectResponse>, DomainError> {
    info!("📥 /detect request received ({} bytes)", body.len());

    let request = DetectRequest::from_body(&body).map_err(|e| {
        warn!("❌ Rejected request: {}", e);
        e
    })?;

    st.detection.detect(request).await.map(Json)
}
