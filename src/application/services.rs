use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use crate::{
    application::{
        dto::{DetectRequest, DetectResponse},
        ports::{ImageDecodePort, ImageFetchPort, ObjectDetectorPort},
    },
    domain::{
        categories::CategoryTable,
        detection::{Detection, RawDetection},
        errors::DomainResult,
    },
};

/// Runs one `/detect` request: fetch, decode, detect, label, select.
#[derive(Clone)]
pub struct DetectionService {
    fetcher: Arc<dyn ImageFetchPort>,
    decoder: Arc<dyn ImageDecodePort>,
    detector: Arc<dyn ObjectDetectorPort>,
    categories: Arc<CategoryTable>,
}

impl DetectionService {
    pub fn new(
        fetcher: Arc<dyn ImageFetchPort>,
        decoder: Arc<dyn ImageDecodePort>,
        detector: Arc<dyn ObjectDetectorPort>,
        categories: Arc<CategoryTable>,
    ) -> Self {
        Self {
            fetcher,
            decoder,
            detector,
            categories,
        }
    }

    pub async fn detect(&self, request: DetectRequest) -> DomainResult<DetectResponse> {
        let user_id = request.user_id();
        info!("👤 Request from user id: {}", user_id);
        info!("🌐 Image URL: {}", request.image_url);

        debug!("🔄 Fetching image...");
        let bytes = match self.fetcher.fetch(&request.image_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("❌ Image fetch failed: {}", e);
                return Err(e);
            }
        };
        debug!("📦 Fetched {} bytes", bytes.len());

        let decoder = self.decoder.clone();
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .context("image decode task failed")?;
        let image = match decoded {
            Ok(image) => image,
            Err(e) => {
                warn!("❌ Image could not be decoded: {}", e);
                return Err(e);
            }
        };
        info!(
            "✅ Image decoded ({}x{}), running detector...",
            image.width(),
            image.height()
        );

        let raw = match self.detector.detect(image).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("💥 Detection failed: {:?}", e);
                return Err(e);
            }
        };
        info!("📊 Detected objects: {}", raw.len());

        let objects = self.first_detection(raw).into_iter().collect();

        info!("✅ Detection finished, sending result.");
        Ok(DetectResponse::success(user_id, objects))
    }

    /// Keeps the first entry in detector output order, not the best-scoring one.
    fn first_detection(&self, raw: Vec<RawDetection>) -> Option<Detection> {
        raw.into_iter().next().map(|d| Detection {
            label: self.categories.label_for(d.class_id),
            score: d.score,
            bbox: d.rect.to_array(),
        })
    }
}
