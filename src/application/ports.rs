use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{detection::RawDetection, errors::DomainResult, model::ModelId};

#[async_trait]
pub trait ImageFetchPort: Send + Sync {
    /// Downloads the raw bytes behind `url`. Anything but HTTP 200 is an error.
    async fn fetch(&self, url: &str) -> DomainResult<Vec<u8>>;
}

pub trait ImageDecodePort: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> DomainResult<RgbImage>;
}

#[async_trait]
pub trait ObjectDetectorPort: Send + Sync {
    /// Detections above threshold after suppression, in detector output order.
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<RawDetection>>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
