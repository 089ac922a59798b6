use image::RgbImage;

use crate::application::ports::ImageDecodePort;
use crate::domain::errors::{DomainError, DomainResult};

/// Decodes any format the `image` crate recognises by its magic bytes.
pub struct ImageCrateDecoder;

impl ImageDecodePort for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> DomainResult<RgbImage> {
        image::load_from_memory(bytes)
            .map(|img| img.to_rgb8())
            .map_err(|e| DomainError::ImageDecode(e.to_string()))
    }
}
