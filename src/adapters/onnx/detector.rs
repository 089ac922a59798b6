use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use async_trait::async_trait;
use image::RgbImage;
use tokio::sync::OnceCell;
use tracing::info;

use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::ObjectDetectorPort;
use crate::domain::{
    detection::RawDetection,
    errors::DomainResult,
    model::{DetectorSettings, ModelLoading},
};

type SharedEngine = Arc<Mutex<OnnxYoloEngine>>;

/// Detector port backed by an ONNX Runtime session.
///
/// In `Shared` mode the session is built on first use and reused; a failed
/// build is retried by the next request. In `PerRequest` mode every call
/// builds and drops its own session.
pub struct OnnxDetector {
    settings: DetectorSettings,
    shared: OnceCell<SharedEngine>,
}

impl OnnxDetector {
    pub fn new(settings: DetectorSettings) -> Self {
        Self {
            settings,
            shared: OnceCell::new(),
        }
    }

    /// Loads the shared session ahead of the first request.
    pub async fn warm_up(&self) -> DomainResult<()> {
        if self.settings.loading == ModelLoading::Shared {
            self.shared_engine().await?;
        }
        Ok(())
    }

    async fn shared_engine(&self) -> DomainResult<SharedEngine> {
        let engine = self
            .shared
            .get_or_try_init(|| async {
                let engine = self.load_engine().await?;
                info!("🧠 Model loaded once and shared: {}", self.settings.model.onnx_path);
                Ok::<_, anyhow::Error>(Arc::new(Mutex::new(engine)))
            })
            .await?;
        Ok(engine.clone())
    }

    async fn load_engine(&self) -> anyhow::Result<OnnxYoloEngine> {
        let path = self.settings.model.onnx_path.clone();
        let layout = self.settings.layout;
        let threads = self.settings.intra_threads;
        tokio::task::spawn_blocking(move || OnnxYoloEngine::load(&path, layout, threads))
            .await
            .context("model loading task failed")?
    }
}

/// A panic inside a previous inference poisons the lock but leaves the
/// session usable, so the guard is taken back instead of failing every call.
fn lock_session<T>(session: &Mutex<T>) -> MutexGuard<'_, T> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ObjectDetectorPort for OnnxDetector {
    async fn detect(&self, image: RgbImage) -> DomainResult<Vec<RawDetection>> {
        let engine = match self.settings.loading {
            ModelLoading::Shared => self.shared_engine().await?,
            ModelLoading::PerRequest => {
                let engine = self.load_engine().await?;
                info!("🧠 Model loaded for this request: {}", self.settings.model.onnx_path);
                Arc::new(Mutex::new(engine))
            }
        };

        let params = self.settings.params.clone();
        let detections = tokio::task::spawn_blocking(move || {
            let mut engine = lock_session(&engine);
            engine.infer(&image, &params)
        })
        .await
        .context("inference task failed")??;

        Ok(detections)
    }
}
