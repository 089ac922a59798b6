use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::ModelCatalogPort;
use crate::domain::errors::DomainResult;
use crate::domain::model::ModelId;

/// Checks that a model file is present on local disk before it is served.
pub struct OnnxModelCatalog;

impl OnnxModelCatalog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelCatalogPort for OnnxModelCatalog {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
        if model.onnx_path.trim().is_empty() {
            return Err(anyhow::anyhow!("model path is empty").into());
        }
        let path = Path::new(&model.onnx_path);
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(anyhow::anyhow!("model file not found: {}", model.onnx_path).into());
        }
        if path.extension().and_then(|e| e.to_str()) != Some("onnx") {
            tracing::warn!(
                "⚠️ Model {} does not have an .onnx extension; loading will likely fail",
                model.onnx_path
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::DomainError;

    fn model(path: &str) -> ModelId {
        ModelId {
            name: "test".into(),
            onnx_path: path.into(),
        }
    }

    #[tokio::test]
    async fn empty_path_is_internal_error() {
        let err = OnnxModelCatalog::new().validate_model(&model("  ")).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert!(err.to_string().contains("model path is empty"));
    }

    #[tokio::test]
    async fn rejects_missing_file() {
        let err = OnnxModelCatalog::new()
            .validate_model(&model("/nonexistent/yolo.onnx"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/yolo.onnx"));
    }

    #[tokio::test]
    async fn accepts_existing_file() {
        let path = std::env::temp_dir().join(format!("catalog-{}.onnx", std::process::id()));
        tokio::fs::write(&path, b"stub").await.unwrap();

        let result = OnnxModelCatalog::new()
            .validate_model(&model(path.to_str().unwrap()))
            .await;
        tokio::fs::remove_file(&path).await.unwrap();
        assert!(result.is_ok());
    }
}
