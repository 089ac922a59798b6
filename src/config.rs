//! Startup configuration, parsed once from flags / environment and injected.

use std::path::Path;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use crate::domain::model::{DetectorParams, DetectorSettings, ModelId, ModelLoading, OutputLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "product-detector", version, about)]
pub struct AppConfig {
    /// Interface to bind
    #[arg(long, env = "DETECT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "DETECT_PORT", default_value_t = 5000)]
    pub port: u16,

    /// ONNX export of the detector
    #[arg(long, env = "MODEL_PATH", default_value = "models/yolov4-tiny-custom.onnx")]
    pub model_path: String,

    #[arg(long, env = "MODEL_LAYOUT", value_enum, default_value_t = OutputLayout::Darknet)]
    pub model_layout: OutputLayout,

    #[arg(long, env = "MODEL_LOADING", value_enum, default_value_t = ModelLoading::Shared)]
    pub model_loading: ModelLoading,

    #[arg(long, env = "CONF_THRESHOLD", default_value_t = 0.4, value_parser = unit_interval)]
    pub conf_threshold: f32,

    #[arg(long, env = "NMS_THRESHOLD", default_value_t = 0.4, value_parser = unit_interval)]
    pub nms_threshold: f32,

    #[arg(long, env = "INPUT_WIDTH", default_value_t = 640, value_parser = clap::value_parser!(u32).range(1..))]
    pub input_width: u32,

    #[arg(long, env = "INPUT_HEIGHT", default_value_t = 480, value_parser = clap::value_parser!(u32).range(1..))]
    pub input_height: u32,

    /// Feed the network RGB (true) or BGR (false)
    #[arg(long, env = "SWAP_RB", default_value_t = true, action = ArgAction::Set)]
    pub swap_rb: bool,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Timeout for the image download; unbounded when unset
    #[arg(long, env = "FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: Option<u64>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

fn unit_interval(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("{} is outside [0, 1]", v))
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    pub fn detector_settings(&self) -> DetectorSettings {
        let name = Path::new(&self.model_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("detector")
            .to_string();

        DetectorSettings {
            model: ModelId {
                name,
                onnx_path: self.model_path.clone(),
            },
            params: DetectorParams {
                input_width: self.input_width,
                input_height: self.input_height,
                conf_threshold: self.conf_threshold,
                nms_threshold: self.nms_threshold,
                swap_rb: self.swap_rb,
                ..DetectorParams::default()
            },
            layout: self.model_layout,
            loading: self.model_loading,
            intra_threads: self.intra_threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_detector() {
        let cfg = AppConfig::try_parse_from(["product-detector"]).unwrap();
        let settings = cfg.detector_settings();

        assert_eq!(settings.params, DetectorParams::default());
        assert_eq!(settings.model.name, "yolov4-tiny-custom");
        assert_eq!(settings.layout, OutputLayout::Darknet);
        assert_eq!(settings.loading, ModelLoading::Shared);
        assert!(cfg.fetch_timeout().is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = AppConfig::try_parse_from([
            "product-detector",
            "--port",
            "8080",
            "--model-loading",
            "per-request",
            "--model-layout",
            "ultralytics",
            "--swap-rb",
            "false",
            "--fetch-timeout-secs",
            "15",
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.model_loading, ModelLoading::PerRequest);
        assert_eq!(cfg.model_layout, OutputLayout::Ultralytics);
        assert!(!cfg.detector_settings().params.swap_rb);
        assert_eq!(cfg.fetch_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        assert!(AppConfig::try_parse_from(["product-detector", "--conf-threshold", "1.5"]).is_err());
        assert!(AppConfig::try_parse_from(["product-detector", "--nms-threshold", "x"]).is_err());
    }

    #[test]
    fn zero_input_size_is_rejected() {
        assert!(AppConfig::try_parse_from(["product-detector", "--input-width", "0"]).is_err());
    }
}
