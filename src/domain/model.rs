use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,      // logical name, e.g. "yolov4-tiny-custom"
    pub onnx_path: String, // filesystem path
}

/// How the network lays out its raw candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// `[candidates, 5 + classes]`: normalized cx, cy, w, h, objectness, class scores.
    Darknet,
    /// `[4 + classes, candidates]`: cx, cy, w, h in input pixels, class scores.
    Ultralytics,
}

/// Whether a session is built per request or once for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelLoading {
    Shared,
    PerRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    pub input_width: u32,    // 640
    pub input_height: u32,   // 480
    pub scale: f32,          // 1/255
    pub swap_rb: bool,
    pub conf_threshold: f32, // 0..1
    pub nms_threshold: f32,  // 0..1
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            input_width: 640,
            input_height: 480,
            scale: 1.0 / 255.0,
            swap_rb: true,
            conf_threshold: 0.4,
            nms_threshold: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorSettings {
    pub model: ModelId,
    pub params: DetectorParams,
    pub layout: OutputLayout,
    pub loading: ModelLoading,
    pub intra_threads: usize,
}
