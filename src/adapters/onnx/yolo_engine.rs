use anyhow::{bail, Context, Result};
use image::RgbImage;
use ndarray::{ArrayViewD, Axis, Ix2, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Value;
use std::fs;
use tracing::debug;

use crate::adapters::onnx::postprocess::{
    clamp_to_frame, decode_candidates, non_max_suppression, to_input_tensor,
};
use crate::domain::detection::RawDetection;
use crate::domain::model::{DetectorParams, OutputLayout};

pub struct OnnxYoloEngine {
    session: Session,
    layout: OutputLayout,
}

impl OnnxYoloEngine {
    pub fn load(path: &str, layout: OutputLayout, intra_threads: usize) -> Result<Self> {
        let model_bytes =
            fs::read(path).with_context(|| format!("reading model file {}", path))?;

        let mut builder = Session::builder()?.with_intra_threads(intra_threads)?;

        // CUDA is optional: registered when available, CPU otherwise.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let session = builder
            .commit_from_memory(&model_bytes)
            .with_context(|| format!("building ONNX session from {}", path))?;

        Ok(Self { session, layout })
    }

    /// Runs the network on one frame and returns suppressed detections in output order.
    pub fn infer(&mut self, rgb: &RgbImage, params: &DetectorParams) -> Result<Vec<RawDetection>> {
        let input = to_input_tensor(rgb, params);
        let input_shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let (data, _) = input.into_raw_vec_and_offset();
        let input_tensor = Value::from_array((input_shape, data))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
        let view = match dims.len() {
            2 => array_view,
            3 => array_view.index_axis_move(Axis(0), 0),
            _ => bail!("unexpected detector output shape {:?}", dims),
        };
        let view = view.into_dimensionality::<Ix2>()?;

        let frame = (rgb.width(), rgb.height());
        let candidates = decode_candidates(view, self.layout, frame, params);
        debug!("{} candidates above threshold", candidates.len());

        let kept = non_max_suppression(candidates, params.nms_threshold);
        Ok(clamp_to_frame(kept, frame))
    }
}
