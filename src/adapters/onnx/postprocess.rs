use std::collections::BTreeMap;

use image::{imageops::FilterType, RgbImage};
use ndarray::{s, Array4, ArrayView1, ArrayView2};

use crate::domain::detection::{PixelRect, RawDetection};
use crate::domain::model::{DetectorParams, OutputLayout};

/// Resizes to the network input (no letterbox) and lays the pixels out as NCHW.
pub fn to_input_tensor(rgb: &RgbImage, params: &DetectorParams) -> Array4<f32> {
    let (w, h) = (params.input_width, params.input_height);
    let resized = image::imageops::resize(rgb, w, h, FilterType::Triangle);

    // Decoded frames are RGB; without the swap the network sees BGR.
    let order: [usize; 3] = if params.swap_rb { [0, 1, 2] } else { [2, 1, 0] };

    let mut input = Array4::<f32>::zeros((1, 3, h as usize, w as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for (c, &src) in order.iter().enumerate() {
            input[[0, c, y as usize, x as usize]] = pixel[src] as f32 * params.scale;
        }
    }
    input
}

/// Turns raw network output into thresholded candidates in original-image pixels.
pub fn decode_candidates(
    output: ArrayView2<f32>,
    layout: OutputLayout,
    frame: (u32, u32),
    params: &DetectorParams,
) -> Vec<RawDetection> {
    let (frame_w, frame_h) = (frame.0 as f32, frame.1 as f32);
    let (rows, class_start, sx, sy) = match layout {
        OutputLayout::Darknet => (output, 5, frame_w, frame_h),
        OutputLayout::Ultralytics => (
            output.reversed_axes(),
            4,
            frame_w / params.input_width as f32,
            frame_h / params.input_height as f32,
        ),
    };

    let mut candidates = Vec::new();
    for row in rows.rows() {
        if row.len() <= class_start {
            continue;
        }
        let Some((class_id, class_score)) = best_class(row.slice(s![class_start..])) else {
            continue;
        };
        let objectness = match layout {
            OutputLayout::Darknet => row[4],
            OutputLayout::Ultralytics => 1.0,
        };
        let score = objectness * class_score;
        // Negated so NaN scores are dropped too.
        if !(score >= params.conf_threshold) {
            continue;
        }

        let (cx, cy) = (row[0] * sx, row[1] * sy);
        let (w, h) = (row[2] * sx, row[3] * sy);
        candidates.push(RawDetection {
            class_id,
            score,
            rect: PixelRect::new(
                (cx - w / 2.0) as i32,
                (cy - h / 2.0) as i32,
                w as i32,
                h as i32,
            ),
        });
    }
    candidates
}

/// Fits every box inside the frame it was detected in.
pub fn clamp_to_frame(detections: Vec<RawDetection>, frame: (u32, u32)) -> Vec<RawDetection> {
    detections
        .into_iter()
        .map(|d| RawDetection {
            rect: d.rect.clamped_to(frame.0, frame.1),
            ..d
        })
        .collect()
}

// First maximum wins on ties.
fn best_class(scores: ArrayView1<f32>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        match best {
            Some((_, b)) if score <= b => {}
            _ if score.is_nan() => {}
            _ => best = Some((i, score)),
        }
    }
    best
}

/// Greedy per-class suppression. Output is grouped by ascending class id and
/// sorted by descending score inside each class.
pub fn non_max_suppression(candidates: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    let mut by_class: BTreeMap<usize, Vec<RawDetection>> = BTreeMap::new();
    for candidate in candidates {
        by_class.entry(candidate.class_id).or_default().push(candidate);
    }

    let mut kept = Vec::new();
    for (_, mut group) in by_class {
        group.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut survivors: Vec<RawDetection> = Vec::with_capacity(group.len());
        for candidate in group {
            if survivors
                .iter()
                .all(|k| k.rect.iou(&candidate.rect) <= iou_threshold)
            {
                survivors.push(candidate);
            }
        }
        kept.extend(survivors);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use ndarray::Array2;

    fn raw(class_id: usize, score: f32, rect: [i32; 4]) -> RawDetection {
        RawDetection {
            class_id,
            score,
            rect: PixelRect::new(rect[0], rect[1], rect[2], rect[3]),
        }
    }

    #[test]
    fn input_tensor_is_scaled_nchw() {
        let img = RgbImage::from_pixel(3, 3, Rgb([255, 0, 51]));
        let params = DetectorParams {
            input_width: 4,
            input_height: 2,
            ..DetectorParams::default()
        };

        let t = to_input_tensor(&img, &params);
        assert_eq!(t.shape(), &[1, 3, 2, 4]);
        assert!((t[[0, 0, 1, 3]] - 1.0).abs() < 1e-6);
        assert!(t[[0, 1, 0, 0]].abs() < 1e-6);
        assert!((t[[0, 2, 0, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn input_tensor_without_swap_is_bgr() {
        let img = RgbImage::from_pixel(2, 2, Rgb([255, 0, 51]));
        let params = DetectorParams {
            input_width: 2,
            input_height: 2,
            swap_rb: false,
            ..DetectorParams::default()
        };

        let t = to_input_tensor(&img, &params);
        assert!((t[[0, 0, 0, 0]] - 0.2).abs() < 1e-6);
        assert!((t[[0, 2, 0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn darknet_rows_use_objectness_and_normalized_coords() {
        let output = Array2::from_shape_vec(
            (2, 8),
            vec![
                0.5, 0.5, 0.25, 0.5, 0.9, 0.1, 0.8, 0.05, //
                0.5, 0.5, 0.25, 0.5, 0.3, 0.9, 0.0, 0.0,
            ],
        )
        .unwrap();

        let got = decode_candidates(
            output.view(),
            OutputLayout::Darknet,
            (200, 100),
            &DetectorParams::default(),
        );
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].class_id, 1);
        assert!((got[0].score - 0.72).abs() < 1e-6);
        assert_eq!(got[0].rect, PixelRect::new(75, 25, 50, 50));
    }

    #[test]
    fn ultralytics_columns_are_scaled_from_input_size() {
        // One candidate, two classes: [cx, cy, w, h, c0, c1].
        let output = Array2::from_shape_vec((6, 1), vec![320.0, 240.0, 64.0, 48.0, 0.2, 0.7]).unwrap();

        let got = decode_candidates(
            output.view(),
            OutputLayout::Ultralytics,
            (1280, 960),
            &DetectorParams::default(),
        );
        assert_eq!(got, vec![raw(1, 0.7, [576, 432, 128, 96])]);
    }

    #[test]
    fn box_on_image_corner_is_clamped_after_suppression() {
        // Centred on the top-left corner, half the frame in each direction.
        let output =
            Array2::from_shape_vec((1, 6), vec![0.0, 0.0, 0.5, 0.5, 1.0, 0.9]).unwrap();
        let frame = (200, 100);

        let candidates = decode_candidates(
            output.view(),
            OutputLayout::Darknet,
            frame,
            &DetectorParams::default(),
        );
        assert_eq!(candidates[0].rect, PixelRect::new(-50, -25, 100, 50));

        let got = clamp_to_frame(non_max_suppression(candidates, 0.4), frame);
        assert_eq!(got, vec![raw(0, 0.9, [0, 0, 100, 50])]);
    }

    #[test]
    fn box_past_right_edge_is_trimmed() {
        let got = clamp_to_frame(vec![raw(4, 0.7, [180, 10, 60, 30])], (200, 100));
        assert_eq!(got[0].rect, PixelRect::new(180, 10, 20, 30));
        assert!(got.iter().all(|d| d.rect.x >= 0 && d.rect.y >= 0));
    }

    #[test]
    fn score_equal_to_threshold_is_kept() {
        let output =
            Array2::from_shape_vec((1, 6), vec![0.5, 0.5, 0.1, 0.1, 1.0, 0.4]).unwrap();
        let got = decode_candidates(
            output.view(),
            OutputLayout::Darknet,
            (10, 10),
            &DetectorParams::default(),
        );
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn ties_pick_lowest_class_id() {
        let scores = ndarray::arr1(&[0.5f32, 0.9, 0.9]);
        assert_eq!(best_class(scores.view()), Some((1, 0.9)));
    }

    #[test]
    fn nms_suppresses_same_class_overlap() {
        let kept = non_max_suppression(
            vec![
                raw(2, 0.6, [0, 0, 10, 10]),
                raw(2, 0.9, [1, 1, 10, 10]),
                raw(2, 0.5, [100, 100, 10, 10]),
            ],
            0.4,
        );
        assert_eq!(
            kept,
            vec![raw(2, 0.9, [1, 1, 10, 10]), raw(2, 0.5, [100, 100, 10, 10])]
        );
    }

    #[test]
    fn nms_keeps_overlapping_boxes_of_different_classes() {
        let kept = non_max_suppression(
            vec![raw(1, 0.9, [0, 0, 10, 10]), raw(0, 0.5, [0, 0, 10, 10])],
            0.4,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn nms_orders_by_class_then_score() {
        let kept = non_max_suppression(
            vec![
                raw(7, 0.95, [0, 0, 5, 5]),
                raw(3, 0.45, [50, 50, 5, 5]),
                raw(3, 0.80, [0, 0, 5, 5]),
            ],
            0.4,
        );
        let order: Vec<(usize, f32)> = kept.iter().map(|d| (d.class_id, d.score)).collect();
        assert_eq!(order, vec![(3, 0.80), (3, 0.45), (7, 0.95)]);
    }
}
