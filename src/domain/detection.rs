use serde::{Deserialize, Serialize};

/// Axis-aligned box in original-image pixels, `(left, top, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> i64 {
        if self.width <= 0 || self.height <= 0 {
            return 0;
        }
        self.width as i64 * self.height as i64
    }

    /// Intersection over union; 0 when either box is empty.
    pub fn iou(&self, other: &PixelRect) -> f32 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        let inter = PixelRect::new(left, top, right - left, bottom - top).area();
        let union = self.area() + other.area() - inter;
        if union <= 0 {
            return 0.0;
        }
        inter as f32 / union as f32
    }

    /// Pulls the origin inside a `frame_w` x `frame_h` image and trims the
    /// extent to the frame edge. Width and height never drop below 1.
    pub fn clamped_to(&self, frame_w: u32, frame_h: u32) -> PixelRect {
        let (fw, fh) = (frame_w as i32, frame_h as i32);
        let x = self.x.min(fw - 1).max(0);
        let y = self.y.min(fh - 1).max(0);
        PixelRect::new(
            x,
            y,
            self.width.min(fw - x).max(1),
            self.height.min(fh - y).max(1),
        )
    }

    pub fn to_array(&self) -> [i32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// A detection as emitted by the detector, before labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub class_id: usize,
    pub score: f32,
    pub rect: PixelRect,
}

/// A labelled detection as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f32,
    #[serde(rename = "box")]
    pub bbox: [i32; 4],
}
