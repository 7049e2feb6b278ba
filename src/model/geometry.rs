//! Paragraph rectangles.
//!
//! Layout estimation reports paragraphs as origin plus size, while text
//! extraction and annotations take two corners. Coordinates are PDF user
//! space points (origin at the bottom-left of the page).

use serde::{Deserialize, Serialize};

/// A paragraph area as reported by layout estimation: (x, y, width, height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphArea {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ParagraphArea {
    /// Create a new area.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert to corner form: `x2 = x + width`, `y2 = y + height`.
    pub fn to_rect(self) -> Rect {
        Rect {
            x1: self.x,
            y1: self.y,
            x2: self.x + self.width,
            y2: self.y + self.height,
        }
    }
}

impl From<ParagraphArea> for Rect {
    fn from(area: ParagraphArea) -> Self {
        area.to_rect()
    }
}

/// A rectangle in corner form: (x1, y1, x2, y2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    /// Create a new rectangle from two corners.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Same rectangle with `x1 <= x2` and `y1 <= y2`.
    pub fn normalized(self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).abs()
    }

    /// Whether the point lies inside the rectangle (edges included).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let r = self.normalized();
        x >= r.x1 as f32 && x <= r.x2 as f32 && y >= r.y1 as f32 && y <= r.y2 as f32
    }

    /// Corners as floats, in `[x1, y1, x2, y2]` order.
    pub fn to_float_array(&self) -> [f32; 4] {
        [self.x1 as f32, self.y1 as f32, self.x2 as f32, self.y2 as f32]
    }
}

/// Convert raw `[x, y, w, h]` rows to `[x1, y1, x2, y2]` in place.
///
/// This is a one-shot transform: running it again on converted rows adds
/// the origin a second time.
pub fn convert_rectangles(rows: &mut [[i32; 4]]) {
    for row in rows.iter_mut() {
        row[2] += row[0];
        row[3] += row[1];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_to_rect() {
        let rect = ParagraphArea::new(72, 500, 300, 40).to_rect();
        assert_eq!(rect, Rect::new(72, 500, 372, 540));
    }

    #[test]
    fn test_area_to_rect_zero_size() {
        let rect: Rect = ParagraphArea::new(10, 20, 0, 0).into();
        assert_eq!(rect, Rect::new(10, 20, 10, 20));
    }

    #[test]
    fn test_convert_rectangles_in_place() {
        let mut rows = [[10, 20, 30, 40], [0, 0, 5, 5]];
        convert_rectangles(&mut rows);
        assert_eq!(rows, [[10, 20, 40, 60], [0, 0, 5, 5]]);
    }

    #[test]
    fn test_convert_rectangles_is_not_idempotent() {
        let mut rows = [[10, 20, 30, 40]];
        convert_rectangles(&mut rows);
        convert_rectangles(&mut rows);
        assert_eq!(rows, [[10, 20, 50, 80]]);
    }

    #[test]
    fn test_rect_contains_and_normalize() {
        let rect = Rect::new(100, 200, 50, 100);
        assert_eq!(rect.normalized(), Rect::new(50, 100, 100, 200));
        assert!(rect.contains(75.0, 150.0));
        assert!(rect.contains(50.0, 100.0));
        assert!(!rect.contains(49.9, 150.0));
        assert_eq!(rect.width(), 50);
        assert_eq!(rect.height(), 100);
    }

    #[test]
    fn test_to_float_array() {
        assert_eq!(
            Rect::new(1, 2, 3, 4).to_float_array(),
            [1.0, 2.0, 3.0, 4.0]
        );
    }
}
