use egui::Pos2;
use serde::{Deserialize, Serialize};

/// Whether a stroke selects pixels for editing or clears them again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrokeMode {
    Paint,
    Erase,
}

impl StrokeMode {
    /// Mask value written by this mode
    pub fn value(self) -> u8 {
        match self {
            StrokeMode::Paint => 255,
            StrokeMode::Erase => 0,
        }
    }
}

/// One incremental brush motion in image space. Consumed immediately by
/// the mask canvas and not retained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSegment {
    pub start: Pos2,
    pub end: Pos2,
    pub radius: f32,
    pub mode: StrokeMode,
}

impl StrokeSegment {
    pub fn new(start: Pos2, end: Pos2, radius: f32, mode: StrokeMode) -> Self {
        Self {
            start,
            end,
            radius,
            mode,
        }
    }

    /// Zero-length segment, rendered as a filled dot
    pub fn dot(at: Pos2, radius: f32, mode: StrokeMode) -> Self {
        Self::new(at, at, radius, mode)
    }

    pub fn is_dot(&self) -> bool {
        self.start == self.end
    }

    /// Distance from `p` to the closest point of the segment
    pub fn distance_to(&self, p: Pos2) -> f32 {
        let ab = self.end - self.start;
        let len_sq = ab.length_sq();
        if len_sq == 0.0 {
            return self.start.distance(p);
        }
        let t = ((p - self.start).dot(ab) / len_sq).clamp(0.0, 1.0);
        (self.start + ab * t).distance(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_distance_to_dot() {
        let seg = StrokeSegment::dot(pos2(0.0, 0.0), 5.0, StrokeMode::Paint);
        assert!(seg.is_dot());
        assert!((seg.distance_to(pos2(3.0, 4.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_distance_to_line() {
        let seg = StrokeSegment::new(pos2(0.0, 0.0), pos2(10.0, 0.0), 1.0, StrokeMode::Erase);
        // Perpendicular to the middle
        assert!((seg.distance_to(pos2(5.0, 2.0)) - 2.0).abs() < 1e-5);
        // Past the end cap
        assert!((seg.distance_to(pos2(13.0, 4.0)) - 5.0).abs() < 1e-5);
    }
}
