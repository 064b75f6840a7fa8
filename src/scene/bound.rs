//! Rectangular pointer regions
//!
//! A bound is an inclusive pixel rectangle from `min` (top-left) to `max`
//! (bottom-right).

use glam::IVec2;

/// Inclusive pixel rectangle used for pointer detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    /// Top-left corner
    pub min: IVec2,
    /// Bottom-right corner
    pub max: IVec2,
}

impl Bound {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    /// Bound of a `size` square/rectangle whose top-left pixel is `pos`
    pub fn from_size(pos: IVec2, size: IVec2) -> Self {
        Self {
            min: pos,
            max: pos + size - IVec2::ONE,
        }
    }

    /// Whether the point lies inside the bound
    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether the point is down or right of the near corner
    ///
    /// Hit-testing walks bounds nearest-to-origin first and stops at the first
    /// bound for which this fails.
    pub fn in_scope(&self, p: IVec2) -> bool {
        p.x >= self.min.x || p.y >= self.min.y
    }

    /// Euclidean distance of the near corner from (0, 0), truncated
    pub fn origin_distance(&self) -> i64 {
        self.min.as_dvec2().length() as i64
    }

    /// Same bound moved so its near corner sits at `pos`
    pub fn moved_to(&self, pos: IVec2) -> Self {
        let delta = pos - self.min;
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}
