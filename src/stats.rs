//! Area statistics of the detection set and the gate built on them.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Admission policy for rectangles placed by hand.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaGate {
    pub enabled: bool,
    pub lower_factor: f32,
    pub upper_factor: f32,
}

impl Default for AreaGate {
    fn default() -> Self {
        Self {
            enabled: true,
            lower_factor: 0.5,
            upper_factor: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaStatistics {
    pub average: f32,
    pub lower_bound: f32,
    pub upper_bound: f32,
}

impl AreaStatistics {
    /// Returns `None` for an empty set or when the average is not finite.
    pub fn from_rects<'a>(
        rects: impl IntoIterator<Item = &'a Rect>,
        gate: &AreaGate,
    ) -> Option<Self> {
        let (sum, count) = rects
            .into_iter()
            .fold((0.0_f64, 0_usize), |(sum, n), r| (sum + f64::from(r.area()), n + 1));
        if count == 0 {
            return None;
        }
        let average = (sum / count as f64) as f32;
        if !average.is_finite() {
            return None;
        }
        Some(Self {
            average,
            lower_bound: average * gate.lower_factor,
            upper_bound: average * gate.upper_factor,
        })
    }

    /// Inclusive on both ends.
    pub fn admits(&self, area: f32) -> bool {
        area >= self.lower_bound && area <= self.upper_bound
    }
}
