//! Takeoff quantity calculation
//!
//! Pure functions from page-space points, a takeoff type and a scale to a
//! real-world quantity. Degenerate input never fails; it produces a zero
//! quantity in the type's unit.

use crate::geometry::Point2D;
use crate::scale::ScaleSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of takeoff item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TakeoffType {
    /// Length along the traced path, in feet
    Linear,
    /// Enclosed area of the traced polygon
    Area,
    /// Number of placed points
    Count,
}

impl TakeoffType {
    /// All takeoff types
    pub const ALL: [TakeoffType; 3] = [Self::Linear, Self::Area, Self::Count];

    /// Parse a case-insensitive type label
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "area" => Some(Self::Area),
            "count" => Some(Self::Count),
            _ => None,
        }
    }

    /// Lowercase label
    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Area => "area",
            Self::Count => "count",
        }
    }

    /// Unit the quantity is reported in
    ///
    /// The area label says square yards while the value is computed in
    /// square feet; see `area_quantity`.
    pub fn unit(self) -> &'static str {
        match self {
            Self::Linear => "ft",
            Self::Area => "yd²",
            Self::Count => "ct",
        }
    }

    /// Points needed before a non-zero quantity is possible
    pub fn min_points(self) -> usize {
        match self {
            Self::Linear => 2,
            Self::Area => 3,
            Self::Count => 0,
        }
    }
}

impl fmt::Display for TakeoffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A computed quantity with its unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TakeoffResult {
    pub quantity: f64,
    pub unit: String,
}

impl TakeoffResult {
    fn new(quantity: f64, unit: &str) -> Self {
        Self {
            quantity,
            unit: unit.to_string(),
        }
    }

    /// Zero quantity in the type's unit
    pub fn zero(kind: TakeoffType) -> Self {
        Self::new(0.0, kind.unit())
    }

    /// Label text such as `16.00 ft`
    pub fn display(&self) -> String {
        if self.unit.is_empty() {
            format!("{:.2}", self.quantity)
        } else {
            format!("{:.2} {}", self.quantity, self.unit)
        }
    }
}

/// Compute the quantity for a point sequence
pub fn calculate(points: &[Point2D], kind: TakeoffType, scale: &ScaleSpec) -> TakeoffResult {
    let feet_per_point = scale.feet_per_point();
    let quantity = match kind {
        TakeoffType::Linear => linear_quantity(points, feet_per_point),
        TakeoffType::Area => area_quantity(points, feet_per_point),
        TakeoffType::Count => points.len() as f64,
    };
    // Non-finite coordinates must not leak into reported quantities.
    let quantity = if quantity.is_finite() { quantity } else { 0.0 };
    TakeoffResult::new(quantity, kind.unit())
}

/// Compute the quantity for a type given by label
///
/// Unknown labels produce a zero quantity with an empty unit.
pub fn calculate_for_label(points: &[Point2D], label: &str, scale: &ScaleSpec) -> TakeoffResult {
    match TakeoffType::from_label(label) {
        Some(kind) => calculate(points, kind, scale),
        None => {
            tracing::debug!(label, "unknown takeoff type");
            TakeoffResult::new(0.0, "")
        }
    }
}

/// Path length in page points over the full ordered sequence
pub fn path_length(points: &[Point2D]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Unsigned polygon area in square page points (shoelace formula)
///
/// The polygon is closed implicitly from the last point back to the first.
/// Fewer than three points enclose nothing.
pub fn polygon_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x * points[j].y;
        twice_area -= points[j].x * points[i].y;
    }
    (twice_area / 2.0).abs()
}

fn linear_quantity(points: &[Point2D], feet_per_point: f64) -> f64 {
    if points.len() < TakeoffType::Linear.min_points() {
        return 0.0;
    }
    path_length(points) * feet_per_point
}

// Scaled by feet per point squared, so the value is square feet even though
// the unit label reads yd². Kept as-is pending a product decision on the unit.
fn area_quantity(points: &[Point2D], feet_per_point: f64) -> f64 {
    if points.len() < TakeoffType::Area.min_points() {
        return 0.0;
    }
    polygon_area(points) * feet_per_point * feet_per_point
}
