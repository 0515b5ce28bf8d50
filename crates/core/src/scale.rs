//! Drawing scale parsing
//!
//! Turns the scale notation printed on construction drawings
//! (`1/4" = 1'`, `1" = 1'`) into a feet-per-point conversion factor.
//! Parsing never fails: malformed labels degrade to documented defaults so a
//! bad scale string can never block drawing.

use serde::{Deserialize, Serialize};

/// PDF points per inch of drawing
pub const POINTS_PER_INCH: f64 = 72.0;

/// Inches per foot used when a fractional label cannot be parsed (1/8")
pub const FRACTION_FALLBACK_INCHES_PER_FOOT: f64 = 0.125;

/// Inches per foot used when a decimal label cannot be parsed (1")
pub const DECIMAL_FALLBACK_INCHES_PER_FOOT: f64 = 1.0;

/// Conversion factor returned when the calibration is not positive
pub const NEUTRAL_FEET_PER_POINT: f64 = 1.0;

/// Label of the scale used when none has been set
pub const DEFAULT_SCALE_LABEL: &str = "1/8\" = 1'";

/// Common architectural scales, as (label, inches of drawing per real foot)
pub const ARCHITECTURAL_SCALES: [(&str, f64); 10] = [
    ("1/16\" = 1'", 0.0625),
    ("1/8\" = 1'", 0.125),
    ("3/16\" = 1'", 0.1875),
    ("1/4\" = 1'", 0.25),
    ("3/8\" = 1'", 0.375),
    ("1/2\" = 1'", 0.5),
    ("3/4\" = 1'", 0.75),
    ("1\" = 1'", 1.0),
    ("1.5\" = 1'", 1.5),
    ("3\" = 1'", 3.0),
];

/// A parsed drawing calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSpec {
    /// Inches of drawing that represent one real-world foot
    inches_per_foot: f64,
    /// Label this calibration was parsed from
    label: String,
}

impl ScaleSpec {
    /// Create a calibration directly from inches per foot
    pub fn new(inches_per_foot: f64) -> Self {
        Self {
            inches_per_foot,
            label: format!("{inches_per_foot}\" = 1'"),
        }
    }

    /// Parse a scale label, falling back to defaults on malformed input
    pub fn parse(label: &str) -> Self {
        Self {
            inches_per_foot: parse_inches_per_foot(label),
            label: label.to_string(),
        }
    }

    /// Inches of drawing per real-world foot
    pub fn inches_per_foot(&self) -> f64 {
        self.inches_per_foot
    }

    /// Label the calibration was created from
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Real-world feet represented by one PDF point
    ///
    /// A non-positive or non-finite calibration yields a neutral factor of
    /// `1.0` instead of dividing by zero or flipping signs.
    pub fn feet_per_point(&self) -> f64 {
        if !self.inches_per_foot.is_finite() || self.inches_per_foot <= 0.0 {
            return NEUTRAL_FEET_PER_POINT;
        }
        let factor = 1.0 / (POINTS_PER_INCH * self.inches_per_foot);
        if factor.is_finite() {
            factor
        } else {
            NEUTRAL_FEET_PER_POINT
        }
    }
}

impl Default for ScaleSpec {
    fn default() -> Self {
        Self::parse(DEFAULT_SCALE_LABEL)
    }
}

/// Parse the drawing side of a scale label into inches per foot
///
/// Only the left side of `=` is read. A trailing inch mark and surrounding
/// whitespace are ignored. Fractions that cannot be parsed, or that divide by
/// zero, become 1/8"; decimals that cannot be parsed become 1".
pub fn parse_inches_per_foot(label: &str) -> f64 {
    let drawing_side = label.split('=').next().unwrap_or_default().trim();
    let token = drawing_side
        .strip_suffix('"')
        .unwrap_or(drawing_side)
        .trim();

    if let Some((numerator, denominator)) = token.split_once('/') {
        match (parse_number(numerator), parse_number(denominator)) {
            (Some(numerator), Some(denominator)) if denominator != 0.0 => {
                numerator / denominator
            }
            _ => {
                tracing::debug!(label, "unparsable fractional scale, using 1/8\"");
                FRACTION_FALLBACK_INCHES_PER_FOOT
            }
        }
    } else {
        parse_number(token).unwrap_or_else(|| {
            tracing::debug!(label, "unparsable decimal scale, using 1\"");
            DECIMAL_FALLBACK_INCHES_PER_FOOT
        })
    }
}

/// Finite decimal, or `None`
fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Feet per PDF point for a scale label
pub fn feet_per_point(label: &str) -> f64 {
    ScaleSpec::parse(label).feet_per_point()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fraction_scale() {
        let scale = ScaleSpec::parse("1/4\" = 1'");
        assert_eq!(scale.inches_per_foot(), 0.25);
        assert!((scale.feet_per_point() - 1.0 / 18.0).abs() < 1e-12);
        assert_eq!(scale.label(), "1/4\" = 1'");
    }

    #[test]
    fn test_decimal_scale() {
        assert_eq!(parse_inches_per_foot("1\" = 1'"), 1.0);
        assert_eq!(parse_inches_per_foot("1.5\" = 1'"), 1.5);
        assert_eq!(parse_inches_per_foot("  3\"=1'"), 3.0);
        assert!((feet_per_point("1\" = 1'") - 1.0 / 72.0).abs() < 1e-12);
    }

    #[test]
    fn test_whitespace_and_missing_inch_mark() {
        assert_eq!(parse_inches_per_foot("3/8 = 1'"), 0.375);
        assert_eq!(parse_inches_per_foot(" 3 / 8 \"  =  1'-0\""), 0.375);
        assert_eq!(parse_inches_per_foot("1/2"), 0.5);
    }

    #[test]
    fn test_fraction_fallbacks() {
        assert_eq!(parse_inches_per_foot("3/0\" = 1'"), 0.125);
        assert_eq!(parse_inches_per_foot("a/4\" = 1'"), 0.125);
        assert_eq!(parse_inches_per_foot("1/b\" = 1'"), 0.125);
        assert_eq!(parse_inches_per_foot("1-1/2\" = 1'"), 0.125);
        assert_eq!(parse_inches_per_foot("/\" = 1'"), 0.125);
    }

    #[test]
    fn test_decimal_fallbacks() {
        assert_eq!(parse_inches_per_foot(""), 1.0);
        assert_eq!(parse_inches_per_foot("scale"), 1.0);
        assert_eq!(parse_inches_per_foot("= 1'"), 1.0);
        assert_eq!(parse_inches_per_foot("NaN\" = 1'"), 1.0);
        assert_eq!(parse_inches_per_foot("inf\" = 1'"), 1.0);
    }

    #[test]
    fn test_non_positive_scale_is_neutral() {
        assert_eq!(ScaleSpec::parse("0\" = 1'").feet_per_point(), 1.0);
        assert_eq!(ScaleSpec::parse("-1/4\" = 1'").feet_per_point(), 1.0);
        assert_eq!(ScaleSpec::new(-2.0).feet_per_point(), 1.0);
        assert_eq!(ScaleSpec::new(f64::NAN).feet_per_point(), 1.0);
    }

    #[test]
    fn test_default_scale() {
        let scale = ScaleSpec::default();
        assert_eq!(scale.inches_per_foot(), 0.125);
        assert_eq!(scale.label(), DEFAULT_SCALE_LABEL);
    }

    #[test]
    fn test_architectural_presets() {
        for (label, inches) in ARCHITECTURAL_SCALES {
            assert_eq!(
                parse_inches_per_foot(label),
                inches,
                "preset {label} should parse"
            );
        }
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = ScaleSpec::parse("3/16\" = 1'");
        let second = ScaleSpec::parse("3/16\" = 1'");
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_fraction_yields_ratio(n in 1u32..1000, d in 1u32..1000) {
            let label = format!("{n}/{d}\" = 1'");
            prop_assert_eq!(parse_inches_per_foot(&label), n as f64 / d as f64);
        }

        #[test]
        fn prop_zero_denominator_falls_back(n in 0u32..1000) {
            let label = format!("{n}/0\" = 1'");
            prop_assert_eq!(parse_inches_per_foot(&label), 0.125);
        }

        #[test]
        fn prop_unparsable_numerator_falls_back(n in "[a-z]{1,6}", d in 1u32..1000) {
            let label = format!("{n}/{d}\" = 1'");
            prop_assert_eq!(parse_inches_per_foot(&label), 0.125);
        }

        #[test]
        fn prop_feet_per_point_is_positive(label in ".*") {
            let factor = ScaleSpec::parse(&label).feet_per_point();
            prop_assert!(factor > 0.0 && factor.is_finite());
        }
    }
}
