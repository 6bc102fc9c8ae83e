//! Shopping unit standardization
//!
//! Collapses the free-form units found in recipe ingredients into the handful
//! of units a shopping list is read in: kg/g, litre/ml and pieces.

use serde::{Deserialize, Serialize};

// ============================================================================
// Weight Conversion Constants (to kilograms)
// ============================================================================

/// Kilograms per gram
pub const KG_PER_G: f64 = 0.001;
/// Kilograms per ounce
pub const KG_PER_OZ: f64 = 0.0283495;
/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;

// ============================================================================
// Volume Conversion Constants (to milliliters)
// ============================================================================

/// Milliliters per teaspoon
pub const ML_PER_TSP: f64 = 4.929;
/// Milliliters per tablespoon
pub const ML_PER_TBSP: f64 = 14.787;
/// Milliliters per cup (US)
pub const ML_PER_CUP: f64 = 236.588;
/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;

// ============================================================================
// Canonical Units
// ============================================================================

pub const UNIT_KG: &str = "kg";
pub const UNIT_G: &str = "g";
pub const UNIT_LITRE: &str = "litre";
pub const UNIT_ML: &str = "ml";
pub const UNIT_PIECES: &str = "pieces";

/// Which conversion table a measure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureKind {
    Weight,
    Volume,
    Count,
    /// Not in any table; passed through untouched
    Other,
}

/// A quantity after standardization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardQuantity {
    pub quantity: f64,
    pub measure: String,
}

/// Kilograms per unit for recognized weight measures.
///
/// `kg` is not an input key; kilogram quantities take the pass-through branch.
pub fn kg_per_unit(measure: &str) -> Option<f64> {
    match measure {
        "g" | "gram" | "grams" => Some(KG_PER_G),
        "oz" | "ounce" | "ounces" => Some(KG_PER_OZ),
        "lb" | "lbs" | "pound" | "pounds" => Some(KG_PER_LB),
        _ => None,
    }
}

/// Milliliters per unit for recognized volume measures
pub fn ml_per_unit(measure: &str) -> Option<f64> {
    match measure {
        "ml" | "milliliter" | "milliliters" => Some(1.0),
        "l" | "liter" | "liters" => Some(ML_PER_LITER),
        "cup" | "cups" => Some(ML_PER_CUP),
        "tbsp" | "tablespoon" | "tablespoons" => Some(ML_PER_TBSP),
        "tsp" | "teaspoon" | "teaspoons" => Some(ML_PER_TSP),
        _ => None,
    }
}

fn is_count_unit(measure: &str) -> bool {
    matches!(
        measure,
        "piece" | "pieces" | "clove" | "cloves" | "whole" | "unit" | "units"
    )
}

/// Classify a measure string (case-insensitive)
pub fn measure_kind(measure: &str) -> MeasureKind {
    let lower = measure.to_lowercase();

    if kg_per_unit(&lower).is_some() {
        MeasureKind::Weight
    } else if ml_per_unit(&lower).is_some() {
        MeasureKind::Volume
    } else if is_count_unit(&lower) {
        MeasureKind::Count
    } else {
        MeasureKind::Other
    }
}

/// Round to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Standardize a quantity/measure pair.
///
/// - weight → `kg` (2 decimals) when at least 1 kg, otherwise whole `g`
/// - volume → `litre` (2 decimals) when at least 1000 ml, otherwise whole `ml`
/// - count → whole `pieces`
/// - anything else keeps its measure verbatim, quantity to 2 decimals
///
/// Never fails; negative quantities flow through the same arithmetic.
pub fn standardize(quantity: f64, measure: &str) -> StandardQuantity {
    let lower = measure.to_lowercase();

    if let Some(factor) = kg_per_unit(&lower) {
        let kg = quantity * factor;
        return if kg >= 1.0 {
            StandardQuantity { quantity: round_to(kg, 2), measure: UNIT_KG.to_string() }
        } else {
            StandardQuantity { quantity: (kg * 1000.0).round(), measure: UNIT_G.to_string() }
        };
    }

    if let Some(factor) = ml_per_unit(&lower) {
        let ml = quantity * factor;
        return if ml >= 1000.0 {
            StandardQuantity { quantity: round_to(ml / 1000.0, 2), measure: UNIT_LITRE.to_string() }
        } else {
            StandardQuantity { quantity: ml.round(), measure: UNIT_ML.to_string() }
        };
    }

    if is_count_unit(&lower) {
        return StandardQuantity { quantity: quantity.round(), measure: UNIT_PIECES.to_string() };
    }

    StandardQuantity {
        quantity: round_to(quantity, 2),
        measure: measure.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn std_pair(quantity: f64, measure: &str) -> (f64, String) {
        let s = standardize(quantity, measure);
        (s.quantity, s.measure)
    }

    #[test]
    fn test_kg_is_not_converted() {
        assert_eq!(std_pair(2.0, "kg"), (2.0, "kg".to_string()));
    }

    #[test]
    fn test_weight_threshold() {
        assert_eq!(std_pair(500.0, "g"), (500.0, "g".to_string()));
        assert_eq!(std_pair(1500.0, "g"), (1.5, "kg".to_string()));
        assert_eq!(std_pair(999.4, "grams"), (999.0, "g".to_string()));
    }

    #[test]
    fn test_imperial_weights() {
        // 2 lb = 0.907184 kg
        assert_eq!(std_pair(2.0, "lb"), (907.0, "g".to_string()));
        // 3 lbs = 1.360776 kg
        assert_eq!(std_pair(3.0, "LBS"), (1.36, "kg".to_string()));
        // 8 oz = 0.226796 kg
        assert_eq!(std_pair(8.0, "Ounces"), (227.0, "g".to_string()));
    }

    #[test]
    fn test_volume_threshold() {
        assert_eq!(std_pair(4.0, "cup"), (946.0, "ml".to_string()));
        assert_eq!(std_pair(5.0, "cup"), (1.18, "litre".to_string()));
        assert_eq!(std_pair(2.0, "l"), (2.0, "litre".to_string()));
    }

    #[test]
    fn test_spoons() {
        // 2 tbsp = 29.574 ml
        assert_eq!(std_pair(2.0, "Tbsp"), (30.0, "ml".to_string()));
        // 1 tsp = 4.929 ml
        assert_eq!(std_pair(1.0, "teaspoon"), (5.0, "ml".to_string()));
    }

    #[test]
    fn test_count_rounding() {
        assert_eq!(std_pair(2.6, "cloves"), (3.0, "pieces".to_string()));
        assert_eq!(std_pair(1.0, "Whole"), (1.0, "pieces".to_string()));
    }

    #[test]
    fn test_unrecognized_passes_through() {
        assert_eq!(std_pair(1.234, "Pinch"), (1.23, "Pinch".to_string()));
        assert_eq!(std_pair(3.0, ""), (3.0, "".to_string()));
        // canonical output units that are not input keys stay put
        assert_eq!(std_pair(1.18, "litre"), (1.18, "litre".to_string()));
    }

    #[test]
    fn test_negative_quantities_are_not_rejected() {
        assert_eq!(std_pair(-200.0, "g"), (-200.0, "g".to_string()));
    }

    #[test]
    fn test_measure_kind() {
        assert_eq!(measure_kind("OZ"), MeasureKind::Weight);
        assert_eq!(measure_kind("milliliters"), MeasureKind::Volume);
        assert_eq!(measure_kind("unit"), MeasureKind::Count);
        assert_eq!(measure_kind("kg"), MeasureKind::Other);
        assert_eq!(measure_kind("slice"), MeasureKind::Other);
    }
}
