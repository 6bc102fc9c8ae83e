//! Health calculation tools

use serde::Serialize;

use crate::health::{calculate_bmi, classify_bmi, BmiCategory};
use crate::shopping::units::round_to;

#[derive(Debug, Serialize)]
pub struct BmiResponse {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub category: BmiCategory,
    pub label: &'static str,
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> Result<BmiResponse, String> {
    let value = calculate_bmi(weight_kg, height_cm)
        .ok_or_else(|| "weight_kg and height_cm must be positive numbers".to_string())?;
    // Classify what is reported
    let bmi = round_to(value, 1);
    let category = classify_bmi(bmi);

    Ok(BmiResponse {
        weight_kg,
        height_cm,
        bmi,
        category,
        label: category.display_name(),
    })
}
