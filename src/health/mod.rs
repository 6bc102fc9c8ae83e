//! Health calculations

pub mod bmi;

pub use bmi::{calculate_bmi, classify_bmi, BmiCategory};
