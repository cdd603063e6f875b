//! Utility functions for the team formation engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Arithmetic mean of a slice of values, 0.0 when empty
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance of a slice of values, 0.0 for fewer than two values
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean_value = mean(values);
    values
        .iter()
        .map(|v| (v - mean_value).powi(2))
        .sum::<f64>()
        / values.len() as f64
}

/// Clamp a value to a symmetric bound around zero
pub fn clamp_symmetric(value: f64, bound: f64) -> f64 {
    value.clamp(-bound, bound)
}
