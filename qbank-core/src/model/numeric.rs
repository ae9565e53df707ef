//! Numeric answer text: ranges, tolerances and number formatting

use crate::error::ModelError;

/// Normalize a numeric answer to `(value, tolerance)`.
///
/// Accepted forms:
///
/// - `low..high` gives the midpoint and half the width, in either order
/// - `value:tolerance`
/// - `value` (tolerance 0)
pub fn parse_numeric(text: &str) -> Result<(f64, f64), ModelError> {
    let text = text.trim();
    if let Some((low, high)) = text.split_once("..") {
        let (low, high) = (parse_number(low)?, parse_number(high)?);
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let value = (low + high) / 2.0;
        return Ok((value, value - low));
    }
    if let Some((value, tolerance)) = text.split_once(':') {
        return Ok((parse_number(value)?, parse_number(tolerance)?.abs()));
    }
    Ok((parse_number(text)?, 0.0))
}

pub fn parse_number(text: &str) -> Result<f64, ModelError> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ModelError::InvalidNumber(trimmed.to_string()))
}

/// Shortest decimal form; integral values drop the fraction part.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Round to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
