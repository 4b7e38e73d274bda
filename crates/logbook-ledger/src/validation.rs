//! Append input validation.
//!
//! Runs once at the ingestion boundary. The first failing field is reported;
//! a rejected record is never written.

use crate::errors::ValidationError;
use crate::types::NewLogRecord;

/// Lowest accepted perceived exertion.
pub const RPE_MIN: u8 = 1;
/// Highest accepted perceived exertion.
pub const RPE_MAX: u8 = 10;

/// Check every field constraint of an append request.
pub fn validate(input: &NewLogRecord) -> Result<(), ValidationError> {
    if input.user_id.trim().is_empty() {
        return Err(ValidationError::new("user_id", "is required"));
    }
    if input.exercise_name.trim().is_empty() {
        return Err(ValidationError::new("exercise_name", "is required"));
    }
    if input.set_number < 1 {
        return Err(ValidationError::new("set_number", "must be at least 1"));
    }
    check_non_negative("weight_used", input.weight_used)?;
    if let Some(distance) = input.distance {
        check_non_negative("distance", distance)?;
    }
    if let Some(rpe) = input.rpe {
        if !(RPE_MIN..=RPE_MAX).contains(&rpe) {
            return Err(ValidationError::new(
                "rpe",
                format!("must be between {RPE_MIN} and {RPE_MAX}, got {rpe}"),
            ));
        }
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ValidationError::new(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}
