use crate::error::ApiError;
use validator::Validate;

/// Runs derive-based checks on query and body parameters and folds every
/// field error into one 400 `validation_error` envelope.
pub fn validate<T: Validate>(value: &T) -> Result<(), ApiError> {
    match value.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(ApiError::Validation(errors.to_string())),
    }
}
