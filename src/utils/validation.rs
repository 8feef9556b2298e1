use validator::{Validate, ValidationError, ValidationErrors};

use crate::errors::AppError;

pub const MOBILE_MAX_LEN: usize = 15;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(|err| AppError::Validation(describe(&err)))
}

/// Flattens validator output into `field: message` pairs, sorted by field.
#[must_use]
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// True when `value` is at most 15 ASCII digits. Empty input passes.
#[must_use]
pub fn is_mobile_prefix(value: &str) -> bool {
    value.len() <= MOBILE_MAX_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if mobile.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("mobile is required".into());
        return Err(err);
    }
    if !is_mobile_prefix(mobile) {
        let mut err = ValidationError::new("mobile");
        err.message =
            Some(format!("mobile must contain only digits, at most {MOBILE_MAX_LEN}").into());
        return Err(err);
    }
    Ok(())
}
