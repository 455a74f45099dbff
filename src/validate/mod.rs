//! Request payload validation.
//!
//! Each operation declares its expected payload shape as data: the exact set
//! of required keys and the primitive kind of each value. Payloads with
//! extra keys, missing keys, undeclared keys, or wrongly-typed values are
//! rejected with `InvalidArgument` before any business logic runs.

use serde_json::Value;

use crate::error::ApiError;

/// Primitive kind a declared payload field must carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
        }
    }
}

/// Declared payload shape: required key name -> expected value kind.
pub type Shape = &'static [(&'static str, FieldKind)];

/// Check `payload` against `shape`. No side effects.
///
/// The key-set comparison is exact: the payload must contain precisely the
/// declared keys, nothing more and nothing less. Values are checked against
/// the declared kind (the original behavior compared the key's own runtime
/// type instead of the value's, which let any value through; here the value
/// itself is validated).
pub fn validate(payload: &Value, shape: Shape) -> Result<(), ApiError> {
    let map = payload.as_object().ok_or_else(|| {
        ApiError::invalid_argument("Request payload must be a JSON object!")
    })?;

    if map.len() != shape.len() {
        return Err(ApiError::invalid_argument(
            "Request payload contains an invalid number of keys!",
        ));
    }

    for (key, value) in map {
        let declared = shape.iter().find(|(name, _)| name == key);
        match declared {
            Some((_, kind)) if kind.matches(value) => {}
            _ => {
                return Err(ApiError::invalid_argument(
                    "Request payload contains invalid properties!",
                ))
            }
        }
    }

    Ok(())
}

/// Fetch a declared string field from an already-validated payload.
pub fn str_field<'a>(payload: &'a Value, key: &str) -> Result<&'a str, ApiError> {
    payload[key].as_str().ok_or_else(|| {
        ApiError::invalid_argument(format!("Field '{}' must be a string", key))
    })
}
