use serde_json::Value;

use herald_common::HeraldError;
use herald_common::types::ApiResponse;

/// Human-readable JSON type name for shape errors.
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check that a status payload is an object carrying a `homeworks` list.
///
/// A missing `homeworks` key is treated the same as a wrongly typed one.
/// `current_date` is optional; anything other than an integer is ignored.
pub fn validate_response(payload: Value) -> Result<ApiResponse, HeraldError> {
    let mut fields = match payload {
        Value::Object(fields) => fields,
        other => {
            return Err(HeraldError::ResponseShape(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )));
        }
    };

    let homeworks = match fields.remove("homeworks") {
        Some(Value::Array(homeworks)) => homeworks,
        Some(other) => {
            return Err(HeraldError::ResponseShape(format!(
                "\"homeworks\" must be a list, got {}",
                json_type(&other)
            )));
        }
        None => {
            return Err(HeraldError::ResponseShape(
                "\"homeworks\" key is missing".to_string(),
            ));
        }
    };

    let current_date = fields.get("current_date").and_then(Value::as_i64);

    Ok(ApiResponse {
        homeworks,
        current_date,
    })
}
