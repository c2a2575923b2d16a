use crate::error::{PlannerError, Result};
use crate::schema::{DocumentSchema, SchemaHandle};
use serde::de::DeserializeOwned;
use serde_json::Value;

const MAX_SCHEMA_ERRORS: usize = 3;

/// Validate a JSON payload against a document schema.
pub fn validate_against(schema: &SchemaHandle, payload: &Value) -> Result<()> {
    let validator = schema.validator()?;

    let Err(errors) = validator.validate(payload) else {
        return Ok(());
    };

    let mut details: Vec<String> = Vec::new();
    let mut truncated = false;
    for error in errors {
        if details.len() == MAX_SCHEMA_ERRORS {
            truncated = true;
            break;
        }
        let path = match error.instance_path.to_string() {
            path if path.is_empty() => "<root>".to_string(),
            path => path,
        };
        details.push(format!("{}: {}", path, error));
    }

    let mut summary = if details.is_empty() {
        "document failed schema validation".to_string()
    } else {
        details.join("; ")
    };
    if truncated {
        summary.push_str("; additional errors truncated");
    }

    Err(PlannerError::Validation(format!(
        "Document does not match `{}` schema: {}",
        schema.schema_name(),
        summary
    )))
}

/// Serialize a document and check it against its own schema before it leaves the engine.
pub fn validate_document<T: DocumentSchema>(document: &T) -> Result<Value> {
    let payload = serde_json::to_value(document)?;
    validate_against(T::schema(), &payload)?;
    Ok(payload)
}

/// Deserialize a document from text, reporting the JSON path of the first failure.
pub fn parse_document<T: DeserializeOwned>(text: &str) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(path_error)
}

/// Parse a document, checking the schema first so the error names every offending path.
pub fn parse_validated<T: DocumentSchema>(text: &str) -> Result<T> {
    let payload: Value = serde_json::from_str(text)?;
    validate_against(T::schema(), &payload)?;
    serde_path_to_error::deserialize(payload).map_err(path_error)
}

fn path_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> PlannerError {
    PlannerError::Validation(format!(
        "Document parsing failed at {}: {}",
        err.path(),
        err.inner()
    ))
}
