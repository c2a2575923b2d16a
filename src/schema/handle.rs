use crate::error::{PlannerError, Result};
use jsonschema::{Draft, JSONSchema};
use schemars::schema::{RootSchema, Schema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Schema of a persisted document type, built once per type.
///
/// The Draft 7 validator is compiled on first use and shared by every clone.
#[derive(Clone)]
pub struct SchemaHandle {
    schema_name: &'static str,
    type_name: &'static str,
    schema_json: Arc<Value>,
    validator: Arc<OnceLock<std::result::Result<JSONSchema, String>>>,
}

impl fmt::Debug for SchemaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaHandle")
            .field("schema_name", &self.schema_name)
            .field("type_name", &self.type_name)
            .field("compiled", &self.validator.get().is_some())
            .finish()
    }
}

impl SchemaHandle {
    pub fn new(schema_name: &'static str, type_name: &'static str, root: RootSchema) -> Self {
        // RootSchema is plain data; serializing it cannot fail
        let schema_json = serde_json::to_value(root)
            .unwrap_or_else(|err| panic!("schema for {} is not serializable: {}", type_name, err));

        Self {
            schema_name,
            type_name,
            schema_json: Arc::new(schema_json),
            validator: Arc::new(OnceLock::new()),
        }
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }

    pub fn schema_json_arc(&self) -> Arc<Value> {
        Arc::clone(&self.schema_json)
    }

    /// Top-level properties a document must carry.
    pub fn required_fields(&self) -> Vec<&str> {
        self.schema_json["required"]
            .as_array()
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub(crate) fn validator(&self) -> Result<&JSONSchema> {
        let compiled = self.validator.get_or_init(|| {
            JSONSchema::options()
                .with_draft(Draft::Draft7)
                .compile(&self.schema_json)
                .map_err(|err| err.to_string())
        });
        compiled.as_ref().map_err(|reason| {
            PlannerError::Validation(format!(
                "`{}` schema cannot be compiled: {}",
                self.schema_name, reason
            ))
        })
    }
}

/// Documents that cross the storage or UI boundary. Implemented by `#[document_schema]`.
pub trait DocumentSchema: Serialize + DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static SchemaHandle;
}

/// Copies doc comments collected by `#[document_schema]` into the schema metadata.
/// Existing titles and descriptions from `schemars` take precedence.
pub fn apply_doc_comments(
    root: &mut RootSchema,
    title: &'static str,
    description: Option<&'static str>,
    field_docs: &[(&'static str, &'static str)],
) {
    let document = &mut root.schema;
    let metadata = document.metadata();
    metadata.title.get_or_insert_with(|| title.to_string());
    if let Some(description) = description {
        metadata.description.get_or_insert_with(|| description.to_string());
    }

    let Some(object) = document.object.as_mut() else {
        return;
    };
    for (field, doc) in field_docs {
        if let Some(Schema::Object(property)) = object.properties.get_mut(*field) {
            property
                .metadata()
                .description
                .get_or_insert_with(|| (*doc).to_string());
        }
    }
}
