pub mod handle;
pub mod validation;

pub use handle::{apply_doc_comments, DocumentSchema, SchemaHandle};
pub use validation::{parse_document, parse_validated, validate_against, validate_document};
