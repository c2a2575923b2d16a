mod document_schema;
mod schema_extraction;

use proc_macro::TokenStream;

/// Marks a struct as a persisted document with a cached JSON schema.
///
/// Generates an `itinerary_engine::schema::DocumentSchema` impl whose handle is
/// built once with `schemars` and enriched with the struct and field doc comments.
/// Accepts optional `name = "..."` and `description = "..."` overrides.
#[proc_macro_attribute]
pub fn document_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    document_schema::document_schema(attr, item)
}
