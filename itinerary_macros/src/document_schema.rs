use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{spanned::Spanned, ItemStruct, LitStr};

use crate::schema_extraction::{
    collect_doc_comments, collect_field_docs, ensure_named_struct, infer_description,
    infer_schema_name, parse_document_schema_args, RenameRule,
};

pub fn document_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    let expanded = parse_document_schema_args(attr).and_then(|args| {
        let item_struct: ItemStruct = syn::parse(item)?;
        expand(&item_struct, args.name.as_ref(), args.description.as_ref())
    });
    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(
    item_struct: &ItemStruct,
    name: Option<&LitStr>,
    description: Option<&LitStr>,
) -> syn::Result<TokenStream2> {
    ensure_named_struct(item_struct)?;
    if !item_struct.generics.params.is_empty() {
        return Err(syn::Error::new(
            item_struct.generics.span(),
            "persisted documents must be concrete types; `#[document_schema]` rejects generics",
        ));
    }

    let schema_name = infer_schema_name(item_struct, name);
    let description = infer_description(description, collect_doc_comments(&item_struct.attrs));
    let description = match description {
        Some(lit) => quote! { Some(#lit) },
        None => quote! { None },
    };

    let rule = RenameRule::from_attrs(&item_struct.attrs)?;
    let field_docs = collect_field_docs(item_struct, rule)?
        .into_iter()
        .map(|(wire, doc)| {
            let wire = LitStr::new(&wire, Span::call_site());
            let doc = LitStr::new(&doc, Span::call_site());
            quote! { (#wire, #doc) }
        });

    let ident = &item_struct.ident;
    let type_name = LitStr::new(&ident.to_string(), Span::call_site());

    Ok(quote! {
        #item_struct

        impl itinerary_engine::schema::DocumentSchema for #ident {
            fn schema() -> &'static itinerary_engine::schema::SchemaHandle {
                static HANDLE: std::sync::OnceLock<itinerary_engine::schema::SchemaHandle> =
                    std::sync::OnceLock::new();
                HANDLE.get_or_init(|| {
                    let mut root = schemars::schema_for!(#ident);
                    itinerary_engine::schema::apply_doc_comments(
                        &mut root,
                        #schema_name,
                        #description,
                        &[#(#field_docs),*],
                    );
                    itinerary_engine::schema::SchemaHandle::new(#schema_name, #type_name, root)
                })
            }
        }
    })
}
