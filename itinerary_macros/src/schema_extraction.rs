use proc_macro2::Span;
use syn::{
    parse::Parser, punctuated::Punctuated, spanned::Spanned, Attribute, Expr, ExprLit, Field,
    Fields, ItemStruct, Lit, LitStr, Meta, MetaNameValue, Token,
};

#[derive(Default)]
pub struct DocumentSchemaArgs {
    pub name: Option<LitStr>,
    pub description: Option<LitStr>,
}

pub fn parse_document_schema_args(
    attr: proc_macro::TokenStream,
) -> syn::Result<DocumentSchemaArgs> {
    let mut result = DocumentSchemaArgs::default();
    if attr.is_empty() {
        return Ok(result);
    }

    let parser = Punctuated::<MetaNameValue, Token![,]>::parse_terminated;
    for nested in parser.parse(attr)? {
        let ident = nested
            .path
            .get_ident()
            .ok_or_else(|| syn::Error::new_spanned(&nested.path, "expected identifier"))?;
        let value = string_literal(&nested.value)?;

        let slot = match ident.to_string().as_str() {
            "name" => &mut result.name,
            "description" => &mut result.description,
            other => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unsupported argument `{other}`"),
                ))
            }
        };

        if slot.is_some() {
            return Err(syn::Error::new(
                ident.span(),
                format!("duplicate `{ident}` argument"),
            ));
        }
        *slot = Some(value);
    }

    Ok(result)
}

fn string_literal(expr: &Expr) -> syn::Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Ok(lit.clone()),
        other => Err(syn::Error::new_spanned(
            other,
            "expected string literal value",
        )),
    }
}

pub fn ensure_named_struct(item: &ItemStruct) -> syn::Result<()> {
    match &item.fields {
        Fields::Named(_) => Ok(()),
        _ => Err(syn::Error::new(
            item.struct_token.span(),
            "`#[document_schema]` only supports structs with named fields",
        )),
    }
}

pub fn collect_doc_comments(attrs: &[Attribute]) -> Option<String> {
    let docs: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(MetaNameValue {
                value:
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(lit), ..
                    }),
                ..
            }) => Some(lit.value().trim().to_string()),
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect();

    if docs.is_empty() {
        None
    } else {
        Some(docs.join(" "))
    }
}

/// Key casing applied by a struct-level `#[serde(rename_all = "...")]`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Verbatim,
    CamelCase,
    SnakeCase,
}

impl RenameRule {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut rule = RenameRule::Verbatim;
        for value in serde_string_values(attrs, "rename_all")? {
            rule = match value.value().as_str() {
                "camelCase" => RenameRule::CamelCase,
                "snake_case" => RenameRule::SnakeCase,
                other => {
                    return Err(syn::Error::new(
                        value.span(),
                        format!("`#[document_schema]` cannot map serde rename rule `{other}`"),
                    ))
                }
            };
        }
        Ok(rule)
    }

    fn apply(self, field: &str) -> String {
        let field = field.trim_start_matches("r#");
        match self {
            RenameRule::Verbatim | RenameRule::SnakeCase => field.to_string(),
            RenameRule::CamelCase => {
                let mut out = String::with_capacity(field.len());
                let mut upper_next = false;
                for ch in field.chars() {
                    if ch == '_' {
                        upper_next = !out.is_empty();
                    } else if upper_next {
                        out.extend(ch.to_uppercase());
                        upper_next = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}

/// Returns `(wire name, doc)` pairs for documented fields that serde serializes.
/// Wire names follow the struct's rename rule unless a field carries its own `rename`.
pub fn collect_field_docs(item: &ItemStruct, rule: RenameRule) -> syn::Result<Vec<(String, String)>> {
    let Fields::Named(fields) = &item.fields else {
        return Ok(Vec::new());
    };

    let mut docs = Vec::new();
    for field in fields.named.iter().filter(|field| !is_serde_skipped(field)) {
        let (Some(ident), Some(doc)) = (field.ident.as_ref(), collect_doc_comments(&field.attrs)) else {
            continue;
        };
        let wire = match serde_string_values(&field.attrs, "rename")?.pop() {
            Some(explicit) => explicit.value(),
            None => rule.apply(&ident.to_string()),
        };
        docs.push((wire, doc));
    }
    Ok(docs)
}

/// String values of `key = "..."` entries inside `#[serde(...)]` attributes.
fn serde_string_values(attrs: &[Attribute], key: &str) -> syn::Result<Vec<LitStr>> {
    let mut values = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                values.push(meta.value()?.parse::<LitStr>()?);
            } else if meta.input.peek(Token![=]) {
                let _: Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                meta.parse_nested_meta(|_| Ok(()))?;
            }
            Ok(())
        })?;
    }
    Ok(values)
}

fn is_serde_skipped(field: &Field) -> bool {
    let mut skipped = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                skipped = true;
            } else if meta.input.peek(Token![=]) {
                let _: Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    skipped
}

pub fn infer_schema_name(item: &ItemStruct, explicit: Option<&LitStr>) -> LitStr {
    explicit
        .cloned()
        .unwrap_or_else(|| LitStr::new(&item.ident.to_string(), Span::call_site()))
}

pub fn infer_description(explicit: Option<&LitStr>, doc: Option<String>) -> Option<LitStr> {
    explicit
        .cloned()
        .or_else(|| doc.map(|text| LitStr::new(&text, Span::call_site())))
}
