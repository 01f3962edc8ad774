//! Derive macro for `investigate_core::prompts::PromptSchema`.
//!
//! Generates the `FieldSpec` list for a struct mechanically, the same way
//! the engine's own `state_update_schema()` builds one by hand — this macro
//! exists so call sites that want a schema for their own structured-output
//! type don't have to keep a parallel hand-written `FieldSpec` list in sync
//! with the struct.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields, LitStr, Type};

/// Derive `PromptSchema` for a struct with named fields.
///
/// # Attributes
///
/// - `#[prompt_field(desc = "...")]` — field description used in
///   `to_prompt_line()` and ignored by `to_json_schema()`.
/// - `#[prompt_field(enum_values = "a,b,c")]` — treat the field as an enum
///   of the given string values rather than inferring from its Rust type.
///
/// `Option<T>` fields are inferred as optional automatically; everything
/// else is required.
#[proc_macro_derive(PromptSchema, attributes(prompt_field))]
pub fn derive_prompt_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_prompt_schema_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_prompt_schema_impl(input: DeriveInput) -> Result<TokenStream2, Error> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new(
                    input.ident.span(),
                    "PromptSchema can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.ident.span(),
                "PromptSchema can only be derived for structs",
            ))
        }
    };

    let field_specs: Vec<TokenStream2> = fields
        .iter()
        .map(|field| {
            let field_name = field.ident.as_ref().unwrap();
            let name_str = field_name.to_string();
            let attrs = parse_prompt_field_attrs(field)?;

            let field_type = match &attrs.enum_values {
                Some(values) => {
                    let literals: Vec<_> = values
                        .iter()
                        .map(|v| LitStr::new(v, field_name.span()))
                        .collect();
                    quote! {
                        ::investigate_core::prompts::FieldType::Enum(vec![
                            #(::std::string::String::from(#literals)),*
                        ])
                    }
                }
                None => infer_field_type(&field.ty),
            };

            let desc = attrs.desc.as_deref().unwrap_or("");
            let mut builder = quote! {
                ::investigate_core::prompts::FieldSpec::new(#name_str, #field_type)
                    .with_description(#desc)
            };
            if is_option_type(&field.ty) {
                builder = quote! { #builder.optional() };
            }
            Ok(builder)
        })
        .collect::<Result<_, Error>>()?;

    Ok(quote! {
        impl ::investigate_core::prompts::PromptSchema for #name {
            fn field_specs() -> ::std::vec::Vec<::investigate_core::prompts::FieldSpec> {
                vec![ #(#field_specs),* ]
            }
        }
    })
}

#[derive(Default)]
struct PromptFieldAttrs {
    desc: Option<String>,
    enum_values: Option<Vec<String>>,
}

fn parse_prompt_field_attrs(field: &syn::Field) -> Result<PromptFieldAttrs, Error> {
    let mut result = PromptFieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("prompt_field") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("desc") {
                let value: LitStr = meta.value()?.parse()?;
                result.desc = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("enum_values") {
                let value: LitStr = meta.value()?.parse()?;
                let parsed = value
                    .value()
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>();
                if parsed.is_empty() {
                    return Err(meta.error("enum_values cannot be empty"));
                }
                result.enum_values = Some(parsed);
                Ok(())
            } else {
                Err(meta.error("unknown prompt_field attribute, expected 'desc' or 'enum_values'"))
            }
        })?;
    }
    Ok(result)
}

fn infer_field_type(ty: &Type) -> TokenStream2 {
    match ty {
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return quote! { ::investigate_core::prompts::FieldType::String };
            };
            match segment.ident.to_string().as_str() {
                "String" | "str" => quote! { ::investigate_core::prompts::FieldType::String },
                "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
                | "u128" | "usize" => quote! { ::investigate_core::prompts::FieldType::Integer },
                "f32" | "f64" => quote! { ::investigate_core::prompts::FieldType::Float },
                "bool" => quote! { ::investigate_core::prompts::FieldType::Boolean },
                "Vec" => {
                    if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                        if let Some(syn::GenericArgument::Type(inner_ty)) = args.args.first() {
                            let inner = infer_field_type(inner_ty);
                            return quote! {
                                ::investigate_core::prompts::FieldType::List(Box::new(#inner))
                            };
                        }
                    }
                    quote! {
                        ::investigate_core::prompts::FieldType::List(Box::new(
                            ::investigate_core::prompts::FieldType::String
                        ))
                    }
                }
                "Option" => {
                    if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                        if let Some(syn::GenericArgument::Type(inner_ty)) = args.args.first() {
                            return infer_field_type(inner_ty);
                        }
                    }
                    quote! { ::investigate_core::prompts::FieldType::String }
                }
                _ => quote! { ::investigate_core::prompts::FieldType::String },
            }
        }
        _ => quote! { ::investigate_core::prompts::FieldType::String },
    }
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
