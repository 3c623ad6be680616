extern crate proc_macro;

use itertools::izip;
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use std::collections::HashSet;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, FieldsNamed, FieldsUnnamed, Ident,
    Index, Type,
};

/// Field attributes parsed from `#[anycodec(...)]` annotations
///
/// * `key` - The object key (or enum variant name) used on the wire
/// * `default` - Whether to use `Default::default()` when the key is missing
/// * `skip` - Whether to leave the field out entirely
#[derive(Debug, Clone)]
struct FieldAttributes {
    key: String,
    default: bool,
    skip: bool,
}

/// Extract and parse `#[anycodec(...)]` attribute values
///
/// # Supported Attributes
///
/// * `#[anycodec(rename="name")]` - Object key / variant name used instead of the Rust name
/// * `#[anycodec(default)]` - Use default value if the key is missing
/// * `#[anycodec(skip)]` - Never written, always `Default::default()` when read
///
/// Multiple attributes can be combined: `#[anycodec(rename="id", default)]`
fn get_field_attributes(attrs: &[Attribute], field_name: &str) -> FieldAttributes {
    let mut default = false;
    let mut skip = false;
    let mut rename = None;

    for attr in attrs {
        if attr.path().is_ident("anycodec") {
            let parsed = attr.parse_args_with(|input: syn::parse::ParseStream| {
                let mut parsed_default = false;
                let mut parsed_skip = false;
                let mut parsed_rename = None;

                while !input.is_empty() {
                    let ident = input.parse::<syn::Ident>()?;

                    if ident == "default" {
                        parsed_default = true;
                    } else if ident == "skip" {
                        parsed_skip = true;
                    } else if ident == "rename" {
                        input.parse::<syn::Token![=]>()?;
                        let lit_str = input.parse::<syn::LitStr>()?;
                        parsed_rename = Some(lit_str.value());
                    } else {
                        return Err(syn::Error::new(
                            ident.span(),
                            format!("Unknown attribute: {}", ident),
                        ));
                    }

                    if input.peek(syn::Token![,]) {
                        input.parse::<syn::Token![,]>()?;
                    }
                }

                Ok((parsed_default, parsed_skip, parsed_rename))
            });

            match parsed {
                Ok((parsed_default, parsed_skip, parsed_rename)) => {
                    default = default || parsed_default;
                    skip = skip || parsed_skip;
                    if let Some(rename_val) = parsed_rename {
                        rename = Some(rename_val);
                    }
                }
                Err(err) => {
                    panic!(
                        "#[anycodec(...)] attribute for '{}' is not in the correct format: {}",
                        field_name, err
                    );
                }
            }
        }
    }

    FieldAttributes {
        key: rename.unwrap_or_else(|| field_name.to_string()),
        default,
        skip,
    }
}

/// Check if a type is `Option<T>`
fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map_or(false, |seg| seg.ident == "Option")
    } else {
        false
    }
}

/// Collects idents, types and parsed attributes of named fields, rejecting duplicate keys.
fn named_fields<'a>(
    fields: &'a FieldsNamed,
    owner: &str,
) -> (Vec<&'a Ident>, Vec<&'a Type>, Vec<FieldAttributes>) {
    let mut idents = Vec::new();
    let mut types = Vec::new();
    let mut attrs = Vec::new();
    let mut used_keys = HashSet::new();
    for f in &fields.named {
        let Some(ident) = f.ident.as_ref() else {
            continue;
        };
        let field_attrs = get_field_attributes(&f.attrs, &ident.to_string());
        if !field_attrs.skip && !used_keys.insert(field_attrs.key.clone()) {
            panic!(
                "Key '{}' is duplicated for '{}'. Please specify a different key for field '{}' using #[anycodec(rename=...)].",
                field_attrs.key, owner, ident
            );
        }
        idents.push(ident);
        types.push(&f.ty);
        attrs.push(field_attrs);
    }
    (idents, types, attrs)
}

/// Builds a `Value::Map` from named fields; `access` yields a reference to each field.
fn named_to_any(
    fields: &FieldsNamed,
    owner: &str,
    access: impl Fn(&Ident) -> TokenStream2,
) -> TokenStream2 {
    let (idents, types, attrs) = named_fields(fields, owner);
    let inserts = izip!(idents, types, attrs).filter_map(|(ident, ty, attrs)| {
        if attrs.skip {
            return None;
        }
        let key = &attrs.key;
        let field = access(ident);
        if is_option_type(ty) {
            Some(quote! {
                if let Some(val) = #field {
                    map.insert(::std::string::String::from(#key), anycodec::ToAny::to_any(val));
                }
            })
        } else {
            Some(quote! {
                map.insert(::std::string::String::from(#key), anycodec::ToAny::to_any(#field));
            })
        }
    });
    quote! {
        {
            #[allow(unused_mut)]
            let mut map = ::std::collections::BTreeMap::new();
            #(#inserts)*
            anycodec::Value::Map(map)
        }
    }
}

/// Reads named fields out of `value` and builds `ctor { .. }`.
fn named_from_any(
    fields: &FieldsNamed,
    owner: &str,
    value: TokenStream2,
    ctor: TokenStream2,
) -> TokenStream2 {
    let (idents, types, attrs) = named_fields(fields, owner);
    let assignments = izip!(idents, types, attrs).map(|(ident, ty, attrs)| {
        let key = &attrs.key;
        if attrs.skip {
            quote! { #ident: ::std::default::Default::default(), }
        } else if attrs.default || is_option_type(ty) {
            quote! {
                #ident: match map.remove(#key) {
                    Some(v) => <#ty as anycodec::FromAny>::from_any(v)?,
                    None => ::std::default::Default::default(),
                },
            }
        } else {
            quote! {
                #ident: match map.remove(#key) {
                    Some(v) => <#ty as anycodec::FromAny>::from_any(v)?,
                    None => {
                        return Err(anycodec::ConvertError::MissingField {
                            field: #key,
                            type_name: #owner,
                        })
                    }
                },
            }
        }
    });
    quote! {
        {
            #[allow(unused_mut, unused_variables)]
            let mut map = match #value {
                anycodec::Value::Map(map) => map,
                other => return Err(anycodec::ConvertError::mismatch("object", &other)),
            };
            #ctor { #(#assignments)* }
        }
    }
}

/// Builds a `Value::Array` from the non-skipped positional fields.
fn unnamed_to_any(fields: &FieldsUnnamed, access: impl Fn(usize) -> TokenStream2) -> TokenStream2 {
    let items = fields.unnamed.iter().enumerate().filter_map(|(i, f)| {
        if get_field_attributes(&f.attrs, &i.to_string()).skip {
            return None;
        }
        let field = access(i);
        Some(quote! { anycodec::ToAny::to_any(#field) })
    });
    quote! {
        anycodec::Value::Array(::std::vec![#(#items),*])
    }
}

/// Reads positional fields out of an array value and builds `ctor( .. )`.
fn unnamed_from_any(fields: &FieldsUnnamed, value: TokenStream2, ctor: TokenStream2) -> TokenStream2 {
    let mut expected = 0usize;
    let values: Vec<_> = fields
        .unnamed
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let ty = &f.ty;
            if get_field_attributes(&f.attrs, &i.to_string()).skip {
                quote! { ::std::default::Default::default() }
            } else {
                expected += 1;
                quote! { <#ty as anycodec::FromAny>::from_any(items.next().unwrap_or_default())? }
            }
        })
        .collect();
    quote! {
        {
            let items = match #value {
                anycodec::Value::Array(items) => items,
                other => return Err(anycodec::ConvertError::mismatch("array", &other)),
            };
            if items.len() != #expected {
                return Err(anycodec::ConvertError::LengthMismatch {
                    expected: #expected,
                    actual: items.len(),
                });
            }
            #[allow(unused_mut, unused_variables)]
            let mut items = items.into_iter();
            #ctor( #(#values),* )
        }
    }
}

fn bindings(count: usize) -> Vec<Ident> {
    (0..count)
        .map(|i| Ident::new(&format!("field{}", i), Span::call_site()))
        .collect()
}

/// Derive macro for implementing the `ToAny` trait
///
/// * Named structs become objects keyed by field name
/// * Tuple structs become arrays
/// * Unit structs become `null`
/// * Unit enum variants become their name as a string; other variants become
///   a single-entry object `{ variant: payload }`. A one-field tuple variant's
///   payload is that field; longer tuple variants use an array.
///
/// `Option` fields holding `None` are left out of the object.
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(ToAny)]
/// struct MyStruct {
///     #[anycodec(rename = "userId")]
///     user_id: u32,
///     #[anycodec(skip)]
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(ToAny, attributes(anycodec))]
pub fn derive_to_any(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(fields) => named_to_any(fields, &name_str, |ident| quote! { &self.#ident }),
            Fields::Unnamed(fields) => unnamed_to_any(fields, |i| {
                let index = Index::from(i);
                quote! { &self.#index }
            }),
            Fields::Unit => quote! { anycodec::Value::Null },
        },
        Data::Enum(e) => {
            let mut variant_arms = Vec::new();
            let mut used_keys = HashSet::new();

            for v in &e.variants {
                let variant_ident = &v.ident;
                let variant_attrs = get_field_attributes(&v.attrs, &variant_ident.to_string());
                let key = &variant_attrs.key;
                if !used_keys.insert(key.clone()) {
                    panic!("Variant name '{}' is duplicated for enum '{}'. Please specify a different name for variant '{}' using #[anycodec(rename=...)].", key, name, variant_ident);
                }
                let owner = format!("{}::{}", name, variant_ident);

                match &v.fields {
                    Fields::Named(fields) => {
                        let field_idents: Vec<_> =
                            fields.named.iter().filter_map(|f| f.ident.as_ref()).collect();
                        let payload = named_to_any(fields, &owner, |ident| quote! { #ident });
                        variant_arms.push(quote! {
                            #name::#variant_ident { #(#field_idents),* } => {
                                let mut outer = ::std::collections::BTreeMap::new();
                                outer.insert(::std::string::String::from(#key), #payload);
                                anycodec::Value::Map(outer)
                            }
                        });
                    }
                    Fields::Unnamed(fields) => {
                        let field_bindings = bindings(fields.unnamed.len());
                        let payload = if fields.unnamed.len() == 1 {
                            quote! { anycodec::ToAny::to_any(field0) }
                        } else {
                            let bound = &field_bindings;
                            unnamed_to_any(fields, |i| {
                                let binding = &bound[i];
                                quote! { #binding }
                            })
                        };
                        variant_arms.push(quote! {
                            #name::#variant_ident( #(#field_bindings),* ) => {
                                let mut outer = ::std::collections::BTreeMap::new();
                                outer.insert(::std::string::String::from(#key), #payload);
                                anycodec::Value::Map(outer)
                            }
                        });
                    }
                    Fields::Unit => {
                        variant_arms.push(quote! {
                            #name::#variant_ident => anycodec::Value::Str(::std::string::String::from(#key)),
                        });
                    }
                }
            }
            quote! {
                match self {
                    #(#variant_arms)*
                }
            }
        }
        Data::Union(_) => unimplemented!("Unions are not supported"),
    };

    TokenStream::from(quote! {
        impl #impl_generics anycodec::ToAny for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn to_any(&self) -> anycodec::Value {
                #body
            }
        }
    })
}

/// Derive macro for implementing the `FromAny` trait
///
/// Accepts exactly what `#[derive(ToAny)]` produces. Missing keys are an error
/// unless the field is an `Option`, marked `#[anycodec(default)]`, or skipped;
/// unknown keys are ignored.
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(FromAny)]
/// struct MyStruct {
///     #[anycodec(default)]
///     retries: u8,
///     nickname: Option<String>,
/// }
/// ```
#[proc_macro_derive(FromAny, attributes(anycodec))]
pub fn derive_from_any(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(fields) => {
                let build = named_from_any(fields, &name_str, quote! { value }, quote! { #name });
                quote! { Ok(#build) }
            }
            Fields::Unnamed(fields) => {
                let build = unnamed_from_any(fields, quote! { value }, quote! { #name });
                quote! { Ok(#build) }
            }
            Fields::Unit => quote! {
                match value {
                    anycodec::Value::Null | anycodec::Value::Undefined => Ok(#name),
                    other => Err(anycodec::ConvertError::mismatch("null", &other)),
                }
            },
        },
        Data::Enum(e) => {
            let mut unit_variant_arms = Vec::new();
            let mut data_variant_arms = Vec::new();

            for v in &e.variants {
                let variant_ident = &v.ident;
                let variant_attrs = get_field_attributes(&v.attrs, &variant_ident.to_string());
                let key = &variant_attrs.key;
                let owner = format!("{}::{}", name, variant_ident);

                match &v.fields {
                    Fields::Named(fields) => {
                        let build = named_from_any(
                            fields,
                            &owner,
                            quote! { payload },
                            quote! { #name::#variant_ident },
                        );
                        data_variant_arms.push(quote! {
                            #key => Ok(#build),
                        });
                    }
                    Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                        let ty = &fields.unnamed[0].ty;
                        data_variant_arms.push(quote! {
                            #key => Ok(#name::#variant_ident(<#ty as anycodec::FromAny>::from_any(payload)?)),
                        });
                    }
                    Fields::Unnamed(fields) => {
                        let build = unnamed_from_any(
                            fields,
                            quote! { payload },
                            quote! { #name::#variant_ident },
                        );
                        data_variant_arms.push(quote! {
                            #key => Ok(#build),
                        });
                    }
                    Fields::Unit => {
                        unit_variant_arms.push(quote! {
                            #key => Ok(#name::#variant_ident),
                        });
                    }
                }
            }
            quote! {
                match value {
                    anycodec::Value::Str(variant) => match variant.as_str() {
                        #(#unit_variant_arms)*
                        _ => Err(anycodec::ConvertError::UnknownVariant {
                            variant,
                            enum_name: #name_str,
                        }),
                    },
                    anycodec::Value::Map(map) => {
                        let len = map.len();
                        let mut entries = map.into_iter();
                        match (entries.next(), entries.next()) {
                            (Some((variant, payload)), None) => match variant.as_str() {
                                #(#data_variant_arms)*
                                _ => Err(anycodec::ConvertError::UnknownVariant {
                                    variant,
                                    enum_name: #name_str,
                                }),
                            },
                            _ => Err(anycodec::ConvertError::LengthMismatch {
                                expected: 1,
                                actual: len,
                            }),
                        }
                    }
                    other => Err(anycodec::ConvertError::mismatch("enum", &other)),
                }
            }
        }
        Data::Union(_) => unimplemented!("Unions are not supported"),
    };

    TokenStream::from(quote! {
        impl #impl_generics anycodec::FromAny for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn from_any(value: anycodec::Value) -> ::std::result::Result<Self, anycodec::ConvertError> {
                #body
            }
        }
    })
}
