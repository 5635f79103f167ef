//! Implementation of the `#[derive(Record)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{
    Data, DeriveInput, Fields, Ident, Type, Visibility, WhereClause, WherePredicate, parse_macro_input,
    parse_quote,
};

use crate::attrs::{FieldAttrs, RecordAttrs};

pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_record_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// A field that becomes a STRUCT entry.
struct ExportedField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    name: String,
}

fn derive_record_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let attrs = RecordAttrs::from_attrs(&input.attrs)?;
    let record_name = attrs.name.clone().unwrap_or_else(|| name.unraw().to_string());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut exported = Vec::new();
    let mut hidden = Vec::new();
    for field in fields {
        let field_attrs = FieldAttrs::from_attrs(&field.attrs)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if matches!(field.vis, Visibility::Public(_)) && !field_attrs.skip {
            let name = field_attrs
                .rename
                .unwrap_or_else(|| ident.unraw().to_string());
            if exported.iter().any(|f: &ExportedField| f.name == name) {
                return Err(syn::Error::new_spanned(
                    ident,
                    format!("duplicate record field name '{name}'"),
                ));
            }
            exported.push(ExportedField {
                ident,
                ty: &field.ty,
                name,
            });
        } else {
            if field_attrs.rename.is_some() {
                return Err(syn::Error::new_spanned(
                    ident,
                    "rename has no effect on a field that is not exported",
                ));
            }
            hidden.push(ident);
        }
    }

    let reflect_impl = generate_reflect_impl(input, &record_name, &exported);
    let from_host_impl = generate_from_host_impl(input, &record_name, &exported, &hidden);
    let into_host_impl = generate_into_host_impl(input, &record_name, &exported);

    Ok(quote! {
        #reflect_impl
        #from_host_impl
        #into_host_impl
    })
}

/// Add `bound` for every exported field type to the struct's where clause.
fn bounded_where_clause(
    input: &DeriveInput,
    exported: &[ExportedField<'_>],
    bound: TokenStream2,
) -> Option<WhereClause> {
    let mut where_clause = input.generics.where_clause.clone();
    if input.generics.params.is_empty() {
        return where_clause;
    }
    let clause = where_clause.get_or_insert_with(|| WhereClause {
        where_token: Default::default(),
        predicates: Punctuated::new(),
    });
    for field in exported {
        let ty = field.ty;
        let predicate: WherePredicate = parse_quote!(#ty: #bound);
        clause.predicates.push(predicate);
    }
    where_clause
}

/// Generate the `Reflect` implementation.
fn generate_reflect_impl(input: &DeriveInput, record_name: &str, exported: &[ExportedField<'_>]) -> TokenStream2 {
    let name = &input.ident;
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();
    let where_clause = bounded_where_clause(input, exported, quote!(::sqlfn_core::Reflect));

    let field_names = exported.iter().map(|f| &f.name);
    let field_tys = exported.iter().map(|f| f.ty);

    quote! {
        impl #impl_generics ::sqlfn_core::Reflect for #name #ty_generics #where_clause {
            fn host_type() -> ::sqlfn_core::HostType {
                ::sqlfn_core::HostType::Record(::sqlfn_core::RecordType::new(
                    #record_name,
                    ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#name)),
                    ::std::vec![
                        #(
                            ::sqlfn_core::RecordField::new(
                                #field_names,
                                <#field_tys as ::sqlfn_core::Reflect>::host_type(),
                            )
                        ),*
                    ],
                ))
            }
        }
    }
}

/// Generate the `FromHost` implementation.
///
/// Exported fields are taken from the record value; hidden fields get their
/// `Default` value.
fn generate_from_host_impl(
    input: &DeriveInput,
    record_name: &str,
    exported: &[ExportedField<'_>],
    hidden: &[&Ident],
) -> TokenStream2 {
    let name = &input.ident;
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();
    let where_clause = bounded_where_clause(
        input,
        exported,
        quote!(::sqlfn_core::Reflect + ::sqlfn_core::FromHost),
    );

    let exported_fields = exported.iter().map(|f| {
        let ident = f.ident;
        let ty = f.ty;
        let field_name = &f.name;
        quote! {
            #ident: {
                let value = record.take(#field_name).ok_or_else(|| {
                    ::sqlfn_core::ConversionError::MissingField {
                        field: ::std::string::ToString::to_string(#field_name),
                        record: ::std::string::ToString::to_string(#record_name),
                    }
                })?;
                <#ty as ::sqlfn_core::FromHost>::from_host(value).map_err(|e| {
                    ::sqlfn_core::ConversionError::Field {
                        field: ::std::string::ToString::to_string(#field_name),
                        record: ::std::string::ToString::to_string(#record_name),
                        source: ::std::boxed::Box::new(e),
                    }
                })?
            }
        }
    });

    quote! {
        impl #impl_generics ::sqlfn_core::FromHost for #name #ty_generics #where_clause {
            #[allow(unused_mut, unused_variables)]
            fn from_host(
                value: ::sqlfn_core::HostValue,
            ) -> ::core::result::Result<Self, ::sqlfn_core::ConversionError> {
                let mut record = match value {
                    ::sqlfn_core::HostValue::Record(record) => record,
                    other => {
                        return ::core::result::Result::Err(::sqlfn_core::ConversionError::extract(
                            #record_name,
                            other.kind_name(),
                        ));
                    }
                };
                ::core::result::Result::Ok(Self {
                    #(#exported_fields,)*
                    #(#hidden: ::core::default::Default::default(),)*
                })
            }
        }
    }
}

/// Generate the `IntoHost` implementation.
fn generate_into_host_impl(input: &DeriveInput, record_name: &str, exported: &[ExportedField<'_>]) -> TokenStream2 {
    let name = &input.ident;
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();
    let where_clause = bounded_where_clause(input, exported, quote!(::sqlfn_core::IntoHost));

    let idents = exported.iter().map(|f| f.ident);
    let field_names = exported.iter().map(|f| &f.name);

    quote! {
        impl #impl_generics ::sqlfn_core::IntoHost for #name #ty_generics #where_clause {
            #[allow(unused_mut, unused_variables)]
            fn into_host(self) -> ::sqlfn_core::HostValue {
                let mut record = ::sqlfn_core::RecordValue::new(#record_name);
                #(
                    record.insert(#field_names, ::sqlfn_core::IntoHost::into_host(self.#idents));
                )*
                ::sqlfn_core::HostValue::Record(record)
            }
        }
    }
}
