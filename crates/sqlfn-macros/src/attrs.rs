//! Attribute parsing for `#[sqlfn(...)]`.

use syn::{Attribute, LitStr};

/// Parsed `#[sqlfn(...)]` attributes on a struct.
#[derive(Debug, Default)]
pub struct RecordAttrs {
    /// Override record name (default: Rust struct name)
    pub name: Option<String>,
}

/// Parsed `#[sqlfn(...)]` attributes on a field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Override STRUCT field name
    pub rename: Option<String>,
    /// Keep a `pub` field out of the STRUCT
    pub skip: bool,
}

impl RecordAttrs {
    /// Parse attributes from a list of `#[sqlfn(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("sqlfn") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(meta.error("record name must not be empty"));
                    }
                    result.name = Some(value.value());
                } else {
                    return Err(meta.error(format!(
                        "unknown sqlfn attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}

impl FieldAttrs {
    /// Parse attributes from a list of `#[sqlfn(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("sqlfn") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(meta.error("field name must not be empty"));
                    }
                    result.rename = Some(value.value());
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else {
                    return Err(meta.error(format!(
                        "unknown sqlfn field attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}
