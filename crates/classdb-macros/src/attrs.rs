//! Attribute parsing for `#[derive(Class)]`.

use syn::{Attribute, LitStr, Path};

/// Parsed `#[class(...)]` attributes on a struct.
#[derive(Debug, Default)]
pub struct ClassAttrs {
    /// Registered class name (default: Rust struct name)
    pub name: Option<String>,
    /// Path of the core crate (default: `::classdb::core`)
    pub krate: Option<Path>,
}

/// Parsed `#[class(...)]` attributes on a field.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// The field embeds the parent class
    pub base: bool,
}

impl ClassAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("class") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(meta.error("class name must not be empty"));
                    }
                    result.name = Some(value.value());
                } else if meta.path.is_ident("crate") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.krate = Some(value.parse()?);
                } else {
                    return Err(meta.error(format!(
                        "unknown class attribute: {}",
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
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("class") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("base") {
                    result.base = true;
                } else {
                    return Err(meta.error(format!(
                        "unknown class field attribute: {}",
                        meta.path.get_ident().map(|i| i.to_string()).unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }

        Ok(result)
    }
}
