//! Attribute parsing for `#[derive(Struct)]` using darling.
//!
//! This module defines the attribute structs for parsing `#[structs(...)]`
//! attributes at both the container (struct) and field levels, and renders
//! field tags into the `key:"value"` form stored in the generated field table.

use std::collections::HashSet;

use darling::ast::NestedMeta;
use darling::{FromDeriveInput, FromField, FromMeta};
use syn::ext::IdentExt;
use syn::{Ident, Type, Visibility};

/// Tag key written by the `skip` shorthand.
pub const SKIP_TAG_KEY: &str = "structs";

/// Container-level attributes for `#[derive(Struct)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(structs), supports(struct_named))]
pub struct StructAttrs {
    /// The struct identifier.
    pub ident: Ident,
    /// Generics on the struct.
    pub generics: syn::Generics,
    /// The struct's data (fields).
    pub data: darling::ast::Data<(), FieldAttrs>,

    /// Path to the `structs-core` crate, for re-exported or renamed setups.
    #[darling(default, rename = "crate")]
    pub crate_path: Option<syn::Path>,
}

/// Field-level attributes for `#[derive(Struct)]`.
#[derive(Debug, Clone, FromField)]
#[darling(attributes(structs))]
pub struct FieldAttrs {
    /// The field identifier (always present; only named structs are supported).
    pub ident: Option<Ident>,
    /// The field's type.
    pub ty: Type,
    /// The field's visibility. Only `pub` fields are exported.
    pub vis: Visibility,

    /// The field's tag, either raw or as `key = "value"` pairs.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[structs(tag = r#"json:"id" db:"user_id""#)]
    /// pub id: u64,
    /// #[structs(tag(json = "name", structs = "-"))]
    /// pub name: String,
    /// ```
    #[darling(default)]
    pub tag: Option<TagAttr>,

    /// Mark the field as embedded.
    #[darling(default)]
    pub embedded: bool,

    /// Shorthand for `structs:"-"`: hide the field from enumeration.
    #[darling(default)]
    pub skip: bool,
}

/// The two spellings of a field tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAttr {
    /// `tag = "json:\"id\""`, kept verbatim.
    Raw(String),
    /// `tag(json = "id")`, rendered into the raw form.
    Pairs(Vec<(String, String)>),
}

impl FromMeta for TagAttr {
    fn from_string(value: &str) -> darling::Result<Self> {
        Ok(Self::Raw(value.to_string()))
    }

    fn from_list(items: &[NestedMeta]) -> darling::Result<Self> {
        let mut errors = darling::Error::accumulator();
        let mut pairs = Vec::with_capacity(items.len());

        for item in items {
            let NestedMeta::Meta(syn::Meta::NameValue(pair)) = item else {
                let err = darling::Error::custom("expected `key = \"value\"`");
                errors.push(err.with_span(item));
                continue;
            };
            let Some(key) = pair.path.get_ident() else {
                let err = darling::Error::custom("tag keys must be identifiers");
                errors.push(err.with_span(&pair.path));
                continue;
            };
            match &pair.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(value),
                    ..
                }) => pairs.push((key.unraw().to_string(), value.value())),
                other => {
                    let err = darling::Error::custom("tag values must be string literals");
                    errors.push(err.with_span(other));
                }
            }
        }

        errors.finish_with(Self::Pairs(pairs))
    }
}

impl TagAttr {
    /// The tag in `key:"value"` form.
    pub fn render(&self) -> String {
        match self {
            Self::Raw(raw) => raw.clone(),
            Self::Pairs(pairs) => pairs
                .iter()
                .map(|(key, value)| format!("{key}:\"{}\"", escape_tag_value(value)))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Keys in declaration order, as far as the tag is well formed.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Self::Raw(raw) => scan_raw_tag(raw).0,
            Self::Pairs(pairs) => pairs.iter().map(|(key, _)| key.clone()).collect(),
        }
    }
}

fn escape_tag_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_ascii_control() => escaped.push_str(&format!("\\x{:02x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Scans a raw tag the way the runtime does. Returns the keys found and the
/// unparsed remainder, which is empty for a well-formed tag.
///
/// Keep in step with `Pairs` in structs-core's `tag.rs`.
fn scan_raw_tag(raw: &str) -> (Vec<String>, &str) {
    let mut keys = Vec::new();
    let mut rest = raw;
    loop {
        let tag = rest.trim_start_matches(' ');
        if tag.is_empty() {
            return (keys, tag);
        }
        let bytes = tag.as_bytes();
        let mut i = 0;
        while i < bytes.len() && is_key_byte(bytes[i]) {
            i += 1;
        }
        if i == 0 || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
            return (keys, tag);
        }
        let key = &tag[..i];
        let value = &tag[i + 1..];
        let value_bytes = value.as_bytes();
        let mut j = 1;
        while j < value_bytes.len() && value_bytes[j] != b'"' {
            if value_bytes[j] == b'\\' {
                j += 1;
            }
            j += 1;
        }
        if j >= value_bytes.len() {
            return (keys, tag);
        }
        keys.push(key.to_string());
        rest = &value[j + 1..];
    }
}

/// Keys are runs of printable non-space bytes other than `:` and `"`.
fn is_key_byte(b: u8) -> bool {
    b > b' ' && b != b':' && b != b'"' && b != 0x7f
}

impl StructAttrs {
    /// Returns an iterator over the struct fields.
    ///
    /// # Panics
    ///
    /// Panics if the data is not a struct (should be impossible due to darling supports).
    pub fn fields(&self) -> impl Iterator<Item = &FieldAttrs> {
        match &self.data {
            darling::ast::Data::Struct(fields) => fields.iter(),
            _ => unreachable!("StructAttrs only supports named structs"),
        }
    }

    /// Validate container-level constraints and every field.
    ///
    /// Returns a list of validation errors, or empty vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(lifetime) = self.generics.lifetimes().next() {
            errors.push(format!(
                "`{}` has lifetime parameter `{}`; Struct can only be derived for 'static types",
                self.ident, lifetime.lifetime
            ));
        }

        for field in self.fields() {
            errors.extend(field.validate());
        }

        errors
    }
}

impl FieldAttrs {
    /// Returns the field name as a string.
    ///
    /// # Panics
    ///
    /// Panics if the field has no identifier (tuple struct field).
    pub fn name(&self) -> String {
        self.ident
            .as_ref()
            .expect("FieldAttrs requires named fields")
            .unraw()
            .to_string()
    }

    pub fn is_exported(&self) -> bool {
        matches!(self.vis, Visibility::Public(_))
    }

    /// The tag stored in the field table, with the `skip` shorthand applied.
    pub fn rendered_tag(&self) -> String {
        let tag = self.tag.as_ref().map(TagAttr::render).unwrap_or_default();
        match (self.skip, tag.is_empty()) {
            (false, _) => tag,
            (true, true) => format!("{SKIP_TAG_KEY}:\"-\""),
            (true, false) => format!("{SKIP_TAG_KEY}:\"-\" {tag}"),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let Some(tag) = &self.tag else {
            return errors;
        };

        if let TagAttr::Raw(raw) = tag {
            let (_, rest) = scan_raw_tag(raw);
            if !rest.is_empty() {
                errors.push(format!(
                    "field `{}`: malformed tag near `{rest}`; expected `key:\"value\"` pairs",
                    self.name()
                ));
            }
        }

        let keys = tag.keys();
        let mut seen = HashSet::new();
        for key in &keys {
            if !seen.insert(key.as_str()) {
                errors.push(format!("field `{}`: duplicate tag key `{key}`", self.name()));
            }
        }

        if self.skip && seen.contains(SKIP_TAG_KEY) {
            errors.push(format!(
                "field `{}`: `skip` conflicts with an explicit `{SKIP_TAG_KEY}` tag key",
                self.name()
            ));
        }

        errors
    }
}
