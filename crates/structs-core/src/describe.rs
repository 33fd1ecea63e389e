//! Static field tables for named-field records.
//!
//! Every record type owns one `&'static [FieldInfo]` table, emitted at build
//! time by `#[derive(Struct)]` (or written by hand, see the example below).
//! The table is the immutable half of a field descriptor: name, type name,
//! visibility, embedding and tag never change after compilation.
//!
//! # Example
//!
//! ```ignore
//! use structs_core::describe::{FieldInfo, Struct};
//!
//! const FIELDS: &[FieldInfo] = &[
//!     FieldInfo::new("name", "String").exported(),
//!     FieldInfo::new("age", "u32").exported().with_tag(r#"structs:"-""#),
//! ];
//! ```

use crate::reflect::Reflect;
use crate::tag::StructTag;

/// Description of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// The field name as it appears in Rust.
    pub name: &'static str,
    /// The declared type, as written in the source.
    pub type_name: &'static str,
    /// Whether the field is `pub`.
    pub exported: bool,
    /// Whether the field is marked as embedded.
    pub embedded: bool,
    pub tag: StructTag,
}

impl FieldInfo {
    pub const fn new(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            exported: false,
            embedded: false,
            tag: StructTag::EMPTY,
        }
    }

    pub const fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub const fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub const fn with_tag(mut self, raw: &'static str) -> Self {
        self.tag = StructTag::new(raw);
        self
    }
}

/// The reflection view of a record with named fields.
///
/// `field_infos`, `fields_ref` and `fields_mut` agree on length and order:
/// entry `i` of each describes the `i`-th declared field.
pub trait Struct: Reflect {
    /// The record's type name, without module path or generics.
    fn struct_name(&self) -> &'static str;

    fn field_infos(&self) -> &'static [FieldInfo];

    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    fn fields_ref(&self) -> Vec<&dyn Reflect>;

    /// Disjoint mutable borrows of every field, in declared order.
    fn fields_mut(&mut self) -> Vec<&mut dyn Reflect>;

    fn index_of(&self, name: &str) -> Option<usize> {
        self.field_infos().iter().position(|info| info.name == name)
    }

    fn field_count(&self) -> usize {
        self.field_infos().len()
    }
}

impl<'a> std::fmt::Debug for dyn Struct + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.reflect_debug(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_info_builder() {
        const INFO: FieldInfo = FieldInfo::new("inner", "Inner")
            .exported()
            .embedded()
            .with_tag(r#"structs:"inner""#);

        assert_eq!(INFO.name, "inner");
        assert_eq!(INFO.type_name, "Inner");
        assert!(INFO.exported);
        assert!(INFO.embedded);
        assert_eq!(INFO.tag.get("structs"), "inner");
    }

    #[test]
    fn field_info_defaults_to_private_and_untagged() {
        let info = FieldInfo::new("secret", "String");
        assert!(!info.exported);
        assert!(!info.embedded);
        assert!(info.tag.is_empty());
    }
}
