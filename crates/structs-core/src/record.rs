//! The root of a descriptor tree.

use crate::describe::Struct;
use crate::field::{self, Field, Handle};
use crate::kind::Kind;

/// Tag key consulted for the skip marker unless overridden.
pub const DEFAULT_TAG_NAME: &str = "structs";

/// Wraps a root record and hands out descriptors for its fields.
///
/// [`Record::new`] borrows the record mutably, so every descriptor reached
/// from it (at any depth) can write through to the record. [`Record::detached`]
/// borrows it shared, and every descriptor reached from it fails writes with
/// [`FieldError::NotSettable`](crate::FieldError::NotSettable).
///
/// ```ignore
/// use structs_core::{Record, Struct};
///
/// #[derive(Struct)]
/// struct Person {
///     pub name: String,
///     #[structs(skip)]
///     pub age: u32,
/// }
///
/// let mut ann = Person { name: "Ann".into(), age: 30 };
/// let mut record = Record::new(&mut ann);
/// assert_eq!(record.names(), ["name"]);
/// assert_eq!(record.field("age").unwrap().value_as::<u32>(), Some(&30));
/// ```
pub struct Record<'a> {
    value: Handle<'a>,
    name: &'static str,
    tag_name: &'static str,
}

impl<'a> Record<'a> {
    pub fn new<T: Struct>(value: &'a mut T) -> Self {
        let name = value.struct_name();
        Self {
            value: Handle::Addressable(value),
            name,
            tag_name: DEFAULT_TAG_NAME,
        }
    }

    pub fn detached<T: Struct>(value: &'a T) -> Self {
        Self {
            name: value.struct_name(),
            value: Handle::Detached(value),
            tag_name: DEFAULT_TAG_NAME,
        }
    }

    /// Uses `tag_name` instead of [`DEFAULT_TAG_NAME`] as the tag key for the
    /// skip marker, here and in every descriptor derived from this record.
    pub fn with_tag_name(mut self, tag_name: &'static str) -> Self {
        self.tag_name = tag_name;
        self
    }

    pub fn tag_name(&self) -> &'static str {
        self.tag_name
    }

    /// The record's type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_settable(&self) -> bool {
        self.value.is_addressable()
    }

    /// Descriptors for the record's fields, in declared order, without the
    /// fields carrying the skip marker.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(record = self.name, tag = self.tag_name)
    )]
    pub fn fields(&mut self) -> Vec<Field<'_>> {
        field::struct_fields(self.value.reborrow(), self.tag_name).unwrap_or_default()
    }

    /// The field `name`, or `None` if the record has no such field.
    pub fn field(&mut self, name: &str) -> Option<Field<'_>> {
        field::struct_field(self.value.reborrow(), name, self.tag_name)
            .ok()
            .flatten()
    }

    /// Names of the fields [`fields`](Self::fields) would return.
    pub fn names(&self) -> Vec<&'static str> {
        let Some(record) = self.value.get().as_struct() else {
            return Vec::new();
        };
        record
            .field_infos()
            .iter()
            .filter(|info| info.tag.get(self.tag_name) != field::SKIP_MARKER)
            .map(|info| info.name)
            .collect()
    }

    pub fn kind(&self) -> Kind {
        self.value.get().kind()
    }
}

impl std::fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("name", &self.name)
            .field("tag_name", &self.tag_name)
            .field("settable", &self.is_settable())
            .field("value", &self.value.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use structs_derive::Struct;

    #[derive(Struct)]
    struct Person {
        pub name: String,
        #[structs(skip)]
        pub age: u32,
    }

    #[test]
    fn skip_marker_hides_field_from_enumeration_only() {
        let mut ann = Person {
            name: "Ann".to_string(),
            age: 30,
        };
        let mut record = Record::new(&mut ann);

        let fields = record.fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name(), "name");
        drop(fields);

        assert_eq!(record.names(), ["name"]);
        let age = record.field("age").unwrap();
        assert_eq!(age.value_as::<u32>(), Some(&30));
    }

    #[test]
    fn missing_field_is_none() {
        let ann = Person {
            name: "Ann".to_string(),
            age: 30,
        };
        let mut record = Record::detached(&ann);
        assert!(record.field("email").is_none());
        assert!(record.field("Name").is_none());
    }

    #[test]
    fn root_metadata() {
        let mut ann = Person {
            name: "Ann".to_string(),
            age: 30,
        };
        let record = Record::new(&mut ann).with_tag_name("json");
        assert_eq!(record.name(), "Person");
        assert_eq!(record.tag_name(), "json");
        assert_eq!(record.kind(), Kind::Struct);
        assert!(record.is_settable());
        assert_eq!(record.names(), ["name", "age"]);

        let rendered = format!("{record:?}");
        assert!(rendered.contains(r#"name: "Ann""#));
        assert!(rendered.contains("age: 30"));
    }
}
