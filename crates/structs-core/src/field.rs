//! Field descriptors: a view over one field of a live record.
//!
//! A [`Field`] pairs a storage handle with the field's static [`FieldInfo`]
//! and the tag key of the convention in use. The handle is either
//! addressable (borrowed mutably from the root record) or detached (borrowed
//! shared), and only addressable handles can be written through. Descending
//! into a nested record with [`Field::fields`] or [`Field::field`] reborrows
//! the parent's handle, so children inherit its addressability and a write
//! through a child lands in the original record. Children of an unexported
//! field are always detached.

use std::borrow::Cow;
use std::fmt;

use crate::describe::FieldInfo;
use crate::error::{FieldError, Precondition};
use crate::kind::Kind;
use crate::reflect::Reflect;

/// Tag value that hides a field from enumeration.
pub const SKIP_MARKER: &str = "-";

pub(crate) enum Handle<'a> {
    Addressable(&'a mut dyn Reflect),
    Detached(&'a dyn Reflect),
}

impl Handle<'_> {
    pub(crate) fn get(&self) -> &dyn Reflect {
        match self {
            Handle::Addressable(value) => &**value,
            Handle::Detached(value) => *value,
        }
    }

    fn get_mut(&mut self) -> Option<&mut dyn Reflect> {
        match self {
            Handle::Addressable(value) => {
                let value: &mut dyn Reflect = &mut **value;
                Some(value)
            }
            Handle::Detached(_) => None,
        }
    }

    pub(crate) fn reborrow(&mut self) -> Handle<'_> {
        match self {
            Handle::Addressable(value) => {
                let value: &mut dyn Reflect = &mut **value;
                Handle::Addressable(value)
            }
            Handle::Detached(value) => Handle::Detached(*value),
        }
    }

    /// A read-only reborrow, whatever the handle's own addressability.
    pub(crate) fn detach(&self) -> Handle<'_> {
        Handle::Detached(self.get())
    }

    pub(crate) fn is_addressable(&self) -> bool {
        matches!(self, Handle::Addressable(_))
    }
}

/// Descriptors for the immediate fields of the record behind `handle`.
///
/// Fields whose `default_tag` value is exactly [`SKIP_MARKER`] are left out.
/// Fails with the handle's kind when it does not hold a record.
pub(crate) fn struct_fields<'h>(
    handle: Handle<'h>,
    default_tag: &'static str,
) -> Result<Vec<Field<'h>>, Kind> {
    let kind = handle.get().kind();
    let entries: Vec<(&'static FieldInfo, Handle<'h>)> = match handle {
        Handle::Addressable(value) => {
            let record = value.as_struct_mut().ok_or(kind)?;
            let infos = record.field_infos();
            infos
                .iter()
                .zip(record.fields_mut().into_iter().map(Handle::Addressable))
                .collect()
        }
        Handle::Detached(value) => {
            let record = value.as_struct().ok_or(kind)?;
            record
                .field_infos()
                .iter()
                .zip(record.fields_ref().into_iter().map(Handle::Detached))
                .collect()
        }
    };

    Ok(entries
        .into_iter()
        .filter(|(info, _)| !is_skipped(info, default_tag))
        .map(|(info, value)| Field::new(value, info, default_tag))
        .collect())
}

/// Descriptor for the immediate field `name` of the record behind `handle`.
///
/// The skip marker is not consulted: a field hidden from enumeration can
/// still be reached by name.
pub(crate) fn struct_field<'h>(
    handle: Handle<'h>,
    name: &str,
    default_tag: &'static str,
) -> Result<Option<Field<'h>>, Kind> {
    let kind = handle.get().kind();
    match handle {
        Handle::Addressable(value) => {
            let record = value.as_struct_mut().ok_or(kind)?;
            let Some(index) = record.index_of(name) else {
                return Ok(None);
            };
            let Some(info) = record.field_infos().get(index) else {
                return Ok(None);
            };
            Ok(record
                .field_at_mut(index)
                .map(|value| Field::new(Handle::Addressable(value), info, default_tag)))
        }
        Handle::Detached(value) => {
            let record = value.as_struct().ok_or(kind)?;
            let Some(index) = record.index_of(name) else {
                return Ok(None);
            };
            let Some(info) = record.field_infos().get(index) else {
                return Ok(None);
            };
            Ok(record
                .field_at(index)
                .map(|value| Field::new(Handle::Detached(value), info, default_tag)))
        }
    }
}

fn is_skipped(info: &FieldInfo, default_tag: &str) -> bool {
    let skipped = info.tag.get(default_tag) == SKIP_MARKER;
    if skipped {
        tracing::trace!(
            field = info.name,
            tag = default_tag,
            "skipping field marked with the skip tag"
        );
    }
    skipped
}

fn not_a_struct(field: &'static str, kind: Kind) -> FieldError {
    FieldError::PreconditionFailed {
        field,
        violation: Precondition::NotAStruct { kind },
    }
}

/// A single field of a record, with accessors for its metadata and value.
///
/// Descriptors are transient views: they borrow the root record for `'a` and
/// are obtained from [`Record`](crate::Record) or from a parent descriptor.
pub struct Field<'a> {
    value: Handle<'a>,
    info: &'static FieldInfo,
    default_tag: &'static str,
}

impl<'a> Field<'a> {
    pub(crate) fn new(
        value: Handle<'a>,
        info: &'static FieldInfo,
        default_tag: &'static str,
    ) -> Self {
        Self {
            value,
            info,
            default_tag,
        }
    }

    /// Returns the value associated with `key` in the field's tag, or an
    /// empty string if there is no such key.
    pub fn tag(&self, key: &str) -> Cow<'static, str> {
        self.info.tag.get(key)
    }

    /// Returns the field's current value.
    ///
    /// # Panics
    ///
    /// Panics if the field is not exported. Use [`try_value`](Self::try_value)
    /// when that cannot be ruled out.
    #[track_caller]
    pub fn value(&self) -> &dyn Reflect {
        match self.try_value() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_value(&self) -> Result<&dyn Reflect, FieldError> {
        if !self.info.exported {
            return Err(FieldError::PreconditionFailed {
                field: self.info.name,
                violation: Precondition::Unexported,
            });
        }
        Ok(self.value.get())
    }

    /// The value downcast to `T`, or `None` when it is a different type or
    /// the field is not exported.
    pub fn value_as<T: Reflect>(&self) -> Option<&T> {
        self.try_value().ok()?.as_any().downcast_ref::<T>()
    }

    /// Returns true if the field is marked as embedded.
    pub fn is_embedded(&self) -> bool {
        self.info.embedded
    }

    /// Returns true if the field is `pub`.
    pub fn is_exported(&self) -> bool {
        self.info.exported
    }

    /// Returns true if [`set`](Self::set) can succeed for a value of the
    /// right type.
    pub fn is_settable(&self) -> bool {
        self.info.exported && self.value.is_addressable()
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    /// The kind of the field's value, such as `string`, `map` or `struct`.
    pub fn kind(&self) -> Kind {
        self.value.get().kind()
    }

    /// The declared type, as written in the record's source.
    pub fn type_name(&self) -> &'static str {
        self.info.type_name
    }

    pub fn info(&self) -> &'static FieldInfo {
        self.info
    }

    /// The tag key consulted for the skip marker when enumerating children.
    pub fn default_tag(&self) -> &'static str {
        self.default_tag
    }

    /// Returns true if the field holds its type's zero value.
    ///
    /// # Panics
    ///
    /// Panics if the field is not exported.
    #[track_caller]
    pub fn is_zero(&self) -> bool {
        match self.try_is_zero() {
            Ok(zero) => zero,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_is_zero(&self) -> Result<bool, FieldError> {
        let current = self.try_value()?;
        let zero = current.zero_value();
        Ok(current.reflect_eq(&*zero))
    }

    /// Sets the field to `value`.
    ///
    /// Fails with [`FieldError::NotExported`] for private fields,
    /// [`FieldError::NotSettable`] when the descriptor came from a detached
    /// root, and [`FieldError::TypeMismatch`] when `value` is not assignable
    /// to the field's type. On failure the field is left untouched.
    pub fn set<T: Reflect>(&mut self, value: T) -> Result<(), FieldError> {
        self.set_boxed(Box::new(value))
    }

    pub fn set_boxed(&mut self, value: Box<dyn Reflect>) -> Result<(), FieldError> {
        let field = self.info.name;
        if !self.info.exported {
            return Err(FieldError::NotExported { field });
        }
        let Some(slot) = self.value.get_mut() else {
            return Err(FieldError::NotSettable { field });
        };

        let required = slot.reflect_type_name();
        let kind = slot.kind();
        slot.try_assign(value)
            .map_err(|rejected| FieldError::TypeMismatch {
                field,
                offered: rejected.reflect_type_name(),
                required,
            })?;

        tracing::trace!(field, %kind, "field updated");
        Ok(())
    }

    /// Resets the field to its type's zero value. Fails like [`set`](Self::set).
    pub fn zero(&mut self) -> Result<(), FieldError> {
        let zero = self.value.get().zero_value();
        self.set_boxed(zero)
    }

    /// Descriptors for the fields of the nested record this field holds.
    ///
    /// Fields tagged with [`SKIP_MARKER`] under the default tag key are left
    /// out, e.g.
    ///
    /// ```ignore
    /// #[structs(tag = r#"structs:"-""#)]
    /// pub request: Request,
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the field's kind is not a struct or a pointer to one.
    #[track_caller]
    pub fn fields(&mut self) -> Vec<Field<'_>> {
        match self.try_fields() {
            Ok(fields) => fields,
            Err(err) => panic!("{err}"),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(field = self.info.name))]
    pub fn try_fields(&mut self) -> Result<Vec<Field<'_>>, FieldError> {
        let field = self.info.name;
        let default_tag = self.default_tag;
        struct_fields(self.children(), default_tag).map_err(|kind| not_a_struct(field, kind))
    }

    /// The nested field `name`, or `None` if the nested record has no such
    /// field. Only immediate children are searched.
    ///
    /// # Panics
    ///
    /// Panics if the field's kind is not a struct or a pointer to one.
    #[track_caller]
    pub fn field(&mut self, name: &str) -> Option<Field<'_>> {
        match self.try_field(name) {
            Ok(field) => field,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_field(&mut self, name: &str) -> Result<Option<Field<'_>>, FieldError> {
        let field = self.info.name;
        let default_tag = self.default_tag;
        struct_field(self.children(), name, default_tag).map_err(|kind| not_a_struct(field, kind))
    }

    /// The handle children are built from. A private field's contents can
    /// be inspected but never written.
    fn children(&mut self) -> Handle<'_> {
        if self.info.exported {
            self.value.reborrow()
        } else {
            self.value.detach()
        }
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.info.name)
            .field("kind", &self.kind())
            .field("exported", &self.info.exported)
            .field("embedded", &self.info.embedded)
            .field("settable", &self.is_settable())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use structs_derive::Struct;

    #[derive(Struct, Debug, PartialEq)]
    struct Server {
        pub name: String,
        pub port: u16,
        #[structs(tag(structs = "-"))]
        pub internal: bool,
        token: String,
    }

    #[derive(Struct, Debug)]
    struct Deployment {
        pub server: Server,
        pub replicas: Box<Server>,
        pub labels: Vec<String>,
    }

    #[derive(Struct)]
    struct Cluster {
        pub region: String,
        primary: Server,
    }

    fn server(name: &str) -> Server {
        Server {
            name: name.to_string(),
            port: 8080,
            internal: true,
            token: "t0ken".to_string(),
        }
    }

    fn deployment() -> Deployment {
        Deployment {
            server: server("api"),
            replicas: Box::new(server("replica")),
            labels: vec!["prod".to_string()],
        }
    }

    #[test]
    fn fields_skip_marked_field_but_lookup_reaches_it() {
        let mut value = deployment();
        let mut record = Record::new(&mut value);
        let mut parent = record.field("server").unwrap();

        let names: Vec<_> = parent.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["name", "port", "token"]);

        let internal = parent.field("internal").unwrap();
        assert_eq!(internal.value_as::<bool>(), Some(&true));
    }

    #[test]
    fn set_through_nested_lookup_writes_the_root() {
        let mut value = deployment();
        {
            let mut record = Record::new(&mut value);
            let mut server = record.field("server").unwrap();
            let mut port = server.field("port").unwrap();
            port.set(9090_u16).unwrap();
        }
        assert_eq!(value.server.port, 9090);
    }

    #[test]
    fn pointer_fields_are_traversed() {
        let mut value = deployment();
        {
            let mut record = Record::new(&mut value);
            let mut replicas = record.field("replicas").unwrap();
            assert_eq!(replicas.kind(), Kind::Pointer);
            let mut name = replicas.field("name").unwrap();
            name.set("mirror".to_string()).unwrap();
        }
        assert_eq!(value.replicas.name, "mirror");
    }

    #[test]
    fn unexported_field_rejects_writes() {
        let mut value = server("api");
        {
            let mut record = Record::new(&mut value);
            let mut token = record.field("token").unwrap();
            assert!(!token.is_exported());
            assert!(!token.is_settable());
            assert_eq!(
                token.set("stolen".to_string()),
                Err(FieldError::NotExported { field: "token" })
            );
            assert_eq!(token.zero(), Err(FieldError::NotExported { field: "token" }));
            assert!(token.try_value().unwrap_err().is_contract_violation());
            assert!(token.value_as::<String>().is_none());
        }
        assert_eq!(value.token, "t0ken");
    }

    #[test]
    fn children_of_unexported_record_are_read_only() {
        let mut value = Cluster {
            region: "eu-west".to_string(),
            primary: server("api"),
        };
        {
            let mut record = Record::new(&mut value);
            let mut primary = record.field("primary").unwrap();
            assert!(!primary.is_settable());

            let mut port = primary.field("port").unwrap();
            assert!(port.is_exported());
            assert!(!port.is_settable());
            assert_eq!(port.value_as::<u16>(), Some(&8080));
            assert_eq!(
                port.set(9999_u16),
                Err(FieldError::NotSettable { field: "port" })
            );

            for mut child in primary.fields() {
                assert!(!child.is_settable());
                assert!(child.zero().is_err());
            }
        }
        assert_eq!(value.primary.port, 8080);
        assert_eq!(value.primary.name, "api");
        assert_eq!(value.region, "eu-west");
    }

    #[test]
    #[should_panic(expected = "cannot be read")]
    fn reading_unexported_value_panics() {
        let value = server("api");
        let mut record = Record::detached(&value);
        let token = record.field("token").unwrap();
        let _ = token.value();
    }

    #[test]
    #[should_panic(expected = "is not a struct")]
    fn descending_into_scalar_panics() {
        let mut value = server("api");
        let mut record = Record::new(&mut value);
        let mut port = record.field("port").unwrap();
        let _ = port.fields();
    }

    #[test]
    fn checked_descent_reports_kind() {
        let mut value = deployment();
        let mut record = Record::new(&mut value);
        let mut labels = record.field("labels").unwrap();
        let err = labels.try_field("len").unwrap_err();
        assert_eq!(
            err,
            FieldError::PreconditionFailed {
                field: "labels",
                violation: Precondition::NotAStruct { kind: Kind::Slice },
            }
        );
    }

    #[test]
    fn detached_fields_are_not_settable() {
        let value = server("api");
        let mut record = Record::detached(&value);
        let mut port = record.field("port").unwrap();
        assert!(port.is_exported());
        assert!(!port.is_settable());
        assert_eq!(port.set(1_u16), Err(FieldError::NotSettable { field: "port" }));
        assert_eq!(port.zero(), Err(FieldError::NotSettable { field: "port" }));
        assert_eq!(value.port, 8080);
    }

    #[test]
    fn type_mismatch_names_both_types() {
        let mut value = server("api");
        {
            let mut record = Record::new(&mut value);
            let mut port = record.field("port").unwrap();
            let err = port.set(1_i64).unwrap_err();
            assert_eq!(
                err,
                FieldError::TypeMismatch {
                    field: "port",
                    offered: "i64",
                    required: "u16",
                }
            );
        }
        assert_eq!(value.port, 8080);
    }

    #[test]
    fn zero_resets_nested_record() {
        let mut value = deployment();
        {
            let mut record = Record::new(&mut value);
            let mut server = record.field("server").unwrap();
            assert!(!server.is_zero());
            server.zero().unwrap();
            assert!(server.is_zero());
        }
        assert_eq!(
            value.server,
            Server {
                name: String::new(),
                port: 0,
                internal: false,
                token: String::new(),
            }
        );
    }

    #[test]
    fn children_inherit_default_tag() {
        let mut value = deployment();
        let mut record = Record::new(&mut value).with_tag_name("db");
        let mut server = record.field("server").unwrap();
        assert_eq!(server.default_tag(), "db");
        assert_eq!(server.fields().len(), 4);
        assert_eq!(server.field("port").unwrap().default_tag(), "db");
    }

    #[test]
    fn debug_shows_metadata() {
        let value = server("api");
        let mut record = Record::detached(&value);
        let port = record.field("port").unwrap();
        let rendered = format!("{port:?}");
        assert!(rendered.contains("name: \"port\""));
        assert!(rendered.contains("kind: U16"));
        assert!(rendered.contains("settable: false"));
    }
}
