//! Coarse classification of reflected values.

use strum::{Display, EnumIter, IntoStaticStr};

/// The kind of a reflected value, such as `string`, `map` or `struct`.
///
/// Callers use it to decide whether a field can be descended into with
/// [`Field::fields`](crate::Field::fields): only [`Kind::Struct`] and a
/// [`Kind::Pointer`] to a struct can.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Kind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    String,
    /// `Vec<T>`.
    Slice,
    /// `[T; N]`.
    Array,
    /// `HashMap` and `BTreeMap`.
    Map,
    /// `HashSet` and `BTreeSet`.
    Set,
    Option,
    /// `Box<T>`, the owning reference.
    Pointer,
    /// The unit tuple.
    Tuple,
    Struct,
    /// An opaque leaf registered with [`impl_reflect_value!`](crate::impl_reflect_value).
    Value,
}

impl Kind {
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::I128
                | Self::Isize
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::U128
                | Self::Usize
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns true for kinds that hold other reflected values.
    pub const fn is_container(self) -> bool {
        matches!(
            self,
            Self::Slice
                | Self::Array
                | Self::Map
                | Self::Set
                | Self::Option
                | Self::Pointer
                | Self::Struct
        )
    }
}
