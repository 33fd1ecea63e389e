//! Dynamic access to values whose concrete type is only known at runtime.
//!
//! [`Reflect`] is the object-safe view every field value is seen through. It
//! supplies the three capabilities the field descriptors need from a value:
//!
//! - deep structural equality ([`Reflect::reflect_eq`]),
//! - the type's zero value ([`Reflect::zero`] / [`Reflect::zero_value`]),
//! - assignment from a type-erased value ([`Reflect::try_assign`]).
//!
//! Implementations for the standard scalar and container types live here.
//! Records get theirs from `#[derive(Struct)]`, and opaque leaf types can opt
//! in with [`impl_reflect_value!`](crate::impl_reflect_value).

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::describe::Struct;
use crate::kind::Kind;

/// A value that can be inspected and assigned without knowing its type.
///
/// # Assignability
///
/// [`try_assign`](Reflect::try_assign) accepts a value of the identical type.
/// `Option<T>` additionally accepts a bare `T` (stored as `Some`), and
/// `Box<T>` accepts a bare `T` (written into the existing allocation).
/// Everything else is rejected and handed back untouched.
///
/// # Deriving
///
/// `#[derive(Struct)]` from `structs-derive` implements this trait together
/// with [`Struct`] for named-field structs whose fields all implement
/// `Reflect`.
pub trait Reflect: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// The full Rust type name, as reported by [`std::any::type_name`].
    fn reflect_type_name(&self) -> &'static str;

    fn kind(&self) -> Kind;

    /// Deep structural equality.
    ///
    /// Values of different types are never equal. Containers and records
    /// compare their contents recursively, so two records are equal exactly
    /// when every field is.
    fn reflect_eq(&self, other: &dyn Reflect) -> bool;

    /// The type's canonical uninitialized value.
    fn zero() -> Self
    where
        Self: Sized;

    /// Type-erased [`zero`](Reflect::zero) for the value's own type.
    fn zero_value(&self) -> Box<dyn Reflect>;

    fn is_zero(&self) -> bool {
        self.reflect_eq(&*self.zero_value())
    }

    /// Replaces `self` with `value` if its type is assignable.
    ///
    /// On rejection `value` is returned and `self` is left exactly as it was.
    fn try_assign(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// The record view, for structs and pointers to structs.
    fn as_struct(&self) -> Option<&dyn Struct> {
        None
    }

    fn as_struct_mut(&mut self) -> Option<&mut dyn Struct> {
        None
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<'a> fmt::Debug for dyn Reflect + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reflect_debug(f)
    }
}

impl<'a> PartialEq for dyn Reflect + 'a {
    fn eq(&self, other: &Self) -> bool {
        self.reflect_eq(other)
    }
}

/// Moves a `T` out of a type-erased value, or hands the value back.
pub fn take_exact<T: Reflect>(mut value: Box<dyn Reflect>) -> Result<T, Box<dyn Reflect>> {
    match value.as_any_mut().downcast_mut::<T>() {
        Some(inner) => Ok(std::mem::replace(inner, T::zero())),
        None => Err(value),
    }
}

/// Identity assignment: the [`Reflect::try_assign`] of every type without a
/// widening rule.
pub fn assign_exact<T: Reflect>(
    slot: &mut T,
    value: Box<dyn Reflect>,
) -> Result<(), Box<dyn Reflect>> {
    *slot = take_exact::<T>(value)?;
    Ok(())
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_any_methods {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
            self
        }

        fn reflect_type_name(&self) -> &'static str {
            ::std::any::type_name::<Self>()
        }
    };
}

/// Implements [`Reflect`] for leaf types compared with `PartialEq`.
///
/// The type must be `Default + PartialEq + Debug + 'static`. `Default` is
/// taken as its zero value and it reports [`Kind::Value`].
///
/// ```ignore
/// #[derive(Debug, Default, PartialEq)]
/// struct Color(u8, u8, u8);
///
/// structs_core::impl_reflect_value!(Color);
/// ```
#[macro_export]
macro_rules! impl_reflect_value {
    (@kind $kind:ident, $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Reflect for $ty {
                $crate::__reflect_any_methods!();

                fn kind(&self) -> $crate::Kind {
                    $crate::Kind::$kind
                }

                fn reflect_eq(&self, other: &dyn $crate::Reflect) -> bool {
                    $crate::Reflect::as_any(other)
                        .downcast_ref::<Self>()
                        .is_some_and(|other| self == other)
                }

                fn zero() -> Self {
                    <Self as ::core::default::Default>::default()
                }

                fn zero_value(&self) -> ::std::boxed::Box<dyn $crate::Reflect> {
                    ::std::boxed::Box::new(<Self as $crate::Reflect>::zero())
                }

                fn try_assign(
                    &mut self,
                    value: ::std::boxed::Box<dyn $crate::Reflect>,
                ) -> ::core::result::Result<(), ::std::boxed::Box<dyn $crate::Reflect>> {
                    $crate::reflect::assign_exact(self, value)
                }

                fn reflect_debug(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    ::core::fmt::Debug::fmt(self, f)
                }
            }
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $crate::impl_reflect_value!(@kind Value, $($ty),+);
    };
}

impl_reflect_value!(@kind Bool, bool);
impl_reflect_value!(@kind Char, char);
impl_reflect_value!(@kind I8, i8);
impl_reflect_value!(@kind I16, i16);
impl_reflect_value!(@kind I32, i32);
impl_reflect_value!(@kind I64, i64);
impl_reflect_value!(@kind I128, i128);
impl_reflect_value!(@kind Isize, isize);
impl_reflect_value!(@kind U8, u8);
impl_reflect_value!(@kind U16, u16);
impl_reflect_value!(@kind U32, u32);
impl_reflect_value!(@kind U64, u64);
impl_reflect_value!(@kind U128, u128);
impl_reflect_value!(@kind Usize, usize);
impl_reflect_value!(@kind F32, f32);
impl_reflect_value!(@kind F64, f64);
impl_reflect_value!(@kind String, String, &'static str);
impl_reflect_value!(@kind Tuple, ());

// ============================================================================
// Containers
// ============================================================================

impl<T: Reflect> Reflect for Vec<T> {
    crate::__reflect_any_methods!();

    fn kind(&self) -> Kind {
        Kind::Slice
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        other.as_any().downcast_ref::<Self>().is_some_and(|other| {
            self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.reflect_eq(b))
        })
    }

    fn zero() -> Self {
        Vec::new()
    }

    fn zero_value(&self) -> Box<dyn Reflect> {
        Box::new(Self::zero())
    }

    fn try_assign(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        assign_exact(self, value)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|item| item as &dyn Reflect))
            .finish()
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    crate::__reflect_any_methods!();

    fn kind(&self) -> Kind {
        Kind::Array
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| self.iter().zip(other).all(|(a, b)| a.reflect_eq(b)))
    }

    fn zero() -> Self {
        std::array::from_fn(|_| T::zero())
    }

    fn zero_value(&self) -> Box<dyn Reflect> {
        Box::new(Self::zero())
    }

    fn try_assign(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        assign_exact(self, value)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|item| item as &dyn Reflect))
            .finish()
    }
}

impl<T: Reflect> Reflect for Option<T> {
    crate::__reflect_any_methods!();

    fn kind(&self) -> Kind {
        Kind::Option
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        match (self, other.as_any().downcast_ref::<Self>()) {
            (None, Some(None)) => true,
            (Some(a), Some(Some(b))) => a.reflect_eq(b),
            _ => false,
        }
    }

    fn zero() -> Self {
        None
    }

    fn zero_value(&self) -> Box<dyn Reflect> {
        Box::new(Self::zero())
    }

    fn try_assign(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        let value = match take_exact::<Self>(value) {
            Ok(option) => {
                *self = option;
                return Ok(());
            }
            Err(value) => value,
        };
        *self = Some(take_exact::<T>(value)?);
        Ok(())
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(inner) => f.debug_tuple("Some").field(&(inner as &dyn Reflect)).finish(),
            None => f.write_str("None"),
        }
    }
}

impl<T: Reflect> Reflect for Box<T> {
    crate::__reflect_any_methods!();

    fn kind(&self) -> Kind {
        Kind::Pointer
    }

    fn reflect_eq(&self, other: &dyn Reflect) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| (**self).reflect_eq(&**other))
    }

    // A box cannot be null, so the zero pointer owns the pointee's zero.
    fn zero() -> Self {
        Box::new(T::zero())
    }

    fn zero_value(&self) -> Box<dyn Reflect> {
        Box::new(Self::zero())
    }

    fn try_assign(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        let value = match take_exact::<Self>(value) {
            Ok(boxed) => {
                *self = boxed;
                return Ok(());
            }
            Err(value) => value,
        };
        **self = take_exact::<T>(value)?;
        Ok(())
    }

    fn as_struct(&self) -> Option<&dyn Struct> {
        (**self).as_struct()
    }

    fn as_struct_mut(&mut self) -> Option<&mut dyn Struct> {
        (**self).as_struct_mut()
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).reflect_debug(f)
    }
}

macro_rules! impl_reflect_map {
    ($map:ident, $($key_bound:path),+) => {
        impl<K, V> Reflect for $map<K, V>
        where
            K: Reflect $(+ $key_bound)+,
            V: Reflect,
        {
            crate::__reflect_any_methods!();

            fn kind(&self) -> Kind {
                Kind::Map
            }

            fn reflect_eq(&self, other: &dyn Reflect) -> bool {
                other.as_any().downcast_ref::<Self>().is_some_and(|other| {
                    self.len() == other.len()
                        && self
                            .iter()
                            .all(|(key, value)| other.get(key).is_some_and(|o| value.reflect_eq(o)))
                })
            }

            fn zero() -> Self {
                $map::new()
            }

            fn zero_value(&self) -> Box<dyn Reflect> {
                Box::new(Self::zero())
            }

            fn try_assign(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
                assign_exact(self, value)
            }

            fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map()
                    .entries(
                        self.iter()
                            .map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect)),
                    )
                    .finish()
            }
        }
    };
}

impl_reflect_map!(HashMap, Eq, Hash);
impl_reflect_map!(BTreeMap, Ord);

macro_rules! impl_reflect_set {
    ($set:ident, $($bound:path),+) => {
        impl<T> Reflect for $set<T>
        where
            T: Reflect $(+ $bound)+,
        {
            crate::__reflect_any_methods!();

            fn kind(&self) -> Kind {
                Kind::Set
            }

            fn reflect_eq(&self, other: &dyn Reflect) -> bool {
                other.as_any().downcast_ref::<Self>().is_some_and(|other| self == other)
            }

            fn zero() -> Self {
                $set::new()
            }

            fn zero_value(&self) -> Box<dyn Reflect> {
                Box::new(Self::zero())
            }

            fn try_assign(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
                assign_exact(self, value)
            }

            fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_set()
                    .entries(self.iter().map(|item| item as &dyn Reflect))
                    .finish()
            }
        }
    };
}

impl_reflect_set!(HashSet, Eq, Hash);
impl_reflect_set!(BTreeSet, Ord);

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed<T: Reflect>(value: T) -> Box<dyn Reflect> {
        Box::new(value)
    }

    #[test]
    fn scalars_compare_by_value_and_type() {
        assert!(42_i32.reflect_eq(&42_i32));
        assert!(!42_i32.reflect_eq(&42_i64));
        assert!("a".to_string().reflect_eq(&"a".to_string()));
        assert!(!"a".to_string().reflect_eq(&"a"));
        assert!(!f64::NAN.reflect_eq(&f64::NAN));
    }

    #[test]
    fn zero_values_follow_default() {
        assert!(0_u8.is_zero());
        assert!(String::new().is_zero());
        assert!(!'x'.is_zero());
        assert!(Vec::<i32>::new().is_zero());
        assert!(!vec![0_i32].is_zero());
        assert!(Option::<String>::None.is_zero());
        assert!(!Some(String::new()).is_zero());
        assert!([0_u16; 4].is_zero());
        assert!(Box::new(0_i32).is_zero());
    }

    #[test]
    fn containers_compare_deeply() {
        let a = vec![Some(vec![1, 2]), None];
        let b = vec![Some(vec![1, 2]), None];
        let c = vec![Some(vec![1, 3]), None];
        assert!(a.reflect_eq(&b));
        assert!(!a.reflect_eq(&c));

        let left: HashMap<String, Vec<u8>> = HashMap::from([("k".to_string(), vec![1])]);
        let right: HashMap<String, Vec<u8>> = HashMap::from([("k".to_string(), vec![1])]);
        let other: HashMap<String, Vec<u8>> = HashMap::from([("k".to_string(), vec![2])]);
        assert!(left.reflect_eq(&right));
        assert!(!left.reflect_eq(&other));

        let set: BTreeSet<i32> = [1, 2].into();
        assert!(set.reflect_eq(&BTreeSet::from([2, 1])));
    }

    #[test]
    fn assign_exact_rejects_other_types_untouched() {
        let mut slot = 7_i32;
        let rejected = slot.try_assign(boxed(8_i64)).unwrap_err();
        assert_eq!(slot, 7);
        assert!(rejected.reflect_eq(&8_i64));

        slot.try_assign(boxed(9_i32)).unwrap();
        assert_eq!(slot, 9);
    }

    #[test]
    fn option_accepts_bare_inner_value() {
        let mut slot: Option<String> = None;
        slot.try_assign(boxed("hi".to_string())).unwrap();
        assert_eq!(slot.as_deref(), Some("hi"));

        slot.try_assign(boxed(Option::<String>::None)).unwrap();
        assert_eq!(slot, None);

        assert!(slot.try_assign(boxed(3_u8)).is_err());
        assert_eq!(slot, None);
    }

    #[test]
    fn box_accepts_pointee_in_place() {
        let mut slot = Box::new(1_u32);
        slot.try_assign(boxed(5_u32)).unwrap();
        assert_eq!(*slot, 5);

        slot.try_assign(boxed(Box::new(6_u32))).unwrap();
        assert_eq!(*slot, 6);
    }

    #[test]
    fn type_names_and_debug_come_from_the_concrete_type() {
        let value: Box<dyn Reflect> = boxed(vec![Some(1_u8), None]);
        assert_eq!(value.reflect_type_name(), std::any::type_name::<Vec<Option<u8>>>());
        assert_eq!(format!("{value:?}"), "[Some(1), None]");
        assert_eq!(value.kind(), Kind::Slice);
    }

    #[test]
    fn dyn_values_support_partial_eq() {
        let a: &dyn Reflect = &"x".to_string();
        let b: &dyn Reflect = &"x".to_string();
        assert_eq!(a, b);
    }
}
