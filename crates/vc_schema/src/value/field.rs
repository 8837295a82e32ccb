use alloc::string::String;
use alloc::vec::Vec;
use core::any::type_name;

use crate::error::DataError;
use crate::value::{AnyObject, AnyRef, AnyValue, Maybe, downcast_value, erase};

// -----------------------------------------------------------------------------
// Field

/// A struct field type that a [`ModelSchema`](crate::schema::ModelSchema) can read and write.
///
/// A field is viewed as an [`AnyRef`] when serializing and rebuilt from an
/// [`AnyValue`] when deserializing. Only the *shape* is handled here, the
/// prop schema bound to the field does the actual conversion.
///
/// | field type         | `Null` | `Some(v)`                  |
/// |--------------------|--------|----------------------------|
/// | `Option<T>`        | `None` | `Some(v)`                  |
/// | `Maybe<T>`         | `Null` | `Some(v)`                  |
/// | scalars, `String`  | error  | `v`                        |
/// | `serde_json::Value`| `Null` | `v`                        |
///
/// `Undefined` results are never assigned, the field keeps the value the
/// factory gave it.
///
/// Implement it for your own opaque types with [`impl_field!`](crate::impl_field).
pub trait Field: Sized + 'static {
    fn to_any_ref(&self) -> AnyRef<'_>;

    fn from_any_value(value: AnyValue) -> Result<Self, DataError>;
}

#[inline(never)]
#[doc(hidden)]
pub fn mismatch<T>(found: &'static str) -> DataError {
    DataError::FieldType {
        expected: type_name::<T>(),
        found,
    }
}

/// Implements [`Field`] for opaque, non-nullable types.
///
/// ```
/// # use vc_schema::impl_field;
/// #[derive(Debug, Clone, Copy)]
/// struct Rgb(u8, u8, u8);
///
/// impl_field!(Rgb);
/// ```
#[macro_export]
macro_rules! impl_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::value::Field for $ty {
                #[inline]
                fn to_any_ref(&self) -> $crate::value::AnyRef<'_> {
                    $crate::value::Maybe::Some($crate::value::erase(self))
                }

                fn from_any_value(
                    value: $crate::value::AnyValue,
                ) -> ::core::result::Result<Self, $crate::error::DataError> {
                    match value {
                        $crate::value::Maybe::Some(value) => $crate::value::downcast_value::<Self>(value)
                            .map_err(|_| $crate::value::mismatch::<Self>("a value of another type")),
                        _ => ::core::result::Result::Err($crate::value::mismatch::<Self>("null")),
                    }
                }
            }
        )*
    };
}

crate::impl_field!(
    bool, char, String, AnyObject, f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64,
    u128, usize,
);

impl<T: 'static> Field for Vec<T> {
    #[inline]
    fn to_any_ref(&self) -> AnyRef<'_> {
        Maybe::Some(self)
    }

    fn from_any_value(value: AnyValue) -> Result<Self, DataError> {
        match value {
            Maybe::Some(value) => {
                downcast_value::<Self>(value).map_err(|_| mismatch::<Self>("a value of another type"))
            }
            _ => Err(mismatch::<Self>("null")),
        }
    }
}

impl Field for serde_json::Value {
    fn to_any_ref(&self) -> AnyRef<'_> {
        match self {
            serde_json::Value::Null => Maybe::Null,
            value => Maybe::Some(value),
        }
    }

    fn from_any_value(value: AnyValue) -> Result<Self, DataError> {
        match value {
            Maybe::Some(value) => {
                downcast_value::<Self>(value).map_err(|_| mismatch::<Self>("a value of another type"))
            }
            _ => Ok(serde_json::Value::Null),
        }
    }
}

impl<T: 'static> Field for Option<T> {
    fn to_any_ref(&self) -> AnyRef<'_> {
        match self {
            Some(value) => Maybe::Some(erase(value)),
            None => Maybe::Null,
        }
    }

    fn from_any_value(value: AnyValue) -> Result<Self, DataError> {
        match value {
            Maybe::Some(value) => downcast_value::<T>(value)
                .map(Some)
                .map_err(|_| mismatch::<T>("a value of another type")),
            _ => Ok(None),
        }
    }
}

impl<T: 'static> Field for Maybe<T> {
    fn to_any_ref(&self) -> AnyRef<'_> {
        match self {
            Maybe::Undefined => Maybe::Undefined,
            Maybe::Null => Maybe::Null,
            Maybe::Some(value) => Maybe::Some(erase(value)),
        }
    }

    fn from_any_value(value: AnyValue) -> Result<Self, DataError> {
        match value {
            Maybe::Undefined => Ok(Maybe::Undefined),
            Maybe::Null => Ok(Maybe::Null),
            Maybe::Some(value) => downcast_value::<T>(value)
                .map(Maybe::Some)
                .map_err(|_| mismatch::<T>("a value of another type")),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
