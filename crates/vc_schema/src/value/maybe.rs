use core::any::Any;

use alloc::boxed::Box;

// -----------------------------------------------------------------------------
// Maybe

/// A value that can be absent, explicitly null, or present.
///
/// JSON distinguishes a missing key from a `null` one, and both survive a
/// round trip through a [`PropSchema`](crate::schema::PropSchema):
///
/// - [`Maybe::Undefined`] serializes to a missing key.
/// - [`Maybe::Null`] serializes to `null`.
///
/// It is also usable as a struct field type when that distinction matters
/// to the model itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Maybe<T> {
    Undefined,
    Null,
    Some(T),
}

/// The view of a field handed to a serializer.
pub type AnyRef<'a> = Maybe<&'a dyn Any>;

/// The result a deserializer reports through its [`Done`](crate::de::Done).
pub type AnyValue = Maybe<Box<dyn Any>>;

impl<T> Default for Maybe<T> {
    #[inline]
    fn default() -> Self {
        Self::Undefined
    }
}

impl<T> Maybe<T> {
    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub const fn is_some(&self) -> bool {
        matches!(self, Self::Some(_))
    }

    #[inline]
    pub const fn as_ref(&self) -> Maybe<&T> {
        match self {
            Self::Undefined => Maybe::Undefined,
            Self::Null => Maybe::Null,
            Self::Some(value) => Maybe::Some(value),
        }
    }

    #[inline]
    pub fn as_mut(&mut self) -> Maybe<&mut T> {
        match self {
            Self::Undefined => Maybe::Undefined,
            Self::Null => Maybe::Null,
            Self::Some(value) => Maybe::Some(value),
        }
    }

    /// Maps the present value, keeping `Undefined` and `Null` as they are.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Maybe<U> {
        match self {
            Self::Undefined => Maybe::Undefined,
            Self::Null => Maybe::Null,
            Self::Some(value) => Maybe::Some(f(value)),
        }
    }

    /// Collapses both `Undefined` and `Null` into `None`.
    #[inline]
    pub fn some(self) -> Option<T> {
        match self {
            Self::Some(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    /// `None` becomes [`Maybe::Null`].
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Some(value),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Maybe;

    #[test]
    fn option_conversion() {
        assert_eq!(Maybe::from(Some(3)), Maybe::Some(3));
        assert_eq!(Maybe::<i32>::from(None), Maybe::Null);
        assert_eq!(Maybe::<i32>::default(), Maybe::Undefined);
    }

    #[test]
    fn map_keeps_absence() {
        assert_eq!(Maybe::Some(2).map(|v| v * 2), Maybe::Some(4));
        assert_eq!(Maybe::<i32>::Null.map(|v| v * 2), Maybe::Null);
        assert_eq!(Maybe::<i32>::Undefined.map(|v| v * 2).some(), None);
    }
}
