use core::any::{Any, TypeId};
use core::fmt;

use alloc::boxed::Box;

// -----------------------------------------------------------------------------
// AnyObject

/// A boxed model instance whose concrete type is only known at runtime.
///
/// Use it as the field type when the field may hold any model, and the
/// serializer should pick the schema registered for the value's own type.
///
/// ```
/// use vc_schema::value::AnyObject;
///
/// let object = AnyObject::new(12_u32);
/// assert!(object.is::<u32>());
/// assert_eq!(object.downcast_ref::<u32>(), Some(&12));
/// ```
pub struct AnyObject(Box<dyn Any>);

impl AnyObject {
    #[inline]
    pub fn new<T: Any>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Wraps an already boxed value.
    ///
    /// Instances produced by a deserializer are unwrapped first.
    pub fn from_boxed(value: Box<dyn Any>) -> Self {
        match value.downcast::<Instance>() {
            Ok(instance) => Self(instance.value),
            Err(value) => Self(value),
        }
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// `TypeId` of the boxed value.
    #[inline]
    pub fn value_type_id(&self) -> TypeId {
        Any::type_id(&*self.0)
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut::<T>()
    }

    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        match self.0.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self(value)),
        }
    }

    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        &*self.0
    }

    #[inline]
    pub fn into_inner(self) -> Box<dyn Any> {
        self.0
    }
}

impl fmt::Debug for AnyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyObject").field(&self.value_type_id()).finish()
    }
}

// -----------------------------------------------------------------------------
// Instance

/// A model instance built by a [`ModelSchema`](crate::schema::ModelSchema).
///
/// This is the payload of a successful object deserialization. Besides the
/// value it remembers how to move the value into a `Box<T>`, so the same
/// payload can fill an `Option<T>`, an `Option<Box<T>>` or an
/// `Option<AnyObject>` field.
///
/// Prefer [`downcast_value`] over downcasting payloads by hand.
pub struct Instance {
    value: Box<dyn Any>,
    rebox: fn(Box<dyn Any>) -> Box<dyn Any>,
}

impl Instance {
    pub(crate) fn new<T: Any>(value: Box<dyn Any>) -> Self {
        Self {
            value,
            rebox: rebox::<T>,
        }
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    #[inline]
    pub fn into_inner(self) -> Box<dyn Any> {
        self.value
    }

    fn downcast_into<T: Any>(self) -> Result<T, Box<dyn Any>> {
        let value = match self.value.downcast::<T>() {
            Ok(value) => return Ok(*value),
            Err(value) => value,
        };
        if TypeId::of::<T>() == TypeId::of::<AnyObject>() {
            return wrap_any_object::<T>(value);
        }
        match (self.rebox)(value).downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(value),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Instance")
            .field(&Any::type_id(&*self.value))
            .finish()
    }
}

fn rebox<T: Any>(value: Box<dyn Any>) -> Box<dyn Any> {
    match value.downcast::<T>() {
        Ok(value) => Box::new(value),
        Err(value) => value,
    }
}

fn wrap_any_object<T: Any>(value: Box<dyn Any>) -> Result<T, Box<dyn Any>> {
    if TypeId::of::<T>() != TypeId::of::<AnyObject>() {
        return Err(value);
    }
    let wrapped: Box<dyn Any> = Box::new(AnyObject(value));
    match wrapped.downcast::<T>() {
        Ok(value) => Ok(*value),
        Err(value) => Err(value),
    }
}

// -----------------------------------------------------------------------------
// Erasure helpers

/// Takes a deserialized payload as a `T`.
///
/// Sees through [`Instance`] envelopes, boxes instances when `T` is a
/// `Box<_>` of the built type, and wraps anything into an [`AnyObject`]
/// when that is what `T` is. On mismatch the payload is handed back.
pub fn downcast_value<T: Any>(value: Box<dyn Any>) -> Result<T, Box<dyn Any>> {
    let value = match value.downcast::<Instance>() {
        Ok(instance) => return instance.downcast_into::<T>(),
        Err(value) => value,
    };
    match value.downcast::<T>() {
        Ok(value) => Ok(*value),
        Err(value) => wrap_any_object::<T>(value),
    }
}

/// Borrows a deserialized payload as a `T`, seeing through [`Instance`].
pub fn value_ref<T: Any>(value: &dyn Any) -> Option<&T> {
    match value.downcast_ref::<Instance>() {
        Some(instance) => instance.downcast_ref::<T>(),
        None => value.downcast_ref::<T>(),
    }
}

/// Views a field value as `&dyn Any`.
///
/// An [`AnyObject`] is viewed as the value it holds, so runtime-type lookups
/// see the concrete model type.
pub fn erase<T: Any>(value: &T) -> &dyn Any {
    let value: &dyn Any = value;
    match value.downcast_ref::<AnyObject>() {
        Some(object) => object.as_any(),
        None => value,
    }
}

// -----------------------------------------------------------------------------
// Tests
