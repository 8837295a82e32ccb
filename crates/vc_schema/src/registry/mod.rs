//! Default schema lookup.
//!
//! A model type gets a *default schema* by registering it in a
//! [`SchemaRegistry`]. The process-wide registry behind the free functions
//! of this module is what [`TypeRef::Type`] handles and the runtime-type
//! dispatch of nested objects resolve against.
//!
//! Lookups are never cached: a [`TypeRef`] captured before its schema was
//! registered resolves as soon as the registration has happened, and always
//! to the most recent one.
//!
//! With the `auto_register` feature, schemas declared with
//! [`auto_register!`](crate::auto_register) are added when the default
//! registry is first used.

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "auto_register")]
mod auto_register;
mod schema_registry;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "auto_register")]
pub use auto_register::AutoSchema;
pub use schema_registry::{SchemaRegistry, SchemaRegistryArc};

// -----------------------------------------------------------------------------
// Default registry

use alloc::sync::Arc;
use core::any::{Any, TypeId};
use std::sync::LazyLock;

use crate::schema::{ModelSchema, TypeRef};

static DEFAULT_REGISTRY: LazyLock<SchemaRegistryArc> = LazyLock::new(|| {
    let mut registry = SchemaRegistry::new();
    registry.auto_register();
    SchemaRegistryArc::new(registry)
});

/// The process-wide registry.
#[inline]
pub fn default_registry() -> &'static SchemaRegistryArc {
    &DEFAULT_REGISTRY
}

/// Makes `schema` the default schema of its model type.
///
/// Returns the schema it replaces, if any.
pub fn set_default_schema(schema: Arc<ModelSchema>) -> Option<Arc<ModelSchema>> {
    default_registry().write().register(schema)
}

/// The default schema of a model type, given the [`TypeId`] of `T` or `Box<T>`.
pub fn get_default_schema(type_id: TypeId) -> Option<Arc<ModelSchema>> {
    default_registry().read().get(type_id).cloned()
}

/// The default schema of the runtime type of `value`.
///
/// ```
/// use vc_schema::registry::default_schema_of;
/// use vc_schema::schema::ModelSchema;
///
/// #[derive(Default)]
/// struct Car;
///
/// ModelSchema::builder::<Car>().register();
///
/// assert!(default_schema_of(&Car).is_some());
/// assert!(default_schema_of(&Box::new(Car)).is_some());
/// assert!(default_schema_of(&"car").is_none());
/// ```
pub fn default_schema_of(value: &dyn Any) -> Option<Arc<ModelSchema>> {
    default_registry().read().get_of(value).cloned()
}

/// Returns the effective schema of `type_ref`.
///
/// A schema is returned as is, a type is looked up in the default registry
/// at the moment of the call. `None` if that type has no default schema.
pub fn resolve_schema(type_ref: &TypeRef) -> Option<Arc<ModelSchema>> {
    match type_ref {
        TypeRef::Schema(schema) => Some(schema.clone()),
        TypeRef::Type { id, name } => {
            let resolved = get_default_schema(*id);
            if resolved.is_none() {
                log::trace!("no default schema registered for `{name}`");
            }
            resolved
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::any::TypeId;

    use super::{default_schema_of, get_default_schema, resolve_schema, set_default_schema};
    use crate::schema::{ModelSchema, TypeRef};

    #[derive(Default)]
    struct Late;

    #[derive(Default)]
    struct Replaced;

    #[test]
    fn type_ref_resolves_after_registration() {
        let handle = TypeRef::of::<Late>();
        assert!(resolve_schema(&handle).is_none());

        let schema = ModelSchema::builder::<Late>().register();
        let resolved = resolve_schema(&handle).unwrap();
        assert!(Arc::ptr_eq(&resolved, &schema));
        assert!(default_schema_of(&Late).is_some());
    }

    #[test]
    fn schema_ref_is_returned_unchanged() {
        let schema = ModelSchema::builder::<Replaced>().build();
        let resolved = resolve_schema(&TypeRef::from(&schema)).unwrap();
        assert!(Arc::ptr_eq(&resolved, &schema));
    }

    #[test]
    fn latest_default_is_used() {
        let first = ModelSchema::builder::<Replaced>().register();
        let second = ModelSchema::builder::<Replaced>().build();
        let previous = set_default_schema(second.clone()).unwrap();

        assert!(Arc::ptr_eq(&previous, &first));
        let current = get_default_schema(TypeId::of::<Replaced>()).unwrap();
        assert!(Arc::ptr_eq(&current, &second));
    }
}
