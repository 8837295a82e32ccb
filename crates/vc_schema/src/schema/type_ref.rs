use alloc::sync::Arc;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::schema::ModelSchema;

// -----------------------------------------------------------------------------
// TypeRef

/// A handle to the schema a nested field should use.
///
/// Either a schema given directly, or a type whose default schema is looked
/// up each time the field is processed. The latter allows two model types
/// to reference each other before either schema exists.
///
/// ```
/// use vc_schema::schema::TypeRef;
///
/// struct NotYetDeclared;
///
/// let handle = TypeRef::of::<NotYetDeclared>();
/// assert!(handle.resolve().is_none());
/// ```
#[derive(Clone)]
pub enum TypeRef {
    /// An already resolved schema.
    Schema(Arc<ModelSchema>),
    /// A type, resolved through the registry on use.
    Type { id: TypeId, name: &'static str },
}

impl TypeRef {
    #[inline]
    pub fn of<T: Any>() -> Self {
        Self::Type {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The [`TypeId`] of the referenced model type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        match self {
            Self::Schema(schema) => schema.type_id(),
            Self::Type { id, .. } => *id,
        }
    }

    /// The full path of the referenced model type.
    #[inline]
    pub fn type_path(&self) -> &'static str {
        match self {
            Self::Schema(schema) => schema.type_path(),
            Self::Type { name, .. } => *name,
        }
    }

    /// Returns the effective schema, see [`resolve_schema`](crate::registry::resolve_schema).
    #[inline]
    pub fn resolve(&self) -> Option<Arc<ModelSchema>> {
        crate::registry::resolve_schema(self)
    }
}

impl From<Arc<ModelSchema>> for TypeRef {
    #[inline]
    fn from(schema: Arc<ModelSchema>) -> Self {
        Self::Schema(schema)
    }
}

impl From<&Arc<ModelSchema>> for TypeRef {
    #[inline]
    fn from(schema: &Arc<ModelSchema>) -> Self {
        Self::Schema(schema.clone())
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(schema) => f.debug_tuple("Schema").field(&schema.type_path()).finish(),
            Self::Type { name, .. } => f.debug_tuple("Type").field(name).finish(),
        }
    }
}
