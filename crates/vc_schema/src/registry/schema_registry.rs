use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::schema::ModelSchema;
use crate::utils::hash::{FixedHashState, HashMap, HashSet, NoOpHashState, TypeIdMap};

// -----------------------------------------------------------------------------
// SchemaRegistry

/// Default [`ModelSchema`]s, keyed by model type.
///
/// Besides the [`TypeId`] of the model type, every schema is reachable
/// through the [`TypeId`] of `Box<T>`, its full type path, and its short
/// type name when that name is unique.
///
/// # Example
///
/// ```
/// use core::any::TypeId;
/// use vc_schema::registry::SchemaRegistry;
/// use vc_schema::schema::ModelSchema;
///
/// #[derive(Default)]
/// struct Todo;
///
/// let mut registry = SchemaRegistry::new();
/// registry.register(ModelSchema::builder::<Todo>().build());
///
/// assert!(registry.contains(TypeId::of::<Todo>()));
/// assert!(registry.get(TypeId::of::<Box<Todo>>()).is_some());
/// assert!(registry.get_with_type_name("Todo").is_some());
/// ```
pub struct SchemaRegistry {
    schemas: TypeIdMap<Arc<ModelSchema>>,
    boxed_to_id: TypeIdMap<TypeId>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
}

impl Default for SchemaRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            schemas: TypeIdMap::with_hasher(NoOpHashState),
            boxed_to_id: TypeIdMap::with_hasher(NoOpHashState),
            type_path_to_id: HashMap::with_hasher(FixedHashState),
            type_name_to_id: HashMap::with_hasher(FixedHashState),
            ambiguous_names: HashSet::with_hasher(FixedHashState),
        }
    }

    // # Validity
    // The type must **not** already exist.
    fn add_new_type_indices(&mut self, schema: &ModelSchema) {
        let id = schema.type_id();
        let type_name = schema.type_name();

        if !self.ambiguous_names.contains(type_name) {
            if self.type_name_to_id.contains_key(type_name) {
                self.type_name_to_id.remove(type_name);
                self.ambiguous_names.insert(type_name);
            } else {
                self.type_name_to_id.insert(type_name, id);
            }
        }

        self.type_path_to_id.insert(schema.type_path(), id);
        self.boxed_to_id.insert(schema.boxed_type_id(), id);
    }

    // Recomputes the short-name entry of `type_name` from the schemas left.
    fn rebuild_type_name_index(&mut self, type_name: &'static str) {
        self.type_name_to_id.remove(type_name);
        self.ambiguous_names.remove(type_name);

        let mut owners = self
            .schemas
            .values()
            .filter(|schema| schema.type_name() == type_name)
            .map(|schema| schema.type_id());
        match (owners.next(), owners.next()) {
            (Some(id), None) => {
                self.type_name_to_id.insert(type_name, id);
            }
            (Some(_), Some(_)) => {
                self.ambiguous_names.insert(type_name);
            }
            _ => {}
        }
    }

    /// Makes `schema` the default schema of its model type.
    ///
    /// The most recent registration wins, the replaced schema is returned.
    pub fn register(&mut self, schema: Arc<ModelSchema>) -> Option<Arc<ModelSchema>> {
        let id = schema.type_id();
        if !self.schemas.contains_key(&id) {
            self.add_new_type_indices(&schema);
        }

        let previous = self.schemas.insert(id, schema);
        if previous.is_some() {
            log::debug!("replaced the default schema of `{}`", self.type_path_of(id));
        } else {
            log::debug!("registered a default schema for `{}`", self.type_path_of(id));
        }
        previous
    }

    /// Registers `schema` unless its model type already has one.
    ///
    /// Returns `true` if the schema was inserted.
    pub fn try_register(&mut self, schema: Arc<ModelSchema>) -> bool {
        if self.schemas.contains_key(&schema.type_id()) {
            return false;
        }
        self.register(schema);
        true
    }

    /// Removes the default schema of a model type.
    pub fn remove(&mut self, type_id: TypeId) -> Option<Arc<ModelSchema>> {
        let schema = self.schemas.remove(&type_id)?;
        self.boxed_to_id.remove(&schema.boxed_type_id());
        self.type_path_to_id.remove(schema.type_path());
        self.rebuild_type_name_index(schema.type_name());
        log::debug!("removed the default schema of `{}`", schema.type_path());
        Some(schema)
    }

    /// Looks up by the [`TypeId`] of `T` or of `Box<T>`.
    pub fn get(&self, type_id: TypeId) -> Option<&Arc<ModelSchema>> {
        match self.schemas.get(&type_id) {
            Some(schema) => Some(schema),
            None => self.schemas.get(self.boxed_to_id.get(&type_id)?),
        }
    }

    /// Looks up by the runtime type of `value`.
    #[inline]
    pub fn get_of(&self, value: &dyn Any) -> Option<&Arc<ModelSchema>> {
        self.get(value.type_id())
    }

    /// Looks up by full type path, e.g. `my_app::model::Todo`.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&Arc<ModelSchema>> {
        self.schemas.get(self.type_path_to_id.get(type_path)?)
    }

    /// Looks up by short type name, e.g. `Todo`.
    ///
    /// Returns `None` if the name is [ambiguous](Self::is_ambiguous).
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&Arc<ModelSchema>> {
        self.schemas.get(self.type_name_to_id.get(type_name)?)
    }

    /// Returns `true` if several registered types share `type_name`.
    #[inline]
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.schemas.contains_key(&type_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Iterates over the registered schemas, in no particular order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Arc<ModelSchema>> {
        self.schemas.values()
    }

    /// Registers every schema declared with [`auto_register!`](crate::auto_register).
    ///
    /// Schemas already present are kept. Returns the number of schemas added.
    /// Without the `auto_register` feature this does nothing.
    pub fn auto_register(&mut self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            super::auto_register::register_all(self)
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }

    fn type_path_of(&self, id: TypeId) -> &'static str {
        self.schemas.get(&id).map_or("<unknown>", |s| s.type_path())
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_path_to_id.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// SchemaRegistryArc

/// A shareable, lockable [`SchemaRegistry`].
#[derive(Clone, Default)]
pub struct SchemaRegistryArc {
    /// The wrapped [`SchemaRegistry`].
    pub internal: Arc<RwLock<SchemaRegistry>>,
}

impl SchemaRegistryArc {
    #[inline]
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`SchemaRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, SchemaRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`SchemaRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, SchemaRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SchemaRegistryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use core::any::TypeId;

    use super::SchemaRegistry;
    use crate::schema::ModelSchema;

    #[derive(Default)]
    struct Point;

    mod other {
        #[derive(Default)]
        pub struct Point;
    }

    #[test]
    fn most_recent_registration_wins() {
        let mut registry = SchemaRegistry::new();
        let first = ModelSchema::builder::<Point>().build();
        let second = ModelSchema::builder::<Point>().build();

        assert!(registry.register(first.clone()).is_none());
        let replaced = registry.register(second.clone()).unwrap();
        assert!(alloc::sync::Arc::ptr_eq(&replaced, &first));

        let current = registry.get(TypeId::of::<Point>()).unwrap();
        assert!(alloc::sync::Arc::ptr_eq(current, &second));
        assert_eq!(registry.len(), 1);

        assert!(!registry.try_register(first));
        assert!(alloc::sync::Arc::ptr_eq(
            registry.get(TypeId::of::<Point>()).unwrap(),
            &second
        ));
    }

    #[test]
    fn lookups_by_box_and_runtime_type() {
        let mut registry = SchemaRegistry::new();
        registry.register(ModelSchema::builder::<Point>().build());

        assert!(registry.get(TypeId::of::<Box<Point>>()).is_some());
        assert!(registry.get_of(&Point).is_some());
        assert!(registry.get_of(&Box::new(Point)).is_some());
        assert!(registry.get_of(&1_u8).is_none());
    }

    #[test]
    fn ambiguous_short_names() {
        let mut registry = SchemaRegistry::new();
        registry.register(ModelSchema::builder::<Point>().build());
        assert!(registry.get_with_type_name("Point").is_some());

        registry.register(ModelSchema::builder::<other::Point>().build());
        assert!(registry.is_ambiguous("Point"));
        assert!(registry.get_with_type_name("Point").is_none());

        let path = core::any::type_name::<other::Point>();
        let schema = registry.get_with_type_path(path).unwrap();
        assert_eq!(schema.type_id(), TypeId::of::<other::Point>());
    }

    #[test]
    fn remove_drops_indices() {
        let mut registry = SchemaRegistry::new();
        registry.register(ModelSchema::builder::<Point>().build());
        assert!(registry.remove(TypeId::of::<Point>()).is_some());

        assert!(registry.is_empty());
        assert!(registry.get(TypeId::of::<Box<Point>>()).is_none());
        assert!(registry.get_with_type_name("Point").is_none());
    }

    #[test]
    fn remove_resolves_ambiguity() {
        let mut registry = SchemaRegistry::new();
        registry.register(ModelSchema::builder::<Point>().build());
        registry.register(ModelSchema::builder::<other::Point>().build());
        assert!(registry.is_ambiguous("Point"));

        registry.remove(TypeId::of::<other::Point>());
        assert!(!registry.is_ambiguous("Point"));
        let schema = registry.get_with_type_name("Point").unwrap();
        assert_eq!(schema.type_id(), TypeId::of::<Point>());

        registry.register(ModelSchema::builder::<other::Point>().build());
        assert!(registry.is_ambiguous("Point"));
        assert!(registry.get_with_type_name("Point").is_none());
    }
}
