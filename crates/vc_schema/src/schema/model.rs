use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::marker::PhantomData;

use crate::de::Context;
use crate::error::DataError;
use crate::schema::PropSchema;
use crate::utils::short_type_name;
use crate::value::{AnyRef, AnyValue, Field, Instance, mismatch};

type FactoryFn = dyn Fn(&Context) -> Box<dyn Any> + Send + Sync;
type GetFn = dyn for<'a> Fn(&'a dyn Any) -> Option<AnyRef<'a>> + Send + Sync;
type SetFn = dyn Fn(&mut dyn Any, AnyValue) -> Result<(), DataError> + Send + Sync;

// Pins the higher-ranked signature, closures alone infer a single lifetime.
#[inline(always)]
fn getter<G>(get: G) -> G
where
    G: for<'a> Fn(&'a dyn Any) -> Option<AnyRef<'a>> + Send + Sync + 'static,
{
    get
}

// -----------------------------------------------------------------------------
// FieldBinding

/// One entry of a [`ModelSchema`]: a field name, its [`PropSchema`], and
/// type-erased access to the field inside a model instance.
#[derive(Clone)]
pub struct FieldBinding {
    name: Cow<'static, str>,
    prop: PropSchema,
    get: Arc<GetFn>,
    set: Arc<SetFn>,
}

impl FieldBinding {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JSON key, the prop's rename or the field name.
    #[inline]
    pub fn json_name(&self) -> &str {
        self.prop.json_name().unwrap_or(&self.name)
    }

    #[inline]
    pub fn prop(&self) -> &PropSchema {
        &self.prop
    }

    /// Views the field of `target`.
    ///
    /// Returns `None` if `target` is not the model type this binding was
    /// declared on.
    #[inline]
    pub fn read<'a>(&self, target: &'a dyn Any) -> Option<AnyRef<'a>> {
        (self.get)(target)
    }

    /// Stores a deserialized value into the field of `target`.
    #[inline]
    pub fn assign(&self, target: &mut dyn Any, value: AnyValue) -> Result<(), DataError> {
        (self.set)(target, value)
    }
}

impl fmt::Debug for FieldBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("prop", &self.prop)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ModelSchema

/// Maps the fields of a model type `T` to [`PropSchema`]s.
///
/// Also carries the factory creating fresh `T`s during deserialization.
/// A schema accepts instances given either as `T` or as `Box<T>`.
///
/// # Example
///
/// ```
/// use vc_schema::props::primitive;
/// use vc_schema::schema::ModelSchema;
///
/// #[derive(Default)]
/// struct Todo {
///     title: String,
///     done: bool,
/// }
///
/// let schema = ModelSchema::builder::<Todo>()
///     .field("title", primitive::<String>(), |t| &t.title, |t| &mut t.title)
///     .field("done", primitive::<bool>(), |t| &t.done, |t| &mut t.done)
///     .build();
///
/// assert_eq!(schema.type_name(), "Todo");
/// assert_eq!(schema.props().len(), 2);
/// ```
pub struct ModelSchema {
    ty: TypeId,
    boxed_ty: TypeId,
    type_path: &'static str,
    type_name: &'static str,
    factory: Arc<FactoryFn>,
    view: for<'a> fn(&'a dyn Any) -> Option<&'a dyn Any>,
    wrap: fn(Box<dyn Any>) -> Instance,
    props: Vec<FieldBinding>,
}

impl ModelSchema {
    /// Starts a schema for `T`, created with `T::default()`.
    #[inline]
    pub fn builder<T: Any + Default>() -> ModelSchemaBuilder<T> {
        ModelSchemaBuilder::new(Arc::new(|_: &Context| -> Box<dyn Any> {
            Box::new(T::default())
        }))
    }

    /// Starts a schema for `T`, created by `factory`.
    ///
    /// The factory receives the context of the object being built.
    #[inline]
    pub fn builder_with_factory<T: Any>(
        factory: impl Fn(&Context) -> T + Send + Sync + 'static,
    ) -> ModelSchemaBuilder<T> {
        ModelSchemaBuilder::new(Arc::new(move |ctx: &Context| -> Box<dyn Any> {
            Box::new(factory(ctx))
        }))
    }

    /// The [`TypeId`] of the model type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    /// The [`TypeId`] of `Box<T>`.
    #[inline]
    pub fn boxed_type_id(&self) -> TypeId {
        self.boxed_ty
    }

    /// The full type path, e.g. `my_app::model::Todo`.
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// The type name without module path, e.g. `Todo`.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The field bindings, in declaration order.
    #[inline]
    pub fn props(&self) -> &[FieldBinding] {
        &self.props
    }

    /// Finds the binding of a field by its name.
    pub fn prop(&self, name: &str) -> Option<&FieldBinding> {
        self.props.iter().find(|binding| binding.name() == name)
    }

    /// Creates a fresh instance through the factory.
    #[inline]
    pub fn create(&self, ctx: &Context) -> Box<dyn Any> {
        (self.factory)(ctx)
    }

    /// Views `item` as the model type, seeing through a `Box<T>`.
    #[inline]
    pub fn view<'a>(&self, item: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.view)(item)
    }

    /// Returns `true` if this schema can serialize `item`.
    #[inline]
    pub fn accepts(&self, item: &dyn Any) -> bool {
        self.view(item).is_some()
    }

    /// Wraps a value built by this schema into the payload handed to `done`.
    #[inline]
    pub(crate) fn instance(&self, value: Box<dyn Any>) -> Instance {
        (self.wrap)(value)
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("type_path", &self.type_path)
            .field(
                "props",
                &self.props.iter().map(FieldBinding::name).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

fn view<T: Any>(item: &dyn Any) -> Option<&dyn Any> {
    if let Some(value) = item.downcast_ref::<T>() {
        return Some(value);
    }
    match item.downcast_ref::<Box<T>>() {
        Some(value) => Some(&**value),
        None => None,
    }
}

// -----------------------------------------------------------------------------
// ModelSchemaBuilder

/// Builds a [`ModelSchema`] for `T`.
///
/// Declaring a field with a name that already exists, e.g. one inherited
/// through [`extends`](Self::extends), replaces the earlier declaration in
/// place.
pub struct ModelSchemaBuilder<T> {
    factory: Arc<FactoryFn>,
    props: Vec<FieldBinding>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any> ModelSchemaBuilder<T> {
    fn new(factory: Arc<FactoryFn>) -> Self {
        Self {
            factory,
            props: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Replaces the factory.
    pub fn factory(mut self, factory: impl Fn(&Context) -> T + Send + Sync + 'static) -> Self {
        self.factory = Arc::new(move |ctx: &Context| -> Box<dyn Any> { Box::new(factory(ctx)) });
        self
    }

    /// Binds field `name` of `T` to `prop`.
    ///
    /// `get` and `get_mut` locate the field inside a `T`.
    pub fn field<F: Field>(
        self,
        name: impl Into<Cow<'static, str>>,
        prop: PropSchema,
        get: impl Fn(&T) -> &F + Send + Sync + 'static,
        get_mut: impl Fn(&mut T) -> &mut F + Send + Sync + 'static,
    ) -> Self {
        let read: Arc<GetFn> = Arc::new(getter(move |target: &dyn Any| {
            target
                .downcast_ref::<T>()
                .map(|target| get(target).to_any_ref())
        }));
        let write: Arc<SetFn> = Arc::new(move |target: &mut dyn Any, value: AnyValue| {
            let Some(target) = target.downcast_mut::<T>() else {
                return Err(mismatch::<T>("an instance of another type"));
            };
            *get_mut(target) = F::from_any_value(value)?;
            Ok(())
        });
        self.push(FieldBinding {
            name: name.into(),
            prop,
            get: read,
            set: write,
        })
    }

    /// Inherits every field of `parent`, a schema for the base struct `P`
    /// embedded in `T`.
    ///
    /// `get` and `get_mut` project a `T` onto its `P`. Fields declared
    /// afterwards with the same name override the inherited ones.
    pub fn extends<P: Any>(
        mut self,
        parent: &ModelSchema,
        get: impl Fn(&T) -> &P + Send + Sync + 'static,
        get_mut: impl Fn(&mut T) -> &mut P + Send + Sync + 'static,
    ) -> Self {
        if parent.type_id() != TypeId::of::<P>() {
            log::warn!(
                "`{}` extends the schema of `{}` through a projection onto `{}`",
                type_name::<T>(),
                parent.type_path(),
                type_name::<P>(),
            );
        }

        let get = Arc::new(get);
        let get_mut = Arc::new(get_mut);
        for binding in parent.props() {
            let (project, inner) = (get.clone(), binding.get.clone());
            let read: Arc<GetFn> = Arc::new(getter(move |target: &dyn Any| {
                let base: &dyn Any = project(target.downcast_ref::<T>()?);
                inner(base)
            }));
            let (project, inner) = (get_mut.clone(), binding.set.clone());
            let write: Arc<SetFn> = Arc::new(move |target: &mut dyn Any, value: AnyValue| {
                let Some(target) = target.downcast_mut::<T>() else {
                    return Err(mismatch::<T>("an instance of another type"));
                };
                let base: &mut dyn Any = project(target);
                inner(base, value)
            });
            self = self.push(FieldBinding {
                name: binding.name.clone(),
                prop: binding.prop.clone(),
                get: read,
                set: write,
            });
        }
        self
    }

    fn push(mut self, binding: FieldBinding) -> Self {
        match self.props.iter_mut().find(|b| b.name == binding.name) {
            Some(slot) => *slot = binding,
            None => self.props.push(binding),
        }
        self
    }

    pub fn build(self) -> Arc<ModelSchema> {
        let type_path = type_name::<T>();
        Arc::new(ModelSchema {
            ty: TypeId::of::<T>(),
            boxed_ty: TypeId::of::<Box<T>>(),
            type_path,
            type_name: short_type_name(type_path),
            factory: self.factory,
            view: view::<T>,
            wrap: Instance::new::<T>,
            props: self.props,
        })
    }

    /// Builds the schema and makes it the default schema of `T`.
    ///
    /// See [`set_default_schema`](crate::registry::set_default_schema).
    pub fn register(self) -> Arc<ModelSchema> {
        let schema = self.build();
        crate::registry::set_default_schema(schema.clone());
        schema
    }
}

// -----------------------------------------------------------------------------
// Tests
