use core::any::Any;
use core::cell::RefCell;
use core::fmt;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;

use crate::schema::ModelSchema;

/// Caller-supplied arguments, shared by a whole deserialization.
pub type Args = Rc<dyn Any>;

// -----------------------------------------------------------------------------
// Context

/// Ambient state threaded through one deserialization.
///
/// Every object being built gets a child context whose parent is the context
/// it was reached from, so a deserializer can look at the enclosing objects
/// or at the arguments given to the top-level call. Prop schemas never
/// modify a context, they only forward it.
///
/// Cloning is cheap, all clones share the same state.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

struct ContextInner {
    parent: Option<Context>,
    schema: Option<Arc<ModelSchema>>,
    args: Option<Args>,
    target: RefCell<Option<Box<dyn Any>>>,
    depth: usize,
}

impl Context {
    /// Creates a root context.
    pub fn new(args: Option<Args>) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                parent: None,
                schema: None,
                args,
                target: RefCell::new(None),
                depth: 0,
            }),
        }
    }

    /// Creates a root context carrying `args`.
    ///
    /// ```
    /// use vc_schema::de::Context;
    ///
    /// let ctx = Context::with_args(String::from("tenant-a"));
    /// assert_eq!(ctx.args::<String>().map(String::as_str), Some("tenant-a"));
    /// assert!(ctx.args::<u32>().is_none());
    /// ```
    #[inline]
    pub fn with_args<A: Any>(args: A) -> Self {
        Self::new(Some(Rc::new(args)))
    }

    /// Creates the context of an object being built from `schema`.
    ///
    /// Without explicit `args` the parent's are inherited.
    pub(crate) fn child(&self, schema: Arc<ModelSchema>, args: Option<Args>) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                parent: Some(self.clone()),
                schema: Some(schema),
                args: args.or_else(|| self.inner.args.clone()),
                target: RefCell::new(None),
                depth: self.inner.depth + 1,
            }),
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<&Context> {
        self.inner.parent.as_ref()
    }

    /// Returns the context the top-level call started from.
    pub fn root(&self) -> &Context {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// Number of objects between this context and the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    /// The schema of the object this context builds, `None` for a root.
    #[inline]
    pub fn schema(&self) -> Option<&Arc<ModelSchema>> {
        self.inner.schema.as_ref()
    }

    #[inline]
    pub fn args<A: Any>(&self) -> Option<&A> {
        self.inner.args.as_deref()?.downcast_ref::<A>()
    }

    #[inline]
    pub fn raw_args(&self) -> Option<&Args> {
        self.inner.args.as_ref()
    }

    /// Runs `f` on the object under construction.
    ///
    /// Returns `None` when there is no such object, it is not a `T`, or it
    /// is being written to right now.
    pub fn with_target<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let target = self.inner.target.try_borrow().ok()?;
        let target = target.as_deref()?.downcast_ref::<T>()?;
        Some(f(target))
    }

    /// Returns `true` if `self` and `other` are the same context.
    #[inline]
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn set_target(&self, target: Box<dyn Any>) {
        *self.inner.target.borrow_mut() = Some(target);
    }

    pub(crate) fn take_target(&self) -> Option<Box<dyn Any>> {
        self.inner.target.try_borrow_mut().ok()?.take()
    }

    pub(crate) fn has_target(&self) -> bool {
        self.inner.target.try_borrow().map_or(true, |target| target.is_some())
    }

    /// Returns `None` when there is no target or it is borrowed right now.
    pub(crate) fn with_target_mut<R>(&self, f: impl FnOnce(&mut dyn Any) -> R) -> Option<R> {
        let mut target = self.inner.target.try_borrow_mut().ok()?;
        let target = target.as_deref_mut()?;
        Some(f(target))
    }
}

impl Default for Context {
    #[inline]
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.inner.depth)
            .field("schema", &self.inner.schema.as_ref().map(|s| s.type_name()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;

    use super::Context;
    use crate::schema::ModelSchema;

    #[derive(Default)]
    struct Parent {
        id: u32,
    }

    #[test]
    fn children_inherit_args() {
        let root = Context::with_args(7_u32);
        let schema = ModelSchema::builder::<Parent>().build();

        let child = root.child(schema.clone(), None);
        assert_eq!(child.args::<u32>(), Some(&7));
        assert_eq!(child.depth(), 1);
        assert!(child.root().ptr_eq(&root));

        let grandchild = child.child(schema, Some(Rc::new("override")));
        assert_eq!(grandchild.args::<&str>(), Some(&"override"));
        assert_eq!(grandchild.depth(), 2);
        assert!(grandchild.parent().unwrap().ptr_eq(&child));
    }

    #[test]
    fn scoped_target_access() {
        let schema = ModelSchema::builder::<Parent>().build();
        let ctx = Context::default().child(schema, None);
        assert_eq!(ctx.with_target(|p: &Parent| p.id), None);

        ctx.set_target(Box::new(Parent { id: 4 }));
        assert_eq!(ctx.with_target(|p: &Parent| p.id), Some(4));
        assert_eq!(ctx.with_target(|v: &u8| *v), None);

        assert!(ctx.take_target().is_some());
        assert_eq!(ctx.with_target(|p: &Parent| p.id), None);
    }
}
