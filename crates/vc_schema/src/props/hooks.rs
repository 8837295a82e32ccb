use alloc::sync::Arc;
use core::fmt;

use serde_json::Value;

use crate::de::{Context, Done, DoneResult};
use crate::error::{DataError, SerializeError};
use crate::schema::PropSchema;
use crate::value::AnyRef;

type BeforeSerialize = dyn for<'a> Fn(AnyRef<'a>) -> Result<(), SerializeError> + Send + Sync;
type AfterSerialize =
    dyn Fn(Option<Value>) -> Result<Option<Value>, SerializeError> + Send + Sync;
type BeforeDeserialize =
    dyn Fn(Option<&Value>, &Context) -> Result<Option<Value>, DataError> + Send + Sync;
type AfterDeserialize = dyn Fn(DoneResult, &Context) -> DoneResult + Send + Sync;

// -----------------------------------------------------------------------------
// PropHooks

/// Optional callbacks around the two halves of a [`PropSchema`].
///
/// - `before_serialize` sees the field value before it is serialized and
///   may reject it.
/// - `after_serialize` may rewrite or reject the produced JSON.
/// - `before_deserialize` runs before the wrapped deserializer and returns
///   the JSON it should see. An error completes the field without calling
///   the wrapped deserializer.
/// - `after_deserialize` runs on the outcome when the wrapped deserializer
///   completes, whenever that is.
#[derive(Clone, Default)]
pub struct PropHooks {
    before_serialize: Option<Arc<BeforeSerialize>>,
    after_serialize: Option<Arc<AfterSerialize>>,
    before_deserialize: Option<Arc<BeforeDeserialize>>,
    after_deserialize: Option<Arc<AfterDeserialize>>,
}

impl PropHooks {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_serialize(
        mut self,
        hook: impl Fn(AnyRef<'_>) -> Result<(), SerializeError> + Send + Sync + 'static,
    ) -> Self {
        self.before_serialize = Some(Arc::new(hook));
        self
    }

    pub fn after_serialize(
        mut self,
        hook: impl Fn(Option<Value>) -> Result<Option<Value>, SerializeError> + Send + Sync + 'static,
    ) -> Self {
        self.after_serialize = Some(Arc::new(hook));
        self
    }

    pub fn before_deserialize(
        mut self,
        hook: impl Fn(Option<&Value>, &Context) -> Result<Option<Value>, DataError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.before_deserialize = Some(Arc::new(hook));
        self
    }

    pub fn after_deserialize(
        mut self,
        hook: impl Fn(DoneResult, &Context) -> DoneResult + Send + Sync + 'static,
    ) -> Self {
        self.after_deserialize = Some(Arc::new(hook));
        self
    }

    /// Returns `true` if no hook is set.
    pub fn is_empty(&self) -> bool {
        self.before_serialize.is_none()
            && self.after_serialize.is_none()
            && self.before_deserialize.is_none()
            && self.after_deserialize.is_none()
    }
}

impl fmt::Debug for PropHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropHooks")
            .field("before_serialize", &self.before_serialize.is_some())
            .field("after_serialize", &self.after_serialize.is_some())
            .field("before_deserialize", &self.before_deserialize.is_some())
            .field("after_deserialize", &self.after_deserialize.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// with_hooks

/// Wraps `base` with `hooks`.
///
/// Without hooks, `base` is returned unchanged. Errors raised by a hook
/// propagate like errors of the wrapped prop. The JSON rename of `base` is
/// kept.
///
/// ```
/// use serde_json::{Value, json};
/// use vc_schema::props::{PropHooks, primitive, with_hooks};
/// use vc_schema::value::Maybe;
///
/// let upper = with_hooks(
///     primitive::<String>(),
///     Some(PropHooks::new().after_serialize(|json| {
///         Ok(json.map(|v| Value::from(v.as_str().unwrap_or_default().to_uppercase())))
///     })),
/// );
///
/// let title = String::from("draft");
/// assert_eq!(upper.serialize(Maybe::Some(&title)).unwrap(), Some(json!("DRAFT")));
/// ```
pub fn with_hooks(base: PropSchema, hooks: Option<PropHooks>) -> PropSchema {
    let Some(hooks) = hooks.filter(|hooks| !hooks.is_empty()) else {
        return base;
    };

    let PropHooks {
        before_serialize,
        after_serialize,
        before_deserialize,
        after_deserialize,
    } = hooks;
    let (ser_inner, de_inner) = (base.clone(), base.clone());

    PropSchema::new(
        move |value| {
            if let Some(before) = &before_serialize {
                before(value)?;
            }
            let json = ser_inner.serialize(value)?;
            match &after_serialize {
                Some(after) => after(json),
                None => Ok(json),
            }
        },
        move |json, done: Done, ctx: &Context| {
            let done = match &after_deserialize {
                Some(after) => {
                    let (after, hook_ctx) = (after.clone(), ctx.clone());
                    done.map(move |result| after(result, &hook_ctx))
                }
                None => done,
            };
            match &before_deserialize {
                Some(before) => match before(json, ctx) {
                    Ok(json) => de_inner.deserialize(json.as_ref(), done, ctx),
                    Err(error) => {
                        done.fail(error);
                        Ok(())
                    }
                },
                None => de_inner.deserialize(json, done, ctx),
            }
        },
    )
    .renamed_like(&base)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use core::cell::RefCell;

    use serde_json::{Value, json};

    use super::{PropHooks, with_hooks};
    use crate::de::{Context, Done, DoneResult};
    use crate::error::{DataError, SerializeError};
    use crate::props::primitive;
    use crate::value::{Maybe, value_ref};

    fn run(prop: &crate::schema::PropSchema, json: Option<&Value>) -> DoneResult {
        let slot = Rc::new(RefCell::new(None));
        let sink = slot.clone();
        prop.deserialize(
            json,
            Done::new(move |result| *sink.borrow_mut() = Some(result)),
            &Context::default(),
        )
        .unwrap();
        let result = slot.borrow_mut().take();
        result.unwrap()
    }

    #[test]
    fn no_hooks_returns_base() {
        let base = primitive::<u8>().with_json_name("n");
        let wrapped = with_hooks(base, Some(PropHooks::new()));
        assert_eq!(wrapped.json_name(), Some("n"));
        let wrapped = with_hooks(wrapped, None);
        assert_eq!(wrapped.json_name(), Some("n"));
    }

    #[test]
    fn serialize_hooks_wrap_delegate() {
        let prop = with_hooks(
            primitive::<u8>(),
            Some(
                PropHooks::new()
                    .before_serialize(|value| match value {
                        Maybe::Null => Err(SerializeError::custom("null not allowed")),
                        _ => Ok(()),
                    })
                    .after_serialize(|json| Ok(json.map(|v| json!([v])))),
            ),
        );

        assert_eq!(prop.serialize(Maybe::Some(&4_u8)).unwrap(), Some(json!([4])));
        assert!(prop.serialize(Maybe::Null).is_err());
    }

    #[test]
    fn before_deserialize_rewrites_input() {
        let prop = with_hooks(
            primitive::<u8>(),
            Some(PropHooks::new().before_deserialize(|json, _| {
                Ok(json.cloned().or_else(|| Some(json!(0))))
            })),
        );

        let value = run(&prop, None).unwrap().some().unwrap();
        assert_eq!(value_ref::<u8>(&*value), Some(&0));
    }

    #[test]
    fn after_deserialize_composes_with_done() {
        let prop = with_hooks(
            primitive::<String>(),
            Some(PropHooks::new().after_deserialize(|result, _| {
                let value = result?;
                let empty = match &value {
                    Maybe::Some(v) => value_ref::<String>(&**v).is_some_and(String::is_empty),
                    _ => false,
                };
                if empty { Err(DataError::custom("empty")) } else { Ok(value) }
            })),
        );

        assert!(run(&prop, Some(&json!(""))).is_err());
        assert!(run(&prop, Some(&json!("ok"))).is_ok());
        assert!(run(&prop, None).unwrap().is_undefined());
    }

    #[test]
    fn before_error_skips_delegate() {
        let prop = with_hooks(
            primitive::<u8>(),
            Some(PropHooks::new().before_deserialize(|_, _| Err(DataError::custom("stop")))),
        );
        let err = run(&prop, Some(&json!(1))).unwrap_err();
        assert!(matches!(err, DataError::Custom(msg) if msg == "stop"));
    }
}
