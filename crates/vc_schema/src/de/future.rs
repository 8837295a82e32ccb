use alloc::rc::Rc;
use core::any::{Any, type_name};
use core::cell::RefCell;
use core::future::Future;
use core::marker::PhantomData;
use core::pin::Pin;
use core::task::{Context as TaskContext, Poll, Waker};

use serde_json::Value;

use crate::de::driver::into_typed;
use crate::de::{Args, Done, deserialize_with_callback};
use crate::error::DeserializeError;
use crate::schema::TypeRef;
use crate::value::AnyValue;

struct Slot {
    result: Option<Result<AnyValue, DeserializeError>>,
    waker: Option<Waker>,
}

// -----------------------------------------------------------------------------
// Completion

/// A deserialization in progress, resolving to the built `T`.
///
/// Created by [`deserialize_async`]. It is woken by whatever completes the
/// last pending field. If that never happens the future stays pending.
#[must_use = "futures do nothing unless polled"]
pub struct Completion<T> {
    slot: Rc<RefCell<Slot>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Completion<T> {
    /// Returns `true` once the result is available.
    pub fn is_ready(&self) -> bool {
        self.slot.borrow().result.is_some()
    }
}

impl<T: Any> Future for Completion<T> {
    type Output = Result<T, DeserializeError>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        match slot.result.take() {
            Some(result) => Poll::Ready(
                result.and_then(|value| into_typed::<T>(value).map_err(DeserializeError::from)),
            ),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Deserializes a `T` with its default schema, completing whenever the
/// fields do.
///
/// The root context carries `args`, which is how asynchronous field
/// deserializers usually reach the service they wait on. Configuration
/// errors are reported by the future as well.
///
/// ```
/// use futures_lite::future::block_on;
/// use serde_json::json;
/// use vc_schema::de::deserialize_async;
/// use vc_schema::props::primitive;
/// use vc_schema::schema::ModelSchema;
///
/// #[derive(Default)]
/// struct Tag {
///     name: String,
/// }
///
/// ModelSchema::builder::<Tag>()
///     .field("name", primitive::<String>(), |t| &t.name, |t| &mut t.name)
///     .register();
///
/// let tag: Tag = block_on(deserialize_async(&json!({ "name": "urgent" }), None)).unwrap();
/// assert_eq!(tag.name, "urgent");
/// ```
pub fn deserialize_async<T: Any>(json: &Value, args: Option<Args>) -> Completion<T> {
    let slot = Rc::new(RefCell::new(Slot {
        result: None,
        waker: None,
    }));

    let sink = slot.clone();
    let done = Done::new(move |result| {
        let waker = {
            let mut slot = sink.borrow_mut();
            slot.result = Some(result.map_err(DeserializeError::from));
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    });

    if let Err(error) = deserialize_with_callback(&TypeRef::of::<T>(), json, args, done) {
        log::debug!("cannot deserialize `{}`: {error}", type_name::<T>());
        slot.borrow_mut().result = Some(Err(error.into()));
    }

    Completion {
        slot,
        _marker: PhantomData,
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::VecDeque;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use futures_lite::future::{block_on, poll_once};
    use serde_json::json;

    use super::deserialize_async;
    use crate::de::{Context, Done};
    use crate::error::DeserializeError;
    use crate::props::primitive;
    use crate::schema::{ModelSchema, PropSchema};

    type Parked = RefCell<VecDeque<Box<dyn FnOnce()>>>;

    #[derive(Default)]
    struct Account {
        owner: u64,
        label: String,
    }

    fn looked_up_owner() -> PropSchema {
        PropSchema::new(
            |_| Ok(None),
            |json, done: Done, ctx: &Context| {
                let id = json.and_then(serde_json::Value::as_u64).unwrap_or_default();
                let queue = ctx.args::<Parked>().expect("parked queue in args");
                queue
                    .borrow_mut()
                    .push_back(Box::new(move || done.value(id * 10)));
                Ok(())
            },
        )
    }

    #[test]
    fn resolves_after_parked_fields_complete() {
        ModelSchema::builder::<Account>()
            .field("owner", looked_up_owner(), |a| &a.owner, |a| &mut a.owner)
            .field("label", primitive::<String>(), |a| &a.label, |a| &mut a.label)
            .register();

        let queue: Rc<Parked> = Rc::default();
        let json = json!({ "owner": 4, "label": "main" });
        let mut completion = deserialize_async::<Account>(&json, Some(queue.clone()));

        assert!(block_on(poll_once(&mut completion)).is_none());
        assert!(!completion.is_ready());

        let parked: Vec<_> = queue.borrow_mut().drain(..).collect();
        for release in parked {
            release();
        }
        assert!(completion.is_ready());

        let account = block_on(completion).unwrap();
        assert_eq!(account.owner, 40);
        assert_eq!(account.label, "main");
    }

    #[test]
    fn missing_schema_is_reported_by_the_future() {
        let result = block_on(deserialize_async::<core::time::Duration>(&json!({}), None));
        assert!(matches!(result, Err(DeserializeError::Config(_))));
    }
}
