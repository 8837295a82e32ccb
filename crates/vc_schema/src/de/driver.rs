use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::{Any, type_name};
use core::cell::RefCell;

use serde_json::{Map, Value};

use crate::assert::{assert_or_fail, require};
use crate::de::{Args, Context, Done};
use crate::error::{ConfigError, DataError, DeserializeError};
use crate::registry::resolve_schema;
use crate::schema::{ModelSchema, TypeRef};
use crate::utils::json_kind;
use crate::value::{AnyValue, Maybe, downcast_value, mismatch};

// -----------------------------------------------------------------------------
// Object driver

/// Completion state of one object under construction.
///
/// `pending` counts dispatched fields that have not completed, plus one
/// guard held while fields are still being dispatched. `done` is taken by
/// whoever completes the object, so it fires at most once.
struct PendingObject {
    pending: usize,
    done: Option<Done>,
}

/// Deserializes `json` into a fresh instance built from `schema`.
///
/// Creates a child of `ctx` for the new object, with `args` or, if `None`,
/// the parent's args. Every field's deserializer gets its own continuation.
/// `done` fires exactly once: with the instance when all fields have
/// completed, or with the first field failure. Fields not yet dispatched
/// at that point are skipped, later completions are ignored.
///
/// JSON that is not an object fails with [`DataError::NotAnObject`] rather
/// than completing with `null`, so a malformed child shows up with its path.
///
/// Returns `Err` only for configuration errors raised by a field, in which
/// case `done` is dropped without firing.
pub fn deserialize_object_with_schema(
    ctx: &Context,
    schema: &Arc<ModelSchema>,
    json: &Value,
    done: Done,
    args: Option<Args>,
) -> Result<(), ConfigError> {
    let Value::Object(object) = json else {
        done.fail(DataError::NotAnObject {
            type_name: schema.type_path(),
            found: json_kind(json),
        });
        return Ok(());
    };

    let child = ctx.child(schema.clone(), args);
    let target = schema.create(&child);
    fill(child, schema, target, object, done)
}

/// Like [`deserialize_object_with_schema`], but fills `target` instead of a
/// fresh instance. Fields absent from `json` keep their current values.
///
/// `target` must be a boxed instance of the schema's model type.
pub fn update_with_schema(
    ctx: &Context,
    schema: &Arc<ModelSchema>,
    target: Box<dyn Any>,
    json: &Value,
    done: Done,
    args: Option<Args>,
) -> Result<(), ConfigError> {
    assert_or_fail(Any::type_id(&*target) == schema.type_id(), || {
        format!("the schema of `{}` cannot update a value of another type", schema.type_path())
    })?;

    let Value::Object(object) = json else {
        done.fail(DataError::NotAnObject {
            type_name: schema.type_path(),
            found: json_kind(json),
        });
        return Ok(());
    };

    let child = ctx.child(schema.clone(), args);
    fill(child, schema, target, object, done)
}

fn fill(
    ctx: Context,
    schema: &Arc<ModelSchema>,
    target: Box<dyn Any>,
    object: &Map<String, Value>,
    done: Done,
) -> Result<(), ConfigError> {
    log::trace!("deserializing `{}` at depth {}", schema.type_path(), ctx.depth());
    ctx.set_target(target);

    let state = Rc::new(RefCell::new(PendingObject {
        pending: 1,
        done: Some(done),
    }));

    for (index, binding) in schema.props().iter().enumerate() {
        {
            let mut state = state.borrow_mut();
            if state.done.is_none() {
                log::trace!(
                    "`{}` failed, skipping field `{}` and the rest",
                    schema.type_path(),
                    binding.name(),
                );
                break;
            }
            state.pending += 1;
        }

        let field_done = field_done(&ctx, schema, index, &state);
        let json = object.get(binding.json_name());
        if let Err(error) = binding.prop().deserialize(json, field_done, &ctx) {
            state.borrow_mut().done = None;
            ctx.take_target();
            return Err(error);
        }
    }

    settle(&ctx, schema, &state);
    Ok(())
}

fn field_done(
    ctx: &Context,
    schema: &Arc<ModelSchema>,
    index: usize,
    state: &Rc<RefCell<PendingObject>>,
) -> Done {
    let ctx = ctx.clone();
    let schema = schema.clone();
    let state = state.clone();

    Done::new(move |result| {
        let binding = &schema.props()[index];
        let outcome = result.and_then(|value| assign(&ctx, &state, index, &schema, value));

        match outcome {
            Ok(()) => settle(&ctx, &schema, &state),
            Err(error) => {
                let done = state.borrow_mut().done.take();
                match done {
                    Some(done) => {
                        ctx.take_target();
                        log::debug!("`{}` failed: {error}", schema.type_path());
                        done.fail(error.in_field(binding.name()));
                    }
                    None => log::debug!(
                        "ignoring late failure of field `{}` in `{}`: {error}",
                        binding.name(),
                        schema.type_path(),
                    ),
                }
            }
        }
    })
}

fn assign(
    ctx: &Context,
    state: &RefCell<PendingObject>,
    index: usize,
    schema: &ModelSchema,
    value: AnyValue,
) -> Result<(), DataError> {
    if value.is_undefined() {
        return Ok(());
    }
    let binding = &schema.props()[index];
    match ctx.with_target_mut(|target| binding.assign(target, value)) {
        Some(result) => result,
        None if state.borrow().done.is_none() || !ctx.has_target() => {
            log::debug!(
                "ignoring late value of field `{}` in `{}`",
                binding.name(),
                schema.type_path(),
            );
            Ok(())
        }
        None => Err(DataError::custom(format!(
            "`{}` is borrowed while its field `{}` completes",
            schema.type_path(),
            binding.name(),
        ))),
    }
}

// Releases one pending count and completes the object when none are left.
fn settle(ctx: &Context, schema: &ModelSchema, state: &RefCell<PendingObject>) {
    let done = {
        let mut state = state.borrow_mut();
        state.pending -= 1;
        if state.pending > 0 {
            return;
        }
        state.done.take()
    };
    let Some(done) = done else {
        return;
    };

    match ctx.take_target() {
        Some(target) => {
            log::trace!("completed `{}`", schema.type_path());
            done.ok(Maybe::Some(Box::new(schema.instance(target))));
        }
        None => done.fail(DataError::custom(format!(
            "`{}` was released before all of its fields completed",
            schema.type_path(),
        ))),
    }
}

// -----------------------------------------------------------------------------
// Top-level entry points

fn resolve(type_ref: &TypeRef) -> Result<Arc<ModelSchema>, ConfigError> {
    require(resolve_schema(type_ref), || {
        format!("no default schema registered for `{}`", type_ref.type_path())
    })
}

pub(crate) fn into_typed<T: Any>(value: AnyValue) -> Result<T, DataError> {
    match value {
        Maybe::Some(value) => {
            downcast_value::<T>(value).map_err(|_| mismatch::<T>("a value of another type"))
        }
        Maybe::Null => Err(mismatch::<T>("null")),
        Maybe::Undefined => Err(mismatch::<T>("an undefined value")),
    }
}

fn run_sync<T: Any>(
    start: impl FnOnce(Done) -> Result<(), ConfigError>,
) -> Result<T, DeserializeError> {
    let slot = Rc::new(RefCell::new(None));
    let sink = slot.clone();
    start(Done::new(move |result| *sink.borrow_mut() = Some(result)))?;

    let result = slot.borrow_mut().take();
    match result {
        Some(result) => Ok(into_typed::<T>(result?)?),
        None => Err(DeserializeError::Incomplete {
            type_name: type_name::<T>(),
        }),
    }
}

/// Deserializes `json` with the schema referenced by `type_ref`, reporting
/// the built instance to `done`.
///
/// The root context carries `args`. `done` may fire after this returns.
pub fn deserialize_with_callback(
    type_ref: &TypeRef,
    json: &Value,
    args: Option<Args>,
    done: Done,
) -> Result<(), ConfigError> {
    let schema = resolve(type_ref)?;
    deserialize_object_with_schema(&Context::new(args), &schema, json, done, None)
}

/// Deserializes a `T` with `schema`, synchronously.
///
/// Fails with [`DeserializeError::Incomplete`] if some field completes
/// asynchronously, use [`deserialize_async`](crate::de::deserialize_async)
/// for those schemas.
pub fn deserialize_with_schema<T: Any>(
    schema: &Arc<ModelSchema>,
    json: &Value,
    args: Option<Args>,
) -> Result<T, DeserializeError> {
    run_sync(|done| deserialize_object_with_schema(&Context::new(args), schema, json, done, None))
}

/// Deserializes a `T` with its default schema, synchronously.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use vc_schema::de::deserialize;
/// use vc_schema::props::primitive;
/// use vc_schema::schema::ModelSchema;
///
/// #[derive(Default)]
/// struct Todo {
///     title: String,
/// }
///
/// ModelSchema::builder::<Todo>()
///     .field("title", primitive::<String>(), |t| &t.title, |t| &mut t.title)
///     .register();
///
/// let todo: Todo = deserialize(&json!({ "title": "write docs" })).unwrap();
/// assert_eq!(todo.title, "write docs");
/// ```
pub fn deserialize<T: Any>(json: &Value) -> Result<T, DeserializeError> {
    let schema = resolve(&TypeRef::of::<T>())?;
    deserialize_with_schema(&schema, json, None)
}

/// Updates `target` from `json` with its default schema, synchronously.
///
/// Only the keys present in `json` are written.
pub fn update<T: Any>(target: T, json: &Value) -> Result<T, DeserializeError> {
    let schema = resolve(&TypeRef::of::<T>())?;
    run_sync(|done| {
        update_with_schema(&Context::default(), &schema, Box::new(target), json, done, None)
    })
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
    use core::cell::{Cell, RefCell};

    use serde_json::json;

    use super::{deserialize_object_with_schema, deserialize_with_schema, update_with_schema};
    use crate::de::{Context, Done};
    use crate::error::{DataError, DeserializeError};
    use crate::props::primitive;
    use crate::schema::{ModelSchema, PropSchema};
    use crate::value::{Maybe, value_ref};

    #[derive(Default, Debug, PartialEq)]
    struct Todo {
        title: String,
        done: bool,
        rank: Option<u32>,
    }

    fn todo_schema(rank: PropSchema) -> alloc::sync::Arc<ModelSchema> {
        ModelSchema::builder::<Todo>()
            .field("title", primitive::<String>(), |t| &t.title, |t| &mut t.title)
            .field("done", primitive::<bool>(), |t| &t.done, |t| &mut t.done)
            .field("rank", rank, |t| &t.rank, |t| &mut t.rank)
            .build()
    }

    // Parks every completion until the test releases it.
    type Parked = RefCell<VecDeque<Box<dyn FnOnce()>>>;

    fn parked(value: Option<u32>) -> PropSchema {
        PropSchema::new(
            |_| Ok(None),
            move |_, done: Done, ctx: &Context| {
                let queue = ctx.args::<Parked>().expect("parked queue in args");
                queue.borrow_mut().push_back(Box::new(move || match value {
                    Some(value) => done.value(value),
                    None => done.fail(DataError::custom("rejected")),
                }));
                Ok(())
            },
        )
    }

    fn counting(fired: &Rc<Cell<usize>>, seen: &Rc<RefCell<Option<Result<Todo, String>>>>) -> Done {
        let (fired, seen) = (fired.clone(), seen.clone());
        Done::new(move |result| {
            fired.set(fired.get() + 1);
            let outcome = result
                .map(|value| {
                    let value = value.some().unwrap();
                    let todo = value_ref::<Todo>(&*value).unwrap();
                    Todo {
                        title: todo.title.clone(),
                        done: todo.done,
                        rank: todo.rank,
                    }
                })
                .map_err(|err| err.path());
            *seen.borrow_mut() = Some(outcome);
        })
    }

    #[test]
    fn synchronous_fields_complete_before_return() {
        let schema = todo_schema(primitive::<u32>());
        let todo: Todo = deserialize_with_schema(
            &schema,
            &json!({ "title": "a", "done": true, "rank": null }),
            None,
        )
        .unwrap();
        assert_eq!(
            todo,
            Todo {
                title: "a".into(),
                done: true,
                rank: None,
            }
        );
    }

    #[test]
    fn absent_keys_keep_factory_values() {
        let schema = todo_schema(primitive::<u32>());
        let todo: Todo = deserialize_with_schema(&schema, &json!({}), None).unwrap();
        assert_eq!(todo, Todo::default());
    }

    #[test]
    fn non_object_is_a_data_error() {
        let schema = todo_schema(primitive::<u32>());
        let err = deserialize_with_schema::<Todo>(&schema, &json!([1]), None).unwrap_err();
        assert!(matches!(
            err,
            DeserializeError::Data(DataError::NotAnObject { found: "an array", .. })
        ));
    }

    #[test]
    fn asynchronous_field_completes_exactly_once() {
        let schema = todo_schema(parked(Some(5)));
        let queue: Rc<Parked> = Rc::default();
        let ctx = Context::new(Some(queue.clone()));

        let fired = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(None));
        let json = json!({ "title": "b", "done": false });
        deserialize_object_with_schema(&ctx, &schema, &json, counting(&fired, &seen), None)
            .unwrap();
        assert_eq!(fired.get(), 0);

        let release = queue.borrow_mut().pop_front().unwrap();
        release();
        assert_eq!(fired.get(), 1);
        let todo = seen.borrow_mut().take().unwrap().unwrap();
        assert_eq!(todo.rank, Some(5));
        assert_eq!(todo.title, "b");
    }

    #[test]
    fn first_failure_wins() {
        let schema = ModelSchema::builder::<Todo>()
            .field("rank", parked(None), |t| &t.rank, |t| &mut t.rank)
            .field("other", parked(Some(1)), |t| &t.rank, |t| &mut t.rank)
            .field("title", primitive::<String>(), |t| &t.title, |t| &mut t.title)
            .build();
        let queue: Rc<Parked> = Rc::default();
        let ctx = Context::new(Some(queue.clone()));

        let fired = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(None));
        deserialize_object_with_schema(&ctx, &schema, &json!({}), counting(&fired, &seen), None)
            .unwrap();

        let parked: Vec<_> = queue.borrow_mut().drain(..).collect();
        assert_eq!(parked.len(), 2);
        for release in parked {
            release();
        }
        assert_eq!(fired.get(), 1);
        assert_eq!(seen.borrow_mut().take().unwrap().unwrap_err(), "rank");
    }

    #[test]
    fn synchronous_failure_skips_remaining_fields() {
        let schema = todo_schema(parked(Some(1)));
        let queue: Rc<Parked> = Rc::default();
        let ctx = Context::new(Some(queue.clone()));

        let fired = Rc::new(Cell::new(0));
        let seen = Rc::new(RefCell::new(None));
        let json = json!({ "title": 3 });
        deserialize_object_with_schema(&ctx, &schema, &json, counting(&fired, &seen), None)
            .unwrap();

        assert_eq!(fired.get(), 1);
        assert!(queue.borrow().is_empty());
        assert_eq!(seen.borrow_mut().take().unwrap().unwrap_err(), "title");
    }

    #[test]
    fn update_keeps_untouched_fields() {
        let schema = todo_schema(primitive::<u32>());
        let target = Todo {
            title: "keep".into(),
            done: false,
            rank: Some(1),
        };

        let slot = Rc::new(RefCell::new(None));
        let sink = slot.clone();
        update_with_schema(
            &Context::default(),
            &schema,
            Box::new(target),
            &json!({ "done": true }),
            Done::new(move |result| *sink.borrow_mut() = Some(result)),
            None,
        )
        .unwrap();

        let value = slot.borrow_mut().take().unwrap().unwrap();
        let Maybe::Some(value) = value else {
            panic!("expected a value");
        };
        let todo = value_ref::<Todo>(&*value).unwrap();
        assert_eq!(todo.title, "keep");
        assert!(todo.done);
        assert_eq!(todo.rank, Some(1));
    }

    #[test]
    fn update_rejects_foreign_target() {
        let schema = todo_schema(primitive::<u32>());
        let result = update_with_schema(
            &Context::default(),
            &schema,
            Box::new(0_u8),
            &json!({}),
            Done::new(|_| panic!("must not complete")),
            None,
        );
        assert!(result.is_err());
    }
}
