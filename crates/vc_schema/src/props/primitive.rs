use alloc::format;
use core::any::{Any, type_name};

use serde_core::de::DeserializeOwned;
use serde_core::ser::Serialize;
use serde_json::Value;

use crate::assert::require;
use crate::de::{Context, Done};
use crate::error::{DataError, SerializeError};
use crate::schema::PropSchema;
use crate::value::Maybe;

/// A prop for values with their own `serde` representation.
///
/// Absent and `null` map to [`Maybe::Undefined`] and [`Maybe::Null`], so
/// the same prop serves a `T`, an `Option<T>` and a `Maybe<T>` field. A
/// present value is converted with `serde_json`.
///
/// ```
/// use serde_json::json;
/// use vc_schema::props::primitive;
/// use vc_schema::value::Maybe;
///
/// let prop = primitive::<Vec<u8>>();
/// let bytes = vec![1_u8, 2];
///
/// assert_eq!(prop.serialize(Maybe::Some(&bytes)).unwrap(), Some(json!([1, 2])));
/// assert_eq!(prop.serialize(Maybe::Null).unwrap(), Some(json!(null)));
/// assert_eq!(prop.serialize(Maybe::Undefined).unwrap(), None);
/// ```
pub fn primitive<T>() -> PropSchema
where
    T: Serialize + DeserializeOwned + Any,
{
    custom::<T, _, _>(
        |value| Ok(serde_json::to_value(value)?),
        |json, _| Ok(T::deserialize(json)?),
    )
}

/// A prop converting present values with the given functions.
///
/// Absent and `null` values never reach `serialize` or `deserialize`, they
/// are handled as by [`primitive`].
pub fn custom<T, S, D>(serialize: S, deserialize: D) -> PropSchema
where
    T: Any,
    S: Fn(&T) -> Result<Value, SerializeError> + Send + Sync + 'static,
    D: Fn(&Value, &Context) -> Result<T, DataError> + Send + Sync + 'static,
{
    PropSchema::new(
        move |value| {
            let value = match value {
                Maybe::Undefined => return Ok(None),
                Maybe::Null => return Ok(Some(Value::Null)),
                Maybe::Some(value) => value,
            };
            let value = require(value.downcast_ref::<T>(), || {
                format!("a prop of `{}` is bound to a field of another type", type_name::<T>())
            })?;
            serialize(value).map(Some)
        },
        move |json, done: Done, ctx: &Context| {
            match json {
                None => done.ok(Maybe::Undefined),
                Some(Value::Null) => done.ok(Maybe::Null),
                Some(json) => match deserialize(json, ctx) {
                    Ok(value) => done.value(value),
                    Err(error) => done.fail(error),
                },
            }
            Ok(())
        },
    )
}

/// Passes JSON through as a [`serde_json::Value`] field.
pub fn raw() -> PropSchema {
    custom::<Value, _, _>(|value| Ok(value.clone()), |json, _| Ok(json.clone()))
}
