use alloc::format;
use core::any::{Any, type_name};

use serde_json::{Map, Value};

use crate::assert::require;
use crate::error::SerializeError;
use crate::registry::default_schema_of;
use crate::schema::ModelSchema;
use crate::value::erase;

/// Serializes `item` into a JSON object with `schema`.
///
/// `item` may be the model value itself or a `Box` of it. Each field goes
/// through its prop schema, keys whose serializer yields nothing are left
/// out, renamed props use their JSON name.
pub fn serialize_with_schema(schema: &ModelSchema, item: &dyn Any) -> Result<Value, SerializeError> {
    let target = require(schema.view(item), || {
        format!(
            "the schema of `{}` cannot serialize a value of another type",
            schema.type_path()
        )
    })?;

    let mut object = Map::new();
    for binding in schema.props() {
        let field = require(binding.read(target), || {
            format!(
                "field `{}` of the schema of `{}` is bound to another type",
                binding.name(),
                schema.type_path()
            )
        })?;

        let value = binding
            .prop()
            .serialize(field)
            .map_err(|error| error.in_field(binding.name()))?;
        if let Some(value) = value {
            object.insert(binding.json_name().into(), value);
        }
    }
    Ok(Value::Object(object))
}

/// Serializes `value` with the default schema of its runtime type.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use vc_schema::props::primitive;
/// use vc_schema::schema::ModelSchema;
/// use vc_schema::ser::serialize;
///
/// #[derive(Default)]
/// struct Todo {
///     title: String,
///     done: bool,
/// }
///
/// ModelSchema::builder::<Todo>()
///     .field("title", primitive::<String>(), |t| &t.title, |t| &mut t.title)
///     .field("done", primitive::<bool>(), |t| &t.done, |t| &mut t.done)
///     .register();
///
/// let todo = Todo { title: "write docs".into(), done: true };
/// assert_eq!(serialize(&todo).unwrap(), json!({ "title": "write docs", "done": true }));
/// ```
pub fn serialize<T: Any>(value: &T) -> Result<Value, SerializeError> {
    let item = erase(value);
    let schema = require(default_schema_of(item), || {
        format!("no default schema registered for `{}`", type_name::<T>())
    })?;
    serialize_with_schema(&schema, item)
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;

    use serde_json::json;

    use super::{serialize, serialize_with_schema};
    use crate::props::{primitive, skip};
    use crate::schema::ModelSchema;
    use crate::value::{AnyObject, Maybe};

    #[derive(Default)]
    struct Note {
        text: String,
        secret: String,
        pinned: Maybe<bool>,
    }

    struct Orphan;

    fn note_schema() -> alloc::sync::Arc<ModelSchema> {
        ModelSchema::builder::<Note>()
            .field("text", primitive::<String>().with_json_name("body"), |n| &n.text, |n| {
                &mut n.text
            })
            .field("secret", skip(), |n| &n.secret, |n| &mut n.secret)
            .field("pinned", primitive::<bool>(), |n| &n.pinned, |n| &mut n.pinned)
            .build()
    }

    #[test]
    fn renames_and_omits() {
        let note = Note {
            text: "hi".into(),
            secret: "s3cret".into(),
            pinned: Maybe::Undefined,
        };
        let json = serialize_with_schema(&note_schema(), &note).unwrap();
        assert_eq!(json, json!({ "body": "hi" }));

        let note = Note {
            pinned: Maybe::Null,
            ..note
        };
        let json = serialize_with_schema(&note_schema(), &Box::new(note)).unwrap();
        assert_eq!(json, json!({ "body": "hi", "pinned": null }));
    }

    #[test]
    fn foreign_value_is_a_config_error() {
        let err = serialize_with_schema(&note_schema(), &3_u8).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn unregistered_type_is_a_config_error() {
        assert!(serialize(&Orphan).unwrap_err().is_config());
    }

    #[test]
    fn any_object_uses_runtime_type() {
        struct Marker;
        ModelSchema::builder_with_factory(|_| Marker).register();

        let object = AnyObject::new(Marker);
        assert_eq!(serialize(&object).unwrap(), json!({}));
    }
}
