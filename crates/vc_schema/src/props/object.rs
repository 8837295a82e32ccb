use alloc::format;
use alloc::sync::Arc;

use serde_json::Value;

use crate::assert::require;
use crate::de::{Context, Done, deserialize_object_with_schema};
use crate::error::ConfigError;
use crate::props::{PropHooks, with_hooks};
use crate::registry::{default_schema_of, resolve_schema};
use crate::schema::{ModelSchema, PropSchema, TypeRef};
use crate::ser::serialize_with_schema;
use crate::value::Maybe;

// Resolved on every use, so a type registered after the prop was built
// is still found.
fn declared_schema(type_ref: &TypeRef) -> Result<Arc<ModelSchema>, ConfigError> {
    require(resolve_schema(type_ref), || {
        format!(
            "expected a model schema for `{}`, found none registered",
            type_ref.type_path()
        )
    })
}

/// A prop for a nested model object.
///
/// See [`object_with`].
#[inline]
pub fn object(type_ref: impl Into<TypeRef>) -> PropSchema {
    object_with(type_ref, None)
}

/// A prop for a nested model object, wrapped with `hooks`.
///
/// `type_ref` is resolved each time the prop is used, never before. A
/// missing schema is a [`ConfigError`] raised before any value is looked at,
/// on both sides.
///
/// Serializing: absent and `null` values are kept as they are. Otherwise
/// the default schema of the value's runtime type is used if there is one,
/// the declared schema if not.
///
/// Deserializing: absent and `null` JSON complete right away with the same
/// value. Otherwise the declared schema builds the object, which may
/// complete later if one of its own fields does.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use vc_schema::de::deserialize;
/// use vc_schema::props::{object, primitive};
/// use vc_schema::schema::{ModelSchema, TypeRef};
/// use vc_schema::ser::serialize;
///
/// #[derive(Default)]
/// struct Author {
///     name: String,
/// }
///
/// #[derive(Default)]
/// struct Post {
///     author: Option<Author>,
/// }
///
/// // `Author` has no schema yet, the reference resolves on use.
/// ModelSchema::builder::<Post>()
///     .field("author", object(TypeRef::of::<Author>()), |p| &p.author, |p| &mut p.author)
///     .register();
/// ModelSchema::builder::<Author>()
///     .field("name", primitive::<String>(), |a| &a.name, |a| &mut a.name)
///     .register();
///
/// let post = Post { author: Some(Author { name: "Ada".into() }) };
/// let json = serialize(&post).unwrap();
/// assert_eq!(json, json!({ "author": { "name": "Ada" } }));
///
/// let post: Post = deserialize(&json).unwrap();
/// assert_eq!(post.author.unwrap().name, "Ada");
/// ```
pub fn object_with(type_ref: impl Into<TypeRef>, hooks: Option<PropHooks>) -> PropSchema {
    let type_ref = type_ref.into();
    let de_type_ref = type_ref.clone();

    let base = PropSchema::new(
        move |item| {
            let declared = declared_schema(&type_ref)?;
            let item = match item {
                Maybe::Undefined => return Ok(None),
                Maybe::Null => return Ok(Some(Value::Null)),
                Maybe::Some(item) => item,
            };
            let schema = default_schema_of(item).unwrap_or(declared);
            serialize_with_schema(&schema, item).map(Some)
        },
        move |json, done: Done, ctx: &Context| {
            let schema = declared_schema(&de_type_ref)?;
            match json {
                None => done.ok(Maybe::Undefined),
                Some(Value::Null) => done.ok(Maybe::Null),
                Some(json) => deserialize_object_with_schema(ctx, &schema, json, done, None)?,
            }
            Ok(())
        },
    );
    with_hooks(base, hooks)
}
