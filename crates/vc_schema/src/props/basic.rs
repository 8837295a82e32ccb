use alloc::borrow::Cow;
use core::any::Any;

use crate::de::{Context, Done};
use crate::schema::PropSchema;
use crate::value::Maybe;

/// Stores `prop` under another JSON key.
#[inline]
pub fn alias(name: impl Into<Cow<'static, str>>, prop: PropSchema) -> PropSchema {
    prop.with_json_name(name)
}

/// A prop that is never written and never read.
///
/// The field keeps whatever the factory put there.
pub fn skip() -> PropSchema {
    PropSchema::new(
        |_| Ok(None),
        |_, done: Done, _: &Context| {
            done.ok(Maybe::Undefined);
            Ok(())
        },
    )
}

/// Fills the field with `default` when its key is absent.
///
/// Present keys, `null` included, go to `prop`. The JSON rename of `prop`
/// is kept.
pub fn with_default<T, F>(prop: PropSchema, default: F) -> PropSchema
where
    T: Any,
    F: Fn(&Context) -> T + Send + Sync + 'static,
{
    let (ser_inner, de_inner) = (prop.clone(), prop.clone());
    PropSchema::new(
        move |value| ser_inner.serialize(value),
        move |json, done: Done, ctx: &Context| match json {
            None => {
                done.value(default(ctx));
                Ok(())
            }
            Some(json) => de_inner.deserialize(Some(json), done, ctx),
        },
    )
    .renamed_like(&prop)
}
