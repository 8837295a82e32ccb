use alloc::borrow::Cow;
use alloc::sync::Arc;
use core::fmt;

use serde_json::Value;

use crate::de::{Context, Done};
use crate::error::{ConfigError, SerializeError};
use crate::value::AnyRef;

/// Serializer half of a [`PropSchema`].
///
/// `Ok(None)` means "undefined": the key is left out of the JSON object.
pub type SerializeFn =
    dyn for<'a> Fn(AnyRef<'a>) -> Result<Option<Value>, SerializeError> + Send + Sync;

/// Deserializer half of a [`PropSchema`].
///
/// The JSON value is `None` when the key is absent. The outcome goes to the
/// [`Done`], the returned `Result` only carries configuration errors.
pub type DeserializeFn =
    dyn Fn(Option<&Value>, Done, &Context) -> Result<(), ConfigError> + Send + Sync;

// -----------------------------------------------------------------------------
// PropSchema

/// Describes how one field is serialized and deserialized.
///
/// The two halves are expected to round-trip, which is not checked.
/// Cloning shares the underlying functions.
///
/// Most prop schemas come from the factories in [`props`](crate::props),
/// [`PropSchema::new`] builds one from raw functions, including
/// deserializers that complete later.
#[derive(Clone)]
pub struct PropSchema {
    serializer: Arc<SerializeFn>,
    deserializer: Arc<DeserializeFn>,
    json_name: Option<Cow<'static, str>>,
}

impl PropSchema {
    pub fn new<S, D>(serializer: S, deserializer: D) -> Self
    where
        S: Fn(AnyRef<'_>) -> Result<Option<Value>, SerializeError> + Send + Sync + 'static,
        D: Fn(Option<&Value>, Done, &Context) -> Result<(), ConfigError> + Send + Sync + 'static,
    {
        Self {
            serializer: Arc::new(serializer),
            deserializer: Arc::new(deserializer),
            json_name: None,
        }
    }

    #[inline]
    pub fn serialize(&self, value: AnyRef<'_>) -> Result<Option<Value>, SerializeError> {
        (self.serializer)(value)
    }

    #[inline]
    pub fn deserialize(
        &self,
        json: Option<&Value>,
        done: Done,
        ctx: &Context,
    ) -> Result<(), ConfigError> {
        (self.deserializer)(json, done, ctx)
    }

    /// The JSON key, when it differs from the field name.
    #[inline]
    pub fn json_name(&self) -> Option<&str> {
        self.json_name.as_deref()
    }

    /// Renames the JSON key of this prop.
    #[inline]
    pub fn with_json_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.json_name = Some(name.into());
        self
    }

    /// Takes over the JSON rename of `base`, for props wrapping another.
    #[inline]
    pub(crate) fn renamed_like(mut self, base: &PropSchema) -> Self {
        self.json_name = base.json_name.clone();
        self
    }
}

impl fmt::Debug for PropSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropSchema")
            .field("json_name", &self.json_name)
            .finish_non_exhaustive()
    }
}
