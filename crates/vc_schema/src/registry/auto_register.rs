use alloc::sync::Arc;

use crate::registry::SchemaRegistry;
use crate::schema::ModelSchema;

/// A schema submitted through [`auto_register!`](crate::auto_register).
#[doc(hidden)]
pub struct AutoSchema {
    build: fn() -> Arc<ModelSchema>,
}

impl AutoSchema {
    #[inline]
    pub const fn new(build: fn() -> Arc<ModelSchema>) -> Self {
        Self { build }
    }
}

inventory::collect!(AutoSchema);

pub(crate) fn register_all(registry: &mut SchemaRegistry) -> usize {
    let mut added = 0;
    for submitted in inventory::iter::<AutoSchema> {
        if registry.try_register((submitted.build)()) {
            added += 1;
        }
    }
    log::debug!("auto registered {added} schemas");
    added
}
