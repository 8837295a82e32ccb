/// Builds a [`ModelSchema`](crate::schema::ModelSchema) binding fields
/// to props by name.
///
/// The model type must implement `Default`, the JSON keys are the field
/// names unless a prop renames them.
///
/// ```
/// use vc_schema::model_schema;
/// use vc_schema::props::{alias, primitive};
///
/// #[derive(Default)]
/// struct Todo {
///     title: String,
///     done: bool,
/// }
///
/// let schema = model_schema!(Todo {
///     title: primitive::<String>(),
///     done: alias("completed", primitive::<bool>()),
/// });
/// assert_eq!(schema.props()[1].json_name(), "completed");
/// ```
#[macro_export]
macro_rules! model_schema {
    ($ty:ty { $($field:ident : $prop:expr),* $(,)? }) => {
        $crate::schema::ModelSchema::builder::<$ty>()
            $(
                .field(
                    ::core::stringify!($field),
                    $prop,
                    |value: &$ty| &value.$field,
                    |value: &mut $ty| &mut value.$field,
                )
            )*
            .build()
    };
}

/// Adds a schema to the default registry the first time it is used.
///
/// Takes a path to a `fn() -> Arc<ModelSchema>`. Submissions are collected
/// at link time, so this works at module level and in any crate. Schemas
/// registered explicitly are never replaced by submitted ones.
///
/// Without the `auto_register` feature the function is only type-checked.
///
/// ```
/// use std::sync::Arc;
///
/// use vc_schema::auto_register;
/// use vc_schema::registry::default_schema_of;
/// use vc_schema::schema::ModelSchema;
///
/// #[derive(Default)]
/// struct Settings;
///
/// fn settings_schema() -> Arc<ModelSchema> {
///     ModelSchema::builder::<Settings>().build()
/// }
///
/// auto_register!(settings_schema);
///
/// # if cfg!(feature = "auto_register") {
/// assert!(default_schema_of(&Settings).is_some());
/// # }
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! auto_register {
    ($build:path) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoSchema::new($build)
        }
    };
}

/// Adds a schema to the default registry the first time it is used.
///
/// The `auto_register` feature is disabled, the function is only
/// type-checked.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! auto_register {
    ($build:path) => {
        const _: fn() -> $crate::__macro_exports::Arc<$crate::schema::ModelSchema> = $build;
    };
}
