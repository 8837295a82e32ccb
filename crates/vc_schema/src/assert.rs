//! Fail-fast guards for schema wiring.

use alloc::string::String;

use crate::error::ConfigError;

/// Returns a [`ConfigError`] carrying `message` when `condition` is false.
///
/// The message is built lazily, only on failure.
///
/// # Examples
///
/// ```
/// use vc_schema::assert_or_fail;
///
/// assert!(assert_or_fail(true, || "unreachable".into()).is_ok());
///
/// let err = assert_or_fail(false, || "expected model schema, got none".into()).unwrap_err();
/// assert_eq!(err.message(), "expected model schema, got none");
/// ```
#[inline]
pub fn assert_or_fail(condition: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::new(message()))
    }
}

/// Unwraps `value` or fails with a [`ConfigError`] carrying `message`.
#[inline]
pub fn require<T>(value: Option<T>, message: impl FnOnce() -> String) -> Result<T, ConfigError> {
    match value {
        Some(value) => Ok(value),
        None => Err(ConfigError::new(message())),
    }
}
