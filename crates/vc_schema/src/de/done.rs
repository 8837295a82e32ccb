use core::any::Any;
use core::fmt;

use alloc::boxed::Box;

use crate::error::DataError;
use crate::value::{AnyValue, Maybe};

/// The outcome a deserializer reports.
pub type DoneResult = Result<AnyValue, DataError>;

// -----------------------------------------------------------------------------
// Done

/// Single-use completion token of one deserialization attempt.
///
/// A deserializer receives a `Done` by value and must consume it exactly
/// once, either synchronously before returning or later, e.g. after some
/// asynchronous lookup. Every consuming method takes `self`, so completing
/// twice does not compile.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use vc_schema::de::Done;
/// use vc_schema::value::Maybe;
///
/// let fired = Rc::new(Cell::new(0));
/// let counter = fired.clone();
/// let done = Done::new(move |result| {
///     assert!(matches!(result, Ok(Maybe::Null)));
///     counter.set(counter.get() + 1);
/// });
///
/// done.ok(Maybe::Null);
/// assert_eq!(fired.get(), 1);
/// ```
pub struct Done {
    callback: Box<dyn FnOnce(DoneResult)>,
}

impl Done {
    #[inline]
    pub fn new(callback: impl FnOnce(DoneResult) + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Reports `result`.
    #[inline]
    pub fn complete(self, result: DoneResult) {
        (self.callback)(result);
    }

    #[inline]
    pub fn ok(self, value: AnyValue) {
        self.complete(Ok(value));
    }

    /// Reports a present value.
    #[inline]
    pub fn value<T: Any>(self, value: T) {
        self.complete(Ok(Maybe::Some(Box::new(value))));
    }

    #[inline]
    pub fn fail(self, error: DataError) {
        self.complete(Err(error));
    }

    /// Returns a token that runs `f` on the result before reporting it here.
    pub fn map(self, f: impl FnOnce(DoneResult) -> DoneResult + 'static) -> Done {
        Done::new(move |result| self.complete(f(result)))
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;

    use super::Done;
    use crate::error::DataError;
    use crate::value::{Maybe, value_ref};

    #[test]
    fn map_runs_before_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let done = Done::new(move |result| {
            let value = result.unwrap().some().unwrap();
            log.borrow_mut().push(*value_ref::<u32>(&*value).unwrap());
        });

        let done = done.map(|result| {
            let value = *value_ref::<u32>(&*result?.some().unwrap()).unwrap();
            Ok(Maybe::Some(Box::new(value + 1)))
        });
        done.value(1_u32);

        assert_eq!(*seen.borrow(), [2]);
    }

    #[test]
    fn fail_reports_error() {
        let seen = Rc::new(RefCell::new(None));
        let slot = seen.clone();
        Done::new(move |result| *slot.borrow_mut() = Some(result.is_err()))
            .fail(DataError::custom("broken"));
        assert_eq!(*seen.borrow(), Some(true));
    }
}
