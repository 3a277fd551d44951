/// The outcome of an operation whose expected failures are reported as a
/// status instead of an error.
///
/// A failed attempt carries no value, so there is nothing a caller could
/// mistake for valid data.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Attempt<T, S> {
    status: S,
    result: Option<T>,
}

impl<T, S> Attempt<T, S> {
    pub fn succeed(status: S, result: T) -> Self {
        Self {
            status,
            result: Some(result),
        }
    }

    pub fn fail(status: S) -> Self {
        Self {
            status,
            result: None,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    #[inline]
    pub fn status(&self) -> &S {
        &self.status
    }

    #[inline]
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Result<T, S> {
        self.result.ok_or(self.status)
    }
}
