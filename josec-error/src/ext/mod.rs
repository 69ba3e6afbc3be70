use crate::BoxError;
use std::fmt::Display;

mod chain;
mod context;

mod wrapper;
pub use wrapper::OpaqueError;
pub(crate) use wrapper::MessageError;

/// Extends the `Result` and `Option` types with methods for adding context to errors.
///
/// # Examples
///
/// ```
/// use josec_error::ErrorContext;
///
/// let result = "hello".parse::<i32>().context("parse integer");
/// assert_eq!("parse integer: invalid digit found in string", result.unwrap_err().to_string());
/// ```
pub trait ErrorContext: private::SealedErrorContext {
    /// The resulting context type after adding context to the contained error.
    type Context;

    /// Add a static context to the contained error.
    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static;

    /// Lazily add a context to the contained error, if it exists.
    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ErrorContext for Result<T, E>
where
    E: Into<BoxError>,
{
    type Context = Result<T, OpaqueError>;

    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static,
    {
        self.map_err(|error| wrap_with_context(error.into(), context))
    }

    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| wrap_with_context(error.into(), context()))
    }
}

impl<T> ErrorContext for Option<T> {
    type Context = Result<T, OpaqueError>;

    fn context<M>(self, context: M) -> Self::Context
    where
        M: Display + Send + Sync + 'static,
    {
        match self {
            Some(value) => Ok(value),
            None => Err(wrap_with_context(
                Box::new(MessageError("Option is None")),
                context,
            )),
        }
    }

    fn with_context<C, F>(self, context: F) -> Self::Context
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        match self {
            Some(value) => Ok(value),
            None => Err(wrap_with_context(
                Box::new(MessageError("Option is None")),
                context(),
            )),
        }
    }
}

fn wrap_with_context<M>(error: BoxError, context: M) -> OpaqueError
where
    M: Display + Send + Sync + 'static,
{
    OpaqueError::from_std(context::ContextError { context, error })
}

/// Extends the `Error` type with methods for working with errors.
///
/// # Examples
///
/// ```
/// use josec_error::ErrorExt;
///
/// #[derive(Debug)]
/// struct CustomError;
///
/// impl std::fmt::Display for CustomError {
///  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
///    write!(f, "Custom error")
///  }
/// }
///
/// impl std::error::Error for CustomError {}
///
/// let error = CustomError.context("whoops");
/// let root_cause = error.root_cause();
/// assert!(root_cause.downcast_ref::<CustomError>().is_some());
/// ```
pub trait ErrorExt: private::SealedErrorExt {
    /// Wrap the error in a context.
    fn context<M>(self, context: M) -> OpaqueError
    where
        M: Display + Send + Sync + 'static;

    /// Lazily wrap the error with a context.
    fn with_context<C, F>(self, context: F) -> OpaqueError
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// Iterate over the chain of errors.
    fn chain(&self) -> impl Iterator<Item = &(dyn std::error::Error + 'static)>;

    /// Get the root cause of the error.
    fn root_cause(&self) -> &(dyn std::error::Error + 'static);
}

impl<Error: std::error::Error + Send + Sync + 'static> ErrorExt for Error {
    fn context<M>(self, context: M) -> OpaqueError
    where
        M: Display + Send + Sync + 'static,
    {
        wrap_with_context(Box::new(self), context)
    }

    fn with_context<C, F>(self, context: F) -> OpaqueError
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        wrap_with_context(Box::new(self), context())
    }

    fn chain(&self) -> impl Iterator<Item = &(dyn std::error::Error + 'static)> {
        chain::Chain::new(self)
    }

    fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        let mut cause: &(dyn std::error::Error + 'static) = self;
        while let Some(next) = cause.source() {
            cause = next;
        }
        cause
    }
}

mod private {
    pub trait SealedErrorContext {}

    impl<T, E> SealedErrorContext for Result<T, E> where E: Into<crate::BoxError> {}
    impl<T> SealedErrorContext for Option<T> {}

    pub trait SealedErrorExt {}

    impl<Error: std::error::Error + Send + Sync + 'static> SealedErrorExt for Error {}
}
