use crate::BoxError;
use std::fmt::{self, Debug, Display};

/// An error wrapped with a human readable context.
pub(crate) struct ContextError<C> {
    pub(crate) context: C,
    pub(crate) error: BoxError,
}

impl<C> Debug for ContextError<C>
where
    C: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ContextError")
            .field("context", &format_args!("{}", self.context))
            .field("error", &self.error)
            .finish()
    }
}

impl<C> Display for ContextError<C>
where
    C: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.error)
    }
}

impl<C> std::error::Error for ContextError<C>
where
    C: Display,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.error)
    }
}
