//! Business handler contract.

use orizuru_core::{BoxError, Context};

/// Business logic invoked once per successfully decoded message.
///
/// Any error returned here reaches the queue transport as a
/// `HandleMessageError` wrapping the original cause.
pub trait Handler<I, O>: Send + Sync {
    type Error: Into<BoxError>;

    fn handle(&self, context: &Context, input: I) -> Result<O, Self::Error>;
}

impl<I, O, E, F> Handler<I, O> for F
where
    F: Fn(&Context, I) -> Result<O, E> + Send + Sync,
    E: Into<BoxError>,
{
    type Error = E;

    fn handle(&self, context: &Context, input: I) -> Result<O, E> {
        self(context, input)
    }
}
