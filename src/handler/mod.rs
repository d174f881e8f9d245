use crate::context::Context;
use std::sync::Arc;

/// Anything that can run against a request [`Context`]: terminal handlers and
/// middleware share this one shape.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: &mut Context<'_>);
}

impl<F> Handler for F
where
    F: Fn(&mut Context<'_>) + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut Context<'_>) {
        (self)(ctx)
    }
}

/// A type-erased, shareable handler as stored in the route table.
pub type HandlerFunc = Arc<dyn Handler>;

/// Identity helper that fixes a closure's argument type to `&mut Context`,
/// so closures can be passed where only `H: Handler` is required.
pub fn handler_fn<F>(f: F) -> F
where
    F: Fn(&mut Context<'_>) + Send + Sync + 'static,
{
    f
}
