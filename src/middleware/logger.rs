use crate::context::Context;
use crate::handler::Handler;
use tracing::info;

/// Emits one `tracing` event per request entering the chain. It runs before
/// the handler, so it records the request only; the transport logs the
/// outcome.
#[derive(Clone, Debug, Default)]
pub struct RequestLogger {
    label: Option<String>,
}

impl RequestLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags every event with a label, e.g. the group the logger is attached to.
    pub fn labelled(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
        }
    }
}

impl Handler for RequestLogger {
    fn call(&self, ctx: &mut Context<'_>) {
        let user_agent = ctx.header("user-agent").unwrap_or("-");
        info!(
            label = self.label.as_deref().unwrap_or("-"),
            method = %ctx.method(),
            path = ctx.path(),
            user_agent,
            "request"
        );
    }
}
