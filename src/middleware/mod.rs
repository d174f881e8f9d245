mod logger;
mod security;

pub use logger::RequestLogger;
pub use security::{SecurityConfig, SecurityHeaders};

use crate::context::Context;
use crate::handler::{Handler, HandlerFunc};
use std::fmt;
use std::sync::Arc;

/// An ordered list of handler-like units that composes into one handler.
///
/// The composed handler is fire-all: every unit runs, in order, exactly once,
/// against the same [`Context`]. There is no early exit. A unit that has
/// already written the full response does not stop the units after it.
#[derive(Clone, Default)]
pub struct HandlerChain {
    units: Vec<HandlerFunc>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    pub fn from_handler<H: Handler>(handler: H) -> Self {
        let mut chain = Self::new();
        chain.push(handler);
        chain
    }

    pub fn push<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.units.push(Arc::new(handler));
        self
    }

    pub fn push_func(&mut self, handler: HandlerFunc) -> &mut Self {
        self.units.push(handler);
        self
    }

    pub fn with<H: Handler>(mut self, handler: H) -> Self {
        self.push(handler);
        self
    }

    pub fn append(&mut self, mut other: HandlerChain) -> &mut Self {
        self.units.append(&mut other.units);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Builds the single callable for this chain. Nothing runs until it is invoked.
    pub fn compose(&self) -> HandlerFunc {
        match self.units.as_slice() {
            [single] => Arc::clone(single),
            units => Arc::new(Chained {
                units: units.to_vec(),
            }),
        }
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("units", &self.units.len())
            .finish()
    }
}

struct Chained {
    units: Vec<HandlerFunc>,
}

impl Handler for Chained {
    fn call(&self, ctx: &mut Context<'_>) {
        for unit in &self.units {
            unit.call(ctx);
        }
    }
}

/// Builds a [`HandlerChain`] from closures or functions taking `&mut Context`.
///
/// ```ignore
/// router.handle("GET", "/admin", handlers![audit, require_token, dashboard]);
/// ```
#[macro_export]
macro_rules! handlers {
    ($($handler:expr),+ $(,)?) => {{
        let mut chain = $crate::middleware::HandlerChain::new();
        $( chain.push($crate::handler::handler_fn($handler)); )+
        chain
    }};

    () => {
        compile_error!("The handlers! macro requires at least one handler")
    };
}
