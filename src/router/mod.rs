//! Route registration and dispatch.
//!
//! [`Router`] owns the [`RouteTable`] and is the root registration scope;
//! [`RouterGroup`] is a prefixed scope borrowed from it. Both implement
//! [`Routes`], so registration code reads the same at either level:
//!
//! ```ignore
//! let mut router = Router::new();
//! router.get("/ping", |ctx| ctx.text(200, "pong"));
//!
//! let mut api = router.group("/api");
//! api.middleware(RequestLogger::new())
//!     .get("/users", list_users)
//!     .post("/users", create_user);
//! ```

pub mod group;
pub mod table;

pub use group::RouterGroup;
pub use table::{Lookup, RouteTable};

use crate::config::RouterConfig;
use crate::context::Context;
use crate::error::Result;
use crate::handler::{Handler, HandlerFunc};
use crate::http::{Method, Request, ResponseWriter};
use crate::middleware::HandlerChain;
use std::sync::Arc;
use tracing::debug;

/// Registration surface shared by the root router and its groups.
///
/// `handle` and the method shortcuts treat a bad registration as fatal and
/// panic; `try_handle` reports the same condition as an [`Error`](crate::Error).
pub trait Routes: Sized {
    fn try_handle(&mut self, method: &str, path: &str, handlers: HandlerChain) -> Result<()>;

    /// Appends middleware for registrations made after this call.
    fn middleware<H: Handler>(&mut self, middleware: H) -> &mut Self;

    /// Opens a nested scope whose base path is this scope's base path
    /// followed by `prefix`, starting from a copy of this scope's middleware.
    fn group(&mut self, prefix: &str) -> RouterGroup<'_>;

    fn middleware_fn<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.middleware(middleware)
    }

    #[track_caller]
    fn handle(&mut self, method: &str, path: &str, handlers: HandlerChain) -> &mut Self {
        if let Err(err) = self.try_handle(method, path, handlers) {
            panic!("{}", err);
        }
        self
    }

    #[track_caller]
    fn get<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.handle("GET", path, HandlerChain::from_handler(handler))
    }

    #[track_caller]
    fn post<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.handle("POST", path, HandlerChain::from_handler(handler))
    }

    #[track_caller]
    fn put<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.handle("PUT", path, HandlerChain::from_handler(handler))
    }

    #[track_caller]
    fn patch<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.handle("PATCH", path, HandlerChain::from_handler(handler))
    }

    #[track_caller]
    fn delete<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.handle("DELETE", path, HandlerChain::from_handler(handler))
    }

    #[track_caller]
    fn head<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.handle("HEAD", path, HandlerChain::from_handler(handler))
    }

    #[track_caller]
    fn options<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.handle("OPTIONS", path, HandlerChain::from_handler(handler))
    }

    /// Registers `handler` for every method in [`Method::STANDARD`].
    #[track_caller]
    fn any<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        let handler: HandlerFunc = Arc::new(handler);
        for method in Method::STANDARD.iter() {
            let mut chain = HandlerChain::new();
            chain.push_func(Arc::clone(&handler));
            self.handle(method.as_str(), path, chain);
        }
        self
    }

    /// Registers `handler` for each listed method token.
    #[track_caller]
    fn match_methods<F>(&mut self, methods: &[&str], path: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        let handler: HandlerFunc = Arc::new(handler);
        for method in methods {
            let mut chain = HandlerChain::new();
            chain.push_func(Arc::clone(&handler));
            self.handle(method, path, chain);
        }
        self
    }
}

/// Terminal outcome of [`Router::serve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    NotFound,
    MethodNotAllowed,
}

/// The root scope and request dispatcher.
#[derive(Clone)]
pub struct Router {
    table: RouteTable,
    middlewares: HandlerChain,
    config: RouterConfig,
}

impl Router {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            table: RouteTable::new(),
            middlewares: HandlerChain::new(),
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        self.table.lookup(method, path)
    }

    /// Resolves `request` and runs the matching chain against a fresh
    /// [`Context`]. Misses are answered here with 404 or 405.
    pub fn serve(&self, request: Request, writer: &mut ResponseWriter) -> Dispatch {
        match self.table.lookup(&request.method, &request.path) {
            Lookup::Matched(handler) => {
                let mut ctx = Context::new(request, writer);
                handler.call(&mut ctx);
                Dispatch::Handled
            }
            Lookup::MethodNotAllowed { allowed } => {
                debug!(method = %request.method, path = %request.path, "method not allowed");
                if self.config.allow_header {
                    let allow = allowed
                        .iter()
                        .map(|method| method.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    writer.set_header("Allow", allow);
                }
                writer.write_error(405, &self.config.method_not_allowed_message);
                Dispatch::MethodNotAllowed
            }
            Lookup::NotFound => {
                debug!(method = %request.method, path = %request.path, "no route");
                writer.write_error(404, &self.config.not_found_message);
                Dispatch::NotFound
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Routes for Router {
    fn try_handle(&mut self, method: &str, path: &str, handlers: HandlerChain) -> Result<()> {
        group::register(&mut self.table, "", &self.middlewares, method, path, handlers)
    }

    fn middleware<H: Handler>(&mut self, middleware: H) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        RouterGroup::new(&mut self.table, prefix.to_string(), self.middlewares.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn send(router: &Router, method: Method, target: &str) -> (Dispatch, ResponseWriter) {
        let mut writer = ResponseWriter::new();
        let outcome = router.serve(Request::new(method, target), &mut writer);
        (outcome, writer)
    }

    #[test]
    fn ping_scenario() {
        let mut router = Router::new();
        router.get("/ping", |ctx| ctx.text(200, "pong"));

        let (outcome, res) = send(&router, Method::GET, "/ping");
        assert_eq!(outcome, Dispatch::Handled);
        assert_eq!(res.status(), 200);
        assert_eq!(res.body_string(), "pong");

        let (outcome, res) = send(&router, Method::POST, "/ping");
        assert_eq!(outcome, Dispatch::MethodNotAllowed);
        assert_eq!(res.status(), 405);
        assert_eq!(res.body_string(), r#"{"error":"method not allowed"}"#);
        assert_eq!(res.header("Allow"), Some("GET"));

        let (outcome, res) = send(&router, Method::GET, "/missing");
        assert_eq!(outcome, Dispatch::NotFound);
        assert_eq!(res.status(), 404);
        assert_eq!(res.body_string(), r#"{"error":"page not found"}"#);
    }

    #[test]
    fn query_string_does_not_affect_matching() {
        let mut router = Router::new();
        router.get("/search", |ctx| {
            let q = ctx.query("q").unwrap_or_default().to_string();
            ctx.text(200, q);
        });
        let (_, res) = send(&router, Method::GET, "/search?q=rust");
        assert_eq!(res.body_string(), "rust");
    }

    #[test]
    fn allow_header_can_be_disabled() {
        let config = RouterConfig {
            allow_header: false,
            ..RouterConfig::default()
        };
        let mut router = Router::with_config(config);
        router.get("/only-get", |ctx| ctx.text(200, "ok"));
        let (_, res) = send(&router, Method::DELETE, "/only-get");
        assert_eq!(res.status(), 405);
        assert_eq!(res.header("Allow"), None);
    }

    #[test]
    fn custom_miss_messages() {
        let config = RouterConfig {
            not_found_message: "nothing here".to_string(),
            ..RouterConfig::default()
        };
        let router = Router::with_config(config);
        let (_, res) = send(&router, Method::GET, "/");
        assert_eq!(res.body_string(), r#"{"error":"nothing here"}"#);
    }

    #[test]
    fn try_handle_reports_bad_tokens() {
        let mut router = Router::new();
        let chain = HandlerChain::from_handler(crate::handler::handler_fn(|ctx| ctx.text(200, "x")));
        let err = router.try_handle("G3T", "/x", chain).unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(_)));
        assert!(router.routes().is_empty());
    }

    #[test]
    #[should_panic(expected = "HTTP method \"get\" is not valid")]
    fn lowercase_method_panics_at_registration() {
        let mut router = Router::new();
        router.handle("get", "/x", crate::handlers![|ctx| ctx.text(200, "x")]);
    }

    #[test]
    fn extension_methods_route() {
        let mut router = Router::new();
        router.match_methods(&["PROPFIND", "GET"], "/dav", |ctx| ctx.text(207, "multi"));
        let (_, res) = send(&router, Method::from_wire("PROPFIND"), "/dav");
        assert_eq!(res.status(), 207);
        let (_, res) = send(&router, Method::from_wire("propfind"), "/dav");
        assert_eq!(res.status(), 405);
    }

    #[test]
    fn any_covers_standard_methods() {
        let mut router = Router::new();
        router.any("/anything", |ctx| {
            let method = ctx.method().to_string();
            ctx.text(200, method);
        });
        assert_eq!(router.routes().len(), Method::STANDARD.len());
        for method in Method::STANDARD.iter() {
            let (outcome, res) = send(&router, method.clone(), "/anything");
            assert_eq!(outcome, Dispatch::Handled);
            assert_eq!(res.body_string(), method.as_str());
        }
    }
}
