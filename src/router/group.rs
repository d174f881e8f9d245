use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::http::Method;
use crate::middleware::HandlerChain;
use crate::router::table::RouteTable;
use crate::router::Routes;
use tracing::debug;

/// A registration scope: a base path plus the middleware accumulated so far.
///
/// A group mutably borrows the route table of the [`Router`](crate::Router)
/// it was created from, so all registration happens before the router is
/// handed to a server.
pub struct RouterGroup<'r> {
    table: &'r mut RouteTable,
    base_path: String,
    middlewares: HandlerChain,
}

impl<'r> RouterGroup<'r> {
    pub(crate) fn new(table: &'r mut RouteTable, base_path: String, middlewares: HandlerChain) -> Self {
        Self {
            table,
            base_path,
            middlewares,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Number of middleware units that registrations made now would be wrapped in.
    pub fn middleware_len(&self) -> usize {
        self.middlewares.len()
    }
}

impl Routes for RouterGroup<'_> {
    fn try_handle(&mut self, method: &str, path: &str, handlers: HandlerChain) -> Result<()> {
        register(self.table, &self.base_path, &self.middlewares, method, path, handlers)
    }

    fn middleware<H: Handler>(&mut self, middleware: H) -> &mut Self {
        self.middlewares.push(middleware);
        self
    }

    fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        RouterGroup::new(
            &mut *self.table,
            join_paths(&self.base_path, prefix),
            self.middlewares.clone(),
        )
    }
}

/// Raw concatenation; callers supply their own separators.
pub(crate) fn join_paths(base_path: &str, relative_path: &str) -> String {
    if base_path.is_empty() {
        return relative_path.to_string();
    }
    let mut path = String::with_capacity(base_path.len() + relative_path.len());
    path.push_str(base_path);
    path.push_str(relative_path);
    path
}

/// Validates the method, prepends the scope's middleware to `handlers` and
/// stores the composed chain under the absolute path.
pub(crate) fn register(
    table: &mut RouteTable,
    base_path: &str,
    middlewares: &HandlerChain,
    method: &str,
    relative_path: &str,
    handlers: HandlerChain,
) -> Result<()> {
    let method = Method::parse(method)?;
    let path = join_paths(base_path, relative_path);
    if handlers.is_empty() {
        return Err(Error::EmptyChain {
            method: method.to_string(),
            path,
        });
    }

    let mut chain = middlewares.clone();
    chain.append(handlers);
    let units = chain.len();
    let overwritten = table.insert(method.clone(), &path, chain.compose()).is_some();
    debug!(method = %method, path = %path, units, overwritten, "route registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenation_inserts_nothing() {
        assert_eq!(join_paths("/api", "/users"), "/api/users");
        assert_eq!(join_paths("/api", "users"), "/apiusers");
        assert_eq!(join_paths("/api/", "/users"), "/api//users");
        assert_eq!(join_paths("", "/users"), "/users");
        assert_eq!(join_paths("/api", ""), "/api");
    }

    #[test]
    fn empty_chain_is_rejected() {
        let mut table = RouteTable::new();
        let err = register(&mut table, "/v1", &HandlerChain::new(), "GET", "/x", HandlerChain::new())
            .unwrap_err();
        assert!(matches!(err, Error::EmptyChain { ref path, .. } if path == "/v1/x"));
        assert!(table.is_empty());
    }

    #[test]
    fn invalid_method_is_rejected_before_insert() {
        let mut table = RouteTable::new();
        let chain = HandlerChain::from_handler(crate::handler::handler_fn(|_ctx| {}));
        let err = register(&mut table, "", &HandlerChain::new(), "get", "/x", chain).unwrap_err();
        assert!(matches!(err, Error::InvalidMethod(ref token) if token == "get"));
        assert!(table.is_empty());
    }
}
