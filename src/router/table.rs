use crate::handler::HandlerFunc;
use crate::http::Method;
use std::collections::HashMap;

/// Result of an exact-match lookup. A known path with an unregistered method
/// is reported separately from an unknown path.
pub enum Lookup<'a> {
    Matched(&'a HandlerFunc),
    MethodNotAllowed { allowed: Vec<&'a Method> },
    NotFound,
}

impl Lookup<'_> {
    pub fn is_match(&self) -> bool {
        matches!(self, Lookup::Matched(_))
    }
}

/// Two-level map from path to method to composed handler.
///
/// Paths are compared byte for byte: no trailing-slash folding, no
/// percent-decoding, no case folding.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, HashMap<Method, HandlerFunc>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Stores `handler` under (path, method), replacing and returning any
    /// handler already registered for that pair.
    pub fn insert(&mut self, method: Method, path: &str, handler: HandlerFunc) -> Option<HandlerFunc> {
        self.routes
            .entry(path.to_string())
            .or_default()
            .insert(method, handler)
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        let Some(methods) = self.routes.get(path) else {
            return Lookup::NotFound;
        };
        match methods.get(method) {
            Some(handler) => Lookup::Matched(handler),
            None => Lookup::MethodNotAllowed {
                allowed: Self::sorted(methods),
            },
        }
    }

    /// Methods registered for `path`, sorted by token.
    pub fn methods_for(&self, path: &str) -> Vec<&Method> {
        self.routes.get(path).map(Self::sorted).unwrap_or_default()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Number of (method, path) entries.
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sorted(methods: &HashMap<Method, HandlerFunc>) -> Vec<&Method> {
        let mut allowed: Vec<&Method> = methods.keys().collect();
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }
}
