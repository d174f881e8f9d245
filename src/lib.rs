//! # Waypost
//!
//! A small HTTP request router: exact-match routes, prefixed route groups,
//! and middleware chains that run every unit in order.
//!
//! ## Features
//!
//! - Exact (method, path) routing with distinct 404 and 405 outcomes
//! - Route groups with raw path-prefix concatenation and scoped middleware
//! - Fire-all middleware chains sharing one per-request [`Context`]
//! - Context helpers for query/form values and JSON/error responses
//! - A minimal tokio HTTP/1.1 server for running a router end to end
//!
//! ## Quick Start
//!
//! ```no_run
//! use waypost::{Router, Routes, Server, ServerConfig};
//!
//! let mut router = Router::new();
//! router.get("/ping", |ctx| ctx.text(200, "pong"));
//!
//! Server::new(router, ServerConfig::default()).listen().unwrap();
//! ```
//!
//! ## Middleware Usage
//!
//! Middleware is captured when a route is registered, so attach it first.
//! Every unit always runs; a middleware that writes an error does not stop
//! the handler after it.
//!
//! ```
//! use waypost::middleware::{SecurityConfig, SecurityHeaders};
//! use waypost::{Router, Routes};
//!
//! let mut router = Router::new();
//! let mut api = router.group("/api");
//! api.middleware(SecurityHeaders::new(SecurityConfig::default()))
//!     .get("/users", |ctx| ctx.json(200, &["ada", "grace"]));
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod server;

pub use config::{Config, LoggingConfig, RouterConfig, ServerConfig};
pub use context::Context;
pub use error::{Error, Result};
pub use handler::{handler_fn, Handler, HandlerFunc};
pub use http::{Body, Method, Request, ResponseWriter};
pub use middleware::HandlerChain;
pub use router::{Dispatch, Lookup, RouteTable, Router, RouterGroup, Routes};
pub use server::{Listening, Server};

pub extern crate serde_json;
pub use serde_json::{json, Value};
