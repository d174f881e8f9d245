//! Middleware example for Waypost
//!
//! This example demonstrates how to attach middleware for:
//! - Logging requests
//! - Security headers
//! - Authentication
//!
//! Every unit in a chain runs. The auth check below writes a 401 and then
//! marks the context, so the handler looks at the mark before doing work.

use waypost::middleware::{RequestLogger, SecurityConfig, SecurityHeaders};
use waypost::{logging, Context, LoggingConfig, Router, Routes, Server, ServerConfig};

fn require_bearer(ctx: &mut Context<'_>) {
    let authenticated = ctx
        .header("authorization")
        .map_or(false, |token| token.starts_with("Bearer "));
    ctx.set("authenticated", authenticated);
    if !authenticated {
        ctx.error(401, "Authentication required");
    }
}

fn main() {
    logging::init(&LoggingConfig::default());

    let mut router = Router::new();

    // Apply logger and security headers to every route registered below
    router
        .middleware(RequestLogger::new())
        .middleware(SecurityHeaders::new(SecurityConfig::default()));

    // Public route - no auth required
    router.get("/public", |ctx| ctx.text(200, "This is a public endpoint"));

    // Protected routes
    {
        let mut admin = router.group("/admin");
        admin
            .middleware(RequestLogger::labelled("admin"))
            .middleware_fn(require_bearer)
            .get("/stats", |ctx| {
                if ctx.get_typed::<bool>("authenticated") != Some(true) {
                    return;
                }
                ctx.json(200, &waypost::json!({ "users": 42, "uptime": "3d" }));
            });
    }

    Server::new(router, ServerConfig::default())
        .listen()
        .expect("Server failed to start");
}
