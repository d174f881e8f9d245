//! Routing example for Waypost
//!
//! This example demonstrates:
//! - Basic routes and method shortcuts
//! - Query and form values
//! - JSON request bodies
//! - Route groups, including nested ones
//!
//! Settings are read from `waypost.toml` when present.

use serde::{Deserialize, Serialize};
use std::path::Path;
use waypost::{handlers, logging, Config, Context, Router, Routes, Server};

#[derive(Serialize, Deserialize)]
struct User {
    name: String,
    role: String,
}

fn create_user(ctx: &mut Context<'_>) {
    match ctx.body().json::<User>() {
        Some(user) => ctx.json(201, &user),
        None => ctx.error(400, "Invalid JSON body"),
    }
}

fn main() {
    let config = if Path::new("waypost.toml").exists() {
        Config::load("waypost.toml").expect("invalid waypost.toml")
    } else {
        Config::default()
    };
    logging::init(&config.logging);

    let mut router = Router::with_config(config.router.clone());

    // Basic GET route
    router.get("/", |ctx| ctx.text(200, "Welcome to the Waypost API server!"));

    // Query parameters: /search?q=rust&page=2
    router.get("/search", |ctx| {
        let q = ctx.query("q").unwrap_or_default().to_string();
        let page = ctx.query("page").unwrap_or("1").to_string();
        ctx.json(200, &waypost::json!({ "query": q, "page": page }));
    });

    // POST request with JSON body
    router.post("/users", create_user);

    // Form values: body first, then query string
    router.put("/profile", |ctx| {
        let name = ctx.form_value("name").unwrap_or("anonymous").to_string();
        ctx.text(200, format!("Updated profile for {}", name));
    });

    // Several methods on one path
    router.match_methods(&["GET", "HEAD"], "/health", |ctx| ctx.text(200, "ok"));

    // Group routes under /api
    {
        let mut api = router.group("/api");
        api.get("/status", |ctx| {
            ctx.json(
                200,
                &waypost::json!({
                    "status": "operational",
                    "version": "1.0.0"
                }),
            )
        });

        let mut v1 = api.group("/v1");
        v1.handle(
            "GET",
            "/items",
            handlers![|ctx| ctx.json(200, &["apple", "pear"])],
        );
    }

    Server::new(router, config.server)
        .listen()
        .expect("Server failed to start");
}
