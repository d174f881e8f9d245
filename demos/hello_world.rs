//! A minimal "Hello, World!" server using Waypost
//!
//! This example demonstrates how to create a basic server that responds with
//! "Hello, World!" on `/`.

use waypost::{logging, LoggingConfig, Router, Routes, Server, ServerConfig};

fn main() {
    logging::init(&LoggingConfig::default());

    let mut router = Router::new();

    // Add a route that handles GET requests to "/"
    router.get("/", |ctx| ctx.text(200, "Hello, World!"));

    Server::new(router, ServerConfig::default())
        .listen()
        .expect("Server failed to start");
}
