use crate::context::Context;
use crate::handler::Handler;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub hsts: bool,
    pub xss_protection: bool,
    pub content_type_options: bool,
    pub frame_options: Option<String>,
    pub content_security_policy: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            hsts: true,
            xss_protection: true,
            content_type_options: true,
            frame_options: Some("DENY".to_string()),
            content_security_policy: None,
        }
    }
}

/// Sets the configured security headers. Must run before any unit that
/// commits the response, since headers freeze on the first status write.
#[derive(Clone, Debug)]
pub struct SecurityHeaders {
    config: SecurityConfig,
}

impl SecurityHeaders {
    pub fn new(config: SecurityConfig) -> Self {
        Self { config }
    }
}

impl Handler for SecurityHeaders {
    fn call(&self, ctx: &mut Context<'_>) {
        if self.config.hsts {
            ctx.set_header("Strict-Transport-Security", "max-age=31536000");
        }
        if self.config.xss_protection {
            ctx.set_header("X-XSS-Protection", "1; mode=block");
        }
        if self.config.content_type_options {
            ctx.set_header("X-Content-Type-Options", "nosniff");
        }
        if let Some(ref frame_options) = self.config.frame_options {
            ctx.set_header("X-Frame-Options", frame_options);
        }
        if let Some(ref policy) = self.config.content_security_policy {
            ctx.set_header("Content-Security-Policy", policy);
        }
    }
}
