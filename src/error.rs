use std::io;

/// Errors raised while configuring a router or running the bundled server.
///
/// Routing misses are not errors: they are answered with 404/405 by the
/// dispatcher and never surface here.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A registration used a method token that is not one or more uppercase ASCII letters.
    #[error("HTTP method {0:?} is not valid")]
    InvalidMethod(String),

    /// A registration supplied no handlers at all.
    #[error("no handlers supplied for {method} {path}")]
    EmptyChain { method: String, path: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The transport could not make sense of an inbound request.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl Error {
    /// Configuration errors must abort setup; everything else is a runtime condition.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidMethod(_) | Error::EmptyChain { .. } | Error::Config(_) | Error::ConfigParse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
