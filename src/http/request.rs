use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

lazy_static! {
    static ref METHOD_TOKEN: Regex = Regex::new("^[A-Z]+$").expect("method token pattern");
}

#[derive(Eq, Hash, PartialEq, Clone, Debug)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
    Extension(String),
}

impl Method {
    /// Every method `Routes::any` registers for.
    pub const STANDARD: [Method; 9] = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::HEAD,
        Method::OPTIONS,
        Method::DELETE,
        Method::CONNECT,
        Method::TRACE,
    ];

    /// Parses a method token used for route registration.
    ///
    /// Only tokens made of one or more uppercase ASCII letters are accepted;
    /// anything else is a configuration error.
    pub fn parse(token: &str) -> Result<Method> {
        if !METHOD_TOKEN.is_match(token) {
            return Err(Error::InvalidMethod(token.to_string()));
        }
        Ok(Method::from_wire(token))
    }

    /// Maps a token read off the wire without validating it. Unknown tokens
    /// become extensions so they can still be answered with a 405.
    pub fn from_wire(token: &str) -> Method {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "HEAD" => Method::HEAD,
            "CONNECT" => Method::CONNECT,
            "OPTIONS" => Method::OPTIONS,
            "TRACE" => Method::TRACE,
            "PATCH" => Method::PATCH,
            other => Method::Extension(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
            Method::Extension(token) => token,
        }
    }

    /// Methods whose urlencoded bodies are parsed as form values.
    pub(crate) fn carries_form(&self) -> bool {
        matches!(self, Method::POST | Method::PUT | Method::PATCH)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone)]
pub struct Body {
    pub(crate) content_type: String,
    pub(crate) data: Vec<u8>,
}

impl Body {
    pub fn new() -> Body {
        Body::default()
    }

    pub fn from_string(s: &str) -> Body {
        Body {
            content_type: "text/plain".to_string(),
            data: s.as_bytes().to_vec(),
        }
    }

    pub fn from_bytes(content_type: &str, data: Vec<u8>) -> Body {
        Body {
            content_type: content_type.to_string(),
            data,
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.data).to_string()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn json<T>(&self) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if self.content_type.starts_with("application/json") {
            serde_json::from_slice(&self.data).ok()
        } else {
            None
        }
    }

    pub(crate) fn is_urlencoded_form(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(|media| media.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
            .unwrap_or(false)
    }
}

/// An inbound request as delivered by the transport.
///
/// The path is kept exactly as received; the router never normalizes it.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HashMap<String, String>,
    pub body: Body,
}

impl Request {
    /// Builds a request from a method and a request target such as `/search?q=rust`.
    pub fn new(method: Method, target: &str) -> Request {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        Request {
            method,
            path: path.to_string(),
            query: query.to_string(),
            headers: HashMap::new(),
            body: Body::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Request {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: Body) -> Request {
        self.body = body;
        self
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn get_method(&self) -> &Method {
        &self.method
    }
}

/// Parses `application/x-www-form-urlencoded` text (query strings and form
/// bodies) into a multi-valued map. Pairs that fail to decode are skipped.
pub(crate) fn parse_urlencoded(input: &str) -> HashMap<String, Vec<String>> {
    let mut values: HashMap<String, Vec<String>> = HashMap::new();
    for pair in input.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        let value = decode_component(value);
        if let (Some(key), Some(value)) = (key, value) {
            values.entry(key).or_default().push(value);
        }
    }
    values
}

fn decode_component(raw: &str) -> Option<String> {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw).ok().map(|decoded| decoded.into_owned())
}
