//! Per-request state handed to every unit of a handler chain.
//!
//! A [`Context`] is built by the dispatcher once a route matches and is
//! dropped as soon as the chain returns. It owns the inbound [`Request`],
//! borrows the transport's [`ResponseWriter`], and carries a key/value store
//! that lives exactly as long as the request.

use crate::http::{parse_urlencoded, Body, Method, Request, ResponseWriter};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::error;

type Values = HashMap<String, Vec<String>>;

pub struct Context<'w> {
    request: Request,
    writer: &'w mut ResponseWriter,
    keys: HashMap<String, Value>,
    query_cache: Option<Values>,
    form_cache: Option<Values>,
}

impl<'w> Context<'w> {
    pub fn new(request: Request, writer: &'w mut ResponseWriter) -> Self {
        Self {
            request,
            writer,
            keys: HashMap::new(),
            query_cache: None,
            form_cache: None,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn path(&self) -> &str {
        &self.request.path
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.get_header(name)
    }

    pub fn body(&self) -> &Body {
        &self.request.body
    }

    pub fn writer(&self) -> &ResponseWriter {
        &*self.writer
    }

    pub fn writer_mut(&mut self) -> &mut ResponseWriter {
        &mut *self.writer
    }

    // Query and form access

    /// First value of a query parameter. The query string is parsed on first use.
    pub fn query(&mut self, key: &str) -> Option<&str> {
        self.query_values()
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn query_all(&mut self, key: &str) -> &[String] {
        self.query_values()
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value of a urlencoded body field. Only POST, PUT and PATCH bodies
    /// are considered.
    pub fn post_form(&mut self, key: &str) -> Option<&str> {
        self.form_values()
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Body field if present, otherwise the query parameter of the same name.
    pub fn form_value(&mut self, key: &str) -> Option<&str> {
        self.form_values();
        self.query_values();
        let from_body = self
            .form_cache
            .as_ref()
            .and_then(|values| values.get(key))
            .and_then(|values| values.first());
        from_body
            .or_else(|| {
                self.query_cache
                    .as_ref()
                    .and_then(|values| values.get(key))
                    .and_then(|values| values.first())
            })
            .map(String::as_str)
    }

    fn query_values(&mut self) -> &Values {
        let raw = &self.request.query;
        self.query_cache.get_or_insert_with(|| parse_urlencoded(raw))
    }

    fn form_values(&mut self) -> &Values {
        let request = &self.request;
        self.form_cache.get_or_insert_with(|| {
            if request.method.carries_form() && request.body.is_urlencoded_form() {
                parse_urlencoded(&request.body.as_string())
            } else {
                Values::new()
            }
        })
    }

    // Response writers

    pub fn set_header<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.writer.set_header(name, value);
        self
    }

    pub fn status(&mut self, status: u16) -> &mut Self {
        self.writer.write_header(status);
        self
    }

    pub fn write(&mut self, bytes: &[u8]) -> &mut Self {
        self.writer.write(bytes);
        self
    }

    pub fn text<T: AsRef<str>>(&mut self, status: u16, body: T) {
        self.writer.set_header("Content-Type", "text/plain; charset=utf-8");
        self.writer.write_header(status);
        self.writer.write(body.as_ref().as_bytes());
    }

    /// Serializes `value` as the response body with `Content-Type: application/json`.
    ///
    /// If serialization fails nothing from `value` is written; a 500 error body
    /// is written instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.writer.set_header("Content-Type", "application/json");
                self.writer.write_header(status);
                self.writer.write(&body);
            }
            Err(err) => {
                error!(path = %self.request.path, error = %err, "failed to encode JSON response");
                self.error(500, "failed to encode response body");
            }
        }
    }

    /// Writes `{"error": "<message>"}` with the given status.
    pub fn error<M: AsRef<str>>(&mut self, status: u16, message: M) {
        self.writer.write_error(status, message.as_ref());
    }

    // Request-scoped store

    pub fn set<T>(&mut self, key: &str, value: T)
    where
        T: Serialize,
    {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.keys.insert(key.to_string(), value);
            }
            Err(err) => error!(key, error = %err, "failed to store context value"),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.keys.get(key)
    }

    pub fn get_typed<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.keys
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}
