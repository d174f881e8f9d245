use tracing::warn;

/// Outbound half of a request exchange.
///
/// Writes are single-pass: the first status write commits the status and
/// headers, later status writes are ignored, and body writes only append.
/// Writing body bytes before any status commits `200`.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> ResponseWriter {
        ResponseWriter::default()
    }

    /// Sets a header, replacing any value with the same (case-insensitive) name.
    /// Returns `false` when the headers were already committed, or when the
    /// name or value contains a line break.
    pub fn set_header<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> bool {
        let (name, value) = (name.as_ref(), value.as_ref());
        if let Some(status) = self.status {
            warn!(header = name, status, "header set after the response was committed; ignored");
            return false;
        }
        if has_line_break(name) || has_line_break(value) {
            warn!(header = ?name, "header contains CR or LF; ignored");
            return false;
        }
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
        true
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Commits the status. Only the first call has any effect.
    pub fn write_header(&mut self, status: u16) -> bool {
        match self.status {
            Some(committed) => {
                warn!(committed, ignored = status, "superfluous status write");
                false
            }
            None => {
                self.status = Some(status);
                true
            }
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        if self.status.is_none() {
            self.status = Some(200);
        }
        self.body.extend_from_slice(bytes);
    }

    /// Writes the standard error shape, `{"error": "<message>"}`, as JSON.
    pub fn write_error(&mut self, status: u16, message: &str) {
        let body = serde_json::json!({ "error": message }).to_string();
        self.set_header("Content-Type", "application/json");
        self.write_header(status);
        self.write(body.as_bytes());
    }

    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    /// The committed status, or `200` if the handler never wrote one.
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

fn has_line_break(text: &str) -> bool {
    text.contains(|c: char| c == '\r' || c == '\n')
}

/// Canonical reason phrase for the status codes this crate emits or is likely to see.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        411 => "Length Required",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}
