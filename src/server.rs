//! A small HTTP/1.1 transport for a [`Router`].
//!
//! One request per connection, `Content-Length` bodies only, no TLS. The
//! router is moved behind an `Arc` when the server is built, so the route
//! table cannot change while requests are being served.
//!
//! # Examples
//!
//! ```no_run
//! use waypost::{Router, Routes, Server, ServerConfig};
//!
//! let mut router = Router::new();
//! router.get("/", |ctx| ctx.text(200, "hello"));
//!
//! Server::new(router, ServerConfig::default()).listen().unwrap();
//! ```

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::http::{reason_phrase, Body, Method, Request, ResponseWriter};
use crate::router::Router;
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub struct Server {
    router: Arc<Router>,
    config: Arc<ServerConfig>,
}

impl Server {
    pub fn new(router: Router, config: ServerConfig) -> Self {
        Self {
            router: Arc::new(router),
            config: Arc::new(config),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Validates the server settings and binds the listener.
    pub async fn bind(self) -> Result<Listening> {
        self.config.validate()?;
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!(
            addr = %listener.local_addr()?,
            routes = self.router.routes().len(),
            max_connections = self.config.max_connections,
            "listening"
        );
        Ok(Listening {
            listener,
            router: self.router,
            config: self.config,
        })
    }

    /// Blocks the current thread on a fresh runtime and serves forever.
    pub fn listen(self) -> Result<()> {
        let runtime = Runtime::new()?;
        runtime.block_on(async { self.bind().await?.serve().await })
    }
}

/// A bound listener that has not started accepting yet.
pub struct Listening {
    listener: TcpListener,
    router: Arc<Router>,
    config: Arc<ServerConfig>,
}

impl Listening {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn serve(self) -> Result<()> {
        let slots = Arc::new(Semaphore::new(self.config.max_connections));
        loop {
            let permit = Arc::clone(&slots)
                .acquire_owned()
                .await
                .map_err(|_| Error::Io(io::Error::new(ErrorKind::Other, "connection limiter closed")))?;

            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let router = Arc::clone(&self.router);
                    let config = Arc::clone(&self.config);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, &router, &config).await {
                            warn!(%peer, error = %err, "connection error");
                        }
                        drop(permit);
                    });
                }
                Err(err) => warn!(error = %err, "accept failed"),
            }
        }
    }
}

enum HeadLine {
    Complete,
    Eof,
    TooLarge,
}

/// Reads one line of the request head, charging it against `budget`.
async fn read_head_line<R>(reader: &mut R, budget: &mut usize, line: &mut String) -> Result<HeadLine>
where
    R: AsyncBufRead + Unpin,
{
    let mut limited = (&mut *reader).take(*budget as u64);
    let read = limited.read_line(line).await?;
    *budget -= read;
    if line.ends_with('\n') {
        Ok(HeadLine::Complete)
    } else if *budget == 0 {
        Ok(HeadLine::TooLarge)
    } else {
        Ok(HeadLine::Eof)
    }
}

enum Inbound {
    Request(Request),
    Reject(u16, &'static str),
    Closed,
}

async fn handle_connection<S>(mut stream: S, router: &Router, config: &ServerConfig) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let read = {
        let mut reader = BufReader::new(&mut stream);
        tokio::time::timeout(config.read_timeout(), read_request(&mut reader, config)).await
    };
    let inbound = match read {
        Ok(inbound) => inbound?,
        Err(_) => Inbound::Reject(408, "request timeout"),
    };

    let mut writer = ResponseWriter::new();
    match inbound {
        Inbound::Closed => return Ok(()),
        Inbound::Reject(status, message) => {
            debug!(status, message, "rejected request");
            writer.write_error(status, message);
            write_response(&mut stream, &writer, false).await?;
        }
        Inbound::Request(request) => {
            let started = Instant::now();
            let method = request.method.clone();
            let path = request.path.clone();
            let outcome = router.serve(request, &mut writer);
            info!(
                method = %method,
                path = %path,
                status = writer.status(),
                outcome = ?outcome,
                elapsed_us = started.elapsed().as_micros() as u64,
                "handled"
            );
            write_response(&mut stream, &writer, method == Method::HEAD).await?;
        }
    }
    Ok(())
}

async fn read_request<R>(reader: &mut R, config: &ServerConfig) -> Result<Inbound>
where
    R: AsyncBufRead + Unpin,
{
    let mut budget = config.max_header_bytes;
    let mut request_line = String::new();
    match read_head_line(reader, &mut budget, &mut request_line).await? {
        HeadLine::Complete => {}
        HeadLine::TooLarge => return Ok(Inbound::Reject(431, "request header fields too large")),
        HeadLine::Eof => return Ok(Inbound::Closed),
    }

    let mut parts = request_line.trim_end().split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version)) if parts.next().is_none() => (method, target, version),
        _ => return Ok(Inbound::Reject(400, "malformed request line")),
    };
    if !version.starts_with("HTTP/") {
        return Ok(Inbound::Reject(400, "malformed request line"));
    }

    let mut request = Request::new(Method::from_wire(method), target);
    loop {
        let mut line = String::new();
        match read_head_line(reader, &mut budget, &mut line).await? {
            HeadLine::Complete => {}
            HeadLine::TooLarge => return Ok(Inbound::Reject(431, "request header fields too large")),
            HeadLine::Eof => return Ok(Inbound::Closed),
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name.trim().to_lowercase(), value.trim()),
            None => return Ok(Inbound::Reject(400, "malformed header line")),
        };
        match request.headers.get_mut(&name) {
            Some(existing) if name == "content-length" => {
                if existing.as_str() != value {
                    return Ok(Inbound::Reject(400, "conflicting content-length"));
                }
            }
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => {
                request.headers.insert(name, value.to_string());
            }
        }
    }

    if request.headers.contains_key("transfer-encoding") {
        return Ok(Inbound::Reject(501, "transfer-encoding is not supported"));
    }

    let length = match request.headers.get("content-length") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(length) => length,
            Err(_) => return Ok(Inbound::Reject(400, "invalid content-length")),
        },
        None => 0,
    };
    if length > config.max_body_bytes {
        return Ok(Inbound::Reject(413, "request body too large"));
    }

    let mut data = vec![0; length];
    reader.read_exact(&mut data).await.map_err(|err| {
        if err.kind() == ErrorKind::UnexpectedEof {
            Error::MalformedRequest("body shorter than content-length".to_string())
        } else {
            Error::Io(err)
        }
    })?;
    let content_type = request
        .headers
        .get("content-type")
        .cloned()
        .unwrap_or_default();
    request.body = Body::from_bytes(&content_type, data);
    Ok(Inbound::Request(request))
}

async fn write_response<W>(stream: &mut W, writer: &ResponseWriter, head_only: bool) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let status = writer.status();
    let mut head = format!("HTTP/1.1 {} {}\r\n", status, reason_phrase(status));
    for (name, value) in writer.headers() {
        if name.eq_ignore_ascii_case("content-length") || name.eq_ignore_ascii_case("connection") {
            continue;
        }
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    if writer.header("date").is_none() {
        head.push_str(&format!("Date: {}\r\n", httpdate::fmt_http_date(SystemTime::now())));
    }
    head.push_str(&format!("Content-Length: {}\r\n", writer.body().len()));
    head.push_str("Connection: close\r\n\r\n");

    stream.write_all(head.as_bytes()).await?;
    if !head_only {
        stream.write_all(writer.body()).await?;
    }
    stream.flush().await?;
    Ok(())
}
