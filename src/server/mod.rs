//! Local development backend.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that speaks the same API
//! the dashboard consumes:
//! - `GET  /health`
//! - `POST /api/auth/login`, `POST /api/auth/verify`
//! - `GET  /api/analytics`, `GET /api/analytics/type?type=<tag>`
//!
//! Launched via `fresherpaint serve` (default: `http://127.0.0.1:8080`).

mod api;
pub mod datasets;

use std::io::{Cursor, Read};
use std::net::SocketAddr;

use anyhow::Result;
use chrono::Utc;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::config::schema::ServerConfig;
use crate::events::{Event, EventKind, EventLog};

pub use api::Backend;

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Handler result, turned into a `tiny_http` response at the edge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Reply {
    Json(u16, serde_json::Value),
    Text(u16, &'static str),
    Empty(u16),
}

impl Reply {
    pub(crate) fn status(&self) -> u16 {
        match self {
            Self::Json(status, _) | Self::Text(status, _) | Self::Empty(status) => *status,
        }
    }

    fn into_response(self) -> HttpResponse {
        let response = match self {
            Self::Json(status, body) => with_header(
                Response::from_data(body.to_string().into_bytes())
                    .with_status_code(StatusCode(status)),
                "Content-Type",
                "application/json; charset=utf-8",
            ),
            Self::Text(status, body) => with_header(
                Response::from_data(format!("{body}\n").into_bytes())
                    .with_status_code(StatusCode(status)),
                "Content-Type",
                "text/plain; charset=utf-8",
            ),
            Self::Empty(status) => {
                Response::from_data(Vec::new()).with_status_code(StatusCode(status))
            }
        };
        with_cors(response)
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// A bound, not yet running, development backend.
pub struct DevServer {
    server: Server,
    backend: Backend,
    events: EventLog,
}

impl DevServer {
    /// Bind to `addr` and generate a fresh set of datasets.
    pub fn bind(addr: &str, config: &ServerConfig, events: EventLog) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;
        let datasets = datasets::generate(&mut rand::thread_rng(), Utc::now());
        Ok(Self {
            server,
            backend: Backend::new(config, datasets),
            events,
        })
    }

    /// Bound address; useful when binding to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until the process exits.
    ///
    /// Blocks the current thread. Requests are handled sequentially; an
    /// error answering one request never stops the loop.
    pub fn run(mut self) -> Result<()> {
        for request in self.server.incoming_requests() {
            handle(&mut self.backend, &self.events, request);
        }
        Ok(())
    }
}

fn handle(backend: &mut Backend, events: &EventLog, mut request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let auth = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_string());

    // Read body up-front for methods that carry one
    let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
        let mut buf = String::new();
        let _ = request.as_reader().read_to_string(&mut buf);
        Some(buf)
    } else {
        None
    };

    let reply = dispatch(backend, &method, &url, auth.as_deref(), body.as_deref());
    let status = reply.status();
    let _ = request.respond(reply.into_response());

    // Brief access log
    println!(
        "{} {} {} {}",
        method,
        url,
        status,
        chrono::Local::now().format("%H:%M:%S")
    );
    events.record(
        Event::new(EventKind::ServerRequest)
            .message(format!("{method} {url}"))
            .status(status),
    );
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub(crate) fn dispatch(
    backend: &mut Backend,
    method: &Method,
    url: &str,
    auth: Option<&str>,
    body: Option<&str>,
) -> Reply {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    if *method == Method::Options {
        return Reply::Empty(200);
    }

    match path {
        "/health" => match method {
            Method::Get => api::health(),
            _ => method_not_allowed(),
        },
        "/api/auth/login" => match method {
            Method::Post => backend.login(body.unwrap_or_default()),
            _ => method_not_allowed(),
        },
        "/api/auth/verify" => backend.authorized(auth, |_| match method {
            Method::Post | Method::Get => api::verified(),
            _ => method_not_allowed(),
        }),
        "/api/analytics" => backend.authorized(auth, |b| match method {
            Method::Get => b.analytics(None),
            _ => method_not_allowed(),
        }),
        "/api/analytics/type" => backend.authorized(auth, |b| match method {
            Method::Get => match query_param(url, "type") {
                Some(tag) if !tag.is_empty() => b.analytics(Some(tag.as_str())),
                _ => Reply::Text(400, "Missing type parameter"),
            },
            _ => method_not_allowed(),
        }),
        _ => not_found(),
    }
}

/// Decoded value of `key` in the URL's query string.
fn query_param(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(field: &str, value: &str) -> Option<Header> {
    Header::from_bytes(field.as_bytes(), value.as_bytes()).ok()
}

fn with_header(response: HttpResponse, field: &str, value: &str) -> HttpResponse {
    match header(field, value) {
        Some(h) => response.with_header(h),
        None => response,
    }
}

fn with_cors(response: HttpResponse) -> HttpResponse {
    let response = with_header(response, "Access-Control-Allow-Origin", "*");
    let response = with_header(
        response,
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, DELETE, OPTIONS",
    );
    with_header(
        response,
        "Access-Control-Allow-Headers",
        "Content-Type, Authorization",
    )
}

fn method_not_allowed() -> Reply {
    Reply::Text(405, "Method not allowed")
}

/// 404 response.
fn not_found() -> Reply {
    Reply::Text(404, "404 page not found")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
