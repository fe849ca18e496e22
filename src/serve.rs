//! Local authoring server.
//!
//! A small `tiny_http` server over the drafts directory, used by a browser
//! editor during writing. Routes:
//!
//! | Method | Path                 | Action                                  |
//! |--------|----------------------|-----------------------------------------|
//! | GET    | `/api/drafts`        | list draft file names                   |
//! | GET    | `/api/drafts/{name}` | `{"content": ...}` of one draft         |
//! | POST   | `/api/save`          | overwrite a draft                       |
//! | POST   | `/api/create`        | create a draft from the template        |
//! | POST   | `/api/publish`       | publish all drafts and reindex          |
//! | GET    | anything else        | static file under the site root         |
//!
//! Requests are handled one at a time on the main thread until Ctrl+C.

use crate::{
    config::SiteConfig,
    log,
    post::{
        builder::{draft_template, today},
        slug::{slugify, validate_slug},
    },
    publish::{PublishReport, is_draft, publish_all},
};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{
    fs,
    io::{self, Read},
    net::{IpAddr, SocketAddr},
    path::{Component, Path},
    sync::Arc,
};
use tiny_http::{Header, Method, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the authoring server. Blocks until Ctrl+C.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    fs::create_dir_all(&config.blog.drafts).with_context(|| {
        format!("Failed to create drafts directory {}", config.blog.drafts.display())
    })?;

    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;
    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_err = None;
    for offset in 0..max_retries.max(1) {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_err.map(|e| e.to_string()).unwrap_or_default()
    ))
}

fn handle_request(mut request: Request, config: &SiteConfig) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();

    let mut body = String::new();
    if method == Method::Post {
        request
            .as_reader()
            .read_to_string(&mut body)
            .context("Failed to read request body")?;
    }

    let reply = route(&method, &url, &body, config);
    log!("serve"; "{} {} {}", method, url, reply.status);

    let mut response = Response::from_data(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes("Content-Type", reply.content_type) {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Routing
// ============================================================================

/// A response, independent of the HTTP transport.
#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: value.to_string().into_bytes(),
        }
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &json!({ "error": message.into() }))
    }

    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain; charset=utf-8",
            body: b"404 Not Found".to_vec(),
        }
    }
}

#[derive(Deserialize)]
struct SaveRequest {
    filename: String,
    content: String,
}

#[derive(Deserialize)]
struct CreateRequest {
    filename: String,
    title: String,
    /// Derived from the title when absent.
    #[serde(default)]
    slug: Option<String>,
}

fn route(method: &Method, url: &str, body: &str, config: &SiteConfig) -> Reply {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (Method::Get, "/api/drafts") => list_drafts(config),
        (Method::Get, p) if p.starts_with("/api/drafts/") => {
            read_draft(&decode(&p["/api/drafts/".len()..]), config)
        }
        (Method::Post, "/api/save") => match serde_json::from_str(body) {
            Ok(req) => save_draft(req, config),
            Err(_) => Reply::error(400, "Invalid JSON"),
        },
        (Method::Post, "/api/create") => match serde_json::from_str(body) {
            Ok(req) => create_draft(req, config),
            Err(_) => Reply::error(400, "Invalid JSON"),
        },
        (Method::Post, "/api/publish") => publish(config),
        (Method::Get | Method::Head, p) => serve_static(&decode(p), config),
        _ => Reply::not_found(),
    }
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| s.to_string())
}

/// A bare file name: no separators, no parent references.
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !name.starts_with('.')
}

fn io_error(err: &io::Error) -> Reply {
    Reply::error(500, err.to_string())
}

// ============================================================================
// API Handlers
// ============================================================================

fn list_drafts(config: &SiteConfig) -> Reply {
    let entries = match fs::read_dir(&config.blog.drafts) {
        Ok(entries) => entries,
        Err(err) => return io_error(&err),
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_draft(path))
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    Reply::json(200, &json!(names))
}

fn read_draft(name: &str, config: &SiteConfig) -> Reply {
    if !is_safe_filename(name) {
        return Reply::error(400, "Invalid filename");
    }

    let path = config.blog.drafts.join(name);
    if !path.is_file() {
        return Reply::error(404, "File not found");
    }
    match fs::read_to_string(&path) {
        Ok(content) => Reply::json(200, &json!({ "content": content })),
        Err(err) => io_error(&err),
    }
}

fn save_draft(req: SaveRequest, config: &SiteConfig) -> Reply {
    if !is_safe_filename(&req.filename) {
        return Reply::error(400, "Invalid filename");
    }

    match fs::write(config.blog.drafts.join(&req.filename), req.content) {
        Ok(()) => Reply::json(200, &json!({ "success": true })),
        Err(err) => io_error(&err),
    }
}

fn create_draft(req: CreateRequest, config: &SiteConfig) -> Reply {
    // the title is written into a line-based frontmatter block
    if req.title.contains(['\r', '\n']) {
        return Reply::error(400, "Title must be a single line");
    }
    let filename = if req.filename.ends_with(".md") {
        req.filename
    } else {
        format!("{}.md", req.filename)
    };
    if !is_safe_filename(&filename) {
        return Reply::error(400, "Invalid filename");
    }

    let slug = match req.slug {
        Some(slug) => match validate_slug(&slug) {
            Ok(()) => slug,
            Err(err) => return Reply::error(400, err.to_string()),
        },
        None => slugify(&req.title),
    };

    let content = draft_template(&req.title, &slug, today(), &config.blog.default_read_time);
    match fs::write(config.blog.drafts.join(&filename), content) {
        Ok(()) => Reply::json(200, &json!({ "success": true, "filename": filename })),
        Err(err) => io_error(&err),
    }
}

fn publish(config: &SiteConfig) -> Reply {
    match publish_all(config) {
        Ok(PublishReport { index: None, .. }) => {
            Reply::error(500, "articles index could not be updated")
        }
        Ok(PublishReport {
            converted,
            skipped,
            index: Some(index),
        }) => Reply::json(
            200,
            &json!({
                "success": true,
                "converted": converted,
                "skipped": skipped,
                "indexed": index.indexed,
            }),
        ),
        Err(err) => Reply::error(500, format!("{err:#}")),
    }
}

// ============================================================================
// Static Preview
// ============================================================================

/// Serve a file under the site root, resolving directories to `index.html`.
fn serve_static(url_path: &str, config: &SiteConfig) -> Reply {
    let request_path = Path::new(url_path.trim_matches('/'));
    let is_clean = request_path
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !is_clean {
        return Reply::not_found();
    }

    let mut local_path = config.get_root().join(request_path);
    if local_path.is_dir() {
        local_path = local_path.join("index.html");
    }
    if !local_path.is_file() {
        return Reply::not_found();
    }

    match fs::read(&local_path) {
        Ok(body) => Reply {
            status: 200,
            content_type: guess_content_type(&local_path),
            body,
        },
        Err(err) => io_error(&err),
    }
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}
