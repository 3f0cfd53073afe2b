//! Development server for the browser shell
//!
//! Serves `www/` (the page) and `pkg/` (wasm-pack output) over HTTP:
//!
//!   wasm-pack build --target web && cargo run --bin serve [port]

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process;
use tiny_http::{Header, Request, Response, Server};

const DEFAULT_PORT: u16 = 8080;
const SITE_DIR: &str = "www";
const PKG_PREFIX: &str = "pkg/";

fn main() {
    let port = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = format!("0.0.0.0:{}", port);
    let server = match Server::http(&addr) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("serve: cannot listen on {}: {}", addr, e);
            process::exit(1);
        }
    };

    println!("osrs-shell dev server: http://localhost:{}", port);

    for request in server.incoming_requests() {
        if let Err(e) = handle(request) {
            eprintln!("serve: {}", e);
        }
    }
}

fn handle(request: Request) -> std::io::Result<()> {
    let response = match resolve(request.url()) {
        Some(path) => serve_file(&path),
        None => not_found(),
    };
    request.respond(response)
}

/// Map a URL to a file: `/pkg/...` from the crate root, everything else from `www/`
fn resolve(url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let path = path.trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    let relative = Path::new(path);
    // No escaping the served directories
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    if path.starts_with(PKG_PREFIX) {
        Some(relative.to_path_buf())
    } else {
        Some(Path::new(SITE_DIR).join(relative))
    }
}

fn serve_file(path: &Path) -> Response<std::io::Cursor<Vec<u8>>> {
    match fs::read(path) {
        Ok(contents) => {
            let response = Response::from_data(contents);
            match Header::from_bytes("Content-Type", mime_type(path)) {
                Ok(header) => response.with_header(header),
                Err(()) => response,
            }
        }
        Err(_) => not_found(),
    }
}

fn not_found() -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string("404 Not Found").with_status_code(404)
}

fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript",
        Some("wasm") => "application/wasm",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
