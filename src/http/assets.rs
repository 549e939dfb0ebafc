//! Static asset serving for paths no proxy rule claims.
//!
//! Directory requests resolve to `index.html`. With history fallback on,
//! HTML navigations to missing files get the root `index.html` so that
//! client-side routers can take over.

use std::io;
use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::Response;
use percent_encoding::percent_decode_str;
use tokio::fs;

use crate::http::response::error_response;

const INDEX: &str = "index.html";

/// Serves files from a root directory.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
    history_fallback: bool,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>, history_fallback: bool) -> Self {
        Self {
            root: root.into(),
            history_fallback,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serve the asset for `path`, falling back to `index.html` for HTML
    /// navigations when enabled.
    pub async fn serve(&self, method: &Method, path: &str, headers: &HeaderMap) -> Response {
        if method != Method::GET && method != Method::HEAD {
            return error_response(StatusCode::NOT_FOUND, format!("Cannot {method} {path}"));
        }

        match self.read(path).await {
            Ok((file, content)) => file_response(method, &file, content),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                tracing::warn!(path = %path, "Asset request outside static directory");
                error_response(StatusCode::FORBIDDEN, "Access denied")
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.history_fallback && accepts_html(headers) && !has_extension(path) {
                    let index = self.root.join(INDEX);
                    match fs::read(&index).await {
                        Ok(content) => {
                            tracing::debug!(path = %path, "History fallback to index.html");
                            return file_response(method, &index, content);
                        }
                        Err(e) => tracing::debug!(error = %e, "History fallback unavailable"),
                    }
                }
                error_response(StatusCode::NOT_FOUND, format!("Cannot {method} {path}"))
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Failed to read asset");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read asset")
            }
        }
    }

    async fn read(&self, path: &str) -> io::Result<(PathBuf, Vec<u8>)> {
        let mut file = self.resolve(path)?;
        if fs::metadata(&file).await?.is_dir() {
            file.push(INDEX);
        }

        // Symlinks must not lead outside the root.
        let canonical = fs::canonicalize(&file).await?;
        let canonical_root = fs::canonicalize(&self.root).await?;
        if !canonical.starts_with(&canonical_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "path outside static directory",
            ));
        }

        let content = fs::read(&canonical).await?;
        Ok((file, content))
    }

    /// Map a URL path onto the root, rejecting parent-directory segments.
    ///
    /// Segments are percent-decoded first, so `%2e%2e` is a parent segment
    /// and an encoded separator never splits a segment in two.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let invalid = || io::Error::new(io::ErrorKind::PermissionDenied, "invalid path segment");

        let mut resolved = self.root.clone();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            let segment = percent_decode_str(raw).decode_utf8().map_err(|_| invalid())?;
            if segment.contains(['/', '\\', '\0']) {
                return Err(invalid());
            }

            let mut components = Path::new(segment.as_ref()).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => resolved.push(part),
                (Some(Component::CurDir), None) => {}
                _ => return Err(invalid()),
            }
        }
        Ok(resolved)
    }
}

fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/html") || accept.contains("*/*"))
        .unwrap_or(false)
}

/// Requests for `app.js` style paths are asset lookups, not navigations.
fn has_extension(path: &str) -> bool {
    path.rsplit('/').next().map(|last| last.contains('.')).unwrap_or(false)
}

fn file_response(method: &Method, file: &Path, content: Vec<u8>) -> Response {
    let length = content.len();
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(content)
    };

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(infer_content_type(file)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

fn infer_content_type(file: &Path) -> &'static str {
    let extension = file
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "txt" => "text/plain; charset=utf-8",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}
