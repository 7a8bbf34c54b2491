//! Request handling entry point
//!
//! Validates the method, hands the request to the static file service, then
//! decorates whatever came back with the isolation and `Server` headers and
//! writes the access log line.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, isolation, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) URI path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling
///
/// Never fails: every outcome, including missing and unreadable files, is
/// an HTTP response.
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();

    let response = route_request(&req, &state).await;
    let response = decorate(response, &state.config.http.server_name);

    if state.config.logging.access_log {
        let entry = AccessLogEntry::from_exchange(&req, &response, peer_addr, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request<B>(req: &Request<B>, state: &AppState) -> Response<ResponseBody> {
    let method = req.method();
    if let Some(resp) = check_http_method(method) {
        return resp;
    }

    let ctx = RequestContext {
        path: req.uri().path(),
        query: req.uri().query(),
        is_head: method == Method::HEAD,
    };

    static_files::serve(&ctx, state).await
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Headers every response carries regardless of status
fn decorate(response: Response<ResponseBody>, server_name: &str) -> Response<ResponseBody> {
    let mut response = isolation::apply(response);
    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert(header::SERVER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::StatusCode;

    const PEER: &str = "127.0.0.1:40000";

    fn site() -> (tempfile::TempDir, Arc<AppState>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Hi</h1>").unwrap();
        std::fs::write(dir.path().join("app.wasm"), b"\0asm\x01\0\0\0").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs").join("guide.txt"), "read me").unwrap();

        let mut config = Config::default();
        config.server.root = dir.path().to_path_buf();
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config).unwrap());
        (dir, state)
    }

    async fn send(state: &Arc<AppState>, method: &str, uri: &str) -> Response<ResponseBody> {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        handle_request(req, PEER.parse().unwrap(), Arc::clone(state))
            .await
            .unwrap()
    }

    async fn body_bytes(resp: Response<ResponseBody>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn assert_isolated(resp: &Response<ResponseBody>) {
        assert_eq!(
            resp.headers()["cross-origin-opener-policy"],
            "same-origin",
            "status {}",
            resp.status()
        );
        assert_eq!(
            resp.headers()["cross-origin-embedder-policy"],
            "require-corp",
            "status {}",
            resp.status()
        );
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let (_dir, state) = site();
        let resp = send(&state, "GET", "/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_isolated(&resp);
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        assert!(resp.headers()["server"]
            .to_str()
            .unwrap()
            .starts_with("coi-serve/"));
        assert_eq!(body_bytes(resp).await.as_ref(), b"<h1>Hi</h1>");
    }

    #[tokio::test]
    async fn test_wasm_content_type() {
        let (_dir, state) = site();
        let resp = send(&state, "GET", "/app.wasm").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_isolated(&resp);
        assert_eq!(resp.headers()["content-type"], "application/wasm");
        assert!(resp.headers().contains_key("last-modified"));
        assert_eq!(body_bytes(resp).await.as_ref(), b"\0asm\x01\0\0\0");
    }

    #[tokio::test]
    async fn test_missing_file_is_404_and_isolated() {
        let (_dir, state) = site();
        let resp = send(&state, "GET", "/missing.txt").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_isolated(&resp);
    }

    #[tokio::test]
    async fn test_traversal_does_not_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("site")).unwrap();
        std::fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

        let mut config = Config::default();
        config.server.root = dir.path().join("site");
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config).unwrap());

        for uri in [
            "/../secret.txt",
            "/%2e%2e/secret.txt",
            "/..%2fsecret.txt",
            "/../../../../../../etc/passwd",
        ] {
            let resp = send(&state, "GET", uri).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
            assert_isolated(&resp);
            assert_eq!(body_bytes(resp).await.as_ref(), b"404 Not Found");
        }
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let (_dir, state) = site();
        let resp = send(&state, "GET", "/docs?lang=en").await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["location"], "/docs/?lang=en");
        assert_isolated(&resp);
    }

    #[tokio::test]
    async fn test_redirect_cannot_point_at_another_host() {
        let (dir, state) = site();
        std::fs::create_dir(dir.path().join("evil.example")).unwrap();

        for uri in ["//evil.example", "///evil.example?x=1"] {
            let resp = send(&state, "GET", uri).await;
            assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY, "{uri}");
            let location = resp.headers()["location"].to_str().unwrap();
            assert!(location.starts_with("/evil.example/"), "{uri} -> {location}");
            assert_isolated(&resp);
        }
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let (_dir, state) = site();
        let resp = send(&state, "GET", "/docs/").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_isolated(&resp);
        let body = body_bytes(resp).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("<a href=\"guide.txt\">guide.txt</a>"));
    }

    #[tokio::test]
    async fn test_directory_listing_disabled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        let mut config = Config::default();
        config.server.root = dir.path().to_path_buf();
        config.http.directory_listing = false;
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config).unwrap());

        let resp = send(&state, "GET", "/empty/").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_isolated(&resp);
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_404() {
        let (_dir, state) = site();
        for uri in ["/app.wasm/", "/app.wasm%2F", "/app.wasm%2f"] {
            let resp = send(&state, "GET", uri).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let (_dir, state) = site();
        let resp = send(&state, "HEAD", "/docs/guide.txt").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_isolated(&resp);
        assert_eq!(resp.headers()["content-length"], "7");
        assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_are_405() {
        let (_dir, state) = site();
        for method in ["POST", "PUT", "DELETE", "OPTIONS"] {
            let resp = send(&state, method, "/index.html").await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(resp.headers()["allow"], "GET, HEAD");
            assert_isolated(&resp);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_500() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, state) = site();
        let locked = dir.path().join("locked.bin");
        std::fs::write(&locked, b"secret").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can read regardless of mode bits
        if std::fs::read(&locked).is_ok() {
            return;
        }

        let resp = send(&state, "GET", "/locked.bin").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_isolated(&resp);
        assert_eq!(body_bytes(resp).await.as_ref(), b"500 Internal Server Error");
    }
}
