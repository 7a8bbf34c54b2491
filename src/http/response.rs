//! HTTP response building module
//!
//! Provides builders for the handful of statuses a static file server needs.
//! Cross-origin isolation headers are not set here; see [`super::isolation`].

use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use std::io;
use std::time::SystemTime;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

const NOT_FOUND_BODY: &str = "404 Not Found";
const METHOD_NOT_ALLOWED_BODY: &str = "405 Method Not Allowed";
const INTERNAL_ERROR_BODY: &str = "500 Internal Server Error";

/// Chunk size for streamed file bodies
const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Body of every response: a buffer, or a file streamed in chunks
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Stream `file` from its current position to EOF
pub fn file_body(file: File) -> ResponseBody {
    StreamBody::new(ReaderStream::with_capacity(file, FILE_CHUNK_SIZE).map_ok(Frame::data))
        .boxed_unsync()
}

/// Build 200 response carrying a file's contents
///
/// `content_length` is the file size even when `body` is empty (HEAD).
pub fn build_file_response(
    body: ResponseBody,
    content_length: u64,
    content_type: &str,
    last_modified: Option<SystemTime>,
) -> Response<ResponseBody> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length);

    if let Some(modified) = last_modified {
        builder = builder.header(header::LAST_MODIFIED, http_date(modified));
    }

    builder.body(body).unwrap_or_else(|e| {
        log_build_error("200", &e);
        build_500_response()
    })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = content.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(header::CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(empty_body())
        })
}

/// Build 301 redirect, used to add the trailing slash to directory URLs
pub fn build_redirect_response(location: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, location)
        .header(header::CONTENT_LENGTH, 0)
        .body(empty_body())
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            build_500_response()
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut resp = build_text_response(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY);
    resp.headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
    resp
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<ResponseBody> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
}

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

fn build_text_response(status: StatusCode, message: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CONTENT_LENGTH, message.len())
        .body(full_body(message))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut resp = Response::new(full_body(message));
            *resp.status_mut() = status;
            resp
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
