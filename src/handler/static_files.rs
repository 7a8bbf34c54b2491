//! Static file serving module
//!
//! Serves files, directory index files and directory listings from the
//! serving root.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::resolve::{self, Target};
use crate::handler::router::RequestContext;
use crate::http::{self, ResponseBody};
use crate::http::response::{build_file_response, empty_body, file_body};
use crate::logger;
use hyper::Response;
use std::path::Path;
use tokio::fs;

/// Serve whatever the request path resolves to under the serving root
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    match resolve::resolve(&state.root, ctx.path).await {
        Target::Directory(dir) => serve_directory(ctx, state, &dir).await,
        // A trailing slash names a directory; a file under it does not exist
        Target::File(_) if resolve::names_directory(ctx.path) => http::build_404_response(),
        Target::File(path) => serve_file(ctx, state, &path).await,
        Target::NotFound => http::build_404_response(),
    }
}

/// Serve a directory: redirect to the slash form, then index file, then listing
async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    dir: &Path,
) -> Response<ResponseBody> {
    if !ctx.path.ends_with('/') {
        return http::build_redirect_response(&redirect_location(ctx.path, ctx.query));
    }

    for index_file in &state.config.http.index_files {
        let candidate = dir.join(index_file);
        if resolve::confine(&state.root, &candidate).await.is_none() {
            continue;
        }
        if let Ok(metadata) = fs::metadata(&candidate).await {
            if metadata.is_file() {
                return serve_file(ctx, state, &candidate).await;
            }
        }
    }

    if !state.config.http.directory_listing {
        return http::build_404_response();
    }

    match listing::render_listing(dir, ctx.path).await {
        Ok(html) => http::build_html_response(html, ctx.is_head),
        Err(e) => {
            logger::log_warning(&format!(
                "Cannot list directory '{}': {e}",
                dir.display()
            ));
            http::build_404_response()
        }
    }
}

/// `Location` for the slash form of a directory URL.
///
/// Leading slashes collapse to one: `//host/` would be read by browsers as
/// a network-path reference to another host.
fn redirect_location(path: &str, query: Option<&str>) -> String {
    let path = format!("/{}/", path.trim_start_matches('/'));
    match query {
        Some(query) => format!("{path}?{query}"),
        None => path,
    }
}

/// Open a file and build the 200 response with a streamed body.
///
/// Open and stat failures become 500; a read error mid-body aborts the
/// connection since the status line has already gone out.
async fn serve_file(
    ctx: &RequestContext<'_>,
    state: &AppState,
    path: &Path,
) -> Response<ResponseBody> {
    let opened = match fs::File::open(path).await {
        Ok(file) => file.metadata().await.map(|metadata| (file, metadata)),
        Err(e) => Err(e),
    };
    let (file, metadata) = match opened {
        Ok(opened) => opened,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ));
            return http::build_500_response();
        }
    };

    let body = if ctx.is_head {
        empty_body()
    } else {
        file_body(file)
    };

    build_file_response(
        body,
        metadata.len(),
        state.mime.content_type(path),
        metadata.modified().ok(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_location() {
        assert_eq!(redirect_location("/docs", None), "/docs/");
        assert_eq!(redirect_location("/docs", Some("v=1")), "/docs/?v=1");
        assert_eq!(redirect_location("//evil.example", None), "/evil.example/");
        assert_eq!(redirect_location("///a/b", Some("x")), "/a/b/?x");
    }
}
