//! Cross-origin isolation headers
//!
//! `SharedArrayBuffer` (and with it SQLite's OPFS backend) is only available
//! to pages served with both headers below. They are applied to the final
//! response of every request, after the file-serving handler has run, so
//! redirects and error pages carry them too.

use hyper::header::{HeaderName, HeaderValue};
use hyper::Response;

pub const CROSS_ORIGIN_OPENER_POLICY: &str = "cross-origin-opener-policy";
pub const CROSS_ORIGIN_EMBEDDER_POLICY: &str = "cross-origin-embedder-policy";

pub const SAME_ORIGIN: &str = "same-origin";
pub const REQUIRE_CORP: &str = "require-corp";

/// Set COOP/COEP on `response`, replacing any value already present
pub fn apply<B>(mut response: Response<B>) -> Response<B> {
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static(CROSS_ORIGIN_OPENER_POLICY),
        HeaderValue::from_static(SAME_ORIGIN),
    );
    headers.insert(
        HeaderName::from_static(CROSS_ORIGIN_EMBEDDER_POLICY),
        HeaderValue::from_static(REQUIRE_CORP),
    );
    response
}
