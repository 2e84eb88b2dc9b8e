//! The embedded fallback pixel.
//!
//! A fixed 1x1 transparent GIF served whenever no remote image is configured
//! or any step of request handling fails. Constant for the process lifetime.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// 1x1 transparent GIF89a, 43 bytes.
pub const PIXEL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x01, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3B,
];

/// Content type of the fallback pixel.
pub const PIXEL_CONTENT_TYPE: &str = "image/gif";

/// Cache-control value forbidding any caching of tracking responses.
pub const NO_CACHE: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Builds a complete pixel response with the given status code.
///
/// The body is always the embedded 1x1 GIF with aggressive no-cache headers
/// so that every view reaches the server.
pub fn pixel_response(status: StatusCode) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, PIXEL_CONTENT_TYPE),
            (header::CACHE_CONTROL, NO_CACHE),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        PIXEL_GIF,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_is_a_gif89a() {
        assert_eq!(&PIXEL_GIF[..6], b"GIF89a");
        assert_eq!(PIXEL_GIF.len(), 43);
        // 1x1 logical screen
        assert_eq!(&PIXEL_GIF[6..10], &[0x01, 0x00, 0x01, 0x00]);
        // GIF trailer
        assert_eq!(PIXEL_GIF[42], 0x3B);
    }

    #[test]
    fn pixel_response_carries_no_cache_headers() {
        let response = pixel_response(StatusCode::OK);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), PIXEL_CONTENT_TYPE);
        assert_eq!(response.headers().get("cache-control").unwrap(), NO_CACHE);
        assert_eq!(response.headers().get("pragma").unwrap(), "no-cache");
        assert_eq!(response.headers().get("expires").unwrap(), "0");
    }
}
