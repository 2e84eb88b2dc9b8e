//! The signal handler: payload extraction, notification, image response.
//!
//! Request flow for `GET /api/signal/<payload>.gif`:
//! 1. Take the raw path tail; empty tail answers the pixel immediately.
//! 2. Strip a trailing `.gif` (case-insensitive), percent-decode once;
//!    an empty result becomes the sentinel payload `"empty"`.
//! 3. When signature verification is enabled, split off the `~<hex>` suffix
//!    and verify it; a mismatch answers 403 with the pixel body and skips
//!    the notification.
//! 4. Best-effort view notification; failures never affect the response.
//! 5. Answer with the cached remote image when one is configured, the
//!    embedded pixel otherwise. Every failure collapses into a 200 pixel
//!    response so the caller always observes a valid image.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use tracing::{debug, instrument, warn};

use crate::{
    crypto::{validate_signature, SIGNATURE_DELIMITER},
    image::CachedImage,
    pixel::{pixel_response, NO_CACHE},
    server::AppState,
};

/// Route prefix under which signals are received.
pub const SIGNAL_PREFIX: &str = "/api/signal";

/// Sentinel payload used when the path decodes to nothing.
const EMPTY_PAYLOAD: &str = "empty";

/// Handles a tracking-pixel view.
///
/// Never returns an HTTP error: every internal failure terminates in a 200
/// pixel response. The only non-200 outcome is 403 on signature mismatch.
#[instrument(name = "serve_signal", skip_all, fields(path = %uri.path()))]
pub async fn serve_signal(State(state): State<AppState>, uri: Uri) -> Response {
    let raw = uri.path().strip_prefix(SIGNAL_PREFIX).unwrap_or("").trim_start_matches('/');

    if raw.is_empty() {
        debug!("no path segments, answering pixel");
        return pixel_response(StatusCode::OK);
    }

    let decoded = decode_payload(raw);

    let payload = if state.config.require_signature {
        let secret = state.config.signing_secret.as_deref().unwrap_or("");
        match verify_payload(&decoded, secret) {
            Ok(inner) => inner.to_string(),
            Err(reason) => {
                warn!(reason, "rejected view with invalid signature");
                return pixel_response(StatusCode::FORBIDDEN);
            },
        }
    } else {
        decoded
    };

    debug!(payload = %payload, "view recorded");

    state.notifier.record_view(&payload).await;

    match state.images.serve().await {
        Ok(Some(image)) => image_response(&image),
        Ok(None) => pixel_response(StatusCode::OK),
        Err(e) => {
            warn!(error = %e, "image origin unavailable, serving fallback pixel");
            pixel_response(StatusCode::OK)
        },
    }
}

/// Decodes the raw path tail into a payload string.
///
/// Strips a trailing `.gif` first (the suffix is never part of the payload),
/// then percent-decodes exactly once. Invalid UTF-8 sequences are replaced
/// rather than rejected.
fn decode_payload(raw: &str) -> String {
    let stripped = strip_gif_suffix(raw);
    let decoded = percent_decode_str(stripped).decode_utf8_lossy();

    if decoded.is_empty() {
        EMPTY_PAYLOAD.to_string()
    } else {
        decoded.into_owned()
    }
}

/// Strips a trailing `.gif` suffix, case-insensitively.
fn strip_gif_suffix(raw: &str) -> &str {
    match raw.len().checked_sub(4) {
        Some(split) if raw.is_char_boundary(split) && raw[split..].eq_ignore_ascii_case(".gif") => {
            &raw[..split]
        },
        _ => raw,
    }
}

/// Splits `<payload>~<signature>` and verifies the signature suffix.
///
/// The delimiter split takes the last `~` so payloads may themselves
/// contain the delimiter character.
fn verify_payload<'a>(decoded: &'a str, secret: &str) -> Result<&'a str, String> {
    let Some((payload, signature)) = decoded.rsplit_once(SIGNATURE_DELIMITER) else {
        return Err("signature required but missing".to_string());
    };

    let result = validate_signature(payload.as_bytes(), signature, secret);
    if result.is_valid {
        Ok(payload)
    } else {
        Err(result.error_message.unwrap_or_else(|| "signature invalid".to_string()))
    }
}

/// Builds a response serving the cached remote image.
fn image_response(image: &CachedImage) -> Response {
    let Ok(content_type) = HeaderValue::from_str(&image.content_type) else {
        return pixel_response(StatusCode::OK);
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE)),
        ],
        image.bytes.clone(),
    )
        .into_response()
}
