pub mod fonts;
pub mod layout;
pub mod markup;
pub mod og;
pub mod style;
pub mod svg;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
pub use og::{OgRenderer, RenderOptions};

/// Generated images never change for a given URL.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Wrap encoded PNG bytes in a response with long-lived cache headers.
pub fn png_response(data: Vec<u8>) -> Response {
    (
        [(header::CONTENT_TYPE, mime::IMAGE_PNG.as_ref()), (header::CACHE_CONTROL, CACHE_CONTROL)],
        data,
    )
        .into_response()
}
