use axum::{Router, routing::get};
use og_image_core::util::OG_IMAGE_DIR;

use crate::AppState;

mod og;

pub fn build_router() -> Router<AppState> {
    Router::new().route(&format!("/{OG_IMAGE_DIR}/{{*path}}"), get(og::get_og_image))
}
