use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Response,
};
use og_image_core::AppError;
use og_image_images::{OgRenderer, png_response};

use crate::Routes;

pub async fn get_og_image(
    Path(path): Path<String>,
    State(renderer): State<Arc<OgRenderer>>,
    State(routes): State<Arc<Routes>>,
) -> Result<Response, AppError> {
    let Some(slug) = path.strip_suffix(".png") else {
        return Err(AppError::not_found());
    };
    let props = routes.get(slug).cloned().ok_or_else(AppError::not_found)?;
    let data = tokio::task::spawn_blocking(move || renderer.render(&props)).await??;
    Ok(png_response(data))
}
