use actix_web::{http, web, HttpResponse};

use crate::errors::AppError;
use crate::AppState;

/// Serves an uploaded employee image.
///
/// Images are referenced from `<img>` tags, so this route takes no token.
pub async fn get_image(
    state: web::Data<AppState>,
    key: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let not_found = || AppError::NotFound("Image not found".to_string());

    let (bytes, content_type) = match state.images.get(&key).await {
        Ok(Some(image)) => image,
        Ok(None) => return Err(not_found()),
        Err(crate::utils::storage::ImageStoreError::InvalidKey(_)) => return Err(not_found()),
        Err(err) => return Err(err.into()),
    };

    Ok(HttpResponse::Ok()
        .insert_header((http::header::CONTENT_TYPE, content_type))
        .insert_header((http::header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
