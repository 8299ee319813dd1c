//! Text extraction route
//!
//! `POST /ocr` with a multipart form:
//! - `image`: the uploaded file (required)
//! - `language`: `eng`, `ukr` or `eng+ukr` (optional, defaults to `eng`)

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    Json,
};

use crate::error::{AppError, Result};
use crate::ocr::{normalize_image, ExtractionRequest, RecognitionResult, UploadForm, UploadedFile};
use crate::state::AppState;

/// Extract text from an uploaded image
pub async fn extract_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<RecognitionResult>> {
    tracing::info!("Request received for text extraction");

    // A declared length over the limit is rejected whatever the content type
    let max_upload_bytes = state.config().server.max_upload_bytes;
    if let Some(length) = content_length(&headers) {
        if length > max_upload_bytes as u64 {
            tracing::warn!(
                "Upload rejected: content length {} exceeds {} bytes",
                length,
                max_upload_bytes
            );
            return Err(AppError::PayloadTooLarge);
        }
    }

    let form = match multipart {
        Ok(multipart) => read_form(multipart).await?,
        Err(rejection) => {
            // Not a multipart body, so there is no file part either
            tracing::debug!("Request is not a multipart upload: {}", rejection);
            UploadForm::default()
        }
    };

    let ExtractionRequest {
        image: bytes,
        language,
        filename,
    } = form.validate()?;

    tracing::info!("Processing {} image with language {}", filename, language);

    let image = normalize_image(&bytes).map_err(|e| {
        tracing::warn!(filename = %filename, "Invalid image upload: {}", e);
        AppError::from(e)
    })?;
    drop(bytes);

    let result = state
        .extractor()
        .extract(&image, language)
        .await
        .map_err(|e| {
            tracing::error!(
                filename = %filename,
                language = %language,
                engine = state.extractor().engine().name(),
                "Error processing image: {}",
                e
            );
            AppError::from(e)
        })?;

    tracing::info!(
        "Text extraction successful. Word count: {}",
        result.word_count
    );
    Ok(Json(result))
}

/// Drain the multipart stream, keeping the first `image` and `language` fields
async fn read_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        tracing::debug!(
            "Received field: name='{}', filename={:?}, content_type={:?}",
            name,
            field.file_name(),
            field.content_type()
        );

        match name.as_str() {
            "image" if form.image.is_none() => {
                let filename = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;
                tracing::debug!("Read {} bytes of image data", data.len());
                form.image = Some(UploadedFile { filename, data });
            }
            "language" if form.language.is_none() => {
                form.language = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Upload rejected: {}", e);
        return AppError::PayloadTooLarge;
    }

    tracing::warn!("Failed to read multipart field: {}", e);
    AppError::BadRequest("Invalid multipart upload".to_string())
}
