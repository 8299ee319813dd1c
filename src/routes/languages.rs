//! Supported language listing

use std::collections::BTreeMap;

use axum::Json;
use serde::Serialize;

use crate::ocr::Language;

#[derive(Serialize)]
pub struct LanguagesResponse {
    pub supported_languages: BTreeMap<&'static str, &'static str>,
}

pub async fn list_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        supported_languages: Language::catalog(),
    })
}
