//! Language handlers

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Language, User};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
}

impl From<Language> for LanguageOption {
    fn from(language: Language) -> Self {
        Self {
            code: language.code(),
            name: language.display_name(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub current_language: &'static str,
    pub available_languages: Vec<LanguageOption>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeLanguageRequest {
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeLanguageResponse {
    pub language: &'static str,
    pub message: &'static str,
}

fn language_info(current: Language) -> LanguageResponse {
    LanguageResponse {
        current_language: current.code(),
        available_languages: Language::ALL.into_iter().map(Into::into).collect(),
    }
}

/// GET /api/language
///
/// Current request language and the supported languages.
pub async fn get_language(Extension(language): Extension<Language>) -> Json<LanguageResponse> {
    Json(language_info(language))
}

/// POST /api/language
///
/// Switch language. Stored as preferred language for authenticated callers.
pub async fn set_language(
    State(state): State<AppState>,
    user: Option<Extension<User>>,
    Json(request): Json<ChangeLanguageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let language: Language = request
        .language
        .trim()
        .parse()
        .map_err(|_| AppError::validation("Invalid language code"))?;

    if let Some(Extension(user)) = user {
        state
            .account_service
            .change_language(&user.id, language)
            .await?;
    }

    Ok((
        [(
            header::CONTENT_LANGUAGE,
            HeaderValue::from_static(language.code()),
        )],
        Json(ChangeLanguageResponse {
            language: language.code(),
            message: "Language changed successfully",
        }),
    ))
}
