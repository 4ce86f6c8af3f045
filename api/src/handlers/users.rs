//! Profile handlers
//!
//! Endpoints for the authenticated user's own account.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use super::common::{double_option, AddressResponse, UserResponse};
use crate::domain::entities::{Gender, Language, NewAddress, ProfileUpdate, User};
use crate::error::AppError;
use crate::AppState;

/// Profile with the address resolved
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub address: Option<AddressResponse>,
}

/// Partial profile update. `null` clears optional fields.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub gender: Option<Option<Gender>>,
    pub preferred_language: Option<Language>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(request: UpdateProfileRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: request.phone_number,
            gender: request.gender,
            preferred_language: request.preferred_language,
        }
    }
}

async fn profile(state: &AppState, user: User) -> Result<ProfileResponse, AppError> {
    let address = state.account_service.get_address(&user).await?;
    Ok(ProfileResponse {
        user: user.into(),
        address: address.map(Into::into),
    })
}

/// GET /api/users/me
pub async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(profile(&state, user).await?))
}

/// PATCH /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let updated = state
        .account_service
        .update_profile(&user.id, request.into())
        .await?;

    Ok(Json(profile(&state, updated).await?))
}

/// DELETE /api/users/me
///
/// Delete the account. Tenants owned by the user are deleted with it.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<StatusCode, AppError> {
    state.account_service.delete_user(&user, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/users/me/address
pub async fn set_my_address(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(address): Json<NewAddress>,
) -> Result<Json<AddressResponse>, AppError> {
    let address = state.account_service.set_address(&user.id, address).await?;
    Ok(Json(address.into()))
}

/// DELETE /api/users/me/address
pub async fn clear_my_address(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<StatusCode, AppError> {
    state.account_service.clear_address(&user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_user;

    #[test]
    fn parse_update_clears_phone_with_null() {
        let json = r#"{"first_name": "Alicia", "phone_number": null}"#;
        let request: UpdateProfileRequest = serde_json::from_str(json).unwrap();

        let update = ProfileUpdate::from(request);
        assert_eq!(update.first_name.as_deref(), Some("Alicia"));
        assert_eq!(update.phone_number, Some(None));
        assert!(update.gender.is_none());
    }

    #[test]
    fn parse_update_gender_and_language() {
        let json = r#"{"gender": "F", "preferred_language": "fr"}"#;
        let request: UpdateProfileRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.gender, Some(Some(Gender::Female)));
        assert_eq!(request.preferred_language, Some(Language::Fr));
    }

    #[test]
    fn parse_update_rejects_unknown_language() {
        let json = r#"{"preferred_language": "de"}"#;
        assert!(serde_json::from_str::<UpdateProfileRequest>(json).is_err());
    }

    #[test]
    fn parse_address_line2_optional() {
        let json = r#"{
            "country": "FR",
            "state": "IDF",
            "city": "Paris",
            "address_line1": "12 rue de Rivoli",
            "zip_code": "75001"
        }"#;
        let address: NewAddress = serde_json::from_str(json).unwrap();
        assert!(address.address_line2.is_empty());
    }

    #[test]
    fn profile_response_is_flat() {
        let response = ProfileResponse {
            user: test_user().into(),
            address: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["email"], "alice@example.com");
        assert!(json["address"].is_null());
    }
}
