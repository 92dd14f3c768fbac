//! Saved delivery addresses (`/api/addresses`). Every route requires a session.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use hridved_core::validation::{is_valid_mobile, is_valid_pincode};
use hridved_core::{AddressId, AddressType, FieldErrors};

use crate::db::AddressRepository;
use crate::db::addresses::{AddressPatch, NewAddress};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAuth;
use crate::models::{Address, User};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub full_name: Option<String>,
    pub mobile_number: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub house_number: Option<String>,
    pub landmark: Option<String>,
    pub address_type: Option<AddressType>,
    pub is_default: Option<bool>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pincode and mobile checks shared by create and update.
fn check_contact(pincode: Option<&str>, mobile: Option<&str>) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors
        .check(
            pincode.is_none_or(is_valid_pincode),
            "pincode",
            "Pincode must be 6 digits",
        )
        .check(
            mobile.is_none_or(is_valid_mobile),
            "mobileNumber",
            "Mobile number must be 10 digits",
        );
    errors.into_result().map_err(|errors| {
        let message = errors
            .get("pincode")
            .or_else(|| errors.get("mobileNumber"))
            .unwrap_or("Invalid address")
            .to_string();
        AppError::Validation { message, errors }
    })
}

impl AddressRequest {
    fn into_new(self) -> Result<NewAddress> {
        let (
            Some(full_name),
            Some(mobile_number),
            Some(pincode),
            Some(state),
            Some(city),
            Some(house_number),
        ) = (
            trimmed(self.full_name),
            trimmed(self.mobile_number),
            trimmed(self.pincode),
            trimmed(self.state),
            trimmed(self.city),
            trimmed(self.house_number),
        )
        else {
            return Err(AppError::BadRequest(
                "Please provide all required fields".to_string(),
            ));
        };
        check_contact(Some(&pincode), Some(&mobile_number))?;

        Ok(NewAddress {
            full_name,
            mobile_number,
            pincode,
            state,
            city,
            house_number,
            landmark: trimmed(self.landmark).unwrap_or_default(),
            address_type: self.address_type.unwrap_or_default(),
            is_default: self.is_default.unwrap_or(false),
        })
    }

    fn into_patch(self) -> Result<AddressPatch> {
        let patch = AddressPatch {
            full_name: trimmed(self.full_name),
            mobile_number: trimmed(self.mobile_number),
            pincode: trimmed(self.pincode),
            state: trimmed(self.state),
            city: trimmed(self.city),
            house_number: trimmed(self.house_number),
            landmark: self.landmark.map(|l| l.trim().to_string()),
            address_type: self.address_type,
            is_default: self.is_default,
        };
        check_contact(patch.pincode.as_deref(), patch.mobile_number.as_deref())?;
        Ok(patch)
    }
}

/// GET /api/addresses
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AppJson<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(AppJson(addresses))
}

/// POST /api/addresses
///
/// # Errors
///
/// Returns 400 for missing fields or a bad pincode or mobile number.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<AddressRequest>,
) -> Result<(StatusCode, AppJson<Address>)> {
    let new = req.into_new()?;
    let repo = AddressRepository::new(state.pool());
    let mut address = repo.create(user.id, &new).await?;
    if new.is_default {
        address = repo.set_default(user.id, address.id).await?;
    }
    Ok((StatusCode::CREATED, AppJson(address)))
}

/// Load an address and check it belongs to `user`.
async fn owned_address(state: &AppState, user: &User, id: AddressId) -> Result<Address> {
    let address = AddressRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_string()))?;
    if address.user_id != user.id {
        return Err(AppError::Forbidden(
            "Not authorized to access this address".to_string(),
        ));
    }
    Ok(address)
}

/// GET /api/addresses/{id}
///
/// # Errors
///
/// Returns 404 "Address not found" or 403 for someone else's address.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<AddressId>,
) -> Result<AppJson<Address>> {
    Ok(AppJson(owned_address(&state, &user, id).await?))
}

/// PUT /api/addresses/{id}
///
/// # Errors
///
/// Returns 404, 403, or 400 for a bad pincode or mobile number.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<AddressId>,
    AppJson(req): AppJson<AddressRequest>,
) -> Result<AppJson<Address>> {
    owned_address(&state, &user, id).await?;
    let patch = req.into_patch()?;

    let repo = AddressRepository::new(state.pool());
    let mut address = repo.update(id, &patch).await?;
    if patch.is_default == Some(true) {
        address = repo.set_default(user.id, id).await?;
    }
    Ok(AppJson(address))
}

/// DELETE /api/addresses/{id}
///
/// # Errors
///
/// Returns 404 "Address not found" or 403 for someone else's address.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<AddressId>,
) -> Result<AppJson<Value>> {
    owned_address(&state, &user, id).await?;
    AddressRepository::new(state.pool()).delete(id).await?;
    Ok(AppJson(json!({ "message": "Address removed" })))
}

/// PUT /api/addresses/{id}/default
///
/// # Errors
///
/// Returns 404 "Address not found" or 403 for someone else's address.
pub async fn set_default(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<AddressId>,
) -> Result<AppJson<Address>> {
    owned_address(&state, &user, id).await?;
    let address = AddressRepository::new(state.pool())
        .set_default(user.id, id)
        .await?;
    Ok(AppJson(address))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn full_request() -> AddressRequest {
        AddressRequest {
            full_name: Some("Asha Verma".to_string()),
            mobile_number: Some("9876543210".to_string()),
            pincode: Some("560001".to_string()),
            state: Some("Karnataka".to_string()),
            city: Some("Bengaluru".to_string()),
            house_number: Some("12 MG Road".to_string()),
            ..AddressRequest::default()
        }
    }

    #[test]
    fn test_new_address_defaults() {
        let new = full_request().into_new().unwrap();
        assert_eq!(new.address_type, AddressType::Home);
        assert!(!new.is_default);
        assert_eq!(new.landmark, "");
    }

    #[test]
    fn test_missing_fields() {
        let mut req = full_request();
        req.city = Some("   ".to_string());
        let Err(AppError::BadRequest(message)) = req.into_new() else {
            panic!("expected bad request");
        };
        assert_eq!(message, "Please provide all required fields");
    }

    #[test]
    fn test_bad_pincode_and_mobile() {
        let mut req = full_request();
        req.pincode = Some("5600".to_string());
        assert!(matches!(req.into_new(), Err(AppError::Validation { .. })));

        let patch = AddressRequest {
            mobile_number: Some("98765".to_string()),
            ..AddressRequest::default()
        };
        let Err(AppError::Validation { message, .. }) = patch.into_patch() else {
            panic!("expected validation error");
        };
        assert_eq!(message, "Mobile number must be 10 digits");
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let patch = AddressRequest {
            city: Some("Mysuru".to_string()),
            ..AddressRequest::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.city.as_deref(), Some("Mysuru"));
        assert!(patch.pincode.is_none());
        assert!(patch.is_default.is_none());
    }
}
