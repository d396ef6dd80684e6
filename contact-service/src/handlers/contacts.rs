//! CRUD handlers for `/api/contacts`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;
use validator::Validate;

use crate::{
    dtos::ContactResponse,
    error::ContactError,
    models::{parse_contact_id, ContactFields},
    startup::AppState,
    utils::{JsonBody, ValidatedJson},
};

pub async fn create_contact(
    State(state): State<AppState>,
    ValidatedJson(fields): ValidatedJson<ContactFields>,
) -> Result<Json<ContactResponse>, AppError> {
    // Cheap pre-check; the store's unique index settles concurrent creates.
    if state.store.find_by_name(&fields.name).await?.is_some() {
        return Err(ContactError::DuplicateName.into());
    }

    let contact = state.store.insert(fields).await?;

    tracing::info!(contact_id = %contact.id, "Contact created");

    Ok(Json(ContactResponse::from(contact)))
}

pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let contacts = state.store.find_all().await?;

    Ok(Json(
        contacts.into_iter().map(ContactResponse::from).collect(),
    ))
}

/// An absent contact is a bare 404 with no body.
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    match state.store.find_by_id(&id).await? {
        Some(contact) => Ok(Json(ContactResponse::from(contact)).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// The id is cast before the body is validated, so a bad id wins over bad fields.
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(fields): JsonBody<ContactFields>,
) -> Result<Json<ContactResponse>, AppError> {
    parse_contact_id(&id)?;
    fields.validate()?;

    let contact = state
        .store
        .update_by_id(&id, fields)
        .await?
        .ok_or_else(|| ContactError::NotFound(id.clone()))?;

    Ok(Json(ContactResponse::from(contact)))
}

/// Always 204 for a well-formed id, whether or not a contact was removed.
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = state.store.delete_by_id(&id).await?;

    tracing::debug!(contact_id = %id, removed, "Delete request handled");

    Ok(StatusCode::NO_CONTENT)
}
