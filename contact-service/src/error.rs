//! Domain failures of the contact store and handlers.
//!
//! These are mapped onto [`AppError`], whose `IntoResponse` is the single place
//! where failures become HTTP status codes.

use service_core::error::AppError;
use thiserror::Error;
use validator::ValidationErrors;

pub const DUPLICATE_NAME_MESSAGE: &str = "name must be unique";
pub const NOT_FOUND_MESSAGE: &str = "contact not found";

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("name must be unique")]
    DuplicateName,

    #[error("cannot cast {0:?} to a contact id")]
    CastError(String),

    #[error("contact validation failed: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("contact {0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("store error: {0}")]
    Store(anyhow::Error),
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::DuplicateName => {
                AppError::BadRequest(anyhow::anyhow!(DUPLICATE_NAME_MESSAGE))
            }
            ContactError::CastError(id) => AppError::MalformedId(id),
            ContactError::ValidationError(errors) => AppError::ValidationError(errors),
            ContactError::NotFound(_) => AppError::NotFound(anyhow::anyhow!(NOT_FOUND_MESSAGE)),
            ContactError::Database(e) => AppError::from(e),
            ContactError::Store(e) => AppError::InternalError(e),
        }
    }
}
