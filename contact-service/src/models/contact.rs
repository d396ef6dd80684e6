use mongodb::bson::oid::ObjectId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ContactError;

/// At least one non-whitespace character.
static NON_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S").expect("valid regex"));

/// Digit groups joined by single hyphens: `040-22334455`, `12345678`, `09-12-3456`.
static PHONE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(-[0-9]+)*$").expect("valid regex"));

/// A stored contact. `_id` is the document key; it is exposed as `id` by the DTO layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub number: String,
}

impl Contact {
    pub fn new(fields: ContactFields) -> Self {
        Self {
            id: ObjectId::new(),
            name: fields.name,
            number: fields.number,
        }
    }
}

/// The mutable part of a contact: the request body of create/update and the payload of
/// every store write.
///
/// Absent fields deserialize as empty strings so that they fail validation with a field
/// message instead of a JSON parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactFields {
    #[serde(default)]
    #[validate(regex(path = *NON_BLANK, message = "name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(
        length(min = 8, message = "number must be at least 8 characters long"),
        regex(
            path = *PHONE_NUMBER,
            message = "number must be digits separated by single hyphens, e.g. 040-22334455"
        )
    )]
    pub number: String,
}

impl ContactFields {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
        }
    }
}

/// Parse a path id into the store's native id; anything else is a cast failure.
pub fn parse_contact_id(id: &str) -> Result<ObjectId, ContactError> {
    ObjectId::parse_str(id).map_err(|_| ContactError::CastError(id.to_string()))
}
