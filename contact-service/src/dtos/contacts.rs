use serde::{Deserialize, Serialize};

use crate::models::Contact;

/// Wire shape of a contact: the document id as a hex string under `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub number: String,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id.to_hex(),
            name: contact.name,
            number: contact.number,
        }
    }
}
