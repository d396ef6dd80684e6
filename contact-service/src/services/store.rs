use async_trait::async_trait;

use crate::error::ContactError;
use crate::models::{Contact, ContactFields};

/// Persistence boundary for contacts.
///
/// Ids arrive as the raw path segment; implementations parse them and report
/// [`ContactError::CastError`] for anything that is not a valid id. Every write
/// validates its [`ContactFields`] and enforces unique names, reporting
/// [`ContactError::DuplicateName`] on conflict.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn health_check(&self) -> Result<(), ContactError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Contact>, ContactError>;

    /// All contacts in store-native order.
    async fn find_all(&self) -> Result<Vec<Contact>, ContactError>;

    async fn count(&self) -> Result<u64, ContactError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Contact>, ContactError>;

    async fn insert(&self, fields: ContactFields) -> Result<Contact, ContactError>;

    /// Replace `name` and `number` atomically; `None` when no contact has this id.
    async fn update_by_id(
        &self,
        id: &str,
        fields: ContactFields,
    ) -> Result<Option<Contact>, ContactError>;

    /// Returns whether a contact was removed. Removing an absent id is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<bool, ContactError>;
}
