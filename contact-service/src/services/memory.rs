use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use validator::Validate;

use crate::error::ContactError;
use crate::models::{parse_contact_id, Contact, ContactFields};
use crate::services::ContactStore;

/// Process-local contact store with the same id, validation and uniqueness rules as
/// the MongoDB store. Insertion order is the store-native order.
pub struct InMemoryContactStore {
    contacts: Mutex<Vec<Contact>>,
}

impl Default for InMemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self {
            contacts: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Contact>>, ContactError> {
        self.contacts
            .lock()
            .map_err(|e| ContactError::Store(anyhow::anyhow!("Contact store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn health_check(&self) -> Result<(), ContactError> {
        self.lock().map(|_| ())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Contact>, ContactError> {
        Ok(self.lock()?.iter().find(|c| c.name == name).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Contact>, ContactError> {
        Ok(self.lock()?.clone())
    }

    async fn count(&self) -> Result<u64, ContactError> {
        Ok(self.lock()?.len() as u64)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Contact>, ContactError> {
        let oid = parse_contact_id(id)?;
        Ok(self.lock()?.iter().find(|c| c.id == oid).cloned())
    }

    async fn insert(&self, fields: ContactFields) -> Result<Contact, ContactError> {
        fields.validate()?;

        let mut contacts = self.lock()?;
        if contacts.iter().any(|c| c.name == fields.name) {
            return Err(ContactError::DuplicateName);
        }

        let contact = Contact::new(fields);
        contacts.push(contact.clone());
        Ok(contact)
    }

    async fn update_by_id(
        &self,
        id: &str,
        fields: ContactFields,
    ) -> Result<Option<Contact>, ContactError> {
        let oid = parse_contact_id(id)?;
        fields.validate()?;

        let mut contacts = self.lock()?;
        if contacts.iter().any(|c| c.name == fields.name && c.id != oid) {
            return Err(ContactError::DuplicateName);
        }

        Ok(contacts.iter_mut().find(|c| c.id == oid).map(|contact| {
            contact.name = fields.name;
            contact.number = fields.number;
            contact.clone()
        }))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, ContactError> {
        let oid = parse_contact_id(id)?;

        let mut contacts = self.lock()?;
        let before = contacts.len();
        contacts.retain(|c| c.id != oid);
        Ok(contacts.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[tokio::test]
    async fn insert_then_find_by_id_and_name() {
        let store = InMemoryContactStore::new();
        let created = store
            .insert(ContactFields::new("Ada", "123-4567"))
            .await
            .unwrap();

        let by_id = store.find_by_id(&created.id.to_hex()).await.unwrap();
        assert_eq!(by_id, Some(created.clone()));

        let by_name = store.find_by_name("Ada").await.unwrap();
        assert_eq!(by_name, Some(created));
        assert_eq!(store.find_by_name("ada").await.unwrap(), None);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_name() {
        let store = InMemoryContactStore::new();
        store
            .insert(ContactFields::new("Ada", "123-4567"))
            .await
            .unwrap();

        let err = store
            .insert(ContactFields::new("Ada", "999-99999"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::DuplicateName));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_rejects_invalid_fields() {
        let store = InMemoryContactStore::new();
        let err = store
            .insert(ContactFields::new("", "12"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::ValidationError(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_keeps_id_and_allows_same_name() {
        let store = InMemoryContactStore::new();
        let created = store
            .insert(ContactFields::new("Ada", "123-4567"))
            .await
            .unwrap();

        let updated = store
            .update_by_id(&created.id.to_hex(), ContactFields::new("Ada", "765-43210"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.number, "765-43210");
    }

    #[tokio::test]
    async fn update_onto_another_name_is_duplicate() {
        let store = InMemoryContactStore::new();
        store
            .insert(ContactFields::new("Ada", "123-4567"))
            .await
            .unwrap();
        let grace = store
            .insert(ContactFields::new("Grace", "234-5678"))
            .await
            .unwrap();

        let err = store
            .update_by_id(&grace.id.to_hex(), ContactFields::new("Ada", "234-5678"))
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::DuplicateName));
    }

    #[tokio::test]
    async fn update_of_absent_id_returns_none() {
        let store = InMemoryContactStore::new();
        let result = store
            .update_by_id(
                &ObjectId::new().to_hex(),
                ContactFields::new("Ada", "123-4567"),
            )
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryContactStore::new();
        let created = store
            .insert(ContactFields::new("Ada", "123-4567"))
            .await
            .unwrap();
        let id = created.id.to_hex();

        assert!(store.delete_by_id(&id).await.unwrap());
        assert!(!store.delete_by_id(&id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_ids_are_cast_errors() {
        let store = InMemoryContactStore::new();

        assert!(matches!(
            store.find_by_id("not-an-id").await,
            Err(ContactError::CastError(_))
        ));
        assert!(matches!(
            store.delete_by_id("not-an-id").await,
            Err(ContactError::CastError(_))
        ));
        assert!(matches!(
            store
                .update_by_id("not-an-id", ContactFields::new("Ada", "123-4567"))
                .await,
            Err(ContactError::CastError(_))
        ));
    }

    #[tokio::test]
    async fn find_all_preserves_insertion_order() {
        let store = InMemoryContactStore::new();
        for (name, number) in [("Ada", "123-4567"), ("Grace", "234-5678"), ("Linus", "345-6789")] {
            store
                .insert(ContactFields::new(name, number))
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Ada", "Grace", "Linus"]);
    }
}
