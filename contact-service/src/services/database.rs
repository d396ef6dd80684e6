use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use std::time::Duration;
use validator::Validate;

use crate::error::ContactError;
use crate::models::{parse_contact_id, Contact, ContactFields};
use crate::services::ContactStore;

const CONTACTS_COLLECTION: &str = "contacts";
const DUPLICATE_KEY_CODE: i32 = 11000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct MongoContactStore {
    client: MongoClient,
    db: Database,
}

impl MongoContactStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, ContactError> {
        tracing::info!(database = %database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            ContactError::from(e)
        })?;
        options.app_name = Some("contact-service".to_string());
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            ContactError::from(e)
        })?;
        let db = client.database(database);

        tracing::info!(database = %database, "MongoDB client ready");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), ContactError> {
        tracing::info!("Creating MongoDB indexes for contact-service");

        // Names are unique; concurrent creates that race past the handler's
        // pre-check are rejected here.
        let unique_name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .name("unique_name".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.contacts()
            .create_index(unique_name_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create unique name index on contacts: {}", e);
                ContactError::from(e)
            })?;
        tracing::info!("Created unique index on contacts.name");

        Ok(())
    }

    pub fn contacts(&self) -> Collection<Contact> {
        self.db.collection(CONTACTS_COLLECTION)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn map_write_error(err: mongodb::error::Error) -> ContactError {
    if is_duplicate_key(&err) {
        ContactError::DuplicateName
    } else {
        ContactError::from(err)
    }
}

#[async_trait]
impl ContactStore for MongoContactStore {
    async fn health_check(&self) -> Result<(), ContactError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                ContactError::from(e)
            })?;
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Contact>, ContactError> {
        Ok(self.contacts().find_one(doc! { "name": name }, None).await?)
    }

    async fn find_all(&self) -> Result<Vec<Contact>, ContactError> {
        let cursor = self.contacts().find(None, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self) -> Result<u64, ContactError> {
        Ok(self.contacts().count_documents(None, None).await?)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Contact>, ContactError> {
        let oid = parse_contact_id(id)?;
        Ok(self.contacts().find_one(doc! { "_id": oid }, None).await?)
    }

    async fn insert(&self, fields: ContactFields) -> Result<Contact, ContactError> {
        fields.validate()?;

        let contact = Contact::new(fields);
        self.contacts()
            .insert_one(&contact, None)
            .await
            .map_err(map_write_error)?;

        tracing::info!(contact_id = %contact.id, "Contact inserted");
        Ok(contact)
    }

    async fn update_by_id(
        &self,
        id: &str,
        fields: ContactFields,
    ) -> Result<Option<Contact>, ContactError> {
        let oid = parse_contact_id(id)?;
        fields.validate()?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .contacts()
            .find_one_and_update(
                doc! { "_id": oid },
                doc! { "$set": { "name": fields.name.as_str(), "number": fields.number.as_str() } },
                options,
            )
            .await
            .map_err(map_write_error)?;

        if updated.is_some() {
            tracing::info!(contact_id = %oid, "Contact updated");
        }
        Ok(updated)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, ContactError> {
        let oid = parse_contact_id(id)?;
        let result = self.contacts().delete_one(doc! { "_id": oid }, None).await?;

        tracing::info!(
            contact_id = %oid,
            deleted = result.deleted_count,
            "Contact delete processed"
        );
        Ok(result.deleted_count > 0)
    }
}
