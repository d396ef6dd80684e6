pub mod contacts;
pub mod fallback;
pub mod health;
pub mod info;

pub use contacts::{create_contact, delete_contact, get_contact, list_contacts, update_contact};
pub use fallback::unknown_endpoint;
pub use health::{health_check, metrics, readiness_check};
pub use info::info;
