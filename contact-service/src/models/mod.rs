pub mod contact;

pub use contact::{parse_contact_id, Contact, ContactFields};
