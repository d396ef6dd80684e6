pub mod contacts;

pub use contacts::ContactResponse;
