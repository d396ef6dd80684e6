pub mod validation;

pub use validation::{JsonBody, ValidatedJson};
