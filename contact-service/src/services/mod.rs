pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoContactStore;
pub use memory::InMemoryContactStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::ContactStore;
