pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod repository;
pub mod schema;
pub mod seed;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::Repository;
pub use seed::Fixture;
pub use store::{RecordStore, Selector};
