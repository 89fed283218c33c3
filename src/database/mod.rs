pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProjectStore;
pub use postgres::PgProjectStore;
pub use repository::{ProjectStore, SaveOutcome};
