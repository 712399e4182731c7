pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod storage;
pub mod table;
pub mod users;
pub mod validation;

pub use manager::{DatabaseError, DatabaseManager};
pub use storage::Storage;
pub use table::{Entity, Filter, Table};
pub use users::UserDirectory;
pub use validation::ValidationError;
