use sqlx::PgPool;
use std::sync::Arc;

use super::manager::{DatabaseError, DatabaseManager};
use super::memory::MemoryTable;
use super::models::{Applicant, Customer, Group, GroupPolicy, IndividualPolicy, Quote, Template};
use super::postgres::PgTable;
use super::table::Table;
use super::users::{MemoryUserDirectory, PgUserDirectory, UserDirectory};

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    Memory,
}

/// Every table a service may touch. Each service only reads the tables in
/// its own schema; the rest are never queried.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserDirectory>,
    pub customers: Arc<dyn Table<Customer>>,
    pub individual_policies: Arc<dyn Table<IndividualPolicy>>,
    pub group_policies: Arc<dyn Table<GroupPolicy>>,
    pub applicants: Arc<dyn Table<Applicant>>,
    pub groups: Arc<dyn Table<Group>>,
    pub quotes: Arc<dyn Table<Quote>>,
    pub templates: Arc<dyn Table<Template>>,
    backend: Backend,
}

impl Storage {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserDirectory::new(pool.clone())),
            customers: Arc::new(PgTable::new(pool.clone())),
            individual_policies: Arc::new(PgTable::new(pool.clone())),
            group_policies: Arc::new(PgTable::new(pool.clone())),
            applicants: Arc::new(PgTable::new(pool.clone())),
            groups: Arc::new(PgTable::new(pool.clone())),
            quotes: Arc::new(PgTable::new(pool.clone())),
            templates: Arc::new(PgTable::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    /// In-process storage with the same unique constraints as the DDL
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserDirectory::new()),
            customers: Arc::new(MemoryTable::<Customer>::with_unique(&[&["email"]])),
            individual_policies: Arc::new(MemoryTable::<IndividualPolicy>::with_unique(&[&["policy_number"]])),
            group_policies: Arc::new(MemoryTable::<GroupPolicy>::with_unique(&[&["policy_number"]])),
            applicants: Arc::new(MemoryTable::<Applicant>::new()),
            groups: Arc::new(MemoryTable::<Group>::new()),
            quotes: Arc::new(MemoryTable::<Quote>::new()),
            templates: Arc::new(MemoryTable::<Template>::with_unique(&[&["name", "version"]])),
            backend: Backend::Memory,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory => "memory",
        }
    }

    pub async fn ping(&self) -> Result<(), DatabaseError> {
        match &self.backend {
            Backend::Postgres(pool) => DatabaseManager::health_check(pool).await,
            Backend::Memory => Ok(()),
        }
    }
}
