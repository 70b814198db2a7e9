// src/repositories/mod.rs
//
// Repository layer
//
// RULES:
// - Repositories are data mappers
// - No tenant policy (callers pass the KVK filter in)
// - No cross-repository calls
// - Explicit, parameterized SQL only

pub mod form_repository;
pub mod master_data_repository;
pub mod query;
pub(crate) mod reference_lookup;

#[cfg(test)]
mod form_repository_tests;

pub use form_repository::{FormChanges, FormRepository, SqliteFormRepository};
pub use master_data_repository::{MasterDataRepository, ParentLookup, SqliteMasterDataRepository};
pub use query::{ListOptions, Page, SortDirection, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use rusqlite::params;

    use crate::db::{create_memory_pool, initialize_database, ConnectionPool};

    /// Single-connection in-memory pool with the schema applied
    pub fn test_pool() -> Arc<ConnectionPool> {
        let pool = create_memory_pool().unwrap();
        initialize_database(&pool.get().unwrap()).unwrap();
        Arc::new(pool)
    }

    /// Insert a KVK (with the zone/state/district it needs) under `kvk_id`
    pub fn seed_kvk(pool: &ConnectionPool, kvk_id: i64, name: &str) {
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO zones (zone_id, zone_name) VALUES (1, 'Zone I')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO states (state_id, state_name, zone_id) VALUES (1, 'Punjab', 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO districts (district_id, district_name, state_id) VALUES (1, 'Ludhiana', 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO kvks (kvk_id, kvk_name, district_id) VALUES (?1, ?2, 1)",
            params![kvk_id, name],
        )
        .unwrap();
    }
}
