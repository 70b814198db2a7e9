// src/application/state.rs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::ConnectionPool;
use crate::error::AppResult;
use crate::forms::FormKind;
use crate::repositories::{SqliteFormRepository, SqliteMasterDataRepository};
use crate::services::{FormService, MasterDataService, ReferenceValidator};

/// Application state shared by every command.
/// All fields are Arc-wrapped for thread-safe sharing.
pub struct AppState {
    pub pool: Arc<ConnectionPool>,
    pub master_data_service: Arc<MasterDataService>,
    pub form_service: Arc<FormService>,
}

impl AppState {
    /// Wire repositories and services over an initialized pool.
    /// Fails if a form schema in the catalog is inconsistent.
    pub fn new(pool: Arc<ConnectionPool>, config: &AppConfig) -> AppResult<Self> {
        FormKind::validate_all()?;

        let default_limit = config.pagination.default_limit;

        let master_repo = Arc::new(SqliteMasterDataRepository::new(pool.clone()));
        let validator = ReferenceValidator::new(master_repo.clone());
        let master_data_service = Arc::new(MasterDataService::new(
            master_repo,
            validator,
            default_limit,
        ));

        let form_repo = Arc::new(SqliteFormRepository::new(pool.clone()));
        let form_service = Arc::new(FormService::new(form_repo, default_limit));

        Ok(Self {
            pool,
            master_data_service,
            form_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::test_pool;

    #[test]
    fn test_state_wires_services() {
        let state = AppState::new(test_pool(), &AppConfig::default()).unwrap();
        assert!(state.form_service.find_all(FormKind::Training, None, Default::default()).is_ok());
        assert_eq!(state.master_data_service.stats().unwrap()["zones"], 0);
    }
}
