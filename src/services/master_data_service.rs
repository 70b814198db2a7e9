// src/services/master_data_service.rs
//
// Master data orchestration: entity-name resolution, parent-reference
// validation on writes, delete protection for parents with children.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{resolve, Entity, Record};
use crate::error::{AppError, AppResult};
use crate::repositories::{ListOptions, MasterDataRepository, Page};
use crate::services::reference_validator::ReferenceValidator;

pub struct MasterDataService {
    repo: Arc<dyn MasterDataRepository>,
    validator: ReferenceValidator,
    default_limit: u32,
}

impl MasterDataService {
    pub fn new(
        repo: Arc<dyn MasterDataRepository>,
        validator: ReferenceValidator,
        default_limit: u32,
    ) -> Self {
        Self {
            repo,
            validator,
            default_limit,
        }
    }

    fn entity(name: &str) -> AppResult<Entity> {
        Ok(resolve(name)?.entity)
    }

    pub fn list(&self, entity_name: &str, mut options: ListOptions) -> AppResult<Page<Record>> {
        let entity = Self::entity(entity_name)?;
        if options.limit.filter(|l| *l > 0).is_none() {
            options.limit = Some(self.default_limit);
        }
        self.repo.list(entity, &options)
    }

    pub fn get_by_id(&self, entity_name: &str, id: i64) -> AppResult<Option<Record>> {
        self.repo.get_by_id(Self::entity(entity_name)?, id)
    }

    pub fn create(&self, entity_name: &str, data: &Record) -> AppResult<Record> {
        let entity = Self::entity(entity_name)?;
        self.check_references(entity, data)?;
        self.repo.create(entity, data)
    }

    pub fn update(&self, entity_name: &str, id: i64, data: &Record) -> AppResult<Record> {
        let entity = Self::entity(entity_name)?;
        self.check_references(entity, data)?;
        self.repo.update(entity, id, data)
    }

    /// Refuses while any child collection still has rows.
    pub fn delete(&self, entity_name: &str, id: i64) -> AppResult<()> {
        let entity = Self::entity(entity_name)?;

        if let Some((label, count)) = self.repo.dependents(entity, id)?.into_iter().next() {
            log::warn!("Refusing to delete {} {}: {} {} attached", entity, id, count, label);
            return Err(AppError::HasDependents {
                entity: entity.to_string(),
                dependents: label.to_string(),
                count,
            });
        }

        self.repo.delete(entity, id)
    }

    pub fn name_exists(
        &self,
        entity_name: &str,
        name: &str,
        exclude_id: Option<i64>,
        filters: &Record,
    ) -> AppResult<bool> {
        let entity = Self::entity(entity_name)?;
        if name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }
        self.repo.name_exists(entity, name, exclude_id, filters)
    }

    pub fn stats(&self) -> AppResult<BTreeMap<String, i64>> {
        self.repo.stats()
    }

    pub fn hierarchy(&self) -> AppResult<Vec<Record>> {
        self.repo.hierarchy()
    }

    fn check_references(&self, entity: Entity, data: &Record) -> AppResult<()> {
        if self.validator.validate(entity.name(), data)? {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "{} references a record that does not exist",
                entity
            )))
        }
    }
}
