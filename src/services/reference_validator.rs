// src/services/reference_validator.rs
//
// Parent-reference check for hierarchical master data.
//
// Advisory: the repository never calls this. MasterDataService runs it
// before every create and update.

use std::sync::Arc;

use crate::domain::values::{is_blank, json_integer};
use crate::domain::{resolve, Record};
use crate::error::AppResult;
use crate::repositories::ParentLookup;

pub struct ReferenceValidator {
    lookup: Arc<dyn ParentLookup>,
}

impl ReferenceValidator {
    pub fn new(lookup: Arc<dyn ParentLookup>) -> Self {
        Self { lookup }
    }

    /// True when every parent reference supplied in `data` points at an
    /// existing row. Blank or absent references are not checked; a
    /// non-numeric one counts as unresolved.
    pub fn validate(&self, entity_name: &str, data: &Record) -> AppResult<bool> {
        let entry = resolve(entity_name)?;

        for parent in entry.parents {
            let Some(raw) = data.get(parent.field).or_else(|| data.get(parent.column)) else {
                continue;
            };
            if is_blank(raw) {
                continue;
            }

            let Some(id) = json_integer(raw).filter(|id| *id > 0) else {
                log::debug!("{}: {} is not an id: {}", entity_name, parent.field, raw);
                return Ok(false);
            };

            if !self.lookup.parent_exists(parent.entity, id)? {
                log::debug!("{}: {} {} does not exist", entity_name, parent.entity, id);
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Entity;
    use crate::error::AppError;
    use crate::repositories::master_data_repository::MockParentLookup;
    use mockall::predicate::eq;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_existing_parent_validates() {
        let mut lookup = MockParentLookup::new();
        lookup
            .expect_parent_exists()
            .with(eq(Entity::Zone), eq(3))
            .times(1)
            .returning(|_, _| Ok(true));

        let validator = ReferenceValidator::new(Arc::new(lookup));
        assert!(validator
            .validate("states", &record(json!({ "stateName": "Bihar", "zoneId": 3 })))
            .unwrap());
    }

    #[test]
    fn test_missing_parent_fails() {
        let mut lookup = MockParentLookup::new();
        lookup.expect_parent_exists().returning(|_, _| Ok(false));

        let validator = ReferenceValidator::new(Arc::new(lookup));
        assert!(!validator
            .validate("districts", &record(json!({ "stateId": "12" })))
            .unwrap());
    }

    #[test]
    fn test_non_numeric_reference_is_unresolved() {
        let mut lookup = MockParentLookup::new();
        lookup.expect_parent_exists().never();

        let validator = ReferenceValidator::new(Arc::new(lookup));
        assert!(!validator
            .validate("states", &record(json!({ "zoneId": "north" })))
            .unwrap());
    }

    #[test]
    fn test_entities_without_parents_always_validate() {
        let mut lookup = MockParentLookup::new();
        lookup.expect_parent_exists().never();

        let validator = ReferenceValidator::new(Arc::new(lookup));
        assert!(validator
            .validate("zones", &record(json!({ "zoneName": "Zone I", "stateId": 99 })))
            .unwrap());
    }

    #[test]
    fn test_optional_parent_may_be_blank() {
        let mut lookup = MockParentLookup::new();
        lookup
            .expect_parent_exists()
            .with(eq(Entity::District), eq(4))
            .returning(|_, _| Ok(true));

        let validator = ReferenceValidator::new(Arc::new(lookup));
        assert!(validator
            .validate("kvks", &record(json!({ "districtId": 4, "orgId": "" })))
            .unwrap());
    }

    #[test]
    fn test_unknown_entity() {
        let validator = ReferenceValidator::new(Arc::new(MockParentLookup::new()));
        assert!(matches!(
            validator.validate("planets", &Record::new()),
            Err(AppError::UnknownEntity(_))
        ));
    }
}
