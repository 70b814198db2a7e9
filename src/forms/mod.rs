// src/forms/mod.rs
//
// Report forms
//
// - schema:    declarative field/alias/label tables
// - catalog:   the concrete forms
// - normalize: request body -> storage values
// - view:      stored record -> response with aliases and UI labels

pub mod catalog;
pub mod normalize;
pub mod schema;
pub mod view;

pub use normalize::{normalize, FieldValue, NormalizedInput, NormalizedRow, WriteMode};
pub use schema::{
    DetailSchema, FieldDefault, FieldKind, FormField, FormSchema, ReferenceTable, StoredReference,
    KVK_ALIASES, KVK_COLUMN,
};
pub use view::present;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::DomainResult;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    Training,
    Oft,
    Fld,
    Awards,
    SoilTesting,
    Celebrations,
    Csisa,
}

impl FormKind {
    pub const ALL: [FormKind; 7] = [
        FormKind::Training,
        FormKind::Oft,
        FormKind::Fld,
        FormKind::Awards,
        FormKind::SoilTesting,
        FormKind::Celebrations,
        FormKind::Csisa,
    ];

    pub fn schema(self) -> &'static FormSchema {
        match self {
            FormKind::Training => &catalog::TRAINING,
            FormKind::Oft => &catalog::OFT,
            FormKind::Fld => &catalog::FLD,
            FormKind::Awards => &catalog::AWARDS,
            FormKind::SoilTesting => &catalog::SOIL_TESTING,
            FormKind::Celebrations => &catalog::CELEBRATIONS,
            FormKind::Csisa => &catalog::CSISA,
        }
    }

    pub fn name(self) -> &'static str {
        self.schema().name
    }

    /// Check every schema in the catalog
    pub fn validate_all() -> DomainResult<()> {
        for kind in FormKind::ALL {
            kind.schema().validate()?;
        }
        Ok(())
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FormKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| AppError::UnknownEntity(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_names_parse() {
        for kind in FormKind::ALL {
            assert_eq!(kind.name().parse::<FormKind>().unwrap(), kind);
        }
        assert_eq!("soil_testing".parse::<FormKind>().unwrap(), FormKind::SoilTesting);
    }

    #[test]
    fn test_serde_name_matches_schema_name() {
        for kind in FormKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn test_unknown_form() {
        assert!(matches!(
            "tea-party".parse::<FormKind>(),
            Err(AppError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_catalog_validates() {
        FormKind::validate_all().unwrap();
    }

    #[test]
    fn test_tables_are_distinct() {
        let mut tables: Vec<_> = FormKind::ALL.iter().map(|k| k.schema().table).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), FormKind::ALL.len());
    }
}
