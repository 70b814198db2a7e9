use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::registry::{self, RegistryEntry};
use crate::error::AppError;

/// Master-data entities known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Entity {
    #[serde(rename = "zones")]
    Zone,
    #[serde(rename = "states")]
    State,
    #[serde(rename = "districts")]
    District,
    #[serde(rename = "organizations")]
    Organization,
    #[serde(rename = "universities")]
    University,
    #[serde(rename = "kvks")]
    Kvk,
    #[serde(rename = "seasons")]
    Season,
    #[serde(rename = "crops")]
    Crop,
    #[serde(rename = "important-days")]
    ImportantDay,
}

impl Entity {
    pub const ALL: [Entity; 9] = [
        Entity::Zone,
        Entity::State,
        Entity::District,
        Entity::Organization,
        Entity::University,
        Entity::Kvk,
        Entity::Season,
        Entity::Crop,
        Entity::ImportantDay,
    ];

    /// Administrative tree, root first
    pub const HIERARCHY: [Entity; 5] = [
        Entity::Zone,
        Entity::State,
        Entity::District,
        Entity::Organization,
        Entity::University,
    ];

    /// API name, as used in routes and stats keys
    pub fn name(self) -> &'static str {
        match self {
            Entity::Zone => "zones",
            Entity::State => "states",
            Entity::District => "districts",
            Entity::Organization => "organizations",
            Entity::University => "universities",
            Entity::Kvk => "kvks",
            Entity::Season => "seasons",
            Entity::Crop => "crops",
            Entity::ImportantDay => "important-days",
        }
    }

    pub fn registry_entry(self) -> &'static RegistryEntry {
        registry::entry(self)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Entity {
    type Err = AppError;

    /// Accepts the API name plus singular and snake_case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let entity = match normalized.as_str() {
            "zones" | "zone" => Entity::Zone,
            "states" | "state" => Entity::State,
            "districts" | "district" => Entity::District,
            "organizations" | "organization" | "orgs" | "org" => Entity::Organization,
            "universities" | "university" => Entity::University,
            "kvks" | "kvk" => Entity::Kvk,
            "seasons" | "season" => Entity::Season,
            "crops" | "crop" => Entity::Crop,
            "important-days" | "important-day" | "importantdays" => Entity::ImportantDay,
            _ => return Err(AppError::UnknownEntity(s.to_string())),
        };
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trips_through_from_str() {
        for entity in Entity::ALL {
            assert_eq!(entity.name().parse::<Entity>().unwrap(), entity);
        }
    }

    #[test]
    fn test_alternate_spellings() {
        assert_eq!("State".parse::<Entity>().unwrap(), Entity::State);
        assert_eq!("important_days".parse::<Entity>().unwrap(), Entity::ImportantDay);
        assert_eq!(" kvk ".parse::<Entity>().unwrap(), Entity::Kvk);
    }

    #[test]
    fn test_unknown_entity() {
        for name in ["", "users", "zonez", "training"] {
            match name.parse::<Entity>() {
                Err(AppError::UnknownEntity(n)) => assert_eq!(n, name),
                other => panic!("expected UnknownEntity for {:?}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_serde_uses_api_name() {
        let json = serde_json::to_string(&Entity::ImportantDay).unwrap();
        assert_eq!(json, "\"important-days\"");
    }
}
