// src/domain/access.rs
//
// Tenant policy
//
// A KVK is the tenant unit. Users holding a KVK-level role only ever see
// and write their own KVK's records, whatever kvkId the request carries.
// Every form operation derives its scope here.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    ZoneAdmin,
    StateAdmin,
    DistrictAdmin,
    OrgAdmin,
    KvkAdmin,
    KvkUser,
}

impl Role {
    /// Roles bound to a single KVK
    pub fn is_kvk_scoped(self) -> bool {
        matches!(self, Role::KvkAdmin | Role::KvkUser)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            "zone_admin" => Ok(Role::ZoneAdmin),
            "state_admin" => Ok(Role::StateAdmin),
            "district_admin" => Ok(Role::DistrictAdmin),
            "org_admin" => Ok(Role::OrgAdmin),
            "kvk_admin" | "kvk" => Ok(Role::KvkAdmin),
            "kvk_user" => Ok(Role::KvkUser),
            _ => Err(AppError::validation(format!("Unknown role '{}'", s))),
        }
    }
}

/// Authenticated caller, as handed over by the transport layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: i64,
    pub role: Role,
    pub kvk_id: Option<i64>,
}

impl UserContext {
    pub fn new(user_id: i64, role: Role, kvk_id: Option<i64>) -> Self {
        Self {
            user_id,
            role,
            kvk_id,
        }
    }
}

/// Which KVK's rows an operation may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    Unrestricted,
    Kvk(i64),
}

impl TenantScope {
    /// Derive the scope for a caller. No user context means an internal
    /// caller and is unrestricted.
    pub fn for_user(user: Option<&UserContext>) -> AppResult<Self> {
        match user {
            Some(user) if user.role.is_kvk_scoped() => user
                .kvk_id
                .map(TenantScope::Kvk)
                .ok_or_else(|| {
                    AppError::validation(format!("User {} has no KVK assigned", user.user_id))
                }),
            _ => Ok(TenantScope::Unrestricted),
        }
    }

    /// The KVK an operation acts on: the scope's own KVK, or whatever the
    /// request asked for when unrestricted.
    pub fn effective_kvk(self, requested: Option<i64>) -> Option<i64> {
        match self {
            TenantScope::Kvk(kvk_id) => Some(kvk_id),
            TenantScope::Unrestricted => requested,
        }
    }

    /// Row filter for reads, updates and deletes by id
    pub fn kvk_filter(self) -> Option<i64> {
        match self {
            TenantScope::Kvk(kvk_id) => Some(kvk_id),
            TenantScope::Unrestricted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kvk_roles_are_forced_to_own_kvk() {
        let user = UserContext::new(1, Role::KvkAdmin, Some(5));
        let scope = TenantScope::for_user(Some(&user)).unwrap();
        assert_eq!(scope, TenantScope::Kvk(5));
        assert_eq!(scope.effective_kvk(Some(7)), Some(5));
        assert_eq!(scope.effective_kvk(None), Some(5));
        assert_eq!(scope.kvk_filter(), Some(5));
    }

    #[test]
    fn test_admin_roles_keep_requested_kvk() {
        let user = UserContext::new(2, Role::SuperAdmin, None);
        let scope = TenantScope::for_user(Some(&user)).unwrap();
        assert_eq!(scope, TenantScope::Unrestricted);
        assert_eq!(scope.effective_kvk(Some(7)), Some(7));
        assert_eq!(scope.kvk_filter(), None);
    }

    #[test]
    fn test_kvk_user_without_kvk_is_rejected() {
        let user = UserContext::new(3, Role::KvkUser, None);
        assert!(matches!(
            TenantScope::for_user(Some(&user)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_no_user_is_unrestricted() {
        assert_eq!(TenantScope::for_user(None).unwrap(), TenantScope::Unrestricted);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("kvk_admin".parse::<Role>().unwrap(), Role::KvkAdmin);
        assert_eq!("KVK-User".parse::<Role>().unwrap(), Role::KvkUser);
        assert_eq!("super admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_context_deserializes_camel_case() {
        let user: UserContext =
            serde_json::from_str(r#"{"userId": 9, "role": "kvk_user", "kvkId": 4}"#).unwrap();
        assert_eq!(user, UserContext::new(9, Role::KvkUser, Some(4)));
    }
}
