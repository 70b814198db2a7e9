// src/domain/mod.rs
//
// Domain Root
//
// Master-data registry, tenant policy and value coercion.
// All other modules import from `crate::domain::*`

pub mod access;
pub mod entity;
pub mod registry;
pub mod values;

pub use access::{Role, TenantScope, UserContext};
pub use entity::Entity;
pub use registry::{resolve, ChildCount, Column, ParentRef, RegistryEntry};
pub use values::{Record, ValueKind};

use thiserror::Error;

/// Domain-level errors
/// These represent violations of form or registry declarations
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
