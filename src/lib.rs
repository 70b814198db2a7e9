// src/lib.rs
// KVK Reporting - data layer for agricultural-extension reports
//
// Architecture:
// - Domain: master-data registry, tenant policy, value coercion
// - Forms: declarative report schemas, input normalization, view-model
// - Repositories: one registry-driven and one schema-driven SQLite mapper
// - Services: reference validation, delete protection, tenant scoping
// - Application Layer: transport boundary (commands, DTOs, error responses)

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod forms;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{resolve, Entity, Record, RegistryEntry, Role, TenantScope, UserContext};

// ============================================================================
// PUBLIC API - Forms
// ============================================================================

pub use forms::{FormKind, FormSchema};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Configuration & Database
// ============================================================================

pub use config::AppConfig;
pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    FormRepository, ListOptions, MasterDataRepository, Page, SortDirection, SqliteFormRepository,
    SqliteMasterDataRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{FormService, MasterDataService, ReferenceValidator};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, ErrorResponse, ErrorType};
