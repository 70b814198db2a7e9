// src/error/mod.rs
//
// Error types shared by every layer

pub mod types;

pub use types::{
    is_foreign_key_violation, is_unique_violation, AppError, AppResult, CONFLICT_STATUS,
};
