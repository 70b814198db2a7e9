// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Boundary between a transport (HTTP, CLI) and the services
// - Translates loosely-typed input into service calls and DTOs
// - Maps every error to an ErrorResponse with a status

pub mod commands;
pub mod dto;
pub mod error_handling;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use state::AppState;
