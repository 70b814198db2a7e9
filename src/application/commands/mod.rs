// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between a transport and the services
// - Commands accept raw ids and JSON, return DTOs
// - Commands convert errors into ErrorResponse
// - Commands NEVER contain business logic

pub mod form_commands;
pub mod master_data_commands;

pub use form_commands::*;
pub use master_data_commands::{
    check_name_exists, create_master_data, delete_master_data, get_hierarchy, get_master_data,
    get_master_stats, list_master_data, update_master_data, CommandResult,
};
