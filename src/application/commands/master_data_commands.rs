// src/application/commands/master_data_commands.rs

use std::collections::BTreeMap;

use serde_json::Value;

use crate::application::{
    dto::*,
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};
use crate::domain::values::parse_id;
use crate::domain::Record;
use crate::error::{AppError, AppResult};
use crate::repositories::ListOptions;

pub type CommandResult<T> = Result<T, ErrorResponse>;

/// Run a command body, converting its error for the caller
pub(crate) fn run<T>(body: impl FnOnce() -> AppResult<T>) -> CommandResult<T> {
    body().to_error_response()
}

/// List rows of a master entity
pub fn list_master_data(
    state: &AppState,
    entity: &str,
    query: &Value,
) -> CommandResult<PaginatedResponse<Record>> {
    let options: ListOptions = ListQueryDto::from_value(query).into();
    state
        .master_data_service
        .list(entity, options)
        .map(PaginatedResponse::from)
        .to_error_response()
}

/// Get one row with its relations
pub fn get_master_data(state: &AppState, entity: &str, id: &str) -> CommandResult<Record> {
    run(|| {
        let id = parse_id(id)?;
        state
            .master_data_service
            .get_by_id(entity, id)?
            .ok_or(AppError::NotFound)
    })
}

pub fn create_master_data(state: &AppState, entity: &str, body: &Value) -> CommandResult<Record> {
    run(|| {
        let data = body_to_record(body)?;
        state.master_data_service.create(entity, &data)
    })
}

pub fn update_master_data(
    state: &AppState,
    entity: &str,
    id: &str,
    body: &Value,
) -> CommandResult<Record> {
    run(|| {
        let id = parse_id(id)?;
        let data = body_to_record(body)?;
        state.master_data_service.update(entity, id, &data)
    })
}

pub fn delete_master_data(
    state: &AppState,
    entity: &str,
    id: &str,
) -> CommandResult<SuccessResponse<i64>> {
    run(|| {
        let id = parse_id(id)?;
        state.master_data_service.delete(entity, id)?;
        Ok(SuccessResponse::new(id))
    })
}

/// Pre-submit uniqueness check for a display name
pub fn check_name_exists(
    state: &AppState,
    entity: &str,
    query: &Value,
) -> CommandResult<NameExistsDto> {
    run(|| {
        let query = NameExistsQueryDto::from_value(query)?;
        let exists = state.master_data_service.name_exists(
            entity,
            &query.name,
            query.exclude_id(),
            &query.filters,
        )?;
        Ok(NameExistsDto { exists })
    })
}

/// Row counts per master entity
pub fn get_master_stats(state: &AppState) -> CommandResult<BTreeMap<String, i64>> {
    state.master_data_service.stats().to_error_response()
}

/// zone -> state -> district -> organization -> university
pub fn get_hierarchy(state: &AppState) -> CommandResult<Vec<Record>> {
    state.master_data_service.hierarchy().to_error_response()
}
