// src/application/commands/form_commands.rs
//
// Report form commands. The transport layer hands over the form route
// name, the authenticated user (if any) and the raw body/query.

use serde_json::Value;

use super::master_data_commands::{run, CommandResult};
use crate::application::{dto::*, state::AppState};
use crate::domain::values::parse_id;
use crate::domain::{Record, UserContext};
use crate::forms::FormKind;
use crate::repositories::ListOptions;

pub fn list_form_records(
    state: &AppState,
    form: &str,
    user: Option<&UserContext>,
    query: &Value,
) -> CommandResult<ListResponse<Record>> {
    run(|| {
        let form: FormKind = form.parse()?;
        let options: ListOptions = ListQueryDto::from_value(query).into();
        let page = state.form_service.find_all(form, user, options)?;
        Ok(ListResponse::from(page))
    })
}

pub fn get_form_record(
    state: &AppState,
    form: &str,
    user: Option<&UserContext>,
    id: &str,
) -> CommandResult<Record> {
    run(|| {
        let form: FormKind = form.parse()?;
        state.form_service.find_by_id(form, user, parse_id(id)?)
    })
}

pub fn create_form_record(
    state: &AppState,
    form: &str,
    user: Option<&UserContext>,
    body: &Value,
) -> CommandResult<Record> {
    run(|| {
        let form: FormKind = form.parse()?;
        let body = body_to_record(body)?;
        state.form_service.create(form, user, &body)
    })
}

pub fn update_form_record(
    state: &AppState,
    form: &str,
    user: Option<&UserContext>,
    id: &str,
    body: &Value,
) -> CommandResult<Record> {
    run(|| {
        let form: FormKind = form.parse()?;
        let id = parse_id(id)?;
        let body = body_to_record(body)?;
        state.form_service.update(form, user, id, &body)
    })
}

pub fn delete_form_record(
    state: &AppState,
    form: &str,
    user: Option<&UserContext>,
    id: &str,
) -> CommandResult<SuccessResponse<i64>> {
    run(|| {
        let form: FormKind = form.parse()?;
        let id = parse_id(id)?;
        state.form_service.delete(form, user, id)?;
        Ok(SuccessResponse::new(id))
    })
}

/// Every report form with its canonical field names
pub fn list_forms() -> Vec<FormSummaryDto> {
    FormKind::ALL
        .iter()
        .map(|kind| {
            let schema = kind.schema();
            FormSummaryDto {
                name: schema.name.to_string(),
                title: schema.title.to_string(),
                fields: schema.fields.iter().map(|f| f.field.to_string()).collect(),
                detail_key: schema.details.map(|d| d.key.to_string()),
            }
        })
        .collect()
}
