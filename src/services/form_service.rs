// src/services/form_service.rs
//
// Report form orchestration
//
// Every operation runs the same pipeline: derive the tenant scope from
// the caller, normalize the body against the form schema, hit the
// repository with the scope's KVK filter, reshape the stored record for
// the response.

use std::sync::Arc;

use crate::domain::values::json_integer;
use crate::domain::{Record, TenantScope, UserContext};
use crate::error::{AppError, AppResult};
use crate::forms::{normalize, present, FormKind, WriteMode, KVK_ALIASES};
use crate::repositories::{FormChanges, FormRepository, ListOptions, Page};

pub struct FormService {
    repo: Arc<dyn FormRepository>,
    default_limit: u32,
}

impl FormService {
    pub fn new(repo: Arc<dyn FormRepository>, default_limit: u32) -> Self {
        Self { repo, default_limit }
    }

    pub fn create(
        &self,
        form: FormKind,
        user: Option<&UserContext>,
        body: &Record,
    ) -> AppResult<Record> {
        let schema = form.schema();
        let scope = TenantScope::for_user(user)?;
        let input = normalize(schema, body, WriteMode::Create)?;

        let kvk_id = scope
            .effective_kvk(input.kvk_id)
            .ok_or_else(|| AppError::validation("kvkId is required"))?;

        let record = self
            .repo
            .create(schema, kvk_id, &input.row, input.details.as_deref())?;
        Ok(present(schema, &record))
    }

    pub fn find_all(
        &self,
        form: FormKind,
        user: Option<&UserContext>,
        mut options: ListOptions,
    ) -> AppResult<Page<Record>> {
        let schema = form.schema();
        let scope = TenantScope::for_user(user)?;

        // kvkId is a tenant concern, not a column filter
        let mut requested = None;
        for alias in KVK_ALIASES {
            if let Some(value) = options.filters.remove(*alias) {
                requested = requested.or_else(|| json_integer(&value));
            }
        }
        if options.limit.filter(|l| *l > 0).is_none() {
            options.limit = Some(self.default_limit);
        }

        let page = self
            .repo
            .find_all(schema, scope.effective_kvk(requested), &options)?;
        Ok(page.map(|record| present(schema, &record)))
    }

    pub fn find_by_id(
        &self,
        form: FormKind,
        user: Option<&UserContext>,
        id: i64,
    ) -> AppResult<Record> {
        let schema = form.schema();
        let scope = TenantScope::for_user(user)?;

        self.repo
            .find_by_id(schema, id, scope.kvk_filter())?
            .map(|record| present(schema, &record))
            .ok_or(AppError::NotFoundOrUnauthorized)
    }

    pub fn update(
        &self,
        form: FormKind,
        user: Option<&UserContext>,
        id: i64,
        body: &Record,
    ) -> AppResult<Record> {
        let schema = form.schema();
        let scope = TenantScope::for_user(user)?;
        let input = normalize(schema, body, WriteMode::Update)?;

        // Only unrestricted callers may move a record between KVKs
        let kvk_id = match scope {
            TenantScope::Unrestricted => input.kvk_id,
            TenantScope::Kvk(_) => None,
        };
        let changes = FormChanges {
            kvk_id,
            row: input.row,
            details: input.details,
        };

        self.repo
            .update(schema, id, scope.kvk_filter(), &changes)?
            .map(|record| present(schema, &record))
            .ok_or(AppError::NotFoundOrUnauthorized)
    }

    pub fn delete(&self, form: FormKind, user: Option<&UserContext>, id: i64) -> AppResult<()> {
        let schema = form.schema();
        let scope = TenantScope::for_user(user)?;

        if self.repo.delete(schema, id, scope.kvk_filter())? {
            Ok(())
        } else {
            Err(AppError::NotFoundOrUnauthorized)
        }
    }
}
