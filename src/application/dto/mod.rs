// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// PRINCIPLES:
// - DTOs are transport-friendly representations
// - Incoming parameters are parsed leniently (garbage -> default)
// - Outgoing shapes are what the report UI reads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::values::{is_blank, json_integer, lenient_u32};
use crate::domain::Record;
use crate::error::{AppError, AppResult};
use crate::repositories::{ListOptions, Page, SortDirection};

// ============================================================================
// REQUEST DTOs
// ============================================================================

/// List query as sent by a client: `{ page, limit, search, sortBy,
/// sortOrder, filters }`, every member optional and loosely typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQueryDto {
    pub page: Option<Value>,
    pub limit: Option<Value>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(default)]
    pub filters: Record,
}

impl ListQueryDto {
    /// Parse a query value; anything unreadable yields the defaults.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::default(),
            other => serde_json::from_value(other.clone()).unwrap_or_else(|err| {
                log::debug!("Ignoring malformed list query: {}", err);
                Self::default()
            }),
        }
    }
}

impl From<ListQueryDto> for ListOptions {
    fn from(query: ListQueryDto) -> Self {
        ListOptions {
            page: lenient_u32(query.page.as_ref()),
            limit: lenient_u32(query.limit.as_ref()),
            search: query.search,
            sort_by: query.sort_by,
            sort_order: query
                .sort_order
                .as_deref()
                .map(SortDirection::parse_lenient)
                .unwrap_or_default(),
            filters: query.filters,
        }
    }
}

/// `nameExists` query: `{ name, excludeId, filters }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameExistsQueryDto {
    #[serde(default)]
    pub name: String,
    pub exclude_id: Option<Value>,
    #[serde(default)]
    pub filters: Record,
}

impl NameExistsQueryDto {
    pub fn from_value(value: &Value) -> AppResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// A malformed exclude id is ignored
    pub fn exclude_id(&self) -> Option<i64> {
        self.exclude_id
            .as_ref()
            .filter(|v| !is_blank(v))
            .and_then(json_integer)
            .filter(|id| *id > 0)
    }
}

/// Request bodies must be JSON objects; `null` reads as empty.
pub fn body_to_record(body: &Value) -> AppResult<Record> {
    match body {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Record::new()),
        _ => Err(AppError::validation("Request body must be a JSON object")),
    }
}

// ============================================================================
// RESPONSE DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `{ data, total }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
}

impl<T> From<Page<T>> for ListResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.rows,
            total: page.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

/// `{ data, pagination: { total, page, limit, totalPages } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationDto,
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = PaginationDto {
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(),
        };
        Self {
            data: page.rows,
            pagination,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameExistsDto {
    pub exists: bool,
}

/// One form as listed by the CLI and the forms endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummaryDto {
    pub name: String,
    pub title: String,
    pub fields: Vec<String>,
    pub detail_key: Option<String>,
}
