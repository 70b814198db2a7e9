// src/repositories/query.rs
//
// List options and WHERE-clause assembly shared by the repositories.
//
// Identifiers placed into SQL come from the static registry and form
// schemas only; every value is bound as a parameter.

use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

use crate::db::connection::FOLD_CASE_FN;
use crate::domain::Record;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything other than "desc" (any case) sorts ascending.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Case-insensitive substring match on the display name
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: SortDirection,
    /// Equality filters keyed by API field name
    pub filters: Record,
}

impl ListOptions {
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// One page of rows plus the unpaginated match count
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.limit == 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        (self.total + limit - 1) / limit
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
        }
    }
}

/// AND-joined conditions with positional parameters
#[derive(Debug, Default)]
pub(crate) struct WhereClause {
    conditions: Vec<String>,
    params: Vec<SqlValue>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// `condition` must contain exactly one `?` placeholder.
    pub fn push(&mut self, condition: impl Into<String>, value: SqlValue) {
        self.conditions.push(condition.into());
        self.params.push(value);
    }

    pub fn push_eq(&mut self, column: &str, value: SqlValue) {
        if value == SqlValue::Null {
            self.conditions.push(format!("{} IS NULL", column));
        } else {
            self.push(format!("{} = ?", column), value);
        }
    }

    /// Case-insensitive substring match, Unicode included
    pub fn push_contains(&mut self, column: &str, needle: &str) {
        self.push(
            format!("{}({}) LIKE ? ESCAPE '\\'", FOLD_CASE_FN, column),
            SqlValue::Text(format!("%{}%", escape_like(&needle.to_lowercase()))),
        );
    }

    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Parameters followed by LIMIT and OFFSET values
    pub fn params_with_page(&self, limit: u32, offset: i64) -> Vec<SqlValue> {
        let mut params = self.params.clone();
        params.push(SqlValue::Integer(i64::from(limit)));
        params.push(SqlValue::Integer(offset));
        params
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_and_limit_defaults() {
        let options = ListOptions::default();
        assert_eq!(options.page(), 1);
        assert_eq!(options.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(options.offset(), 0);
    }

    #[test]
    fn test_limit_is_capped() {
        let options = ListOptions {
            page: Some(3),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(options.limit(), MAX_PAGE_SIZE);
        assert_eq!(options.offset(), 200);
    }

    #[test]
    fn test_zero_page_and_limit_fall_back() {
        let options = ListOptions {
            page: Some(0),
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(options.page(), 1);
        assert_eq!(options.limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_sort_direction() {
        assert_eq!(SortDirection::parse_lenient("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse_lenient("sideways"), SortDirection::Asc);
    }

    #[test]
    fn test_total_pages() {
        let page: Page<()> = Page {
            rows: vec![],
            total: 45,
            page: 1,
            limit: 20,
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_where_clause() {
        let mut clause = WhereClause::new();
        assert_eq!(clause.sql(), "");

        clause.push_eq("zone_id", SqlValue::Integer(3));
        clause.push_contains("state_name", "50%_OFF");
        clause.push_eq("org_id", SqlValue::Null);

        assert_eq!(
            clause.sql(),
            " WHERE zone_id = ? AND fold_case(state_name) LIKE ? ESCAPE '\\' AND org_id IS NULL"
        );
        assert_eq!(
            clause.params(),
            &[
                SqlValue::Integer(3),
                SqlValue::Text("%50\\%\\_off%".to_string())
            ]
        );
        assert_eq!(clause.params_with_page(10, 20).len(), 4);
    }
}
