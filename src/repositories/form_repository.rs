// src/repositories/form_repository.rs
//
// Schema-driven persistence for report forms
//
// One implementation for every form. Rows are read with the KVK name and
// every reference name joined in; detail rows are loaded under the
// detail key. Header and detail writes share one transaction.
//
// Tenant filtering is passed in by the caller; a filtered miss looks
// exactly like an absent row.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde_json::Value;

use super::query::{ListOptions, Page, WhereClause};
use super::reference_lookup::lookup_or_create;
use crate::db::ConnectionPool;
use crate::domain::values::{from_sql, is_blank, to_sql};
use crate::domain::{Record, ValueKind};
use crate::error::{is_foreign_key_violation, AppError, AppResult};
use crate::forms::{DetailSchema, FieldKind, FieldValue, FormField, FormSchema, NormalizedRow};

pub trait FormRepository: Send + Sync {
    fn create(
        &self,
        schema: &FormSchema,
        kvk_id: i64,
        row: &NormalizedRow,
        details: Option<&[NormalizedRow]>,
    ) -> AppResult<Record>;
    fn find_all(
        &self,
        schema: &FormSchema,
        kvk_filter: Option<i64>,
        options: &ListOptions,
    ) -> AppResult<Page<Record>>;
    fn find_by_id(
        &self,
        schema: &FormSchema,
        id: i64,
        kvk_filter: Option<i64>,
    ) -> AppResult<Option<Record>>;
    /// `None` when the row is absent or outside `kvk_filter`
    fn update(
        &self,
        schema: &FormSchema,
        id: i64,
        kvk_filter: Option<i64>,
        changes: &FormChanges,
    ) -> AppResult<Option<Record>>;
    /// `false` when the row is absent or outside `kvk_filter`
    fn delete(&self, schema: &FormSchema, id: i64, kvk_filter: Option<i64>) -> AppResult<bool>;
}

/// Everything an update may touch
#[derive(Debug, Clone)]
pub struct FormChanges {
    /// Move the record to another KVK
    pub kvk_id: Option<i64>,
    pub row: NormalizedRow,
    /// Replacement detail rows; `None` keeps the existing ones
    pub details: Option<Vec<NormalizedRow>>,
}

pub struct SqliteFormRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteFormRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------

/// Field columns followed by one joined name per reference field
fn field_projection(
    fields: &[FormField],
    alias: &str,
    select: &mut Vec<String>,
    joins: &mut Vec<String>,
) {
    for field in fields {
        select.push(format!("{}.{}", alias, field.column));
    }
    for (index, field) in fields.iter().enumerate() {
        if let FieldKind::Reference(reference) = field.kind {
            let joined = format!("{}_r{}", alias, index);
            select.push(format!("{}.{}", joined, reference.name_column));
            joins.push(format!(
                "LEFT JOIN {table} {joined} ON {joined}.{id} = {alias}.{column}",
                table = reference.table,
                joined = joined,
                id = reference.id_column,
                alias = alias,
                column = field.column
            ));
        }
    }
}

/// Read what `field_projection` selected, starting at column `start`.
/// Returns the index of the next unread column.
fn read_fields(
    fields: &[FormField],
    row: &Row,
    start: usize,
    record: &mut Record,
) -> Result<usize, rusqlite::Error> {
    let mut index = start;
    for field in fields {
        let value: SqlValue = row.get(index)?;
        record.insert(field.field.to_string(), from_sql(value));
        index += 1;
    }
    for field in fields {
        if let FieldKind::Reference(reference) = field.kind {
            let value: SqlValue = row.get(index)?;
            record.insert(reference.name_field.to_string(), from_sql(value));
            index += 1;
        }
    }
    Ok(index)
}

fn header_from(schema: &FormSchema) -> (String, String) {
    let mut select = vec![
        format!("t.{}", schema.id_column),
        "t.kvk_id".to_string(),
        "k.kvk_name".to_string(),
    ];
    let mut joins = vec!["LEFT JOIN kvks k ON k.kvk_id = t.kvk_id".to_string()];
    field_projection(schema.fields, "t", &mut select, &mut joins);
    select.push("t.created_at".to_string());
    select.push("t.updated_at".to_string());

    (
        select.join(", "),
        format!("{} t {}", schema.table, joins.join(" ")),
    )
}

fn row_to_record(schema: &FormSchema, row: &Row) -> Result<Record, rusqlite::Error> {
    let mut record = Record::new();
    record.insert(schema.id_field.to_string(), from_sql(row.get(0)?));
    record.insert("kvkId".to_string(), from_sql(row.get(1)?));
    record.insert("kvkName".to_string(), from_sql(row.get(2)?));
    let next = read_fields(schema.fields, row, 3, &mut record)?;
    record.insert("createdAt".to_string(), from_sql(row.get(next)?));
    record.insert("updatedAt".to_string(), from_sql(row.get(next + 1)?));
    Ok(record)
}

fn load_details(conn: &Connection, detail: &DetailSchema, parent_id: i64) -> AppResult<Vec<Value>> {
    let mut select = vec![format!("d.{}", detail.id_column)];
    let mut joins = Vec::new();
    field_projection(detail.fields, "d", &mut select, &mut joins);

    let sql = format!(
        "SELECT {} FROM {} d {} WHERE d.{} = ?1 ORDER BY d.{}",
        select.join(", "),
        detail.table,
        joins.join(" "),
        detail.parent_column,
        detail.id_column
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![parent_id], |row| {
            let mut record = Record::new();
            record.insert(detail.id_field.to_string(), from_sql(row.get(0)?));
            read_fields(detail.fields, row, 1, &mut record)?;
            Ok(Value::Object(record))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn attach_details(conn: &Connection, schema: &FormSchema, record: &mut Record) -> AppResult<()> {
    if let Some(detail) = schema.details {
        let id = record.get(schema.id_field).and_then(Value::as_i64);
        let rows = match id {
            Some(id) => load_details(conn, detail, id)?,
            None => Vec::new(),
        };
        record.insert(detail.key.to_string(), Value::Array(rows));
    }
    Ok(())
}

fn scope(clause: &mut WhereClause, kvk_filter: Option<i64>) {
    if let Some(kvk_id) = kvk_filter {
        clause.push_eq("t.kvk_id", SqlValue::Integer(kvk_id));
    }
}

fn load(
    conn: &Connection,
    schema: &FormSchema,
    id: i64,
    kvk_filter: Option<i64>,
) -> AppResult<Option<Record>> {
    let (select, from) = header_from(schema);
    let mut clause = WhereClause::new();
    clause.push_eq(&format!("t.{}", schema.id_column), SqlValue::Integer(id));
    scope(&mut clause, kvk_filter);

    let sql = format!("SELECT {} FROM {}{}", select, from, clause.sql());
    let record = conn
        .query_row(&sql, params_from_iter(clause.params()), |row| row_to_record(schema, row))
        .optional()?;

    match record {
        Some(mut record) => {
            attach_details(conn, schema, &mut record)?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------

/// Storage values for a normalized row; reference names are looked up
/// or created on `conn`.
fn resolve_row(conn: &Connection, row: &NormalizedRow) -> AppResult<Vec<(&'static str, SqlValue)>> {
    let mut values = Vec::with_capacity(row.values.len());
    for (field, value) in &row.values {
        let sql = match (value, field.kind) {
            (FieldValue::Sql(sql), _) => sql.clone(),
            (FieldValue::ReferenceName(name), FieldKind::Reference(reference)) => {
                SqlValue::Integer(lookup_or_create(conn, reference, name)?)
            }
            (FieldValue::ReferenceName(name), FieldKind::Value(_)) => SqlValue::Text(name.clone()),
        };
        values.push((field.column, sql));
    }
    Ok(values)
}

fn write_error(err: rusqlite::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        AppError::validation("A referenced record does not exist")
    } else {
        AppError::Database(err)
    }
}

fn ensure_kvk(conn: &Connection, kvk_id: i64) -> AppResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM kvks WHERE kvk_id = ?1)",
        params![kvk_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(AppError::validation(format!("KVK {} does not exist", kvk_id)))
    }
}

fn insert_details(
    conn: &Connection,
    detail: &DetailSchema,
    parent_id: i64,
    rows: &[NormalizedRow],
) -> AppResult<()> {
    for row in rows {
        let mut values = resolve_row(conn, row)?;
        values.push((detail.parent_column, SqlValue::Integer(parent_id)));

        let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            detail.table,
            columns.join(", "),
            vec!["?"; values.len()].join(", ")
        );
        conn.execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))
            .map_err(write_error)?;
    }
    Ok(())
}

fn filter_clause(schema: &FormSchema, filters: &Record, clause: &mut WhereClause) -> AppResult<()> {
    for (key, raw) in filters {
        let field = schema.field(key).ok_or_else(|| {
            AppError::validation(format!(
                "Unknown filter field '{}' for {}",
                key, schema.name
            ))
        })?;
        if is_blank(raw) {
            continue;
        }
        let kind = match field.kind {
            FieldKind::Value(kind) => kind,
            FieldKind::Reference(_) => ValueKind::Integer,
        };
        let value =
            to_sql(kind, raw).map_err(|msg| AppError::validation(format!("{}: {}", key, msg)))?;
        clause.push_eq(&format!("t.{}", field.column), value);
    }
    Ok(())
}

impl FormRepository for SqliteFormRepository {
    fn create(
        &self,
        schema: &FormSchema,
        kvk_id: i64,
        row: &NormalizedRow,
        details: Option<&[NormalizedRow]>,
    ) -> AppResult<Record> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        ensure_kvk(&tx, kvk_id)?;
        let mut values = resolve_row(&tx, row)?;
        let now = Utc::now().to_rfc3339();
        values.push(("kvk_id", SqlValue::Integer(kvk_id)));
        values.push(("created_at", SqlValue::Text(now.clone())));
        values.push(("updated_at", SqlValue::Text(now)));

        let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.table,
            columns.join(", "),
            vec!["?"; values.len()].join(", ")
        );
        tx.execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))
            .map_err(write_error)?;
        let id = tx.last_insert_rowid();

        if let (Some(detail), Some(rows)) = (schema.details, details) {
            insert_details(&tx, detail, id, rows)?;
        }

        let record = load(&tx, schema, id, None)?.ok_or(AppError::NotFound)?;
        tx.commit()?;

        log::info!("Created {} {} for KVK {}", schema.name, id, kvk_id);
        Ok(record)
    }

    fn find_all(
        &self,
        schema: &FormSchema,
        kvk_filter: Option<i64>,
        options: &ListOptions,
    ) -> AppResult<Page<Record>> {
        let (select, from) = header_from(schema);
        let mut clause = WhereClause::new();
        scope(&mut clause, kvk_filter);
        filter_clause(schema, &options.filters, &mut clause)?;

        let order_by = match options.sort_by.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) if name == schema.id_field => {
                format!("t.{} {}", schema.id_column, options.sort_order.as_sql())
            }
            Some(name) => {
                let field = schema.field(name).ok_or_else(|| {
                    AppError::validation(format!(
                        "Unknown sort field '{}' for {}",
                        name, schema.name
                    ))
                })?;
                format!(
                    "t.{} {}, t.{} DESC",
                    field.column,
                    options.sort_order.as_sql(),
                    schema.id_column
                )
            }
            // Newest first
            None => format!("t.{} DESC", schema.id_column),
        };

        let (page, limit) = (options.page(), options.limit());

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let total: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM {} t{}", schema.table, clause.sql()),
            params_from_iter(clause.params()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY {} LIMIT ? OFFSET ?",
            select,
            from,
            clause.sql(),
            order_by
        );
        log::debug!("{}: {}", schema.name, sql);

        let mut rows = {
            let mut stmt = tx.prepare(&sql)?;
            let mapped = stmt.query_map(
                params_from_iter(clause.params_with_page(limit, options.offset())),
                |row| row_to_record(schema, row),
            )?;
            mapped.collect::<Result<Vec<_>, _>>()?
        };
        for record in rows.iter_mut() {
            attach_details(&tx, schema, record)?;
        }
        tx.commit()?;

        Ok(Page {
            rows,
            total,
            page,
            limit,
        })
    }

    fn find_by_id(
        &self,
        schema: &FormSchema,
        id: i64,
        kvk_filter: Option<i64>,
    ) -> AppResult<Option<Record>> {
        let conn = self.pool.get()?;
        load(&conn, schema, id, kvk_filter)
    }

    fn update(
        &self,
        schema: &FormSchema,
        id: i64,
        kvk_filter: Option<i64>,
        changes: &FormChanges,
    ) -> AppResult<Option<Record>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let mut clause = WhereClause::new();
        clause.push_eq(&format!("t.{}", schema.id_column), SqlValue::Integer(id));
        scope(&mut clause, kvk_filter);
        let exists: bool = tx.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {} t{})", schema.table, clause.sql()),
            params_from_iter(clause.params()),
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(None);
        }

        let mut values = resolve_row(&tx, &changes.row)?;
        if let Some(kvk_id) = changes.kvk_id {
            ensure_kvk(&tx, kvk_id)?;
            values.push(("kvk_id", SqlValue::Integer(kvk_id)));
        }
        values.push(("updated_at", SqlValue::Text(Utc::now().to_rfc3339())));

        let assignments: Vec<String> = values.iter().map(|(c, _)| format!("{} = ?", c)).collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            schema.table,
            assignments.join(", "),
            schema.id_column
        );
        let mut params: Vec<SqlValue> = values.into_iter().map(|(_, v)| v).collect();
        params.push(SqlValue::Integer(id));
        tx.execute(&sql, params_from_iter(params.iter()))
            .map_err(write_error)?;

        if let (Some(detail), Some(rows)) = (schema.details, changes.details.as_deref()) {
            tx.execute(
                &format!("DELETE FROM {} WHERE {} = ?1", detail.table, detail.parent_column),
                params![id],
            )?;
            insert_details(&tx, detail, id, rows)?;
        }

        let record = load(&tx, schema, id, None)?;
        tx.commit()?;

        log::info!("Updated {} {}", schema.name, id);
        Ok(record)
    }

    fn delete(&self, schema: &FormSchema, id: i64, kvk_filter: Option<i64>) -> AppResult<bool> {
        let mut clause = WhereClause::new();
        clause.push_eq(schema.id_column, SqlValue::Integer(id));
        if let Some(kvk_id) = kvk_filter {
            clause.push_eq("kvk_id", SqlValue::Integer(kvk_id));
        }

        let conn = self.pool.get()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {}{}", schema.table, clause.sql()),
            params_from_iter(clause.params()),
        )?;

        if deleted > 0 {
            log::info!("Deleted {} {}", schema.name, id);
        }
        Ok(deleted > 0)
    }
}
