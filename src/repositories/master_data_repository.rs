// src/repositories/master_data_repository.rs
//
// Registry-driven persistence for master data
//
// One implementation serves every entity in the registry. Parent
// relations are nested on read and child collections counted, so a
// district comes back as { ..., state: { ..., zone: {...} }, _count: {...} }.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde_json::Value;

use super::query::{ListOptions, Page, WhereClause};
use crate::db::ConnectionPool;
use crate::domain::values::{from_sql, is_blank, json_integer, to_sql};
use crate::domain::{Entity, Record, RegistryEntry};
use crate::error::{is_foreign_key_violation, AppError, AppResult};
use crate::forms::FormKind;

pub trait MasterDataRepository: Send + Sync {
    fn list(&self, entity: Entity, options: &ListOptions) -> AppResult<Page<Record>>;
    fn get_by_id(&self, entity: Entity, id: i64) -> AppResult<Option<Record>>;
    fn create(&self, entity: Entity, data: &Record) -> AppResult<Record>;
    fn update(&self, entity: Entity, id: i64, data: &Record) -> AppResult<Record>;
    fn delete(&self, entity: Entity, id: i64) -> AppResult<()>;
    fn name_exists(
        &self,
        entity: Entity,
        name: &str,
        exclude_id: Option<i64>,
        filters: &Record,
    ) -> AppResult<bool>;
    /// Non-zero counts of child rows and report records, keyed by label
    fn dependents(&self, entity: Entity, id: i64) -> AppResult<Vec<(&'static str, i64)>>;
    /// Row count per master entity
    fn stats(&self) -> AppResult<BTreeMap<String, i64>>;
    /// zone -> state -> district -> organization -> university
    fn hierarchy(&self) -> AppResult<Vec<Record>>;
}

/// Existence check for parent references
#[cfg_attr(test, mockall::automock)]
pub trait ParentLookup: Send + Sync {
    fn parent_exists(&self, entity: Entity, id: i64) -> AppResult<bool>;
}

pub struct SqliteMasterDataRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteMasterDataRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn select_list(entry: &RegistryEntry) -> String {
        entry
            .columns
            .iter()
            .map(|c| c.column)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn row_to_record(entry: &RegistryEntry, row: &Row) -> Result<Record, rusqlite::Error> {
        let mut record = Record::new();
        for (index, column) in entry.columns.iter().enumerate() {
            let value: SqlValue = row.get(index)?;
            record.insert(column.field.to_string(), from_sql(value));
        }
        Ok(record)
    }

    fn load_row(conn: &Connection, entry: &RegistryEntry, id: i64) -> AppResult<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            Self::select_list(entry),
            entry.table,
            entry.id_column
        );
        let record = conn
            .query_row(&sql, params![id], |row| Self::row_to_record(entry, row))
            .optional()?;
        Ok(record)
    }

    /// Nest every declared parent under its relation key, recursively.
    fn attach_parents(
        conn: &Connection,
        entry: &RegistryEntry,
        record: &mut Record,
    ) -> AppResult<()> {
        for parent in entry.parents {
            let parent_entry = parent.entity.registry_entry();
            let nested = match record.get(parent.field).and_then(json_integer) {
                Some(parent_id) => match Self::load_row(conn, parent_entry, parent_id)? {
                    Some(mut parent_row) => {
                        Self::attach_parents(conn, parent_entry, &mut parent_row)?;
                        Value::Object(parent_row)
                    }
                    None => Value::Null,
                },
                None => Value::Null,
            };
            record.insert(parent.relation.to_string(), nested);
        }
        Ok(())
    }

    fn count_children(
        conn: &Connection,
        entry: &RegistryEntry,
        id: i64,
    ) -> AppResult<Vec<(&'static str, i64)>> {
        let mut counts = Vec::with_capacity(entry.children.len());
        for child in entry.children {
            let child_entry = child.entity.registry_entry();
            let sql = format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?1",
                child_entry.table, child.column
            );
            let count: i64 = conn.query_row(&sql, params![id], |row| row.get(0))?;
            counts.push((child.label, count));
        }
        Ok(counts)
    }

    /// Report records pointing at a master row, per form
    fn count_form_references(
        conn: &Connection,
        entry: &RegistryEntry,
        id: i64,
    ) -> AppResult<Vec<(&'static str, i64)>> {
        let mut counts = Vec::new();
        for kind in FormKind::ALL {
            let schema = kind.schema();
            let refs = schema.references_to(entry.table);
            if refs.is_empty() {
                continue;
            }
            let mut total = 0;
            for stored in refs {
                let sql = format!(
                    "SELECT COUNT(*) FROM {} WHERE {} = ?1",
                    stored.table, stored.column
                );
                total += conn.query_row(&sql, params![id], |row| row.get::<_, i64>(0))?;
            }
            counts.push((schema.name, total));
        }
        Ok(counts)
    }

    fn find_dependents(
        conn: &Connection,
        entry: &RegistryEntry,
        id: i64,
    ) -> AppResult<Vec<(&'static str, i64)>> {
        let mut counts = Self::count_children(conn, entry, id)?;
        counts.extend(Self::count_form_references(conn, entry, id)?);
        Ok(counts.into_iter().filter(|(_, count)| *count > 0).collect())
    }

    /// Parents plus `_count` for a top-level row
    fn populate(conn: &Connection, entry: &RegistryEntry, record: &mut Record) -> AppResult<()> {
        Self::attach_parents(conn, entry, record)?;

        if !entry.children.is_empty() {
            if let Some(id) = record.get(entry.id_field).and_then(json_integer) {
                let counts: Record = Self::count_children(conn, entry, id)?
                    .into_iter()
                    .map(|(label, count)| (label.to_string(), Value::from(count)))
                    .collect();
                record.insert("_count".to_string(), Value::Object(counts));
            }
        }
        Ok(())
    }

    fn load_populated(
        conn: &Connection,
        entry: &RegistryEntry,
        id: i64,
    ) -> AppResult<Option<Record>> {
        match Self::load_row(conn, entry, id)? {
            Some(mut record) => {
                Self::populate(conn, entry, &mut record)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Registry columns supplied in `data`, coerced to storage values.
    ///
    /// Accepts either the API field name or the physical column name.
    fn supplied_values(
        entry: &RegistryEntry,
        data: &Record,
    ) -> AppResult<Vec<(&'static str, SqlValue)>> {
        let mut values = Vec::new();
        for column in entry.writable_columns() {
            let Some(raw) = data.get(column.field).or_else(|| data.get(column.column)) else {
                continue;
            };
            let value = to_sql(column.kind, raw)
                .map_err(|msg| AppError::validation(format!("{}: {}", column.field, msg)))?;
            if column.required && value == SqlValue::Null {
                return Err(AppError::validation(format!("{} is required", column.field)));
            }
            values.push((column.column, value));
        }
        Ok(values)
    }

    fn filter_clause(
        entry: &RegistryEntry,
        filters: &Record,
        clause: &mut WhereClause,
    ) -> AppResult<()> {
        for (key, raw) in filters {
            let column = entry.column(key).ok_or_else(|| {
                AppError::validation(format!("Unknown filter field '{}' for {}", key, entry.entity))
            })?;
            if is_blank(raw) {
                continue;
            }
            let value = to_sql(column.kind, raw)
                .map_err(|msg| AppError::validation(format!("{}: {}", column.field, msg)))?;
            clause.push_eq(column.column, value);
        }
        Ok(())
    }

    fn load_all(conn: &Connection, entry: &RegistryEntry) -> AppResult<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            Self::select_list(entry),
            entry.table,
            entry.name_column
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Self::row_to_record(entry, row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl MasterDataRepository for SqliteMasterDataRepository {
    fn list(&self, entity: Entity, options: &ListOptions) -> AppResult<Page<Record>> {
        let entry = entity.registry_entry();

        let mut clause = WhereClause::new();
        if let Some(term) = options.search_term() {
            clause.push_contains(entry.name_column, term);
        }
        Self::filter_clause(entry, &options.filters, &mut clause)?;

        let sort_by = options
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let sort_column = match sort_by {
            Some(name) => {
                entry
                    .column(name)
                    .ok_or_else(|| {
                        AppError::validation(format!(
                            "Unknown sort field '{}' for {}",
                            name, entity
                        ))
                    })?
                    .column
            }
            None => entry.id_column,
        };
        let mut order_by = format!("{} {}", sort_column, options.sort_order.as_sql());
        if sort_column != entry.id_column {
            order_by.push_str(&format!(", {} ASC", entry.id_column));
        }

        let (page, limit) = (options.page(), options.limit());

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let count_sql = format!("SELECT COUNT(*) FROM {}{}", entry.table, clause.sql());
        let total: i64 =
            tx.query_row(&count_sql, params_from_iter(clause.params()), |row| row.get(0))?;

        let select_sql = format!(
            "SELECT {} FROM {}{} ORDER BY {} LIMIT ? OFFSET ?",
            Self::select_list(entry),
            entry.table,
            clause.sql(),
            order_by
        );
        log::debug!("{}: {}", entity, select_sql);

        let mut rows = {
            let mut stmt = tx.prepare(&select_sql)?;
            let mapped = stmt.query_map(
                params_from_iter(clause.params_with_page(limit, options.offset())),
                |row| Self::row_to_record(entry, row),
            )?;
            mapped.collect::<Result<Vec<_>, _>>()?
        };
        for record in rows.iter_mut() {
            Self::populate(&tx, entry, record)?;
        }

        tx.commit()?;

        Ok(Page {
            rows,
            total,
            page,
            limit,
        })
    }

    fn get_by_id(&self, entity: Entity, id: i64) -> AppResult<Option<Record>> {
        let conn = self.pool.get()?;
        Self::load_populated(&conn, entity.registry_entry(), id)
    }

    fn create(&self, entity: Entity, data: &Record) -> AppResult<Record> {
        let entry = entity.registry_entry();
        let values = Self::supplied_values(entry, data)?;

        for column in entry.writable_columns().filter(|c| c.required) {
            if !values.iter().any(|(name, _)| *name == column.column) {
                return Err(AppError::validation(format!("{} is required", column.field)));
            }
        }

        let columns: Vec<&str> = values.iter().map(|(name, _)| *name).collect();
        let placeholders = vec!["?"; values.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            entry.table,
            columns.join(", "),
            placeholders
        );

        let conn = self.pool.get()?;
        conn.execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))
            .map_err(|e| AppError::from_write(e, entry.name_field))?;
        let id = conn.last_insert_rowid();
        log::info!("Created {} {}", entity, id);

        Self::load_populated(&conn, entry, id)?.ok_or(AppError::NotFound)
    }

    fn update(&self, entity: Entity, id: i64, data: &Record) -> AppResult<Record> {
        let entry = entity.registry_entry();
        let values = Self::supplied_values(entry, data)?;
        let conn = self.pool.get()?;

        if !values.is_empty() {
            let assignments: Vec<String> = values
                .iter()
                .map(|(name, _)| format!("{} = ?", name))
                .collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE {} = ?",
                entry.table,
                assignments.join(", "),
                entry.id_column
            );
            let mut params: Vec<SqlValue> = values.into_iter().map(|(_, v)| v).collect();
            params.push(SqlValue::Integer(id));

            let changed = conn
                .execute(&sql, params_from_iter(params.iter()))
                .map_err(|e| AppError::from_write(e, entry.name_field))?;
            if changed == 0 {
                return Err(AppError::NotFound);
            }
            log::info!("Updated {} {}", entity, id);
        }

        Self::load_populated(&conn, entry, id)?.ok_or(AppError::NotFound)
    }

    fn delete(&self, entity: Entity, id: i64) -> AppResult<()> {
        let entry = entity.registry_entry();
        let conn = self.pool.get()?;
        let sql = format!("DELETE FROM {} WHERE {} = ?1", entry.table, entry.id_column);
        let deleted = match conn.execute(&sql, params![id]) {
            Ok(deleted) => deleted,
            Err(e) if is_foreign_key_violation(&e) => {
                // Still referenced; report what holds it.
                let (label, count) = Self::find_dependents(&conn, entry, id)?
                    .into_iter()
                    .next()
                    .unwrap_or(("records", 0));
                return Err(AppError::HasDependents {
                    entity: entity.to_string(),
                    dependents: label.to_string(),
                    count,
                });
            }
            Err(e) => return Err(e.into()),
        };
        if deleted == 0 {
            return Err(AppError::NotFound);
        }
        log::info!("Deleted {} {}", entity, id);
        Ok(())
    }

    fn name_exists(
        &self,
        entity: Entity,
        name: &str,
        exclude_id: Option<i64>,
        filters: &Record,
    ) -> AppResult<bool> {
        let entry = entity.registry_entry();

        let mut clause = WhereClause::new();
        clause.push(
            format!("{} = ? COLLATE NOCASE", entry.name_column),
            SqlValue::Text(name.trim().to_string()),
        );
        if let Some(exclude) = exclude_id {
            clause.push(format!("{} <> ?", entry.id_column), SqlValue::Integer(exclude));
        }
        Self::filter_clause(entry, filters, &mut clause)?;

        let sql = format!("SELECT EXISTS(SELECT 1 FROM {}{})", entry.table, clause.sql());
        let conn = self.pool.get()?;
        let exists: bool =
            conn.query_row(&sql, params_from_iter(clause.params()), |row| row.get(0))?;
        Ok(exists)
    }

    fn dependents(&self, entity: Entity, id: i64) -> AppResult<Vec<(&'static str, i64)>> {
        let conn = self.pool.get()?;
        Self::find_dependents(&conn, entity.registry_entry(), id)
    }

    fn stats(&self) -> AppResult<BTreeMap<String, i64>> {
        let conn = self.pool.get()?;
        let mut stats = BTreeMap::new();
        for entity in Entity::ALL {
            let entry = entity.registry_entry();
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", entry.table),
                [],
                |row| row.get(0),
            )?;
            stats.insert(entity.name().to_string(), count);
        }
        Ok(stats)
    }

    fn hierarchy(&self) -> AppResult<Vec<Record>> {
        let conn = self.pool.get()?;
        let levels = Entity::HIERARCHY;

        // Built bottom-up: rows of the level below, grouped by parent id
        let mut below: HashMap<i64, Vec<Value>> = HashMap::new();
        let mut roots = Vec::new();

        for depth in (0..levels.len()).rev() {
            let entry = levels[depth].registry_entry();
            let child_label = levels
                .get(depth + 1)
                .and_then(|child| entry.child(*child))
                .map(|c| c.label);
            let parent_field = depth
                .checked_sub(1)
                .and_then(|d| entry.parent(levels[d]))
                .map(|p| p.field);

            let mut grouped: HashMap<i64, Vec<Value>> = HashMap::new();
            for mut record in Self::load_all(&conn, entry)? {
                if let Some(label) = child_label {
                    let id = record.get(entry.id_field).and_then(json_integer);
                    let children = id.and_then(|id| below.remove(&id)).unwrap_or_default();
                    record.insert(label.to_string(), Value::Array(children));
                }
                match parent_field {
                    Some(field) => {
                        if let Some(parent_id) = record.get(field).and_then(json_integer) {
                            grouped.entry(parent_id).or_default().push(Value::Object(record));
                        }
                    }
                    None => roots.push(record),
                }
            }
            below = grouped;
        }

        Ok(roots)
    }
}

impl ParentLookup for SqliteMasterDataRepository {
    fn parent_exists(&self, entity: Entity, id: i64) -> AppResult<bool> {
        let entry = entity.registry_entry();
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)",
            entry.table, entry.id_column
        );
        let exists: bool = conn.query_row(&sql, params![id], |row| row.get(0))?;
        Ok(exists)
    }
}
