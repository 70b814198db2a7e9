// src/repositories/reference_lookup.rs
//
// Lookup-or-create for free-text reference lists (crops, seasons,
// important days).
//
// Names are unique under NOCASE collation, so INSERT OR IGNORE followed
// by a re-select resolves concurrent duplicates to the same row.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{AppError, AppResult};
use crate::forms::ReferenceTable;

pub(crate) fn find_id(
    conn: &Connection,
    reference: &ReferenceTable,
    name: &str,
) -> AppResult<Option<i64>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?1 COLLATE NOCASE",
        reference.id_column, reference.table, reference.name_column
    );
    let id = conn
        .query_row(&sql, params![name], |row| row.get(0))
        .optional()?;
    Ok(id)
}

/// Id of the reference row named `name`, inserting it first if absent.
pub(crate) fn lookup_or_create(
    conn: &Connection,
    reference: &ReferenceTable,
    name: &str,
) -> AppResult<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation(format!(
            "{} must not be empty",
            reference.name_field
        )));
    }

    if let Some(id) = find_id(conn, reference, name)? {
        return Ok(id);
    }

    let sql = format!(
        "INSERT OR IGNORE INTO {} ({}) VALUES (?1)",
        reference.table, reference.name_column
    );
    if conn.execute(&sql, params![name])? > 0 {
        log::warn!("Created {} entry '{}'", reference.table, name);
    }

    find_id(conn, reference, name)?.ok_or(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_connection;
    use crate::db::initialize_database;
    use crate::forms::catalog::{CROP_REFERENCE, IMPORTANT_DAY_REFERENCE};

    fn conn() -> Connection {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_repeated_name_resolves_to_one_row() {
        let conn = conn();
        let first = lookup_or_create(&conn, &CROP_REFERENCE, "Wheat").unwrap();
        let second = lookup_or_create(&conn, &CROP_REFERENCE, " wheat ").unwrap();
        assert_eq!(first, second);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM crops", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_existing_row_is_reused() {
        let conn = conn();
        conn.execute(
            "INSERT INTO important_days (important_day_id, day_name) VALUES (40, 'World Soil Day')",
            [],
        )
        .unwrap();
        assert_eq!(
            lookup_or_create(&conn, &IMPORTANT_DAY_REFERENCE, "world soil day").unwrap(),
            40
        );
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let conn = conn();
        assert!(matches!(
            lookup_or_create(&conn, &CROP_REFERENCE, "  "),
            Err(AppError::Validation(_))
        ));
    }
}
