// src/forms/view.rs
//
// Response reshaping
//
// Stored records carry canonical field names only. Clients and report
// tables read the same value under several keys, so every record goes
// out with its aliases and UI headers filled in alongside.

use serde_json::Value;

use super::schema::{FieldKind, FormField, FormSchema};
use crate::domain::Record;

const KVK_NAME_LABEL: &str = "KVK Name";

/// Expand a stored record into its response shape.
///
/// Keys already present in the record are never overwritten.
pub fn present(schema: &FormSchema, record: &Record) -> Record {
    let mut out = Record::new();

    if let Some(id) = record.get(schema.id_field) {
        put(&mut out, "id", id);
        put(&mut out, schema.id_field, id);
    }

    let kvk_id = record.get("kvkId").cloned().unwrap_or(Value::Null);
    put(&mut out, "kvkId", &kvk_id);
    put(&mut out, "kvk_id", &kvk_id);
    let kvk_name = record.get("kvkName").cloned().unwrap_or(Value::Null);
    put(&mut out, "kvkName", &kvk_name);
    put(&mut out, KVK_NAME_LABEL, &kvk_name);

    expand_fields(&mut out, schema.fields, record);

    if let Some(detail) = schema.details {
        let rows: Vec<Value> = record
            .get(detail.key)
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(Value::as_object)
                    .map(|row| {
                        let mut shaped = Record::new();
                        if let Some(id) = row.get(detail.id_field) {
                            put(&mut shaped, detail.id_field, id);
                        }
                        expand_fields(&mut shaped, detail.fields, row);
                        Value::Object(shaped)
                    })
                    .collect()
            })
            .unwrap_or_default();
        let rows = Value::Array(rows);
        for key in detail.input_names() {
            put(&mut out, key, &rows);
        }
    }

    for stamp in ["createdAt", "updatedAt"] {
        if let Some(value) = record.get(stamp) {
            put(&mut out, stamp, value);
        }
    }

    out
}

fn expand_fields(out: &mut Record, fields: &[FormField], record: &Record) {
    for field in fields {
        let value = record.get(field.field).cloned().unwrap_or(Value::Null);
        for key in field.input_names().chain(field.labels.iter().copied()) {
            put(out, key, &value);
        }

        if let FieldKind::Reference(reference) = field.kind {
            let name = record
                .get(reference.name_field)
                .cloned()
                .unwrap_or(Value::Null);
            let keys = std::iter::once(reference.name_field)
                .chain(reference.name_aliases.iter().copied())
                .chain(reference.name_labels.iter().copied());
            for key in keys {
                put(out, key, &name);
            }
        }
    }
}

fn put(out: &mut Record, key: &str, value: &Value) {
    if !out.contains_key(key) {
        out.insert(key.to_string(), value.clone());
    }
}
