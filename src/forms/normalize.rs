// src/forms/normalize.rs
//
// Input normalization
//
// Turns a loosely-typed request body into storage values, once, for every
// form: the first non-blank alias wins, values are coerced to the field's
// kind, numeric garbage counts as absent, defaults fill the gaps.

use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use super::schema::{FieldDefault, FieldKind, FormField, FormSchema, KVK_ALIASES};
use crate::domain::values::{is_blank, json_integer, to_sql, Record};
use crate::domain::ValueKind;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every field is written; absent fields take their default
    Create,
    /// Only fields present in the body are written
    Update,
}

/// Normalized value for one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Sql(SqlValue),
    /// Free-text name to be looked up (or created) in a reference table
    ReferenceName(String),
}

#[derive(Debug, Clone)]
pub struct NormalizedRow {
    pub values: Vec<(&'static FormField, FieldValue)>,
}

impl NormalizedRow {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(f, _)| f.field == field)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedInput {
    /// kvkId as sent by the client; the tenant policy may override it
    pub kvk_id: Option<i64>,
    pub row: NormalizedRow,
    /// `None` leaves existing detail rows alone (update only)
    pub details: Option<Vec<NormalizedRow>>,
}

#[derive(Clone, Copy)]
enum Lookup<'a> {
    Missing,
    Blank,
    Found(&'a Value),
}

/// First non-blank value among `names`; `Blank` if some name was present
/// but every present one was blank.
fn first_present<'a>(raw: &'a Record, names: impl Iterator<Item = &'static str>) -> Lookup<'a> {
    let mut saw_blank = false;
    for name in names {
        match raw.get(name) {
            Some(value) if !is_blank(value) => return Lookup::Found(value),
            Some(_) => saw_blank = true,
            None => {}
        }
    }
    if saw_blank {
        Lookup::Blank
    } else {
        Lookup::Missing
    }
}

pub fn normalize(schema: &FormSchema, raw: &Record, mode: WriteMode) -> AppResult<NormalizedInput> {
    let kvk_id = match first_present(raw, KVK_ALIASES.iter().copied()) {
        Lookup::Found(value) => json_integer(value).filter(|id| *id > 0),
        _ => None,
    };

    let row = normalize_row(schema.fields, raw, mode)?;

    let details = match schema.details {
        None => None,
        Some(detail) => match first_present(raw, detail.input_names()) {
            Lookup::Found(Value::Array(items)) => {
                let mut rows = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let object = item.as_object().ok_or_else(|| {
                        AppError::validation(format!("{}[{}] must be an object", detail.key, index))
                    })?;
                    rows.push(normalize_row(detail.fields, object, WriteMode::Create)?);
                }
                Some(rows)
            }
            Lookup::Found(_) => {
                return Err(AppError::validation(format!(
                    "{} must be a list",
                    detail.key
                )))
            }
            Lookup::Blank => Some(Vec::new()),
            Lookup::Missing => match mode {
                WriteMode::Create => Some(Vec::new()),
                WriteMode::Update => None,
            },
        },
    };

    Ok(NormalizedInput { kvk_id, row, details })
}

fn normalize_row(
    fields: &'static [FormField],
    raw: &Record,
    mode: WriteMode,
) -> AppResult<NormalizedRow> {
    let mut values = Vec::with_capacity(fields.len());

    for field in fields {
        let (lookup, candidate) = match field.kind {
            FieldKind::Value(kind) => resolve_value(field, kind, raw)?,
            FieldKind::Reference(_) => resolve_reference(field, raw),
        };

        if mode == WriteMode::Update && matches!(lookup, Lookup::Missing) {
            continue;
        }

        let value = match candidate {
            Some(value) => value,
            None => match default_value(field.default) {
                Some(value) => FieldValue::Sql(value),
                None if field.required => {
                    return Err(AppError::validation(format!("{} is required", field.field)));
                }
                None => FieldValue::Sql(SqlValue::Null),
            },
        };

        values.push((field, value));
    }

    Ok(NormalizedRow { values })
}

fn resolve_value<'a>(
    field: &FormField,
    kind: ValueKind,
    raw: &'a Record,
) -> AppResult<(Lookup<'a>, Option<FieldValue>)> {
    let lookup = first_present(raw, field.input_names());
    let candidate = match &lookup {
        Lookup::Found(value) => match to_sql(kind, value) {
            Ok(SqlValue::Null) => None,
            Ok(sql) => Some(FieldValue::Sql(sql)),
            Err(_) if matches!(kind, ValueKind::Integer | ValueKind::Real) => {
                log::debug!("{}: ignoring non-numeric value {}", field.field, value);
                None
            }
            Err(message) => {
                return Err(AppError::validation(format!("{}: {}", field.field, message)))
            }
        },
        _ => None,
    };
    Ok((lookup, candidate))
}

/// Reference fields take an id under the field's own names, or a name
/// under the reference table's name aliases. A non-numeric string sent
/// under an id name is treated as a name; a numeric one that is not a
/// valid id counts as absent.
fn resolve_reference<'a>(field: &FormField, raw: &'a Record) -> (Lookup<'a>, Option<FieldValue>) {
    let FieldKind::Reference(reference) = field.kind else {
        return (Lookup::Missing, None);
    };

    let by_id = first_present(raw, field.input_names());
    if let Lookup::Found(value) = by_id {
        if let Some(id) = json_integer(value).filter(|id| *id > 0) {
            return (by_id, Some(FieldValue::Sql(SqlValue::Integer(id))));
        }
        if let Some(name) = value.as_str().map(str::trim) {
            if name.parse::<f64>().map_or(true, |n| !n.is_finite()) {
                return (by_id, Some(FieldValue::ReferenceName(name.to_string())));
            }
            log::debug!("{}: ignoring invalid id {}", field.field, name);
        }
    }

    let names = std::iter::once(reference.name_field).chain(reference.name_aliases.iter().copied());
    match first_present(raw, names) {
        Lookup::Found(value) => {
            let name = match value {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            (Lookup::Found(value), Some(FieldValue::ReferenceName(name)))
        }
        Lookup::Blank => (Lookup::Blank, None),
        Lookup::Missing => match by_id {
            Lookup::Missing => (Lookup::Missing, None),
            _ => (Lookup::Blank, None),
        },
    }
}

fn default_value(default: FieldDefault) -> Option<SqlValue> {
    match default {
        FieldDefault::None => None,
        FieldDefault::Integer(i) => Some(SqlValue::Integer(i)),
        FieldDefault::Real(f) => Some(SqlValue::Real(f)),
        FieldDefault::Text(s) => Some(SqlValue::Text(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::catalog::{CELEBRATIONS, CSISA, OFT, TRAINING};
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn new_oft(value: Value) -> NormalizedInput {
        normalize(&OFT, &record(value), WriteMode::Create).unwrap()
    }

    fn sql(row: &NormalizedRow, field: &str) -> SqlValue {
        match row.get(field) {
            Some(FieldValue::Sql(v)) => v.clone(),
            other => panic!("{} is not a plain value: {:?}", field, other),
        }
    }

    #[test]
    fn test_first_non_blank_alias_wins() {
        let raw = record(json!({
            "title": "Seed treatment",
            "generalM": "",
            "gen_m": "12",
            "farmersGeneralM": 99
        }));
        let input = normalize(&TRAINING, &raw, WriteMode::Create).unwrap();
        assert_eq!(sql(&input.row, "generalM"), SqlValue::Integer(12));
    }

    #[test]
    fn test_create_fills_defaults() {
        let raw = record(json!({ "trainingTitle": "IPM", "kvkId": "4" }));
        let input = normalize(&TRAINING, &raw, WriteMode::Create).unwrap();

        assert_eq!(input.kvk_id, Some(4));
        assert_eq!(sql(&input.row, "title"), SqlValue::Text("IPM".into()));
        assert_eq!(sql(&input.row, "generalF"), SqlValue::Integer(0));
        assert_eq!(sql(&input.row, "campusType"), SqlValue::Text("On Campus".into()));
        assert_eq!(sql(&input.row, "venue"), SqlValue::Null);
    }

    #[test]
    fn test_non_numeric_counts_fall_back_to_default() {
        let raw = record(json!({ "title": "IPM", "scM": "NaN", "stF": "abc" }));
        let input = normalize(&TRAINING, &raw, WriteMode::Create).unwrap();
        assert_eq!(sql(&input.row, "scM"), SqlValue::Integer(0));
        assert_eq!(sql(&input.row, "stF"), SqlValue::Integer(0));
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let raw = record(json!({ "title": "IPM", "startDate": "someday" }));
        let err = normalize(&TRAINING, &raw, WriteMode::Create).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("startDate")));
    }

    #[test]
    fn test_missing_required_field() {
        let raw = record(json!({ "venue": "Hall" }));
        let err = normalize(&TRAINING, &raw, WriteMode::Create).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("title")));
    }

    #[test]
    fn test_update_only_touches_present_fields() {
        let raw = record(json!({ "venue": "Farm", "gen_f": "" }));
        let input = normalize(&TRAINING, &raw, WriteMode::Update).unwrap();

        let fields: Vec<_> = input.row.values.iter().map(|(f, _)| f.field).collect();
        assert_eq!(fields, vec!["venue", "generalF"]);
        // Present but blank resets to the default.
        assert_eq!(sql(&input.row, "generalF"), SqlValue::Integer(0));
    }

    #[test]
    fn test_update_cannot_blank_required_field() {
        let raw = record(json!({ "title": "  " }));
        assert!(normalize(&TRAINING, &raw, WriteMode::Update).is_err());
    }

    #[test]
    fn test_reference_by_id_or_name() {
        let by_id = new_oft(json!({ "title": "t", "cropId": "3" }));
        assert_eq!(
            by_id.row.get("cropId"),
            Some(&FieldValue::Sql(SqlValue::Integer(3)))
        );

        let by_name = new_oft(json!({ "title": "t", "crop": " Wheat " }));
        assert_eq!(
            by_name.row.get("cropId"),
            Some(&FieldValue::ReferenceName("Wheat".into()))
        );

        let name_under_id = new_oft(json!({ "title": "t", "cropId": "Maize" }));
        assert_eq!(
            name_under_id.row.get("cropId"),
            Some(&FieldValue::ReferenceName("Maize".into()))
        );
    }

    #[test]
    fn test_invalid_numeric_reference_is_absent() {
        for id in ["0", "-3", "2.5"] {
            let input = new_oft(json!({ "title": "t", "cropId": id }));
            assert_eq!(
                input.row.get("cropId"),
                Some(&FieldValue::Sql(SqlValue::Null)),
                "cropId {:?} must not become a crop name",
                id
            );
        }

        let name_wins = new_oft(json!({ "title": "t", "cropId": "0", "crop": "Rice" }));
        assert_eq!(
            name_wins.row.get("cropId"),
            Some(&FieldValue::ReferenceName("Rice".into()))
        );
    }

    #[test]
    fn test_required_reference() {
        let err = normalize(&CELEBRATIONS, &record(json!({ "participants": 5 })), WriteMode::Create)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("importantDayId")));

        let ok = normalize(
            &CELEBRATIONS,
            &record(json!({ "importantDay": "World Soil Day" })),
            WriteMode::Create,
        )
        .unwrap();
        assert_eq!(
            ok.row.get("importantDayId"),
            Some(&FieldValue::ReferenceName("World Soil Day".into()))
        );
    }

    #[test]
    fn test_details_are_normalized() {
        let raw = record(json!({
            "year": 2024,
            "crops": [
                { "crop": "Rice", "area": "2.5", "yield": 41 },
                { "cropId": 7 }
            ]
        }));
        let input = normalize(&CSISA, &raw, WriteMode::Create).unwrap();
        let details = input.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(
            details[0].get("cropId"),
            Some(&FieldValue::ReferenceName("Rice".into()))
        );
        assert_eq!(sql(&details[0], "areaHa"), SqlValue::Real(2.5));
        assert_eq!(sql(&details[1], "areaHa"), SqlValue::Real(0.0));
    }

    #[test]
    fn test_details_untouched_on_update_when_absent() {
        let raw = record(json!({ "remarks": "ok" }));
        let input = normalize(&CSISA, &raw, WriteMode::Update).unwrap();
        assert!(input.details.is_none());
    }

    #[test]
    fn test_details_must_be_a_list() {
        let raw = record(json!({ "year": 2024, "cropDetails": "rice" }));
        assert!(normalize(&CSISA, &raw, WriteMode::Create).is_err());
    }

    #[test]
    fn test_invalid_kvk_id_is_absent() {
        let raw = record(json!({ "title": "t", "kvk_id": "x" }));
        let input = normalize(&TRAINING, &raw, WriteMode::Create).unwrap();
        assert_eq!(input.kvk_id, None);
    }
}
