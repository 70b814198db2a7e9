// src/forms/schema.rs
//
// Declarative form schemas
//
// A form is one table of KVK-scoped report records. Each field declares
// the names it may arrive under (aliases), the names it is re-emitted
// under (aliases plus UI table headers), its storage kind, default and
// whether a create must carry it.

use std::collections::HashSet;

use crate::domain::{DomainError, DomainResult, ValueKind};

/// Names a KVK id may arrive under
pub const KVK_ALIASES: &[&str] = &["kvkId", "kvk_id", "kvk"];

/// Every form table carries its owning KVK in this column
pub const KVK_COLUMN: &str = "kvk_id";
const KVK_TABLE: &str = "kvks";

/// A form or detail column holding an id from a master table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredReference {
    pub table: &'static str,
    pub column: &'static str,
}

/// Free-text reference list (crops, important days, seasons)
#[derive(Debug)]
pub struct ReferenceTable {
    pub table: &'static str,
    pub id_column: &'static str,
    pub name_column: &'static str,
    /// Response key carrying the resolved name
    pub name_field: &'static str,
    /// Request keys that carry a name instead of an id
    pub name_aliases: &'static [&'static str],
    /// Extra response keys for the name
    pub name_labels: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Value(ValueKind),
    /// Integer id into a reference table; accepts an id or a name
    Reference(&'static ReferenceTable),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    None,
    Integer(i64),
    Real(f64),
    Text(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FormField {
    /// Canonical (internal) field name
    pub field: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    /// Alternate request names, also re-emitted on read
    pub aliases: &'static [&'static str],
    /// UI table headers, emitted on read only
    pub labels: &'static [&'static str],
    pub default: FieldDefault,
    pub required: bool,
}

impl FormField {
    pub const fn new(field: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            field,
            column,
            kind,
            aliases: &[],
            labels: &[],
            default: FieldDefault::None,
            required: false,
        }
    }

    pub const fn integer(field: &'static str, column: &'static str) -> Self {
        Self::new(field, column, FieldKind::Value(ValueKind::Integer))
    }

    pub const fn real(field: &'static str, column: &'static str) -> Self {
        Self::new(field, column, FieldKind::Value(ValueKind::Real))
    }

    pub const fn text(field: &'static str, column: &'static str) -> Self {
        Self::new(field, column, FieldKind::Value(ValueKind::Text))
    }

    pub const fn date(field: &'static str, column: &'static str) -> Self {
        Self::new(field, column, FieldKind::Value(ValueKind::Date))
    }

    pub const fn reference(
        field: &'static str,
        column: &'static str,
        table: &'static ReferenceTable,
    ) -> Self {
        Self::new(field, column, FieldKind::Reference(table))
    }

    pub const fn aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    pub const fn labels(self, labels: &'static [&'static str]) -> Self {
        Self { labels, ..self }
    }

    pub const fn default(self, default: FieldDefault) -> Self {
        Self { default, ..self }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Every request key this field may arrive under, canonical first
    pub fn input_names(&self) -> impl Iterator<Item = &'static str> {
        let aliases: &'static [&'static str] = self.aliases;
        std::iter::once(self.field).chain(aliases.iter().copied())
    }
}

/// Child rows written together with their parent record
#[derive(Debug)]
pub struct DetailSchema {
    /// Response/request key holding the rows
    pub key: &'static str,
    pub aliases: &'static [&'static str],
    pub table: &'static str,
    pub id_column: &'static str,
    pub id_field: &'static str,
    /// Column pointing at the parent record
    pub parent_column: &'static str,
    pub fields: &'static [FormField],
}

impl DetailSchema {
    pub fn input_names(&self) -> impl Iterator<Item = &'static str> {
        let aliases: &'static [&'static str] = self.aliases;
        std::iter::once(self.key).chain(aliases.iter().copied())
    }
}

#[derive(Debug)]
pub struct FormSchema {
    /// Route name, e.g. "soil-testing"
    pub name: &'static str,
    pub title: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub id_field: &'static str,
    pub fields: &'static [FormField],
    pub details: Option<&'static DetailSchema>,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&'static FormField> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Columns of this form and its detail rows that point at `master_table`
    pub fn references_to(&self, master_table: &str) -> Vec<StoredReference> {
        let mut refs = Vec::new();
        if master_table == KVK_TABLE {
            refs.push(StoredReference {
                table: self.table,
                column: KVK_COLUMN,
            });
        }
        push_references(&mut refs, self.table, self.fields, master_table);
        if let Some(details) = self.details {
            push_references(&mut refs, details.table, details.fields, master_table);
        }
        refs
    }

    /// Check that no request name is claimed by two fields and that no
    /// label shadows another field's request name.
    pub fn validate(&self) -> DomainResult<()> {
        let mut inputs: HashSet<&str> = KVK_ALIASES.iter().copied().collect();
        inputs.insert(self.id_field);
        if let Some(details) = self.details {
            claim_names(&mut inputs, details.input_names(), self.name)?;
        }
        collect_field_inputs(&mut inputs, self.fields, self.name)?;

        check_labels(&inputs, self.fields, self.name)?;

        if let Some(details) = self.details {
            let mut detail_inputs: HashSet<&str> = HashSet::new();
            detail_inputs.insert(details.id_field);
            collect_field_inputs(&mut detail_inputs, details.fields, details.key)?;
            check_labels(&detail_inputs, details.fields, details.key)?;
        }

        Ok(())
    }
}

fn push_references(
    refs: &mut Vec<StoredReference>,
    table: &'static str,
    fields: &'static [FormField],
    master_table: &str,
) {
    for field in fields {
        if let FieldKind::Reference(reference) = field.kind {
            if reference.table == master_table {
                refs.push(StoredReference {
                    table,
                    column: field.column,
                });
            }
        }
    }
}

fn claim_names<'a>(
    seen: &mut HashSet<&'a str>,
    names: impl Iterator<Item = &'a str>,
    owner: &str,
) -> DomainResult<()> {
    for name in names {
        if !seen.insert(name) {
            return Err(DomainError::InvariantViolation(format!(
                "{}: request name '{}' is claimed twice",
                owner, name
            )));
        }
    }
    Ok(())
}

fn collect_field_inputs(
    seen: &mut HashSet<&'static str>,
    fields: &'static [FormField],
    owner: &str,
) -> DomainResult<()> {
    for field in fields {
        claim_names(seen, field.input_names(), owner)?;
        if let FieldKind::Reference(reference) = field.kind {
            claim_names(
                seen,
                std::iter::once(reference.name_field).chain(reference.name_aliases.iter().copied()),
                owner,
            )?;
        }
    }
    Ok(())
}

fn check_labels(
    inputs: &HashSet<&'static str>,
    fields: &'static [FormField],
    owner: &str,
) -> DomainResult<()> {
    for field in fields {
        for label in field.labels {
            if inputs.contains(label) {
                return Err(DomainError::InvariantViolation(format!(
                    "{}: label '{}' shadows a request name",
                    owner, label
                )));
            }
        }
    }
    Ok(())
}
