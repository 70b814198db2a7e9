// src/domain/registry.rs
//
// Entity registry
//
// One static descriptor per master entity: backing table, key/display
// fields, columns (API name <-> physical column), parent references that
// are nested on read, and child collections that are counted on read.
//
// Entries are read-only and exist for the lifetime of the process.

use super::entity::Entity;
use super::values::ValueKind;
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// API field name (camelCase)
    pub field: &'static str,
    /// Physical column name (snake_case)
    pub column: &'static str,
    pub kind: ValueKind,
    /// Must be supplied on create
    pub required: bool,
}

impl Column {
    const fn new(field: &'static str, column: &'static str, kind: ValueKind) -> Self {
        Self {
            field,
            column,
            kind,
            required: false,
        }
    }

    const fn integer(field: &'static str, column: &'static str) -> Self {
        Self::new(field, column, ValueKind::Integer)
    }

    const fn text(field: &'static str, column: &'static str) -> Self {
        Self::new(field, column, ValueKind::Text)
    }

    const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }
}

/// Foreign key to a parent entity, nested under `relation` on read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub field: &'static str,
    pub column: &'static str,
    pub entity: Entity,
    pub relation: &'static str,
}

/// Child collection whose size is reported under `_count.<label>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildCount {
    pub label: &'static str,
    pub entity: Entity,
    /// Column on the child table pointing back at this entity
    pub column: &'static str,
}

#[derive(Debug)]
pub struct RegistryEntry {
    pub entity: Entity,
    pub table: &'static str,
    pub id_field: &'static str,
    pub id_column: &'static str,
    pub name_field: &'static str,
    pub name_column: &'static str,
    pub columns: &'static [Column],
    pub parents: &'static [ParentRef],
    pub children: &'static [ChildCount],
}

impl RegistryEntry {
    /// Look up a column by API field name or physical column name.
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns
            .iter()
            .find(|c| c.field == name || c.column == name)
    }

    /// Columns a client may write (everything but the primary key)
    pub fn writable_columns(&self) -> impl Iterator<Item = &'static Column> + '_ {
        let id_column = self.id_column;
        self.columns.iter().filter(move |c| c.column != id_column)
    }

    pub fn parent(&self, entity: Entity) -> Option<&'static ParentRef> {
        self.parents.iter().find(|p| p.entity == entity)
    }

    pub fn child(&self, entity: Entity) -> Option<&'static ChildCount> {
        self.children.iter().find(|c| c.entity == entity)
    }
}

/// Resolve an entity name to its registry entry.
///
/// Fails with `UnknownEntity` for names outside the registry.
pub fn resolve(name: &str) -> AppResult<&'static RegistryEntry> {
    let entity: Entity = name.parse()?;
    Ok(entry(entity))
}

pub(crate) fn entry(entity: Entity) -> &'static RegistryEntry {
    match entity {
        Entity::Zone => &ZONES,
        Entity::State => &STATES,
        Entity::District => &DISTRICTS,
        Entity::Organization => &ORGANIZATIONS,
        Entity::University => &UNIVERSITIES,
        Entity::Kvk => &KVKS,
        Entity::Season => &SEASONS,
        Entity::Crop => &CROPS,
        Entity::ImportantDay => &IMPORTANT_DAYS,
    }
}

static ZONES: RegistryEntry = RegistryEntry {
    entity: Entity::Zone,
    table: "zones",
    id_field: "zoneId",
    id_column: "zone_id",
    name_field: "zoneName",
    name_column: "zone_name",
    columns: &[
        Column::integer("zoneId", "zone_id"),
        Column::text("zoneName", "zone_name").required(),
    ],
    parents: &[],
    children: &[ChildCount {
        label: "states",
        entity: Entity::State,
        column: "zone_id",
    }],
};

static STATES: RegistryEntry = RegistryEntry {
    entity: Entity::State,
    table: "states",
    id_field: "stateId",
    id_column: "state_id",
    name_field: "stateName",
    name_column: "state_name",
    columns: &[
        Column::integer("stateId", "state_id"),
        Column::text("stateName", "state_name").required(),
        Column::integer("zoneId", "zone_id").required(),
    ],
    parents: &[ParentRef {
        field: "zoneId",
        column: "zone_id",
        entity: Entity::Zone,
        relation: "zone",
    }],
    children: &[ChildCount {
        label: "districts",
        entity: Entity::District,
        column: "state_id",
    }],
};

static DISTRICTS: RegistryEntry = RegistryEntry {
    entity: Entity::District,
    table: "districts",
    id_field: "districtId",
    id_column: "district_id",
    name_field: "districtName",
    name_column: "district_name",
    columns: &[
        Column::integer("districtId", "district_id"),
        Column::text("districtName", "district_name").required(),
        Column::integer("stateId", "state_id").required(),
    ],
    parents: &[ParentRef {
        field: "stateId",
        column: "state_id",
        entity: Entity::State,
        relation: "state",
    }],
    children: &[
        ChildCount {
            label: "organizations",
            entity: Entity::Organization,
            column: "district_id",
        },
        ChildCount {
            label: "kvks",
            entity: Entity::Kvk,
            column: "district_id",
        },
    ],
};

static ORGANIZATIONS: RegistryEntry = RegistryEntry {
    entity: Entity::Organization,
    table: "organizations",
    id_field: "orgId",
    id_column: "org_id",
    name_field: "orgName",
    name_column: "org_name",
    columns: &[
        Column::integer("orgId", "org_id"),
        Column::text("orgName", "org_name").required(),
        Column::integer("districtId", "district_id").required(),
    ],
    parents: &[ParentRef {
        field: "districtId",
        column: "district_id",
        entity: Entity::District,
        relation: "district",
    }],
    children: &[
        ChildCount {
            label: "universities",
            entity: Entity::University,
            column: "org_id",
        },
        ChildCount {
            label: "kvks",
            entity: Entity::Kvk,
            column: "org_id",
        },
    ],
};

static UNIVERSITIES: RegistryEntry = RegistryEntry {
    entity: Entity::University,
    table: "universities",
    id_field: "universityId",
    id_column: "university_id",
    name_field: "universityName",
    name_column: "university_name",
    columns: &[
        Column::integer("universityId", "university_id"),
        Column::text("universityName", "university_name").required(),
        Column::integer("orgId", "org_id").required(),
    ],
    parents: &[ParentRef {
        field: "orgId",
        column: "org_id",
        entity: Entity::Organization,
        relation: "organization",
    }],
    children: &[],
};

static KVKS: RegistryEntry = RegistryEntry {
    entity: Entity::Kvk,
    table: "kvks",
    id_field: "kvkId",
    id_column: "kvk_id",
    name_field: "kvkName",
    name_column: "kvk_name",
    columns: &[
        Column::integer("kvkId", "kvk_id"),
        Column::text("kvkName", "kvk_name").required(),
        Column::integer("districtId", "district_id").required(),
        Column::integer("orgId", "org_id"),
        Column::text("email", "email"),
        Column::text("mobile", "mobile"),
        Column::text("address", "address"),
    ],
    parents: &[
        ParentRef {
            field: "districtId",
            column: "district_id",
            entity: Entity::District,
            relation: "district",
        },
        ParentRef {
            field: "orgId",
            column: "org_id",
            entity: Entity::Organization,
            relation: "organization",
        },
    ],
    children: &[],
};

static SEASONS: RegistryEntry = RegistryEntry {
    entity: Entity::Season,
    table: "seasons",
    id_field: "seasonId",
    id_column: "season_id",
    name_field: "seasonName",
    name_column: "season_name",
    columns: &[
        Column::integer("seasonId", "season_id"),
        Column::text("seasonName", "season_name").required(),
    ],
    parents: &[],
    children: &[ChildCount {
        label: "crops",
        entity: Entity::Crop,
        column: "season_id",
    }],
};

static CROPS: RegistryEntry = RegistryEntry {
    entity: Entity::Crop,
    table: "crops",
    id_field: "cropId",
    id_column: "crop_id",
    name_field: "cropName",
    name_column: "crop_name",
    columns: &[
        Column::integer("cropId", "crop_id"),
        Column::text("cropName", "crop_name").required(),
        Column::integer("seasonId", "season_id"),
    ],
    parents: &[ParentRef {
        field: "seasonId",
        column: "season_id",
        entity: Entity::Season,
        relation: "season",
    }],
    children: &[],
};

static IMPORTANT_DAYS: RegistryEntry = RegistryEntry {
    entity: Entity::ImportantDay,
    table: "important_days",
    id_field: "importantDayId",
    id_column: "important_day_id",
    name_field: "dayName",
    name_column: "day_name",
    columns: &[
        Column::integer("importantDayId", "important_day_id"),
        Column::text("dayName", "day_name").required(),
    ],
    parents: &[],
    children: &[],
};
