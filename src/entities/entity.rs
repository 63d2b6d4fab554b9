use super::{fields, EntityClass, EntityKind};
use crate::error::MalformedRowError;
use crate::normalize::{canonical_name, kind_or_classify};
use crate::schema::Source;
use crate::table::{RawRow, RawTable};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// EntityRecord - a donor, recipient, filer or payee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub source: Source,
    pub name: Option<String>,
    pub class: EntityClass,
    pub kind: EntityKind,
    pub office_sought: Option<String>,
    pub party: Option<String>,
    pub employer: Option<String>,
    pub occupation: Option<String>,
}

impl EntityRecord {
    /// Build from a row of a table projected onto canonical entity fields
    pub fn from_canonical(
        table: &RawTable,
        row: &RawRow,
        source: Source,
        line: usize,
    ) -> Result<EntityRecord, MalformedRowError> {
        let id = table
            .value(row, fields::ID)
            .ok_or_else(|| MalformedRowError::MissingField {
                line,
                field: fields::ID.to_string(),
            })?;
        let name = table.value(row, fields::NAME).map(|n| canonical_name(&n));
        let kind = kind_or_classify(
            table.value(row, fields::KIND).as_deref(),
            name.as_deref().unwrap_or_default(),
        );

        Ok(EntityRecord {
            id,
            source,
            name,
            class: kind.class(),
            kind,
            office_sought: table.value(row, fields::OFFICE_SOUGHT),
            party: table.value(row, fields::PARTY),
            employer: table.value(row, fields::EMPLOYER),
            occupation: table.value(row, fields::OCCUPATION),
        })
    }

    pub fn is_individual(&self) -> bool {
        self.class == EntityClass::Individual
    }
}

/// Convert every row of a canonical entity table; rows without an id are
/// logged and counted
pub fn entities_from_table(table: &RawTable, source: Source) -> (Vec<EntityRecord>, usize) {
    let mut entities = Vec::with_capacity(table.len());
    let mut malformed = 0;
    for (i, row) in table.rows.iter().enumerate() {
        match EntityRecord::from_canonical(table, row, source, i + 1) {
            Ok(entity) => entities.push(entity),
            Err(err) => {
                warn!(%source, %err, "skipping entity row");
                malformed += 1;
            }
        }
    }
    (entities, malformed)
}
