// 🔗 Cross-Table Resolver - joins between transactions and entities
//
// Left joins only: a transaction is never dropped for lack of a matching
// entity. The entity side is deduplicated first-seen-wins before joining,
// so joins are one-to-many.

use crate::entities::{EntityClass, EntityRecord};
use crate::error::EntityResolutionGap;
use crate::table::{Cell, RawTable};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub const OFFICE_SOUGHT: &str = "office_sought";

/// How to line up two tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub left_on: String,
    pub right_on: String,

    /// Also require both rows to come from the same data year
    pub same_epoch: bool,

    /// Appended to right-side columns whose names already exist on the left
    pub suffix: String,
}

impl JoinSpec {
    pub fn new(left_on: &str, right_on: &str) -> Self {
        JoinSpec {
            left_on: left_on.to_string(),
            right_on: right_on.to_string(),
            same_epoch: false,
            suffix: "_right".to_string(),
        }
    }

    pub fn same_epoch(mut self) -> Self {
        self.same_epoch = true;
        self
    }

    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }
}

type JoinKey = (String, Option<i32>);

/// Left join transactions to entities. Unmatched rows keep Null in every
/// entity column and are counted as resolution gaps.
pub fn link_transactions_to_entities(
    transactions: RawTable,
    entities: &RawTable,
    spec: &JoinSpec,
) -> RawTable {
    let Some(left_key) = transactions.column_index(&spec.left_on) else {
        warn!(column = %spec.left_on, "join column missing on transaction side");
        return transactions;
    };
    let Some(right_key) = entities.column_index(&spec.right_on) else {
        warn!(column = %spec.right_on, "join column missing on entity side");
        return transactions;
    };

    // First-seen-wins index over the entity side
    let mut index: HashMap<JoinKey, usize> = HashMap::new();
    let mut duplicates = 0;
    for (i, row) in entities.rows.iter().enumerate() {
        let Some(id) = row.cells[right_key].as_string() else {
            continue;
        };
        let epoch = spec.same_epoch.then_some(row.epoch);
        if index.contains_key(&(id.clone(), epoch)) {
            duplicates += 1;
            debug!(identifier = %id, "duplicate entity identifier ignored");
        } else {
            index.insert((id, epoch), i);
        }
    }
    if duplicates > 0 {
        warn!(duplicates, column = %spec.right_on, "entity identifiers were not unique; first seen kept");
    }

    let carried: Vec<usize> = (0..entities.columns.len()).filter(|&i| i != right_key).collect();
    let mut out = transactions;
    let mut new_columns: Vec<String> = carried
        .iter()
        .map(|&i| {
            let name = &entities.columns[i];
            if out.has_column(name) {
                format!("{}{}", name, spec.suffix)
            } else {
                name.clone()
            }
        })
        .collect();
    out.columns.append(&mut new_columns);

    let mut gaps = 0;
    for row in &mut out.rows {
        let matched = row.cells[left_key].as_string().and_then(|id| {
            let epoch = spec.same_epoch.then_some(row.epoch);
            let found = index.get(&(id.clone(), epoch)).copied();
            if found.is_none() {
                let gap = EntityResolutionGap { identifier: id };
                debug!(%gap, "unresolved");
            }
            found
        });

        match matched {
            Some(i) => {
                let entity = &entities.rows[i];
                row.cells.extend(carried.iter().map(|&c| entity.cells[c].clone()));
            }
            None => {
                gaps += 1;
                row.cells.extend(std::iter::repeat(Cell::Null).take(carried.len()));
            }
        }
    }

    if gaps > 0 {
        warn!(gaps, column = %spec.left_on, "transactions without a matching entity");
    }
    out.diagnostics.resolution_gaps += gaps;
    out.diagnostics.duplicate_ids_dropped += duplicates;
    out
}

/// Add `office_sought` from the entity each row's base transactor refers
/// to. Absent entities leave it Null.
pub fn resolve_office_sought(
    transactions: RawTable,
    entities: &RawTable,
    base_column: &str,
    id_column: &str,
    office_column: &str,
) -> RawTable {
    let mut offices: HashMap<String, Option<String>> = HashMap::new();
    let mut conflicting = HashSet::new();
    if let (Some(id_index), Some(office_index)) = (
        entities.column_index(id_column),
        entities.column_index(office_column),
    ) {
        for row in &entities.rows {
            let Some(id) = row.cells[id_index].as_string() else {
                continue;
            };
            let office = row.cells[office_index].as_string();
            match offices.get(&id) {
                Some(first) if *first != office => {
                    conflicting.insert(id);
                }
                Some(_) => {}
                None => {
                    offices.insert(id, office);
                }
            }
        }
    }
    if !conflicting.is_empty() {
        warn!(
            entities = conflicting.len(),
            "entities list more than one office; first seen kept"
        );
    }

    transactions.with_column(OFFICE_SOUGHT, |table, row| {
        let office = table
            .value(row, base_column)
            .and_then(|id| offices.get(&id).cloned().flatten());
        Cell::opt_text(office)
    })
}

/// First-seen-wins on entity id
pub fn dedup_entities(entities: Vec<EntityRecord>) -> (Vec<EntityRecord>, usize) {
    let before = entities.len();
    let mut seen = HashSet::new();
    let kept: Vec<EntityRecord> = entities
        .into_iter()
        .filter(|entity| seen.insert(entity.id.clone()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Split into (individuals, organizations)
pub fn partition_entities(entities: Vec<EntityRecord>) -> (Vec<EntityRecord>, Vec<EntityRecord>) {
    entities
        .into_iter()
        .partition(|entity| entity.class == EntityClass::Individual)
}

// ============================================================================
// TESTS
// ============================================================================
