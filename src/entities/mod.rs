// Canonical Records - the source-independent output shape
//
// Every cleaner ends in the same three tables:
// - transactions (donor → recipient money movements)
// - individuals  (people: contributors, candidates)
// - organizations (committees, parties, vendors, companies, ...)

pub mod entity;
pub mod transaction;

pub use entity::{entities_from_table, EntityRecord};
pub use transaction::{transactions_from_table, Transaction};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical field names used by the registry rename maps
pub mod fields {
    // Transaction fields
    pub const DONOR_ID: &str = "donor_id";
    pub const DONOR_NAME: &str = "donor_name";
    pub const DONOR_TYPE: &str = "donor_type";
    pub const RECIPIENT_ID: &str = "recipient_id";
    pub const RECIPIENT_NAME: &str = "recipient_name";
    pub const RECIPIENT_TYPE: &str = "recipient_type";
    pub const AMOUNT: &str = "amount";
    pub const DATE: &str = "date";
    pub const TRANSACTION_TYPE: &str = "transaction_type";
    pub const PURPOSE: &str = "purpose";
    pub const OFFICE_SOUGHT: &str = "office_sought";

    // Entity fields
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const KIND: &str = "kind";
    pub const PARTY: &str = "party";
    pub const EMPLOYER: &str = "employer";
    pub const OCCUPATION: &str = "occupation";
}

// ============================================================================
// ENTITY CLASS
// ============================================================================

/// EntityClass - the two-way split every name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityClass {
    Individual,
    Organization,
}

impl EntityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClass::Individual => "INDIVIDUAL",
            EntityClass::Organization => "ORGANIZATION",
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ENTITY KIND
// ============================================================================

/// EntityKind - narrower subtype, where the source distinguishes one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Individual,
    Candidate,
    Committee,
    Party,
    Vendor,
    Company,
    Lobbyist,
    Organization,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Individual,
        EntityKind::Candidate,
        EntityKind::Committee,
        EntityKind::Party,
        EntityKind::Vendor,
        EntityKind::Company,
        EntityKind::Lobbyist,
        EntityKind::Organization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Individual => "INDIVIDUAL",
            EntityKind::Candidate => "CANDIDATE",
            EntityKind::Committee => "COMMITTEE",
            EntityKind::Party => "PARTY",
            EntityKind::Vendor => "VENDOR",
            EntityKind::Company => "COMPANY",
            EntityKind::Lobbyist => "LOBBYIST",
            EntityKind::Organization => "ORGANIZATION",
        }
    }

    /// People are individuals; everything else files as an organization
    pub fn class(&self) -> EntityClass {
        match self {
            EntityKind::Individual | EntityKind::Candidate => EntityClass::Individual,
            _ => EntityClass::Organization,
        }
    }

    /// Case-insensitive label lookup
    pub fn parse(label: &str) -> Option<EntityKind> {
        let wanted = label.trim();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl From<EntityClass> for EntityKind {
    fn from(class: EntityClass) -> Self {
        match class {
            EntityClass::Individual => EntityKind::Individual,
            EntityClass::Organization => EntityKind::Organization,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
