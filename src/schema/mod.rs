// 📐 Schema Registry - Versioned column layouts per source
// (source, document kind, year) → ordered columns + canonical rename map
//
// Pure lookup over immutable static data. A source that changed its file
// layout gets one entry per epoch; the epochs of one (source, kind) never
// overlap, so every year resolves to at most one layout.

pub mod columns;

use crate::entities::fields;
use crate::error::UnknownSchemaError;
use columns::{az, mi, mn, pa};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SOURCE & DOCUMENT KIND
// ============================================================================

/// Source - which state published the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    Arizona,
    Michigan,
    Minnesota,
    Pennsylvania,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::Arizona,
        Source::Michigan,
        Source::Minnesota,
        Source::Pennsylvania,
    ];

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            Source::Arizona => "Arizona",
            Source::Michigan => "Michigan",
            Source::Minnesota => "Minnesota",
            Source::Pennsylvania => "Pennsylvania",
        }
    }

    /// Postal code, used in synthesized identifiers
    pub fn code(&self) -> &'static str {
        match self {
            Source::Arizona => "AZ",
            Source::Michigan => "MI",
            Source::Minnesota => "MN",
            Source::Pennsylvania => "PA",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Source::ALL
            .into_iter()
            .find(|source| {
                source.name().eq_ignore_ascii_case(wanted)
                    || source.code().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| format!("unknown source '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKind {
    Contribution,
    /// Contributions received by a non-candidate committee, where the source
    /// publishes them separately from candidate contributions
    CommitteeContribution,
    Filer,
    Expenditure,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Contribution => "contribution",
            DocumentKind::CommitteeContribution => "committee_contribution",
            DocumentKind::Filer => "filer",
            DocumentKind::Expenditure => "expenditure",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// EPOCH & SCHEMA KEY
// ============================================================================

/// Epoch - inclusive year range during which a layout is stable.
/// `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Epoch {
    pub from: Option<i32>,
    pub until: Option<i32>,
}

impl Epoch {
    pub const ALWAYS: Epoch = Epoch {
        from: None,
        until: None,
    };

    pub const fn until(year: i32) -> Self {
        Epoch {
            from: None,
            until: Some(year),
        }
    }

    pub const fn starting(year: i32) -> Self {
        Epoch {
            from: Some(year),
            until: None,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.from.map_or(true, |from| year >= from) && self.until.map_or(true, |until| year <= until)
    }

    pub fn overlaps(&self, other: &Epoch) -> bool {
        let start = self.from.unwrap_or(i32::MIN).max(other.from.unwrap_or(i32::MIN));
        let end = self.until.unwrap_or(i32::MAX).min(other.until.unwrap_or(i32::MAX));
        start <= end
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.from, self.until) {
            (None, None) => write!(f, "all years"),
            (Some(from), None) => write!(f, "{}+", from),
            (None, Some(until)) => write!(f, "..={}", until),
            (Some(from), Some(until)) => write!(f, "{}..={}", from, until),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    pub source: Source,
    pub kind: DocumentKind,
    pub epoch: Epoch,
}

// ============================================================================
// COLUMN SCHEMA
// ============================================================================

/// ColumnSchema - one registered layout
#[derive(Debug)]
pub struct ColumnSchema {
    pub source: Source,
    pub kind: DocumentKind,
    pub epoch: Epoch,

    /// Positional column names (flat files) or field names (API rows)
    pub columns: &'static [&'static str],

    /// Columns coerced to text at load time
    pub identifiers: &'static [&'static str],

    /// Source-side name → canonical field; unlisted columns are not carried
    /// into the canonical tables
    pub renames: &'static [(&'static str, &'static str)],
}

impl ColumnSchema {
    pub fn key(&self) -> SchemaKey {
        SchemaKey {
            source: self.source,
            kind: self.kind,
            epoch: self.epoch,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_identifier(&self, column: &str) -> bool {
        self.identifiers.contains(&column)
    }

    pub fn rename_map(&self) -> BTreeMap<&'static str, &'static str> {
        self.renames.iter().copied().collect()
    }
}

// ============================================================================
// CANONICAL RENAME TABLES
// ============================================================================

const PA_CONTRIBUTION_RENAMES: &[(&str, &str)] = &[
    (pa::DONOR_ID, fields::DONOR_ID),
    (pa::DONOR, fields::DONOR_NAME),
    (pa::DONOR_TYPE, fields::DONOR_TYPE),
    (pa::RECIPIENT_ID, fields::RECIPIENT_ID),
    (pa::RECIPIENT, fields::RECIPIENT_NAME),
    (pa::RECIPIENT_TYPE, fields::RECIPIENT_TYPE),
    (pa::TOTAL_CONT_AMT, fields::AMOUNT),
    (pa::DATE, fields::DATE),
    (pa::TRANSACTION_TYPE, fields::TRANSACTION_TYPE),
    (pa::OFFICE_SOUGHT, fields::OFFICE_SOUGHT),
];

const PA_FILER_RENAMES: &[(&str, &str)] = &[
    (pa::RECIPIENT_ID, fields::ID),
    (pa::RECIPIENT, fields::NAME),
    (pa::RECIPIENT_TYPE, fields::KIND),
    (pa::RECIPIENT_OFFICE, fields::OFFICE_SOUGHT),
    (pa::PARTY, fields::PARTY),
];

// Expenditures are joined to filers; the paying filer's name and type come
// back with the filer suffix.
const PA_EXPENSE_RENAMES: &[(&str, &str)] = &[
    (pa::DONOR_ID, fields::DONOR_ID),
    (pa::RECIPIENT_FILER, fields::DONOR_NAME),
    (pa::RECIPIENT_TYPE_FILER, fields::DONOR_TYPE),
    (pa::PAYEE_ID, fields::RECIPIENT_ID),
    (pa::RECIPIENT, fields::RECIPIENT_NAME),
    (pa::RECIPIENT_TYPE, fields::RECIPIENT_TYPE),
    (pa::EXPENSE_AMT, fields::AMOUNT),
    (pa::DATE, fields::DATE),
    (pa::TRANSACTION_TYPE, fields::TRANSACTION_TYPE),
    (pa::PURPOSE, fields::PURPOSE),
    (pa::OFFICE_SOUGHT, fields::OFFICE_SOUGHT),
];

const AZ_TRANSACTION_RENAMES: &[(&str, &str)] = &[
    (fields::DONOR_ID, fields::DONOR_ID),
    (fields::DONOR_NAME, fields::DONOR_NAME),
    (fields::DONOR_TYPE, fields::DONOR_TYPE),
    (fields::RECIPIENT_ID, fields::RECIPIENT_ID),
    (fields::RECIPIENT_NAME, fields::RECIPIENT_NAME),
    (fields::RECIPIENT_TYPE, fields::RECIPIENT_TYPE),
    (az::AMOUNT, fields::AMOUNT),
    (az::DATE, fields::DATE),
    (az::TRANSACTION_TYPE, fields::TRANSACTION_TYPE),
    (az::MEMO, fields::PURPOSE),
    (az::OFFICE_SOUGHT, fields::OFFICE_SOUGHT),
];

const AZ_ENTITY_RENAMES: &[(&str, &str)] = &[
    (az::RETRIEVED_ID, fields::ID),
    (az::ENTITY_NAME, fields::NAME),
    (az::ENTITY_TYPE, fields::KIND),
    (az::OFFICE, fields::OFFICE_SOUGHT),
    (az::PARTY, fields::PARTY),
    (az::EMPLOYER, fields::EMPLOYER),
    (az::OCCUPATION, fields::OCCUPATION),
];

const MI_CONTRIBUTION_RENAMES: &[(&str, &str)] = &[
    ("cfr_com_id", fields::RECIPIENT_ID),
    ("com_legal_name", fields::RECIPIENT_NAME),
    ("com_type", fields::RECIPIENT_TYPE),
    ("l_name_or_org", fields::DONOR_NAME),
    ("received_date", fields::DATE),
    ("amount", fields::AMOUNT),
    ("contribtype", fields::TRANSACTION_TYPE),
    ("extra_desc", fields::PURPOSE),
];

const MI_EXPENDITURE_RENAMES: &[(&str, &str)] = &[
    ("cfr_com_id", fields::DONOR_ID),
    ("com_legal_name", fields::DONOR_NAME),
    ("com_type", fields::DONOR_TYPE),
    ("lname_or_org", fields::RECIPIENT_NAME),
    ("exp_date", fields::DATE),
    ("amount", fields::AMOUNT),
    ("expenditure_type", fields::TRANSACTION_TYPE),
    ("purpose", fields::PURPOSE),
];

const MN_COMMITTEE_CONTRIBUTION_RENAMES: &[(&str, &str)] = &[
    ("PCFRegNumb", fields::RECIPIENT_ID),
    ("Committee", fields::RECIPIENT_NAME),
    ("ETType", fields::RECIPIENT_TYPE),
    ("DonationDate", fields::DATE),
    ("DonorType", fields::DONOR_TYPE),
    ("DonorRegNumb", fields::DONOR_ID),
    ("DonorName", fields::DONOR_NAME),
    ("DonationAmount", fields::AMOUNT),
    ("InKindDonAmount", "inkind_amount"),
    ("InKindDescriptionText", fields::PURPOSE),
];

const MN_CONTRIBUTION_RENAMES: &[(&str, &str)] = &[
    ("OfficeSought", fields::OFFICE_SOUGHT),
    ("Party", fields::PARTY),
    ("CandRegNumb", fields::RECIPIENT_ID),
    ("CandFirstName", "recipient_first_name"),
    ("CandLastName", "recipient_last_name"),
    ("DonationDate", fields::DATE),
    ("DonorType", fields::DONOR_TYPE),
    ("DonorName", fields::DONOR_NAME),
    ("DonationAmount", fields::AMOUNT),
    ("InKindDonAmount", "inkind_amount"),
    ("InKindDescriptionText", fields::PURPOSE),
];

const MN_EXPENDITURE_RENAMES: &[(&str, &str)] = &[
    ("Spender", fields::DONOR_NAME),
    ("Spender Reg Num", fields::DONOR_ID),
    ("Spender type", fields::DONOR_TYPE),
    ("Affected Comte Name", fields::RECIPIENT_NAME),
    ("Affected Cmte Reg Num", fields::RECIPIENT_ID),
    ("Date", fields::DATE),
    ("Amount", fields::AMOUNT),
    ("Purpose", fields::PURPOSE),
    ("Type", fields::TRANSACTION_TYPE),
    ("Vendor State", "state"),
];

// ============================================================================
// REGISTRY
// ============================================================================

// Pennsylvania changed every layout starting with the 2022 filings.
const PA_BOUNDARY: i32 = 2022;

static REGISTRY: &[ColumnSchema] = &[
    ColumnSchema {
        source: Source::Pennsylvania,
        kind: DocumentKind::Contribution,
        epoch: Epoch::until(PA_BOUNDARY - 1),
        columns: pa::CONTRIBUTIONS_PRE_2022,
        identifiers: &[pa::RECIPIENT_ID],
        renames: PA_CONTRIBUTION_RENAMES,
    },
    ColumnSchema {
        source: Source::Pennsylvania,
        kind: DocumentKind::Contribution,
        epoch: Epoch::starting(PA_BOUNDARY),
        columns: pa::CONTRIBUTIONS_POST_2022,
        identifiers: &[pa::RECIPIENT_ID, pa::REPORTER_ID],
        renames: PA_CONTRIBUTION_RENAMES,
    },
    ColumnSchema {
        source: Source::Pennsylvania,
        kind: DocumentKind::Filer,
        epoch: Epoch::until(PA_BOUNDARY - 1),
        columns: pa::FILERS_PRE_2022,
        identifiers: &[pa::RECIPIENT_ID],
        renames: PA_FILER_RENAMES,
    },
    ColumnSchema {
        source: Source::Pennsylvania,
        kind: DocumentKind::Filer,
        epoch: Epoch::starting(PA_BOUNDARY),
        columns: pa::FILERS_POST_2022,
        identifiers: &[pa::RECIPIENT_ID, pa::REPORTER_ID],
        renames: PA_FILER_RENAMES,
    },
    ColumnSchema {
        source: Source::Pennsylvania,
        kind: DocumentKind::Expenditure,
        epoch: Epoch::until(PA_BOUNDARY - 1),
        columns: pa::EXPENSES_PRE_2022,
        identifiers: &[pa::DONOR_ID],
        renames: PA_EXPENSE_RENAMES,
    },
    ColumnSchema {
        source: Source::Pennsylvania,
        kind: DocumentKind::Expenditure,
        epoch: Epoch::starting(PA_BOUNDARY),
        columns: pa::EXPENSES_POST_2022,
        identifiers: &[pa::DONOR_ID, pa::EXPENSE_REPORTER_ID],
        renames: PA_EXPENSE_RENAMES,
    },
    ColumnSchema {
        source: Source::Arizona,
        kind: DocumentKind::Contribution,
        epoch: Epoch::ALWAYS,
        columns: az::TRANSACTIONS,
        identifiers: &[az::RETRIEVED_ID, az::TRANSACTION_NAME_ID, az::TRANSACTION_ID],
        renames: AZ_TRANSACTION_RENAMES,
    },
    ColumnSchema {
        source: Source::Arizona,
        kind: DocumentKind::Filer,
        epoch: Epoch::ALWAYS,
        columns: az::ENTITIES,
        identifiers: &[az::ENTITY_ID],
        renames: AZ_ENTITY_RENAMES,
    },
    ColumnSchema {
        source: Source::Michigan,
        kind: DocumentKind::Contribution,
        epoch: Epoch::ALWAYS,
        columns: mi::CONTRIBUTIONS,
        identifiers: &["cfr_com_id", "contribution_id"],
        renames: MI_CONTRIBUTION_RENAMES,
    },
    ColumnSchema {
        source: Source::Michigan,
        kind: DocumentKind::Expenditure,
        epoch: Epoch::ALWAYS,
        columns: mi::EXPENDITURES,
        identifiers: &["cfr_com_id", "expense_id"],
        renames: MI_EXPENDITURE_RENAMES,
    },
    ColumnSchema {
        source: Source::Minnesota,
        kind: DocumentKind::Contribution,
        epoch: Epoch::ALWAYS,
        columns: mn::CANDIDATE_CONTRIBUTIONS,
        identifiers: &["CandRegNumb"],
        renames: MN_CONTRIBUTION_RENAMES,
    },
    ColumnSchema {
        source: Source::Minnesota,
        kind: DocumentKind::CommitteeContribution,
        epoch: Epoch::ALWAYS,
        columns: mn::NONCANDIDATE_CONTRIBUTIONS,
        identifiers: &["PCFRegNumb", "DonorRegNumb"],
        renames: MN_COMMITTEE_CONTRIBUTION_RENAMES,
    },
    ColumnSchema {
        source: Source::Minnesota,
        kind: DocumentKind::Expenditure,
        epoch: Epoch::ALWAYS,
        columns: mn::INDEPENDENT_EXPENDITURES,
        identifiers: &["Spender Reg Num", "Affected Cmte Reg Num"],
        renames: MN_EXPENDITURE_RENAMES,
    },
];

/// Every registered layout
pub fn registry() -> &'static [ColumnSchema] {
    REGISTRY
}

/// Find the one layout registered for (source, kind) whose epoch covers `year`
pub fn resolve_schema(
    source: Source,
    kind: DocumentKind,
    year: i32,
) -> Result<&'static ColumnSchema, UnknownSchemaError> {
    REGISTRY
        .iter()
        .find(|schema| schema.source == source && schema.kind == kind && schema.epoch.contains(year))
        .ok_or(UnknownSchemaError {
            data_source: source,
            kind,
            year,
        })
}

/// Ordered column list for (source, kind, year)
pub fn resolve(
    source: Source,
    kind: DocumentKind,
    year: i32,
) -> Result<&'static [&'static str], UnknownSchemaError> {
    resolve_schema(source, kind, year).map(|schema| schema.columns)
}

/// Source-side name → canonical field for (source, kind, year)
pub fn resolve_rename_map(
    source: Source,
    kind: DocumentKind,
    year: i32,
) -> Result<BTreeMap<&'static str, &'static str>, UnknownSchemaError> {
    resolve_schema(source, kind, year).map(ColumnSchema::rename_map)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pa_contribution_epochs() {
        let pre = resolve(Source::Pennsylvania, DocumentKind::Contribution, 2021).unwrap();
        let post = resolve(Source::Pennsylvania, DocumentKind::Contribution, 2022).unwrap();

        assert_eq!(pre.len(), 24);
        assert_eq!(post.len(), 26);
        assert!(!pre.contains(&"TIMESTAMP"));
        assert!(post.contains(&"TIMESTAMP"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for schema in registry() {
            let year = schema.epoch.from.or(schema.epoch.until).unwrap_or(2020);
            let first = resolve(schema.source, schema.kind, year).unwrap();
            let second = resolve(schema.source, schema.kind, year).unwrap();
            assert_eq!(first, second);
            assert_eq!(first, schema.columns);
        }
    }

    #[test]
    fn test_unknown_triple_fails() {
        let err = resolve(Source::Arizona, DocumentKind::Expenditure, 2023).unwrap_err();
        assert_eq!(err.data_source, Source::Arizona);
        assert_eq!(err.kind, DocumentKind::Expenditure);

        assert!(resolve(Source::Michigan, DocumentKind::Filer, 2020).is_err());
        assert!(resolve_rename_map(Source::Minnesota, DocumentKind::Filer, 2020).is_err());
    }

    #[test]
    fn test_epochs_never_overlap() {
        let all = registry();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                if a.source == b.source && a.kind == b.kind {
                    assert!(
                        !a.epoch.overlaps(&b.epoch),
                        "{} {} epochs {} and {} overlap",
                        a.source,
                        a.kind,
                        a.epoch,
                        b.epoch
                    );
                }
            }
        }
    }

    #[test]
    fn test_identifiers_are_registered_columns() {
        for schema in registry() {
            for id in schema.identifiers {
                assert!(
                    schema.columns.contains(id),
                    "{} {} identifier {} missing from columns",
                    schema.source,
                    schema.kind,
                    id
                );
            }
        }
    }

    #[test]
    fn test_rename_map_minnesota() {
        let map = resolve_rename_map(Source::Minnesota, DocumentKind::Contribution, 2020).unwrap();
        assert_eq!(map.get("CandRegNumb"), Some(&fields::RECIPIENT_ID));
        assert_eq!(map.get("DonationAmount"), Some(&fields::AMOUNT));
        assert_eq!(map.len(), 11);
    }

    #[test]
    fn test_minnesota_committee_contributions() {
        let columns = resolve(Source::Minnesota, DocumentKind::CommitteeContribution, 2021).unwrap();
        assert_eq!(columns.len(), 10);
        assert_eq!(columns[0], "PCFRegNumb");
        assert_ne!(
            columns,
            resolve(Source::Minnesota, DocumentKind::Contribution, 2021).unwrap()
        );

        let map = resolve_rename_map(Source::Minnesota, DocumentKind::CommitteeContribution, 2021).unwrap();
        assert_eq!(map.get("PCFRegNumb"), Some(&fields::RECIPIENT_ID));
        assert_eq!(map.get("Committee"), Some(&fields::RECIPIENT_NAME));
        assert_eq!(map.get("DonorRegNumb"), Some(&fields::DONOR_ID));
        assert_eq!(map.len(), 10);

        assert!(resolve(Source::Pennsylvania, DocumentKind::CommitteeContribution, 2021).is_err());
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("pennsylvania".parse::<Source>(), Ok(Source::Pennsylvania));
        assert_eq!("AZ".parse::<Source>(), Ok(Source::Arizona));
        assert!("texas".parse::<Source>().is_err());
    }
}
