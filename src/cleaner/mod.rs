// 🏭 Unified Cleaner Interface - one pipeline shape for every source
//
// preprocess → clean → standardize → create_tables
//
// The stage marker on StageTables makes the order a compile-time property:
// `clean` only accepts preprocessed tables, `create_tables` only
// standardized ones.

pub mod arizona;
pub mod pennsylvania;

pub use arizona::ArizonaCleaner;
pub use pennsylvania::PennsylvaniaCleaner;

use crate::entities::{entities_from_table, transactions_from_table, EntityKind, EntityRecord, Transaction};
use crate::error::{Error, Result};
use crate::resolver::{dedup_entities, partition_entities};
use crate::schema::{DocumentKind, Source};
use crate::table::{RawTable, TableDiagnostics};
use serde::Serialize;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing::{error, info};

// ============================================================================
// STAGES
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct Preprocessed;

#[derive(Debug, Clone, Copy)]
pub struct Cleaned;

#[derive(Debug, Clone, Copy)]
pub struct Standardized;

/// Tables tagged with their document kind, at pipeline stage `S`
#[derive(Debug, Clone)]
pub struct StageTables<S> {
    tables: Vec<(DocumentKind, RawTable)>,
    _stage: PhantomData<S>,
}

impl<S> StageTables<S> {
    pub(crate) fn new(tables: Vec<(DocumentKind, RawTable)>) -> Self {
        StageTables {
            tables,
            _stage: PhantomData,
        }
    }

    pub fn tables(&self) -> &[(DocumentKind, RawTable)] {
        &self.tables
    }

    /// First table of the given kind
    pub fn get(&self, kind: DocumentKind) -> Option<&RawTable> {
        self.tables.iter().find(|(k, _)| *k == kind).map(|(_, t)| t)
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|(_, t)| t.len()).sum()
    }

    pub(crate) fn into_tables(self) -> Vec<(DocumentKind, RawTable)> {
        self.tables
    }
}

/// Remove every table of `kind` from `tables` and stack them; an empty
/// table with `columns` when there were none
pub(crate) fn take_kind(
    tables: &mut Vec<(DocumentKind, RawTable)>,
    kind: DocumentKind,
    columns: &[&str],
) -> RawTable {
    let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(tables)
        .into_iter()
        .partition(|(k, _)| *k == kind);
    *tables = rest;

    if taken.is_empty() {
        RawTable::new(columns.iter().copied())
    } else {
        RawTable::concat(taken.into_iter().map(|(_, t)| t).collect())
    }
}

// ============================================================================
// CANONICAL OUTPUT
// ============================================================================

/// Row-level accounting for one source run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanReport {
    pub source: Option<Source>,
    pub input_files: usize,
    pub diagnostics: TableDiagnostics,
}

#[derive(Debug, Clone)]
pub struct CanonicalTables {
    pub transactions: Vec<Transaction>,
    pub individuals: Vec<EntityRecord>,
    pub organizations: Vec<EntityRecord>,
    pub report: CleanReport,
}

impl CanonicalTables {
    /// Convert canonical-field tables into records: transactions as-is,
    /// entities deduplicated on id and split by class
    pub(crate) fn assemble(
        source: Source,
        transactions: &RawTable,
        entities: &RawTable,
        mut diagnostics: TableDiagnostics,
    ) -> CanonicalTables {
        let (transactions, bad_transactions) = transactions_from_table(transactions, source);
        let (entities, bad_entities) = entities_from_table(entities, source);
        let (entities, duplicates) = dedup_entities(entities);
        let (individuals, organizations) = partition_entities(entities);

        diagnostics.malformed_rows += bad_transactions + bad_entities;
        diagnostics.duplicate_ids_dropped += duplicates;

        CanonicalTables {
            transactions,
            individuals,
            organizations,
            report: CleanReport {
                source: Some(source),
                input_files: 0,
                diagnostics,
            },
        }
    }
}

// ============================================================================
// CLEANER TRAIT
// ============================================================================

/// StateCleaner - one implementation per source
///
/// Each implementation brings its own file handling, rename maps (from the
/// schema registry) and entity-type dictionary.
pub trait StateCleaner: Send + Sync {
    /// The source this cleaner handles
    fn source(&self) -> Source;

    /// Source label → entity kind dictionary used in `standardize`
    fn entity_types(&self) -> &'static [(&'static str, EntityKind)];

    /// Read raw inputs into tables
    ///
    /// # Arguments
    /// * `paths` - Files produced by the source (flat files or fetched batches)
    ///
    /// # Returns
    /// * `Ok(StageTables<Preprocessed>)` - One tagged table per input
    /// * `Err(Error)` - Unreadable input or no registered schema
    fn preprocess(&self, paths: &[PathBuf]) -> Result<StageTables<Preprocessed>>;

    /// Per-row cleaning: dates, names, classification, source-specific rules
    fn clean(&self, tables: StageTables<Preprocessed>) -> Result<StageTables<Cleaned>>;

    /// Map source vocabularies onto canonical labels
    fn standardize(&self, tables: StageTables<Cleaned>) -> Result<StageTables<Standardized>>;

    /// Resolve links and emit the three canonical tables
    fn create_tables(&self, tables: StageTables<Standardized>) -> Result<CanonicalTables>;

    /// Run the whole pipeline
    fn clean_source(&self, paths: &[PathBuf]) -> Result<CanonicalTables> {
        let source = self.source();
        info!(%source, files = paths.len(), "cleaning source");

        let preprocessed = self.preprocess(paths)?;
        info!(%source, rows = preprocessed.row_count(), "preprocessed");

        let cleaned = self.clean(preprocessed)?;
        let standardized = self.standardize(cleaned)?;
        let mut tables = self.create_tables(standardized)?;
        tables.report.input_files = paths.len();

        info!(
            %source,
            transactions = tables.transactions.len(),
            individuals = tables.individuals.len(),
            organizations = tables.organizations.len(),
            malformed = tables.report.diagnostics.malformed_rows,
            gaps = tables.report.diagnostics.resolution_gaps,
            "created canonical tables"
        );
        Ok(tables)
    }
}

/// Factory: the cleaner for a source
pub fn cleaner_for(source: Source) -> Result<Box<dyn StateCleaner>> {
    match source {
        Source::Arizona => Ok(Box::new(ArizonaCleaner::new())),
        Source::Pennsylvania => Ok(Box::new(PennsylvaniaCleaner::new())),
        Source::Michigan | Source::Minnesota => Err(Error::NoCleaner(source)),
    }
}

// ============================================================================
// MULTI-SOURCE
// ============================================================================

pub struct SourceOutcome {
    pub source: Source,
    pub result: Result<CanonicalTables>,
}

/// Clean several sources; a failure in one never stops the others
pub fn clean_sources(jobs: Vec<(Source, Vec<PathBuf>)>) -> Vec<SourceOutcome> {
    jobs.into_iter()
        .map(|(source, paths)| {
            let result = cleaner_for(source).and_then(|cleaner| cleaner.clean_source(&paths));
            if let Err(err) = &result {
                error!(%source, %err, "source failed");
            }
            SourceOutcome { source, result }
        })
        .collect()
}
