// 🌵 Arizona Cleaner - fetched reporting-API batches
//
// Inputs are RawBatch JSON files written by the fetcher: aggregate
// listings become entity details, detail pages become transactions.

use super::{take_kind, CanonicalTables, Cleaned, Preprocessed, StageTables, StateCleaner, Standardized};
use crate::entities::{fields, EntityKind};
use crate::error::{Error, Result};
use crate::fetcher::{is_aggregate_code, Category, VALID_DETAIL_CODES};
use crate::loader::{load_batch, read_batch_file};
use crate::lookups::{self, AZ_ENTITY_TYPES};
use crate::normalize::{canonical_name, classify_name, parse_date_column};
use crate::resolver::{link_transactions_to_entities, resolve_office_sought, JoinSpec};
use crate::schema::columns::az;
use crate::schema::{resolve_schema, DocumentKind, Source};
use crate::table::{Cell, RawRow, RawTable};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Disposition of a transaction seen from the retrieved entity
const INCOME: &str = "1";

/// Columns brought back from the details when the retrieved side is linked
const LINKED_NAME: &str = "entity_name_linked";
const LINKED_TYPE: &str = "entity_type_linked";

pub struct ArizonaCleaner;

impl ArizonaCleaner {
    pub fn new() -> Self {
        ArizonaCleaner
    }
}

impl Default for ArizonaCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCleaner for ArizonaCleaner {
    fn source(&self) -> Source {
        Source::Arizona
    }

    fn entity_types(&self) -> &'static [(&'static str, EntityKind)] {
        AZ_ENTITY_TYPES
    }

    fn preprocess(&self, paths: &[PathBuf]) -> Result<StageTables<Preprocessed>> {
        let mut tables = Vec::with_capacity(paths.len());

        for path in paths {
            let batch = read_batch_file(path)?;
            let failed = batch.failed_entities();
            if !failed.is_empty() {
                warn!(path = %path.display(), failed = failed.len(), "batch has failed entities");
            }

            if is_aggregate_code(batch.category) {
                let label = Category::from_code(batch.category)
                    .map(|c| c.entity_label().unwrap_or(c.name))
                    .unwrap_or_default();
                let table = load_batch(&batch, Source::Arizona, DocumentKind::Filer, batch.end_year)?
                    .with_column(az::ENTITY_TYPE, |_, _| Cell::text(label));
                tables.push((DocumentKind::Filer, table));
            } else if VALID_DETAIL_CODES.contains(&batch.category) {
                let table = load_batch(&batch, Source::Arizona, DocumentKind::Contribution, batch.end_year)?;
                tables.push((DocumentKind::Contribution, table));
            } else {
                return Err(Error::UnrecognizedFile(path.clone()));
            }
        }

        Ok(StageTables::new(tables))
    }

    fn clean(&self, tables: StageTables<Preprocessed>) -> Result<StageTables<Cleaned>> {
        let mut tables = tables.into_tables();
        let transactions = take_kind(&mut tables, DocumentKind::Contribution, az::TRANSACTIONS);
        let details = take_kind(&mut tables, DocumentKind::Filer, az::ENTITIES)
            .rename_column(az::ENTITY_ID, az::RETRIEVED_ID)
            .rename_column(az::OFFICE_NAME, az::OFFICE)
            .rename_column(az::PARTY_NAME, az::PARTY);

        // Only entities that actually transacted
        let transacting: HashSet<String> = transactions.values(az::RETRIEVED_ID).into_iter().collect();
        let before = details.len();
        let details = details
            .filter(|t, row| t.value(row, az::RETRIEVED_ID).is_some_and(|id| transacting.contains(&id)))
            .dedup_by(&[az::RETRIEVED_ID]);
        debug!(kept = details.len(), dropped = before - details.len(), "details restricted to transacting entities");

        let transactions = parse_date_column(transactions, az::TRANSACTION_DATE, az::DATE);
        let details = employment_checker(name_details(details), &transactions);
        let transactions = sort_transactors(transactions);
        let transactions =
            resolve_office_sought(transactions, &details, az::BASE_TRANSACTOR_ID, az::RETRIEVED_ID, az::OFFICE);

        Ok(StageTables::new(vec![
            (DocumentKind::Contribution, transactions),
            (DocumentKind::Filer, details),
        ]))
    }

    fn standardize(&self, tables: StageTables<Cleaned>) -> Result<StageTables<Standardized>> {
        let dictionary = self.entity_types();
        let tables = tables
            .into_tables()
            .into_iter()
            .map(|(kind, table)| {
                let table = match kind {
                    DocumentKind::Filer => table.map_column(az::ENTITY_TYPE, |cell| {
                        let label = cell.as_string().unwrap_or_default();
                        match lookups::lookup(dictionary, &label) {
                            Some(kind) => Cell::Text(kind.as_str().to_string()),
                            None => cell.clone(),
                        }
                    }),
                    // Expenses arrive negative
                    _ => table.map_column(az::AMOUNT, |cell| match cell.to_decimal() {
                        Some(Ok(amount)) => Cell::from(amount.abs()),
                        _ => cell.clone(),
                    }),
                };
                (kind, table)
            })
            .collect();
        Ok(StageTables::new(tables))
    }

    fn create_tables(&self, tables: StageTables<Standardized>) -> Result<CanonicalTables> {
        let mut tables = tables.into_tables();
        let transactions = take_kind(&mut tables, DocumentKind::Contribution, az::TRANSACTIONS);
        let details = take_kind(&mut tables, DocumentKind::Filer, az::ENTITIES);
        let mut diagnostics = details.diagnostics;

        // Name and type of the retrieved side come from its detail record
        let linked_details = details
            .clone()
            .select(&[az::RETRIEVED_ID, az::ENTITY_NAME, az::ENTITY_TYPE])
            .rename_column(az::ENTITY_NAME, LINKED_NAME)
            .rename_column(az::ENTITY_TYPE, LINKED_TYPE);
        let spec = JoinSpec::new(az::BASE_TRANSACTOR_ID, az::RETRIEVED_ID);
        let transactions = link_transactions_to_entities(transactions, &linked_details, &spec);
        let transactions = fill_retrieved_side(transactions);
        diagnostics += transactions.diagnostics;

        let year = transactions.rows.first().map_or(0, |row| row.epoch);
        let transaction_renames = resolve_schema(Source::Arizona, DocumentKind::Contribution, year)?.renames;
        let entity_renames = resolve_schema(Source::Arizona, DocumentKind::Filer, year)?.renames;

        let counterparties = transactions
            .clone()
            .project([
                (az::COUNTERPARTY_ID, fields::ID),
                (az::COUNTERPARTY_NAME, fields::NAME),
                (az::COUNTERPARTY_TYPE, fields::KIND),
                (az::TRANSACTION_EMPLOYER, fields::EMPLOYER),
                (az::TRANSACTION_OCCUPATION, fields::OCCUPATION),
            ]);
        // EntityID and TransactionNameId are one id space: a listed contributor
        // is the same record as the counterparty naming it. Details come first
        // so their fields win the dedup.
        let entities = RawTable::concat(vec![
            details.project(entity_renames.iter().copied()),
            counterparties,
        ]);
        let transactions = transactions.project(transaction_renames.iter().copied());

        info!(
            transactions = transactions.len(),
            entities = entities.len(),
            "arizona tables resolved"
        );
        Ok(CanonicalTables::assemble(
            Source::Arizona,
            &transactions,
            &entities,
            diagnostics,
        ))
    }
}

// ============================================================================
// CLEANING RULES
// ============================================================================

/// "FIRST LAST" display name; organizations carry only a last name
fn full_name(first: Option<String>, last: Option<String>) -> Option<String> {
    let joined = [first, last].into_iter().flatten().collect::<Vec<_>>().join(" ");
    let name = canonical_name(&joined);
    (!name.is_empty()).then_some(name)
}

fn name_details(details: RawTable) -> RawTable {
    details.with_column(az::ENTITY_NAME, |t, row| {
        Cell::opt_text(full_name(
            t.value(row, az::ENTITY_FIRST_NAME),
            t.value(row, az::ENTITY_LAST_NAME),
        ))
    })
}

/// Employer and occupation of each entity, taken from the first
/// transaction that names it as counterparty
fn employment_checker(details: RawTable, transactions: &RawTable) -> RawTable {
    let mut employment: HashMap<String, (Option<String>, Option<String>)> = HashMap::new();
    for row in &transactions.rows {
        let Some(id) = transactions.value(row, az::TRANSACTION_NAME_ID) else {
            continue;
        };
        let employer = transactions.value(row, az::TRANSACTION_EMPLOYER);
        let occupation = transactions.value(row, az::TRANSACTION_OCCUPATION);
        if employer.is_some() || occupation.is_some() {
            employment.entry(id).or_insert((employer, occupation));
        }
    }

    details
        .with_column(az::EMPLOYER, |t, row| {
            let found = t.value(row, az::RETRIEVED_ID).and_then(|id| employment.get(&id));
            Cell::opt_text(found.and_then(|(employer, _)| employer.clone()))
        })
        .with_column(az::OCCUPATION, |t, row| {
            let found = t.value(row, az::RETRIEVED_ID).and_then(|id| employment.get(&id));
            Cell::opt_text(found.and_then(|(_, occupation)| occupation.clone()))
        })
}

fn is_income(table: &RawTable, row: &RawRow) -> bool {
    table.value(row, az::DISPOSITION).as_deref() == Some(INCOME)
}

/// Split each row into donor and recipient sides. The counterparty fills
/// one side now; the retrieved entity's name is linked in `create_tables`.
fn sort_transactors(transactions: RawTable) -> RawTable {
    let transactions = transactions
        .with_column(az::COUNTERPARTY_ID, |t, row| {
            Cell::opt_text(t.value(row, az::TRANSACTION_NAME_ID))
        })
        .with_column(az::COUNTERPARTY_NAME, |t, row| {
            let name = t.value(row, az::TRANSACTION_NAME).map(|n| canonical_name(&n)).or_else(|| {
                full_name(
                    t.value(row, az::TRANSACTION_FIRST_NAME),
                    t.value(row, az::TRANSACTION_LAST_NAME),
                )
            });
            Cell::opt_text(name)
        })
        .with_column(az::COUNTERPARTY_TYPE, |t, row| {
            let name = t.value(row, az::COUNTERPARTY_NAME).unwrap_or_default();
            Cell::Text(classify_name(&name).as_str().to_string())
        })
        .with_column(az::BASE_TRANSACTOR_ID, |t, row| {
            Cell::opt_text(t.value(row, az::RETRIEVED_ID))
        });

    let side = |income_column: &'static str, expense_column: &'static str| {
        move |t: &RawTable, row: &RawRow| {
            let column = if is_income(t, row) { income_column } else { expense_column };
            Cell::opt_text(t.value(row, column))
        }
    };

    transactions
        .with_column(fields::DONOR_ID, side(az::COUNTERPARTY_ID, az::RETRIEVED_ID))
        .with_column(fields::DONOR_NAME, side(az::COUNTERPARTY_NAME, LINKED_NAME))
        .with_column(fields::DONOR_TYPE, side(az::COUNTERPARTY_TYPE, LINKED_TYPE))
        .with_column(fields::RECIPIENT_ID, side(az::RETRIEVED_ID, az::COUNTERPARTY_ID))
        .with_column(fields::RECIPIENT_NAME, side(LINKED_NAME, az::COUNTERPARTY_NAME))
        .with_column(fields::RECIPIENT_TYPE, side(LINKED_TYPE, az::COUNTERPARTY_TYPE))
}

/// After linking, copy the retrieved entity's name and type onto its side
fn fill_retrieved_side(transactions: RawTable) -> RawTable {
    let pick = |target: &'static str, income_source: &'static str, expense_source: &'static str| {
        move |t: &RawTable, row: &RawRow| {
            let source = if is_income(t, row) { income_source } else { expense_source };
            match t.value(row, source) {
                Some(value) => Cell::text(value),
                None => Cell::opt_text(t.value(row, target)),
            }
        }
    };

    transactions
        .with_column(fields::DONOR_NAME, pick(fields::DONOR_NAME, fields::DONOR_NAME, LINKED_NAME))
        .with_column(fields::DONOR_TYPE, pick(fields::DONOR_TYPE, fields::DONOR_TYPE, LINKED_TYPE))
        .with_column(fields::RECIPIENT_NAME, pick(fields::RECIPIENT_NAME, LINKED_NAME, fields::RECIPIENT_NAME))
        .with_column(fields::RECIPIENT_TYPE, pick(fields::RECIPIENT_TYPE, LINKED_TYPE, fields::RECIPIENT_TYPE))
        .drop_columns(&[LINKED_NAME, LINKED_TYPE])
}

// ============================================================================
// TESTS
// ============================================================================
