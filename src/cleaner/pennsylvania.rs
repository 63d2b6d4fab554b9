// 🔔 Pennsylvania Cleaner - yearly headerless flat files
//
// One file per (kind, year): contributions, filers and expenses. The
// layout changed with the 2022 filings; the registry picks the right one
// from the year in the file name. Contributions and expenses link to the
// filers of the same year.

use super::{take_kind, CanonicalTables, Cleaned, Preprocessed, StageTables, StateCleaner, Standardized};
use crate::entities::{fields, EntityKind};
use crate::error::{Error, Result};
use crate::loader::load_file;
use crate::lookups::{office_codes, PA_FILER_TYPES};
use crate::normalize::{
    expand_codes, map_entity_types, normalize_contributions, normalize_expenditures, normalize_filers,
};
use crate::resolver::{link_transactions_to_entities, JoinSpec};
use crate::schema::columns::pa;
use crate::schema::{resolve, resolve_schema, DocumentKind, Source};
use crate::table::{Cell, RawTable};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Any year in the current layout; used for lookups that do not vary by epoch
const CURRENT_YEAR: i32 = 2022;

pub struct PennsylvaniaCleaner;

impl PennsylvaniaCleaner {
    pub fn new() -> Self {
        PennsylvaniaCleaner
    }
}

impl Default for PennsylvaniaCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Document kind and data year from a file name like `contrib_2021.txt`
pub fn infer_file(path: &Path) -> Result<(DocumentKind, i32)> {
    let unrecognized = || Error::UnrecognizedFile(path.to_path_buf());
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(unrecognized)?
        .to_lowercase();

    let kind = if name.contains("contrib") {
        DocumentKind::Contribution
    } else if name.contains("filer") {
        DocumentKind::Filer
    } else if name.contains("expense") {
        DocumentKind::Expenditure
    } else {
        return Err(unrecognized());
    };

    let bytes = name.as_bytes();
    let year = (0..bytes.len().saturating_sub(3))
        .filter(|&i| bytes[i..i + 4].iter().all(u8::is_ascii_digit))
        .filter(|&i| i == 0 || !bytes[i - 1].is_ascii_digit())
        .filter(|&i| i + 4 == bytes.len() || !bytes[i + 4].is_ascii_digit())
        .filter_map(|i| name[i..i + 4].parse::<i32>().ok())
        .find(|year| (1900..=2100).contains(year))
        .ok_or_else(unrecognized)?;

    Ok((kind, year))
}

impl StateCleaner for PennsylvaniaCleaner {
    fn source(&self) -> Source {
        Source::Pennsylvania
    }

    fn entity_types(&self) -> &'static [(&'static str, EntityKind)] {
        PA_FILER_TYPES
    }

    fn preprocess(&self, paths: &[PathBuf]) -> Result<StageTables<Preprocessed>> {
        let mut tables = Vec::with_capacity(paths.len());
        for path in paths {
            let (kind, year) = infer_file(path)?;
            debug!(path = %path.display(), %kind, year, "recognized file");
            tables.push((kind, load_file(path, Source::Pennsylvania, kind, year)?));
        }
        Ok(StageTables::new(tables))
    }

    /// Normalize each yearly table on its own (filer dedup is per year),
    /// then stack per kind
    fn clean(&self, tables: StageTables<Preprocessed>) -> Result<StageTables<Cleaned>> {
        let mut normalized = Vec::new();
        for (kind, table) in tables.into_tables() {
            let table = match kind {
                DocumentKind::Contribution => normalize_contributions(table)?,
                DocumentKind::Filer => normalize_filers(table)?,
                DocumentKind::Expenditure => normalize_expenditures(table)?,
                DocumentKind::CommitteeContribution => {
                    return Err(Error::UnsupportedKind(self.source(), kind))
                }
            };
            normalized.push((kind, table));
        }

        let contributions = take_kind(&mut normalized, DocumentKind::Contribution, &cleaned_columns(DocumentKind::Contribution));
        let filers = take_kind(&mut normalized, DocumentKind::Filer, &cleaned_columns(DocumentKind::Filer));
        let expenditures = take_kind(&mut normalized, DocumentKind::Expenditure, &cleaned_columns(DocumentKind::Expenditure));

        Ok(StageTables::new(vec![
            (DocumentKind::Contribution, contributions),
            (DocumentKind::Filer, filers),
            (DocumentKind::Expenditure, expenditures),
        ]))
    }

    fn standardize(&self, tables: StageTables<Cleaned>) -> Result<StageTables<Standardized>> {
        let tables = tables
            .into_tables()
            .into_iter()
            .map(|(kind, table)| match kind {
                DocumentKind::Filer => {
                    let table = expand_codes(table, pa::RECIPIENT_OFFICE, office_codes(self.source()));
                    (kind, map_entity_types(table, pa::RECIPIENT_TYPE, self.entity_types()))
                }
                _ => (kind, table),
            })
            .collect();
        Ok(StageTables::new(tables))
    }

    fn create_tables(&self, tables: StageTables<Standardized>) -> Result<CanonicalTables> {
        let mut tables = tables.into_tables();
        let contributions = take_kind(&mut tables, DocumentKind::Contribution, &[]);
        let filers = take_kind(&mut tables, DocumentKind::Filer, &[]);
        let expenditures = take_kind(&mut tables, DocumentKind::Expenditure, &[]);
        let mut diagnostics = filers.diagnostics;

        // Donors and payees have no identifiers of their own
        let contributions = contributions.with_column(pa::DONOR_ID, |t, row| {
            synthesized_id("DONOR", t.value(row, pa::DONOR))
        });
        let expenditures = expenditures.with_column(pa::PAYEE_ID, |t, row| {
            synthesized_id("PAYEE", t.value(row, pa::RECIPIENT))
        });

        let by_recipient = JoinSpec::new(pa::RECIPIENT_ID, pa::RECIPIENT_ID)
            .same_epoch()
            .suffix(pa::FILER_SUFFIX);
        let contributions = link_transactions_to_entities(contributions, &filers, &by_recipient);
        let contributions = copy_office(contributions);

        let by_spender = JoinSpec::new(pa::DONOR_ID, pa::RECIPIENT_ID)
            .same_epoch()
            .suffix(pa::FILER_SUFFIX);
        let expenditures = link_transactions_to_entities(expenditures, &filers, &by_spender);
        let expenditures = copy_office(expenditures);

        diagnostics += contributions.diagnostics;
        diagnostics += expenditures.diagnostics;

        let contribution_renames = resolve_schema(Source::Pennsylvania, DocumentKind::Contribution, CURRENT_YEAR)?.renames;
        let filer_renames = resolve_schema(Source::Pennsylvania, DocumentKind::Filer, CURRENT_YEAR)?.renames;
        let expense_renames = resolve_schema(Source::Pennsylvania, DocumentKind::Expenditure, CURRENT_YEAR)?.renames;

        let donors = contributions.clone().project([
            (pa::DONOR_ID, fields::ID),
            (pa::DONOR, fields::NAME),
            (pa::DONOR_TYPE, fields::KIND),
        ]);
        let payees = expenditures.clone().project([
            (pa::PAYEE_ID, fields::ID),
            (pa::RECIPIENT, fields::NAME),
            (pa::RECIPIENT_TYPE, fields::KIND),
        ]);
        let entities = RawTable::concat(vec![
            filers.project(filer_renames.iter().copied()),
            donors,
            payees,
        ]);

        let transactions = RawTable::concat(vec![
            contributions.project(contribution_renames.iter().copied()),
            expenditures.project(expense_renames.iter().copied()),
        ]);

        info!(
            transactions = transactions.len(),
            entities = entities.len(),
            gaps = diagnostics.resolution_gaps,
            "pennsylvania tables resolved"
        );
        Ok(CanonicalTables::assemble(
            Source::Pennsylvania,
            &transactions,
            &entities,
            diagnostics,
        ))
    }
}

/// Columns a kind has after normalization, for kinds with no input files
fn cleaned_columns(kind: DocumentKind) -> Vec<&'static str> {
    let drops = match kind {
        DocumentKind::Contribution => pa::CONTRIBUTION_DROPS,
        DocumentKind::Filer => pa::FILER_DROPS,
        DocumentKind::Expenditure => pa::EXPENSE_DROPS,
        DocumentKind::CommitteeContribution => &[],
    };
    let mut columns: Vec<&'static str> = resolve(Source::Pennsylvania, kind, CURRENT_YEAR)
        .unwrap_or_default()
        .iter()
        .copied()
        .filter(|c| !drops.contains(c))
        .collect();
    let derived: &[&'static str] = match kind {
        DocumentKind::Contribution => &[pa::TOTAL_CONT_AMT, pa::DATE, pa::DONOR_TYPE, pa::TRANSACTION_TYPE],
        DocumentKind::Filer => &[],
        DocumentKind::Expenditure => &[pa::DATE, pa::RECIPIENT_TYPE, pa::TRANSACTION_TYPE],
        DocumentKind::CommitteeContribution => &[],
    };
    columns.extend(derived.iter().filter(|c| !columns.contains(c)).copied().collect::<Vec<_>>());
    columns
}

fn synthesized_id(role: &str, name: Option<String>) -> Cell {
    Cell::opt_text(name.map(|n| format!("{}:{}:{}", Source::Pennsylvania.code(), role, n)))
}

/// The linked filer's office is the office sought
fn copy_office(table: RawTable) -> RawTable {
    table.with_column(pa::OFFICE_SOUGHT, |t, row| Cell::opt_text(t.value(row, pa::RECIPIENT_OFFICE)))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityClass;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn line(columns: &[&str], values: &[(&str, &str)]) -> String {
        columns
            .iter()
            .map(|c| {
                let value = values.iter().find(|(k, _)| k == c).map_or("", |(_, v)| *v);
                if value.contains(',') {
                    format!("\"{}\"", value)
                } else {
                    value.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    fn write(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, lines.join("\n") + "\n").unwrap();
        path
    }

    fn fixture(dir: &Path) -> Vec<PathBuf> {
        let filers_2021 = write(dir, "filer_2021.txt", &[
            line(pa::FILERS_PRE_2022, &[("RECIPIENT_ID", "100"), ("RECIPIENT_TYPE", "1"), ("RECIPIENT", "jane smith"), ("RECIPIENT_OFFICE", "GOV"), ("PARTY", "DEM")]),
            line(pa::FILERS_PRE_2022, &[("RECIPIENT_ID", "100"), ("RECIPIENT_TYPE", "1"), ("RECIPIENT", "jane smith dup"), ("RECIPIENT_OFFICE", "GOV")]),
            line(pa::FILERS_PRE_2022, &[("RECIPIENT_ID", "200"), ("RECIPIENT_TYPE", "2"), ("RECIPIENT", "pac for progress")]),
        ]);
        let filers_2022 = write(dir, "filer_2022.txt", &[
            line(pa::FILERS_POST_2022, &[("RECIPIENT_ID", "100"), ("RECIPIENT_TYPE", "1"), ("RECIPIENT", "jane smith"), ("RECIPIENT_OFFICE", "STS")]),
        ]);
        let contributions_2021 = write(dir, "contrib_2021.txt", &[
            line(pa::CONTRIBUTIONS_PRE_2022, &[("RECIPIENT_ID", "100"), ("DONOR", "bob jones"), ("CONT_DATE_1", "01/02/2021"), ("CONT_AMT_1", "10.00"), ("CONT_AMT_2", "5.50"), ("CONT_AMT_3", "0.00")]),
            line(pa::CONTRIBUTIONS_PRE_2022, &[("RECIPIENT_ID", "999"), ("DONOR", "acme llc"), ("CONT_AMT_1", "1,000")]),
            line(pa::CONTRIBUTIONS_PRE_2022, &[("RECIPIENT_ID", "100"), ("DONOR", "bad amount"), ("CONT_AMT_1", "lots")]),
            "1,2,3".to_string(),
        ]);
        let contributions_2022 = write(dir, "contrib_2022.txt", &[
            line(pa::CONTRIBUTIONS_POST_2022, &[("RECIPIENT_ID", "100"), ("REPORTER_ID", "7"), ("DONOR", "bob jones"), ("CONT_DATE_1", "2022-03-04"), ("CONT_AMT_1", "20")]),
        ]);
        let expenses_2021 = write(dir, "expense_2021.txt", &[
            line(pa::EXPENSES_PRE_2022, &[("DONOR_ID", "200"), ("RECIPIENT", "print shop inc"), ("EXPENSE_DATE", "20210615"), ("EXPENSE_AMT", "75"), ("PURPOSE", "mailers")]),
        ]);

        vec![filers_2021, filers_2022, contributions_2021, contributions_2022, expenses_2021]
    }

    #[test]
    fn test_infer_file() {
        assert_eq!(infer_file(Path::new("/data/contrib_2021.txt")).unwrap(), (DocumentKind::Contribution, 2021));
        assert_eq!(infer_file(Path::new("FILER_2018_v2.txt")).unwrap(), (DocumentKind::Filer, 2018));
        assert_eq!(infer_file(Path::new("expense_20230101_2022.txt")).unwrap(), (DocumentKind::Expenditure, 2022));
        assert!(matches!(infer_file(Path::new("notes_2021.txt")), Err(Error::UnrecognizedFile(_))));
        assert!(matches!(infer_file(Path::new("contrib.txt")), Err(Error::UnrecognizedFile(_))));
    }

    #[test]
    fn test_multi_year_contributions_link_same_year_filers() {
        let dir = TempDir::new().unwrap();
        let tables = PennsylvaniaCleaner::new().clean_source(&fixture(dir.path())).unwrap();

        let contributions: Vec<_> = tables
            .transactions
            .iter()
            .filter(|t| t.transaction_type.as_deref() == Some("CONTRIBUTION"))
            .collect();
        assert_eq!(contributions.len(), 3);

        let split = contributions.iter().find(|t| t.epoch == 2021 && t.recipient_id.as_deref() == Some("100")).unwrap();
        assert_eq!(split.amount, Decimal::new(1550, 2));
        assert_eq!(split.donor_name.as_deref(), Some("BOB JONES"));
        assert_eq!(split.donor_id.as_deref(), Some("PA:DONOR:BOB JONES"));
        assert_eq!(split.recipient_name.as_deref(), Some("JANE SMITH"));
        assert_eq!(split.office_sought.as_deref(), Some("Governor"));

        let later = contributions.iter().find(|t| t.epoch == 2022).unwrap();
        assert_eq!(later.office_sought.as_deref(), Some("State Senator"));

        let orphan = contributions.iter().find(|t| t.recipient_id.as_deref() == Some("999")).unwrap();
        assert_eq!(orphan.recipient_name, None);
        assert_eq!(orphan.office_sought, None);
        assert_eq!(orphan.donor_type, EntityClass::Organization);
        assert_eq!(orphan.amount, Decimal::from(1000));
    }

    #[test]
    fn test_expenditures_link_spending_filer() {
        let dir = TempDir::new().unwrap();
        let tables = PennsylvaniaCleaner::new().clean_source(&fixture(dir.path())).unwrap();

        let expense = tables
            .transactions
            .iter()
            .find(|t| t.transaction_type.as_deref() == Some("EXPENDITURE"))
            .unwrap();
        assert_eq!(expense.donor_id.as_deref(), Some("200"));
        assert_eq!(expense.donor_name.as_deref(), Some("PAC FOR PROGRESS"));
        assert_eq!(expense.donor_type, EntityClass::Organization);
        assert_eq!(expense.recipient_name.as_deref(), Some("PRINT SHOP INC"));
        assert_eq!(expense.purpose.as_deref(), Some("MAILERS"));
        assert_eq!(expense.date.map(|d| d.to_string()).as_deref(), Some("2021-06-15"));
    }

    #[test]
    fn test_report_counts_rows_and_entities() {
        let dir = TempDir::new().unwrap();
        let tables = PennsylvaniaCleaner::new().clean_source(&fixture(dir.path())).unwrap();
        let report = &tables.report;

        assert_eq!(report.input_files, 5);
        // one short line + one unparseable amount
        assert_eq!(report.diagnostics.malformed_rows, 2);
        // contribution to filer 999
        assert_eq!(report.diagnostics.resolution_gaps, 1);

        let jane = tables.individuals.iter().find(|e| e.id == "100").unwrap();
        assert_eq!(jane.kind, EntityKind::Candidate);
        assert_eq!(jane.name.as_deref(), Some("JANE SMITH"));
        assert!(tables.organizations.iter().any(|e| e.id == "200" && e.kind == EntityKind::Committee));
        assert!(tables.organizations.iter().any(|e| e.id == "PA:PAYEE:PRINT SHOP INC"));
        assert!(tables.individuals.iter().any(|e| e.id == "PA:DONOR:BOB JONES"));
    }

    #[test]
    fn test_standardize_maps_filer_types() {
        let mut filers = RawTable::new([pa::RECIPIENT_ID, pa::RECIPIENT_TYPE, pa::RECIPIENT_OFFICE]);
        filers.push(vec!["1".into(), "3".into(), "GOV".into()], 2021);
        filers.push(vec!["2".into(), "9".into(), Cell::Null], 2021);
        let stage = StageTables::new(vec![(DocumentKind::Filer, filers)]);

        let out = PennsylvaniaCleaner::new().standardize(stage).unwrap();
        let table = out.get(DocumentKind::Filer).unwrap();
        assert_eq!(table.values(pa::RECIPIENT_TYPE), vec!["LOBBYIST"]);
        assert_eq!(table.cell(&table.rows[1], pa::RECIPIENT_TYPE), Some(&Cell::Null));
        assert_eq!(table.values(pa::RECIPIENT_OFFICE), vec!["Governor"]);
    }

    #[test]
    fn test_committee_contributions_unsupported() {
        let mut table = RawTable::new(["PCFRegNumb"]);
        table.push(vec!["1".into()], 2021);
        let stage = StageTables::new(vec![(DocumentKind::CommitteeContribution, table)]);

        let result = PennsylvaniaCleaner::new().clean(stage);
        assert!(matches!(
            result,
            Err(Error::UnsupportedKind(Source::Pennsylvania, DocumentKind::CommitteeContribution))
        ));
    }

    #[test]
    fn test_unrecognized_file_name_fails_preprocess() {
        let err = PennsylvaniaCleaner::new()
            .preprocess(&[PathBuf::from("summary.csv")])
            .unwrap_err();
        assert!(matches!(err, Error::UnrecognizedFile(_)));
    }
}
