// 📤 Export - canonical tables as CSV files
//
// transactions.csv, individuals.csv and organizations.csv, plus the clean
// report as report.json, written into one output directory.

use crate::cleaner::CanonicalTables;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TRANSACTIONS_FILE: &str = "transactions.csv";
pub const INDIVIDUALS_FILE: &str = "individuals.csv";
pub const ORGANIZATIONS_FILE: &str = "organizations.csv";
pub const REPORT_FILE: &str = "report.json";

/// Serialize records to a CSV file with a header row
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(records.len())
}

/// Write all three tables and the report; returns the paths written
pub fn write_tables(dir: &Path, tables: &CanonicalTables) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let transactions = dir.join(TRANSACTIONS_FILE);
    let individuals = dir.join(INDIVIDUALS_FILE);
    let organizations = dir.join(ORGANIZATIONS_FILE);
    let report = dir.join(REPORT_FILE);

    write_records(&transactions, &tables.transactions)?;
    write_records(&individuals, &tables.individuals)?;
    write_records(&organizations, &tables.organizations)?;

    let file = File::create(&report).map_err(|e| Error::io(&report, e))?;
    serde_json::to_writer_pretty(file, &tables.report)?;

    info!(
        dir = %dir.display(),
        transactions = tables.transactions.len(),
        individuals = tables.individuals.len(),
        organizations = tables.organizations.len(),
        "wrote canonical tables"
    );
    Ok(vec![transactions, individuals, organizations, report])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::CleanReport;
    use crate::entities::{EntityClass, EntityKind, EntityRecord, Transaction};
    use crate::schema::Source;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn tables() -> CanonicalTables {
        let transaction = Transaction {
            transaction_id: "abc".to_string(),
            source: Source::Pennsylvania,
            epoch: 2021,
            donor_id: Some("PA:DONOR:BOB".to_string()),
            donor_name: Some("BOB".to_string()),
            donor_type: EntityClass::Individual,
            recipient_id: Some("100".to_string()),
            recipient_name: None,
            recipient_type: EntityClass::Organization,
            amount: Decimal::new(1550, 2),
            date: NaiveDate::from_ymd_opt(2021, 1, 2),
            transaction_type: Some("CONTRIBUTION".to_string()),
            purpose: None,
            office_sought: Some("Governor".to_string()),
        };
        let entity = EntityRecord {
            id: "100".to_string(),
            source: Source::Pennsylvania,
            name: Some("JANE SMITH".to_string()),
            class: EntityClass::Individual,
            kind: EntityKind::Candidate,
            office_sought: Some("Governor".to_string()),
            party: None,
            employer: None,
            occupation: None,
        };
        CanonicalTables {
            transactions: vec![transaction],
            individuals: vec![entity],
            organizations: Vec::new(),
            report: CleanReport::default(),
        }
    }

    #[test]
    fn test_write_tables() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let written = write_tables(&out, &tables()).unwrap();
        assert_eq!(written.len(), 4);

        let text = std::fs::read_to_string(out.join(TRANSACTIONS_FILE)).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("transaction_id,source,epoch,donor_id"));
        let row = lines.next().unwrap();
        assert!(row.contains("15.50"));
        assert!(row.contains("2021-01-02"));
        assert!(row.contains("INDIVIDUAL"));

        let individuals = std::fs::read_to_string(out.join(INDIVIDUALS_FILE)).unwrap();
        assert!(individuals.contains("JANE SMITH"));
        assert!(individuals.contains("CANDIDATE"));
        assert!(out.join(REPORT_FILE).exists());
    }
}
