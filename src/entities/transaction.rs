use super::{fields, EntityClass};
use crate::error::MalformedRowError;
use crate::normalize::{canonical_name, kind_or_classify, parse_date};
use crate::schema::Source;
use crate::table::{Cell, RawRow, RawTable};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Transaction - one money movement from a donor to a recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// SHA-256 over the row content; stable across re-runs on the same input
    pub transaction_id: String,
    pub source: Source,

    /// Data year the row was loaded under
    pub epoch: i32,

    pub donor_id: Option<String>,
    pub donor_name: Option<String>,
    pub donor_type: EntityClass,
    pub recipient_id: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_type: EntityClass,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub transaction_type: Option<String>,
    pub purpose: Option<String>,
    pub office_sought: Option<String>,
}

impl Transaction {
    /// Build from a row of a table already projected onto canonical fields.
    /// `ordinal` keeps otherwise identical rows apart in the id.
    pub fn from_canonical(
        table: &RawTable,
        row: &RawRow,
        source: Source,
        ordinal: usize,
    ) -> Result<Transaction, MalformedRowError> {
        let amount = match table.cell(row, fields::AMOUNT).and_then(Cell::to_decimal) {
            Some(Ok(amount)) => amount,
            Some(Err(value)) => {
                return Err(MalformedRowError::FieldParse {
                    line: ordinal + 1,
                    field: fields::AMOUNT.to_string(),
                    value,
                })
            }
            None => {
                return Err(MalformedRowError::MissingField {
                    line: ordinal + 1,
                    field: fields::AMOUNT.to_string(),
                })
            }
        };

        let donor_name = table.value(row, fields::DONOR_NAME).map(|n| canonical_name(&n));
        let recipient_name = table
            .value(row, fields::RECIPIENT_NAME)
            .map(|n| canonical_name(&n));
        let donor_type = party_class(table.value(row, fields::DONOR_TYPE), donor_name.as_deref());
        let recipient_type = party_class(
            table.value(row, fields::RECIPIENT_TYPE),
            recipient_name.as_deref(),
        );

        let mut tx = Transaction {
            transaction_id: String::new(),
            source,
            epoch: row.epoch,
            donor_id: table.value(row, fields::DONOR_ID),
            donor_name,
            donor_type,
            recipient_id: table.value(row, fields::RECIPIENT_ID),
            recipient_name,
            recipient_type,
            amount,
            date: table
                .value(row, fields::DATE)
                .and_then(|d| parse_date(&d)),
            transaction_type: table.value(row, fields::TRANSACTION_TYPE),
            purpose: table.value(row, fields::PURPOSE),
            office_sought: table.value(row, fields::OFFICE_SOUGHT),
        };
        tx.transaction_id = tx.compute_id(ordinal);
        Ok(tx)
    }

    fn compute_id(&self, ordinal: usize) -> String {
        let epoch = self.epoch.to_string();
        let amount = self.amount.normalize().to_string();
        let date = self.date.map(|d| d.to_string());
        let ordinal = ordinal.to_string();
        let parts = [
            Some(self.source.code()),
            Some(epoch.as_str()),
            self.donor_id.as_deref(),
            self.donor_name.as_deref(),
            self.recipient_id.as_deref(),
            self.recipient_name.as_deref(),
            Some(amount.as_str()),
            date.as_deref(),
            self.transaction_type.as_deref(),
            self.purpose.as_deref(),
            Some(ordinal.as_str()),
        ];

        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.unwrap_or("").as_bytes());
            hasher.update(b"|");
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Kind label when the source gave one, else the keyword classifier
fn party_class(label: Option<String>, name: Option<&str>) -> EntityClass {
    kind_or_classify(label.as_deref(), name.unwrap_or_default()).class()
}

/// Convert every row of a canonical transaction table; rows that cannot be
/// converted are logged and counted, never passed through
pub fn transactions_from_table(table: &RawTable, source: Source) -> (Vec<Transaction>, usize) {
    let mut transactions = Vec::with_capacity(table.len());
    let mut malformed = 0;
    for (ordinal, row) in table.rows.iter().enumerate() {
        match Transaction::from_canonical(table, row, source, ordinal) {
            Ok(tx) => transactions.push(tx),
            Err(err) => {
                warn!(%source, %err, "skipping transaction row");
                malformed += 1;
            }
        }
    }
    (transactions, malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_table() -> RawTable {
        let mut table = RawTable::new([
            fields::DONOR_ID,
            fields::DONOR_NAME,
            fields::DONOR_TYPE,
            fields::RECIPIENT_ID,
            fields::RECIPIENT_NAME,
            fields::RECIPIENT_TYPE,
            fields::AMOUNT,
            fields::DATE,
        ]);
        table.push(
            vec![
                "D1".into(),
                "jane smith".into(),
                Cell::Null,
                "R1".into(),
                "Friends of Bob".into(),
                "COMMITTEE".into(),
                "25.00".into(),
                "2021-06-30".into(),
            ],
            2021,
        );
        table.push(
            vec![
                "D2".into(),
                "X".into(),
                Cell::Null,
                "R1".into(),
                Cell::Null,
                Cell::Null,
                "n/a".into(),
                Cell::Null,
            ],
            2021,
        );
        table
    }

    #[test]
    fn test_from_canonical_fills_fields() {
        let (transactions, malformed) = transactions_from_table(&canonical_table(), Source::Pennsylvania);

        assert_eq!(malformed, 1);
        assert_eq!(transactions.len(), 1);
        let tx = &transactions[0];
        assert_eq!(tx.donor_name.as_deref(), Some("JANE SMITH"));
        assert_eq!(tx.donor_type, EntityClass::Individual);
        assert_eq!(tx.recipient_type, EntityClass::Organization);
        assert_eq!(tx.amount, Decimal::new(2500, 2));
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2021, 6, 30));
        assert_eq!(tx.epoch, 2021);
        assert_eq!(tx.transaction_id.len(), 64);
    }

    #[test]
    fn test_transaction_id_is_deterministic() {
        let (first, _) = transactions_from_table(&canonical_table(), Source::Pennsylvania);
        let (second, _) = transactions_from_table(&canonical_table(), Source::Pennsylvania);
        assert_eq!(first[0].transaction_id, second[0].transaction_id);

        let (other_source, _) = transactions_from_table(&canonical_table(), Source::Arizona);
        assert_ne!(first[0].transaction_id, other_source[0].transaction_id);
    }
}
