// 🧹 Row Normalizer - per-kind cleaning rules
//
// Each rule is a pure function from one table to a new table: same rows in,
// same rows out. Parse failures are counted in the table diagnostics instead
// of being passed through as raw values.

use crate::entities::{EntityClass, EntityKind};
use crate::error::{MalformedRowError, Result};
use crate::lookups;
use crate::schema::columns::pa;
use crate::table::{Cell, RawRow, RawTable};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

// ============================================================================
// NAMES & CLASSIFICATION
// ============================================================================

/// Uppercase, trim, and collapse runs of whitespace
pub fn canonical_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// ORGANIZATION iff any whitespace-delimited token, case-folded, is an
/// organization keyword; INDIVIDUAL otherwise
pub fn classify_name(name: &str) -> EntityClass {
    let is_org = name
        .split_whitespace()
        .any(|token| lookups::is_organization_keyword(&token.to_uppercase()));
    if is_org {
        EntityClass::Organization
    } else {
        EntityClass::Individual
    }
}

fn classify_cell(cell: Option<&Cell>) -> Cell {
    let name = cell.and_then(Cell::as_string).unwrap_or_default();
    Cell::Text(classify_name(&name).as_str().to_string())
}

fn uppercase_cell(cell: &Cell) -> Cell {
    match cell.as_string() {
        Some(s) => Cell::text(canonical_name(&s)),
        None => Cell::Null,
    }
}

// ============================================================================
// VALUES
// ============================================================================

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%d-%b-%Y", "%b %d, %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

/// Parse a date in any of the formats the sources publish:
/// MM/DD/YYYY, ISO dates and timestamps, compact YYYYMMDD, and the
/// `/Date(<millis>)/` form some JSON endpoints emit
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(millis) = value
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        // Offsets like "1672531200000-0700" keep only the instant
        let digits = millis
            .char_indices()
            .find(|(i, c)| *i > 0 && (*c == '+' || *c == '-'))
            .map_or(millis, |(i, _)| &millis[..i]);
        return digits
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive());
    }

    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        let (y, rest) = value.split_at(4);
        let (m, d) = rest.split_at(2);
        return NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?);
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Parse a money amount: `$` and thousands separators are ignored,
/// parentheses mean negative
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let mut cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    let negative = cleaned.starts_with('(') && cleaned.ends_with(')');
    if negative {
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }
    if cleaned.is_empty() {
        return None;
    }
    let amount = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    Some(if negative { -amount } else { amount })
}

/// Parse `source` into ISO dates under `target`. Blank values stay null;
/// non-blank values no format accepts are null and counted.
pub fn parse_date_column(table: RawTable, source: &str, target: &str) -> RawTable {
    let Some(index) = table.column_index(source) else {
        return table;
    };

    let mut failures = 0;
    let cells: Vec<Cell> = table
        .rows
        .iter()
        .map(|row| match row.cells[index].as_string() {
            None => Cell::Null,
            Some(raw) => match parse_date(&raw) {
                Some(date) => Cell::Text(date.to_string()),
                None => {
                    failures += 1;
                    debug!(column = source, value = %raw, "unparseable date");
                    Cell::Null
                }
            },
        })
        .collect();

    if failures > 0 {
        warn!(column = source, failures, "date values could not be parsed");
    }
    let mut out = table.set_column(target, cells);
    out.diagnostics.date_parse_failures += failures;
    out
}

/// Replace abbreviations through a fixed dictionary; unknown values are kept
pub fn expand_codes(table: RawTable, column: &str, dictionary: &[(&str, &str)]) -> RawTable {
    table.map_column(column, |cell| match cell.as_string() {
        Some(code) => match lookups::lookup(dictionary, &code) {
            Some(full) => Cell::Text(full.to_string()),
            None => cell.clone(),
        },
        None => Cell::Null,
    })
}

// ============================================================================
// CONTRIBUTIONS
// ============================================================================

/// Sum the split amount fields of one row. Blank parts count as zero; an
/// unparseable or negative part makes the whole row malformed.
fn split_total(
    table: &RawTable,
    row: &RawRow,
    line: usize,
) -> std::result::Result<Decimal, MalformedRowError> {
    let mut total = Decimal::ZERO;
    for (_, amount_column) in pa::CONT_SPLITS {
        match table.cell(row, amount_column).and_then(Cell::to_decimal) {
            None => {}
            Some(Ok(amount)) if amount < Decimal::ZERO => {
                return Err(MalformedRowError::FieldParse {
                    line,
                    field: amount_column.to_string(),
                    value: amount.to_string(),
                })
            }
            Some(Ok(amount)) => total += amount,
            Some(Err(value)) => {
                return Err(MalformedRowError::FieldParse {
                    line,
                    field: amount_column.to_string(),
                    value,
                })
            }
        }
    }
    Ok(total)
}

/// Contribution rows: total the split amounts, date from the first parseable
/// split date, uppercase and classify the donor, drop non-canonical columns
pub fn normalize_contributions(table: RawTable) -> Result<RawTable> {
    table.require(pa::DONOR)?;
    table.require(pa::RECIPIENT_ID)?;

    let mut keep = Vec::with_capacity(table.len());
    let mut totals = Vec::with_capacity(table.len());
    let mut dates = Vec::with_capacity(table.len());
    let mut malformed = 0;
    let mut date_failures = 0;

    for (line, row) in table.rows.iter().enumerate() {
        match split_total(&table, row, line + 1) {
            Ok(total) => {
                keep.push(true);
                totals.push(Cell::from(total));
            }
            Err(err) => {
                warn!(%err, "dropping contribution row");
                malformed += 1;
                keep.push(false);
                totals.push(Cell::Null);
            }
        }

        let mut date = None;
        for (date_column, _) in pa::CONT_SPLITS {
            if let Some(raw) = table.value(row, date_column) {
                match parse_date(&raw) {
                    Some(parsed) if date.is_none() => date = Some(parsed),
                    Some(_) => {}
                    None => date_failures += 1,
                }
            }
        }
        dates.push(Cell::opt_text(date.map(|d| d.to_string())));
    }

    if date_failures > 0 {
        warn!(failures = date_failures, "contribution dates could not be parsed");
    }

    let mut out = table
        .set_column(pa::TOTAL_CONT_AMT, totals)
        .set_column(pa::DATE, dates)
        .map_column(pa::DONOR, uppercase_cell)
        .with_column(pa::DONOR_TYPE, |t, row| classify_cell(t.cell(row, pa::DONOR)))
        .with_column(pa::YEAR, |_, row| Cell::Int(row.epoch as i64))
        .with_column(pa::TRANSACTION_TYPE, |_, _| Cell::Text("CONTRIBUTION".into()))
        .drop_columns(pa::CONTRIBUTION_DROPS)
        .keep_rows(&keep);

    out.diagnostics.malformed_rows += malformed;
    out.diagnostics.date_parse_failures += date_failures;
    Ok(out)
}

// ============================================================================
// FILERS
// ============================================================================

/// Filer rows: first-seen dedup on the filer id, uppercase display name,
/// drop address/contact/accounting columns. Type codes are left for the
/// cleaner's entity-type dictionary.
pub fn normalize_filers(table: RawTable) -> Result<RawTable> {
    table.require(pa::RECIPIENT_ID)?;

    let out = table
        .drop_columns(pa::FILER_DROPS)
        .dedup_by(&[pa::RECIPIENT_ID])
        .map_column(pa::RECIPIENT, uppercase_cell);

    if out.diagnostics.duplicate_ids_dropped > 0 {
        debug!(dropped = out.diagnostics.duplicate_ids_dropped, "duplicate filer ids");
    }
    Ok(out)
}

// ============================================================================
// EXPENDITURES
// ============================================================================

/// Expenditure rows: a missing, unparseable or negative amount drops the
/// row. Uppercase purpose and payee, classify the payee, parse
/// the expense date, drop address/date-of-record columns
pub fn normalize_expenditures(table: RawTable) -> Result<RawTable> {
    let amount_index = table.require(pa::EXPENSE_AMT)?;
    table.require(pa::DONOR_ID)?;

    let mut malformed = 0;
    let mut keep = Vec::with_capacity(table.len());
    let mut amounts = Vec::with_capacity(table.len());
    for (line, row) in table.rows.iter().enumerate() {
        match row.cells[amount_index].to_decimal() {
            Some(Ok(amount)) if amount >= Decimal::ZERO => {
                keep.push(true);
                amounts.push(Cell::from(amount));
            }
            other => {
                let err = match other {
                    Some(Ok(amount)) => MalformedRowError::FieldParse {
                        line: line + 1,
                        field: pa::EXPENSE_AMT.to_string(),
                        value: amount.to_string(),
                    },
                    Some(Err(value)) => MalformedRowError::FieldParse {
                        line: line + 1,
                        field: pa::EXPENSE_AMT.to_string(),
                        value,
                    },
                    _ => MalformedRowError::MissingField {
                        line: line + 1,
                        field: pa::EXPENSE_AMT.to_string(),
                    },
                };
                warn!(%err, "dropping expenditure row");
                malformed += 1;
                keep.push(false);
                amounts.push(Cell::Null);
            }
        }
    }

    let mut out = parse_date_column(table, pa::EXPENSE_DATE, pa::DATE)
        .set_column(pa::EXPENSE_AMT, amounts)
        .map_column(pa::PURPOSE, uppercase_cell)
        .map_column(pa::RECIPIENT, uppercase_cell)
        .with_column(pa::RECIPIENT_TYPE, |t, row| classify_cell(t.cell(row, pa::RECIPIENT)))
        .with_column(pa::TRANSACTION_TYPE, |_, _| Cell::Text("EXPENDITURE".into()))
        .drop_columns(pa::EXPENSE_DROPS)
        .keep_rows(&keep);

    out.diagnostics.malformed_rows += malformed;
    Ok(out)
}

/// Source type code → canonical kind label. Unmapped codes become Null so
/// the name classifier decides later.
pub fn map_entity_types(table: RawTable, column: &str, dictionary: &[(&str, EntityKind)]) -> RawTable {
    table.map_column(column, |cell| {
        let code = cell.as_string().unwrap_or_default();
        match lookups::lookup(dictionary, &code) {
            Some(kind) => Cell::Text(kind.as_str().to_string()),
            None => {
                debug!(column, code = %code, "unmapped entity type");
                Cell::Null
            }
        }
    })
}

/// Entity kind carried in a cell: a known label, else classified by name
pub fn kind_or_classify(kind: Option<&str>, name: &str) -> EntityKind {
    kind.and_then(EntityKind::parse)
        .unwrap_or_else(|| classify_name(name).into())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution_table(rows: &[[&str; 7]]) -> RawTable {
        let mut table = RawTable::new([
            "RECIPIENT_ID",
            "DONOR",
            "CONT_DATE_1",
            "CONT_AMT_1",
            "CONT_AMT_2",
            "CONT_AMT_3",
            "OCCUPATION",
        ]);
        for r in rows {
            table.push(r.iter().map(|v| Cell::from(*v)).collect(), 2021);
        }
        table
    }

    #[test]
    fn test_classify_committee_is_organization() {
        assert_eq!(classify_name("SMITH FOR COMMITTEE"), EntityClass::Organization);
        assert_eq!(classify_name("JANE SMITH"), EntityClass::Individual);
        assert_eq!(classify_name("acme llc"), EntityClass::Organization);
        assert_eq!(classify_name(""), EntityClass::Individual);
    }

    #[test]
    fn test_classification_is_idempotent() {
        for name in ["Friends of Bob", "jane q public", "Local 98 IBEW", "ACME Inc."] {
            let canonical = canonical_name(name);
            assert_eq!(classify_name(&canonical), classify_name(&canonical_name(&canonical)));
            assert_eq!(classify_name(name), classify_name(&canonical));
        }
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("  jane   q  smith "), "JANE Q SMITH");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 7).unwrap();
        assert_eq!(parse_date("03/07/2023"), Some(expected));
        assert_eq!(parse_date("2023-03-07"), Some(expected));
        assert_eq!(parse_date("20230307"), Some(expected));
        assert_eq!(parse_date("2023-03-07T14:22:00"), Some(expected));
        assert_eq!(parse_date("3/7/2023 12:00:00 AM"), Some(expected));
        assert_eq!(parse_date("/Date(1678147200000)/"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,250.50"), Some(Decimal::new(125050, 2)));
        assert_eq!(parse_amount("(20.00)"), Some(Decimal::new(-2000, 2)));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_split_amounts_total() {
        let table = contribution_table(&[["100", "jane smith", "01/02/2021", "10.00", "5.50", "0.00", "NURSE"]]);
        let out = normalize_contributions(table).unwrap();

        assert_eq!(out.value(&out.rows[0], "TOTAL_CONT_AMT"), Some("15.50".into()));
        assert_eq!(out.value(&out.rows[0], "DATE"), Some("2021-01-02".into()));
        assert_eq!(out.value(&out.rows[0], "DONOR"), Some("JANE SMITH".into()));
        assert_eq!(out.value(&out.rows[0], "DONOR_TYPE"), Some("INDIVIDUAL".into()));
        assert!(!out.has_column("OCCUPATION"));
        assert!(!out.has_column("CONT_AMT_1"));
    }

    #[test]
    fn test_split_sum_matches_total_for_many_inputs() {
        let cases = [
            ("0", "0", "0"),
            ("1.01", "", "2.99"),
            ("999999.99", "0.01", "123.45"),
            ("", "", ""),
        ];
        for (a, b, c) in cases {
            let expected: Decimal = [a, b, c]
                .iter()
                .filter_map(|v| parse_amount(v))
                .sum();
            let table = contribution_table(&[["1", "X", "", a, b, c, ""]]);
            let out = normalize_contributions(table).unwrap();
            let total = out.value(&out.rows[0], "TOTAL_CONT_AMT").unwrap();
            assert_eq!(Decimal::from_str(&total).unwrap(), expected);
        }
    }

    #[test]
    fn test_unparseable_amount_drops_row() {
        let table = contribution_table(&[
            ["1", "A", "", "ten", "", "", ""],
            ["2", "B", "13/45/2021", "5", "", "", ""],
        ]);
        let out = normalize_contributions(table).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out.diagnostics.malformed_rows, 1);
        assert_eq!(out.diagnostics.date_parse_failures, 1);
        assert_eq!(out.cell(&out.rows[0], "DATE"), Some(&Cell::Null));
    }

    #[test]
    fn test_negative_split_amount_drops_row() {
        let table = contribution_table(&[
            ["1", "A", "", "(25.00)", "-5", "", ""],
            ["2", "B", "", "10", "-0.01", "", ""],
            ["3", "C", "", "10", "0", "", ""],
        ]);
        let out = normalize_contributions(table).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out.diagnostics.malformed_rows, 2);
        assert_eq!(out.values("TOTAL_CONT_AMT"), vec!["10"]);
        for total in out.values("TOTAL_CONT_AMT") {
            assert!(Decimal::from_str(&total).unwrap() >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_filers_dedup_and_uppercase() {
        let mut table = RawTable::new(["RECIPIENT_ID", "RECIPIENT_TYPE", "RECIPIENT", "PHONE"]);
        table.push(vec!["7".into(), "1".into(), "jane smith".into(), "555".into()], 2020);
        table.push(vec!["7".into(), "2".into(), "other".into(), "555".into()], 2020);
        table.push(vec!["8".into(), "2".into(), "pac for good".into(), Cell::Null], 2020);

        let out = normalize_filers(table).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.diagnostics.duplicate_ids_dropped, 1);
        assert_eq!(out.value(&out.rows[0], "RECIPIENT_TYPE"), Some("1".into()));
        assert_eq!(out.value(&out.rows[0], "RECIPIENT"), Some("JANE SMITH".into()));
        assert_eq!(out.value(&out.rows[1], "RECIPIENT"), Some("PAC FOR GOOD".into()));
        assert!(!out.has_column("PHONE"));
    }

    #[test]
    fn test_expenditures_normalized() {
        let mut table = RawTable::new(["DONOR_ID", "RECIPIENT", "EXPENSE_CITY", "EXPENSE_DATE", "EXPENSE_AMT", "PURPOSE"]);
        table.push(
            vec!["7".into(), "acme printing inc".into(), "Erie".into(), "05/01/2021".into(), "250".into(), "yard signs".into()],
            2021,
        );
        table.push(vec!["7".into(), "x".into(), Cell::Null, Cell::Null, Cell::Null, Cell::Null], 2021);
        table.push(vec!["7".into(), "refund".into(), Cell::Null, Cell::Null, "(40)".into(), Cell::Null], 2021);

        let out = normalize_expenditures(table).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.diagnostics.malformed_rows, 2);
        assert_eq!(out.value(&out.rows[0], "RECIPIENT"), Some("ACME PRINTING INC".into()));
        assert_eq!(out.value(&out.rows[0], "RECIPIENT_TYPE"), Some("ORGANIZATION".into()));
        assert_eq!(out.value(&out.rows[0], "PURPOSE"), Some("YARD SIGNS".into()));
        assert_eq!(out.value(&out.rows[0], "DATE"), Some("2021-05-01".into()));
        assert!(!out.has_column("EXPENSE_DATE"));
        assert!(!out.has_column("EXPENSE_CITY"));
    }

    #[test]
    fn test_map_entity_types_nulls_unknown() {
        let mut table = RawTable::new(["TYPE"]);
        table.push(vec!["1".into()], 2020);
        table.push(vec!["2".into()], 2020);
        table.push(vec!["7".into()], 2020);
        let out = map_entity_types(table, "TYPE", lookups::PA_FILER_TYPES);

        assert_eq!(out.values("TYPE"), vec!["CANDIDATE", "COMMITTEE"]);
        assert_eq!(out.cell(&out.rows[2], "TYPE"), Some(&Cell::Null));
    }

    #[test]
    fn test_expand_codes_keeps_unknown() {
        let mut table = RawTable::new(["OFFICE"]);
        table.push(vec!["GOV".into()], 2020);
        table.push(vec!["ZZZ".into()], 2020);
        let out = expand_codes(table, "OFFICE", lookups::PA_OFFICES);
        assert_eq!(out.values("OFFICE"), vec!["Governor", "ZZZ"]);
    }
}
