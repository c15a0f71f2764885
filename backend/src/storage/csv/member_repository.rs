use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use tracing::{debug, warn};

use super::connection::{CsvConnection, MEMBER_COLUMNS};
use crate::domain::date_utils::{format_optional_date, parse_flexible_date, SheetValue};
use crate::domain::models::{
    MemberPatch, MemberRecord, MemberStatus, MembershipDuration, MembershipType, PaymentType,
    PhoneKey,
};
use crate::storage::traits::MemberStorage;

const COL_TIMESTAMP: usize = 0;
const COL_NAME: usize = 1;
const COL_PHONE: usize = 2;
const COL_TYPE: usize = 3;
const COL_DURATION: usize = 4;
const COL_START: usize = 5;
const COL_END: usize = 6;
const COL_STATUS: usize = 7;
const COL_FEES: usize = 8;
const COL_PAYMENT_TYPE: usize = 9;
const COL_NEXT_PAYMENT: usize = 10;
const COL_DUE_DATE: usize = 11;
const COL_LAST_PAYMENT: usize = 12;
const COL_NOTES: usize = 13;
const COL_TOTAL_PAID: usize = 14;

/// CSV-backed member repository: the whole sheet is read for every lookup and
/// rewritten atomically for every change.
///
/// The sheet is also edited by hand, so every row keeps the cells it was read
/// with. A write only replaces the cells of the columns it actually changes;
/// text the model cannot represent (free-form dates, non-RFC 3339 timestamps,
/// "1,200" amounts) is written back untouched.
#[derive(Clone)]
pub struct CsvMemberRepository {
    connection: CsvConnection,
}

/// A sheet row as read from disk plus its typed view
struct SheetRow {
    cells: Vec<String>,
    member: MemberRecord,
}

impl SheetRow {
    fn from_record(record: &MemberRecord) -> Self {
        Self {
            cells: row_from_record(record).to_vec(),
            member: record.clone(),
        }
    }

    /// Re-render only the given columns from the typed record
    fn refresh_columns(&mut self, columns: &[usize]) {
        if self.cells.len() < MEMBER_COLUMNS.len() {
            self.cells.resize(MEMBER_COLUMNS.len(), String::new());
        }
        let rendered = row_from_record(&self.member);
        for &column in columns {
            self.cells[column] = rendered[column].clone();
        }
    }
}

impl CsvMemberRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_rows(&self) -> Result<Vec<SheetRow>> {
        self.connection.ensure_members_file_exists()?;

        let file_path = self.connection.members_file_path();
        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        // Older sheets predate the notes / total columns, so rows may be short
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let row = result.with_context(|| format!("Malformed row {} in member sheet", index + 2))?;
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(SheetRow {
                member: record_from_row(&row, index + 2),
                cells: row.iter().map(str::to_string).collect(),
            });
        }

        debug!("Read {} member rows from {}", rows.len(), file_path.display());
        Ok(rows)
    }

    fn read_members(&self) -> Result<Vec<MemberRecord>> {
        Ok(self.read_rows()?.into_iter().map(|row| row.member).collect())
    }

    fn write_rows(&self, rows: &[SheetRow]) -> Result<()> {
        let file_path = self.connection.members_file_path();
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to open {}", temp_path.display()))?;

            // Short legacy rows are written back as they were read
            let mut csv_writer = WriterBuilder::new()
                .flexible(true)
                .from_writer(BufWriter::new(file));
            csv_writer.write_record(MEMBER_COLUMNS)?;
            for row in rows {
                csv_writer.write_record(&row.cells)?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)
            .with_context(|| format!("Failed to replace {}", file_path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl MemberStorage for CsvMemberRepository {
    async fn find_by_phone(&self, phone: &PhoneKey) -> Result<Option<MemberRecord>> {
        let _guard = self.connection.file_lock().lock().await;
        let members = self.read_members()?;
        Ok(members.into_iter().find(|m| phone.matches(&m.phone)))
    }

    async fn append(&self, phone: &PhoneKey, record: &MemberRecord) -> Result<bool> {
        let _guard = self.connection.file_lock().lock().await;
        let mut rows = self.read_rows()?;
        if rows.iter().any(|row| phone.matches(&row.member.phone)) {
            return Ok(false);
        }

        rows.push(SheetRow::from_record(record));
        self.write_rows(&rows)?;
        Ok(true)
    }

    async fn update(&self, phone: &PhoneKey, patch: &MemberPatch) -> Result<Option<MemberRecord>> {
        let _guard = self.connection.file_lock().lock().await;
        let mut rows = self.read_rows()?;

        let Some(row) = rows.iter_mut().find(|row| phone.matches(&row.member.phone)) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(row.member.clone()));
        }

        patch.apply(&mut row.member);
        row.refresh_columns(&patched_columns(patch));
        let updated = row.member.clone();

        self.write_rows(&rows)?;
        Ok(Some(updated))
    }

    async fn scan_all(&self) -> Result<Vec<MemberRecord>> {
        let _guard = self.connection.file_lock().lock().await;
        self.read_members()
    }
}

/// Sheet columns a patch writes to
fn patched_columns(patch: &MemberPatch) -> Vec<usize> {
    [
        (patch.membership_type.is_some(), COL_TYPE),
        (patch.duration.is_some(), COL_DURATION),
        (patch.start_date.is_some(), COL_START),
        (patch.end_date.is_some(), COL_END),
        (patch.status.is_some(), COL_STATUS),
        (patch.membership_fees.is_some() || patch.fees_credit.is_some(), COL_FEES),
        (patch.payment_type.is_some(), COL_PAYMENT_TYPE),
        (patch.next_payment.is_some(), COL_NEXT_PAYMENT),
        (patch.payment_due_date.is_some(), COL_DUE_DATE),
        (patch.last_payment_date.is_some(), COL_LAST_PAYMENT),
        (patch.total_paid_credit.is_some(), COL_TOTAL_PAID),
    ]
    .into_iter()
    .filter_map(|(touched, column)| touched.then_some(column))
    .collect()
}

fn cell(row: &StringRecord, column: usize) -> &str {
    row.get(column).unwrap_or("").trim()
}

/// Parse a money cell, ignoring currency symbols and thousands separators
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_amount(amount: Option<f64>) -> String {
    amount.map(|v| v.to_string()).unwrap_or_default()
}

fn date_cell(row: &StringRecord, column: usize, line: usize) -> Option<NaiveDate> {
    let raw = cell(row, column);
    let parsed = parse_flexible_date(&SheetValue::from_cell(raw));
    if parsed.is_none() && !raw.is_empty() {
        warn!(
            "Unparseable {} '{}' on row {}, treating as blank",
            MEMBER_COLUMNS[column], raw, line
        );
    }
    parsed
}

fn record_from_row(row: &StringRecord, line: usize) -> MemberRecord {
    let timestamp = DateTime::parse_from_rfc3339(cell(row, COL_TIMESTAMP))
        .ok()
        .map(|dt| dt.with_timezone(&Utc));

    let membership_type = MembershipType::from_stored(cell(row, COL_TYPE));

    let status = cell(row, COL_STATUS).parse::<MemberStatus>().unwrap_or_else(|_| {
        if !cell(row, COL_STATUS).is_empty() {
            warn!("Unknown status '{}' on row {}, reading as Pending", cell(row, COL_STATUS), line);
        }
        MemberStatus::Pending
    });

    let payment_type = PaymentType::from_stored(cell(row, COL_PAYMENT_TYPE));

    MemberRecord {
        timestamp,
        name: cell(row, COL_NAME).to_string(),
        phone: cell(row, COL_PHONE).to_string(),
        membership_type,
        duration: MembershipDuration::from_stored(cell(row, COL_DURATION)),
        start_date: date_cell(row, COL_START, line),
        end_date: date_cell(row, COL_END, line),
        status,
        membership_fees: parse_amount(cell(row, COL_FEES)),
        payment_type,
        next_payment: parse_amount(cell(row, COL_NEXT_PAYMENT)),
        payment_due_date: date_cell(row, COL_DUE_DATE, line),
        last_payment_date: date_cell(row, COL_LAST_PAYMENT, line),
        special_notes: row.get(COL_NOTES).unwrap_or("").to_string(),
        total_paid: parse_amount(cell(row, COL_TOTAL_PAID)).unwrap_or(0.0),
    }
}

fn row_from_record(record: &MemberRecord) -> [String; 15] {
    [
        record.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default(),
        record.name.clone(),
        record.phone.clone(),
        record.membership_type.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        record.duration.map(|d| d.to_string()).unwrap_or_default(),
        format_optional_date(record.start_date),
        format_optional_date(record.end_date),
        record.status.to_string(),
        format_amount(record.membership_fees),
        record.payment_type.as_ref().map(|p| p.to_string()).unwrap_or_default(),
        format_amount(record.next_payment),
        format_optional_date(record.payment_due_date),
        format_optional_date(record.last_payment_date),
        record.special_notes.clone(),
        record.total_paid.to_string(),
    ]
}
