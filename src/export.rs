//! CSV and workbook export of stored results

use crate::records::{
    iso_from_ms, local_day_time, ActiveTestResult, PassiveTestResult, RegularityTestResult,
    ResultRecord, TestType,
};
use crate::session::Session;
use crate::store::{ResultStore, StoreError};
use crate::tests::TAP_COUNT;
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, XlsxError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("No results to export")]
    NothingToExport,
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Workbook error: {0}")]
    Xlsx(#[from] XlsxError),
}

/// One exported value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Free text; always quoted in CSV
    Notes(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn to_csv(&self) -> String {
        match self {
            Cell::Text(text) => escape_field(text),
            Cell::Notes(text) => quote_field(text),
            Cell::Number(value) => format!("{}", value),
            Cell::Empty => String::new(),
        }
    }
}

/// A record that can be written as one row of cells
pub trait ExportRow: ResultRecord {
    fn headers() -> Vec<String>;

    fn cells(&self) -> Vec<Cell>;

    /// CSV fields for this record
    fn row(&self) -> Vec<String> {
        self.cells().iter().map(Cell::to_csv).collect()
    }
}

/// Quote a field if it contains a comma, quote or newline
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quote_field(field)
    } else {
        field.to_string()
    }
}

/// Always-quoted field, used for notes
fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Day, Time and Session Id
fn leading_columns<R: ResultRecord>(record: &R) -> Vec<Cell> {
    let (day, time) = local_day_time(record.recorded_at_ms());
    vec![
        Cell::Text(day),
        Cell::Text(time),
        Cell::Text(record.session_id().unwrap_or("").to_string()),
    ]
}

fn ms(value: f64) -> Cell {
    Cell::Number(value.round())
}

fn header_row(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

impl ExportRow for ActiveTestResult {
    fn headers() -> Vec<String> {
        header_row(&[
            "Day",
            "Time",
            "Session Id",
            "Target Duration (ms)",
            "Your Duration (ms)",
            "Notes",
        ])
    }

    fn cells(&self) -> Vec<Cell> {
        let mut row = leading_columns(self);
        row.push(ms(self.target_duration));
        row.push(ms(self.user_duration));
        row.push(Cell::Notes(self.notes.clone()));
        row
    }
}

impl ExportRow for PassiveTestResult {
    fn headers() -> Vec<String> {
        header_row(&[
            "Day",
            "Time",
            "Session Id",
            "Target Duration (ms)",
            "Your Estimate (ms)",
            "Notes",
        ])
    }

    fn cells(&self) -> Vec<Cell> {
        let mut row = leading_columns(self);
        row.push(ms(self.target_exposure));
        row.push(ms(self.user_input));
        row.push(Cell::Notes(self.notes.clone()));
        row
    }
}

impl ExportRow for RegularityTestResult {
    fn headers() -> Vec<String> {
        let mut headers = header_row(&[
            "Day",
            "Time",
            "Session Id",
            "Average Interval (s)",
            "Standard Deviation (s)",
            "Notes",
        ]);
        headers.extend((1..=TAP_COUNT).map(|i| format!("Timestamp{}", i)));
        headers
    }

    fn cells(&self) -> Vec<Cell> {
        let mut row = leading_columns(self);
        row.push(Cell::Number(self.avg_interval));
        row.push(Cell::Number(self.std_dev_interval));
        row.push(Cell::Notes(self.notes.clone()));
        // Legacy records carry no series; pad to a fixed width
        for i in 0..TAP_COUNT {
            row.push(
                self.tap_timestamps
                    .get(i)
                    .map_or(Cell::Empty, |&t| Cell::Number(t as f64)),
            );
        }
        row
    }
}

fn csv_text(headers: &[String], rows: &[Vec<Cell>]) -> String {
    let mut out = headers.join(",");
    out.push('\n');
    for row in rows {
        let fields: Vec<String> = row.iter().map(Cell::to_csv).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Render records as CSV text, header line first
pub fn to_csv<R: ExportRow>(records: &[R]) -> String {
    let rows: Vec<Vec<Cell>> = records.iter().map(ExportRow::cells).collect();
    csv_text(&R::headers(), &rows)
}

fn session_cells(session: &Session) -> Vec<Cell> {
    let blocks = session
        .blocks
        .iter()
        .map(|b| b.test_type.tag())
        .collect::<Vec<_>>()
        .join(" > ");
    vec![
        Cell::Text(session.id.clone()),
        Cell::Text(session.name.clone()),
        Cell::Text(iso_from_ms(session.created_at)),
        Cell::Text(blocks),
    ]
}

/// `<prefix>_<ISO timestamp with ':' and '.' replaced by '-'>`
pub fn export_stamp(now_ms: u64) -> String {
    iso_from_ms(now_ms).replace([':', '.'], "-")
}

pub fn file_name(prefix: &str, now_ms: u64) -> String {
    format!("{}_{}.csv", prefix, export_stamp(now_ms))
}

fn file_prefix(test_type: TestType) -> &'static str {
    match test_type {
        TestType::Active => "active_test_results",
        TestType::Passive => "passive_test_results",
        TestType::Regularity => "regularity_test_results",
    }
}

fn write_records<R: ExportRow>(
    records: &[R],
    dir: &Path,
    now_ms: u64,
) -> Result<PathBuf, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(file_name(file_prefix(R::TEST_TYPE), now_ms));
    fs::write(&path, to_csv(records))?;
    log::info!("Exported {} {} results to {:?}", records.len(), R::TEST_TYPE.tag(), path);
    Ok(path)
}

/// Export every stored result of one type to a CSV file in `dir`
pub fn export_csv(
    store: &ResultStore,
    test_type: TestType,
    dir: &Path,
    now_ms: u64,
) -> Result<PathBuf, ExportError> {
    match test_type {
        TestType::Active => write_records(&store.load::<ActiveTestResult>()?, dir, now_ms),
        TestType::Passive => write_records(&store.load::<PassiveTestResult>()?, dir, now_ms),
        TestType::Regularity => {
            write_records(&store.load::<RegularityTestResult>()?, dir, now_ms)
        }
    }
}

/// One worksheet: a header row and the data rows below it
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    fn of<R: ExportRow>(name: &str, records: &[R]) -> Self {
        Self {
            name: name.to_string(),
            headers: R::headers(),
            rows: records.iter().map(ExportRow::cells).collect(),
        }
    }

    fn sessions(sessions: &[Session]) -> Self {
        Self {
            name: "Sessions".to_string(),
            headers: header_row(&["Session Id", "Name", "Created", "Blocks"]),
            rows: sessions.iter().map(session_cells).collect(),
        }
    }

    pub fn to_csv(&self) -> String {
        csv_text(&self.headers, &self.rows)
    }
}

/// All results and sessions, one sheet each
#[derive(Debug, Clone)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn from_store(store: &ResultStore) -> Result<Self, ExportError> {
        let active: Vec<ActiveTestResult> = store.load()?;
        let passive: Vec<PassiveTestResult> = store.load()?;
        let regularity: Vec<RegularityTestResult> = store.load()?;
        let sessions = store.sessions()?;

        if active.is_empty() && passive.is_empty() && regularity.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        Ok(Self {
            sheets: vec![
                Sheet::of("Active", &active),
                Sheet::of("Passive", &passive),
                Sheet::of("Regularity", &regularity),
                Sheet::sessions(&sessions),
            ],
        })
    }

    /// Write `timing_results_<stamp>.xlsx` under `dir`; returns its path
    pub fn write_xlsx(&self, dir: &Path, now_ms: u64) -> Result<PathBuf, ExportError> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let path = dir.join(format!("timing_results_{}.xlsx", export_stamp(now_ms)));

        let mut book = XlsxWorkbook::new();
        let bold = Format::new().set_bold();
        for sheet in &self.sheets {
            let worksheet = book.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            for (col, header) in sheet.headers.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, header, &bold)?;
            }
            for (i, row) in sheet.rows.iter().enumerate() {
                let r = i as u32 + 1;
                for (col, cell) in row.iter().enumerate() {
                    let c = col as u16;
                    match cell {
                        Cell::Text(text) | Cell::Notes(text) => {
                            worksheet.write_string(r, c, text)?;
                        }
                        Cell::Number(value) => {
                            worksheet.write_number(r, c, *value)?;
                        }
                        Cell::Empty => {}
                    }
                }
            }
        }
        book.save(&path)?;

        log::info!("Exported workbook with {} sheets to {:?}", self.sheets.len(), path);
        Ok(path)
    }
}
