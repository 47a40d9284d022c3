//! Loading tables from spreadsheet and CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, Table};

/// Workbook extensions read through calamine.
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Something that turns a source name into a [`Table`].
///
/// Headers of the returned table are trimmed and uppercased.
pub trait TableLoader {
    /// Loads one source.
    ///
    /// Fails with `SourceNotFound` when the source does not exist and with
    /// `SourceReadError` when it cannot be read.
    fn load(&self, source: &str) -> EngineResult<Table>;
}

/// Loads tables from files under a base directory.
///
/// Workbooks (`.xlsx`, `.xlsm`, `.xls`, `.xlsb`, `.ods`) contribute their
/// first sheet; `.csv` and `.txt` files are read with a sniffed delimiter.
/// The first row holds the headers.
///
/// # Example
///
/// ```no_run
/// use meal_benefit_engine::io::{FileTableLoader, TableLoader};
///
/// let loader = FileTableLoader::new("./data");
/// let roster = loader.load("ATIVOS.xlsx")?;
/// println!("{} employees", roster.len());
/// # Ok::<(), meal_benefit_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTableLoader {
    base_dir: PathBuf,
}

impl FileTableLoader {
    /// Creates a loader resolving relative sources against `base_dir`.
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the full path a source resolves to.
    pub fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl TableLoader for FileTableLoader {
    fn load(&self, source: &str) -> EngineResult<Table> {
        let path = self.resolve(source);
        if !path.is_file() {
            return Err(EngineError::SourceNotFound {
                path: path.display().to_string(),
            });
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let table = if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            read_workbook(&path)?
        } else if extension == "csv" || extension == "txt" {
            read_csv(&path)?
        } else {
            return Err(read_error(
                &path,
                format!("unsupported file type '.{}'", extension),
            ));
        };

        debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.width(),
            "Loaded table"
        );
        Ok(table)
    }
}

fn read_error(path: &Path, message: impl Into<String>) -> EngineError {
    EngineError::SourceReadError {
        path: path.display().to_string(),
        message: message.into(),
    }
}

fn read_workbook(path: &Path) -> EngineResult<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| read_error(path, e.to_string()))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(read_error(path, "workbook contains no sheets"));
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| read_error(path, format!("sheet '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| convert_cell(cell).as_text().unwrap_or_default())
        .collect();

    let mut table = Table::new(headers);
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(convert_cell).collect();
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        table.push_row(cells);
    }
    Ok(table)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(f) => Decimal::from_f64(*f)
            .map(|d| CellValue::Number(d.normalize()))
            .unwrap_or(CellValue::Empty),
        Data::Int(i) => CellValue::Number(Decimal::from(*i)),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::Error(e) => CellValue::text(format!("#{:?}", e)),
        // as_datetime applies the workbook's 1900 or 1904 epoch
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|datetime| CellValue::Date(datetime.date()))
            .unwrap_or(CellValue::Empty),
        Data::DateTimeIso(s) => {
            let text = CellValue::text(s.as_str());
            text.as_date().map(CellValue::Date).unwrap_or(text)
        }
        Data::DurationIso(s) => CellValue::text(s.as_str()),
    }
}

fn read_csv(path: &Path) -> EngineResult<Table> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e.to_string()))?;
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        // Excel-exported CSVs are usually Windows-1252
        Err(e) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            decoded.into_owned()
        }
    };
    let content = content.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let Some(header) = records.next() else {
        return Ok(Table::default());
    };
    let header = header.map_err(|e| read_error(path, e.to_string()))?;

    let mut table = Table::new(header.iter());
    for record in records {
        let record = record.map_err(|e| read_error(path, e.to_string()))?;
        let cells: Vec<CellValue> = record.iter().map(CellValue::text).collect();
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        table.push_row(cells);
    }
    Ok(table)
}

/// Picks the delimiter that splits the first lines most consistently.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates = [b';', b',', b'\t', b'|'];
    let sample: Vec<&str> = content.lines().take(10).collect();

    let mut best = b',';
    let mut best_score = 0usize;
    for delimiter in candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delimiter)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let Some(&target) = counts.first() else {
            continue;
        };
        if target <= 1 {
            continue;
        }
        let score = counts.iter().filter(|&&c| c == target).count() * target;
        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }
    best
}
