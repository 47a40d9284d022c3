//! Writing tables to spreadsheet and CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, Table};

/// Something that persists a [`Table`] and reports where it went.
pub trait TableWriter {
    /// Saves a table, creating missing parent directories.
    fn save(&self, table: &Table, destination: &Path) -> EngineResult<PathBuf>;
}

/// Writes `.xlsx` workbooks or `.csv` files, chosen by extension.
///
/// # Example
///
/// ```no_run
/// use meal_benefit_engine::io::{FileTableWriter, TableWriter};
/// use meal_benefit_engine::models::Table;
/// use std::path::Path;
///
/// let writer = FileTableWriter::new("COMPRA");
/// let path = writer.save(&Table::new(["KEY"]), Path::new("out/VR_MENSAL.xlsx"))?;
/// println!("Saved {}", path.display());
/// # Ok::<(), meal_benefit_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTableWriter {
    sheet_name: String,
}

impl FileTableWriter {
    /// Creates a writer using `sheet_name` for workbook output.
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }
}

impl TableWriter for FileTableWriter {
    fn save(&self, table: &Table, destination: &Path) -> EngineResult<PathBuf> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_error(destination, e.to_string()))?;
        }

        let extension = destination
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" => write_xlsx(table, destination, &self.sheet_name)?,
            "csv" => write_csv(table, destination)?,
            other => {
                return Err(write_error(
                    destination,
                    format!("unsupported file type '.{}'", other),
                ));
            }
        }

        debug!(path = %destination.display(), rows = table.len(), "Saved table");
        Ok(destination.to_path_buf())
    }
}

fn write_error(path: &Path, message: impl Into<String>) -> EngineError {
    EngineError::SourceWriteError {
        path: path.display().to_string(),
        message: message.into(),
    }
}

fn write_xlsx(table: &Table, path: &Path, sheet_name: &str) -> EngineResult<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let header_format = Format::new().set_bold();

    let worksheet = workbook
        .add_worksheet()
        .set_name(sheet_name)
        .map_err(|e| write_error(path, e.to_string()))?;

    for (col, header) in table.columns().iter().enumerate() {
        let col = column_index(col, path)?;
        worksheet
            .write_string_with_format(0, col, header, &header_format)
            .map_err(|e| write_error(path, e.to_string()))?;
    }

    for (row_index, row) in table.rows().iter().enumerate() {
        let xlsx_row = u32::try_from(row_index + 1)
            .map_err(|_| write_error(path, "too many rows for a worksheet"))?;
        for (col, cell) in row.iter().enumerate() {
            let col = column_index(col, path)?;
            let result = match cell {
                CellValue::Empty => continue,
                CellValue::Text(s) => worksheet.write_string(xlsx_row, col, s).map(|_| ()),
                CellValue::Number(n) => match n.to_f64() {
                    Some(value) => worksheet.write_number(xlsx_row, col, value).map(|_| ()),
                    None => worksheet
                        .write_string(xlsx_row, col, n.to_string())
                        .map(|_| ()),
                },
                CellValue::Date(d) => worksheet
                    .write_datetime_with_format(xlsx_row, col, d, &date_format)
                    .map(|_| ()),
            };
            result.map_err(|e| write_error(path, e.to_string()))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| write_error(path, e.to_string()))
}

fn column_index(col: usize, path: &Path) -> EngineResult<u16> {
    u16::try_from(col).map_err(|_| write_error(path, "too many columns for a worksheet"))
}

fn write_csv(table: &Table, path: &Path) -> EngineResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .map_err(|e| write_error(path, e.to_string()))?;

    writer
        .write_record(table.columns())
        .map_err(|e| write_error(path, e.to_string()))?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_string()))
            .map_err(|e| write_error(path, e.to_string()))?;
    }
    writer.flush().map_err(|e| write_error(path, e.to_string()))
}
