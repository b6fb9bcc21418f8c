use std::{
    iter,
    path::{Path, PathBuf},
};

use calamine::{open_workbook_auto, Data, Range, Reader};
use eyre::{eyre, WrapErr};
use itertools::Itertools;
use tracing::debug;

use crate::model::{Cell, RawRow};

pub trait SheetLoader {
    fn load(&self) -> eyre::Result<Vec<RawRow>>;
}

pub struct WorkbookLoader {
    path: PathBuf,
    sheet: Option<String>,
}

impl WorkbookLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SheetLoader for WorkbookLoader {
    fn load(&self) -> eyre::Result<Vec<RawRow>> {
        let mut workbook = open_workbook_auto(&self.path)
            .wrap_err_with(|| format!("failed to open workbook {}", self.path.display()))?;

        let sheet = match &self.sheet {
            Some(sheet) => sheet.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| eyre!("workbook {} has no sheets", self.path.display()))?,
        };

        let range = workbook
            .worksheet_range(&sheet)
            .wrap_err_with(|| format!("failed to read sheet '{sheet}'"))?;
        let rows = absolute_rows(&range);

        debug!(sheet = %sheet, rows = rows.len(), "loaded sheet");

        Ok(rows)
    }
}

/// Rows of the used range, with leading empty columns put back so column C
/// is always position 2.
fn absolute_rows(range: &Range<Data>) -> Vec<RawRow> {
    let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    range
        .rows()
        .map(|row| {
            iter::repeat(Cell::Empty)
                .take(offset)
                .chain(row.iter().map(Cell::from))
                .collect_vec()
        })
        .collect_vec()
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::String(s.clone()),
            Data::Float(v) => Cell::Float(*v),
            Data::Int(v) => Cell::Int(*v),
            Data::Bool(v) => Cell::Bool(*v),
            Data::DateTime(v) => v
                .as_datetime()
                .map(Cell::DateTime)
                .unwrap_or_else(|| Cell::Float(v.as_f64())),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::String(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// First `count` rows as JSON arrays, for eyeballing a new export's headers.
pub fn preview(rows: &[RawRow], count: usize) -> serde_json::Value {
    serde_json::Value::Array(
        rows.iter()
            .take(count)
            .map(|row| serde_json::Value::Array(row.iter().map(Cell::to_json).collect()))
            .collect(),
    )
}
