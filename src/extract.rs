use chrono::{DateTime, Utc};
use derive_more::Display;
use eyre::bail;
use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    clock::{Clock, SystemClock},
    model::{Cell, FeedEnvelope, RawRow, StockRecord},
    utils::{from_serial_date, parse_calendar_date},
};

#[derive(Debug, Display, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    StockCode,
    StockName,
    Date,
    Close,
    Change,
    Volume,
    Value,
    Frequency,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Column {
    pub position: usize,
    pub header: &'static str,
}

impl Column {
    pub const fn new(position: usize, header: &'static str) -> Self {
        Self { position, header }
    }

    fn cell<'a>(&self, row: &'a [Cell]) -> &'a Cell {
        static EMPTY: Cell = Cell::Empty;
        row.get(self.position).unwrap_or(&EMPTY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub code: Column,
    pub name: Column,
    pub date: Column,
    pub close: Column,
    pub change: Column,
    pub volume: Column,
    pub value: Column,
    pub frequency: Column,
}

impl Default for ColumnLayout {
    /// IDX "Ringkasan Saham" export.
    fn default() -> Self {
        Self {
            code: Column::new(1, "Kode Saham"),
            name: Column::new(2, "Nama Perusahaan"),
            date: Column::new(6, "Tanggal Perdagangan Terakhir"),
            close: Column::new(10, "Penutupan"),
            change: Column::new(11, "Selisih"),
            volume: Column::new(12, "Volume"),
            value: Column::new(13, "Nilai"),
            frequency: Column::new(14, "Frekuensi"),
        }
    }
}

impl ColumnLayout {
    pub fn columns(&self) -> [(Field, Column); 8] {
        [
            (Field::StockCode, self.code),
            (Field::StockName, self.name),
            (Field::Date, self.date),
            (Field::Close, self.close),
            (Field::Change, self.change),
            (Field::Volume, self.volume),
            (Field::Value, self.value),
            (Field::Frequency, self.frequency),
        ]
    }

    /// Checks a header row against this layout, listing every mismatching
    /// column.
    pub fn validate_header(&self, header: &[Cell]) -> eyre::Result<()> {
        let mismatches = self
            .columns()
            .into_iter()
            .filter_map(|(field, column)| {
                let found = column.cell(header).as_text().unwrap_or_default();
                if found.trim().eq_ignore_ascii_case(column.header) {
                    None
                } else {
                    Some(format!(
                        "{field}: expected '{}' at column {}, found '{found}'",
                        column.header, column.position
                    ))
                }
            })
            .collect_vec();

        if !mismatches.is_empty() {
            bail!("header row does not match column layout: {}", mismatches.join("; "));
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExtractorConfig {
    layout: ColumnLayout,
    strict_headers: bool,
}

impl ExtractorConfig {
    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_strict_headers(mut self, value: bool) -> Self {
        self.strict_headers = value;
        self
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    pub rows_read: usize,
    pub kept: usize,
    pub missing_identity: usize,
    pub bad_date: usize,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub feed: FeedEnvelope,
    pub report: ExtractReport,
}

pub struct Extractor<C: Clock> {
    pub config: ExtractorConfig,
    pub clock: C,
}

impl<C: Clock> Extractor<C> {
    pub fn new(config: ExtractorConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn extract(&self, rows: &[RawRow]) -> eyre::Result<Extraction> {
        if self.config.strict_headers {
            match rows.first() {
                Some(header) => self.config.layout.validate_header(header)?,
                None => bail!("sheet is empty, expected a header row"),
            }
        }

        Ok(self.extract_rows(rows))
    }

    fn extract_rows(&self, rows: &[RawRow]) -> Extraction {
        let layout = &self.config.layout;
        let mut report = ExtractReport::default();
        let mut data = Vec::new();

        for (ix, row) in rows.iter().enumerate().skip(1) {
            report.rows_read += 1;

            let (Some(code), Some(name)) = (
                identity(layout.code.cell(row)),
                identity(layout.name.cell(row)),
            ) else {
                debug!(row = ix, "skipping row without stock code or name");
                report.missing_identity += 1;
                continue;
            };

            let date_cell = layout.date.cell(row);
            let Some(date) = self.normalize_date(date_cell) else {
                warn!(row = ix, cell = ?date_cell, "skipping row with unparseable date");
                report.bad_date += 1;
                continue;
            };

            data.push(StockRecord {
                stock_code: code,
                stock_name: name,
                date,
                close: layout.close.cell(row).as_number(),
                change: layout.change.cell(row).as_number(),
                volume: layout.volume.cell(row).as_number(),
                value: layout.value.cell(row).as_number(),
                frequency: layout.frequency.cell(row).as_number(),
            });
        }

        report.kept = data.len();

        Extraction {
            feed: FeedEnvelope::new(data),
            report,
        }
    }

    // None: present but not a date
    fn normalize_date(&self, cell: &Cell) -> Option<DateTime<Utc>> {
        if !cell.is_truthy() {
            return Some(self.clock.now());
        }

        match cell {
            Cell::DateTime(date) => Some(date.and_utc()),
            Cell::String(raw) => parse_calendar_date(raw),
            Cell::Float(serial) => from_serial_date(*serial),
            Cell::Int(serial) => from_serial_date(*serial as f64),
            _ => None,
        }
    }
}

/// Trimmed text of a truthy cell; whitespace-only text counts as absent.
fn identity(cell: &Cell) -> Option<String> {
    if !cell.is_truthy() {
        return None;
    }
    cell.as_text().filter(|text| !text.is_empty())
}

/// Positional extraction with the IDX layout and the wall clock.
pub fn extract(rows: &[RawRow]) -> FeedEnvelope {
    Extractor::new(ExtractorConfig::default(), SystemClock)
        .extract_rows(rows)
        .feed
}
