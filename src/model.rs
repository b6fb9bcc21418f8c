use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Price = f64;

/// One spreadsheet cell, detached from the workbook reader.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    String(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

pub type RawRow = Vec<Cell>;

impl Cell {
    /// Presence test for identity columns: empty, zero, NaN, `false` and
    /// error cells all count as absent.
    pub fn is_truthy(&self) -> bool {
        match self {
            Cell::Empty | Cell::Error(_) => false,
            Cell::String(s) => !s.is_empty(),
            Cell::Float(v) => *v != 0.0 && !v.is_nan(),
            Cell::Int(v) => *v != 0,
            Cell::Bool(v) => *v,
            Cell::DateTime(_) => true,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty | Cell::Error(_) => None,
            Cell::String(s) => Some(s.trim().to_owned()),
            Cell::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(format!("{v:.0}")),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Int(v) => Some(v.to_string()),
            Cell::Bool(v) => Some(v.to_string()),
            Cell::DateTime(v) => Some(v.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Numeric value of the cell. Text is accepted when it reads as a number,
    /// with `,` thousands separators ignored.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Float(v) if v.is_nan() => None,
            Cell::Float(v) => Some(*v),
            Cell::Int(v) => Some(*v as f64),
            Cell::String(s) => {
                let cleaned = s.trim().replace(',', "");
                if cleaned.is_empty() {
                    return None;
                }
                cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
            }
            _ => None,
        }
    }

    /// Rendering used by the `inspect` command; empty cells become `""`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Empty => serde_json::Value::String(String::new()),
            Cell::String(s) | Cell::Error(s) => serde_json::Value::String(s.clone()),
            Cell::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Cell::Int(v) => serde_json::Value::from(*v),
            Cell::Bool(v) => serde_json::Value::Bool(*v),
            Cell::DateTime(v) => serde_json::Value::String(v.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StockRecord {
    #[serde(default)]
    pub stock_code: String,
    #[serde(default)]
    pub stock_name: String,
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "whole_numbers")]
    pub close: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "whole_numbers")]
    pub change: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "whole_numbers")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "whole_numbers")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", serialize_with = "whole_numbers")]
    pub frequency: Option<f64>,
}

impl StockRecord {
    pub fn change_or_zero(&self) -> Price {
        self.change.unwrap_or_default()
    }

    /// Change relative to close, in percent. `None` when either is missing or
    /// close is zero.
    pub fn change_percent(&self) -> Option<f64> {
        match (self.change, self.close) {
            (Some(change), Some(close)) if close != 0.0 => Some(change / close * 100.0),
            _ => None,
        }
    }
}

/// Paging-shaped wrapper kept for compatibility with table widgets. `draw` is
/// always 0 and both counts equal `data.len()` when written.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedEnvelope {
    pub draw: u32,
    pub records_total: usize,
    pub records_filtered: usize,
    pub data: Vec<StockRecord>,
}

impl FeedEnvelope {
    pub fn new(data: Vec<StockRecord>) -> Self {
        Self {
            draw: 0,
            records_total: data.len(),
            records_filtered: data.len(),
            data,
        }
    }
}

/// Integral values are written without a fraction, as the spreadsheet shows them.
fn whole_numbers<S: serde::Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => serializer.serialize_i64(*v as i64),
        Some(v) => serializer.serialize_f64(*v),
        None => serializer.serialize_none(),
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
