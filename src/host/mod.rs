//! Host reporting facility: procedure state plus table creation and rendering.

use std::fmt;

use serde::Serialize;

use crate::errors::HostError;

pub mod console;
pub mod memory;

pub use console::ConsoleHost;
pub use memory::{HostEvent, MemoryHost};

/// The services the dispatcher needs from the host application.
pub trait Host {
    /// Whether a reporting procedure is currently open.
    fn procedure_active(&self) -> bool;

    fn start_procedure(&mut self, name: &str) -> Result<(), HostError>;

    fn end_procedure(&mut self) -> Result<(), HostError>;

    fn create_table(&mut self, title: &str, subtype: &str) -> Result<PivotTable, HostError> {
        if !self.procedure_active() {
            return Err(HostError::NoProcedure);
        }
        Ok(PivotTable::new(title, subtype))
    }

    fn render(&mut self, table: PivotTable) -> Result<(), HostError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Number(x)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "layout")]
pub enum Layout {
    /// Row x column grid with labelled dimensions.
    Grid {
        row_dim: String,
        col_dim: String,
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        cells: Vec<Vec<CellValue>>,
    },
    /// One column with hidden headers; each row's label is its value.
    Messages { column: String, rows: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub title: String,
    pub subtype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline_title: Option<String>,
    #[serde(flatten)]
    pub layout: Layout,
}

impl PivotTable {
    pub fn new(title: &str, subtype: &str) -> Self {
        Self {
            title: title.to_string(),
            subtype: subtype.to_string(),
            caption: None,
            outline_title: None,
            layout: Layout::Messages { column: "Message".into(), rows: Vec::new() },
        }
    }

    /// Switch to a grid with the given dimensions. Existing rows are dropped.
    pub fn set_grid(&mut self, row_dim: &str, col_dim: &str, column_labels: Vec<String>) {
        self.layout = Layout::Grid {
            row_dim: row_dim.to_string(),
            col_dim: col_dim.to_string(),
            row_labels: Vec::new(),
            column_labels,
            cells: Vec::new(),
        };
    }

    pub fn append_row(&mut self, label: &str, values: Vec<CellValue>) {
        match &mut self.layout {
            Layout::Grid { row_labels, cells, .. } => {
                row_labels.push(label.to_string());
                cells.push(values);
            }
            Layout::Messages { rows, .. } => rows.push(label.to_string()),
        }
    }
}
