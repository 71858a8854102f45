//! Host that renders tables to the terminal.

use std::io::{self, Write};

use tracing::debug;

use super::{Host, Layout, PivotTable};
use crate::errors::HostError;
use crate::printer::{column_widths, pad, TextPrinter};

pub struct ConsoleHost {
    procedure: Option<String>,
    title_printer: TextPrinter,
}

impl ConsoleHost {
    pub fn new(color: Option<String>) -> Self {
        Self { procedure: None, title_printer: TextPrinter { color } }
    }

    fn write_table(&self, out: &mut impl Write, table: &PivotTable) -> io::Result<()> {
        if let Some(outline) = &table.outline_title {
            writeln!(out, "{}", outline)?;
        }
        writeln!(out, "{}", self.title_printer.paint(table.title.trim_end()))?;

        let rows: Vec<Vec<String>> = match &table.layout {
            Layout::Messages { rows, .. } => rows.iter().map(|r| vec![r.clone()]).collect(),
            Layout::Grid { row_dim, row_labels, column_labels, cells, .. } => {
                let mut rows = Vec::with_capacity(row_labels.len() + 1);
                let mut header = vec![row_dim.clone()];
                header.extend(column_labels.iter().cloned());
                rows.push(header);
                for (label, values) in row_labels.iter().zip(cells) {
                    let mut row = vec![label.clone()];
                    row.extend(values.iter().map(ToString::to_string));
                    rows.push(row);
                }
                rows
            }
        };

        let widths = column_widths(&rows);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w + 2)).collect();
        let rule = format!("+{}+", rule.join("+"));
        writeln!(out, "{}", rule)?;
        for (i, row) in rows.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!(" {} ", pad(cell, *w)))
                .collect();
            writeln!(out, "|{}|", cells.join("|"))?;
            if i == 0 && matches!(table.layout, Layout::Grid { .. }) {
                writeln!(out, "{}", rule)?;
            }
        }
        writeln!(out, "{}", rule)?;
        if let Some(caption) = &table.caption {
            writeln!(out, "{}", caption)?;
        }
        writeln!(out)
    }
}

impl Host for ConsoleHost {
    fn procedure_active(&self) -> bool {
        self.procedure.is_some()
    }

    fn start_procedure(&mut self, name: &str) -> Result<(), HostError> {
        if let Some(open) = &self.procedure {
            return Err(HostError::ProcedureActive(open.clone()));
        }
        debug!(procedure = name, "start procedure");
        self.procedure = Some(name.to_string());
        Ok(())
    }

    fn end_procedure(&mut self) -> Result<(), HostError> {
        let name = self.procedure.take().ok_or(HostError::NoProcedure)?;
        debug!(procedure = %name, "end procedure");
        Ok(())
    }

    fn render(&mut self, table: PivotTable) -> Result<(), HostError> {
        if self.procedure.is_none() {
            return Err(HostError::NoProcedure);
        }
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_table(&mut out, &table)
            .and_then(|_| out.flush())
            .map_err(|source| HostError::Render { title: table.title.clone(), source })
    }
}
