//! Accumulate rows and turn them into a host table once a procedure can be established.

use tracing::debug;

use crate::errors::{HostError, ReportError};
use crate::host::{CellValue, Host};

/// Procedure name used when the accumulator has to open its own.
/// Never translated.
pub const DEFAULT_PROCEDURE: &str = "Messages";

/// Handle to the host's reporting procedure. `Owned` was opened by us and is
/// ended on drop; `Borrowed` belongs to someone else and is left alone.
pub enum ProcedureContext<'h> {
    Owned(&'h mut dyn Host),
    Borrowed(&'h mut dyn Host),
}

impl<'h> ProcedureContext<'h> {
    pub fn enter(host: &'h mut dyn Host, name: &str) -> Result<Self, HostError> {
        if host.procedure_active() {
            debug!("reusing active procedure");
            return Ok(ProcedureContext::Borrowed(host));
        }
        host.start_procedure(name)?;
        Ok(ProcedureContext::Owned(host))
    }

    pub fn owns_procedure(&self) -> bool {
        matches!(self, ProcedureContext::Owned(_))
    }

    pub fn host(&mut self) -> &mut dyn Host {
        match self {
            ProcedureContext::Owned(h) | ProcedureContext::Borrowed(h) => &mut **h,
        }
    }
}

impl Drop for ProcedureContext<'_> {
    fn drop(&mut self) {
        if let ProcedureContext::Owned(host) = self {
            if let Err(e) = host.end_procedure() {
                tracing::error!(error = %e, "failed to end procedure");
            }
        }
    }
}

/// Rows collected for one table. Consumed by `generate`.
#[derive(Debug, Clone)]
pub struct ReportAccumulator {
    subtype: String,
    outline_title: String,
    title: String,
    caption: String,
    row_dim: String,
    col_dim: String,
    column_labels: Vec<String>,
    procedure_name: String,
    row_labels: Vec<String>,
    column_values: Vec<CellValue>,
    row_count: usize,
}

impl ReportAccumulator {
    /// `subtype` is the output subtype; it is not translated.
    pub fn new(subtype: &str) -> Self {
        Self {
            subtype: subtype.to_string(),
            outline_title: String::new(),
            title: String::new(),
            caption: String::new(),
            row_dim: String::new(),
            col_dim: String::new(),
            column_labels: Vec::new(),
            procedure_name: DEFAULT_PROCEDURE.to_string(),
            row_labels: Vec::new(),
            column_values: Vec::new(),
            row_count: 0,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn outline_title(mut self, outline: &str) -> Self {
        self.outline_title = outline.to_string();
        self
    }

    pub fn caption(mut self, caption: &str) -> Self {
        self.caption = caption.to_string();
        self
    }

    pub fn row_dim(mut self, name: &str) -> Self {
        self.row_dim = name.to_string();
        self
    }

    pub fn col_dim(mut self, name: &str) -> Self {
        self.col_dim = name.to_string();
        self
    }

    /// With no column labels the table is a single hidden-header column.
    pub fn column_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn procedure_name(mut self, name: &str) -> Self {
        self.procedure_name = name.to_string();
        self
    }

    /// Append a row. Without a label the row is labelled with its 1-based index.
    pub fn add_row(&mut self, label: Option<&str>, values: Vec<CellValue>) {
        self.row_count += 1;
        let label = match label {
            Some(l) => l.to_string(),
            None => self.row_count.to_string(),
        };
        self.row_labels.push(label);
        self.column_values.extend(values);
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Render the table if any rows were added. Opens a procedure only when
    /// none is active and always ends the one it opened.
    pub fn generate(self, host: &mut dyn Host) -> Result<(), ReportError> {
        if self.row_count == 0 {
            return Ok(());
        }

        let columns = self.column_labels.len();
        if columns > 0 && self.column_values.len() != self.row_count * columns {
            return Err(ReportError::Shape {
                rows: self.row_count,
                columns,
                values: self.column_values.len(),
            });
        }

        let mut ctx = ProcedureContext::enter(host, &self.procedure_name)?;
        let host = ctx.host();
        let mut table = host.create_table(&self.title, &self.subtype)?;
        if !self.caption.is_empty() {
            table.caption = Some(self.caption);
        }
        if !self.outline_title.is_empty() {
            table.outline_title = Some(self.outline_title);
        }

        if columns > 0 {
            table.set_grid(&self.row_dim, &self.col_dim, self.column_labels);
            let mut values = self.column_values.into_iter();
            for label in &self.row_labels {
                let row: Vec<CellValue> = values.by_ref().take(columns).collect();
                table.append_row(label, row);
            }
        } else {
            for label in &self.row_labels {
                table.append_row(label, Vec::new());
            }
        }

        debug!(subtype = %self.subtype, rows = self.row_count, "rendering table");
        host.render(table)?;
        Ok(())
    }
}
