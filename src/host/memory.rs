//! Host that records everything it is asked to do.

use serde::Serialize;

use super::{Host, PivotTable};
use crate::errors::HostError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum HostEvent {
    StartProcedure { name: String },
    EndProcedure,
    Render { table: PivotTable },
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    events: Vec<HostEvent>,
    procedure: Option<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host where some other caller already opened a procedure.
    pub fn with_open_procedure(name: &str) -> Self {
        Self { events: Vec::new(), procedure: Some(name.to_string()) }
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn tables(&self) -> Vec<&PivotTable> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Render { table } => Some(table),
                _ => None,
            })
            .collect()
    }

    pub fn into_tables(self) -> Vec<PivotTable> {
        self.events
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Render { table } => Some(table),
                _ => None,
            })
            .collect()
    }
}

impl Host for MemoryHost {
    fn procedure_active(&self) -> bool {
        self.procedure.is_some()
    }

    fn start_procedure(&mut self, name: &str) -> Result<(), HostError> {
        if let Some(open) = &self.procedure {
            return Err(HostError::ProcedureActive(open.clone()));
        }
        self.procedure = Some(name.to_string());
        self.events.push(HostEvent::StartProcedure { name: name.to_string() });
        Ok(())
    }

    fn end_procedure(&mut self) -> Result<(), HostError> {
        if self.procedure.take().is_none() {
            return Err(HostError::NoProcedure);
        }
        self.events.push(HostEvent::EndProcedure);
        Ok(())
    }

    fn render(&mut self, table: PivotTable) -> Result<(), HostError> {
        if self.procedure.is_none() {
            return Err(HostError::NoProcedure);
        }
        self.events.push(HostEvent::Render { table });
        Ok(())
    }
}
