use thiserror::Error;

use crate::program::ProgramError;

/// Every way a dispatch can fail. None of these escape `Dispatcher::run`; they
/// are turned into a single Warnings row by `report_text`.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("The name of the program to run must be the first parameter of the command, but no parameters were given")]
    MissingProgramName,

    #[error("The specified program was not found or could not be loaded: {reference}")]
    ProgramLoad { reference: String, detail: String },

    #[error("{}", undefined_message(.reference, .module))]
    UndefinedProgram { reference: String, module: Option<String> },

    #[error(transparent)]
    InvokedProgram(#[from] ProgramError),
}

impl DispatchError {
    pub fn report_text(&self) -> String {
        match self {
            DispatchError::InvokedProgram(err) => err.report_text(),
            other => other.to_string(),
        }
    }

    /// Short tag used in log records.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::MissingProgramName => "missing_program_name",
            DispatchError::ProgramLoad { .. } => "program_load",
            DispatchError::UndefinedProgram { .. } => "undefined_program",
            DispatchError::InvokedProgram(_) => "invoked_program",
        }
    }
}

fn undefined_message(reference: &str, module: &Option<String>) -> String {
    match module {
        Some(module) => format!(
            "The specified function was not found in module {} or is not callable: {}",
            module, reference
        ),
        None => format!(
            "The specified function or class was given without a module name but is not defined: {}",
            reference
        ),
    }
}

/// Errors from the host's reporting facility.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("a procedure is already active: {0}")]
    ProcedureActive(String),

    #[error("no procedure is active")]
    NoProcedure,

    #[error("failed to render table '{title}'")]
    Render {
        title: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("table has {rows} rows and {columns} columns but {values} values were given")]
    Shape { rows: usize, columns: usize, values: usize },

    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("argument bundle is not valid JSON")]
    Parse(#[from] serde_json::Error),

    #[error("argument bundle must be a JSON object")]
    NotAnObject,
}
