//! Run registered programs by name, passing them command-line style
//! arguments, and report failures as a Warnings table.

pub mod bundle;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod help;
pub mod host;
pub mod i18n;
pub mod printer;
pub mod program;
pub mod registry;
pub mod report;

pub use bundle::ArgumentBundle;
pub use dispatch::{Dispatcher, Outcome};
pub use errors::DispatchError;
pub use host::{ConsoleHost, Host, MemoryHost};
pub use program::{Argv, Program, ProgramError, ProgramReference};
pub use registry::Registry;
pub use report::ReportAccumulator;
