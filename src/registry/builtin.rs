//! Programs that ship with the binary.

use super::Registry;
use crate::program::{Argv, ProgramError};

pub const MODULE: &str = "pgmrun";

/// Print the argument vector the way a command-line program would see it.
pub fn echo(argv: &Argv) -> Result<(), ProgramError> {
    let quoted: Vec<String> = argv.as_slice().iter().map(|a| format!("'{}'", a)).collect();
    println!("[{}]", quoted.join(", "));
    Ok(())
}

pub fn argv_json(argv: &Argv) -> Result<(), ProgramError> {
    let text = serde_json::to_string(argv).map_err(|e| ProgramError::new("ValueError", e.to_string()))?;
    println!("{}", text);
    Ok(())
}

/// Fail with every argument as one element of the error payload.
pub fn fail(argv: &Argv) -> Result<(), ProgramError> {
    if argv.args().is_empty() {
        return Err(ProgramError::bare("RuntimeError"));
    }
    Err(ProgramError::items("RuntimeError", argv.args().iter().cloned()))
}

impl Registry {
    /// Registry preloaded with the bundled programs.
    pub fn builtin() -> Self {
        let mut reg = Registry::new();
        reg.define("echo", echo);
        reg.module(MODULE)
            .define("echo", echo)
            .define("argv", argv_json)
            .define("fail", fail)
            .define_value("version", env!("CARGO_PKG_VERSION"));
        reg
    }
}
