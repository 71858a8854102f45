//! Program references, the staged argument vector, and the error a program raises.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A dotted `module.function` reference, or a bare `function` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramReference {
    raw: String,
    split: Option<usize>,
}

impl ProgramReference {
    pub fn parse(raw: &str) -> Self {
        Self { raw: raw.to_string(), split: raw.rfind('.') }
    }

    /// Module path: everything before the last dot.
    pub fn module(&self) -> Option<&str> {
        self.split.map(|i| &self.raw[..i])
    }

    /// Callable name: the final segment.
    pub fn name(&self) -> &str {
        match self.split {
            Some(i) => &self.raw[i + 1..],
            None => &self.raw,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ProgramReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Argument vector handed to a program: element zero is the program reference,
/// the rest are the raw tokens in the order the host produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Argv(Vec<String>);

impl Argv {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn program(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Something that can be run with command-line style arguments.
pub trait Program {
    fn invoke(&self, argv: &Argv) -> Result<(), ProgramError>;

    fn description(&self) -> Option<&str> {
        None
    }
}

impl<F> Program for F
where
    F: Fn(&Argv) -> Result<(), ProgramError>,
{
    fn invoke(&self, argv: &Argv) -> Result<(), ProgramError> {
        self(argv)
    }
}

/// One element of a sequence payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text(String),
    Int(i64),
    Float(f64),
    None,
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Text(s) => f.write_str(s),
            Item::Int(n) => write!(f, "{}", n),
            Item::Float(x) => write!(f, "{}", x),
            Item::None => f.write_str("None"),
        }
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Text(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Text(s)
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::Int(n)
    }
}

impl From<f64> for Item {
    fn from(x: f64) -> Self {
        Item::Float(x)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Empty,
    Message(String),
    Items(Vec<Item>),
}

impl Payload {
    fn flatten(&self) -> String {
        match self {
            Payload::Empty => String::new(),
            Payload::Message(s) => s.clone(),
            Payload::Items(items) => items
                .iter()
                .map(Item::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Error raised by a program. `kind` plays the role of the error's type name.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", text_or_kind(.payload, .kind))]
pub struct ProgramError {
    kind: String,
    payload: Payload,
}

impl ProgramError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), payload: Payload::Message(message.into()) }
    }

    /// An error carrying no message at all.
    pub fn bare(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), payload: Payload::Empty }
    }

    pub fn items<I, T>(kind: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        Self {
            kind: kind.into(),
            payload: Payload::Items(items.into_iter().map(Into::into).collect()),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Text shown in the Warnings table. Falls back to the kind when the
    /// payload has nothing to say.
    pub fn report_text(&self) -> String {
        text_or_kind(&self.payload, &self.kind)
    }
}

fn text_or_kind(payload: &Payload, kind: &str) -> String {
    let text = payload.flatten();
    if text.is_empty() {
        kind.to_string()
    } else {
        text
    }
}

impl From<anyhow::Error> for ProgramError {
    fn from(err: anyhow::Error) -> Self {
        Self::new("Error", format!("{:#}", err))
    }
}

impl From<std::io::Error> for ProgramError {
    fn from(err: std::io::Error) -> Self {
        Self::new("OSError", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_reference_splits_on_last_dot() {
        let r = ProgramReference::parse("pkg.sub.mypgm");
        assert_eq!(r.module(), Some("pkg.sub"));
        assert_eq!(r.name(), "mypgm");
        assert_eq!(r.as_str(), "pkg.sub.mypgm");
    }

    #[test]
    fn bare_reference_has_no_module() {
        let r = ProgramReference::parse("mypgm");
        assert_eq!(r.module(), None);
        assert_eq!(r.name(), "mypgm");
    }

    #[test]
    fn argv_keeps_reference_as_element_zero() {
        let argv = Argv::new(vec!["t.p".into(), "a".into(), "=".into()]);
        assert_eq!(argv.program(), "t.p");
        assert_eq!(argv.args(), &["a".to_string(), "=".to_string()]);
        assert_eq!(argv.len(), 3);
    }

    #[test]
    fn message_payload_is_used_as_is() {
        assert_eq!(ProgramError::new("ValueError", "boom").report_text(), "boom");
    }

    #[test]
    fn sequence_payload_is_comma_joined() {
        let err = ProgramError::items(
            "ValueError",
            vec![Item::from("bad value"), Item::Int(3), Item::Float(0.5), Item::None],
        );
        assert_eq!(err.report_text(), "bad value,3,0.5,None");
    }

    #[test]
    fn missing_payload_falls_back_to_kind() {
        assert_eq!(ProgramError::bare("KeyError").report_text(), "KeyError");
        assert_eq!(ProgramError::new("KeyError", "").report_text(), "KeyError");
    }

    #[test]
    fn anyhow_errors_use_their_display_text() {
        let err: ProgramError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.kind(), "Error");
        assert_eq!(err.report_text(), "disk full");
    }
}
