//! Argument bundle produced by the host's command tokenizer.
//!
//! Layout (key order matters, the command's entry is the first value):
//!
//! ```json
//! { "PGMRUN": { "": [ { "TOKENLIST": ["testpgm.mypgm", "a", "b"] } ], "HELP": {} } }
//! ```

use serde_json::{json, Map, Value};

use crate::errors::{BundleError, DispatchError};

/// Key under which the tokenizer stores positional entries.
pub const POSITIONAL_KEY: &str = "";
pub const TOKENLIST_KEY: &str = "TOKENLIST";
pub const HELP_KEY: &str = "HELP";

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentBundle {
    inner: Map<String, Value>,
}

impl ArgumentBundle {
    pub fn from_json(text: &str) -> Result<Self, BundleError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(inner) => Ok(Self { inner }),
            _ => Err(BundleError::NotAnObject),
        }
    }

    /// Build the layout the host tokenizer would have produced for `command`.
    pub fn from_tokens<I, S>(command: &str, tokens: I, help: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let mut entry = Map::new();
        entry.insert(
            POSITIONAL_KEY.to_string(),
            json!([{ TOKENLIST_KEY: tokens }]),
        );
        if help {
            entry.insert(HELP_KEY.to_string(), json!({}));
        }
        let mut inner = Map::new();
        inner.insert(command.to_string(), Value::Object(entry));
        Self { inner }
    }

    fn command_entry(&self) -> Option<&Map<String, Value>> {
        self.inner.values().next().and_then(Value::as_object)
    }

    pub fn help_requested(&self) -> bool {
        self.command_entry()
            .map(|entry| entry.contains_key(HELP_KEY))
            .unwrap_or(false)
    }

    /// Tokens of the first positional entry. The first token is the program
    /// reference, so an empty list is as unusable as a missing one.
    pub fn token_list(&self) -> Result<Vec<String>, DispatchError> {
        let tokens = self
            .command_entry()
            .and_then(|entry| entry.get(POSITIONAL_KEY))
            .and_then(Value::as_array)
            .and_then(|rows| rows.first())
            .and_then(|row| row.get(TOKENLIST_KEY))
            .and_then(Value::as_array)
            .ok_or(DispatchError::MissingProgramName)?;

        let tokens: Vec<String> = tokens
            .iter()
            .map(|t| match t {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        if tokens.is_empty() {
            return Err(DispatchError::MissingProgramName);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_through_host_layout() {
        let bundle = ArgumentBundle::from_tokens("PGMRUN", ["testpgm.mypgm", "a", "b"], false);
        assert_eq!(bundle.token_list().unwrap(), vec!["testpgm.mypgm", "a", "b"]);
        assert!(!bundle.help_requested());
    }

    #[test]
    fn help_flag_is_detected_on_the_first_entry() {
        let bundle = ArgumentBundle::from_json(
            r#"{"PGMRUN": {"": [{"TOKENLIST": ["x"]}], "HELP": {}}, "OTHER": {}}"#,
        )
        .unwrap();
        assert!(bundle.help_requested());
    }

    #[test]
    fn missing_structure_is_missing_program_name() {
        let bundle = ArgumentBundle::from_json(r#"{"PGMRUN": {}}"#).unwrap();
        assert!(matches!(bundle.token_list(), Err(DispatchError::MissingProgramName)));

        let bundle = ArgumentBundle::from_json("{}").unwrap();
        assert!(matches!(bundle.token_list(), Err(DispatchError::MissingProgramName)));
    }

    #[test]
    fn empty_token_list_is_missing_program_name() {
        let bundle = ArgumentBundle::from_tokens("PGMRUN", Vec::<String>::new(), false);
        assert!(matches!(bundle.token_list(), Err(DispatchError::MissingProgramName)));
    }

    #[test]
    fn non_string_tokens_are_stringified() {
        let bundle =
            ArgumentBundle::from_json(r#"{"C": {"": [{"TOKENLIST": ["p", 100, 0.5]}]}}"#).unwrap();
        assert_eq!(bundle.token_list().unwrap(), vec!["p", "100", "0.5"]);
    }

    #[test]
    fn non_object_bundle_is_rejected() {
        assert!(matches!(ArgumentBundle::from_json("[1]"), Err(BundleError::NotAnObject)));
    }
}
