//! Message translation. Without a catalog every message is returned unchanged.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    messages: HashMap<String, String>,
}

impl Catalog {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Load a flat `{ "message": "translation" }` JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading catalog: {}", path.display()))?;
        let messages: HashMap<String, String> = serde_json::from_str(&text)
            .with_context(|| format!("parsing catalog: {}", path.display()))?;
        Ok(Self { messages })
    }

    pub fn tr<'a>(&'a self, msg: &'a str) -> &'a str {
        self.messages.get(msg).map(String::as_str).unwrap_or(msg)
    }
}
