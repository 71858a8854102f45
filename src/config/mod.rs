use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        let mut map = default_map();

        // Read .pgmrunrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned().filter(|v| !v.is_empty())
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    /// Explicit override, e.g. from the command line.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn programs_path(&self) -> Option<PathBuf> {
        self.get_path("PROGRAMS_PATH")
    }

    pub fn help_path(&self) -> Option<PathBuf> {
        self.get_path("HELP_PATH")
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.get_path("CATALOG_PATH")
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "PROGRAMS_PATH",
        "HELP_PATH",
        "CATALOG_PATH",
        "PROCEDURE_NAME",
        "WARNINGS_TITLE",
        "DEFAULT_COLOR",
        "OUTPUT_FORMAT",
        "OPEN_HELP_IN_BROWSER",
    ];

    KEYS.contains(&k) || k.starts_with("PGMRUN_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("pgmrun").join(".pgmrunrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));

    m.insert(
        "PROGRAMS_PATH".into(),
        base.join("pgmrun").join("programs").to_string_lossy().into_owned(),
    );

    m.insert("PROCEDURE_NAME".into(), "Messages".into());
    m.insert("WARNINGS_TITLE".into(), "Warnings ".into());
    m.insert("DEFAULT_COLOR".into(), "yellow".into());
    m.insert("OUTPUT_FORMAT".into(), "text".into());
    m.insert("OPEN_HELP_IN_BROWSER".into(), "true".into());

    m
}
