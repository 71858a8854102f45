//! Program registry: code-registered namespaces plus JSON program definitions
//! imported from a search path.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    rc::Rc,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    errors::DispatchError,
    program::{Argv, Program, ProgramError, ProgramReference},
};

pub mod builtin;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecSpec {
    pub program: String,
    #[serde(default)]
    pub args_template: Vec<String>,
    #[serde(default)]
    pub stdin: bool,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub exec: ExecSpec,
}

/// Contents of one `<module path>.json` definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleDef {
    #[serde(default)]
    pub programs: Vec<ProgramDef>,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Entry of `Registry::list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub name: String,
    pub description: Option<String>,
}

/// What a name in a namespace is bound to.
#[derive(Clone)]
pub enum Binding {
    Program(Rc<dyn Program>),
    /// A plain attribute; resolving it as a program fails.
    Value(String),
}

#[derive(Clone, Default)]
pub struct Module {
    bindings: HashMap<String, Binding>,
}

impl Module {
    pub fn define<P: Program + 'static>(&mut self, name: &str, program: P) -> &mut Self {
        self.bindings.insert(name.to_string(), Binding::Program(Rc::new(program)));
        self
    }

    pub fn define_value(&mut self, name: &str, value: &str) -> &mut Self {
        self.bindings.insert(name.to_string(), Binding::Value(value.to_string()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Programs in this module, qualified with `prefix` when it is non-empty.
    fn programs(&self, prefix: &str) -> Vec<ProgramInfo> {
        self.bindings
            .iter()
            .filter_map(|(name, b)| match b {
                Binding::Program(p) => Some(ProgramInfo {
                    name: if prefix.is_empty() { name.clone() } else { format!("{}.{}", prefix, name) },
                    description: p.description().map(str::to_string),
                }),
                Binding::Value(_) => None,
            })
            .collect()
    }

    fn from_def(def: ModuleDef) -> Self {
        let mut module = Module::default();
        for p in def.programs {
            let name = p.name.clone();
            module.define(&name, ExecProgram::from(p));
        }
        for (k, v) in def.values {
            let text = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            module.define_value(&k, &text);
        }
        module
    }
}

#[derive(Clone, Default)]
pub struct Registry {
    main: Module,
    modules: HashMap<String, Module>,
    search_path: Option<PathBuf>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory searched for `<seg>/<seg>.json` definition files when a module
    /// is not registered in code.
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_path = Some(dir.into());
        self
    }

    /// Bind a name in the top-level namespace.
    pub fn define<P: Program + 'static>(&mut self, name: &str, program: P) -> &mut Self {
        self.main.define(name, program);
        self
    }

    pub fn define_value(&mut self, name: &str, value: &str) -> &mut Self {
        self.main.define_value(name, value);
        self
    }

    /// Module registered in code, created on first use.
    pub fn module(&mut self, path: &str) -> &mut Module {
        self.modules.entry(path.to_string()).or_default()
    }

    /// Load a module by dotted path.
    pub fn import(&self, path: &str) -> Result<Module, DispatchError> {
        if let Some(m) = self.modules.get(path) {
            return Ok(m.clone());
        }
        self.load_module_file(path).map_err(|e| {
            debug!(module = path, error = %format!("{:#}", e), "import failed");
            DispatchError::ProgramLoad { reference: path.to_string(), detail: format!("{:#}", e) }
        })
    }

    fn load_module_file(&self, path: &str) -> Result<Module> {
        let dir = self
            .search_path
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("no module named {}", path))?;
        let file = module_file(dir, path)
            .ok_or_else(|| anyhow::anyhow!("invalid module path: {}", path))?;
        let text = fs::read_to_string(&file)
            .with_context(|| format!("reading program definitions: {}", file.display()))?;
        let def: ModuleDef = serde_json::from_str(&text)
            .with_context(|| format!("parsing program definitions: {}", file.display()))?;
        debug!(module = path, file = %file.display(), programs = def.programs.len(), "imported module");
        Ok(Module::from_def(def))
    }

    /// Resolve a reference to something callable.
    pub fn resolve(&self, reference: &ProgramReference) -> Result<Rc<dyn Program>, DispatchError> {
        let (binding, module) = match reference.module() {
            Some(path) => {
                let module = self.import(path).map_err(|e| match e {
                    DispatchError::ProgramLoad { detail, .. } => DispatchError::ProgramLoad {
                        reference: reference.to_string(),
                        detail,
                    },
                    other => other,
                })?;
                (module.get(reference.name()).cloned(), Some(path.to_string()))
            }
            None => (self.main.get(reference.name()).cloned(), None),
        };

        match binding {
            Some(Binding::Program(p)) => Ok(p),
            _ => Err(DispatchError::UndefinedProgram { reference: reference.to_string(), module }),
        }
    }

    /// Every runnable program by fully qualified name, including definition
    /// files on the search path.
    pub fn list(&self) -> Vec<ProgramInfo> {
        let mut names = self.main.programs("");
        for (path, module) in &self.modules {
            names.extend(module.programs(path));
        }
        if let Some(dir) = &self.search_path {
            for path in definition_modules(dir) {
                if self.modules.contains_key(&path) {
                    continue;
                }
                if let Ok(module) = self.load_module_file(&path) {
                    names.extend(module.programs(&path));
                }
            }
        }
        names.sort_by(|a, b| a.name.cmp(&b.name));
        names
    }
}

fn module_file(dir: &Path, path: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty() || s.contains(['/', '\\'])) {
        return None;
    }
    let mut file = dir.to_path_buf();
    for s in &segments[..segments.len() - 1] {
        file.push(s);
    }
    file.push(format!("{}.json", segments[segments.len() - 1]));
    Some(file)
}

/// Dotted module paths of every definition file under `dir`.
fn definition_modules(dir: &Path) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![(dir.to_path_buf(), String::new())];
    while let Some((d, prefix)) = stack.pop() {
        let Ok(rd) = fs::read_dir(&d) else { continue };
        for e in rd.filter_map(|e| e.ok()) {
            let p = e.path();
            let Some(stem) = p.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let dotted = if prefix.is_empty() { stem.clone() } else { format!("{}.{}", prefix, stem) };
            if p.is_dir() {
                stack.push((p, dotted));
            } else if p.extension().and_then(|s| s.to_str()) == Some("json") {
                found.push(dotted);
            }
        }
    }
    found
}

/// A program defined in a JSON file and run as a child process.
#[derive(Debug, Clone)]
pub struct ExecProgram {
    def: ProgramDef,
}

impl From<ProgramDef> for ExecProgram {
    fn from(def: ProgramDef) -> Self {
        Self { def }
    }
}

impl Program for ExecProgram {
    fn invoke(&self, argv: &Argv) -> Result<(), ProgramError> {
        let exec = &self.def.exec;
        let mut cmd = Command::new(&exec.program);
        cmd.args(exec.args_template.iter().map(|t| apply_template(t, argv)));
        cmd.args(argv.args());
        cmd.envs(&exec.env);
        cmd.env("PGMRUN_PROGRAM", argv.program());
        cmd.stdin(if exec.stdin { Stdio::piped() } else { Stdio::inherit() });
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::piped());

        debug!(program = %exec.program, args = argv.args().len(), "spawning");
        let mut child = cmd.spawn().map_err(|e| {
            ProgramError::new("OSError", format!("failed to spawn {}: {}", exec.program, e))
        })?;

        if exec.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                let payload = serde_json::to_string(argv)
                    .map_err(|e| ProgramError::new("ValueError", e.to_string()))?;
                stdin.write_all(payload.as_bytes()).ok();
            }
        }

        let out = child.wait_with_output()?;
        if out.status.success() {
            return Ok(());
        }
        let kind = match out.status.code() {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        Err(ProgramError::new(kind, String::from_utf8_lossy(&out.stderr).trim()))
    }

    fn description(&self) -> Option<&str> {
        self.def.description.as_deref()
    }
}

fn apply_template(t: &str, argv: &Argv) -> String {
    t.replace("{{program}}", argv.program())
}
