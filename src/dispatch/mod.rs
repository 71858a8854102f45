//! Dispatcher: resolve a program by name, hand it its arguments, run it, and
//! turn any failure into a Warnings table.

use tracing::{debug, error, info, warn};

use crate::{
    bundle::ArgumentBundle,
    config::Config,
    errors::DispatchError,
    help::{BrowserHelp, HelpDisplay},
    host::Host,
    i18n::Catalog,
    program::{Argv, ProgramReference},
    registry::Registry,
    report::{ReportAccumulator, DEFAULT_PROCEDURE},
};

/// Output subtype of the failure table.
pub const WARNINGS_SUBTYPE: &str = "Warnings";
pub const DEFAULT_WARNINGS_TITLE: &str = "Warnings ";

/// What a call to `run` ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Help was shown; nothing was run.
    Help,
    Completed,
    /// The program could not be run or failed; carries the reported text.
    Failed(String),
}

pub struct Dispatcher {
    registry: Registry,
    help: Box<dyn HelpDisplay>,
    catalog: Catalog,
    warnings_title: String,
    procedure_name: String,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            help: Box::new(BrowserHelp::new(None, true)),
            catalog: Catalog::identity(),
            warnings_title: DEFAULT_WARNINGS_TITLE.to_string(),
            procedure_name: DEFAULT_PROCEDURE.to_string(),
        }
    }

    pub fn from_config(cfg: &Config, registry: Registry) -> Self {
        let catalog = match cfg.catalog_path() {
            Some(path) => Catalog::load(&path).unwrap_or_else(|e| {
                warn!(error = %format!("{:#}", e), "translation catalog unavailable");
                Catalog::identity()
            }),
            None => Catalog::identity(),
        };
        let mut d = Self::new(registry)
            .with_help(BrowserHelp::new(cfg.help_path(), cfg.get_bool("OPEN_HELP_IN_BROWSER")))
            .with_catalog(catalog);
        if let Some(title) = cfg.get("WARNINGS_TITLE") {
            d.warnings_title = title;
        }
        if let Some(name) = cfg.get("PROCEDURE_NAME") {
            d.procedure_name = name;
        }
        d
    }

    pub fn with_help(mut self, help: impl HelpDisplay + 'static) -> Self {
        self.help = Box::new(help);
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Run the program named by `bundle`. Never fails: errors end up in a
    /// Warnings table on `host`. A successful run produces no output here.
    pub fn run(&self, bundle: &ArgumentBundle, host: &mut dyn Host) -> Outcome {
        if bundle.help_requested() {
            debug!("help requested");
            self.help.show();
            return Outcome::Help;
        }

        match self.execute(bundle) {
            Ok(()) => Outcome::Completed,
            Err(err) => {
                let text = err.report_text();
                warn!(kind = err.kind(), message = %text, "program failed");
                if let DispatchError::ProgramLoad { detail, .. } = &err {
                    debug!(%detail, "load failure detail");
                }
                self.report(&text, host);
                Outcome::Failed(text)
            }
        }
    }

    fn execute(&self, bundle: &ArgumentBundle) -> Result<(), DispatchError> {
        let tokens = bundle.token_list()?;
        let reference = ProgramReference::parse(&tokens[0]);
        let program = self.registry.resolve(&reference)?;
        let argv = Argv::new(tokens);
        info!(program = %reference, args = argv.args().len(), "invoking");
        program.invoke(&argv)?;
        debug!(program = %reference, "completed");
        Ok(())
    }

    fn report(&self, text: &str, host: &mut dyn Host) {
        let mut warnings = ReportAccumulator::new(WARNINGS_SUBTYPE)
            .title(self.catalog.tr(&self.warnings_title))
            .procedure_name(&self.procedure_name);
        warnings.add_row(Some(text), Vec::new());
        if let Err(e) = warnings.generate(host) {
            error!(error = %e, "could not render warnings table");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Layout, MemoryHost};
    use crate::program::ProgramError;

    struct NoHelp;

    impl HelpDisplay for NoHelp {
        fn show(&self) {}
    }

    fn dispatcher(registry: Registry) -> Dispatcher {
        Dispatcher::new(registry).with_help(NoHelp)
    }

    fn warning_rows(host: &MemoryHost) -> Vec<String> {
        host.tables()
            .iter()
            .flat_map(|t| match &t.layout {
                Layout::Messages { rows, .. } => rows.clone(),
                Layout::Grid { row_labels, .. } => row_labels.clone(),
            })
            .collect()
    }

    #[test]
    fn load_failure_row_names_the_reference() {
        let mut host = MemoryHost::new();
        let bundle = ArgumentBundle::from_tokens("PGMRUN", ["nope.mod.fn"], false);
        let outcome = dispatcher(Registry::new()).run(&bundle, &mut host);
        assert!(matches!(outcome, Outcome::Failed(_)));
        let rows = warning_rows(&host);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("nope.mod.fn"));
    }

    #[test]
    fn warnings_table_uses_configured_title() {
        let mut host = MemoryHost::new();
        let mut reg = Registry::new();
        reg.define("bad", |_: &Argv| -> Result<(), ProgramError> {
            Err(ProgramError::new("ValueError", "boom"))
        });
        let bundle = ArgumentBundle::from_tokens("PGMRUN", ["bad"], false);
        dispatcher(reg).run(&bundle, &mut host);
        let tables = host.tables();
        assert_eq!(tables[0].title, "Warnings ");
        assert_eq!(tables[0].subtype, WARNINGS_SUBTYPE);
    }
}
