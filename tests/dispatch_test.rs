use std::{cell::RefCell, io, rc::Rc};

use pgmrun::{
    errors::HostError,
    help::HelpDisplay,
    host::{HostEvent, Layout, PivotTable},
    Argv, ArgumentBundle, Dispatcher, Host, MemoryHost, Outcome, ProgramError, Registry,
};
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct HelpCounter(Rc<RefCell<usize>>);

impl HelpDisplay for HelpCounter {
    fn show(&self) {
        *self.0.borrow_mut() += 1;
    }
}

fn bundle(tokens: &[&str]) -> ArgumentBundle {
    ArgumentBundle::from_tokens("PGMRUN", tokens.iter().copied(), false)
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

/// Registry with `testpgm.mypgm` and bare `mypgm`, both recording their argv.
fn recording_registry() -> (Registry, Rc<RefCell<Vec<Argv>>>) {
    let calls: Rc<RefCell<Vec<Argv>>> = Rc::default();
    let mut reg = Registry::new();
    let c = calls.clone();
    reg.module("testpgm").define("mypgm", move |argv: &Argv| -> Result<(), ProgramError> {
        c.borrow_mut().push(argv.clone());
        Ok(())
    });
    let c = calls.clone();
    reg.define("mypgm", move |argv: &Argv| -> Result<(), ProgramError> {
        c.borrow_mut().push(argv.clone());
        Ok(())
    });
    (reg, calls)
}

#[test]
fn dotted_reference_runs_once_with_full_token_list() {
    let (reg, calls) = recording_registry();
    let mut host = MemoryHost::new();
    let d = Dispatcher::new(reg).with_help(HelpCounter::default());

    let outcome = d.run(&bundle(&["testpgm.mypgm", "a", "b", "c", "=", "100"]), &mut host);

    assert_eq!(outcome, Outcome::Completed);
    assert!(host.events().is_empty());
    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].as_slice(), &["testpgm.mypgm", "a", "b", "c", "=", "100"]);
}

#[test]
fn bare_reference_runs_from_top_level_namespace() {
    let (reg, calls) = recording_registry();
    let mut host = MemoryHost::new();
    let outcome = Dispatcher::new(reg)
        .with_help(HelpCounter::default())
        .run(&bundle(&["mypgm", "x"]), &mut host);
    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(calls.borrow()[0].program(), "mypgm");
    assert_eq!(calls.borrow()[0].args(), &["x"]);
}

#[test]
fn empty_token_list_reports_no_parameters() {
    let mut host = MemoryHost::new();
    let outcome = Dispatcher::new(Registry::new())
        .with_help(HelpCounter::default())
        .run(&bundle(&[]), &mut host);
    let rows = warning_rows(&host);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("no parameters"));
    assert_eq!(outcome, Outcome::Failed(rows[0].clone()));
}

#[test]
fn bundle_without_positional_entry_reports_no_parameters() {
    let mut host = MemoryHost::new();
    let b = ArgumentBundle::from_json(r#"{"PGMRUN": {"X": 1}}"#).unwrap();
    Dispatcher::new(Registry::new())
        .with_help(HelpCounter::default())
        .run(&b, &mut host);
    let rows = warning_rows(&host);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("no parameters"));
}

#[test]
fn unimportable_module_reports_the_reference() {
    let mut host = MemoryHost::new();
    Dispatcher::new(Registry::new())
        .with_help(HelpCounter::default())
        .run(&bundle(&["nope.mod.fn", "a"]), &mut host);
    let rows = warning_rows(&host);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("nope.mod.fn"), "{}", rows[0]);
}

#[test]
fn undefined_bare_name_reports_the_name() {
    let (reg, calls) = recording_registry();
    let mut host = MemoryHost::new();
    Dispatcher::new(reg)
        .with_help(HelpCounter::default())
        .run(&bundle(&["notdefined"]), &mut host);
    let rows = warning_rows(&host);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("notdefined"));
    assert!(calls.borrow().is_empty());
}

#[test]
fn missing_function_in_known_module_reports_the_reference() {
    let (reg, _) = recording_registry();
    let mut host = MemoryHost::new();
    Dispatcher::new(reg)
        .with_help(HelpCounter::default())
        .run(&bundle(&["testpgm.other"]), &mut host);
    let rows = warning_rows(&host);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("testpgm.other"));
}

#[test]
fn non_callable_attribute_is_undefined() {
    let mut host = MemoryHost::new();
    Dispatcher::new(Registry::builtin())
        .with_help(HelpCounter::default())
        .run(&bundle(&["pgmrun.version"]), &mut host);
    let rows = warning_rows(&host);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("pgmrun.version"));
}

#[test]
fn program_error_message_is_the_row_text() {
    let mut reg = Registry::new();
    reg.module("t").define("boom", |_: &Argv| -> Result<(), ProgramError> {
        Err(ProgramError::new("ValueError", "boom"))
    });
    let mut host = MemoryHost::new();
    let outcome = Dispatcher::new(reg)
        .with_help(HelpCounter::default())
        .run(&bundle(&["t.boom"]), &mut host);
    assert_eq!(warning_rows(&host), vec!["boom".to_string()]);
    assert_eq!(outcome, Outcome::Failed("boom".into()));
}

#[test]
fn program_error_without_message_reports_kind() {
    let mut reg = Registry::new();
    reg.define("silent", |_: &Argv| -> Result<(), ProgramError> {
        Err(ProgramError::bare("KeyError"))
    });
    let mut host = MemoryHost::new();
    Dispatcher::new(reg)
        .with_help(HelpCounter::default())
        .run(&bundle(&["silent"]), &mut host);
    assert_eq!(warning_rows(&host), vec!["KeyError".to_string()]);
}

#[test]
fn failure_opens_and_closes_its_own_procedure() {
    let mut host = MemoryHost::new();
    Dispatcher::new(Registry::new())
        .with_help(HelpCounter::default())
        .run(&bundle(&["missing"]), &mut host);
    let events = host.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], HostEvent::StartProcedure { name: "Messages".into() });
    assert!(matches!(events[1], HostEvent::Render { .. }));
    assert_eq!(events[2], HostEvent::EndProcedure);
}

#[test]
fn failure_reuses_an_open_procedure() {
    let mut host = MemoryHost::with_open_procedure("Descriptives");
    Dispatcher::new(Registry::new())
        .with_help(HelpCounter::default())
        .run(&bundle(&["missing"]), &mut host);
    let events = host.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], HostEvent::Render { .. }));
}

#[test]
fn help_short_circuits_everything() {
    let (reg, calls) = recording_registry();
    let help = HelpCounter::default();
    let mut host = MemoryHost::new();
    let b = ArgumentBundle::from_tokens("PGMRUN", ["testpgm.mypgm", "a"], true);

    let outcome = Dispatcher::new(reg).with_help(help.clone()).run(&b, &mut host);

    assert_eq!(outcome, Outcome::Help);
    assert_eq!(*help.0.borrow(), 1);
    assert!(calls.borrow().is_empty());
    assert!(host.events().is_empty());
}

#[derive(Default)]
struct FailingRender {
    open: bool,
    starts: usize,
    ends: usize,
}

impl Host for FailingRender {
    fn procedure_active(&self) -> bool {
        self.open
    }

    fn start_procedure(&mut self, _name: &str) -> Result<(), HostError> {
        self.open = true;
        self.starts += 1;
        Ok(())
    }

    fn end_procedure(&mut self) -> Result<(), HostError> {
        self.open = false;
        self.ends += 1;
        Ok(())
    }

    fn render(&mut self, table: PivotTable) -> Result<(), HostError> {
        Err(HostError::Render {
            title: table.title,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"),
        })
    }
}

#[test]
fn failure_is_reported_even_when_the_table_cannot_render() {
    let mut host = FailingRender::default();
    let outcome = Dispatcher::new(Registry::new())
        .with_help(HelpCounter::default())
        .run(&bundle(&["missing"]), &mut host);

    assert!(matches!(outcome, Outcome::Failed(ref text) if text.contains("missing")), "{:?}", outcome);
    assert_eq!((host.starts, host.ends), (1, 1));
    assert!(!host.procedure_active());
}
