//! Help display: open the HTML help document in a browser, or print the
//! built-in text when that is not possible.

use std::{
    env,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::{debug, warn};

use crate::printer::MarkdownPrinter;

pub const HELP_TEXT: &str = r#"# pgmrun

**pgmrun** *programname* *arguments*

*programname* is of the form `modulename.functionname` or, if already defined,
just `functionname`. Module and function names are case sensitive.

The arguments depend on the program being run; consult its documentation.
They are passed through exactly as tokenized, with the program name as the
first element:

    pgmrun testpgm.mypgm x=age y = income z=.05

Failures are reported in a *Warnings* table. `--help-page` shows this help
and does not run any program.
"#;

pub trait HelpDisplay {
    fn show(&self);
}

pub struct BrowserHelp {
    document: Option<PathBuf>,
    open_browser: bool,
}

impl BrowserHelp {
    pub fn new(document: Option<PathBuf>, open_browser: bool) -> Self {
        Self { document, open_browser }
    }

    /// Help document next to the executable: `<exe dir>/pgmrun/markdown.html`.
    pub fn default_document() -> Option<PathBuf> {
        let exe = env::current_exe().ok()?;
        let stem = exe.file_stem()?.to_os_string();
        Some(exe.parent()?.join(stem).join("markdown.html"))
    }

    fn document(&self) -> Option<PathBuf> {
        self.document.clone().or_else(Self::default_document)
    }
}

impl HelpDisplay for BrowserHelp {
    fn show(&self) {
        let doc = self.document();
        let url = doc
            .as_deref()
            .map(file_url)
            .unwrap_or_else(|| "file://markdown.html".to_string());

        let opened = self.open_browser
            && doc.as_deref().map(Path::exists).unwrap_or(false)
            && open_in_browser(&url);
        if !opened {
            println!("Help file not found:{}", url);
            MarkdownPrinter::default().print(HELP_TEXT);
        }
    }
}

pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Hand `url` to the platform's opener. Returns whether it accepted it.
fn open_in_browser(url: &str) -> bool {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd.exe");
        c.args(["/c", "start", "", url]);
        c
    } else if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };
    match cmd.stdout(Stdio::null()).stderr(Stdio::null()).status() {
        Ok(status) => {
            debug!(%url, success = status.success(), "browser opener finished");
            status.success()
        }
        Err(e) => {
            warn!(%url, error = %e, "could not start browser opener");
            false
        }
    }
}
