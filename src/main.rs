use std::{
    fs,
    io::{self, Read},
};

use anyhow::{anyhow, Context, Result};
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

use pgmrun::{
    cli::{Cli, OutputFormat, COMMAND_NAME},
    config::Config,
    ArgumentBundle, ConsoleHost, Dispatcher, MemoryHost, Outcome, Registry,
};

fn main() -> Result<()> {
    init_tracing();
    let args = Cli::parse();

    // Load config; command-line options override it
    let mut cfg = Config::load();
    if let Some(dir) = &args.programs {
        cfg.set("PROGRAMS_PATH", dir.to_string_lossy());
    }
    if let Some(format) = args.format {
        cfg.set("OUTPUT_FORMAT", if format == OutputFormat::Json { "json" } else { "text" });
    }

    let mut registry = Registry::builtin();
    if let Some(dir) = cfg.programs_path() {
        registry = registry.with_search_path(dir);
    }

    if args.list {
        for program in registry.list() {
            match program.description {
                Some(desc) => println!("{}  {}", program.name, desc),
                None => println!("{}", program.name),
            }
        }
        return Ok(());
    }

    let bundle = read_bundle(&args)?;
    let dispatcher = Dispatcher::from_config(&cfg, registry);

    let outcome = match cfg.get("OUTPUT_FORMAT").as_deref() {
        Some("json") => {
            let mut host = MemoryHost::new();
            let outcome = dispatcher.run(&bundle, &mut host);
            let tables = host.into_tables();
            let json = serde_json::to_string_pretty(&tables)?;
            match &args.output {
                Some(path) => fs::write(path, json + "\n")
                    .with_context(|| format!("writing tables: {}", path.display()))?,
                None if !tables.is_empty() => println!("{}", json),
                None => {}
            }
            outcome
        }
        _ => {
            let mut host = ConsoleHost::new(cfg.get("DEFAULT_COLOR"));
            dispatcher.run(&bundle, &mut host)
        }
    };

    if let Outcome::Failed(_) = outcome {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PGMRUN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Bundle from --bundle, from piped stdin, or built from the positional tokens.
fn read_bundle(args: &Cli) -> Result<ArgumentBundle> {
    if let Some(path) = &args.bundle {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading bundle: {}", path.display()))?;
        return ArgumentBundle::from_json(&text)
            .map_err(|e| anyhow!("{}: {}", path.display(), e));
    }

    if args.program.is_none() && !args.help_page && !io::stdin().is_terminal() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        if !buf.trim().is_empty() {
            return ArgumentBundle::from_json(&buf).map_err(|e| anyhow!("stdin: {}", e));
        }
    }

    let tokens = args.program.iter().chain(args.args.iter()).cloned();
    Ok(ArgumentBundle::from_tokens(COMMAND_NAME, tokens, args.help_page))
}
