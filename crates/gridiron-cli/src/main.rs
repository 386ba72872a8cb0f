use clap::{Parser, Subcommand};
use gridiron::config::{DOCROOT_ENV, NAMESPACE_ENV};
use gridiron::{Config, ConfigError, ControlRegistry, Page};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "GridIron: render HTML templates with server-side controls")]
#[command(version)]
struct Cli {
    /// Log pipeline progress (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with `namespace` and `document_root`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Framework tag namespace (overrides GRIDIRON_XHTML_NS)
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Template document root (overrides GRIDIRON_HTML_DOCROOT)
    #[arg(long, global = true)]
    docroot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template to HTML
    Render {
        /// Template name, relative to the document root
        template: String,

        /// Write the output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Match a template's framework tags and report problems
    Check {
        /// Template name, relative to the document root
        template: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(
        "Namespace '{}', document root {}",
        config.namespace,
        config.document_root.display()
    );

    match &cli.command {
        Command::Render { template, output } => cmd_render(config, template, output.as_ref()),
        Command::Check { template } => cmd_check(config, template),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file first, then flags, then the environment.
fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::from_lookup(|key| match key {
            NAMESPACE_ENV => cli
                .namespace
                .clone()
                .or_else(|| std::env::var(key).ok()),
            DOCROOT_ENV => cli
                .docroot
                .as_ref()
                .map(|p| p.display().to_string())
                .or_else(|| std::env::var(key).ok()),
            _ => None,
        })?,
    };

    if let Some(namespace) = &cli.namespace {
        config.namespace = namespace.clone();
    }
    if let Some(docroot) = &cli.docroot {
        config.document_root = docroot.clone();
    }
    config.validate()?;
    Ok(config)
}

fn open_page(config: Config, template: &str) -> Page {
    let registry = ControlRegistry::with_builtin();
    let types: Vec<&str> = registry.iter().map(|d| d.type_name()).collect();
    tracing::debug!("Control types: {}", types.join(", "));

    match Page::open(config, &registry, template) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_render(config: Config, template: &str, output: Option<&PathBuf>) {
    let mut page = open_page(config, template);
    let html = page.render();

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &html) {
                eprintln!("Error writing {}: {e}", path.display());
                std::process::exit(1);
            }
            eprintln!("Rendered: {}", path.display());
        }
        None => print!("{html}"),
    }
}

fn cmd_check(config: Config, template: &str) {
    let mut page = open_page(config, template);
    page.match_controls();

    let diagnostics = page.diagnostics();
    for diagnostic in diagnostics {
        let (line, column) = diagnostic.line_column(page.source());
        let level = if diagnostic.is_error() { "error" } else { "warning" };
        eprintln!("{template}:{line}:{column}: {level}: {}", diagnostic.kind);
    }

    if !diagnostics.is_empty() {
        eprintln!("{} problem(s) in {template}", diagnostics.len());
        std::process::exit(1);
    }

    eprintln!("OK: {template}");
}
