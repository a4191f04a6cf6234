//! Command-line front end: reads HTML or a page snapshot and prints the
//! visible content as Markdown.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use encoding_rs::Encoding;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use visible_markdown::{Document, ExtractOptions, HtmlLoadOptions, Scope, Viewport, extract};

const BIN_NAME: &str = "visible-markdown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    /// Only content significantly visible in the viewport
    Viewport,
    /// Everything that is rendered, on screen or not
    All,
}

impl From<ScopeArg> for Scope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Viewport => Self::Viewport,
            ScopeArg::All => Self::All,
        }
    }
}

/// Extract the visible content of a web page as Markdown.
#[derive(Debug, Parser)]
#[command(name = BIN_NAME, version, about, long_about = None)]
struct Cli {
    /// Input file; reads stdin when omitted or `-`
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Write Markdown to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Treat the input as a JSON page snapshot captured from a browser
    #[arg(long)]
    snapshot: bool,

    /// Which content to extract
    #[arg(long, value_enum, default_value_t = ScopeArg::Viewport)]
    scope: ScopeArg,

    /// Base URL for resolving relative links and images (HTML input)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Viewport width in CSS pixels (HTML input)
    #[arg(long, value_name = "PX", default_value_t = 1280.0)]
    viewport_width: f64,

    /// Viewport height in CSS pixels (HTML input)
    #[arg(long, value_name = "PX", default_value_t = 720.0)]
    viewport_height: f64,

    /// Minimum on-screen area in square pixels for partially visible elements
    #[arg(long, value_name = "PX2")]
    min_visible_area: Option<f64>,

    /// Minimum on-screen fraction of an element's area, between 0 and 1
    #[arg(long, value_name = "RATIO")]
    min_visible_ratio: Option<f64>,

    /// Maximum element nesting below a top-level element
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Character encoding of the input (e.g. utf-8, windows-1252)
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Log extraction decisions to stderr
    #[arg(long)]
    debug: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    generate_completion: Option<Shell>,

    /// Print a man page and exit
    #[arg(long)]
    generate_man: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("visible_markdown=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<(), String> {
    if let Some(shell) = cli.generate_completion {
        let mut command = Cli::command();
        generate(shell, &mut command, BIN_NAME, &mut io::stdout());
        return Ok(());
    }
    if cli.generate_man {
        let man = clap_mangen::Man::new(Cli::command());
        return man
            .render(&mut io::stdout())
            .map_err(|err| format!("Error writing man page: {err}"));
    }

    let options = extract_options(cli)?;
    let input = read_input(cli)?;
    let document = if cli.snapshot {
        Document::from_snapshot_json(&input).map_err(|err| format!("Error loading snapshot: {err}"))?
    } else {
        let load_options = HtmlLoadOptions {
            viewport: Viewport {
                width: cli.viewport_width,
                height: cli.viewport_height,
            },
            base_url: cli.base_url.clone(),
        };
        Document::parse_html(&input, &load_options).map_err(|err| format!("Error loading HTML: {err}"))?
    };
    debug!(nodes = document.len(), scope = %options.scope, "document loaded");

    let markdown = extract(&document, &options);
    write_output(cli, &markdown)
}

fn extract_options(cli: &Cli) -> Result<ExtractOptions, String> {
    if !(cli.viewport_width > 0.0 && cli.viewport_height > 0.0) {
        return Err("Error: viewport dimensions must be positive".to_string());
    }
    let mut options = ExtractOptions::with_scope(cli.scope.into());
    if let Some(area) = cli.min_visible_area {
        options.min_visible_area = area;
    }
    if let Some(ratio) = cli.min_visible_ratio {
        options.min_visible_ratio = ratio;
    }
    if let Some(depth) = cli.max_depth {
        options.max_depth = depth;
    }
    options.validate().map_err(|err| format!("Error: {err}"))?;
    Ok(options)
}

fn read_input(cli: &Cli) -> Result<String, String> {
    let bytes = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            fs::read(path).map_err(|err| format!("Error reading file '{}': {err}", path.display()))?
        }
        _ => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|err| format!("Error reading stdin: {err}"))?;
            buffer
        }
    };
    decode(&bytes, cli.encoding.as_deref())
}

fn decode(bytes: &[u8], label: Option<&str>) -> Result<String, String> {
    match label {
        Some(label) => {
            let encoding =
                Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| format!("Unknown encoding: {label}"))?;
            let (text, _, had_errors) = encoding.decode(bytes);
            if had_errors {
                debug!(encoding = encoding.name(), "input contained malformed sequences");
            }
            Ok(text.into_owned())
        }
        None => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn write_output(cli: &Cli, markdown: &str) -> Result<(), String> {
    let rendered = if markdown.is_empty() {
        String::new()
    } else {
        format!("{markdown}\n")
    };
    match &cli.output {
        Some(path) => {
            fs::write(path, rendered).map_err(|err| format!("Error writing file '{}': {err}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|err| format!("Error writing output: {err}"))
        }
    }
}
