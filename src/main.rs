//! hilite - print source files with syntax highlighting

mod terminal;

use std::env;
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hilite::syntax::{GrammarRegistry, HighlightCache};
use hilite::{Config, Result};
use terminal::Printer;

/// Parsed command line
#[derive(Debug, Default, PartialEq)]
struct Options {
    file: Option<PathBuf>,
    lang: Option<String>,
    config: Option<PathBuf>,
    line_numbers: bool,
    list_languages: bool,
    help: bool,
    version: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hilite=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("hilite: {}", msg);
            eprintln!("Try 'hilite --help' for more information.");
            process::exit(2);
        }
    };

    if let Err(e) = run(options) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn parse_args<I>(args: I) -> std::result::Result<Options, String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--version" | "-V" => options.version = true,
            "--line-numbers" | "-n" => options.line_numbers = true,
            "--list-languages" => options.list_languages = true,
            "--lang" | "-l" => {
                let name = args.next().ok_or("--lang needs a language name")?;
                options.lang = Some(name);
            }
            "--config" | "-c" => {
                let path = args.next().ok_or("--config needs a path")?;
                options.config = Some(PathBuf::from(path));
            }
            _ if arg.starts_with('-') && arg != "-" => {
                return Err(format!("unknown option '{}'", arg));
            }
            _ => {
                if options.file.is_some() {
                    return Err("only one FILE may be given".to_string());
                }
                options.file = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(options)
}

fn run(options: Options) -> Result<()> {
    if options.help {
        print_usage();
        return Ok(());
    }
    if options.version {
        print_version();
        return Ok(());
    }

    let config = match &options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let registry = GrammarRegistry::with_config(&config);

    if options.list_languages {
        for name in registry.all_language_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let Some(path) = options.file else {
        print_usage();
        return Ok(());
    };
    highlight_file(&path, options.lang.as_deref(), options.line_numbers, &config, &registry)
}

fn highlight_file(
    path: &Path,
    lang: Option<&str>,
    line_numbers: bool,
    config: &Config,
    registry: &GrammarRegistry,
) -> Result<()> {
    let text = if path == Path::new("-") {
        io::read_to_string(io::stdin())?
    } else {
        fs::read_to_string(path)?
    };

    let grammar = match lang {
        Some(name) => {
            let grammar = registry.select_grammar(name);
            if grammar.is_none() {
                warn!(target: "hilite::cli", language = name, "no grammar; printing plain text");
            }
            grammar
        }
        None => registry.select_grammar_for_path(path),
    };
    let mut cache = HighlightCache::with_theme(grammar, config.theme());

    let mut lines: Vec<&str> = text.split('\n').collect();
    if text.ends_with('\n') {
        lines.pop();
    }
    let digits = lines.len().max(1).to_string().len();

    let stdout = io::stdout();
    let mut printer = Printer::new(
        BufWriter::new(stdout.lock()),
        terminal::stdout_width(),
        config.tab_width,
    );
    for (idx, line) in lines.iter().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let spans = cache.request_line_formatting(&text, idx);
        let gutter = line_numbers.then_some((idx + 1, digits));
        printer.print_line(line, &spans, gutter)?;
    }
    printer.flush()
}

fn print_usage() {
    println!("hilite {} - syntax highlighting for the terminal", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: hilite [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  -l, --lang NAME      Highlight as NAME instead of guessing from FILE");
    println!("  -n, --line-numbers   Print line numbers");
    println!("  -c, --config PATH    Read settings from PATH instead of ~/.hilite.toml");
    println!("      --list-languages Print known language names");
    println!("  -h, --help           Show this help message");
    println!("  -V, --version        Show version information");
    println!();
    println!("FILE may be '-' to read standard input.");
    println!("Set RUST_LOG=hilite=debug to see grammar selection and rebuild timings.");
}

fn print_version() {
    println!("hilite {}", env!("CARGO_PKG_VERSION"));
}
