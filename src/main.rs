// ==============================================================================
// CLI for the Avro IDL Syntax Parser
// ==============================================================================
//
//   avdl-syntax parse [--json] [FILE|-]   print the syntax tree
//   avdl-syntax tokens [FILE|-]           print the token stream
//   avdl-syntax check PATH...             report errors in files and directories
//   avdl-syntax fmt [FILE|-]              print the canonical rendering

use std::fs;
use std::io::{self, Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use indexmap::IndexMap;
use lexopt::prelude::*;
use miette::Context;
use walkdir::WalkDir;

use avdl_syntax::lexer::{self, TokenKind};
use avdl_syntax::{Error, Parser, SyntaxTree, render_program};

const USAGE: &str = "\
Usage: avdl-syntax [OPTIONS] <COMMAND> [ARGS]

Commands:
  parse [--json] [FILE|-]  Print the syntax tree as an S-expression (or JSON)
  tokens [FILE|-]          Print the token stream
  check PATH...            Report errors in .avdl files, recursing into directories
  fmt [FILE|-]             Print the file in canonical layout

Options:
      --max-depth <N>      Maximum nesting depth before the parser bails out
      --max-input-len <N>  Maximum input length in bytes
  -h, --help               Print help
  -V, --version            Print version

Set AVDL_SYNTAX_LOG (e.g. `debug`) to see parser logs on stderr.
";

// ==============================================================================
// Argument Parsing
// ==============================================================================

enum Command {
    Parse { json: bool, input: Option<String> },
    Tokens { input: Option<String> },
    Check { paths: Vec<PathBuf> },
    Fmt { input: Option<String> },
}

struct Args {
    command: Command,
    parser: Parser,
}

fn parse_args() -> Result<Args, lexopt::Error> {
    let mut parser = Parser::new();
    let mut subcommand: Option<String> = None;
    let mut json = false;
    let mut inputs: Vec<String> = Vec::new();

    let mut args = lexopt::Parser::from_env();
    while let Some(arg) = args.next()? {
        match arg {
            Short('h') | Long("help") => {
                print!("{USAGE}");
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("avdl-syntax {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Long("json") => json = true,
            Long("max-depth") => {
                parser.max_depth(args.value()?.parse()?);
            }
            Long("max-input-len") => {
                parser.max_input_len(args.value()?.parse()?);
            }
            Value(value) if subcommand.is_none() => subcommand = Some(value.string()?),
            Value(value) => inputs.push(value.string()?),
            _ => return Err(arg.unexpected()),
        }
    }

    let Some(subcommand) = subcommand else {
        return Err("missing command (one of `parse`, `tokens`, `check`, `fmt`)".into());
    };
    if json && subcommand != "parse" {
        return Err("`--json` only applies to `parse`".into());
    }
    let command = match subcommand.as_str() {
        "parse" => Command::Parse {
            json,
            input: single_input(&subcommand, inputs)?,
        },
        "tokens" => Command::Tokens {
            input: single_input(&subcommand, inputs)?,
        },
        "fmt" => Command::Fmt {
            input: single_input(&subcommand, inputs)?,
        },
        "check" => {
            if inputs.is_empty() {
                return Err("`check` needs at least one path".into());
            }
            Command::Check {
                paths: inputs.into_iter().map(PathBuf::from).collect(),
            }
        }
        other => return Err(format!("unknown command `{other}`").into()),
    };
    Ok(Args { command, parser })
}

fn single_input(subcommand: &str, mut inputs: Vec<String>) -> Result<Option<String>, lexopt::Error> {
    if inputs.len() > 1 {
        return Err(format!("`{subcommand}` takes at most one input file").into());
    }
    Ok(inputs.pop())
}

// ==============================================================================
// Entry Point
// ==============================================================================

fn main() -> miette::Result<ExitCode> {
    miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().build())
    }))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("AVDL_SYNTAX_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();

    let args = parse_args()
        .map_err(|e| Error::Usage(e.to_string()))
        .map_err(miette::Report::new)?;

    match args.command {
        Command::Parse { json, input } => run_parse(&args.parser, input.as_deref(), json),
        Command::Tokens { input } => run_tokens(input.as_deref()),
        Command::Check { paths } => run_check(&args.parser, &paths),
        Command::Fmt { input } => run_fmt(&args.parser, input.as_deref()),
    }
}

// ==============================================================================
// Subcommands
// ==============================================================================

fn run_parse(parser: &Parser, input: Option<&str>, json: bool) -> miette::Result<ExitCode> {
    let (name, source) = read_input(input)?;
    let tree = parse_source(parser, &name, &source)?;

    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, &tree.to_json())
            .map_err(|e| Error::Io { source: e.into() })
            .map_err(miette::Report::new)
            .wrap_err("write JSON tree")?;
        writeln!(stdout)
            .map_err(|e| Error::Io { source: e })
            .map_err(miette::Report::new)?;
    } else {
        writeln!(stdout, "{}", tree.to_sexp())
            .map_err(|e| Error::Io { source: e })
            .map_err(miette::Report::new)
            .wrap_err("write syntax tree")?;
    }

    if tree.has_errors() {
        report(&tree);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_tokens(input: Option<&str>) -> miette::Result<ExitCode> {
    let (_, source) = read_input(input)?;
    let mut stdout = io::stdout().lock();
    for token in lexer::tokenize(&source) {
        if token.kind == TokenKind::Whitespace {
            continue;
        }
        let mut line = format!("{:?} {} {:?}", token.kind, token.span, token.text(&source));
        if let Some(error) = token.error {
            line.push_str(" ; ");
            line.push_str(error.message());
        }
        writeln!(stdout, "{line}")
            .map_err(|e| Error::Io { source: e })
            .map_err(miette::Report::new)
            .wrap_err("write tokens")?;
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(parser: &Parser, paths: &[PathBuf]) -> miette::Result<ExitCode> {
    let files = collect_files(paths)?;
    let mut failed = 0;
    // Error counts per diagnostic code, in order of first appearance.
    let mut counts: IndexMap<&'static str, usize> = IndexMap::new();

    for path in &files {
        let name = path.display().to_string();
        let source = fs::read_to_string(path)
            .map_err(|e| Error::Io { source: e })
            .map_err(miette::Report::new)
            .wrap_err_with(|| format!("read {name}"))?;
        let tree = match parser.parse_named(&name, &source) {
            Ok(tree) => tree,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e).wrap_err(name));
                failed += 1;
                *counts.entry("avdl::input_too_large").or_default() += 1;
                continue;
            }
        };
        tracing::debug!(file = %name, errors = tree.errors().len(), "checked");
        if tree.has_errors() {
            failed += 1;
            for error in tree.errors() {
                *counts.entry(error.kind.code()).or_default() += 1;
            }
            report(&tree);
        }
    }

    let breakdown: Vec<String> = counts
        .iter()
        .map(|(code, count)| format!("{code}: {count}"))
        .collect();
    if breakdown.is_empty() {
        eprintln!("checked {} file(s): no errors", files.len());
    } else {
        eprintln!(
            "checked {} file(s): {failed} with errors ({})",
            files.len(),
            breakdown.join(", ")
        );
    }
    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_fmt(parser: &Parser, input: Option<&str>) -> miette::Result<ExitCode> {
    let (name, source) = read_input(input)?;
    let tree = parse_source(parser, &name, &source)?;
    let program = tree.program().map_err(miette::Report::new)?;
    print!("{}", render_program(&program));
    Ok(ExitCode::SUCCESS)
}

// ==============================================================================
// Helpers
// ==============================================================================

/// Read a named file, or stdin for `None` and `-`. Returns the name to use in
/// diagnostics alongside the text.
fn read_input(input: Option<&str>) -> miette::Result<(String, String)> {
    match input {
        None | Some("-") => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| Error::Io { source: e })
                .map_err(miette::Report::new)
                .wrap_err("read IDL from stdin")?;
            Ok(("<stdin>".to_string(), source))
        }
        Some(path) => {
            let source = fs::read_to_string(path)
                .map_err(|e| Error::Io { source: e })
                .map_err(miette::Report::new)
                .wrap_err_with(|| format!("read {path}"))?;
            Ok((path.to_string(), source))
        }
    }
}

fn parse_source(parser: &Parser, name: &str, source: &str) -> miette::Result<SyntaxTree> {
    parser
        .parse_named(name, source)
        .map_err(miette::Report::new)
        .wrap_err_with(|| format!("parse {name}"))
}

/// Every `.avdl` file under the given paths, in a stable order. Paths that
/// name files are taken as-is whatever their extension.
fn collect_files(paths: &[PathBuf]) -> miette::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry
                .map_err(|e| Error::Io { source: e.into() })
                .map_err(miette::Report::new)
                .wrap_err_with(|| format!("walk {}", path.display()))?;
            if entry.file_type().is_file() && is_avdl(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn is_avdl(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "avdl")
}

fn report(tree: &SyntaxTree) {
    for diagnostic in tree.diagnostics() {
        eprintln!("{:?}", miette::Report::new(diagnostic));
    }
}
