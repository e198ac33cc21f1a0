mod error;
mod test_runner;

use std::path::Path;
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::{LevelFilter, debug, info};

use a2l::Program;
use a2l::block::Block;
use decoder::Document;

use crate::error::CliError;

const SUBCOMMANDS: &[&str] = &["show", "test", "help"];

/// Options that take a value, so the value is not mistaken for a file name.
const VALUE_OPTIONS: &[&str] = &["--log-level"];

#[derive(Parser, Debug)]
#[command(name = "a2l", version, about = "A2L calibration description decoder")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode an A2L file and print a summary
    Show(ShowArgs),

    /// Run .test.a2l fixture files
    Test(TestArgs),
}

#[derive(clap::Args, Debug)]
struct ShowArgs {
    /// A2L file to decode
    file: String,

    /// Print the decoded document as JSON
    #[arg(long)]
    json: bool,

    /// Print the block tree instead of the decoded entities
    #[arg(long)]
    tree: bool,

    /// Only check the block structure (exit 1 if any warning is reported)
    #[arg(long)]
    check: bool,
}

#[derive(clap::Args, Debug)]
struct TestArgs {
    /// Path to a .test.a2l file or a directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let args = with_default_subcommand(std::env::args().collect());
    let cli = Cli::parse_from(&args);

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!(cli:?; "Parsed arguments");

    let exit_code = match cli.command {
        Command::Show(show_args) => match do_show(&show_args, cli.no_color) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("error: {}", err);
                1
            }
        },
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                0
            } else {
                test_runner::run_tests(path, cli.no_color, &test_args.category)
            }
        }
    };

    process::exit(exit_code);
}

/// `a2l file.a2l` behaves like `a2l show file.a2l`.
fn with_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let mut skip_value = false;
    let mut first_positional = None;
    for (i, arg) in args.iter().enumerate().skip(1) {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg.starts_with('-') {
            skip_value = VALUE_OPTIONS.contains(&arg.as_str());
            continue;
        }
        first_positional = Some(i);
        break;
    }

    if let Some(pos) = first_positional
        && !SUBCOMMANDS.contains(&args[pos].as_str())
    {
        args.insert(pos, "show".to_string());
    }
    args
}

fn do_show(args: &ShowArgs, no_color: bool) -> Result<i32, CliError> {
    let source = std::fs::read_to_string(&args.file).map_err(|source| CliError::Read {
        path: args.file.clone(),
        source,
    })?;

    // Warning spans index into the comment-stripped text, so that is the
    // text registered for rendering. SimpleFiles hands out ids from zero.
    let program = a2l::parser::Parser::new(source, 0).parse();
    let mut files = SimpleFiles::new();
    files.add(args.file.clone(), program.source.clone());

    emit_warnings(&program, &files, no_color);

    if args.check {
        return Ok(if program.warnings.is_empty() {
            eprintln!("ok: {} parsed successfully", args.file);
            0
        } else {
            eprintln!(
                "{}: {} structural warning(s)",
                args.file,
                program.warnings.len()
            );
            1
        });
    }

    if args.tree {
        print_tree(&program.root.children, 0);
        return Ok(0);
    }

    let document = decoder::decode_program(&program);
    info!(file = args.file.as_str(); "Decoded document");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print_summary(&args.file, &document);
    }
    Ok(0)
}

fn emit_warnings(program: &Program, files: &SimpleFiles<String, String>, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for warning in &program.warnings {
        let diagnostic = warning.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }
}

fn print_tree(blocks: &[Block], indent: usize) {
    for block in blocks {
        let pad = "  ".repeat(indent);
        let lines = match block.content_lines.len() {
            0 => String::new(),
            n => format!(" ({} lines)", n),
        };
        if block.arguments.is_empty() {
            println!("{}{}{}", pad, block.keyword, lines);
        } else {
            println!("{}{} {}{}", pad, block.keyword, block.arguments.join(" "), lines);
        }
        print_tree(&block.children, indent + 1);
    }
}

fn print_summary(file: &str, document: &Document) {
    println!("{}", file);
    println!(
        "  project: {}",
        document.project_name.as_deref().unwrap_or("(none)")
    );
    println!(
        "  module:  {}",
        document.module_name.as_deref().unwrap_or("(none)")
    );

    if let Some(layer) = &document.protocol_layer {
        let size = |value: Option<i64>| value.map_or("?".to_string(), |v| v.to_string());
        println!(
            "  protocol layer: max_cto={} max_dto={}",
            size(layer.max_cto),
            size(layer.max_dto)
        );
    }
    if let Some(daq) = &document.daq {
        println!(
            "  daq: {} ({} events)",
            daq.mode.as_deref().unwrap_or("?"),
            daq.events.len()
        );
    }
    if let Some(can) = &document.transport {
        let fd = if can.can_fd.is_some() { " + CAN FD" } else { "" };
        match can.baudrate {
            Some(baudrate) => println!("  transport: XCP on CAN{} @ {} baud", fd, baudrate),
            None => println!("  transport: XCP on CAN{}", fd),
        }
    }

    for (label, count) in document.entity_counts() {
        println!("  {:<16} {}", label, count);
    }
}
