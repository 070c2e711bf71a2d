use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use rbtrace::errors::{RbError, SyntaxError};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "rbtrace",
    version,
    about = "A small Ruby-like interpreter with script-level backtraces"
)]
struct Cli {
    /// Path to a script to execute
    file: Option<String>,
    /// Evaluate inline source instead of a file
    #[arg(long)]
    eval: Option<String>,
    /// Print compiled bytecode before running
    #[arg(long)]
    bytecode: bool,
    /// Compile without line tables (backtraces show line -1)
    #[arg(long)]
    no_debug_info: bool,
    /// Disable native stack dumps from Backtrace.put_vm
    #[arg(long)]
    no_native_unwind: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (source, filename) = match (cli.eval, cli.file) {
        (Some(code), _) => (code, rbtrace::context::EVAL_FILENAME.to_string()),
        (None, Some(file)) => match fs::read_to_string(&file) {
            Ok(source) => (source, file),
            Err(e) => {
                eprintln!(
                    "{} could not read '{}': {e}",
                    "error:".red().bold(),
                    file.yellow()
                );
                process::exit(1);
            }
        },
        (None, None) => {
            eprintln!(
                "{} no script given (pass a FILE or --eval CODE)",
                "error:".red().bold()
            );
            process::exit(2);
        }
    };

    let mut ctx = rbtrace::Engine::new()
        .with_debug_info(!cli.no_debug_info)
        .with_native_unwind(!cli.no_native_unwind)
        .new_context();

    let irep = match ctx.compile(&source, Some(&filename)) {
        Ok(irep) => irep,
        Err(RbError::Syntax(err)) => {
            eprintln!("{}", format_syntax_error(&source, Path::new(&filename), &err));
            process::exit(1);
        }
        Err(err) => {
            eprintln!("{} {err:?}", "error:".red().bold());
            process::exit(1);
        }
    };

    if cli.bytecode {
        println!("{}", "Bytecode".bright_blue().bold());
        print!("{}", irep.disassemble(ctx.vm().symbols()));
    }

    if let Err(err) = ctx.execute(irep) {
        eprintln!("{} {err}", "runtime error:".red().bold());
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn format_syntax_error(source: &str, source_path: &Path, err: &SyntaxError) -> String {
    let map = rbtrace::diagnostics::source_map::SourceMap::from_source(source);
    let pos = map.byte_to_pos(err.span.offset());
    format!(
        "{} at {}:{}:{}: {}",
        "syntax error".red().bold(),
        source_path.display().to_string().cyan(),
        pos.line,
        pos.col,
        err.message.bright_white()
    )
}
