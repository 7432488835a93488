use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rlox as lox;

use lox::ast::Stmt;
use lox::ast_printer::AstPrinter;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable debug logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Emit the token stream as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file and prints each statement's AST
    Parse { filename: PathBuf },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program, or starts a REPL
    Run { filename: Option<PathBuf> },
}

/// Memory-maps a source file.  The mapping must outlive every token, so
/// callers keep it alive for the whole pipeline.
fn map_file(filename: &PathBuf) -> Result<Mmap> {
    info!("Mapping file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    let mmap =
        unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", mmap.len(), filename);

    Ok(mmap)
}

/// Validates the mapped bytes as UTF-8 exactly once; the scanner relies on
/// this for its zero-copy lexeme slicing.
fn source_bytes(mmap: &Mmap) -> Result<&[u8]> {
    let text = std::str::from_utf8(mmap).context("Source file is not valid UTF-8")?;

    Ok(text.as_bytes())
}

/// Scans the whole buffer, printing every lexical error.  Returns the token
/// list, or `None` if any error was reported.
fn scan_all<'a>(src: &'a [u8]) -> Option<Vec<Token<'a>>> {
    let mut tokens: Vec<Token<'a>> = Vec::new();
    let mut had_error = false;

    for result in Scanner::new(src) {
        match result {
            Ok(token) => tokens.push(token),

            Err(e) => {
                had_error = true;

                debug!("Lex error: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    if had_error {
        None
    } else {
        Some(tokens)
    }
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Log lines carry the module path and source line; the module prefix is
    // stripped down to the crate-local name.
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rlox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors.
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            info!("Running Tokenize subcommand");

            let mmap = map_file(&filename)?;
            let src = source_bytes(&mmap)?;

            let Some(tokens) = scan_all(src) else {
                debug!("Tokenization failed, exiting with code 65");

                std::process::exit(65);
            };

            if json {
                let dump = serde_json::to_string_pretty(&tokens)
                    .context("Failed to serialize tokens")?;

                println!("{}", dump);
            } else {
                for token in &tokens {
                    println!("{}", token);
                }
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename } => {
            info!("Running Parse subcommand");

            let mmap = map_file(&filename)?;
            let src = source_bytes(&mmap)?;

            let Some(tokens) = scan_all(src) else {
                std::process::exit(65);
            };

            let mut parser = Parser::new(&tokens);

            match parser.parse() {
                Ok(statements) => {
                    info!("Parsed {} statements", statements.len());

                    let printer = AstPrinter;

                    for stmt in &statements {
                        println!("{}", printer.print_stmt(stmt));
                    }
                }

                Err(e) => {
                    debug!("Parse error: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            }
        }

        Commands::Evaluate { filename } => {
            info!("Running Evaluate subcommand");

            let mmap = map_file(&filename)?;
            let src = source_bytes(&mmap)?;

            let Some(tokens) = scan_all(src) else {
                std::process::exit(65);
            };

            let mut parser = Parser::new(&tokens);

            let expr = match parser.parse_expression() {
                Ok(expr) => expr,

                Err(e) => {
                    debug!("Parse error: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            };

            // Run the resolver over the expression so locals (if any) and
            // static rules are checked the same way `run` would.
            let statements = vec![Stmt::Expression(expr.clone())];

            let mut interpreter = Interpreter::new();

            match Resolver::new().resolve(&statements) {
                Ok(table) => interpreter.note_locals(table),

                Err(errors) => {
                    for e in errors {
                        eprintln!("{}", e);
                    }

                    std::process::exit(65);
                }
            }

            match interpreter.evaluate(&expr) {
                Ok(value) => {
                    debug!("Evaluated to: {}", value);
                    println!("{}", value);
                }

                Err(e) => {
                    debug!("Evaluation error: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(70);
                }
            }
        }

        Commands::Run { filename } => match filename {
            Some(filename) => run_file(&filename)?,
            None => run_prompt()?,
        },
    }

    Ok(())
}

fn run_file(filename: &PathBuf) -> Result<()> {
    info!("Running Run subcommand on {:?}", filename);

    let mmap = map_file(filename)?;
    let src = source_bytes(&mmap)?;

    let Some(tokens) = scan_all(src) else {
        std::process::exit(65);
    };

    let mut parser = Parser::new(&tokens);

    let statements: Vec<Stmt> = match parser.parse() {
        Ok(statements) => statements,

        Err(e) => {
            debug!("Parse error: {}", e);
            eprintln!("{}", e);
            std::process::exit(65);
        }
    };

    info!("Parsed {} statements", statements.len());

    let mut interpreter = Interpreter::new();

    // All resolution errors are reported before anything executes.
    match Resolver::new().resolve(&statements) {
        Ok(table) => interpreter.note_locals(table),

        Err(errors) => {
            for e in errors {
                eprintln!("{}", e);
            }

            std::process::exit(65);
        }
    }

    match interpreter.interpret(&statements) {
        Ok(()) => {
            info!("Program executed successfully");
        }

        Err(e) => {
            debug!("Runtime error: {}", e);
            eprintln!("{}", e);
            std::process::exit(70);
        }
    }

    Ok(())
}

/// Interactive prompt.  Globals, the resolution table and the node-id
/// counter persist across lines; an empty line or EOF ends the session.
///
/// Each line's source text and token buffer are leaked: a closure defined on
/// one line may reference its tokens for the rest of the process, and the
/// per-line buffers are tiny.
fn run_prompt() -> Result<()> {
    info!("Starting REPL");

    let mut interpreter: Interpreter<'static> = Interpreter::new();
    let mut next_id: u32 = 0;

    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();

        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let line = line.trim_end_matches(['\n', '\r']);

        if line.is_empty() {
            break;
        }

        let source: &'static str = Box::leak(line.to_owned().into_boxed_str());

        let Some(tokens) = scan_all(source.as_bytes()) else {
            continue;
        };

        let tokens: &'static [Token<'static>] = Box::leak(tokens.into_boxed_slice());

        let mut parser = Parser::with_first_node_id(tokens, next_id);

        let statements = match parser.parse() {
            Ok(statements) => statements,

            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        next_id = parser.next_node_id();

        match Resolver::new().resolve(&statements) {
            Ok(table) => interpreter.note_locals(table),

            Err(errors) => {
                for e in errors {
                    eprintln!("{}", e);
                }

                continue;
            }
        }

        // Errors do not end the session; the next prompt still has every
        // binding defined so far.
        if let Err(e) = interpreter.interpret(&statements) {
            eprintln!("{}", e);
        }
    }

    Ok(())
}
