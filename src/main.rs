use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::error::{RoxError, RunError};
use rox::interpreter::Interpreter;
use rox::parser::Parser;
use rox::scanner::{scan_tokens, Scanner};

/// Exit code for malformed input (lex, parse or resolve errors).
const EXIT_DATA_ERR: i32 = 65;

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable debug logging to a file
    #[arg(long, global = true)]
    log: bool,

    /// Log file used with --log
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints its syntax tree
    Parse { filename: PathBuf },

    /// Runs a file as a Rox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt
    Repl,
}

/// Reads a source file, which must be UTF-8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    let source = String::from_utf8(buf)
        .map_err(RoxError::from)
        .context(format!("{:?} is not valid UTF-8", filename))?;

    Ok(source)
}

fn init_logger(path: &Path) -> Result<()> {
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // RUST_LOG overrides below
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to {:?}", path);

    Ok(())
}

fn report(error: &RunError) {
    match error {
        RunError::Static(errors) => {
            for e in errors {
                eprintln!("{}", e);
            }
        }
        RunError::Runtime(e) => eprintln!("{}", e.report()),
    }
}

fn tokenize(source: &str, json: bool) -> Result<()> {
    let mut ok = true;

    for token in Scanner::new(source) {
        match token {
            Ok(token) if json => println!("{}", serde_json::to_string(&token)?),
            Ok(token) => println!("{}", token),
            Err(e) => {
                ok = false;
                eprintln!("{}", e);
            }
        }
    }

    if !ok {
        debug!("Tokenization failed, exiting with code {}", EXIT_DATA_ERR);
        process::exit(EXIT_DATA_ERR);
    }

    Ok(())
}

fn parse(source: &str) {
    let (tokens, mut errors) = scan_tokens(source);

    match Parser::new(&tokens).parse() {
        Ok(statements) if errors.is_empty() => {
            for stmt in &statements {
                println!("{}", AstPrinter::print_stmt(stmt));
            }
        }
        Ok(_) => {}
        Err(parse_errors) => errors.extend(parse_errors),
    }

    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{}", e);
        }
        process::exit(EXIT_DATA_ERR);
    }
}

fn run_file(source: &str) {
    let mut interpreter = Interpreter::new();

    if let Err(e) = rox::run(source, &mut interpreter) {
        debug!("Run failed: {:?}", e);
        report(&e);
        process::exit(e.exit_code());
    }

    info!("Program executed successfully");
}

/// Each line runs against the same interpreter; errors are reported and the
/// session continues.
fn repl() -> Result<()> {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        if let Err(e) = rox::run(&line, &mut interpreter) {
            report(&e);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger(&args.log_file)?;
    } else {
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => tokenize(&read_file(&filename)?, json)?,

        Commands::Parse { filename } => parse(&read_file(&filename)?),

        Commands::Run { filename } => run_file(&read_file(&filename)?),

        Commands::Repl => repl()?,
    }

    Ok(())
}
