//! tyir compiler
//!
//! Type checks a resolved, desugared IR crate and lowers it to C.

mod backend;
mod compile;
mod driver;
mod hir;
mod resolve;
mod typeck;
mod types;
mod utils;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};

use driver::Session;

/// tyir compiler
#[derive(Parser, Debug)]
#[command(name = "tyirc")]
#[command(version = "0.1.0")]
#[command(about = "Type inference and C lowering for a resolved IR crate")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input compilation unit (.json)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check and lower a compilation unit
    Build {
        /// Input compilation unit
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compile the generated C to an object file
        #[arg(long)]
        object: bool,

        /// Target triple recorded in the generated source
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
    },
    /// Type check a compilation unit
    Check {
        /// Input compilation unit
        input: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Build {
            input,
            output,
            object,
            target,
        }) => build_file(input, output.clone(), *object, target),
        Some(Commands::Check { input, json }) => check_file(input, *json),
        Some(Commands::Version) => {
            println!("tyirc 0.1.0");
            Ok(())
        }
        None => match &cli.input {
            Some(input) => build_file(input, cli.output.clone(), false, "x86_64-unknown-linux-gnu"),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: tyirc <FILE> or tyirc build <FILE>");
                process::exit(1);
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Load and type check `input`, printing any diagnostics.
/// Returns the session when the crate is free of errors.
fn load_and_check(input: &Path, json: bool) -> anyhow::Result<Option<Session>> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let mut session = Session::from_json(&text)?;

    let outcome = session.check();
    if json {
        println!("{}", session.diagnostics.to_json());
    } else {
        for diag in session.diagnostics.iter() {
            eprintln!("{}: {}", diag.location, diag.message);
        }
    }

    match outcome {
        Ok(()) if !session.diagnostics.has_errors() => Ok(Some(session)),
        Ok(()) => Ok(None),
        // fatal errors were already printed with the diagnostics
        Err(e) if e.location().is_some() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn check_file(input: &Path, json: bool) -> anyhow::Result<()> {
    match load_and_check(input, json)? {
        Some(_) => {
            if !json {
                println!("No errors found");
            }
            Ok(())
        }
        None => process::exit(1),
    }
}

fn build_file(
    input: &Path,
    output: Option<PathBuf>,
    object: bool,
    target: &str,
) -> anyhow::Result<()> {
    let Some(session) = load_and_check(input, false)? else {
        process::exit(1);
    };

    let backend = session.lower_to_c(target)?;
    if object {
        let obj_path = output.unwrap_or_else(|| input.with_extension("o"));
        backend.compile_to_object(&obj_path)?;
        println!("Output: {}", obj_path.display());
        return Ok(());
    }

    let c_path = output.unwrap_or_else(|| input.with_extension("c"));
    if c_path == input {
        bail!("refusing to overwrite input {}", input.display());
    }
    fs::write(&c_path, backend.source())
        .with_context(|| format!("failed to write {}", c_path.display()))?;
    println!("Output: {}", c_path.display());
    Ok(())
}
