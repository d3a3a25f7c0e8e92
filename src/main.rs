extern crate clap;
extern crate thiserror;

pub mod bytecode;
pub mod compiler;
pub mod encoding;
pub mod interpreter;
pub mod lexer;
pub mod loader;
pub mod parser;

use std::{
    collections::HashSet,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::{Parser, ValueEnum};
use colored::Colorize;
use thiserror::Error;

use crate::{
    bytecode::bytecode::to_bytecode,
    compiler::{Backend, Compiler, ExecutionError},
    encoding::{encode_latin1, UnencodableChar},
    interpreter::{EofPolicy, RuntimeError},
    lexer::{lexer::tokenize, SyntaxError},
    loader::{LoadError, Loader},
    parser::{parser::parse, Program},
};

/// Brainf**k translator: compiles a program once, then runs it over stdin or --input
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The file to operate on, or a dotted module name with --module
    #[arg()]
    file: String,

    /// What to do with it, `run` when nothing is given
    #[arg(value_enum)]
    commands: Vec<Commands>,

    #[arg(short, long, value_enum, default_value_t = Backend::Bytecode)]
    backend: Backend,

    /// What `,` stores once input runs out
    #[arg(short, long, value_enum, default_value_t = EofPolicy::Zero)]
    eof: EofPolicy,

    /// Feed this text (Latin-1) to the program instead of stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Resolve FILE as a module name through the search paths
    #[arg(short, long)]
    module: bool,

    #[arg(short = 'I', long = "search-path", default_value = ".")]
    search_paths: Vec<PathBuf>,

    /// Module file extensions, tried in order
    #[arg(long = "extension", default_values = ["bf", "b"])]
    extensions: Vec<String>,

    /// Print timings for each phase to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Hash, PartialEq, Eq)]
enum Commands {
    /// Output the instruction stream
    Tokens,
    /// Output the ast
    Ast,
    /// Output Bytecode
    Bytecode,
    /// Run the program
    Run,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("couldn't read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("--input {0}")]
    Input(#[from] UnencodableChar),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Runs `f`, reporting how long it took when `verbose`
fn phase<T>(verbose: bool, name: &str, f: impl FnOnce() -> T) -> T {
    if verbose {
        eprintln!("{}", format!("Starting {name}").blue());
    }
    let now = Instant::now();
    let result = f();
    if verbose {
        eprintln!("{} {:.2?}", format!("Finished {name} in").green(), now.elapsed());
    }
    result
}

fn main() -> ExitCode {
    let args = Args::parse();
    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{0:}: {1:}", "Error".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Lexes and parses `text`, printing whichever dumps were asked for
fn front_end(
    text: &str,
    commands: &HashSet<Commands>,
    verbose: bool,
) -> Result<Program, CliError> {
    let tokens = phase(verbose, "lexing", || tokenize(text))?;
    if commands.contains(&Commands::Tokens) {
        println!("{tokens}");
    }

    let program = phase(verbose, "parsing", || parse(&tokens));
    if verbose {
        eprintln!(
            "{} instructions, loops nested {} deep",
            tokens.len(),
            program.depth()
        );
    }
    if commands.contains(&Commands::Ast) {
        print!("{program}");
    }
    if commands.contains(&Commands::Bytecode) {
        for (index, code) in to_bytecode(&program).iter().enumerate() {
            println!("{index:>6}  {code}");
        }
    }
    Ok(program)
}

fn execute(args: Args) -> Result<(), CliError> {
    let mut commands: HashSet<Commands> = HashSet::from_iter(args.commands.iter().cloned());
    if commands.is_empty() {
        commands.insert(Commands::Run);
    }
    let verbose = args.verbose;
    let dumps = commands.iter().any(|command| *command != Commands::Run);

    let compiler = Compiler::new()
        .with_backend(args.backend)
        .with_eof(args.eof);

    let unit = if args.module {
        let loader = args
            .search_paths
            .iter()
            .fold(Loader::new(), |loader, path| loader.with_search_path(path))
            .with_extensions(args.extensions.iter().cloned())
            .with_compiler(compiler);
        let module = phase(verbose, "loading", || loader.load(&args.file))?;
        if verbose {
            eprintln!("Loaded {} from {}", module.name(), module.path().display());
        }
        if dumps {
            front_end(&read_source(module.path())?, &commands, verbose)?;
        }
        module.into_unit()
    } else {
        let path = PathBuf::from(&args.file);
        if verbose {
            eprintln!("Running {}", path.display());
        }
        let program = front_end(&read_source(&path)?, &commands, verbose)?;
        phase(verbose, "code generation", || compiler.compile(program))
    };

    if commands.contains(&Commands::Run) {
        let stdout = io::stdout();
        let mut output = stdout.lock();

        let result = match &args.input {
            Some(text) => {
                let bytes = encode_latin1(text)?;
                let (written, result) = match phase(verbose, "program", || unit.call(&bytes)) {
                    Ok(written) => (written, Ok(())),
                    Err(ExecutionError {
                        source,
                        output: written,
                    }) => (written, Err(source)),
                };
                output.write_all(&written)?;
                result
            }
            None => {
                let stdin = io::stdin();
                phase(verbose, "program", || unit.run(&mut stdin.lock(), &mut output))
            }
        };
        // anything written before a fault still goes out
        output.flush()?;
        result?;
    }

    Ok(())
}
