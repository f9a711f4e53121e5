//! Mint compiler CLI.
//!
//! Command-line interface for compiling .mint programs to executables,
//! emitting their assembly, or interpreting them directly.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process;

use mintc::{CompilerConfig, Value};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "mintc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mint compiler - compile .mint programs to executables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .mint file to an executable
    Build {
        /// Input .mint source file
        input: PathBuf,

        /// Output executable path (defaults to input filename without .mint extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the intermediate assembly file (.s)
        #[arg(long)]
        keep_asm: bool,

        /// Use a custom C runtime source instead of the embedded one
        #[arg(long, value_name = "PATH")]
        runtime: Option<PathBuf>,

        /// Path to a mint.toml (defaults to one next to the input, if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Emit x86-64 assembly for a .mint file
    Asm {
        /// Input .mint source file
        input: PathBuf,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Typecheck and interpret a .mint file directly
    Run {
        /// Input .mint source file
        input: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            keep_asm,
            runtime,
            config,
        } => {
            let output = output.unwrap_or_else(|| {
                // Default: input filename without the .mint extension.
                let stem = input.file_stem().unwrap_or_default();
                PathBuf::from(stem)
            });
            run_build(&input, &output, keep_asm, runtime, config.as_deref());
        }
        Commands::Asm { input, output } => {
            run_asm(&input, output.as_deref());
        }
        Commands::Run { input } => {
            run_interpret(&input);
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "mintc", &mut io::stdout());
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Explicit --config wins; otherwise a mint.toml next to the input is
/// picked up when present.
fn load_config(input: &Path, config_path: Option<&Path>) -> Result<CompilerConfig, String> {
    if let Some(path) = config_path {
        return CompilerConfig::load(path);
    }
    let implicit = input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("mint.toml");
    if implicit.is_file() {
        return CompilerConfig::load(&implicit);
    }
    Ok(CompilerConfig::default())
}

fn run_build(
    input: &Path,
    output: &Path,
    keep_asm: bool,
    runtime: Option<PathBuf>,
    config_path: Option<&Path>,
) {
    let mut config = match load_config(input, config_path) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    if keep_asm {
        config.keep_asm = true;
    }
    if let Some(runtime) = runtime {
        config.runtime = Some(runtime);
    }

    if let Err(e) = mintc::compile_file_with_config(input, output, &config) {
        fail(&e);
    }
}

fn run_asm(input: &Path, output: Option<&Path>) {
    let source = match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(e) => fail(&format!(
            "Failed to read source file '{}': {}",
            input.display(),
            e
        )),
    };

    let asm = match mintc::compile_to_assembly(&source) {
        Ok(asm) => asm,
        Err(e) => fail(&e),
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, asm) {
                fail(&format!("Failed to write '{}': {}", path.display(), e));
            }
        }
        None => {
            let mut stdout = io::stdout();
            if stdout.write_all(asm.as_bytes()).is_err() {
                process::exit(1);
            }
        }
    }
}

fn run_interpret(input: &Path) {
    let source = match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(e) => fail(&format!(
            "Failed to read source file '{}': {}",
            input.display(),
            e
        )),
    };

    let stdin = io::stdin();
    match mintc::run_source(&source, stdin.lock(), io::stdout()) {
        // Match the compiled behavior: an Int or Bool result is printed.
        Ok(Value::Int(i)) => println!("{}", i),
        Ok(Value::Bool(b)) => println!("{}", if b { "true" } else { "false" }),
        Ok(_) => {}
        Err(e) => fail(&e),
    }
}
