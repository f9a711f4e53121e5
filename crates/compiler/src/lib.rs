//! Mint compiler library.
//!
//! Compiles Mint source text to x86-64 assembly and executables, and
//! interprets it directly. The pipeline is tokenize → parse → typecheck →
//! IR → assembly; each stage is a pure function of its input, and a
//! failing stage aborts the compile with its error.

pub mod asm_generator;
pub mod ast;
pub mod config;
pub mod interpreter;
pub mod ir;
pub mod ir_generator;
pub mod parser;
pub mod symtab;
pub mod tokenizer;
pub mod typechecker;
pub mod types;

pub use asm_generator::generate_assembly;
pub use ast::{ExprKind, Expression, LiteralValue};
pub use config::CompilerConfig;
pub use interpreter::{Interpreter, Value, setup_global_env};
pub use ir::{IRVar, Instruction, Label};
pub use ir_generator::{RESERVED_NAMES, generate_ir};
pub use parser::parse;
pub use symtab::SymTab;
pub use tokenizer::{Location, Token, TokenKind, tokenize};
pub use typechecker::{setup_type_env, typecheck};
pub use types::Type;

use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use tracing::debug;

/// Embedded C runtime implementing print_int/print_bool/read_int.
static RUNTIME_C: &str = include_str!("runtime.c");

/// Cache for the C compiler availability check; it only runs once per
/// process.
static CC_CHECKED: OnceLock<Result<(), String>> = OnceLock::new();

fn check_cc(cc: &str) -> Result<(), String> {
    CC_CHECKED
        .get_or_init(|| {
            let output = Command::new(cc).arg("--version").output().map_err(|e| {
                format!(
                    "Failed to run {}: {}. A C compiler is needed to assemble and link \
                     the generated code.",
                    cc, e
                )
            })?;
            if !output.status.success() {
                return Err(format!(
                    "{} --version failed with exit code {:?}",
                    cc,
                    output.status.code()
                ));
            }
            Ok(())
        })
        .clone()
}

/// Compile Mint source text to an x86-64 assembly listing.
pub fn compile_to_assembly(source: &str) -> Result<String, String> {
    let tokens = tokenize(source);
    debug!(tokens = tokens.len(), "tokenized");

    let mut expr = parse(&tokens)?;

    let mut env = setup_type_env();
    let program_type = typecheck(&mut expr, &mut env)?;
    debug!(%program_type, "typechecked");

    let instructions = generate_ir(&expr)?;
    debug!(instructions = instructions.len(), "lowered to IR");

    Ok(generate_assembly(&instructions))
}

/// Compile a Mint source file to an executable with default settings.
pub fn compile_file(input: &Path, output: &Path) -> Result<(), String> {
    compile_file_with_config(input, output, &CompilerConfig::default())
}

/// Compile a Mint source file to an executable: write the assembly next
/// to the output, materialize the embedded C runtime (unless the config
/// substitutes one), and have the system C compiler assemble and link.
pub fn compile_file_with_config(
    input: &Path,
    output: &Path,
    config: &CompilerConfig,
) -> Result<(), String> {
    let source = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read source file '{}': {}", input.display(), e))?;

    let asm = compile_to_assembly(&source)?;

    let asm_path = output.with_extension("s");
    fs::write(&asm_path, &asm)
        .map_err(|e| format!("Failed to write assembly file: {}", e))?;

    check_cc(&config.cc)?;

    let embedded_runtime = std::env::temp_dir().join("mint_runtime.c");
    let runtime_path = match &config.runtime {
        Some(path) => path.clone(),
        None => {
            fs::write(&embedded_runtime, RUNTIME_C)
                .map_err(|e| format!("Failed to write runtime: {}", e))?;
            embedded_runtime.clone()
        }
    };

    let mut cc = Command::new(&config.cc);
    cc.arg(&asm_path).arg(&runtime_path).arg("-o").arg(output);
    for lib in &config.libraries {
        cc.arg("-l").arg(lib);
    }
    debug!(command = ?cc, "assembling and linking");

    let result = cc
        .output()
        .map_err(|e| format!("Failed to run {}: {}", config.cc, e));

    if config.runtime.is_none() {
        fs::remove_file(&embedded_runtime).ok();
    }
    let result = result?;

    if !result.status.success() {
        return Err(format!(
            "{} failed:\n{}",
            config.cc,
            String::from_utf8_lossy(&result.stderr)
        ));
    }

    if !config.keep_asm {
        fs::remove_file(&asm_path).ok();
    }

    Ok(())
}

/// Parse, typecheck and interpret Mint source, wiring the interpreter to
/// the given reader and writer. Returns the program's final value.
pub fn run_source<R: BufRead, W: Write>(
    source: &str,
    input: R,
    output: W,
) -> Result<Value, String> {
    let tokens = tokenize(source);
    let mut expr = parse(&tokens)?;

    let mut type_env = setup_type_env();
    typecheck(&mut expr, &mut type_env)?;

    let mut env = setup_global_env();
    Interpreter::new(input, output).interpret(&expr, &mut env)
}
