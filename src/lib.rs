//! `pystack` library crate.
//!
//! High-level layout:
//! - frontend: `lexer` + `parser` produce the AST (`parser::ast`)
//! - `compiler` lowers the AST into a serializable `bytecode::CodeObject`
//! - `vm` executes code objects against the shared `runtime` value model
//!
//! The pipeline is one-directional: source text → tokens → AST → code
//! object → result value. Drivers wire `compile`, the code object's
//! `serialize`/`deserialize`, and `VM::run` together.

pub mod builtins;
pub mod bytecode;
pub mod compiler;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod token;
pub mod vm;

pub use parser::ast;

use thiserror::Error;

pub use bytecode::CodeObject;
pub use bytecode::serialize::FormatError;
pub use compiler::CompileError;
pub use parser::ParseError;
pub use runtime::{RuntimeError, Value};
pub use vm::VM;

/// Frontend failure: either the parser rejected the token stream or the
/// compiler rejected the AST.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Compiles source text into an executable, serializable code object.
pub fn compile(source: &str) -> Result<CodeObject, Error> {
    let tokens = lexer::tokenize(source);
    let module = parser::parse_tokens(tokens)?;
    Ok(compiler::compile(&module)?)
}
