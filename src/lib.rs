//! # Jack to VM code
//!
//! Source code: `let sum = sum + a[i];`
//!
//! ## Lexing
//!
//! The [`lexer`] turns characters into tokens on demand. Whitespace and
//! comments are dropped, so the tokens are
//! `["let", "sum", "=", "sum", "+", "a", "[", "i", "]", ";"]`.
//!
//! ## Parsing
//!
//! The [`parser`] is a recursive descent over declarations and statements. It
//! fills the [`symbol_table`] as declarations go by and writes statement
//! scaffolding (labels, jumps, stores) straight into the output. Only
//! expressions get a tree:
//!
//! ``` markdown
//! + (BinaryOp)
//! ├── sum (VariableRef)
//! └── a[i] (ArrayAccess)
//!     └── i (VariableRef)
//! ```
//!
//! ## Code generation
//!
//! The [`codegen`] walks each tree against the live symbol table. Variables
//! become segment accesses, calls are resolved to methods, functions or
//! constructors, and everything lands in one [`InstructionStream`] per class:
//!
//! ``` text
//! push local 0
//! push local 2
//! push local 1
//! add
//! pop pointer 1
//! push that 0
//! add
//! pop local 0
//! ```

pub mod cli;
pub mod codegen;
mod driver;
mod error;
pub mod lexer;
pub mod parser;
pub mod symbol_table;

pub use codegen::vm::InstructionStream;
pub use driver::Driver;
pub use error::{CompileError, DriverError, lexer::LexError, parser::ParseError, semantic::SemanticError};

/// Compile the source of one class. `class_name` must match the class the
/// source declares.
pub fn compile_unit(source: &str, class_name: &str) -> Result<InstructionStream, CompileError> {
	parser::Parser::new(source)?.compile_class(class_name)
}
