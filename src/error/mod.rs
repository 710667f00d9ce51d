pub mod lexer;
pub mod parser;
pub mod semantic;

use std::path::PathBuf;

use crate::lexer::Position;

/// CompileError is the error of one compilation unit. Any variant means the
/// unit's output must be discarded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
	#[error(transparent)]
	Lex(#[from] lexer::LexError),
	#[error(transparent)]
	Parse(#[from] parser::ParseError),
	#[error(transparent)]
	Semantic(#[from] semantic::SemanticError),
}

impl CompileError {
	pub fn position(&self) -> Position {
		match self {
			CompileError::Lex(e) => e.position(),
			CompileError::Parse(e) => e.position(),
			CompileError::Semantic(e) => e.position(),
		}
	}
}

/// Errors of the file-level driver.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
	/// I/O and other failures outside the compiler proper
	#[error("{0:#}")]
	InternalError(#[from] anyhow::Error),
	/// A unit failed to compile
	#[error("{}: {source}", .path.display())]
	Compile {
		path:   PathBuf,
		#[source]
		source: CompileError,
	},
	/// The input is neither a `.jack` file nor a directory
	#[error("{} is neither a .jack file nor a directory", .0.display())]
	InvalidInput(PathBuf),
	/// A directory without any `.jack` file
	#[error("no .jack files in {}", .0.display())]
	NoSources(PathBuf),
}
