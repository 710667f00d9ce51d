use crate::lexer::{Position, TokenKind};

/// Grammar violations. The first one aborts the compilation unit.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	#[error("{position}: expected {expected}, found {found}")]
	UnexpectedToken { position: Position, expected: String, found: String },
	#[error("{position}: expected {expected}, found {found}")]
	UnexpectedTokenType { position: Position, expected: TokenKind, found: String },
	#[error("{position}: expected {expected}, found end of input")]
	UnexpectedEndOfInput { position: Position, expected: String },
	#[error("{position}: `do` needs a subroutine call, found `{found}`")]
	MalformedCallTarget { position: Position, found: String },
	#[error("{position}: subroutine `{subroutine}` must end with a return statement")]
	MissingReturn { position: Position, subroutine: String },
	#[error("{position}: class `{found}` must be named `{expected}`")]
	ClassNameMismatch { position: Position, expected: String, found: String },
	#[error("{position}: unexpected {found} after the end of the class")]
	TrailingInput { position: Position, found: String },
	#[error("{position}: nesting deeper than {limit} levels")]
	NestingTooDeep { position: Position, limit: usize },
}

impl ParseError {
	pub fn position(&self) -> Position {
		match self {
			ParseError::UnexpectedToken { position, .. }
			| ParseError::UnexpectedTokenType { position, .. }
			| ParseError::UnexpectedEndOfInput { position, .. }
			| ParseError::MalformedCallTarget { position, .. }
			| ParseError::MissingReturn { position, .. }
			| ParseError::ClassNameMismatch { position, .. }
			| ParseError::TrailingInput { position, .. }
			| ParseError::NestingTooDeep { position, .. } => *position,
		}
	}
}
