use crate::lexer::Position;

/// Errors raised while turning source text into tokens.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
	/// `advance` was called with nothing but trivia left.
	#[error("{position}: unexpected end of input")]
	UnexpectedEndOfInput { position: Position },
	/// A string literal without its closing quote.
	#[error("{position}: unterminated string literal")]
	UnterminatedString { position: Position },
	/// A `/*` without a matching `*/`.
	#[error("{position}: unterminated block comment")]
	UnterminatedComment { position: Position },
	/// A character that cannot start any token.
	#[error("{position}: unknown character '{character}'")]
	UnknownCharacter { position: Position, character: char },
	/// A string literal character outside the 16-bit range.
	#[error("{position}: character {character:?} does not fit in 16 bits")]
	CharacterOutOfRange { position: Position, character: char },
	/// An integer literal above the 16-bit range.
	#[error("{position}: integer constant {literal} is out of range 0..=65535")]
	IntegerOutOfRange { position: Position, literal: String },
}

impl LexError {
	pub fn position(&self) -> Position {
		match self {
			LexError::UnexpectedEndOfInput { position }
			| LexError::UnterminatedString { position }
			| LexError::UnterminatedComment { position }
			| LexError::UnknownCharacter { position, .. }
			| LexError::CharacterOutOfRange { position, .. }
			| LexError::IntegerOutOfRange { position, .. } => *position,
		}
	}
}
