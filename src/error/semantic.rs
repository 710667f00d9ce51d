use crate::lexer::Position;

/// Name resolution failures, found while generating code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
	#[error("{position}: undeclared identifier `{name}`")]
	UndeclaredIdentifier { position: Position, name: String },
}

impl SemanticError {
	pub fn position(&self) -> Position {
		match self {
			SemanticError::UndeclaredIdentifier { position, .. } => *position,
		}
	}
}
