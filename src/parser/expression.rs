//! Expression parse trees and the precedence-climbing parser that builds them.
//!
//! |Level|Operators|Associates
//! --|--|--
//! And|&|Left
//! Or|\||Left
//! Comparison|= < >|Left
//! Term|+ -|Left
//! Factor|* /|Left
//! Unary|- ~|Right
//!
//! ``` BNF
//! expression     → and ;
//! and            → or ( "&" or )* ;
//! or             → comparison ( "|" comparison )* ;
//! comparison     → term ( ( "=" | "<" | ">" ) term )* ;
//! term           → factor ( ( "+" | "-" ) factor )* ;
//! factor         → unary ( ( "*" | "/" ) unary )* ;
//! unary          → ( "-" | "~" ) unary | primary ;
//! primary        → INTEGER | STRING | "true" | "false" | "null" | "this"
//!                | IDENTIFIER | IDENTIFIER "[" expression "]" | call
//!                | "(" expression ")" ;
//! call           → ( ( IDENTIFIER | "this" ) "." )? IDENTIFIER "(" arguments? ")" ;
//! arguments      → expression ( "," expression )* ;
//! ```
//!
//! Every grouping, operand and link of an operator chain adds a level of
//! nesting, so both this parser and the tree walker stay within
//! [`MAX_NESTING`](super::MAX_NESTING) frames.
//!
//! Building the tree emits nothing. Whether `a` in `a.b()` is a variable or a
//! class is left to the code generator, which sees the symbol table.

use std::fmt;

use super::{Parser, unexpected};
use crate::{CompileError, codegen::vm::Command, lexer::{Keyword, Position, Symbol, TokenType}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
	Add,
	Sub,
	Mul,
	Div,
	And,
	Or,
	Lt,
	Gt,
	Eq,
}

impl BinaryOperator {
	fn from_symbol(symbol: Symbol) -> Option<Self> {
		Some(match symbol {
			Symbol::Plus => BinaryOperator::Add,
			Symbol::Minus => BinaryOperator::Sub,
			Symbol::Star => BinaryOperator::Mul,
			Symbol::Slash => BinaryOperator::Div,
			Symbol::Ampersand => BinaryOperator::And,
			Symbol::Pipe => BinaryOperator::Or,
			Symbol::Less => BinaryOperator::Lt,
			Symbol::Greater => BinaryOperator::Gt,
			Symbol::Equal => BinaryOperator::Eq,
			_ => return None,
		})
	}

	/// The native VM command, if the operator has one. `*` and `/` are
	/// library calls instead.
	pub fn command(self) -> Option<Command> {
		Some(match self {
			BinaryOperator::Add => Command::Add,
			BinaryOperator::Sub => Command::Sub,
			BinaryOperator::And => Command::And,
			BinaryOperator::Or => Command::Or,
			BinaryOperator::Lt => Command::Lt,
			BinaryOperator::Gt => Command::Gt,
			BinaryOperator::Eq => Command::Eq,
			BinaryOperator::Mul | BinaryOperator::Div => return None,
		})
	}

	fn symbol(self) -> char {
		match self {
			BinaryOperator::Add => '+',
			BinaryOperator::Sub => '-',
			BinaryOperator::Mul => '*',
			BinaryOperator::Div => '/',
			BinaryOperator::And => '&',
			BinaryOperator::Or => '|',
			BinaryOperator::Lt => '<',
			BinaryOperator::Gt => '>',
			BinaryOperator::Eq => '=',
		}
	}
}

/// Prefix operators. `Neg` is kept apart from the binary `Sub` so the
/// generator never has to guess between `neg` and `sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
	Neg,
	Not,
}

impl UnaryOperator {
	pub fn command(self) -> Command {
		match self {
			UnaryOperator::Neg => Command::Neg,
			UnaryOperator::Not => Command::Not,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordConstant {
	True,
	False,
	Null,
	This,
}

impl KeywordConstant {
	fn from_keyword(keyword: Keyword) -> Option<Self> {
		Some(match keyword {
			Keyword::True => KeywordConstant::True,
			Keyword::False => KeywordConstant::False,
			Keyword::Null => KeywordConstant::Null,
			Keyword::This => KeywordConstant::This,
			_ => return None,
		})
	}
}

impl fmt::Display for KeywordConstant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			KeywordConstant::True => "true",
			KeywordConstant::False => "false",
			KeywordConstant::Null => "null",
			KeywordConstant::This => "this",
		})
	}
}

/// An owned expression tree. Names borrow from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
	BinaryOp { op: BinaryOperator, left: Box<Node<'a>>, right: Box<Node<'a>> },
	UnaryOp { op: UnaryOperator, operand: Box<Node<'a>> },
	IntLiteral(u16),
	StringLiteral(&'a str),
	KeywordConstant(KeywordConstant),
	VariableRef { name: &'a str, position: Position },
	ArrayAccess { name: &'a str, index: Box<Node<'a>>, position: Position },
	/// `receiver` is the text before the dot, `None` for a bare `name(...)`.
	Call { name: &'a str, receiver: Option<&'a str>, args: Vec<Node<'a>> },
}

impl<'a> Node<'a> {
	pub fn binary(op: BinaryOperator, left: Self, right: Self) -> Self {
		Node::BinaryOp { op, left: Box::new(left), right: Box::new(right) }
	}

	pub fn unary(op: UnaryOperator, operand: Self) -> Self { Node::UnaryOp { op, operand: Box::new(operand) } }

	pub fn array(name: &'a str, index: Self, position: Position) -> Self {
		Node::ArrayAccess { name, index: Box::new(index), position }
	}
}

impl fmt::Display for Node<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Node::BinaryOp { op, left, right } => write!(f, "({} {left} {right})", op.symbol()),
			Node::UnaryOp { op: UnaryOperator::Neg, operand } => write!(f, "(neg {operand})"),
			Node::UnaryOp { op: UnaryOperator::Not, operand } => write!(f, "(~ {operand})"),
			Node::IntLiteral(value) => write!(f, "{value}"),
			Node::StringLiteral(text) => write!(f, "\"{text}\""),
			Node::KeywordConstant(constant) => write!(f, "{constant}"),
			Node::VariableRef { name, .. } => write!(f, "{name}"),
			Node::ArrayAccess { name, index, .. } => write!(f, "{name}[{index}]"),
			Node::Call { name, receiver, args } => {
				f.write_str("(call ")?;
				if let Some(receiver) = receiver {
					write!(f, "{receiver}.")?;
				}
				write!(f, "{name}")?;
				for arg in args {
					write!(f, " {arg}")?;
				}
				f.write_str(")")
			}
		}
	}
}

impl<'a> Parser<'a> {
	/// Parse a full expression.
	pub(crate) fn expression(&mut self) -> Result<Node<'a>, CompileError> {
		let depth = self.depth;
		self.nest()?;
		let node = self.and()?;
		self.depth = depth;
		Ok(node)
	}

	fn and(&mut self) -> Result<Node<'a>, CompileError> {
		let depth = self.depth;
		let mut node = self.or()?;
		while let Some(op) = self.binary_operator(&[Symbol::Ampersand]) {
			self.advance("'&'")?;
			self.nest()?;
			node = Node::binary(op, node, self.or()?);
		}
		self.depth = depth;
		Ok(node)
	}

	fn or(&mut self) -> Result<Node<'a>, CompileError> {
		let depth = self.depth;
		let mut node = self.comparison()?;
		while let Some(op) = self.binary_operator(&[Symbol::Pipe]) {
			self.advance("'|'")?;
			self.nest()?;
			node = Node::binary(op, node, self.comparison()?);
		}
		self.depth = depth;
		Ok(node)
	}

	fn comparison(&mut self) -> Result<Node<'a>, CompileError> {
		let depth = self.depth;
		let mut node = self.term()?;
		while let Some(op) = self.binary_operator(&[Symbol::Equal, Symbol::Less, Symbol::Greater]) {
			self.advance("comparison operator")?;
			self.nest()?;
			node = Node::binary(op, node, self.term()?);
		}
		self.depth = depth;
		Ok(node)
	}

	fn term(&mut self) -> Result<Node<'a>, CompileError> {
		let depth = self.depth;
		let mut node = self.factor()?;
		while let Some(op) = self.binary_operator(&[Symbol::Plus, Symbol::Minus]) {
			self.advance("'+' or '-'")?;
			self.nest()?;
			node = Node::binary(op, node, self.factor()?);
		}
		self.depth = depth;
		Ok(node)
	}

	fn factor(&mut self) -> Result<Node<'a>, CompileError> {
		let depth = self.depth;
		let mut node = self.unary()?;
		while let Some(op) = self.binary_operator(&[Symbol::Star, Symbol::Slash]) {
			self.advance("'*' or '/'")?;
			self.nest()?;
			node = Node::binary(op, node, self.unary()?);
		}
		self.depth = depth;
		Ok(node)
	}

	fn unary(&mut self) -> Result<Node<'a>, CompileError> {
		let op = match self.peek_symbol() {
			Some(Symbol::Minus) => UnaryOperator::Neg,
			Some(Symbol::Tilde) => UnaryOperator::Not,
			_ => return self.primary(),
		};
		self.advance("unary operator")?;
		let depth = self.depth;
		self.nest()?;
		let operand = self.unary()?;
		self.depth = depth;
		Ok(Node::unary(op, operand))
	}

	/// Parse a term that binds tighter than any operator.
	pub(crate) fn primary(&mut self) -> Result<Node<'a>, CompileError> {
		let token = self.advance("an expression")?;
		match token.r#type {
			TokenType::IntConstant(value) => Ok(Node::IntLiteral(value)),
			TokenType::StringConstant(text) => Ok(Node::StringLiteral(text)),
			TokenType::Keyword(Keyword::This) if self.check_symbol(Symbol::Dot) => self.call(Keyword::This.as_str()),
			TokenType::Keyword(keyword) => KeywordConstant::from_keyword(keyword)
				.map(Node::KeywordConstant)
				.ok_or_else(|| unexpected(&token, "an expression")),
			TokenType::Symbol(Symbol::LeftParen) => {
				let node = self.expression()?;
				self.expect_symbol(Symbol::RightParen)?;
				Ok(node)
			}
			TokenType::Identifier(name) => match self.peek_symbol() {
				Some(Symbol::LeftBracket) => {
					self.advance("'['")?;
					let index = self.expression()?;
					self.expect_symbol(Symbol::RightBracket)?;
					Ok(Node::array(name, index, token.position))
				}
				Some(Symbol::LeftParen | Symbol::Dot) => self.call(name),
				_ => Ok(Node::VariableRef { name, position: token.position }),
			},
			TokenType::Symbol(_) => Err(unexpected(&token, "an expression")),
		}
	}

	/// Parse the rest of a call whose first identifier is already consumed.
	fn call(&mut self, name: &'a str) -> Result<Node<'a>, CompileError> {
		let (receiver, name) = if self.check_symbol(Symbol::Dot) {
			self.advance("'.'")?;
			(Some(name), self.expect_identifier()?.0)
		} else {
			(None, name)
		};
		self.expect_symbol(Symbol::LeftParen)?;
		let args = self.expression_list()?;
		self.expect_symbol(Symbol::RightParen)?;
		Ok(Node::Call { name, receiver, args })
	}

	/// Comma separated call arguments, possibly none.
	fn expression_list(&mut self) -> Result<Vec<Node<'a>>, CompileError> {
		let mut args = Vec::new();
		if self.check_symbol(Symbol::RightParen) {
			return Ok(args);
		}
		loop {
			args.push(self.expression()?);
			if !self.check_symbol(Symbol::Comma) {
				break;
			}
			self.advance("','")?;
		}
		Ok(args)
	}

	fn binary_operator(&self, operators: &[Symbol]) -> Option<BinaryOperator> {
		self.peek_symbol().filter(|symbol| operators.contains(symbol)).and_then(BinaryOperator::from_symbol)
	}
}
