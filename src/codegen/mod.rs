//! Per-unit compiler state and the expression emitter.
//!
//! [`CodeGenerator`] walks a [`Node`] tree children first and appends to the
//! unit's writer. Names are resolved against the symbol table as it stands at
//! the point the expression appears, so the tree never carries segments.

pub mod vm;

use tracing::trace;
use vm::{Command, InstructionStream, Segment, VmWriter};

use crate::{SemanticError, lexer::Position, parser::{BinaryOperator, KeywordConstant, Node}, symbol_table::SymbolTable};

/// Everything that changes while one class is compiled.
pub struct CompilerState<'a> {
	pub class_name: &'a str,
	pub symbols:    SymbolTable<'a>,
	pub writer:     VmWriter,
	/// Never reset within a class, so labels stay unique across subroutines.
	labels:         u32,
}

impl<'a> CompilerState<'a> {
	pub fn new(class_name: &'a str) -> Self {
		Self { class_name, symbols: SymbolTable::new(), writer: VmWriter::new(), labels: 0 }
	}

	/// A fresh label `{prefix}{n}`.
	pub fn next_label(&mut self, prefix: &str) -> String {
		let label = format!("{prefix}{}", self.labels);
		self.labels += 1;
		trace!(%label, "allocated label");
		label
	}

	/// Segment and index of a declared variable.
	pub fn resolve(&self, name: &str, position: Position) -> Result<(Segment, u32), SemanticError> {
		self.symbols
			.lookup(name)
			.map(|entry| (entry.kind.segment(), entry.index))
			.ok_or_else(|| SemanticError::UndeclaredIdentifier { position, name: name.to_string() })
	}

	pub fn finish(self) -> InstructionStream { self.writer.finish() }
}

pub struct CodeGenerator<'s, 'a> {
	state: &'s mut CompilerState<'a>,
}

impl<'s, 'a> CodeGenerator<'s, 'a> {
	pub fn new(state: &'s mut CompilerState<'a>) -> Self { Self { state } }

	/// Emit code leaving the value of `node` on top of the stack.
	pub fn expression(&mut self, node: &Node<'_>) -> Result<(), SemanticError> {
		match node {
			Node::BinaryOp { op, left, right } => {
				self.expression(left)?;
				self.expression(right)?;
				match op.command() {
					Some(command) => self.state.writer.arithmetic(command),
					None => {
						let function = if *op == BinaryOperator::Mul { "Math.multiply" } else { "Math.divide" };
						self.state.writer.call(function.to_string(), 2);
					}
				}
			}
			Node::UnaryOp { op, operand } => {
				self.expression(operand)?;
				self.state.writer.arithmetic(op.command());
			}
			Node::IntLiteral(value) => self.state.writer.push(Segment::Constant, u32::from(*value)),
			Node::StringLiteral(text) => self.string(text),
			Node::KeywordConstant(constant) => self.keyword_constant(*constant),
			Node::VariableRef { name, position } => {
				let (segment, index) = self.state.resolve(name, *position)?;
				self.state.writer.push(segment, index);
			}
			Node::ArrayAccess { name, index, position } => {
				self.expression(index)?;
				let (segment, base) = self.state.resolve(name, *position)?;
				self.state.writer.push(segment, base);
				self.state.writer.arithmetic(Command::Add);
				self.state.writer.pop(Segment::Pointer, 1);
				self.state.writer.push(Segment::That, 0);
			}
			Node::Call { name, receiver, args } => self.call(name, *receiver, args)?,
		}
		Ok(())
	}

	/// Store `value` into `name`, or into `name[index]` when an index is given.
	pub fn assign(
		&mut self,
		name: &str,
		position: Position,
		index: Option<&Node<'_>>,
		value: &Node<'_>,
	) -> Result<(), SemanticError> {
		let (segment, base) = self.state.resolve(name, position)?;
		let Some(index) = index else {
			self.expression(value)?;
			self.state.writer.pop(segment, base);
			return Ok(());
		};

		self.state.writer.push(segment, base);
		self.expression(index)?;
		self.state.writer.arithmetic(Command::Add);
		self.expression(value)?;
		// Evaluating the value may repoint `that`, so it is parked in `temp`.
		self.state.writer.pop(Segment::Temp, 0);
		self.state.writer.pop(Segment::Pointer, 1);
		self.state.writer.push(Segment::Temp, 0);
		self.state.writer.pop(Segment::That, 0);
		Ok(())
	}

	fn string(&mut self, text: &str) {
		let writer = &mut self.state.writer;
		writer.push(Segment::Constant, text.chars().count() as u32);
		writer.call("String.new".to_string(), 1);
		for c in text.chars() {
			writer.push(Segment::Constant, u32::from(c));
			writer.call("String.appendChar".to_string(), 2);
		}
	}

	fn keyword_constant(&mut self, constant: KeywordConstant) {
		match constant {
			KeywordConstant::True => self.state.writer.push(Segment::Constant, 1),
			KeywordConstant::False | KeywordConstant::Null => self.state.writer.push(Segment::Constant, 0),
			KeywordConstant::This => self.state.writer.push(Segment::Pointer, 0),
		}
	}

	/// Resolve the call target, then push the arguments.
	///
	/// - no receiver or `this`: method of the current object
	/// - a declared variable: method on that object, dispatched by its type
	/// - anything else: function or constructor of the named class
	fn call(&mut self, name: &str, receiver: Option<&str>, args: &[Node<'_>]) -> Result<(), SemanticError> {
		let mut argc = args.len() as u32;
		let class = match receiver {
			None | Some("this") => {
				self.state.writer.push(Segment::Pointer, 0);
				argc += 1;
				self.state.class_name.to_string()
			}
			Some(receiver) => match self.state.symbols.lookup(receiver) {
				Some(entry) => {
					self.state.writer.push(entry.kind.segment(), entry.index);
					argc += 1;
					entry.declared_type.to_string()
				}
				None => receiver.to_string(),
			},
		};

		for arg in args {
			self.expression(arg)?;
		}
		self.state.writer.call(format!("{class}.{name}"), argc);
		Ok(())
	}
}
