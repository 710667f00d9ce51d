//! ``` BNF
//! statements     → statement* ;
//! statement      → letStmt | ifStmt | whileStmt | doStmt | returnStmt ;
//! letStmt        → "let" IDENTIFIER ( "[" expression "]" )? "=" expression ";" ;
//! ifStmt         → "if" "(" expression ")" "{" statements "}"
//!                  ( "else" "{" statements "}" )? ;
//! whileStmt      → "while" "(" expression ")" "{" statements "}" ;
//! doStmt         → "do" call ";" ;
//! returnStmt     → "return" expression? ";" ;
//! ```

use tracing::trace;

use super::{Node, Parser};
use crate::{CompileError, ParseError, codegen::{CodeGenerator, CompilerState, vm::{Command, Segment}}, lexer::{Keyword, Symbol}};

/// Which statement a production compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatementKind {
	Let,
	If,
	While,
	Do,
	Return,
}

impl<'a> Parser<'a> {
	/// Compile statements until something that cannot start one. Returns the
	/// kind of the last statement, if any.
	pub(super) fn statements(&mut self, state: &mut CompilerState<'a>) -> Result<Option<StatementKind>, CompileError> {
		let mut last = None;
		loop {
			let kind = match self.peek_keyword() {
				Some(Keyword::Let) => self.let_statement(state)?,
				Some(Keyword::If) => self.if_statement(state)?,
				Some(Keyword::While) => self.while_statement(state)?,
				Some(Keyword::Do) => self.do_statement(state)?,
				Some(Keyword::Return) => self.return_statement(state)?,
				_ => return Ok(last),
			};
			trace!(?kind, "compiled statement");
			last = Some(kind);
		}
	}

	/// The whole statement is parsed before the target is resolved, so grammar
	/// errors win over name errors.
	fn let_statement(&mut self, state: &mut CompilerState<'a>) -> Result<StatementKind, CompileError> {
		self.expect_keyword(Keyword::Let)?;
		let (name, position) = self.expect_identifier()?;
		let index = if self.check_symbol(Symbol::LeftBracket) {
			self.advance("'['")?;
			let index = self.expression()?;
			self.expect_symbol(Symbol::RightBracket)?;
			Some(index)
		} else {
			None
		};
		self.expect_symbol(Symbol::Equal)?;
		let value = self.expression()?;
		self.expect_symbol(Symbol::Semicolon)?;

		CodeGenerator::new(state).assign(name, position, index.as_ref(), &value)?;
		Ok(StatementKind::Let)
	}

	fn if_statement(&mut self, state: &mut CompilerState<'a>) -> Result<StatementKind, CompileError> {
		let if_false = state.next_label("IF_FALSE");
		let if_end = state.next_label("IF_END");

		self.expect_keyword(Keyword::If)?;
		self.condition(state)?;
		state.writer.arithmetic(Command::Not);
		state.writer.if_goto(&if_false);
		self.block(state)?;

		if self.peek_keyword() == Some(Keyword::Else) {
			self.advance("'else'")?;
			state.writer.goto(&if_end);
			state.writer.label(&if_false);
			self.block(state)?;
			state.writer.label(&if_end);
		} else {
			state.writer.label(&if_false);
		}
		Ok(StatementKind::If)
	}

	fn while_statement(&mut self, state: &mut CompilerState<'a>) -> Result<StatementKind, CompileError> {
		let top = state.next_label("WHILE_EXP");
		let exit = state.next_label("WHILE_END");

		self.expect_keyword(Keyword::While)?;
		state.writer.label(&top);
		self.condition(state)?;
		state.writer.arithmetic(Command::Not);
		state.writer.if_goto(&exit);
		self.block(state)?;
		state.writer.goto(&top);
		state.writer.label(&exit);
		Ok(StatementKind::While)
	}

	fn do_statement(&mut self, state: &mut CompilerState<'a>) -> Result<StatementKind, CompileError> {
		let position = self.expect_keyword(Keyword::Do)?;
		let target = self.primary()?;
		if !matches!(target, Node::Call { .. }) {
			return Err(ParseError::MalformedCallTarget { position, found: target.to_string() }.into());
		}
		CodeGenerator::new(state).expression(&target)?;
		state.writer.pop(Segment::Temp, 0);
		self.expect_symbol(Symbol::Semicolon)?;
		Ok(StatementKind::Do)
	}

	fn return_statement(&mut self, state: &mut CompilerState<'a>) -> Result<StatementKind, CompileError> {
		self.expect_keyword(Keyword::Return)?;
		if self.check_symbol(Symbol::Semicolon) {
			state.writer.push(Segment::Constant, 0);
		} else {
			self.compile_expression(state)?;
		}
		self.expect_symbol(Symbol::Semicolon)?;
		state.writer.ret();
		Ok(StatementKind::Return)
	}

	/// `"(" expression ")"`
	fn condition(&mut self, state: &mut CompilerState<'a>) -> Result<(), CompileError> {
		self.expect_symbol(Symbol::LeftParen)?;
		self.compile_expression(state)?;
		self.expect_symbol(Symbol::RightParen)?;
		Ok(())
	}

	/// `"{" statements "}"`
	fn block(&mut self, state: &mut CompilerState<'a>) -> Result<(), CompileError> {
		let depth = self.depth;
		self.expect_symbol(Symbol::LeftBrace)?;
		self.nest()?;
		self.statements(state)?;
		self.expect_symbol(Symbol::RightBrace)?;
		self.depth = depth;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::{CompileError, ParseError, SemanticError, parser::Parser};

	/// Compile `body` as the body of `function void f()` and return the
	/// instructions after the function header.
	fn body(declarations: &str, body: &str) -> Result<Vec<String>, CompileError> {
		let source = format!("class Main {{ {declarations} function void f() {{ {body} }} }}");
		let stream = Parser::new(&source)?.compile_class("Main")?;
		Ok(stream.iter().skip(1).map(|instruction| instruction.to_string()).collect())
	}

	#[test]
	fn let_assigns_by_kind() {
		let lines = body("static int s; field int x;", "var int a; let a = 1; let s = a; return;").unwrap();
		assert_eq!(lines, [
			"push constant 1",
			"pop local 0",
			"push local 0",
			"pop static 0",
			"push constant 0",
			"return"
		]);
	}

	#[test]
	fn let_array_element() {
		let lines = body("", "var Array a; var int i; let a[i] = i + 1; return;").unwrap();
		assert_eq!(lines, [
			"push local 0",
			"push local 1",
			"add",
			"push local 1",
			"push constant 1",
			"add",
			"pop temp 0",
			"pop pointer 1",
			"push temp 0",
			"pop that 0",
			"push constant 0",
			"return"
		]);
	}

	#[test]
	fn if_without_else_has_one_label() {
		let lines = body("", "if (true) { return; } return;").unwrap();
		assert_eq!(lines, [
			"push constant 1",
			"not",
			"if-goto IF_FALSE0",
			"push constant 0",
			"return",
			"label IF_FALSE0",
			"push constant 0",
			"return"
		]);
	}

	#[test]
	fn if_else() {
		let lines = body("", "var int x; if (x) { let x = 1; } else { let x = 2; } return;").unwrap();
		assert_eq!(lines, [
			"push local 0",
			"not",
			"if-goto IF_FALSE0",
			"push constant 1",
			"pop local 0",
			"goto IF_END1",
			"label IF_FALSE0",
			"push constant 2",
			"pop local 0",
			"label IF_END1",
			"push constant 0",
			"return"
		]);
	}

	#[test]
	fn while_loop() {
		let lines = body("", "var int i; while (i < 3) { let i = i + 1; } return;").unwrap();
		assert_eq!(lines, [
			"label WHILE_EXP0",
			"push local 0",
			"push constant 3",
			"lt",
			"not",
			"if-goto WHILE_END1",
			"push local 0",
			"push constant 1",
			"add",
			"pop local 0",
			"goto WHILE_EXP0",
			"label WHILE_END1",
			"push constant 0",
			"return"
		]);
	}

	#[test]
	fn labels_stay_unique_across_nesting_and_subroutines() {
		let source = "class Main {
			function void f() { while (true) { if (false) { return; } } return; }
			function void g() { if (true) { return; } return; }
		}";
		let output = Parser::new(source).unwrap().compile_class("Main").unwrap().to_string();
		let labels: Vec<&str> = output.lines().filter_map(|line| line.strip_prefix("label ")).collect();
		assert_eq!(labels, ["WHILE_EXP0", "IF_FALSE2", "WHILE_END1", "IF_FALSE4"]);
	}

	#[test]
	fn do_discards_result() {
		let lines = body("", "do Output.printInt(1); return;").unwrap();
		assert_eq!(lines, ["push constant 1", "call Output.printInt 1", "pop temp 0", "push constant 0", "return"]);
	}

	#[test]
	fn return_value() {
		let lines = body("", "return 7;").unwrap();
		assert_eq!(lines, ["push constant 7", "return"]);
	}

	#[test]
	fn statement_errors() {
		assert!(matches!(
			body("", "do x; return;"),
			Err(CompileError::Parse(ParseError::MalformedCallTarget { .. }))
		));
		assert!(matches!(
			body("", "do 1; return;"),
			Err(CompileError::Parse(ParseError::MalformedCallTarget { .. }))
		));
		assert!(matches!(
			body("", "let y = 1; return;"),
			Err(CompileError::Semantic(SemanticError::UndeclaredIdentifier { .. }))
		));
		assert!(matches!(body("", "let = 1; return;"), Err(CompileError::Parse(ParseError::UnexpectedTokenType { .. }))));
		assert!(matches!(body("", "let y = ; return;"), Err(CompileError::Parse(ParseError::UnexpectedToken { .. }))));
		assert!(matches!(body("", "let y[0] 1; return;"), Err(CompileError::Parse(ParseError::UnexpectedToken { .. }))));
		assert!(matches!(
			body("", "let y[0] = 1; return;"),
			Err(CompileError::Semantic(SemanticError::UndeclaredIdentifier { .. }))
		));
		assert!(matches!(body("", "var int x; let x 1; return;"), Err(CompileError::Parse(ParseError::UnexpectedToken { .. }))));
		assert!(matches!(
			body("", "if (true) { return; }"),
			Err(CompileError::Parse(ParseError::MissingReturn { .. }))
		));
		assert!(matches!(body("", "return"), Err(CompileError::Parse(ParseError::UnexpectedToken { .. }))));
	}
}
