//! The `Lexer` uses the `Lexical grammar`, its alphabet is characters and its
//! strings are tokens. The `Parser` uses the `Syntactic grammar`, its alphabet
//! is tokens and its strings are classes.
//!
//! Declarations and statements are compiled in a single pass: each production
//! consumes its tokens and immediately writes the instructions it owns into
//! the unit's [`CompilerState`]. Expressions are the exception; they are built
//! into a [`Node`] tree first and handed to the [`CodeGenerator`] afterwards.
//!
//! ``` BNF
//! class          → "class" IDENTIFIER "{" classVarDec* subroutineDec* "}" ;
//! classVarDec    → ( "static" | "field" ) type IDENTIFIER ( "," IDENTIFIER )* ";" ;
//! type           → "int" | "char" | "boolean" | IDENTIFIER ;
//! subroutineDec  → ( "constructor" | "function" | "method" ) ( "void" | type )
//!                  IDENTIFIER "(" parameterList ")" subroutineBody ;
//! parameterList  → ( type IDENTIFIER ( "," type IDENTIFIER )* )? ;
//! subroutineBody → "{" varDec* statements "}" ;
//! varDec         → "var" type IDENTIFIER ( "," IDENTIFIER )* ";" ;
//! ```

pub mod expression;
mod statement;

pub use expression::{BinaryOperator, KeywordConstant, Node, UnaryOperator};
use tracing::debug;

use crate::{CompileError, ParseError, codegen::{CodeGenerator, CompilerState, vm::{InstructionStream, Segment}}, lexer::{Keyword, Lexer, Position, Symbol, Token, TokenKind, TokenType}, symbol_table::Kind};

/// The three flavours of subroutine, which differ only in their prologue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
	Constructor,
	Function,
	Method,
}

/// How deep blocks, groupings, operands and operator chains may nest. Both the
/// parser and the code generator recurse once per level.
pub const MAX_NESTING: usize = 128;

/// Recursive-descent parser over one compilation unit.
pub struct Parser<'a> {
	lexer:   Lexer<'a>,
	/// One token of lookahead, `None` once the input is exhausted.
	current: Option<Token<'a>>,
	/// Current nesting level, bounded by [`MAX_NESTING`].
	depth:   usize,
}

impl<'a> Parser<'a> {
	pub fn new(source: &'a str) -> Result<Self, CompileError> {
		let mut parser = Self { lexer: Lexer::new(source), current: None, depth: 0 };
		parser.fill()?;
		Ok(parser)
	}

	/// Compile the single class of this unit. The class must be named
	/// `expected_name`.
	pub fn compile_class(mut self, expected_name: &str) -> Result<InstructionStream, CompileError> {
		self.expect_keyword(Keyword::Class)?;
		let (class_name, position) = self.expect_identifier()?;
		if class_name != expected_name {
			return Err(ParseError::ClassNameMismatch {
				position,
				expected: expected_name.to_string(),
				found: class_name.to_string(),
			}
			.into());
		}
		debug!(class = class_name, "compiling class");

		let mut state = CompilerState::new(class_name);
		self.expect_symbol(Symbol::LeftBrace)?;
		while matches!(self.peek_keyword(), Some(Keyword::Static | Keyword::Field)) {
			self.class_var_dec(&mut state)?;
		}
		while matches!(self.peek_keyword(), Some(Keyword::Constructor | Keyword::Function | Keyword::Method)) {
			self.subroutine_dec(&mut state)?;
		}
		self.expect_symbol(Symbol::RightBrace)?;

		if let Some(token) = self.current {
			return Err(ParseError::TrailingInput { position: token.position, found: token.r#type.to_string() }.into());
		}
		Ok(state.finish())
	}

	fn class_var_dec(&mut self, state: &mut CompilerState<'a>) -> Result<(), CompileError> {
		let kind = match self.advance("'static' or 'field'")?.r#type {
			TokenType::Keyword(Keyword::Static) => Kind::Static,
			_ => Kind::Field,
		};
		let declared_type = self.expect_type(false)?;
		self.declare_names(state, declared_type, kind)?;
		self.expect_symbol(Symbol::Semicolon)?;
		Ok(())
	}

	fn subroutine_dec(&mut self, state: &mut CompilerState<'a>) -> Result<(), CompileError> {
		let kind = match self.advance("subroutine declaration")?.r#type {
			TokenType::Keyword(Keyword::Constructor) => SubroutineKind::Constructor,
			TokenType::Keyword(Keyword::Method) => SubroutineKind::Method,
			_ => SubroutineKind::Function,
		};
		state.symbols.flush_subroutine_scope();

		self.expect_type(true)?;
		let (name, _) = self.expect_identifier()?;
		if kind == SubroutineKind::Method {
			state.symbols.define(Keyword::This.as_str(), state.class_name, Kind::Argument);
		}

		self.expect_symbol(Symbol::LeftParen)?;
		self.parameter_list(state)?;
		self.expect_symbol(Symbol::RightParen)?;
		self.subroutine_body(state, kind, name)
	}

	fn parameter_list(&mut self, state: &mut CompilerState<'a>) -> Result<(), CompileError> {
		if self.check_symbol(Symbol::RightParen) {
			return Ok(());
		}
		loop {
			let declared_type = self.expect_type(false)?;
			let (name, _) = self.expect_identifier()?;
			state.symbols.define(name, declared_type, Kind::Argument);
			if !self.check_symbol(Symbol::Comma) {
				break;
			}
			self.advance("','")?;
		}
		Ok(())
	}

	fn subroutine_body(
		&mut self,
		state: &mut CompilerState<'a>,
		kind: SubroutineKind,
		name: &'a str,
	) -> Result<(), CompileError> {
		self.expect_symbol(Symbol::LeftBrace)?;
		while self.peek_keyword() == Some(Keyword::Var) {
			self.var_dec(state)?;
		}

		// The header needs the local count, so it waits for every `var`.
		let qualified = format!("{}.{name}", state.class_name);
		let locals = state.symbols.var_count(Kind::Local);
		debug!(subroutine = %qualified, ?kind, locals, "compiling subroutine");
		state.writer.function(qualified, locals);

		match kind {
			SubroutineKind::Constructor => {
				let fields = state.symbols.var_count(Kind::Field);
				state.writer.push(Segment::Constant, fields);
				state.writer.call("Memory.alloc".to_string(), 1);
				state.writer.pop(Segment::Pointer, 0);
			}
			SubroutineKind::Method => {
				state.writer.push(Segment::Argument, 0);
				state.writer.pop(Segment::Pointer, 0);
			}
			SubroutineKind::Function => {}
		}

		let last = self.statements(state)?;
		let closing = self.expect_symbol(Symbol::RightBrace)?;
		if last != Some(statement::StatementKind::Return) {
			return Err(ParseError::MissingReturn { position: closing, subroutine: name.to_string() }.into());
		}
		Ok(())
	}

	fn var_dec(&mut self, state: &mut CompilerState<'a>) -> Result<(), CompileError> {
		self.expect_keyword(Keyword::Var)?;
		let declared_type = self.expect_type(false)?;
		self.declare_names(state, declared_type, Kind::Local)?;
		self.expect_symbol(Symbol::Semicolon)?;
		Ok(())
	}

	/// `IDENTIFIER ( "," IDENTIFIER )*`, each bound with the same type.
	fn declare_names(
		&mut self,
		state: &mut CompilerState<'a>,
		declared_type: &'a str,
		kind: Kind,
	) -> Result<(), CompileError> {
		loop {
			let (name, _) = self.expect_identifier()?;
			state.symbols.define(name, declared_type, kind);
			if !self.check_symbol(Symbol::Comma) {
				return Ok(());
			}
			self.advance("','")?;
		}
	}

	/// Parse an expression and emit its code right away.
	fn compile_expression(&mut self, state: &mut CompilerState<'a>) -> Result<(), CompileError> {
		let tree = self.expression()?;
		CodeGenerator::new(state).expression(&tree)?;
		Ok(())
	}
}

// Token cursor primitives.
impl<'a> Parser<'a> {
	/// Load the next token into the lookahead slot.
	fn fill(&mut self) -> Result<(), CompileError> {
		self.current = if self.lexer.has_more_tokens() { Some(self.lexer.advance()?) } else { None };
		Ok(())
	}

	/// Consume the lookahead token. `expected` names what the grammar wanted
	/// in case the input has run out.
	fn advance(&mut self, expected: &str) -> Result<Token<'a>, CompileError> {
		let token = self.current.take().ok_or_else(|| self.end_of_input(expected))?;
		self.fill()?;
		Ok(token)
	}

	fn peek_keyword(&self) -> Option<Keyword> {
		match self.current?.r#type {
			TokenType::Keyword(keyword) => Some(keyword),
			_ => None,
		}
	}

	fn peek_symbol(&self) -> Option<Symbol> {
		match self.current?.r#type {
			TokenType::Symbol(symbol) => Some(symbol),
			_ => None,
		}
	}

	fn check_symbol(&self, symbol: Symbol) -> bool { self.peek_symbol() == Some(symbol) }

	/// Consume exactly `expected` or fail with `UnexpectedToken`.
	fn expect(&mut self, expected: TokenType<'a>) -> Result<Position, CompileError> {
		let description = expected.to_string();
		match self.current {
			Some(token) if token.r#type == expected => {
				self.advance(&description)?;
				Ok(token.position)
			}
			Some(token) => Err(unexpected(&token, &description)),
			None => Err(self.end_of_input(&description)),
		}
	}

	fn expect_keyword(&mut self, keyword: Keyword) -> Result<Position, CompileError> {
		self.expect(TokenType::Keyword(keyword))
	}

	fn expect_symbol(&mut self, symbol: Symbol) -> Result<Position, CompileError> {
		self.expect(TokenType::Symbol(symbol))
	}

	/// Consume an identifier or fail with `UnexpectedTokenType`.
	fn expect_identifier(&mut self) -> Result<(&'a str, Position), CompileError> {
		match self.current {
			Some(Token { r#type: TokenType::Identifier(name), position }) => {
				self.advance("identifier")?;
				Ok((name, position))
			}
			Some(token) => Err(ParseError::UnexpectedTokenType {
				position: token.position,
				expected: TokenKind::Identifier,
				found:    token.r#type.to_string(),
			}
			.into()),
			None => Err(self.end_of_input("identifier")),
		}
	}

	/// `int`, `char`, `boolean` or a class name, plus `void` for return types.
	fn expect_type(&mut self, allow_void: bool) -> Result<&'a str, CompileError> {
		let expected = if allow_void { "return type" } else { "type" };
		match self.current {
			Some(Token { r#type: TokenType::Identifier(name), .. }) => {
				self.advance(expected)?;
				Ok(name)
			}
			Some(Token { r#type: TokenType::Keyword(keyword), .. })
				if matches!(keyword, Keyword::Int | Keyword::Char | Keyword::Boolean)
					|| (allow_void && keyword == Keyword::Void) =>
			{
				self.advance(expected)?;
				Ok(keyword.as_str())
			}
			Some(token) => Err(unexpected(&token, expected)),
			None => Err(self.end_of_input(expected)),
		}
	}

	/// Enter one more nesting level. Callers restore `depth` when they leave.
	fn nest(&mut self) -> Result<(), CompileError> {
		self.depth += 1;
		if self.depth > MAX_NESTING {
			let position = self.current.map_or_else(|| self.lexer.location(), |token| token.position);
			return Err(ParseError::NestingTooDeep { position, limit: MAX_NESTING }.into());
		}
		Ok(())
	}

	fn end_of_input(&self, expected: &str) -> CompileError {
		ParseError::UnexpectedEndOfInput { position: self.lexer.location(), expected: expected.to_string() }.into()
	}
}

fn unexpected(token: &Token<'_>, expected: &str) -> CompileError {
	ParseError::UnexpectedToken {
		position: token.position,
		expected: expected.to_string(),
		found:    token.r#type.to_string(),
	}
	.into()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(input: &str, equals: &str) {
		let mut parser = Parser::new(input).unwrap();
		let tree = parser.expression().unwrap();
		assert_eq!(tree.to_string(), equals);
		assert!(parser.current.is_none(), "unconsumed input after {input:?}");
	}

	fn parse_error(input: &str) -> CompileError {
		let mut parser = Parser::new(input).unwrap();
		parser.expression().unwrap_err()
	}

	fn compile(input: &str) -> Result<String, CompileError> {
		Parser::new(input)?.compile_class("Main").map(|stream| stream.to_string())
	}

	#[test]
	fn parse_precedence() {
		parse("1 + 2 * 3", "(+ 1 (* 2 3))");
		parse("1 * 2 + 3", "(+ (* 1 2) 3)");
		parse("1 + 2 < 3 * 4", "(< (+ 1 2) (* 3 4))");
		parse("a < b | c = d", "(| (< a b) (= c d))");
		parse("a | b & c | d", "(& (| a b) (| c d))");
		parse("a & b | c", "(& a (| b c))");
	}

	#[test]
	fn parse_left_associative() {
		parse("1 - 2 - 3", "(- (- 1 2) 3)");
		parse("8 / 4 / 2", "(/ (/ 8 4) 2)");
		parse("a < b < c", "(< (< a b) c)");
		parse("a & b & c", "(& (& a b) c)");
	}

	#[test]
	fn parse_grouping() {
		parse("(1 + 2) * 3", "(* (+ 1 2) 3)");
		parse("((x))", "x");
		parse("(a & b) | c", "(| (& a b) c)");
	}

	#[test]
	fn parse_unary() {
		parse("-x", "(neg x)");
		parse("~done", "(~ done)");
		parse("-x - y", "(- (neg x) y)");
		parse("x - -y", "(- x (neg y))");
		parse("~~a", "(~ (~ a))");
		parse("-(1 + 2)", "(neg (+ 1 2))");
	}

	#[test]
	fn parse_terms() {
		parse("42", "42");
		parse("\"hi there\"", "\"hi there\"");
		parse("true", "true");
		parse("false", "false");
		parse("null", "null");
		parse("this", "this");
		parse("a[i + 1]", "a[(+ i 1)]");
		parse("a[b[0]]", "a[b[0]]");
	}

	#[test]
	fn parse_calls() {
		parse("f()", "(call f)");
		parse("f(1, 2)", "(call f 1 2)");
		parse("Math.max(a, b + 1)", "(call Math.max a (+ b 1))");
		parse("p.getX() * 2", "(* (call p.getX) 2)");
		parse("this.foo(1)", "(call this.foo 1)");
		parse("Keyboard.readInt(\"n?\")", "(call Keyboard.readInt \"n?\")");
	}

	#[test]
	fn parse_call_shapes() {
		let mut parser = Parser::new("Output.printInt(x)").unwrap();
		let tree = parser.expression().unwrap();
		assert!(matches!(tree, Node::Call { name: "printInt", receiver: Some("Output"), ref args } if args.len() == 1));

		let mut parser = Parser::new("draw()").unwrap();
		let tree = parser.expression().unwrap();
		assert!(matches!(tree, Node::Call { name: "draw", receiver: None, ref args } if args.is_empty()));
	}

	#[test]
	fn parse_errors() {
		assert!(matches!(parse_error("1 +"), CompileError::Parse(ParseError::UnexpectedEndOfInput { .. })));
		assert!(matches!(parse_error(")"), CompileError::Parse(ParseError::UnexpectedToken { .. })));
		assert!(matches!(parse_error("let"), CompileError::Parse(ParseError::UnexpectedToken { .. })));
		assert!(matches!(parse_error("(1 + 2"), CompileError::Parse(ParseError::UnexpectedEndOfInput { .. })));
		assert!(matches!(parse_error("a.1()"), CompileError::Parse(ParseError::UnexpectedTokenType { .. })));
		assert!(matches!(parse_error("f(1,)"), CompileError::Parse(ParseError::UnexpectedToken { .. })));
	}

	#[test]
	fn compile_constructor_and_method_prologues() {
		let output = compile(
			"class Main {
				field int x, y;
				static int count;
				constructor Main new() { return this; }
				method int getX() { return x; }
			}",
		)
		.unwrap();
		assert_eq!(
			output,
			"function Main.new 0\npush constant 2\ncall Memory.alloc 1\npop pointer 0\npush pointer 0\nreturn\n\
			 function Main.getX 0\npush argument 0\npop pointer 0\npush this 0\nreturn\n"
		);
	}

	#[test]
	fn method_arguments_start_after_this() {
		let output = compile("class Main { method int second(int a, int b) { return b; } }").unwrap();
		assert!(output.contains("push argument 2\nreturn"), "{output}");

		let output = compile("class Main { function int second(int a, int b) { return b; } }").unwrap();
		assert!(output.contains("push argument 1\nreturn"), "{output}");
	}

	#[test]
	fn header_counts_locals() {
		let output = compile("class Main { function void f() { var int a, b; var char c; return; } }").unwrap();
		assert!(output.starts_with("function Main.f 3\n"), "{output}");
	}

	#[test]
	fn subroutine_scope_is_flushed() {
		let output = compile(
			"class Main {
				function void f(int a) { var int x; return; }
				function int g() { var int y; return y; }
			}",
		)
		.unwrap();
		assert!(output.ends_with("function Main.g 1\npush local 0\nreturn\n"), "{output}");

		let error = compile(
			"class Main {
				function void f() { var int x; return; }
				function int g() { return x; }
			}",
		)
		.unwrap_err();
		assert!(matches!(error, CompileError::Semantic(_)));
	}

	#[test]
	fn class_level_errors() {
		assert!(matches!(
			compile("class Other { }"),
			Err(CompileError::Parse(ParseError::ClassNameMismatch { .. }))
		));
		assert!(matches!(compile("class Main { } class"), Err(CompileError::Parse(ParseError::TrailingInput { .. }))));
		assert!(matches!(compile("class Main {"), Err(CompileError::Parse(ParseError::UnexpectedEndOfInput { .. }))));
		assert!(matches!(
			compile("class Main { field void x; }"),
			Err(CompileError::Parse(ParseError::UnexpectedToken { .. }))
		));
		assert!(matches!(
			compile("class Main { function void f() { } }"),
			Err(CompileError::Parse(ParseError::MissingReturn { .. }))
		));
		assert!(matches!(compile(""), Err(CompileError::Parse(ParseError::UnexpectedEndOfInput { .. }))));
	}

	fn too_deep(input: &str) -> bool {
		matches!(parse_error(input), CompileError::Parse(ParseError::NestingTooDeep { limit: MAX_NESTING, .. }))
	}

	#[test]
	fn nesting_is_bounded() {
		let depth = MAX_NESTING - 1;
		parse(&format!("{}1{}", "(".repeat(depth), ")".repeat(depth)), "1");
		parse(&format!("{}x", "-".repeat(depth)), &format!("{}x{}", "(neg ".repeat(depth), ")".repeat(depth)));

		assert!(too_deep(&"(".repeat(100_000)));
		assert!(too_deep(&format!("{}1", "-".repeat(100_000))));
		assert!(too_deep(&format!("{}1", "~".repeat(100_000))));
		assert!(too_deep(&format!("1{}", " + 1".repeat(100_000))));
		assert!(too_deep(&format!("{}1", "a[".repeat(100_000))));
		assert!(too_deep(&format!("{}1", "f(".repeat(100_000))));
	}

	#[test]
	fn nesting_error_position() {
		let input = format!("{}1", "(".repeat(MAX_NESTING + 5));
		let error = parse_error(&input);
		assert_eq!(error.position(), Position::new(1, MAX_NESTING + 1));
	}

	#[test]
	fn block_nesting_is_bounded() {
		let body = format!("{}return;{}", "while (true) { ".repeat(100_000), "}".repeat(100_000));
		let error = compile(&format!("class Main {{ function void f() {{ {body} return; }} }}")).unwrap_err();
		assert!(matches!(error, CompileError::Parse(ParseError::NestingTooDeep { .. })));

		let body = format!("{}return;{}", "if (true) { ".repeat(10), "}".repeat(10));
		assert!(compile(&format!("class Main {{ function void f() {{ {body} return; }} }}")).is_ok());
	}

	#[test]
	fn error_positions() {
		let error = compile("class Main {\n  function void main() {\n    let = 1;\n  }\n}").unwrap_err();
		assert_eq!(error.position(), Position::new(3, 9));
		assert_eq!(
			error.to_string(),
			"line 3, column 9: expected identifier, found '='"
		);
	}
}
