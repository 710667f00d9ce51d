//! Lexical analysis of Jack source text.
//!
//! The lexer hands out one token at a time: the parser asks
//! [`Lexer::has_more_tokens`] and then [`Lexer::advance`], so tokens are only
//! produced as far as the grammar actually reads.
//!
//! Whitespace, `// line` comments and `/* block */` comments are trivia and
//! never reach the parser. A block comment ends at the first `*/`.
//!
//! Identifiers are runs of ASCII letters and underscores. Digits are not part
//! of the identifier alphabet, so `x1` lexes as the identifier `x` followed by
//! the integer `1`. Reserved words are recognised after the whole run has been
//! read (`maximal munch`), which is why `classes` is an identifier and not the
//! keyword `class` followed by `es`.
mod token;

use std::{iter::Peekable, str::CharIndices};

pub use token::*;

use crate::LexError;

/// A lexer over one compilation unit
pub struct Lexer<'a> {
	/// User input source code
	source:      &'a str,
	/// User input source code iterator
	source_iter: Peekable<CharIndices<'a>>,
	/// Points at the beginning of the current lexeme
	start:       usize,
	/// Points just past the character most recently consumed
	cursor:      usize,
	/// Line of the character at `cursor`
	line:        usize,
	/// Byte offset where `line` begins, used to derive columns
	line_start:  usize,
	/// Set once the iterator has yielded an error
	failed:      bool,
}

impl<'a> Lexer<'a> {
	pub fn new(source: &'a str) -> Self {
		let source_iter = source.char_indices().peekable();

		Self { source, source_iter, start: 0, cursor: 0, line: 1, line_start: 0, failed: false }
	}

	/// Whether any input other than trivia remains.
	pub fn has_more_tokens(&mut self) -> bool {
		// An unterminated block comment stays unconsumed so that `advance`
		// reports it.
		self.skip_trivia().is_err() || self.peek().is_some()
	}

	/// Scan the next token.
	pub fn advance(&mut self) -> Result<Token<'a>, LexError> {
		self.skip_trivia()?;
		self.start = self.offset();
		let position = self.location();
		let next_char = self.bump().ok_or(LexError::UnexpectedEndOfInput { position })?;
		let r#type = match next_char {
			'"' => self.string(position)?,
			c if c.is_ascii_digit() => self.integer(position)?,
			c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
			c => TokenType::Symbol(
				Symbol::from_char(c).ok_or(LexError::UnknownCharacter { position, character: c })?,
			),
		};

		Ok(Token::new(r#type, position))
	}

	/// Position of the next unread character.
	pub fn location(&self) -> Position {
		let column = self.source[self.line_start..self.offset()].chars().count() + 1;
		Position::new(self.line, column)
	}

	/// Skip whitespace and comments.
	fn skip_trivia(&mut self) -> Result<(), LexError> {
		while let Some(c) = self.peek() {
			match c {
				c if c.is_whitespace() => {
					self.bump();
				}
				'/' if self.peek_second() == Some('/') => {
					while self.peek().is_some_and(|c| c != '\n') {
						self.bump();
					}
				}
				'/' if self.peek_second() == Some('*') => {
					let offset = self.offset();
					let Some(length) = self.source[offset + 2..].find("*/") else {
						return Err(LexError::UnterminatedComment { position: self.location() });
					};
					let end = offset + 2 + length + 2;
					while self.offset() < end {
						self.bump();
					}
				}
				_ => break,
			}
		}
		Ok(())
	}

	/// Consume one character, keeping line bookkeeping current
	fn bump(&mut self) -> Option<char> {
		let (i, c) = self.source_iter.next()?;
		self.cursor = i + c.len_utf8();
		if c == '\n' {
			self.line += 1;
			self.line_start = self.cursor;
		}
		Some(c)
	}

	/// Peek the current character
	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Peek the second character ahead
	fn peek_second(&mut self) -> Option<char> {
		let mut it = self.source_iter.clone();
		it.next()?;
		it.peek().map(|&(_, c)| c)
	}

	/// Byte offset of the next unread character
	fn offset(&self) -> usize {
		let mut it = self.source_iter.clone();
		it.peek().map_or(self.source.len(), |&(i, _)| i)
	}

	/// Scan a string literal
	fn string(&mut self, position: Position) -> Result<TokenType<'a>, LexError> {
		while let Some(c) = self.peek().filter(|&c| c != '"') {
			// Characters become `push constant` operands, which are 16 bits wide.
			if u32::from(c) > u32::from(u16::MAX) {
				return Err(LexError::CharacterOutOfRange { position: self.location(), character: c });
			}
			self.bump();
		}

		self.peek().ok_or(LexError::UnterminatedString { position })?;
		self.bump(); // The closing "
		let value = &self.source[self.start + 1..self.cursor - 1];
		Ok(TokenType::StringConstant(value))
	}

	/// Scan an integer literal
	fn integer(&mut self, position: Position) -> Result<TokenType<'a>, LexError> {
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.bump();
		}

		let literal = &self.source[self.start..self.cursor];
		literal
			.parse::<u16>()
			.map(TokenType::IntConstant)
			.map_err(|_| LexError::IntegerOutOfRange { position, literal: literal.to_string() })
	}

	/// Scan an identifier or keyword
	fn identifier(&mut self) -> TokenType<'a> {
		while self.peek().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
			self.bump();
		}
		let text = &self.source[self.start..self.cursor];
		TokenType::keyword_or_identifier(text)
	}
}

impl<'a> Iterator for Lexer<'a> {
	type Item = Result<Token<'a>, LexError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed || !self.has_more_tokens() {
			return None;
		}
		let token = self.advance();
		self.failed = token.is_err();
		Some(token)
	}
}

/// Scan a whole unit into a vector of tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> { Lexer::new(source).collect() }

#[cfg(test)]
mod tests {
	use super::*;

	fn scan(input: &str, ok: bool) {
		let result = tokenize(input);
		assert!(result.is_ok() == ok, "{input:?} => {result:?}");
	}

	fn types(input: &str) -> Vec<TokenType<'_>> {
		tokenize(input).unwrap().into_iter().map(|token| token.r#type).collect()
	}

	#[test]
	fn scan_tokens() {
		scan("", true);
		scan("(", true);
		scan("(){}", true);
		scan(" ( ) ", true);
		scan("@", false);
		scan("你好", false);
		scan(r#""世界""#, true);
		scan("12345", true);
		scan("user", true);
		scan("return", true);
		scan("!", false);
		scan("#", false);
	}

	#[test]
	fn scan_symbols() {
		// Spaced out so that `/*` does not open a comment.
		let all = "()+-/*<>=&|~;.,[]{}";
		let spaced = all.chars().map(String::from).collect::<Vec<_>>().join(" ");
		let scanned = types(&spaced);
		assert_eq!(scanned.len(), all.chars().count());
		for (c, r#type) in all.chars().zip(scanned) {
			assert_eq!(r#type, TokenType::Symbol(Symbol::from_char(c).unwrap()));
		}
	}

	#[test]
	fn scan_keywords() {
		for word in [
			"class", "constructor", "function", "method", "field", "static", "var", "int", "char", "boolean",
			"void", "true", "false", "null", "this", "let", "do", "if", "else", "while", "return",
		] {
			let keyword = Keyword::lookup(word).unwrap();
			assert_eq!(types(word), vec![TokenType::Keyword(keyword)]);
			assert_eq!(keyword.as_str(), word);
		}
	}

	#[test]
	fn scan_identifiers() {
		assert_eq!(types("x"), vec![TokenType::Identifier("x")]);
		assert_eq!(types("_name"), vec![TokenType::Identifier("_name")]);
		assert_eq!(types("snake_case"), vec![TokenType::Identifier("snake_case")]);
		assert_eq!(types("classes"), vec![TokenType::Identifier("classes")]);
		// Digits are not part of identifiers.
		assert_eq!(types("x1"), vec![TokenType::Identifier("x"), TokenType::IntConstant(1)]);
	}

	#[test]
	fn scan_integers() {
		assert_eq!(types("0"), vec![TokenType::IntConstant(0)]);
		assert_eq!(types("32767"), vec![TokenType::IntConstant(32767)]);
		assert_eq!(types("65535"), vec![TokenType::IntConstant(65535)]);
		assert_eq!(types("007"), vec![TokenType::IntConstant(7)]);
		assert!(matches!(tokenize("65536"), Err(LexError::IntegerOutOfRange { .. })));
		assert!(matches!(tokenize("99999999999999999999"), Err(LexError::IntegerOutOfRange { .. })));
	}

	#[test]
	fn scan_strings() {
		assert_eq!(types(r#""""#), vec![TokenType::StringConstant("")]);
		assert_eq!(types(r#""hello world""#), vec![TokenType::StringConstant("hello world")]);
		assert_eq!(types(r#""a // b""#), vec![TokenType::StringConstant("a // b")]);
		assert!(matches!(tokenize(r#""unterminated"#), Err(LexError::UnterminatedString { .. })));
	}

	#[test]
	fn scan_wide_characters() {
		assert_eq!(types("\"\u{FFFF}\""), vec![TokenType::StringConstant("\u{FFFF}")]);
		let error = tokenize("\"ok \u{1F600}\"").unwrap_err();
		assert_eq!(error, LexError::CharacterOutOfRange { position: Position::new(1, 5), character: '\u{1F600}' });
	}

	#[test]
	fn scan_comments() {
		scan("// single line comment", true);
		scan("/* block comment */", true);
		scan("/** api\n * comment\n */", true);
		assert_eq!(types("1 /* a */ 2 // b\n3"), vec![
			TokenType::IntConstant(1),
			TokenType::IntConstant(2),
			TokenType::IntConstant(3)
		]);
		// Block comments end at the first terminator.
		assert_eq!(types("/* a */ x /* b */"), vec![TokenType::Identifier("x")]);
		assert!(matches!(tokenize("/* unterminated"), Err(LexError::UnterminatedComment { .. })));
		assert!(matches!(tokenize("/*/"), Err(LexError::UnterminatedComment { .. })));
	}

	#[test]
	fn scan_whitespace() {
		scan(" ", true);
		scan("\t", true);
		scan("\r\n", true);
		assert!(tokenize("  \t\r\n  ").unwrap().is_empty());
	}

	#[test]
	fn scan_positions() {
		let tokens = tokenize("class Main {\n  field int x;\n}").unwrap();
		let positions: Vec<_> = tokens.iter().map(|token| (token.position.line, token.position.column)).collect();
		assert_eq!(positions, vec![(1, 1), (1, 7), (1, 12), (2, 3), (2, 9), (2, 13), (2, 14), (3, 1)]);
	}

	#[test]
	fn advance_past_end() {
		let mut lexer = Lexer::new("x  // trailing");
		assert!(lexer.has_more_tokens());
		assert_eq!(lexer.advance().unwrap().r#type, TokenType::Identifier("x"));
		assert!(!lexer.has_more_tokens());
		assert!(matches!(lexer.advance(), Err(LexError::UnexpectedEndOfInput { .. })));
	}

	#[test]
	fn unterminated_comment_is_reported_by_advance() {
		let mut lexer = Lexer::new("x /* open");
		lexer.advance().unwrap();
		assert!(lexer.has_more_tokens());
		let error = lexer.advance().unwrap_err();
		assert_eq!(error, LexError::UnterminatedComment { position: Position::new(1, 3) });
	}

	#[test]
	fn unknown_character_position() {
		let error = tokenize("let x = 1;\nlet y = $;").unwrap_err();
		assert_eq!(error, LexError::UnknownCharacter { position: Position::new(2, 9), character: '$' });
	}

	#[test]
	fn iterator_stops_after_error() {
		let mut lexer = Lexer::new("x /* open");
		assert!(lexer.next().unwrap().is_ok());
		assert!(lexer.next().unwrap().is_err());
		assert!(lexer.next().is_none());
	}
}
