use std::fmt;

/// A location in the source text, both components 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
	pub line:   usize,
	pub column: usize,
}

impl Position {
	pub fn new(line: usize, column: usize) -> Self { Self { line, column } }
}

impl Default for Position {
	fn default() -> Self { Self::new(1, 1) }
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "line {}, column {}", self.line, self.column) }
}

/// A token produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
	pub r#type:   TokenType<'a>,
	pub position: Position,
}

impl<'a> Token<'a> {
	pub fn new(r#type: TokenType<'a>, position: Position) -> Self { Self { r#type, position } }
}

/// The lexical categories of Jack. Text payloads borrow from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType<'a> {
	Keyword(Keyword),
	Symbol(Symbol),
	Identifier(&'a str),
	/// Decimal literal, already range-checked against `u16`.
	IntConstant(u16),
	/// Contents between the quotes, no escape processing.
	StringConstant(&'a str),
}

impl<'a> TokenType<'a> {
	pub fn kind(&self) -> TokenKind {
		match self {
			TokenType::Keyword(_) => TokenKind::Keyword,
			TokenType::Symbol(_) => TokenKind::Symbol,
			TokenType::Identifier(_) => TokenKind::Identifier,
			TokenType::IntConstant(_) => TokenKind::IntConstant,
			TokenType::StringConstant(_) => TokenKind::StringConstant,
		}
	}

	pub fn keyword_or_identifier(value: &'a str) -> Self {
		Keyword::lookup(value).map_or(TokenType::Identifier(value), TokenType::Keyword)
	}
}

impl fmt::Display for TokenType<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenType::Keyword(keyword) => write!(f, "'{keyword}'"),
			TokenType::Symbol(symbol) => write!(f, "'{symbol}'"),
			TokenType::Identifier(name) => write!(f, "identifier '{name}'"),
			TokenType::IntConstant(value) => write!(f, "integer constant {value}"),
			TokenType::StringConstant(text) => write!(f, "string constant \"{text}\""),
		}
	}
}

/// Token categories without payload, used when a production only cares about
/// the shape of the next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	Keyword,
	Symbol,
	Identifier,
	IntConstant,
	StringConstant,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			TokenKind::Keyword => "keyword",
			TokenKind::Symbol => "symbol",
			TokenKind::Identifier => "identifier",
			TokenKind::IntConstant => "integer constant",
			TokenKind::StringConstant => "string constant",
		})
	}
}

/// Reserved words of Jack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
	Class,
	Constructor,
	Function,
	Method,
	Field,
	Static,
	Var,
	Int,
	Char,
	Boolean,
	Void,
	True,
	False,
	Null,
	This,
	Let,
	Do,
	If,
	Else,
	While,
	Return,
}

impl Keyword {
	pub fn lookup(value: &str) -> Option<Self> {
		Some(match value {
			"class" => Keyword::Class,
			"constructor" => Keyword::Constructor,
			"function" => Keyword::Function,
			"method" => Keyword::Method,
			"field" => Keyword::Field,
			"static" => Keyword::Static,
			"var" => Keyword::Var,
			"int" => Keyword::Int,
			"char" => Keyword::Char,
			"boolean" => Keyword::Boolean,
			"void" => Keyword::Void,
			"true" => Keyword::True,
			"false" => Keyword::False,
			"null" => Keyword::Null,
			"this" => Keyword::This,
			"let" => Keyword::Let,
			"do" => Keyword::Do,
			"if" => Keyword::If,
			"else" => Keyword::Else,
			"while" => Keyword::While,
			"return" => Keyword::Return,
			_ => return None,
		})
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Keyword::Class => "class",
			Keyword::Constructor => "constructor",
			Keyword::Function => "function",
			Keyword::Method => "method",
			Keyword::Field => "field",
			Keyword::Static => "static",
			Keyword::Var => "var",
			Keyword::Int => "int",
			Keyword::Char => "char",
			Keyword::Boolean => "boolean",
			Keyword::Void => "void",
			Keyword::True => "true",
			Keyword::False => "false",
			Keyword::Null => "null",
			Keyword::This => "this",
			Keyword::Let => "let",
			Keyword::Do => "do",
			Keyword::If => "if",
			Keyword::Else => "else",
			Keyword::While => "while",
			Keyword::Return => "return",
		}
	}
}

impl fmt::Display for Keyword {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Single-character punctuation and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
	/// `(`
	LeftParen,
	/// `)`
	RightParen,
	/// `{`
	LeftBrace,
	/// `}`
	RightBrace,
	/// `[`
	LeftBracket,
	/// `]`
	RightBracket,
	/// `.`
	Dot,
	/// `,`
	Comma,
	/// `;`
	Semicolon,
	/// `+`
	Plus,
	/// `-`
	Minus,
	/// `*`
	Star,
	/// `/`
	Slash,
	/// `&`
	Ampersand,
	/// `|`
	Pipe,
	/// `<`
	Less,
	/// `>`
	Greater,
	/// `=`
	Equal,
	/// `~`
	Tilde,
}

impl Symbol {
	#[rustfmt::skip]
	pub fn from_char(c: char) -> Option<Self> {
		Some(match c {
			'(' => Symbol::LeftParen,
			')' => Symbol::RightParen,
			'{' => Symbol::LeftBrace,
			'}' => Symbol::RightBrace,
			'[' => Symbol::LeftBracket,
			']' => Symbol::RightBracket,
			'.' => Symbol::Dot,
			',' => Symbol::Comma,
			';' => Symbol::Semicolon,
			'+' => Symbol::Plus,
			'-' => Symbol::Minus,
			'*' => Symbol::Star,
			'/' => Symbol::Slash,
			'&' => Symbol::Ampersand,
			'|' => Symbol::Pipe,
			'<' => Symbol::Less,
			'>' => Symbol::Greater,
			'=' => Symbol::Equal,
			'~' => Symbol::Tilde,
			_ => return None,
		})
	}

	pub fn as_char(self) -> char {
		match self {
			Symbol::LeftParen => '(',
			Symbol::RightParen => ')',
			Symbol::LeftBrace => '{',
			Symbol::RightBrace => '}',
			Symbol::LeftBracket => '[',
			Symbol::RightBracket => ']',
			Symbol::Dot => '.',
			Symbol::Comma => ',',
			Symbol::Semicolon => ';',
			Symbol::Plus => '+',
			Symbol::Minus => '-',
			Symbol::Star => '*',
			Symbol::Slash => '/',
			Symbol::Ampersand => '&',
			Symbol::Pipe => '|',
			Symbol::Less => '<',
			Symbol::Greater => '>',
			Symbol::Equal => '=',
			Symbol::Tilde => '~',
		}
	}
}

impl fmt::Display for Symbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_char()) }
}
