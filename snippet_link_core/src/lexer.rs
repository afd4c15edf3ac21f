use std::ops::Range;

use logos::Lexer;
use logos::Logos;

/// Tokens of C# source text.
///
/// Only the distinctions the declaration parser needs are kept: comments and
/// preprocessor lines are trivia, literals are opaque, and most operators
/// collapse into [`CsToken::Operator`].
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f\u{FEFF}]+")]
pub enum CsToken {
	#[regex(r"//[^\n]*", allow_greedy = true)]
	LineComment,
	#[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
	BlockComment,
	/// A preprocessor line such as `#region Name` or `#endregion`.
	#[regex(r"#[ \t]*[a-zA-Z]+[^\n]*", allow_greedy = true)]
	Directive,

	#[regex(r#""([^"\\\n]|\\.)*""#)]
	#[regex(r#"\$"([^"\\\n]|\\.)*""#)]
	#[regex(r#"(@|\$@|@\$)"([^"]|"")*""#)]
	#[regex(r#"\$*""""*"#, raw_string)]
	#[regex(r"'([^'\\\n]|\\.)+'")]
	Literal,
	#[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9][0-9a-zA-Z_]*)?")]
	Number,
	#[regex(r"@?[\p{L}_][\p{L}\p{N}_]*")]
	Ident,

	#[token("{")]
	BraceOpen,
	#[token("}")]
	BraceClose,
	#[token("(")]
	ParenOpen,
	#[token(")")]
	ParenClose,
	#[token("[")]
	BracketOpen,
	#[token("]")]
	BracketClose,
	#[token("<")]
	AngleOpen,
	#[token(">")]
	AngleClose,
	#[token(";")]
	Semicolon,
	#[token(",")]
	Comma,
	#[token(".")]
	Dot,
	#[token(":")]
	Colon,
	#[token("~")]
	Tilde,
	#[token("=")]
	Assign,
	#[token("=>")]
	Arrow,
	#[regex(r"==|!=|<=|>=|\+=|-=|\*=|/=|%=|&=|\|=|\^=|\?\?=|<<=|&&|\|\||\+\+|--|<<|\?\?|->|::")]
	#[regex(r"[+\-*/%&|^!?]")]
	Operator,
}

/// Consume a raw string literal (`"""..."""`, optionally `$`-prefixed) up to
/// a closing run of the same number of quotes.
fn raw_string(lex: &mut Lexer<'_, CsToken>) -> bool {
	let quotes = lex.slice().trim_start_matches('$').len();
	let closing = "\"".repeat(quotes);

	match lex.remainder().find(&closing) {
		Some(index) => {
			lex.bump(index + quotes);
			true
		}
		None => false,
	}
}

impl CsToken {
	pub fn is_trivia(self) -> bool {
		matches!(self, Self::LineComment | Self::BlockComment | Self::Directive)
	}

	pub fn is_comment(self) -> bool {
		matches!(self, Self::LineComment | Self::BlockComment)
	}
}

/// A token with its byte span in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: CsToken,
	pub span: Range<usize>,
}

/// Tokenize C# source text. Characters the lexer does not recognize become
/// [`CsToken::Operator`] tokens so the stream never has gaps in code.
pub fn tokenize(source: &str) -> Vec<Token> {
	CsToken::lexer(source)
		.spanned()
		.map(|(kind, span)| {
			Token {
				kind: kind.unwrap_or(CsToken::Operator),
				span,
			}
		})
		.collect()
}

/// Byte offsets of line starts, for mapping offsets to 0-indexed lines.
#[derive(Debug, Clone)]
pub struct LineTable {
	/// `line_starts[0]` is always 0.
	line_starts: Vec<usize>,
}

impl LineTable {
	pub fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (index, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(index + 1);
			}
		}
		Self { line_starts }
	}

	/// The 0-indexed line containing `offset`.
	pub fn line_of(&self, offset: usize) -> usize {
		match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		}
	}

	/// The byte offset at which `line` starts.
	pub fn line_start(&self, line: usize) -> usize {
		self.line_starts.get(line).copied().unwrap_or(0)
	}

	/// Byte offset of the start of the line holding `offset`.
	pub fn start_of_line_at(&self, offset: usize) -> usize {
		self.line_start(self.line_of(offset))
	}

	/// Byte distance from the start of its line to `offset`.
	pub fn column_of(&self, offset: usize) -> usize {
		offset - self.start_of_line_at(offset)
	}
}
