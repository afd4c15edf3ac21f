use std::ops::Range;

use crate::lexer::CsToken;
use crate::lexer::LineTable;
use crate::lexer::Token;
use crate::lexer::tokenize;

const TYPE_KEYWORDS: &[&str] = &["class", "struct", "interface", "enum", "record"];

/// Identifiers that may precede `(` in a member header without naming a
/// method.
const KEYWORDS: &[&str] = &[
	"base", "catch", "checked", "default", "fixed", "for", "foreach", "if", "lock", "nameof",
	"new", "return", "sizeof", "stackalloc", "switch", "this", "throw", "typeof", "unchecked",
	"using", "when", "where", "while",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
	Namespace,
	Type,
	Method,
	Constructor,
	Property,
	Delegate,
}

/// A declaration that can appear in a dotted snippet path, or a namespace
/// that interrupts one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	pub kind: DeclarationKind,
	pub name: String,
	pub parent: Option<usize>,
	/// Byte range of the whole declaration, from the start of its first line
	/// (attributes and leading comments included) to its last token.
	pub full: Range<usize>,
	/// Byte offset of the first token of the declaration, attributes
	/// included. Used to order declarations against snippet markers.
	pub anchor: usize,
	/// Byte range of the body contents, if the declaration has a non-empty
	/// body.
	pub body: Option<Range<usize>>,
}

impl Declaration {
	pub fn is_addressable(&self) -> bool {
		self.kind != DeclarationKind::Namespace
	}
}

/// A parsed C# file: its tokens and the declarations found in it, in
/// document order.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
	text: String,
	tokens: Vec<Token>,
	lines: LineTable,
	declarations: Vec<Declaration>,
}

impl SyntaxTree {
	pub fn parse(text: impl Into<String>) -> Self {
		let text = text.into();
		let tokens = tokenize(&text);
		let lines = LineTable::new(&text);
		let declarations = DeclarationParser::new(&text, &tokens, &lines).parse();

		Self {
			text,
			tokens,
			lines,
			declarations,
		}
	}

	pub fn tokens(&self) -> &[Token] {
		&self.tokens
	}

	pub fn lines(&self) -> &LineTable {
		&self.lines
	}

	pub fn declarations(&self) -> &[Declaration] {
		&self.declarations
	}

	pub fn slice(&self, span: &Range<usize>) -> &str {
		&self.text[span.clone()]
	}

	/// Whether `declaration` is addressed by the dotted `path`, comparing
	/// names case-insensitively from the last segment outwards.
	pub fn matches_path(&self, declaration: &Declaration, path: &str) -> bool {
		let mut current = Some(declaration);

		for segment in path.rsplit('.') {
			let Some(node) = current else {
				return false;
			};

			if !node.is_addressable() || !node.name.eq_ignore_ascii_case(segment) {
				return false;
			}

			current = node.parent.map(|index| &self.declarations[index]);
		}

		true
	}
}

/// Recursive-descent walk over member declarations. Method and accessor
/// bodies are skipped rather than parsed.
struct DeclarationParser<'a> {
	text: &'a str,
	tokens: &'a [Token],
	lines: &'a LineTable,
	/// Indices into `tokens` of the non-trivia tokens.
	code: Vec<usize>,
	cursor: usize,
	declarations: Vec<Declaration>,
}

/// How a member header ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
	Brace,
	Semicolon,
	Arrow,
	Assign,
	End,
}

impl<'a> DeclarationParser<'a> {
	fn new(text: &'a str, tokens: &'a [Token], lines: &'a LineTable) -> Self {
		let code = tokens
			.iter()
			.enumerate()
			.filter(|(_, token)| !token.kind.is_trivia())
			.map(|(index, _)| index)
			.collect();

		Self {
			text,
			tokens,
			lines,
			code,
			cursor: 0,
			declarations: vec![],
		}
	}

	fn parse(mut self) -> Vec<Declaration> {
		self.parse_members(None, false);
		self.declarations
	}

	fn kind_at(&self, position: usize) -> Option<CsToken> {
		self.code
			.get(position)
			.map(|&index| self.tokens[index].kind)
	}

	fn text_at(&self, position: usize) -> &'a str {
		self.code
			.get(position)
			.map_or("", |&index| &self.text[self.tokens[index].span.clone()])
	}

	fn is_ident(&self, position: usize, word: &str) -> bool {
		self.kind_at(position) == Some(CsToken::Ident) && self.text_at(position) == word
	}

	fn token(&self, position: usize) -> &'a Token {
		&self.tokens[self.code[position]]
	}

	/// Parse members until the closing brace of the enclosing block (when
	/// `in_block`) or the end of input.
	fn parse_members(&mut self, parent: Option<usize>, in_block: bool) {
		while let Some(kind) = self.kind_at(self.cursor) {
			if kind == CsToken::BraceClose {
				self.cursor += 1;

				if in_block {
					return;
				}

				continue;
			}

			self.parse_member(parent);
		}
	}

	fn parse_member(&mut self, parent: Option<usize>) {
		let start = self.cursor;

		while self.kind_at(self.cursor) == Some(CsToken::BracketOpen) {
			self.cursor = self.skip_balanced(self.cursor, CsToken::BracketOpen, CsToken::BracketClose) + 1;
		}

		let header_start = self.cursor;
		let (header_end, terminator) = self.scan_header(header_start);
		let header = header_start..header_end;
		let first_paren = self.first_top_level(&header, CsToken::ParenOpen);
		let before_paren = header_start..first_paren.unwrap_or(header_end);

		if let Some(keyword) = self.find_ident(&before_paren, &["namespace"]) {
			self.parse_namespace(parent, start, keyword, header_end, terminator);
			return;
		}

		if let Some(keyword) = self.find_ident(&before_paren, TYPE_KEYWORDS) {
			if let Some(name_at) = self.type_name_after(keyword) {
				self.parse_type(parent, start, keyword, name_at, header_end, terminator);
				return;
			}
		}

		if self.find_ident(&before_paren, &["event"]).is_some()
			|| terminator == Terminator::Assign
		{
			self.skip_member(header_end, terminator);
			return;
		}

		if self.find_ident(&before_paren, &["delegate"]).is_some() {
			let name = self.method_name(&header, parent);
			let end = self.skip_member(header_end, terminator);
			if let Some(name) = name {
				self.push(DeclarationKind::Delegate, name, parent, start, end, None);
			}
			return;
		}

		if first_paren.is_some() {
			let name = self.method_name(&header, parent);
			let (end, body) = self.parse_body(header_end, terminator);
			if let Some(name) = name {
				let kind = if parent.is_some_and(|index| self.declarations[index].name == name) {
					DeclarationKind::Constructor
				} else {
					DeclarationKind::Method
				};
				self.push(kind, name, parent, start, end, body);
			}
			return;
		}

		if matches!(terminator, Terminator::Brace | Terminator::Arrow) {
			let name = self.property_name(&header);
			let (mut end, body) = self.parse_body(header_end, terminator);

			if terminator == Terminator::Brace && self.kind_at(self.cursor) == Some(CsToken::Assign) {
				end = self.skip_member(self.cursor, Terminator::Assign);
			}

			if let Some(name) = name {
				self.push(DeclarationKind::Property, name, parent, start, end, body);
			}
			return;
		}

		self.skip_member(header_end, terminator);
	}

	fn parse_namespace(
		&mut self,
		parent: Option<usize>,
		start: usize,
		keyword: usize,
		header_end: usize,
		terminator: Terminator,
	) {
		let name: String = (keyword + 1..header_end).map(|position| self.text_at(position)).collect();
		let index = self.push(DeclarationKind::Namespace, name, parent, start, header_end, None);

		match terminator {
			Terminator::Brace => {
				self.cursor = header_end + 1;
				self.parse_members(Some(index), true);
			}
			_ => {
				self.cursor = header_end + 1;
				self.parse_members(Some(index), false);
			}
		}

		let last = self.cursor.saturating_sub(1).max(header_end);
		self.declarations[index].full.end = self.end_offset(last.min(self.code.len().saturating_sub(1)));
	}

	fn parse_type(
		&mut self,
		parent: Option<usize>,
		start: usize,
		keyword: usize,
		name_at: usize,
		header_end: usize,
		terminator: Terminator,
	) {
		let name = self.text_at(name_at).trim_start_matches('@').to_string();
		let index = self.push(DeclarationKind::Type, name, parent, start, header_end, None);

		if terminator != Terminator::Brace {
			let end = self.skip_member(header_end, terminator);
			self.declarations[index].full.end = self.end_offset(end);
			return;
		}

		let close = if self.is_ident(keyword, "enum") {
			let close = self.skip_balanced(header_end, CsToken::BraceOpen, CsToken::BraceClose);
			self.cursor = close + 1;
			close
		} else {
			self.cursor = header_end + 1;
			self.parse_members(Some(index), true);
			self.cursor.saturating_sub(1)
		};

		let mut end = close;
		if self.kind_at(self.cursor) == Some(CsToken::Semicolon) {
			end = self.cursor;
			self.cursor += 1;
		}

		self.declarations[index].full.end = self.end_offset(end);
		self.declarations[index].body = self.inner_span(header_end, close);
	}

	/// Consume a member body and return the position of its last token and
	/// the byte range of its contents.
	fn parse_body(&mut self, header_end: usize, terminator: Terminator) -> (usize, Option<Range<usize>>) {
		match terminator {
			Terminator::Brace => {
				let close = self.skip_balanced(header_end, CsToken::BraceOpen, CsToken::BraceClose);
				self.cursor = close + 1;
				(close, self.inner_span(header_end, close))
			}
			Terminator::Arrow => {
				let end = self.skip_member(header_end, terminator);
				let has_semicolon = self.kind_at(end) == Some(CsToken::Semicolon);
				let last = if has_semicolon { end.saturating_sub(1) } else { end };
				let body = (last > header_end).then(|| {
					self.token(header_end + 1).span.start..self.token(last).span.end
				});
				(end, body)
			}
			_ => (self.skip_member(header_end, terminator), None),
		}
	}

	/// Consume the rest of a member whose header ended at `header_end` and
	/// return the position of its final token.
	fn skip_member(&mut self, header_end: usize, terminator: Terminator) -> usize {
		let end = match terminator {
			Terminator::Brace => self.skip_balanced(header_end, CsToken::BraceOpen, CsToken::BraceClose),
			Terminator::Semicolon => header_end,
			Terminator::End => header_end.saturating_sub(1),
			Terminator::Arrow | Terminator::Assign => self.scan_to_semicolon(header_end + 1),
		};

		self.cursor = (end + 1).max(self.cursor);
		end
	}

	/// Scan a member header from `start` to the first `{`, `;`, `=>` or `=`
	/// outside parentheses and brackets.
	fn scan_header(&self, start: usize) -> (usize, Terminator) {
		let mut depth = 0usize;
		let mut position = start;

		while let Some(kind) = self.kind_at(position) {
			match kind {
				CsToken::ParenOpen | CsToken::BracketOpen => depth += 1,
				CsToken::ParenClose | CsToken::BracketClose => depth = depth.saturating_sub(1),
				CsToken::BraceOpen if depth == 0 => return (position, Terminator::Brace),
				CsToken::BraceClose if depth == 0 => return (position, Terminator::End),
				CsToken::Semicolon if depth == 0 => return (position, Terminator::Semicolon),
				CsToken::Arrow if depth == 0 => return (position, Terminator::Arrow),
				CsToken::Assign if depth == 0 => return (position, Terminator::Assign),
				_ => {}
			}
			position += 1;
		}

		(position, Terminator::End)
	}

	/// Position of the `;` ending an expression that starts at `start`, or of
	/// the last token before an unbalanced closing brace.
	fn scan_to_semicolon(&self, start: usize) -> usize {
		let mut depth = 0usize;
		let mut position = start;

		while let Some(kind) = self.kind_at(position) {
			match kind {
				CsToken::ParenOpen | CsToken::BracketOpen | CsToken::BraceOpen => depth += 1,
				CsToken::BraceClose if depth == 0 => return position.saturating_sub(1),
				CsToken::ParenClose | CsToken::BracketClose | CsToken::BraceClose => {
					depth = depth.saturating_sub(1);
				}
				CsToken::Semicolon if depth == 0 => return position,
				_ => {}
			}
			position += 1;
		}

		position.saturating_sub(1)
	}

	/// Position of the token closing the group opened at `open`.
	fn skip_balanced(&self, open: usize, opening: CsToken, closing: CsToken) -> usize {
		let mut depth = 0usize;
		let mut position = open;

		while let Some(kind) = self.kind_at(position) {
			if kind == opening {
				depth += 1;
			} else if kind == closing {
				depth = depth.saturating_sub(1);
				if depth == 0 {
					return position;
				}
			}
			position += 1;
		}

		position.saturating_sub(1)
	}

	fn first_top_level(&self, range: &Range<usize>, wanted: CsToken) -> Option<usize> {
		self.top_level(range).find(|&position| self.kind_at(position) == Some(wanted))
	}

	/// Positions in `range` outside any parentheses or brackets.
	fn top_level(&self, range: &Range<usize>) -> impl Iterator<Item = usize> + '_ {
		let mut depth = 0usize;

		range.clone().filter(move |&position| {
			match self.kind_at(position) {
				Some(CsToken::ParenOpen | CsToken::BracketOpen) => {
					depth += 1;
					depth == 1
				}
				Some(CsToken::ParenClose | CsToken::BracketClose) => {
					depth = depth.saturating_sub(1);
					false
				}
				_ => depth == 0,
			}
		})
	}

	fn find_ident(&self, range: &Range<usize>, words: &[&str]) -> Option<usize> {
		self.top_level(range)
			.find(|&position| words.iter().any(|word| self.is_ident(position, word)))
	}

	/// The identifier naming a type after its keyword, skipping the
	/// `class`/`struct` of `record class` and `record struct`.
	fn type_name_after(&self, keyword: usize) -> Option<usize> {
		let mut position = keyword + 1;

		if self.is_ident(keyword, "record")
			&& (self.is_ident(position, "class") || self.is_ident(position, "struct"))
		{
			position += 1;
		}

		(self.kind_at(position) == Some(CsToken::Ident)
			&& !TYPE_KEYWORDS.contains(&self.text_at(position)))
		.then_some(position)
	}

	/// The name of a method, constructor or delegate: the identifier in front
	/// of the first top-level parameter list it can belong to.
	fn method_name(&self, header: &Range<usize>, parent: Option<usize>) -> Option<String> {
		let parens: Vec<usize> = self
			.top_level(header)
			.filter(|&position| self.kind_at(position) == Some(CsToken::ParenOpen))
			.collect();

		for paren in parens {
			let Some(name_at) = self.name_before(paren, header.start) else {
				continue;
			};

			let name = self.text_at(name_at);
			if KEYWORDS.contains(&name) {
				continue;
			}

			let previous = (name_at > header.start).then(|| name_at - 1);
			if previous.is_some_and(|position| {
				self.is_ident(position, "operator") || self.kind_at(position) == Some(CsToken::Tilde)
			}) {
				return None;
			}

			let name = name.trim_start_matches('@').to_string();
			let qualified_start = self.qualified_start(name_at, header.start);
			let is_constructor = parent.is_some_and(|index| {
				let declaration = &self.declarations[index];
				declaration.kind == DeclarationKind::Type && declaration.name == name
			});

			if qualified_start == header.start && !is_constructor {
				return None;
			}

			return Some(name);
		}

		None
	}

	/// The identifier directly before `paren`, stepping over a generic
	/// argument list.
	fn name_before(&self, paren: usize, floor: usize) -> Option<usize> {
		if paren <= floor {
			return None;
		}

		let mut position = paren - 1;

		if self.kind_at(position) == Some(CsToken::AngleClose) {
			let mut depth = 0usize;
			loop {
				match self.kind_at(position) {
					Some(CsToken::AngleClose) => depth += 1,
					Some(CsToken::AngleOpen) => {
						depth -= 1;
						if depth == 0 {
							break;
						}
					}
					_ => {}
				}
				if position <= floor {
					return None;
				}
				position -= 1;
			}
			if position <= floor {
				return None;
			}
			position -= 1;
		}

		(self.kind_at(position) == Some(CsToken::Ident)).then_some(position)
	}

	/// Start of a dotted name chain ending at `name_at`.
	fn qualified_start(&self, name_at: usize, floor: usize) -> usize {
		let mut position = name_at;

		while position >= floor + 2
			&& self.kind_at(position - 1) == Some(CsToken::Dot)
			&& self.kind_at(position - 2) == Some(CsToken::Ident)
		{
			position -= 2;
		}

		position
	}

	/// The property name: the last identifier of the header. Indexers and
	/// keyword-only headers have none.
	fn property_name(&self, header: &Range<usize>) -> Option<String> {
		let last = header.end.checked_sub(1).filter(|&last| last >= header.start)?;

		if self.kind_at(last) != Some(CsToken::Ident) || last == header.start {
			return None;
		}

		let name = self.text_at(last);
		if name == "this" || KEYWORDS.contains(&name) {
			return None;
		}

		Some(name.trim_start_matches('@').to_string())
	}

	/// Byte range strictly inside the braces at `open` and `close`, or `None`
	/// when there is no code between them.
	fn inner_span(&self, open: usize, close: usize) -> Option<Range<usize>> {
		if close <= open + 1 {
			return None;
		}

		let open_token = self.code[open];
		let close_token = self.code[close];
		let first = &self.tokens[open_token + 1];
		let last = &self.tokens[close_token - 1];
		let start = if self.lines.line_of(first.span.start) == self.lines.line_of(self.tokens[open_token].span.start) {
			first.span.start
		} else {
			self.lines.start_of_line_at(first.span.start)
		};

		Some(start..last.span.end)
	}

	/// Byte offset where the token at `position` ends, extended over a
	/// comment on the same line.
	fn end_offset(&self, position: usize) -> usize {
		let Some(&index) = self.code.get(position) else {
			return self.text.len();
		};

		let token = &self.tokens[index];
		let line = self.lines.line_of(token.span.start);

		match self.tokens.get(index + 1) {
			Some(next) if next.kind.is_comment() && self.lines.line_of(next.span.start) == line => next.span.end,
			_ => token.span.end,
		}
	}

	/// Byte offset where the member starting at code position `start` begins,
	/// including comment lines directly above it.
	fn start_offset(&self, start: usize) -> usize {
		let Some(&first) = self.code.get(start) else {
			return self.text.len();
		};

		let mut index = first;
		let mut line = self.lines.line_of(self.tokens[first].span.start);

		while index > 0 {
			let previous = &self.tokens[index - 1];
			let previous_line = self.lines.line_of(previous.span.start);
			let previous_end_line = self.lines.line_of(previous.span.end.saturating_sub(1));

			if !previous.kind.is_comment() || previous_end_line + 1 < line || !self.starts_line(index - 1) {
				break;
			}

			index -= 1;
			line = previous_line;
		}

		let token = &self.tokens[index];
		if self.starts_line(index) {
			self.lines.start_of_line_at(token.span.start)
		} else {
			token.span.start
		}
	}

	/// Whether the token at `index` is the first token on its line.
	fn starts_line(&self, index: usize) -> bool {
		let line = self.lines.line_of(self.tokens[index].span.start);
		index == 0 || self.lines.line_of(self.tokens[index - 1].span.end.saturating_sub(1)) < line
	}

	fn push(
		&mut self,
		kind: DeclarationKind,
		name: String,
		parent: Option<usize>,
		start: usize,
		end: usize,
		body: Option<Range<usize>>,
	) -> usize {
		let full = self.start_offset(start)..self.end_offset(end);
		let anchor = self
			.code
			.get(start)
			.map_or(self.text.len(), |&index| self.tokens[index].span.start);
		self.declarations.push(Declaration {
			kind,
			name,
			parent,
			full,
			anchor,
			body,
		});
		self.declarations.len() - 1
	}
}
