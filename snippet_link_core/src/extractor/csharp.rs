use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ops::Range;

use crate::Extractor;
use crate::FileSystem;
use crate::Fragment;
use crate::QueryOptions;
use crate::Renderer;
use crate::SnippetError;
use crate::SnippetResult;
use crate::directive::strip_prefix_ignore_case;
use crate::fragment::normalize_indentation;
use crate::lexer::CsToken;
use crate::syntax::SyntaxTree;

const EXTENSION: &str = "cs";
const COMMENT_BEGIN: &str = "// begin-snippet: ";
const COMMENT_END: &str = "// end-snippet";

/// Imports snippets from C# source files.
///
/// A snippet is addressed by a `#region NAME` / `#endregion` pair, a
/// `// begin-snippet: NAME` / `// end-snippet` comment pair, or the dotted
/// name of a declaration such as `Outer.Inner.Method`. Whichever of these
/// appears first in the file wins. With `body-only=true`, a declaration
/// match yields only its body.
///
/// Parsed files are cached for the lifetime of the extractor.
pub struct CSharpExtractor<'a> {
	fs: &'a dyn FileSystem,
	cache: HashMap<String, SyntaxTree>,
}

impl<'a> CSharpExtractor<'a> {
	pub fn new(fs: &'a dyn FileSystem) -> Self {
		Self {
			fs,
			cache: HashMap::new(),
		}
	}

	fn tree(&mut self, source: &str) -> SnippetResult<&SyntaxTree> {
		let tree = match self.cache.entry(source.to_string()) {
			Entry::Occupied(entry) => {
				tracing::debug!(source, "reusing parsed source file");
				entry.into_mut()
			}
			Entry::Vacant(entry) => {
				let text = self.fs.read_to_string(source)?;
				tracing::debug!(source, "parsing source file");
				entry.insert(SyntaxTree::parse(text))
			}
		};

		Ok(tree)
	}
}

impl Extractor for CSharpExtractor<'_> {
	fn name(&self) -> &str {
		EXTENSION
	}

	fn preferred_renderer(&self) -> Renderer {
		Renderer::CodeBlock
	}

	fn can_handle(&self, source: &str, _name: &str, _options: &QueryOptions) -> SnippetResult<()> {
		let has_extension = source
			.rsplit_once('.')
			.is_some_and(|(_, extension)| extension.eq_ignore_ascii_case(EXTENSION));

		if !has_extension {
			return Err(SnippetError::UnsupportedSource {
				source_file: source.to_string(),
				extension: EXTENSION,
			});
		}

		if !self.fs.file_exists(source) {
			return Err(SnippetError::SourceNotFound(source.to_string()));
		}

		Ok(())
	}

	fn extract(&mut self, source: &str, name: &str, options: &QueryOptions) -> SnippetResult<Fragment> {
		let body_only = options.get("body-only", false)?;
		self.can_handle(source, name, options)?;

		let tree = self.tree(source)?;
		let Located { span, anchor } = match locate(tree, name, body_only) {
			Ok(located) => located,
			Err(Unmatched::NotFound) => {
				return Err(SnippetError::SnippetNotFound {
					name: name.to_string(),
					source_file: source.to_string(),
				});
			}
			Err(Unmatched::Unclosed) => {
				return Err(SnippetError::MissingClosingMarker {
					name: name.to_string(),
					source_file: source.to_string(),
				});
			}
		};

		let (start_line, end_line) = line_span(tree, &span);
		let content = normalize_indentation(tree.slice(&span), tree.lines().column_of(anchor));

		Ok(Fragment::new(source, name, content, EXTENSION).with_lines(start_line, end_line))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
	Region,
	Comment,
}

/// Something in the file that can open, close or be a snippet, keyed by its
/// byte offset.
#[derive(Debug)]
enum Event<'t> {
	Open {
		kind: MarkerKind,
		label: &'t str,
		marker: usize,
		content_start: usize,
	},
	Close {
		kind: MarkerKind,
		at: usize,
	},
	Declaration(usize),
}

/// The byte range of a snippet and the offset of the token its indentation
/// is measured from.
#[derive(Debug)]
struct Located {
	span: Range<usize>,
	anchor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unmatched {
	NotFound,
	Unclosed,
}

/// Find the byte range of the snippet `name`. The first opening marker or
/// declaration that matches wins. Markers of the same kind nest, so only the
/// close at depth zero ends the snippet.
fn locate(tree: &SyntaxTree, name: &str, body_only: bool) -> Result<Located, Unmatched> {
	let mut open: Option<(MarkerKind, usize, usize)> = None;
	let mut depth = 0usize;

	for (_, event) in events(tree) {
		match event {
			Event::Open {
				kind,
				label,
				marker,
				content_start,
			} => {
				match open {
					None if strip_prefix_ignore_case(label, name).is_some() => {
						open = Some((kind, marker, content_start));
						depth = 1;
					}
					Some((open_kind, ..)) if open_kind == kind => depth += 1,
					_ => {}
				}
			}
			Event::Close { kind, at } => {
				let Some((open_kind, marker, start)) = open else {
					continue;
				};

				if open_kind == kind {
					depth -= 1;
					if depth == 0 {
						return Ok(Located {
							span: start..at,
							anchor: marker,
						});
					}
				}
			}
			Event::Declaration(index) => {
				if open.is_some() {
					continue;
				}

				let declaration = &tree.declarations()[index];
				if !tree.matches_path(declaration, name) {
					continue;
				}

				if !body_only {
					return Ok(Located {
						span: declaration.full.clone(),
						anchor: declaration.anchor,
					});
				}

				if let Some(body) = &declaration.body {
					return Ok(Located {
						span: body.clone(),
						anchor: first_code_offset(tree, body),
					});
				}
			}
		}
	}

	if open.is_some() {
		Err(Unmatched::Unclosed)
	} else {
		Err(Unmatched::NotFound)
	}
}

/// Markers and declarations of `tree`, in document order.
fn events(tree: &SyntaxTree) -> Vec<(usize, Event<'_>)> {
	let mut events: Vec<(usize, Event<'_>)> = Vec::new();

	for token in tree.tokens() {
		let text = tree.slice(&token.span);
		let event = match token.kind {
			CsToken::Directive => region_event(text, token.span.clone()),
			CsToken::LineComment => comment_event(text, token.span.clone()),
			_ => None,
		};

		if let Some(event) = event {
			events.push((token.span.start, event));
		}
	}

	for (index, declaration) in tree.declarations().iter().enumerate() {
		events.push((declaration.anchor, Event::Declaration(index)));
	}

	events.sort_by_key(|(offset, _)| *offset);
	events
}

fn region_event(text: &str, span: Range<usize>) -> Option<Event<'_>> {
	let directive = text.trim_start_matches('#').trim_start();
	let (keyword, label) = directive
		.split_once(char::is_whitespace)
		.unwrap_or((directive, ""));

	if keyword.eq_ignore_ascii_case("region") {
		Some(Event::Open {
			kind: MarkerKind::Region,
			label: label.trim(),
			marker: span.start,
			content_start: span.end,
		})
	} else if keyword.eq_ignore_ascii_case("endregion") {
		Some(Event::Close {
			kind: MarkerKind::Region,
			at: span.start,
		})
	} else {
		None
	}
}

fn comment_event(text: &str, span: Range<usize>) -> Option<Event<'_>> {
	if let Some(label) = strip_prefix_ignore_case(text, COMMENT_BEGIN) {
		return Some(Event::Open {
			kind: MarkerKind::Comment,
			label: label.trim(),
			marker: span.start,
			content_start: span.end,
		});
	}

	strip_prefix_ignore_case(text, COMMENT_END).map(|_| {
		Event::Close {
			kind: MarkerKind::Comment,
			at: span.start,
		}
	})
}

/// Offset of the first non-comment token inside `span`.
fn first_code_offset(tree: &SyntaxTree, span: &Range<usize>) -> usize {
	tree.tokens()
		.iter()
		.find(|token| token.span.start >= span.start && !token.kind.is_trivia())
		.map_or(span.start, |token| token.span.start)
}

/// 0-based first and last lines of the non-blank text in `span`.
fn line_span(tree: &SyntaxTree, span: &Range<usize>) -> (usize, usize) {
	let text = tree.slice(span);
	let leading = text.len() - text.trim_start().len();
	let trailing = text.trim_end().len();
	let lines = tree.lines();

	if trailing <= leading {
		let line = lines.line_of(span.start);
		return (line, line);
	}

	(
		lines.line_of(span.start + leading),
		lines.line_of(span.start + trailing - 1),
	)
}
