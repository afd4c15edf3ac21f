use crate::BenchmarkExtractor;
use crate::CSharpExtractor;
use crate::Directive;
use crate::Extractor;
use crate::FileSystem;
use crate::LineError;
use crate::Renderer;
use crate::SnippetError;
use crate::SnippetResult;
use crate::directive::END_MARKER;
use crate::directive::is_begin_marker;
use crate::directive::is_end_marker;

const FENCE: &str = "```";

/// Rewrites the managed regions of a document.
///
/// Each `<!-- begin-snippet: ... -->` line outside a fenced code block is
/// resolved to a rendered fragment, and everything up to the next
/// `<!-- end-snippet -->` line is replaced by it. Extractors live as long as
/// the engine, so one engine should be reused for a whole run to share parse
/// caches between documents.
pub struct DocumentEngine<'a> {
	extractors: Vec<Box<dyn Extractor + 'a>>,
}

impl Default for DocumentEngine<'_> {
	fn default() -> Self {
		Self::new()
	}
}

impl<'a> DocumentEngine<'a> {
	/// An engine with no extractors.
	pub fn new() -> Self {
		Self { extractors: vec![] }
	}

	/// An engine with the built-in extractors registered in probing order:
	/// C# source files first, then BenchmarkDotNet reports.
	pub fn with_defaults(fs: &'a dyn FileSystem) -> Self {
		let mut engine = Self::new();
		engine
			.register(CSharpExtractor::new(fs))
			.register(BenchmarkExtractor::new(fs));
		engine
	}

	/// Append an extractor. Extractors are probed in registration order.
	pub fn register(&mut self, extractor: impl Extractor + 'a) -> &mut Self {
		self.extractors.push(Box::new(extractor));
		self
	}

	pub fn extractor_names(&self) -> Vec<&str> {
		self.extractors.iter().map(|extractor| extractor.name()).collect()
	}

	/// Rewrite `input` into `output`.
	///
	/// Returns whether any directive was resolved. Every failing directive is
	/// collected and reported together as [`SnippetError::Document`]. Every
	/// kept line keeps its own terminator, and rendered text uses the
	/// terminator of its begin marker line.
	pub fn process(&mut self, input: &str, output: &mut String) -> SnippetResult<bool> {
		let lines: Vec<(&str, &str)> = input.split_inclusive('\n').map(split_terminator).collect();
		let mut buffer = String::with_capacity(input.len());
		let mut errors = Vec::new();
		let mut in_fence = false;
		let mut changed = false;
		let mut index = 0;

		while index < lines.len() {
			let (line, terminator) = lines[index];
			let trimmed = line.trim();
			index += 1;

			buffer.push_str(line);
			buffer.push_str(terminator);

			if trimmed.starts_with(FENCE) {
				in_fence = !in_fence;
				continue;
			}

			if in_fence || !is_begin_marker(trimmed) {
				continue;
			}

			let line_number = index;
			let rendered = match self.render(trimmed) {
				Ok(rendered) => rendered,
				Err(error) => {
					tracing::warn!(line = line_number, %error, "failed to resolve snippet");
					errors.push(LineError {
						line: line_number,
						error,
					});
					continue;
				}
			};

			let Some(offset) = lines[index..].iter().position(|(line, _)| is_end_marker(line.trim())) else {
				errors.push(LineError {
					line: line_number,
					error: SnippetError::MissingEndMarker(line_number),
				});
				continue;
			};

			if terminator == "\n" {
				buffer.push_str(&rendered);
			} else {
				buffer.push_str(&rendered.replace('\n', terminator));
			}

			let (_, end_terminator) = lines[index + offset];
			buffer.push_str(END_MARKER);
			buffer.push_str(end_terminator);
			index += offset + 1;
			changed = true;
		}

		if !errors.is_empty() {
			return Err(SnippetError::Document(errors));
		}

		output.push_str(&buffer);
		Ok(changed)
	}

	/// Resolve one directive line into the text placed between its markers.
	pub fn render(&mut self, line: &str) -> SnippetResult<String> {
		let directive = Directive::parse(line)?;
		let mut rendered = String::new();
		self.resolve(&directive, &mut rendered)?;
		Ok(rendered)
	}

	/// Extract and render the snippet `directive` points at.
	pub fn resolve(&mut self, directive: &Directive, output: &mut String) -> SnippetResult<()> {
		let importer_options = directive.importer_options();
		let pinned_renderer = directive
			.formatter
			.as_ref()
			.map(|name| Renderer::from_name(name).ok_or_else(|| SnippetError::UnknownFormatter(name.clone())))
			.transpose()?;

		let extractor = self.select_extractor(directive)?;
		let renderer = pinned_renderer.unwrap_or_else(|| extractor.preferred_renderer());

		tracing::debug!(
			source = %directive.source,
			name = %directive.name,
			importer = extractor.name(),
			formatter = renderer.name(),
			"resolving snippet"
		);

		let fragment = extractor.extract(&directive.source, &directive.name, &importer_options)?;
		renderer.write(&fragment, &directive.formatter_options(), output)
	}

	/// The pinned extractor, or the first one whose probe succeeds.
	fn select_extractor(&mut self, directive: &Directive) -> SnippetResult<&mut (dyn Extractor + 'a)> {
		if let Some(name) = &directive.importer {
			return self
				.extractors
				.iter_mut()
				.find(|extractor| extractor.name().eq_ignore_ascii_case(name))
				.map(|extractor| &mut **extractor)
				.ok_or_else(|| SnippetError::UnknownImporter(name.clone()));
		}

		let options = directive.importer_options();
		let mut reasons = Vec::new();
		let mut selected = None;

		for (position, extractor) in self.extractors.iter().enumerate() {
			match extractor.can_handle(&directive.source, &directive.name, &options) {
				Ok(()) => {
					selected = Some(position);
					break;
				}
				Err(error) => {
					tracing::debug!(importer = extractor.name(), %error, "importer declined source");
					reasons.push(error.to_string());
				}
			}
		}

		match selected {
			Some(position) => Ok(&mut *self.extractors[position]),
			None => {
				Err(SnippetError::NoImporter {
					source_file: directive.source.clone(),
					reasons,
				})
			}
		}
	}
}

/// Split a line from `split_inclusive('\n')` into its text and terminator.
fn split_terminator(line: &str) -> (&str, &str) {
	let text = line
		.strip_suffix("\r\n")
		.or_else(|| line.strip_suffix('\n'))
		.unwrap_or(line);

	(text, &line[text.len()..])
}
