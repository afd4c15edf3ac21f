use crate::DirectiveError;
use crate::QueryOptions;

/// The opening marker of a managed region.
pub const BEGIN_MARKER: &str = "<!-- begin-snippet: ";
/// The closing marker of a managed region.
pub const END_MARKER: &str = "<!-- end-snippet -->";

const COMMENT_CLOSE: &str = "-->";

/// A decoded `<!-- begin-snippet: SOURCE NAME (PARAMS) -->` line.
///
/// `source` and `name` keep the case they were written in. The optional
/// `importer` and `formatter` pin the extractor and renderer by name, each
/// with an optional raw query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
	pub source: String,
	pub name: String,
	pub importer: Option<String>,
	pub importer_query: Option<String>,
	pub formatter: Option<String>,
	pub formatter_query: Option<String>,
}

impl Directive {
	pub fn new(source: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			name: name.into(),
			importer: None,
			importer_query: None,
			formatter: None,
			formatter_query: None,
		}
	}

	#[must_use]
	pub fn with_importer(mut self, importer: impl Into<String>, query: Option<&str>) -> Self {
		self.importer = Some(importer.into());
		self.importer_query = query.map(String::from);
		self
	}

	#[must_use]
	pub fn with_formatter(mut self, formatter: impl Into<String>, query: Option<&str>) -> Self {
		self.formatter = Some(formatter.into());
		self.formatter_query = query.map(String::from);
		self
	}

	/// Options handed to the extractor.
	pub fn importer_options(&self) -> QueryOptions {
		self.importer_query
			.as_deref()
			.map(QueryOptions::parse)
			.unwrap_or_default()
	}

	/// Options handed to the renderer.
	pub fn formatter_options(&self) -> QueryOptions {
		self.formatter_query
			.as_deref()
			.map(QueryOptions::parse)
			.unwrap_or_default()
	}

	/// Decode a single marker line. The line is expected to be trimmed by the
	/// caller.
	pub fn parse(input: &str) -> Result<Self, DirectiveError> {
		let remainder = strip_prefix_ignore_case(input, BEGIN_MARKER).ok_or(DirectiveError::MissingPrefix)?;

		if !remainder.ends_with(COMMENT_CLOSE) {
			return Err(DirectiveError::MissingSuffix);
		}

		if !matches!(remainder.find(' '), Some(index) if index > 0) {
			return Err(DirectiveError::MissingSource);
		}

		let remainder = remainder[..remainder.len() - COMMENT_CLOSE.len()].trim();
		let (source, remainder) = remainder.split_once(' ').unwrap_or((remainder, ""));
		let remainder = remainder.trim_start();

		let (name, remainder) = match remainder.find([' ', '(']) {
			Some(index) => (&remainder[..index], remainder[index..].trim()),
			None => (remainder, ""),
		};

		if name.is_empty() {
			return Err(DirectiveError::MissingName);
		}

		let mut directive = Self::new(source, name);

		if remainder.is_empty() {
			return Ok(directive);
		}

		let parameters = remainder
			.strip_prefix('(')
			.and_then(|rest| rest.strip_suffix(')'))
			.filter(|inner| !inner.contains(['(', ')']))
			.ok_or(DirectiveError::ParametersNotEnclosed)?;

		for parameter in parameters.split(';') {
			let Parameter { key, value, query } = Parameter::parse(parameter.trim())?;

			if key.eq_ignore_ascii_case("importer") {
				directive.importer = Some(value.to_string());
				directive.importer_query = query.map(String::from);
			} else if key.eq_ignore_ascii_case("formatter") {
				directive.formatter = Some(value.to_string());
				directive.formatter_query = query.map(String::from);
			} else {
				return Err(DirectiveError::UnknownKey(key.to_string()));
			}
		}

		Ok(directive)
	}
}

/// One `key:value[?query]` entry of the parameter list.
struct Parameter<'a> {
	key: &'a str,
	value: &'a str,
	query: Option<&'a str>,
}

impl<'a> Parameter<'a> {
	fn parse(input: &'a str) -> Result<Self, DirectiveError> {
		let colon = match input.find(':') {
			Some(index) if index > 0 => index,
			_ => return Err(DirectiveError::MalformedParameter),
		};

		let key = input[..colon].trim();
		let value_and_query = input[colon + 1..].trim();

		let (value, query) = match value_and_query.split_once('?') {
			Some((value, query)) => {
				let query = query.trim();
				if query.is_empty() {
					return Err(DirectiveError::MissingQuery(key.to_string()));
				}
				(value.trim(), Some(query))
			}
			None => (value_and_query, None),
		};

		if value.is_empty() {
			return Err(DirectiveError::MissingValue(key.to_string()));
		}

		Ok(Self { key, value, query })
	}
}

/// Whether the trimmed line opens a managed region.
pub fn is_begin_marker(trimmed: &str) -> bool {
	strip_prefix_ignore_case(trimmed, BEGIN_MARKER).is_some()
}

/// Whether the trimmed line closes a managed region.
pub fn is_end_marker(trimmed: &str) -> bool {
	trimmed.eq_ignore_ascii_case(END_MARKER)
}

pub(crate) fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
	input
		.get(..prefix.len())
		.filter(|head| head.eq_ignore_ascii_case(prefix))
		.map(|_| &input[prefix.len()..])
}
