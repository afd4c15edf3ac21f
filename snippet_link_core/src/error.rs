use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// A failure to decode a `<!-- begin-snippet: ... -->` line into a
/// [`Directive`](crate::Directive).
///
/// The messages are part of the tool's observable behaviour and are kept
/// stable so documents and tests can rely on them.
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
#[non_exhaustive]
pub enum DirectiveError {
	#[error("Snippet links need to start with '<!-- begin-snippet: '")]
	#[diagnostic(code(snippet_link::directive::missing_prefix))]
	MissingPrefix,

	#[error("Snippet link must end with ' -->'.")]
	#[diagnostic(code(snippet_link::directive::missing_suffix))]
	MissingSuffix,

	#[error("Snippet expects a source file followed by a space.")]
	#[diagnostic(
		code(snippet_link::directive::missing_source),
		help("write the directive as `<!-- begin-snippet: path/to/File.cs SnippetName -->`")
	)]
	MissingSource,

	#[error("Snippet name is missing.")]
	#[diagnostic(code(snippet_link::directive::missing_name))]
	MissingName,

	#[error("SnippetLink parameters must be enclosed in round brackets '()'.")]
	#[diagnostic(
		code(snippet_link::directive::unbalanced_parameters),
		help("wrap parameters like `(importer:cs;formatter:raw)`")
	)]
	ParametersNotEnclosed,

	#[error("SnippetLink parameters must be in the format key:value[?queryString].")]
	#[diagnostic(code(snippet_link::directive::malformed_parameter))]
	MalformedParameter,

	#[error("SnippetLink parameter '{0}' is missing a value.")]
	#[diagnostic(code(snippet_link::directive::missing_value))]
	MissingValue(String),

	#[error("Expected query string for SnippetLink parameter '{0}' following after '?'.")]
	#[diagnostic(code(snippet_link::directive::missing_query))]
	MissingQuery(String),

	#[error("Unknown SnippetLink parameter key '{0}'. Expected 'importer' or 'formatter'.")]
	#[diagnostic(code(snippet_link::directive::unknown_key))]
	UnknownKey(String),
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SnippetError {
	#[error(transparent)]
	#[diagnostic(code(snippet_link::io_error))]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	#[diagnostic(transparent)]
	Directive(#[from] DirectiveError),

	#[error("invalid value '{value}' for option '{key}': expected {expected}")]
	#[diagnostic(code(snippet_link::invalid_option))]
	InvalidOption {
		key: String,
		value: String,
		expected: &'static str,
	},

	#[error("'{source_file}' not end with .{extension}")]
	#[diagnostic(code(snippet_link::unsupported_source))]
	UnsupportedSource {
		source_file: String,
		extension: &'static str,
	},

	#[error("Source file '{0}' not found.")]
	#[diagnostic(code(snippet_link::source_not_found))]
	SourceNotFound(String),

	#[error("Snippet '{name}' not found in file '{source_file}'.")]
	#[diagnostic(
		code(snippet_link::snippet_not_found),
		help(
			"mark the snippet with `#region {name}`, `// begin-snippet: {name}` or use the \
			 dotted name of a declaration"
		)
	)]
	SnippetNotFound { name: String, source_file: String },

	#[error("Snippet '{name}' is missing its closing comment or region in '{source_file}'.")]
	#[diagnostic(
		code(snippet_link::missing_closing_marker),
		help("close the snippet with `#endregion` or `// end-snippet`")
	)]
	MissingClosingMarker { name: String, source_file: String },

	#[error("BenchmarkDotNet output file {0} not found.")]
	#[diagnostic(
		code(snippet_link::benchmark_report_not_found),
		help("run the benchmarks in Release mode with the GitHub markdown exporter enabled")
	)]
	BenchmarkReportNotFound(String),

	#[error("Unknown importer '{0}'")]
	#[diagnostic(code(snippet_link::unknown_importer))]
	UnknownImporter(String),

	#[error("Unknown formatter '{0}'")]
	#[diagnostic(code(snippet_link::unknown_formatter))]
	UnknownFormatter(String),

	#[error("No importer could handle the source file '{source_file}':\n{}", reasons.join("\n"))]
	#[diagnostic(code(snippet_link::no_importer))]
	NoImporter {
		source_file: String,
		reasons: Vec<String>,
	},

	#[error("Missing end-snippet tag for snippet starting at line {0}.")]
	#[diagnostic(
		code(snippet_link::missing_end_marker),
		help("add `<!-- end-snippet -->` after the begin-snippet line")
	)]
	MissingEndMarker(usize),

	#[error("{}", LineErrors(.0))]
	#[diagnostic(code(snippet_link::document_failed))]
	Document(Vec<LineError>),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(snippet_link::config_parse),
		help("check that snippet-link.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("invalid glob pattern `{pattern}`: {message}")]
	#[diagnostic(code(snippet_link::invalid_glob))]
	InvalidGlob { pattern: String, message: String },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(snippet_link::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

/// A directive failure tagged with the 1-indexed document line of its
/// `begin-snippet` marker.
#[derive(Debug)]
pub struct LineError {
	pub line: usize,
	pub error: SnippetError,
}

impl fmt::Display for LineError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Line {}: {}", self.line, self.error)
	}
}

struct LineErrors<'a>(&'a [LineError]);

impl fmt::Display for LineErrors<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (index, error) in self.0.iter().enumerate() {
			if index > 0 {
				writeln!(f)?;
			}
			write!(f, "{error}")?;
		}
		Ok(())
	}
}

pub type SnippetResult<T> = Result<T, SnippetError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
