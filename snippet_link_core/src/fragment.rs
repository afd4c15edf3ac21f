/// Extracted snippet text together with where it came from.
///
/// `content` never starts or ends with a blank line and has had the
/// indentation of its anchor removed. Line numbers are 0-based and
/// inclusive, and are only present when the source is addressable by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
	pub source: String,
	pub name: String,
	pub start_line: Option<usize>,
	pub end_line: Option<usize>,
	pub content: String,
	/// Language tag used when the fragment is fenced, e.g. `cs`.
	pub kind: String,
}

impl Fragment {
	pub fn new(
		source: impl Into<String>,
		name: impl Into<String>,
		content: impl Into<String>,
		kind: impl Into<String>,
	) -> Self {
		Self {
			source: source.into(),
			name: name.into(),
			start_line: None,
			end_line: None,
			content: content.into(),
			kind: kind.into(),
		}
	}

	#[must_use]
	pub fn with_lines(mut self, start_line: usize, end_line: usize) -> Self {
		self.start_line = Some(start_line);
		self.end_line = Some(end_line);
		self
	}
}

/// Drop whitespace-only lines from both ends of `text`, then strip up to
/// `indent` columns of leading whitespace from every remaining line.
///
/// `indent` is the column the snippet was anchored at, such as its opening
/// marker or the first token of its declaration. A line indented less than
/// that, for example inside a verbatim string, loses only its own
/// indentation.
pub fn normalize_indentation(text: &str, indent: usize) -> String {
	let lines: Vec<&str> = text.lines().collect();
	let first = lines.iter().position(|line| !line.trim().is_empty());
	let last = lines.iter().rposition(|line| !line.trim().is_empty());

	let (Some(first), Some(last)) = (first, last) else {
		return String::new();
	};

	let mut output = String::with_capacity(text.len());

	for (index, line) in lines[first..=last].iter().enumerate() {
		if index > 0 {
			output.push('\n');
		}

		let strip = indent.min(leading_whitespace(line));
		output.push_str(line[strip..].trim_end_matches('\r'));
	}

	output
}

/// Byte length of the leading spaces and tabs of `line`.
fn leading_whitespace(line: &str) -> usize {
	line.len() - line.trim_start_matches([' ', '\t']).len()
}
