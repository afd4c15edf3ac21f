use std::fmt;

use crate::Fragment;
use crate::QueryOptions;
use crate::SnippetResult;

/// Turns an extracted [`Fragment`] into document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Renderer {
	/// Wraps the content in a fenced code block tagged with the fragment kind.
	/// The tag can be overridden with the `lang` option.
	CodeBlock,
	/// Writes the content as is.
	Raw,
}

impl Renderer {
	pub const ALL: [Self; 2] = [Self::CodeBlock, Self::Raw];

	pub fn name(self) -> &'static str {
		match self {
			Self::CodeBlock => "code-block",
			Self::Raw => "raw",
		}
	}

	/// Look up a renderer by name, ignoring case.
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|renderer| renderer.name().eq_ignore_ascii_case(name))
	}

	/// Append the rendered fragment to `output`. Every rendering ends with a
	/// newline.
	pub fn write(
		self,
		fragment: &Fragment,
		options: &QueryOptions,
		output: &mut String,
	) -> SnippetResult<()> {
		match self {
			Self::CodeBlock => {
				let lang = options.get("lang", fragment.kind.clone())?;
				output.push_str("```");
				output.push_str(&lang);
				output.push('\n');
				output.push_str(&fragment.content);
				output.push_str("\n```\n");
			}
			Self::Raw => {
				output.push_str(&fragment.content);
				output.push('\n');
			}
		}

		Ok(())
	}
}

impl fmt::Display for Renderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
