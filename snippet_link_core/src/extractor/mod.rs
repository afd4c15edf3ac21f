//! Extractors locate a named snippet in a source and return it as a
//! [`Fragment`].
//!
//! The engine keeps an ordered list of extractors. A directive either pins
//! one by name (`importer:cs`) or the first extractor whose
//! [`Extractor::can_handle`] probe succeeds is used.

pub use benchmark::BenchmarkExtractor;
pub use csharp::CSharpExtractor;

use crate::Fragment;
use crate::QueryOptions;
use crate::Renderer;
use crate::SnippetResult;

mod benchmark;
mod csharp;

pub trait Extractor {
	/// The name directives use to select this extractor. Matched
	/// case-insensitively.
	fn name(&self) -> &str;

	/// The renderer used when a directive does not name one.
	fn preferred_renderer(&self) -> Renderer;

	/// A cheap probe that checks whether `source` looks like something this
	/// extractor understands and exists. It does not read content.
	fn can_handle(&self, source: &str, name: &str, options: &QueryOptions) -> SnippetResult<()>;

	fn extract(&mut self, source: &str, name: &str, options: &QueryOptions) -> SnippetResult<Fragment>;
}
