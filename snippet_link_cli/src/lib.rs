use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep code snippets in your documentation in sync with their source.",
	long_about = "snippet-link rewrites the region between `<!-- begin-snippet: SOURCE NAME -->` \
	              and `<!-- end-snippet -->` markers in markdown documents with the named \
	              snippet, extracted from a C# source file or a BenchmarkDotNet report.\n\nQuick \
	              start:\n  snippet-link update  Rewrite every managed region\n  snippet-link \
	              check   Verify every managed region is current"
)]
pub struct SnippetLinkCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Commands {
	/// Rewrite the managed regions of every document. This is the default
	/// command.
	///
	/// Prints each discovered document with its outcome: `Updated`,
	/// `No changes`, `No snippets` or `Failed` followed by the reasons.
	/// Documents that failed are left untouched. Exits with a non-zero status
	/// code when any document failed.
	Update {
		/// Report which documents would change without writing them.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch for file changes and re-run updates automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that every managed region is up to date without writing.
	///
	/// Exits with a non-zero status code when any document is stale or
	/// failed, which makes it suitable for CI pipelines.
	Check {
		/// Show a line diff for each stale document.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

impl Default for Commands {
	fn default() -> Self {
		Self::Update {
			dry_run: false,
			watch: false,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors.
	Text,
	/// JSON output for programmatic consumption. Each document entry holds
	/// its root-relative path, status and error text.
	Json,
}
