use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SnippetError;
use crate::SnippetResult;

/// Default maximum document size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"snippet-link.toml",
	".snippet-link.toml",
	".config/snippet-link.toml",
];

/// Configuration loaded from a `snippet-link.toml` file.
///
/// ```toml
/// source_root = "src"
/// max_file_size = 10485760
/// disable_gitignore = false
///
/// [documents]
/// patterns = ["docs/**/*.txt"]
///
/// [exclude]
/// patterns = ["vendor/", "CHANGELOG.md"]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SnippetConfig {
	/// Directory that directive source locators are resolved against,
	/// relative to the project root.
	#[serde(default)]
	pub source_root: Option<PathBuf>,
	/// Extra documents to process beyond markdown files.
	#[serde(default)]
	pub documents: DocumentsConfig,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Documents larger than this are skipped. Defaults to 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` is not consulted during discovery.
	#[serde(default)]
	pub disable_gitignore: bool,
}

impl Default for SnippetConfig {
	fn default() -> Self {
		Self {
			source_root: None,
			documents: DocumentsConfig::default(),
			exclude: ExcludeConfig::default(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DocumentsConfig {
	/// Glob patterns, relative to the project root.
	#[serde(default)]
	pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ExcludeConfig {
	/// Gitignore-style patterns.
	#[serde(default)]
	pub patterns: Vec<String>,
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

impl SnippetConfig {
	/// Return the first existing config file path at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn load(root: &Path) -> SnippetResult<Option<SnippetConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;

		Self::parse(&content).map(Some)
	}

	/// Load the config at `root`, falling back to defaults.
	pub fn load_or_default(root: &Path) -> SnippetResult<SnippetConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	pub fn parse(content: &str) -> SnippetResult<SnippetConfig> {
		toml::from_str(content).map_err(|e| SnippetError::ConfigParse(e.to_string()))
	}

	/// The directory source locators are resolved against.
	pub fn source_root(&self, root: &Path) -> PathBuf {
		match &self.source_root {
			Some(source_root) => root.join(source_root),
			None => root.to_path_buf(),
		}
	}
}
