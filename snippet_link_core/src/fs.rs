use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobMatcher;

use crate::SnippetError;
use crate::SnippetResult;

/// The file-system operations the extractors depend on.
///
/// Paths are the `/`-separated locators written in directives. How they are
/// resolved is up to the implementation.
pub trait FileSystem {
	fn file_exists(&self, path: &str) -> bool;

	fn dir_exists(&self, path: &str) -> bool;

	/// Paths of the immediate subdirectories of `path` whose name matches the
	/// glob `pattern`, e.g. `net*`. Each returned path is `path` joined with
	/// the directory name.
	fn list_dirs(&self, path: &str, pattern: &str) -> SnippetResult<Vec<String>>;

	/// Read a whole file. A missing file is reported as
	/// [`SnippetError::SourceNotFound`].
	fn read_to_string(&self, path: &str) -> SnippetResult<String>;
}

/// A [`FileSystem`] backed by the disk, resolving locators against `root`.
#[derive(Debug, Clone)]
pub struct RealFileSystem {
	root: PathBuf,
}

impl RealFileSystem {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn resolve(&self, path: &str) -> PathBuf {
		self.root.join(path)
	}
}

impl FileSystem for RealFileSystem {
	fn file_exists(&self, path: &str) -> bool {
		self.resolve(path).is_file()
	}

	fn dir_exists(&self, path: &str) -> bool {
		self.resolve(path).is_dir()
	}

	fn list_dirs(&self, path: &str, pattern: &str) -> SnippetResult<Vec<String>> {
		let matcher = glob_matcher(pattern)?;
		let mut dirs = Vec::new();

		for entry in std::fs::read_dir(self.resolve(path))? {
			let entry = entry?;

			if !entry.file_type()?.is_dir() {
				continue;
			}

			let name = entry.file_name();
			let Some(name) = name.to_str() else {
				continue;
			};

			if matcher.is_match(name) {
				dirs.push(join(path, name));
			}
		}

		dirs.sort();
		Ok(dirs)
	}

	fn read_to_string(&self, path: &str) -> SnippetResult<String> {
		std::fs::read_to_string(self.resolve(path)).map_err(|error| {
			match error.kind() {
				ErrorKind::NotFound => SnippetError::SourceNotFound(path.to_string()),
				_ => SnippetError::Io(error),
			}
		})
	}
}

/// Compile a single glob used to match directory names.
pub(crate) fn glob_matcher(pattern: &str) -> SnippetResult<GlobMatcher> {
	Glob::new(pattern)
		.map(|glob| glob.compile_matcher())
		.map_err(|error| {
			SnippetError::InvalidGlob {
				pattern: pattern.to_string(),
				message: error.kind().to_string(),
			}
		})
}

/// Join two locator segments with a single `/`.
pub(crate) fn join(base: &str, name: &str) -> String {
	let base = base.trim_end_matches(['/', '\\']);

	if base.is_empty() {
		name.to_string()
	} else {
		format!("{base}/{name}")
	}
}

/// The last path segment of a locator, ignoring trailing separators.
pub(crate) fn file_name(path: &str) -> &str {
	let path = path.trim_end_matches(['/', '\\']);
	path.rsplit(['/', '\\']).next().unwrap_or(path)
}
