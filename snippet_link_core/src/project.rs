use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::DocumentEngine;
use crate::RealFileSystem;
use crate::SnippetError;
use crate::SnippetResult;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::config::SnippetConfig;

/// Options controlling which files are treated as documents.
///
/// Use [`DiscoveryOptions::default()`] for markdown files only or
/// [`DiscoveryOptions::from_config`] to apply a [`SnippetConfig`].
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
	/// Gitignore-style patterns to exclude.
	pub exclude_patterns: Vec<String>,
	/// Extra documents, matched against the root-relative path.
	pub document_set: GlobSet,
	/// Maximum document size in bytes.
	pub max_file_size: u64,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
}

impl Default for DiscoveryOptions {
	fn default() -> Self {
		Self {
			exclude_patterns: Vec::new(),
			document_set: GlobSet::empty(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

impl DiscoveryOptions {
	pub fn from_config(config: &SnippetConfig) -> SnippetResult<Self> {
		Ok(Self {
			exclude_patterns: config.exclude.patterns.clone(),
			document_set: build_glob_set(&config.documents.patterns)?,
			max_file_size: config.max_file_size,
			disable_gitignore: config.disable_gitignore,
		})
	}
}

/// What happened to one document during a run.
#[derive(Debug)]
pub enum DocumentStatus {
	/// Snippets were resolved and the document text changed.
	Updated(String),
	/// Snippets were resolved and the document is already current.
	NoChanges,
	/// The document has no live snippet markers.
	NoSnippets,
	/// At least one marker could not be resolved.
	Failed(SnippetError),
}

impl DocumentStatus {
	pub fn is_failed(&self) -> bool {
		matches!(self, Self::Failed(_))
	}

	pub fn updated_content(&self) -> Option<&str> {
		match self {
			Self::Updated(content) => Some(content),
			_ => None,
		}
	}
}

#[derive(Debug)]
pub struct DocumentReport {
	pub path: PathBuf,
	/// The document text as it was read.
	pub original: String,
	pub status: DocumentStatus,
}

/// The outcome of processing every document of a project.
#[derive(Debug, Default)]
pub struct SyncReport {
	pub root: PathBuf,
	pub documents: Vec<DocumentReport>,
}

impl SyncReport {
	pub fn has_failures(&self) -> bool {
		self.documents.iter().any(|document| document.status.is_failed())
	}

	/// Documents whose content would change.
	pub fn updated(&self) -> impl Iterator<Item = &DocumentReport> {
		self.documents
			.iter()
			.filter(|document| document.status.updated_content().is_some())
	}

	/// A document path relative to the project root, for display.
	pub fn relative_path<'a>(&self, path: &'a Path) -> &'a Path {
		path.strip_prefix(&self.root).unwrap_or(path)
	}
}

/// Run every document under `root` through one [`DocumentEngine`].
///
/// Nothing is written. Pass the report to [`write_updates`] to persist it.
pub fn sync_project(root: &Path, config: &SnippetConfig) -> SnippetResult<SyncReport> {
	let options = DiscoveryOptions::from_config(config)?;
	let documents = collect_documents(root, &options)?;
	let fs = RealFileSystem::new(config.source_root(root));
	let mut engine = DocumentEngine::with_defaults(&fs);
	let mut report = SyncReport {
		root: root.to_path_buf(),
		documents: Vec::with_capacity(documents.len()),
	};

	for path in documents {
		let original = match std::fs::read_to_string(&path) {
			Ok(content) => content,
			Err(error) if error.kind() == std::io::ErrorKind::InvalidData => {
				tracing::warn!(path = %path.display(), "skipping document that is not valid UTF-8");
				continue;
			}
			Err(error) => return Err(error.into()),
		};

		let status = sync_document(&mut engine, &original);
		tracing::debug!(path = %path.display(), status = ?status, "processed document");
		report.documents.push(DocumentReport {
			path,
			original,
			status,
		});
	}

	Ok(report)
}

/// Process a single document's text with `engine`.
pub fn sync_document(engine: &mut DocumentEngine<'_>, content: &str) -> DocumentStatus {
	let mut output = String::with_capacity(content.len());

	match engine.process(content, &mut output) {
		Err(error) => DocumentStatus::Failed(error),
		Ok(false) => DocumentStatus::NoSnippets,
		Ok(true) if output == content => DocumentStatus::NoChanges,
		Ok(true) => DocumentStatus::Updated(output),
	}
}

/// Persist every updated document of `report` and return how many were
/// written. Failed documents are never written.
pub fn write_updates(report: &SyncReport) -> SnippetResult<usize> {
	let mut written = 0;

	for document in &report.documents {
		let Some(content) = document.status.updated_content() else {
			continue;
		};

		std::fs::write(&document.path, content)?;
		tracing::info!(path = %document.path.display(), "updated document");
		written += 1;
	}

	Ok(written)
}

fn build_glob_set(patterns: &[String]) -> SnippetResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			SnippetError::ConfigParse(format!("invalid document pattern `{pattern}`: {e}"))
		})?;
		builder.add(glob);
	}
	builder
		.build()
		.map_err(|e| SnippetError::ConfigParse(format!("failed to build document patterns: {e}")))
}

fn build_exclude_matcher(root: &Path, patterns: &[String]) -> SnippetResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			SnippetError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| SnippetError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(%error, "ignoring unreadable .gitignore rules");
		}
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

/// Collect the documents under `root`, sorted by path.
///
/// Hidden directories, build output directories, files matched by the root
/// `.gitignore` (unless disabled) or by the exclude patterns, and files over
/// the size limit are skipped.
pub fn collect_documents(root: &Path, options: &DiscoveryOptions) -> SnippetResult<Vec<PathBuf>> {
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let walker = Walker {
		root,
		options,
		gitignore,
		exclude: build_exclude_matcher(root, &options.exclude_patterns)?,
	};

	let mut documents = Vec::new();
	let mut visited_dirs = HashSet::new();
	walker.walk(root, &mut documents, &mut visited_dirs)?;
	documents.sort();

	Ok(documents)
}

struct Walker<'a> {
	root: &'a Path,
	options: &'a DiscoveryOptions,
	gitignore: Gitignore,
	exclude: Gitignore,
}

impl Walker<'_> {
	fn walk(
		&self,
		dir: &Path,
		documents: &mut Vec<PathBuf>,
		visited_dirs: &mut HashSet<PathBuf>,
	) -> SnippetResult<()> {
		if !dir.is_dir() {
			return Ok(());
		}

		// Detect symlink cycles by tracking canonical paths.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !visited_dirs.insert(canonical) {
			return Err(SnippetError::SymlinkCycle {
				path: dir.display().to_string(),
			});
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();
			let is_dir = path.is_dir();

			if is_dir
				&& path
					.file_name()
					.and_then(|name| name.to_str())
					.is_some_and(is_ignored_directory_name)
			{
				continue;
			}

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				self.walk(&path, documents, visited_dirs)?;
			} else if self.is_document(&path) && self.within_size_limit(&path) {
				documents.push(path);
			}
		}

		Ok(())
	}

	fn is_document(&self, path: &Path) -> bool {
		is_markdown_file(path)
			|| path
				.strip_prefix(self.root)
				.is_ok_and(|relative| self.options.document_set.is_match(relative))
	}

	fn within_size_limit(&self, path: &Path) -> bool {
		let Ok(metadata) = std::fs::metadata(path) else {
			return false;
		};

		if metadata.len() > self.options.max_file_size {
			tracing::warn!(
				path = %path.display(),
				size = metadata.len(),
				limit = self.options.max_file_size,
				"skipping document larger than the size limit"
			);
			return false;
		}

		true
	}
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || matches!(name, "node_modules" | "target" | "bin" | "obj")
}

/// Check if a file is a markdown document.
fn is_markdown_file(path: &Path) -> bool {
	let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
		return false;
	};

	matches!(ext, "md" | "mdx" | "markdown")
}
