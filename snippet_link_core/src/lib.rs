//! `snippet_link_core` keeps code examples in documentation in sync with the
//! source files they come from.
//!
//! A document marks a managed region with a pair of HTML comments:
//!
//! ```markdown
//! <!-- begin-snippet: src/Parser.cs Parser.Parse (importer:cs?body-only=true) -->
//! <!-- end-snippet -->
//! ```
//!
//! Everything between the markers is regenerated from the named source.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Document
//!   → Directive (decodes the begin-snippet line)
//!   → Extractor (locates and normalizes the snippet in its source)
//!   → Renderer (turns the fragment into document text)
//!   → DocumentEngine (replaces the managed region, collects per-line errors)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `snippet-link.toml`.
//! - [`project`]: Document discovery and whole-project runs.
//! - [`extractor`]: The C# and BenchmarkDotNet extractors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snippet_link_core::project::{sync_project, write_updates};
//! use snippet_link_core::SnippetConfig;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = SnippetConfig::load_or_default(root).unwrap();
//! let report = sync_project(root, &config).unwrap();
//!
//! if report.has_failures() {
//!     eprintln!("some snippets could not be resolved");
//! }
//!
//! write_updates(&report).unwrap();
//! ```

pub use config::*;
pub use directive::*;
pub use engine::*;
pub use error::*;
pub use extractor::*;
pub use fragment::*;
pub use fs::FileSystem;
pub use fs::RealFileSystem;
pub use options::*;
pub use project::*;
pub use renderer::*;

pub mod config;
mod directive;
mod engine;
#[allow(unused_assignments)]
mod error;
pub mod extractor;
mod fragment;
mod fs;
pub(crate) mod lexer;
mod options;
pub mod project;
mod renderer;
pub(crate) mod syntax;

#[cfg(test)]
mod __fixtures;
