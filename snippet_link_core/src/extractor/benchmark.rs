use crate::Extractor;
use crate::FileSystem;
use crate::Fragment;
use crate::QueryOptions;
use crate::Renderer;
use crate::SnippetError;
use crate::SnippetResult;
use crate::fs::file_name;
use crate::fs::join;

const FENCE: &str = "```";

/// Imports the GitHub-flavoured report BenchmarkDotNet writes for a
/// benchmark class.
///
/// The directive source is the benchmark project directory and the name is
/// the benchmark class, e.g.
/// `<!-- begin-snippet: Foo.Benchmarks ParserBenchmarks (importer:BenchmarkDotNet) -->`.
/// The report is read from the newest `bin/Release/net*` output. The
/// environment block at the top of the report is dropped unless `env=true`.
pub struct BenchmarkExtractor<'a> {
	fs: &'a dyn FileSystem,
}

impl<'a> BenchmarkExtractor<'a> {
	pub fn new(fs: &'a dyn FileSystem) -> Self {
		Self { fs }
	}

	/// Path of the report for `name`, or the release directory that was
	/// searched when no runtime directory exists.
	fn report_path(&self, source: &str, name: &str) -> SnippetResult<Result<String, String>> {
		let release = join(source, "bin/Release");

		if !self.fs.dir_exists(&release) {
			return Ok(Err(release));
		}

		let newest = self
			.fs
			.list_dirs(&release, "net*")?
			.into_iter()
			.filter_map(|dir| {
				let version = runtime_version(file_name(&dir))?;
				Some((version, dir))
			})
			.max_by(|(left, _), (right, _)| left.total_cmp(right));

		let Some((version, dir)) = newest else {
			return Ok(Err(release));
		};

		tracing::debug!(source, version, "selected benchmark output directory");

		Ok(Ok(format!(
			"{dir}/BenchmarkDotNet.Artifacts/results/{}.{name}-report-github.md",
			file_name(source)
		)))
	}

	fn existing_report(&self, source: &str, name: &str) -> SnippetResult<String> {
		match self.report_path(source, name)? {
			Ok(path) if self.fs.file_exists(&path) => Ok(path),
			Ok(path) | Err(path) => Err(SnippetError::BenchmarkReportNotFound(path)),
		}
	}
}

impl Extractor for BenchmarkExtractor<'_> {
	fn name(&self) -> &str {
		"BenchmarkDotNet"
	}

	fn preferred_renderer(&self) -> Renderer {
		Renderer::Raw
	}

	fn can_handle(&self, source: &str, name: &str, _options: &QueryOptions) -> SnippetResult<()> {
		self.existing_report(source, name).map(|_| ())
	}

	fn extract(&mut self, source: &str, name: &str, options: &QueryOptions) -> SnippetResult<Fragment> {
		let include_env = options.get("env", false)?;
		let path = self.existing_report(source, name)?;
		let report = self.fs.read_to_string(&path)?;
		let content = if include_env {
			report.as_str()
		} else {
			strip_environment(&report).trim_start()
		};

		// the renderer supplies the final line break
		let content = content.trim_end_matches(['\r', '\n']);

		Ok(Fragment::new(source, name, content, "markdown"))
	}
}

/// Numeric suffix of a runtime directory name such as `net8.0` or `net10`.
fn runtime_version(dir_name: &str) -> Option<f64> {
	dir_name.strip_prefix("net")?.parse().ok()
}

/// Drop everything up to and including the second fence of the report.
fn strip_environment(report: &str) -> &str {
	let Some(first) = report.find(FENCE) else {
		return report;
	};

	let after_first = &report[first + FENCE.len()..];

	match after_first.find(FENCE) {
		Some(second) => &after_first[second + FENCE.len()..],
		None => report,
	}
}
