use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use snippet_link_cli::Commands;
use snippet_link_cli::OutputFormat;
use snippet_link_cli::SnippetLinkCli;
use snippet_link_core::AnyEmptyResult;
use snippet_link_core::AnyResult;
use snippet_link_core::SnippetConfig;
use snippet_link_core::SnippetError;
use snippet_link_core::project::DocumentReport;
use snippet_link_core::project::DocumentStatus;
use snippet_link_core::project::SyncReport;
use snippet_link_core::project::sync_project;
use snippet_link_core::project::write_updates;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SnippetLinkCli::parse();

	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match args.command.unwrap_or_default() {
		Commands::Update { dry_run, watch } => run_update(&args, dry_run, watch),
		Commands::Check { diff, format } => run_check(&args, diff, format),
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(e) => {
			match e.downcast::<SnippetError>() {
				Ok(snippet_err) => {
					let report: miette::Report = (*snippet_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr so stdout only carries document statuses. `RUST_LOG`
/// overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &SnippetLinkCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn sync(root: &Path) -> AnyResult<SyncReport> {
	let config = SnippetConfig::load_or_default(root)?;
	Ok(sync_project(root, &config)?)
}

/// Returns whether every document could be processed.
fn run_update(args: &SnippetLinkCli, dry_run: bool, watch: bool) -> AnyResult<bool> {
	let passed = run_update_once(args, dry_run)?;

	if !watch || dry_run {
		return Ok(passed);
	}

	watch_project(&resolve_root(args), || run_update_once(args, false).map(|_| ()))?;
	Ok(passed)
}

fn run_update_once(args: &SnippetLinkCli, dry_run: bool) -> AnyResult<bool> {
	let root = resolve_root(args);
	let report = sync(&root)?;

	for document in &report.documents {
		let status = match &document.status {
			DocumentStatus::Updated(_) if dry_run => colored!("Would update", green),
			DocumentStatus::Updated(_) => colored!("Updated", green),
			DocumentStatus::NoChanges => "No changes".to_string(),
			DocumentStatus::NoSnippets => "No snippets".to_string(),
			DocumentStatus::Failed(_) => colored!("Failed", red),
		};

		println!("{}: {status}", display_path(&report, document));
		print_failure(document);
	}

	if dry_run {
		println!("Dry run: would update {} document(s).", report.updated().count());
	} else {
		let written = write_updates(&report)?;
		println!("Updated {written} document(s).");
	}

	Ok(!report.has_failures())
}

#[derive(Serialize)]
struct CheckOutput {
	ok: bool,
	documents: Vec<CheckEntry>,
}

#[derive(Serialize)]
struct CheckEntry {
	file: String,
	status: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

/// Returns whether every document is current.
fn run_check(args: &SnippetLinkCli, show_diff: bool, format: OutputFormat) -> AnyResult<bool> {
	let root = resolve_root(args);
	let report = sync(&root)?;
	let stale = report.updated().count();
	let failed = report
		.documents
		.iter()
		.filter(|document| document.status.is_failed())
		.count();
	let passed = stale == 0 && failed == 0;

	match format {
		OutputFormat::Json => {
			let documents = report
				.documents
				.iter()
				.map(|document| {
					let (status, error) = match &document.status {
						DocumentStatus::Updated(_) => ("stale", None),
						DocumentStatus::NoChanges => ("up-to-date", None),
						DocumentStatus::NoSnippets => ("no-snippets", None),
						DocumentStatus::Failed(error) => ("failed", Some(error.to_string())),
					};

					CheckEntry {
						file: display_path(&report, document),
						status,
						error,
					}
				})
				.collect();

			let output = CheckOutput {
				ok: passed,
				documents,
			};
			println!("{}", serde_json::to_string(&output)?);
		}
		OutputFormat::Text => {
			for document in &report.documents {
				let status = match &document.status {
					DocumentStatus::Updated(_) => colored!("Stale", yellow),
					DocumentStatus::NoChanges => "No changes".to_string(),
					DocumentStatus::NoSnippets => "No snippets".to_string(),
					DocumentStatus::Failed(_) => colored!("Failed", red),
				};

				println!("{}: {status}", display_path(&report, document));
				print_failure(document);

				if let Some(expected) = document.status.updated_content().filter(|_| show_diff) {
					print_diff(&document.original, expected);
				}
			}

			if passed {
				println!("Check passed: all snippets are up to date.");
			} else {
				eprintln!("{}", check_summary(stale, failed));
			}
		}
	}

	Ok(passed)
}

fn check_summary(stale: usize, failed: usize) -> String {
	let mut parts = Vec::new();
	if failed > 0 {
		parts.push(format!("{failed} document(s) failed"));
	}
	if stale > 0 {
		parts.push(format!("{stale} document(s) are out of date"));
	}
	format!("Check failed: {}. Run `snippet-link update` to fix.", parts.join(" and "))
}

/// Re-run `run` after every burst of file-system changes under `root`.
fn watch_project(root: &Path, mut run: impl FnMut() -> AnyEmptyResult) -> AnyEmptyResult {
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let (tx, rx) = mpsc::channel();
	let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
		if let Ok(event) = res {
			if matches!(
				event.kind,
				notify::EventKind::Modify(_) | notify::EventKind::Create(_)
			) {
				let _ = tx.send(());
			}
		}
	})?;

	use notify::Watcher;
	watcher.watch(root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, updating...");
		if let Err(e) = run() {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn print_failure(document: &DocumentReport) {
	if let DocumentStatus::Failed(error) = &document.status {
		for line in error.to_string().lines() {
			println!("  {line}");
		}
	}
}

/// Print a line diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

fn display_path(report: &SyncReport, document: &DocumentReport) -> String {
	report.relative_path(&document.path).display().to_string()
}
