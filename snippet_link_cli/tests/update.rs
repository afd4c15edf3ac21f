mod common;

use common::CURRENT_DOCUMENT;
use common::EXAMPLE_CS;
use common::STALE_DOCUMENT;
use common::snippet_link_cmd;
use common::write_file;
use predicates::prelude::PredicateBooleanExt;
use snippet_link_core::AnyEmptyResult;

#[test]
fn update_rewrites_stale_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("readme.md: Updated"))
		.stdout(predicates::str::contains("Updated 1 document(s)."));

	let content = std::fs::read_to_string(tmp.path().join("readme.md"))?;
	similar_asserts::assert_eq!(content, CURRENT_DOCUMENT);

	Ok(())
}

#[test]
fn update_is_the_default_command() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("readme.md: Updated"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		CURRENT_DOCUMENT
	);

	Ok(())
}

#[test]
fn update_reports_unchanged_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", CURRENT_DOCUMENT)?;
	write_file(tmp.path(), "docs/notes.md", "# Notes\n\nNo markers here.\n")?;

	snippet_link_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("readme.md: No changes"))
		.stdout(predicates::str::contains("notes.md: No snippets"))
		.stdout(predicates::str::contains("Updated 0 document(s)."));

	Ok(())
}

#[test]
fn update_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("update")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("readme.md: Would update"))
		.stdout(predicates::str::contains("Dry run: would update 1 document(s)."));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		STALE_DOCUMENT
	);

	Ok(())
}

#[test]
fn update_failure_exits_with_one_and_keeps_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let broken = "<!-- begin-snippet: Example.cs Missing -->\n<!-- end-snippet -->\n";
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "broken.md", broken)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("broken.md: Failed"))
		.stdout(predicates::str::contains(
			"  Line 1: Snippet 'Missing' not found in file 'Example.cs'.",
		))
		.stdout(predicates::str::contains("readme.md: Updated"));

	assert_eq!(std::fs::read_to_string(tmp.path().join("broken.md"))?, broken);
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		CURRENT_DOCUMENT
	);

	Ok(())
}

#[test]
fn update_skips_build_output_directories() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "bin/Release/readme.md", STALE_DOCUMENT)?;
	write_file(tmp.path(), "obj/readme.md", STALE_DOCUMENT)?;
	write_file(tmp.path(), ".hidden/readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("readme.md").not())
		.stdout(predicates::str::contains("Updated 0 document(s)."));

	Ok(())
}

#[test]
fn update_imports_benchmark_report() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"Bench/bin/Release/net8.0/BenchmarkDotNet.Artifacts/results/Bench.ParserBenchmarks-report-github.md",
		"```\nBenchmarkDotNet v0.14.0\n```\n| Method | Mean |\n|------- |-----:|\n| Parse  | 1 ms |\n",
	)?;
	write_file(
		tmp.path(),
		"readme.md",
		"<!-- begin-snippet: Bench ParserBenchmarks (importer:BenchmarkDotNet) -->\n<!-- end-snippet \
		 -->\n",
	)?;

	snippet_link_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		"<!-- begin-snippet: Bench ParserBenchmarks (importer:BenchmarkDotNet) -->\n| Method | Mean \
		 |\n|------- |-----:|\n| Parse  | 1 ms |\n<!-- end-snippet -->\n"
	);

	Ok(())
}

#[test]
fn update_verbose_logs_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("update")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("resolving snippet"))
		.stdout(predicates::str::contains("resolving snippet").not());

	Ok(())
}

#[test]
fn invalid_config_exits_with_two() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "snippet-link.toml", "max_file_size = \"big\"\n")?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}
