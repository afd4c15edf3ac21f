mod common;

use clap::Parser;
use common::CURRENT_DOCUMENT;
use common::EXAMPLE_CS;
use common::STALE_DOCUMENT;
use common::snippet_link_cmd;
use common::write_file;
use rstest::rstest;
use serde_json::Value;
use snippet_link_cli::Commands;
use snippet_link_cli::OutputFormat;
use snippet_link_cli::SnippetLinkCli;
use snippet_link_core::AnyEmptyResult;

#[test]
fn check_passes_when_up_to_date() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", CURRENT_DOCUMENT)?;

	snippet_link_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("readme.md: No changes"))
		.stdout(predicates::str::contains("Check passed"));

	Ok(())
}

#[test]
fn check_fails_when_stale() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("readme.md: Stale"))
		.stderr(predicates::str::contains(
			"Check failed: 1 document(s) are out of date. Run `snippet-link update` to fix.",
		));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("readme.md"))?,
		STALE_DOCUMENT
	);

	Ok(())
}

#[test]
fn check_fails_when_a_snippet_cannot_be_resolved() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(
		tmp.path(),
		"readme.md",
		"<!-- begin-snippet: Example.cs Greet (formatter:html) -->\n<!-- end-snippet -->\n",
	)?;

	snippet_link_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("readme.md: Failed"))
		.stdout(predicates::str::contains("  Line 1: Unknown formatter 'html'"))
		.stderr(predicates::str::contains("1 document(s) failed"));

	Ok(())
}

#[test]
fn check_diff_shows_changes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("check")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("-old content"))
		.stderr(predicates::str::contains("+public string Greet(string name)"));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;
	write_file(
		tmp.path(),
		"sub/broken.md",
		"<!-- begin-snippet: Example.cs Missing -->\n<!-- end-snippet -->\n",
	)?;

	let output = snippet_link_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.get_output()
		.stdout
		.clone();

	let report: Value = serde_json::from_slice(&output)?;
	assert_eq!(report["ok"], Value::Bool(false));

	let documents = report["documents"]
		.as_array()
		.unwrap_or_else(|| panic!("expected documents array"));
	assert_eq!(documents.len(), 2);
	assert_eq!(documents[0]["file"], "readme.md");
	assert_eq!(documents[0]["status"], "stale");
	assert!(documents[0].get("error").is_none());
	assert_eq!(documents[1]["status"], "failed");
	assert_eq!(
		documents[1]["error"],
		"Line 1: Snippet 'Missing' not found in file 'Example.cs'."
	);

	Ok(())
}

#[test]
fn check_json_passes_when_up_to_date() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", CURRENT_DOCUMENT)?;

	let output = snippet_link_cmd()
		.arg("check")
		.arg("--format=json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	let report: Value = serde_json::from_slice(&output)?;
	assert_eq!(report["ok"], Value::Bool(true));
	assert_eq!(report["documents"][0]["status"], "up-to-date");

	Ok(())
}

#[rstest]
#[case::default_command(&["snippet-link"], None)]
#[case::update(&["snippet-link", "update"], Some("update"))]
#[case::check_json(&["snippet-link", "check", "--format", "json", "--diff"], Some("check-json-diff"))]
#[case::check_text(&["snippet-link", "-v", "check"], Some("check-text"))]
fn parses_cli_arguments(#[case] args: &[&str], #[case] expected: Option<&str>) {
	let cli = SnippetLinkCli::parse_from(args);
	let actual = cli.command.map(|command| {
		match command {
			Commands::Update {
				dry_run: false,
				watch: false,
			} => "update",
			Commands::Update { .. } => "update-flags",
			Commands::Check {
				diff: true,
				format: OutputFormat::Json,
			} => "check-json-diff",
			Commands::Check {
				diff: false,
				format: OutputFormat::Text,
			} => "check-text",
			Commands::Check { .. } => "check-other",
		}
	});

	assert_eq!(actual, expected);
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
	let cli = SnippetLinkCli::parse_from(["snippet-link", "update", "--dry-run", "--no-color", "-p", "docs"]);

	assert!(cli.no_color);
	assert_eq!(cli.path.as_deref(), Some(std::path::Path::new("docs")));
	assert!(matches!(
		cli.command,
		Some(Commands::Update {
			dry_run: true,
			watch: false
		})
	));
}
