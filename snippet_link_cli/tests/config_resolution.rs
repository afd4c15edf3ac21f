mod common;

use common::CURRENT_DOCUMENT;
use common::EXAMPLE_CS;
use common::STALE_DOCUMENT;
use common::snippet_link_cmd;
use common::write_file;
use rstest::rstest;
use snippet_link_core::AnyEmptyResult;

#[rstest]
#[case::root("snippet-link.toml")]
#[case::hidden(".snippet-link.toml")]
#[case::dot_config(".config/snippet-link.toml")]
fn source_root_is_read_from_config(#[case] config_path: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), config_path, "source_root = \"src\"\n")?;
	write_file(tmp.path(), "src/Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("update")
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
fn root_config_takes_precedence() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(tmp.path(), "snippet-link.toml", "source_root = \"src\"\n")?;
	write_file(tmp.path(), ".config/snippet-link.toml", "source_root = \"elsewhere\"\n")?;
	write_file(tmp.path(), "src/Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("readme.md: Stale"));

	Ok(())
}

#[test]
fn exclude_and_document_patterns_are_applied() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"snippet-link.toml",
		"[documents]\npatterns = [\"guides/*.txt\"]\n\n[exclude]\npatterns = [\"vendor/\"]\n",
	)?;
	write_file(tmp.path(), "Example.cs", EXAMPLE_CS)?;
	write_file(tmp.path(), "guides/intro.txt", STALE_DOCUMENT)?;
	write_file(tmp.path(), "vendor/readme.md", STALE_DOCUMENT)?;

	snippet_link_cmd()
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("intro.txt: Updated"))
		.stdout(predicates::str::contains("Updated 1 document(s)."));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("vendor/readme.md"))?,
		STALE_DOCUMENT
	);

	Ok(())
}
