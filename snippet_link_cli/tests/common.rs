use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;
use snippet_link_core::AnyEmptyResult;

pub const EXAMPLE_CS: &str = r#"namespace Demo;

public class Greeter
{
    #region Greet
    public string Greet(string name)
    {
        return "Hello " + name;
    }
    #endregion
}
"#;

pub const STALE_DOCUMENT: &str = "# Readme

<!-- begin-snippet: Example.cs Greet -->
old content
<!-- end-snippet -->
";

pub const CURRENT_DOCUMENT: &str = r#"# Readme

<!-- begin-snippet: Example.cs Greet -->
```cs
public string Greet(string name)
{
    return "Hello " + name;
}
```
<!-- end-snippet -->
"#;

pub fn snippet_link_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("snippet-link"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

/// Write `content` to `path` under `root`, creating parent directories.
pub fn write_file(root: &Path, path: &str, content: &str) -> AnyEmptyResult {
	let path = root.join(path);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;

	Ok(())
}
