use std::cell::Cell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::DocumentEngine;
use crate::FileSystem;
use crate::SnippetError;
use crate::SnippetResult;
use crate::fs::glob_matcher;
use crate::fs::join;

/// An in-memory [`FileSystem`]. Directories exist implicitly when a file
/// lies below them.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
	files: BTreeMap<String, String>,
	reads: Cell<usize>,
}

impl MemoryFileSystem {
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_file(mut self, path: &str, content: &str) -> Self {
		self.files.insert(normalize(path), content.to_string());
		self
	}

	/// Number of `read_to_string` calls so far.
	pub fn reads(&self) -> usize {
		self.reads.get()
	}
}

fn normalize(path: &str) -> String {
	path.replace('\\', "/")
		.trim_start_matches("./")
		.trim_end_matches('/')
		.to_string()
}

impl FileSystem for MemoryFileSystem {
	fn file_exists(&self, path: &str) -> bool {
		self.files.contains_key(&normalize(path))
	}

	fn dir_exists(&self, path: &str) -> bool {
		let prefix = format!("{}/", normalize(path));
		self.files.keys().any(|file| file.starts_with(&prefix))
	}

	fn list_dirs(&self, path: &str, pattern: &str) -> SnippetResult<Vec<String>> {
		let matcher = glob_matcher(pattern)?;
		let base = normalize(path);
		let prefix = format!("{base}/");
		let names: BTreeSet<&str> = self
			.files
			.keys()
			.filter_map(|file| file.strip_prefix(&prefix))
			.filter_map(|rest| rest.split_once('/'))
			.map(|(dir, _)| dir)
			.filter(|dir| matcher.is_match(dir))
			.collect();

		Ok(names.into_iter().map(|name| join(&base, name)).collect())
	}

	fn read_to_string(&self, path: &str) -> SnippetResult<String> {
		self.reads.set(self.reads.get() + 1);
		self.files
			.get(&normalize(path))
			.cloned()
			.ok_or_else(|| SnippetError::SourceNotFound(path.to_string()))
	}
}

/// Process `input` with the default extractors over `fs`.
pub fn process(fs: &MemoryFileSystem, input: &str) -> (SnippetResult<bool>, String) {
	let mut engine = DocumentEngine::with_defaults(fs);
	let mut output = String::new();
	let result = engine.process(input, &mut output);
	(result, output)
}

pub const EXAMPLE_CS: &str = r"// Some C# code
#region MySnippet
public class MyClass
{
    public void MyMethod()
    {
        // method body
    }
}
#endregion
";

pub const EXAMPLE_DOCUMENT: &str = "Here is a code snippet:
<!-- begin-snippet: Example.cs MySnippet -->
<!-- end-snippet -->";

pub const EXAMPLE_RENDERED: &str = "Here is a code snippet:
<!-- begin-snippet: Example.cs MySnippet -->
```cs
public class MyClass
{
    public void MyMethod()
    {
        // method body
    }
}
```
<!-- end-snippet -->";

pub const CALCULATOR_CS: &str = r#"using System;

namespace Demo.Library;

/// <summary>
/// A calculator.
/// </summary>
public class Calculator
{
    private int _total;

    public int Total { get; private set; }

    public Calculator(int seed)
    {
        _total = seed;
    }

    [Obsolete]
    public int Add(int value)
    {
        _total += value;
        return _total;
    }

    public int Double(int value) => value * 2;

    public int this[int index] => index;

    public static Calculator operator +(Calculator left, Calculator right) => left;

    public event EventHandler Changed;

    public class Nested
    {
        public void Add()
        {
            Console.WriteLine("nested { brace");
        }
    }
}

public delegate void Notify(string message);

public record Point(int X, int Y);

public interface IShape
{
    double Area();
}
"#;

pub const REGIONS_CS: &str = r"public class Regions
{
    #region Outer
    public void First() { }

    #region Inner
    public void Second() { }
    #endregion

    public void Third() { }
    #endregion

    #region Mixed
    int a = 1;
    // end-snippet
    int b = 2;
    #endregion

    #region Broken
    public void Fourth() { }
}
";

pub const COMMENTS_CS: &str = r"// begin-snippet: Usage
var calc = new Calculator(1);
// begin-snippet: Inner
calc.Add(2);
// end-snippet
Console.WriteLine(calc.Total);
// end-snippet
";

pub const BENCHMARK_PROJECT: &str = "Akade.IndexedSet.Benchmarks";

pub const BENCHMARK_REPORT: &str = "```
Environment PC information
```
| Method | Mean | Error | StdDev |
|------- |-----:|------:|-------:|
| Test1  | 1 ms | 0.1 ms| 0.2 ms |
";

pub fn benchmark_report_path(runtime: &str) -> String {
	format!(
		"{BENCHMARK_PROJECT}/bin/Release/{runtime}/BenchmarkDotNet.Artifacts/results/{BENCHMARK_PROJECT}.ConcurrentSetBenchmarks-report-github.md"
	)
}
