use std::collections::BTreeMap;

use derive_more::Deref;

use crate::SnippetError;
use crate::SnippetResult;

/// Key/value options decoded from the `?query` part of a directive
/// parameter, e.g. `importer:cs?body-only=true`.
///
/// Keys are stored lowercased so lookups are case-insensitive. Values are
/// percent-decoded and kept as written until a typed lookup converts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct QueryOptions(BTreeMap<String, String>);

impl QueryOptions {
	/// Decode an `application/x-www-form-urlencoded` query string. A repeated
	/// key keeps its last value.
	pub fn parse(query: &str) -> Self {
		let entries = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
			.map(|(key, value)| (key.to_ascii_lowercase(), value.into_owned()))
			.collect();

		Self(entries)
	}

	/// The raw value stored for `key`, if present.
	pub fn raw(&self, key: &str) -> Option<&str> {
		self.0.get(&key.to_ascii_lowercase()).map(String::as_str)
	}

	/// Read `key` as `T`, falling back to `default` when the key is absent.
	///
	/// A value that does not convert is an error rather than a silent
	/// fallback.
	pub fn get<T: OptionValue>(&self, key: &str, default: T) -> SnippetResult<T> {
		let Some(value) = self.raw(key) else {
			return Ok(default);
		};

		T::parse_option(value).ok_or_else(|| {
			SnippetError::InvalidOption {
				key: key.to_string(),
				value: value.to_string(),
				expected: T::EXPECTED,
			}
		})
	}
}

/// A type that can be read out of [`QueryOptions`].
pub trait OptionValue: Sized {
	/// Human readable type name used in conversion errors.
	const EXPECTED: &'static str;

	fn parse_option(value: &str) -> Option<Self>;
}

impl OptionValue for bool {
	const EXPECTED: &'static str = "a boolean";

	fn parse_option(value: &str) -> Option<Self> {
		if value.eq_ignore_ascii_case("true") {
			Some(true)
		} else if value.eq_ignore_ascii_case("false") {
			Some(false)
		} else {
			None
		}
	}
}

impl OptionValue for String {
	const EXPECTED: &'static str = "a string";

	fn parse_option(value: &str) -> Option<Self> {
		Some(value.to_string())
	}
}

impl OptionValue for f64 {
	const EXPECTED: &'static str = "a number";

	fn parse_option(value: &str) -> Option<Self> {
		value.trim().parse().ok()
	}
}

macro_rules! integer_option {
	($($ty:ty),*) => {
		$(
			impl OptionValue for $ty {
				const EXPECTED: &'static str = "an integer";

				fn parse_option(value: &str) -> Option<Self> {
					value.trim().parse().ok()
				}
			}
		)*
	};
}

integer_option!(i32, i64, u32, u64, usize);
