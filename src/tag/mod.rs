//! The canonical tag model and the passes that populate it
//!
//! Raw Vorbis comments, container properties, and artwork sources all funnel
//! into a single [`TagMap`] keyed by the canonical upper-case vocabulary
//! (`TITLE`, `ALBUM`, `TRACKNUM`, ...).

pub(crate) mod artwork;
pub(crate) mod info;
pub(crate) mod map;

pub use artwork::resolve_artwork;
pub use info::inject_info;
pub use map::do_tag_mapping;

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// A single tag value
///
/// Vorbis comments are text, but the canonical vocabulary also carries
/// numbers (`TRACKNUM`, `SIZE`), floats (`SECS`), flags (`LOSSLESS`),
/// multi-value comments, and binary artwork.
#[derive(Clone, PartialEq)]
pub enum TagValue {
	/// A scalar string
	Text(String),
	/// An integer
	Int(i64),
	/// A float, used for durations and anchors
	Float(f64),
	/// A boolean flag
	Bool(bool),
	/// An ordered multi-value comment
	List(Vec<String>),
	/// A binary blob (artwork)
	Binary(Vec<u8>),
}

impl Debug for TagValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Text(text) => write!(f, "{text:?}"),
			Self::Int(int) => write!(f, "{int}"),
			Self::Float(float) => write!(f, "{float}"),
			Self::Bool(flag) => write!(f, "{flag}"),
			Self::List(items) => write!(f, "{items:?}"),
			Self::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
		}
	}
}

impl TagValue {
	/// The value as text, if it is a scalar string
	pub fn text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}

	/// The value coerced to an integer where possible
	///
	/// Text is parsed, floats are truncated.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(int) => Some(*int),
			Self::Float(float) => Some(*float as i64),
			Self::Bool(flag) => Some(i64::from(*flag)),
			Self::Text(text) => text.trim().parse().ok(),
			_ => None,
		}
	}

	/// The value coerced to a float where possible
	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(float) => Some(*float),
			Self::Int(int) => Some(*int as f64),
			Self::Text(text) => text.trim().parse().ok(),
			_ => None,
		}
	}

	/// The value as a binary blob
	pub fn binary(&self) -> Option<&[u8]> {
		match self {
			Self::Binary(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// The value as a multi-value list
	pub fn list(&self) -> Option<&[String]> {
		match self {
			Self::List(items) => Some(items),
			_ => None,
		}
	}
}

impl From<&str> for TagValue {
	fn from(input: &str) -> Self {
		Self::Text(input.to_owned())
	}
}

impl From<String> for TagValue {
	fn from(input: String) -> Self {
		Self::Text(input)
	}
}

impl From<i64> for TagValue {
	fn from(input: i64) -> Self {
		Self::Int(input)
	}
}

impl From<u32> for TagValue {
	fn from(input: u32) -> Self {
		Self::Int(i64::from(input))
	}
}

impl From<u64> for TagValue {
	fn from(input: u64) -> Self {
		Self::Int(input as i64)
	}
}

impl From<f64> for TagValue {
	fn from(input: f64) -> Self {
		Self::Float(input)
	}
}

impl From<bool> for TagValue {
	fn from(input: bool) -> Self {
		Self::Bool(input)
	}
}

impl From<Vec<String>> for TagValue {
	fn from(input: Vec<String>) -> Self {
		Self::List(input)
	}
}

impl From<Vec<u8>> for TagValue {
	fn from(input: Vec<u8>) -> Self {
		Self::Binary(input)
	}
}

/// A mapping from canonical upper-case keys to [`TagValue`]s
///
/// Iteration order is the key order, which keeps multi-track output
/// deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagMap {
	items: BTreeMap<String, TagValue>,
}

impl TagMap {
	/// Creates an empty map
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of entries
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether the map has no entries
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Inserts `value` under `key`, replacing any previous value
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TagValue>) {
		self.items.insert(key.into(), value.into());
	}

	/// Inserts `value` under `key` only when the key is currently absent
	pub fn insert_missing(&mut self, key: impl Into<String>, value: impl Into<TagValue>) {
		self.items.entry(key.into()).or_insert_with(|| value.into());
	}

	/// Returns the value for `key`
	pub fn get(&self, key: &str) -> Option<&TagValue> {
		self.items.get(key)
	}

	/// Returns the scalar string for `key`
	pub fn get_text(&self, key: &str) -> Option<&str> {
		self.items.get(key).and_then(TagValue::text)
	}

	/// Returns the value for `key` coerced to an integer
	pub fn get_int(&self, key: &str) -> Option<i64> {
		self.items.get(key).and_then(TagValue::as_int)
	}

	/// Whether `key` is present
	pub fn contains(&self, key: &str) -> bool {
		self.items.contains_key(key)
	}

	/// Removes and returns the value for `key`
	pub fn remove(&mut self, key: &str) -> Option<TagValue> {
		self.items.remove(key)
	}

	/// Moves the value under `from` to `to`
	///
	/// The destination receives the value and the source is removed. When the
	/// source key is absent, nothing happens.
	pub fn rename(&mut self, from: &str, to: &str) -> bool {
		match self.items.remove(from) {
			Some(value) => {
				self.items.insert(to.to_owned(), value);
				true
			},
			None => false,
		}
	}

	/// Copies every entry of `other` that this map does not have yet
	pub fn merge_missing(&mut self, other: &TagMap) {
		for (key, value) in &other.items {
			self.items
				.entry(key.clone())
				.or_insert_with(|| value.clone());
		}
	}

	/// Appends a Vorbis comment value, upgrading repeated keys to a list
	pub fn push_comment(&mut self, key: impl Into<String>, value: String) {
		let key = key.into();
		match self.items.remove(&key) {
			None => {
				self.items.insert(key, TagValue::Text(value));
			},
			Some(TagValue::Text(first)) => {
				self.items.insert(key, TagValue::List(vec![first, value]));
			},
			Some(TagValue::List(mut items)) => {
				items.push(value);
				self.items.insert(key, TagValue::List(items));
			},
			// A non-comment value (injected info) wins over stray duplicates
			Some(other) => {
				self.items.insert(key, other);
			},
		}
	}

	/// Iterates entries in key order
	pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
		self.items.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Keys in order
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.items.keys().map(String::as_str)
	}
}

impl FromIterator<(String, TagValue)> for TagMap {
	fn from_iter<I: IntoIterator<Item = (String, TagValue)>>(iter: I) -> Self {
		Self {
			items: iter.into_iter().collect(),
		}
	}
}
