//! The narrow interface to the track catalog
//!
//! The orchestrator persists virtual (cue-derived) tracks through this trait;
//! the crate never talks to a database itself.

use crate::error::Result;
use crate::tag::TagMap;

/// A single catalog upsert
#[derive(Clone, Debug)]
pub struct UpdateOrCreate {
	/// The track URL, including any `#start-end` fragment
	pub url: String,
	/// The track's tag map
	pub attributes: TagMap,
	/// Whether the catalog should re-read tags from the file itself
	///
	/// Always `false` for virtual tracks; their metadata only exists here.
	pub read_tags: bool,
}

/// Receives track records and derived stream facts
pub trait Catalog {
	/// Inserts or updates a track record
	fn update_or_create(&mut self, entry: UpdateOrCreate) -> Result<()>;

	/// Reports a duration derived outside a full scan
	fn set_duration(&mut self, url: &str, secs: f64) -> Result<()> {
		let _ = (url, secs);
		Ok(())
	}
}

/// A catalog that drops everything
#[derive(Copy, Clone, Debug, Default)]
pub struct NullCatalog;

impl Catalog for NullCatalog {
	fn update_or_create(&mut self, _entry: UpdateOrCreate) -> Result<()> {
		Ok(())
	}
}

/// An in-memory catalog, mainly useful for tests
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
	/// Upserts, in call order
	pub entries: Vec<UpdateOrCreate>,
	/// Reported durations, in call order
	pub durations: Vec<(String, f64)>,
}

impl Catalog for MemoryCatalog {
	fn update_or_create(&mut self, entry: UpdateOrCreate) -> Result<()> {
		self.entries.push(entry);
		Ok(())
	}

	fn set_duration(&mut self, url: &str, secs: f64) -> Result<()> {
		self.durations.push((url.to_owned(), secs));
		Ok(())
	}
}
