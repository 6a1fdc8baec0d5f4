//! Per-track metadata recovery for cue-tracked files
//!
//! A single FLAC file with an embedded cue sheet hides its per-track metadata
//! in one of several in-the-wild encoding conventions. Each convention is a
//! strategy; they are probed in a fixed order and the first one that yields
//! any tracks wins.

mod cddb;
mod cue_comment;
mod numbered;
mod xml;

use crate::scan::{RawTags, ScanInfo};
use crate::tag::{inject_info, TagMap};

use std::collections::BTreeMap;
use std::path::Path;

/// The per-track metadata encoding conventions, in probe order
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Strategy {
	/// MusicBrainz RDF in an application block
	Xml,
	/// `TITLE(1)`-style grouped Vorbis comments
	NumberedComments,
	/// CDDB exports (`DTITLE`, `TTITLE<n>`)
	Cddb,
	/// A cue sheet stored as a `CUESHEET` Vorbis comment
	CueComment,
	/// Stacked Vorbis comments; disabled pending a usable corpus
	Stacked,
}

const STRATEGY_ORDER: [Strategy; 5] = [
	Strategy::Xml,
	Strategy::NumberedComments,
	Strategy::Cddb,
	Strategy::CueComment,
	Strategy::Stacked,
];

pub(crate) struct SplitContext<'a> {
	pub(crate) info: &'a ScanInfo,
	/// The info fields of [`SplitContext::info`], pre-projected for merging
	pub(crate) info_tags: TagMap,
	/// The file-level tag map (already normalized and info-injected)
	pub(crate) tags: &'a mut TagMap,
	pub(crate) raw: &'a RawTags,
	/// The 1-based cue track table being filled
	pub(crate) tracks: &'a mut BTreeMap<u32, TagMap>,
	pub(crate) file: &'a Path,
}

impl Strategy {
	fn try_split(self, ctx: &mut SplitContext<'_>) -> usize {
		match self {
			Self::Xml => xml::try_split(ctx),
			Self::NumberedComments => numbered::try_split(ctx),
			Self::Cddb => cddb::try_split(ctx),
			Self::CueComment => cue_comment::try_split(ctx),
			Self::Stacked => {
				log::trace!("Stacked Vorbis comment strategy is disabled");
				0
			},
		}
	}
}

/// Fills the cue track table with per-track metadata
///
/// Returns the number of tracks a strategy produced. When every strategy
/// comes up empty, the file-level tags are propagated fill-only to every
/// track as a last resort.
pub(crate) fn split_tracks(
	info: &ScanInfo,
	tags: &mut TagMap,
	raw: &RawTags,
	tracks: &mut BTreeMap<u32, TagMap>,
	file: &Path,
) -> usize {
	let mut info_tags = TagMap::new();
	inject_info(&mut info_tags, info);

	let mut ctx = SplitContext {
		info,
		info_tags,
		tags,
		raw,
		tracks,
		file,
	};

	for strategy in STRATEGY_ORDER {
		let count = strategy.try_split(&mut ctx);
		if count > 0 {
			log::debug!("Split {count} tracks via {strategy:?}");
			return count;
		}
	}

	// Nothing recognized the tag layout; the file-level tags are better than
	// an empty track
	if !ctx.tags.is_empty() {
		log::debug!("No splitter strategy matched, propagating file-level tags");

		for track in ctx.tracks.values_mut() {
			track.merge_missing(ctx.tags);
		}

		return ctx.tracks.len();
	}

	0
}
