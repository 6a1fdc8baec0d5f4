//! CDDB-style tag splitting
//!
//! Files tagged from a CDDB export carry `DTITLE` ("Artist / Album"),
//! `DGENRE`, `DYEAR`, and one `TTITLE<n>` comment per track, with `n` taken
//! directly from the export (0-based in the wild).

use super::SplitContext;
use crate::tag::do_tag_mapping;

use std::sync::OnceLock;

use regex::Regex;

fn ttitle_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| Regex::new(r"^TTITLE(\d+)$").unwrap())
}

pub(super) fn try_split(ctx: &mut SplitContext<'_>) -> usize {
	if !ctx.tags.contains("DTITLE") {
		return 0;
	}

	if let Some(dtitle) = ctx
		.tags
		.remove("DTITLE")
		.and_then(|v| v.text().map(str::to_owned))
	{
		match dtitle.split_once('/') {
			Some((artist, album)) => {
				ctx.tags.insert("ARTIST", artist.trim());
				ctx.tags.insert("ALBUM", album.trim());
			},
			None => {
				ctx.tags.insert("ARTIST", dtitle.trim());
			},
		}
	}

	ctx.tags.rename("DGENRE", "GENRE");
	ctx.tags.rename("DYEAR", "YEAR");

	let numbered: Vec<(String, u32)> = ctx
		.tags
		.keys()
		.filter_map(|key| {
			ttitle_pattern()
				.captures(key)
				.and_then(|captures| captures[1].parse().ok())
				.map(|n| (key.to_owned(), n))
		})
		.collect();

	let mut count = 0;

	for (key, n) in numbered {
		let Some(value) = ctx
			.tags
			.remove(&key)
			.and_then(|v| v.text().map(str::to_owned))
		else {
			continue;
		};

		let track = ctx.tracks.entry(n).or_default();

		// "Song / Guest" encodes a per-track artist
		match value.split_once(" / ") {
			Some((artist, title)) => {
				track.insert("ARTIST", artist);
				track.insert("TITLE", title);
			},
			None => track.insert("TITLE", value),
		}

		track.insert("TRACKNUM", i64::from(n));
		count += 1;
	}

	if count == 0 {
		return 0;
	}

	let mut defaults = ctx.tags.clone();
	defaults.merge_missing(&ctx.info_tags);

	for track in ctx.tracks.values_mut() {
		track.merge_missing(&defaults);
		do_tag_mapping(track);
	}

	count
}

#[cfg(test)]
mod tests {
	use crate::scan::{RawTags, ScanInfo};
	use crate::split::split_tracks;
	use crate::tag::TagMap;

	use std::collections::BTreeMap;
	use std::path::Path;

	#[test]
	fn cddb_split() {
		let info = ScanInfo {
			samplerate: 44_100,
			..ScanInfo::default()
		};
		let raw = RawTags::default();

		let mut tags = TagMap::new();
		tags.insert("DTITLE", "Artist X / Album Y");
		tags.insert("TTITLE0", "Intro");
		tags.insert("TTITLE1", "Song / Guest");
		tags.insert("DGENRE", "Rock");
		tags.insert("DYEAR", "1979");

		let mut tracks = BTreeMap::new();
		let count = split_tracks(&info, &mut tags, &raw, &mut tracks, Path::new("/a.flac"));

		assert_eq!(count, 2);
		assert_eq!(tags.get_text("ARTIST"), Some("Artist X"));
		assert_eq!(tags.get_text("ALBUM"), Some("Album Y"));
		assert!(!tags.contains("DTITLE"));
		assert!(!tags.contains("TTITLE0"));

		let first = &tracks[&0];
		assert_eq!(first.get_text("TITLE"), Some("Intro"));
		assert_eq!(first.get_int("TRACKNUM"), Some(0));
		assert_eq!(first.get_text("ARTIST"), Some("Artist X"));
		assert_eq!(first.get_text("GENRE"), Some("Rock"));

		let second = &tracks[&1];
		assert_eq!(second.get_text("ARTIST"), Some("Song"));
		assert_eq!(second.get_text("TITLE"), Some("Guest"));
		assert_eq!(second.get_int("TRACKNUM"), Some(1));
	}
}
