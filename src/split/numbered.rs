//! Grouped ("numbered") Vorbis comment splitting
//!
//! Some rippers tag cue-tracked files as `TITLE(1)`, `TITLE[2]`, etc. A key
//! is grouped when its base name carries a bracketed 1-based group index.

use super::SplitContext;
use crate::tag::do_tag_mapping;

use std::sync::OnceLock;

use regex::Regex;

fn grouped_key_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| {
		Regex::new(r"(?i)^\s*(.+?)\s*[(\[{<](\d+)[)\]}>]$").unwrap()
	})
}

pub(super) fn try_split(ctx: &mut SplitContext<'_>) -> usize {
	let pattern = grouped_key_pattern();

	let titletags = ctx
		.tags
		.keys()
		.filter_map(|key| pattern.captures(key))
		.filter(|captures| captures[1].eq_ignore_ascii_case("TITLE"))
		.count();
	let cuetracks = ctx.tracks.len();

	if titletags == 0 {
		return 0;
	}

	if titletags != cuetracks {
		log::error!(
			"Numbered comment groups ({titletags}) do not match the cue sheet track count ({cuetracks})"
		);
		return 0;
	}

	let mut defaults = crate::tag::TagMap::new();

	for (key, value) in ctx.tags.iter() {
		match pattern.captures(key) {
			Some(captures) => {
				let base = captures[1].to_owned();
				let Ok(group) = captures[2].parse::<u32>() else {
					continue;
				};

				if let Some(track) = ctx.tracks.get_mut(&group) {
					track.insert(base, value.clone());
				}
			},
			None => defaults.insert(key, value.clone()),
		}
	}

	for index in 1..=titletags as u32 {
		if let Some(track) = ctx.tracks.get_mut(&index) {
			track.merge_missing(&defaults);
			do_tag_mapping(track);
			track.insert_missing("TRACKNUM", i64::from(index));
		}
	}

	titletags
}

#[cfg(test)]
mod tests {
	use crate::scan::{RawTags, ScanInfo};
	use crate::split::split_tracks;
	use crate::tag::TagMap;

	use std::collections::BTreeMap;
	use std::path::Path;

	fn two_track_table() -> BTreeMap<u32, TagMap> {
		let mut tracks = BTreeMap::new();
		tracks.insert(1, TagMap::new());
		tracks.insert(2, TagMap::new());
		tracks
	}

	#[test]
	fn numbered_comments_split() {
		let info = ScanInfo {
			samplerate: 44_100,
			..ScanInfo::default()
		};
		let raw = RawTags::default();

		let mut tags = TagMap::new();
		tags.insert("ARTIST", "A");
		tags.insert("ALBUM", "B");
		tags.insert("TITLE(1)", "One");
		tags.insert("TITLE(2)", "Two");
		tags.insert("TRACKNUMBER(1)", "1");
		tags.insert("TRACKNUMBER(2)", "2");

		let mut tracks = two_track_table();
		let count = split_tracks(&info, &mut tags, &raw, &mut tracks, Path::new("/a.flac"));

		assert_eq!(count, 2);

		let first = &tracks[&1];
		assert_eq!(first.get_text("TITLE"), Some("One"));
		assert_eq!(first.get_int("TRACKNUM"), Some(1));
		assert_eq!(first.get_text("ARTIST"), Some("A"));
		assert_eq!(first.get_text("ALBUM"), Some("B"));

		let second = &tracks[&2];
		assert_eq!(second.get_text("TITLE"), Some("Two"));
		assert_eq!(second.get_int("TRACKNUM"), Some(2));
		assert_eq!(second.get_text("ARTIST"), Some("A"));
	}

	#[test]
	fn group_count_mismatch_returns_zero_tracks() {
		let info = ScanInfo::default();
		let raw = RawTags::default();

		let mut tags = TagMap::new();
		tags.insert("TITLE(1)", "One");
		// Three cue tracks, one title group

		let mut tracks = two_track_table();
		tracks.insert(3, TagMap::new());

		let count = split_tracks(&info, &mut tags, &raw, &mut tracks, Path::new("/a.flac"));

		// The mismatch kills the numbered strategy; the fallback then
		// propagates the file-level tags instead
		assert_eq!(count, 3);
		assert_eq!(tracks[&1].get_text("TITLE(1)"), Some("One"));
		assert!(tracks[&1].get_text("TITLE").is_none());
	}

	#[test]
	fn bracket_variants_are_grouped() {
		let pattern = super::grouped_key_pattern();

		for key in ["TITLE(4)", "TITLE[4]", "TITLE{4}", "TITLE<4>", " TITLE (4)"] {
			let captures = pattern.captures(key).unwrap();
			assert!(captures[1].trim().eq_ignore_ascii_case("TITLE"), "{key}");
			assert_eq!(&captures[2], "4");
		}

		assert!(pattern.captures("TITLE").is_none());
		assert!(pattern.captures("TITLE(x)").is_none());
	}
}
