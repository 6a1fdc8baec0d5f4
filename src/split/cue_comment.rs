//! Splitting via a cue sheet stored as a `CUESHEET` Vorbis comment
//!
//! This is the text form of the sheet, not the FLAC CUESHEET metadata block.
//! The comment text is terminated with a synthetic `REM END` line so the last
//! track gets an end time, then handed to the cue parser.

use super::SplitContext;
use crate::cue::{self, CueSource};
use crate::tag::do_tag_mapping;
use crate::util::url::format_seconds;

use std::path::Path;

pub(super) fn try_split(ctx: &mut SplitContext<'_>) -> usize {
	let Some(text) = ctx.tags.get_text("CUESHEET") else {
		return 0;
	};

	let secs = ctx.info.song_length_ms / 1000.0;

	let mut lines: Vec<String> = text.split('\n').map(|l| l.trim_end().to_owned()).collect();
	lines.push(format!("    REM END {}", format_seconds(secs)));

	let base_dir = ctx.file.parent().unwrap_or_else(|| Path::new("."));
	let parsed = cue::parse(&lines, base_dir, CueSource::Embedded { file: ctx.file });

	let mut count = 0;

	for (index, track) in ctx.tracks.iter_mut() {
		let Some(meta) = parsed.get(index) else {
			log::warn!("Cue sheet comment has no entry for track {index}, skipping");
			continue;
		};

		// Existing track values win, then the parsed sheet, then stream info
		track.merge_missing(meta);
		track.merge_missing(&ctx.info_tags);

		for (key, value) in ctx.tags.iter() {
			if key != "CUESHEET" && !track.contains(key) {
				track.insert(key, value.clone());
			}
		}

		do_tag_mapping(track);
		count += 1;
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
	fn cuesheet_comment_split() {
		let info = ScanInfo {
			samplerate: 44_100,
			song_length_ms: 360_000.0,
			file_size: 1_000_000,
			..ScanInfo::default()
		};
		let raw = RawTags::default();

		let mut tags = TagMap::new();
		tags.insert("ALBUMARTIST", "The Band");
		tags.insert(
			"CUESHEET",
			"PERFORMER \"The Band\"\n\
			 TITLE \"Live Set\"\n\
			 FILE \"CDImage.flac\" FLAC\n\
			 \x20 TRACK 01 AUDIO\n\
			 \x20   TITLE \"Opener\"\n\
			 \x20   INDEX 01 00:00:00\n\
			 \x20 TRACK 02 AUDIO\n\
			 \x20   TITLE \"Closer\"\n\
			 \x20   INDEX 01 03:00:00",
		);

		let mut tracks = BTreeMap::new();
		tracks.insert(1, TagMap::new());
		tracks.insert(2, TagMap::new());

		let count = split_tracks(&info, &mut tags, &raw, &mut tracks, Path::new("/music/set.flac"));

		assert_eq!(count, 2);

		let first = &tracks[&1];
		assert_eq!(first.get_text("TITLE"), Some("Opener"));
		assert_eq!(first.get_text("ALBUM"), Some("Live Set"));
		assert_eq!(first.get_text("ALBUMARTIST"), Some("The Band"));
		assert_eq!(
			first.get_text("URI"),
			Some("file:///music/set.flac#0-180")
		);
		// The CUESHEET comment itself is never copied to tracks
		assert!(!first.contains("CUESHEET"));

		let second = &tracks[&2];
		assert_eq!(second.get_text("TITLE"), Some("Closer"));
		// The synthetic terminator gives the last track its end time
		assert_eq!(
			second.get_text("URI"),
			Some("file:///music/set.flac#180-360")
		);
	}

	#[test]
	fn unmatched_tracks_are_skipped() {
		let info = ScanInfo {
			samplerate: 44_100,
			song_length_ms: 100_000.0,
			..ScanInfo::default()
		};
		let raw = RawTags::default();

		let mut tags = TagMap::new();
		tags.insert(
			"CUESHEET",
			"FILE \"a.flac\" FLAC\n  TRACK 01 AUDIO\n    INDEX 01 00:00:00",
		);

		// The table has a track the sheet does not mention
		let mut tracks = BTreeMap::new();
		tracks.insert(1, TagMap::new());
		tracks.insert(7, TagMap::new());

		let count = split_tracks(&info, &mut tags, &raw, &mut tracks, Path::new("/a.flac"));

		assert_eq!(count, 1);
		assert!(tracks[&1].contains("URI"));
		assert!(!tracks[&7].contains("URI"));
	}
}
