//! The vendor-to-canonical tag mapping pass

use super::{TagMap, TagValue};

use std::sync::OnceLock;

use regex::Regex;

// The in-the-wild key universe, mapped onto the canonical vocabulary.
// Keys are matched case-sensitively against already upper-cased comments.
const TAG_RENAMES: &[(&str, &str)] = &[
	("TRACKNUMBER", "TRACKNUM"),
	("DISCNUMBER", "DISC"),
	("DISCTOTAL", "DISCC"),
	("TOTALDISCS", "DISCC"),
	("URL", "URLTAG"),
	("BPM", "BPM"),
	("DESCRIPTION", "COMMENT"),
	("ORIGINALYEAR", "YEAR"),
	("UNSYNCEDLYRICS", "LYRICS"),
	("REPLAY GAIN", "REPLAYGAIN_TRACK_GAIN"),
	("PEAK LEVEL", "REPLAYGAIN_TRACK_PEAK"),
	("DISC #", "DISC"),
	("ALBUM ARTIST", "ALBUMARTIST"),
	("MUSICBRAINZ_SORTNAME", "ARTISTSORT"),
	("MUSICBRAINZ_ALBUMARTIST", "ALBUMARTIST"),
	("MUSICBRAINZ_ALBUMARTISTID", "MUSICBRAINZ_ALBUMARTIST_ID"),
	("MUSICBRAINZ_ALBUMID", "MUSICBRAINZ_ALBUM_ID"),
	("MUSICBRAINZ_ALBUMSTATUS", "MUSICBRAINZ_ALBUM_STATUS"),
	("MUSICBRAINZ_ALBUMTYPE", "RELEASETYPE"),
	("MUSICBRAINZ_ALBUM_TYPE", "RELEASETYPE"),
	("MUSICBRAINZ_ARTISTID", "MUSICBRAINZ_ARTIST_ID"),
	("MUSICBRAINZ_TRACKID", "MUSICBRAINZ_ID"),
	("MUSICBRAINZ_TRMID", "MUSICBRAINZ_TRM_ID"),
];

fn year_pattern() -> &'static Regex {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN.get_or_init(|| Regex::new(r"\d{4}").unwrap())
}

/// Rewrites vendor tag keys to the canonical vocabulary
///
/// Each rename moves the value; the source key is removed. `YEAR` is derived
/// from `DATE` when absent, and `BPM` is coerced to an integer. The pass is
/// idempotent: canonical input passes through unchanged.
pub fn do_tag_mapping(tags: &mut TagMap) {
	for (from, to) in TAG_RENAMES {
		if from != to {
			tags.rename(from, to);
		}
	}

	derive_year(tags);
	coerce_bpm(tags);
}

fn derive_year(tags: &mut TagMap) {
	if tags.contains("YEAR") || !tags.contains("DATE") {
		return;
	}

	// Multi-value DATE collapses to its smallest element first
	if let Some(items) = tags.get("DATE").and_then(TagValue::list) {
		let smallest = items.iter().min().cloned().unwrap_or_default();
		tags.insert("DATE", smallest);
	}

	let date = match tags.get("DATE") {
		Some(TagValue::Text(text)) => text.clone(),
		Some(TagValue::Int(int)) => int.to_string(),
		_ => return,
	};

	if let Some(matched) = year_pattern().find(&date) {
		if let Ok(year) = matched.as_str().parse::<i64>() {
			tags.insert("YEAR", year);
		}
	}
}

fn coerce_bpm(tags: &mut TagMap) {
	let Some(value) = tags.get("BPM") else {
		return;
	};

	match value {
		TagValue::Int(_) => {},
		other => {
			if let Some(bpm) = other.as_float() {
				tags.insert("BPM", bpm.trunc() as i64);
			}
		},
	}
}

#[cfg(test)]
mod tests {
	use super::do_tag_mapping;
	use crate::tag::{TagMap, TagValue};

	#[test]
	fn renames_move_values() {
		let mut tags = TagMap::new();
		tags.insert("TRACKNUMBER", "3");
		tags.insert("ALBUM ARTIST", "Various");
		tags.insert("MUSICBRAINZ_ALBUMID", "abcd");

		do_tag_mapping(&mut tags);

		assert_eq!(tags.get_text("TRACKNUM"), Some("3"));
		assert_eq!(tags.get_text("ALBUMARTIST"), Some("Various"));
		assert_eq!(tags.get_text("MUSICBRAINZ_ALBUM_ID"), Some("abcd"));
		assert!(!tags.contains("TRACKNUMBER"));
		assert!(!tags.contains("ALBUM ARTIST"));
		assert!(!tags.contains("MUSICBRAINZ_ALBUMID"));
	}

	#[test]
	fn year_from_date() {
		let mut tags = TagMap::new();
		tags.insert("DATE", "1997-10-21");

		do_tag_mapping(&mut tags);

		assert_eq!(tags.get_int("YEAR"), Some(1997));
		// DATE itself is kept
		assert_eq!(tags.get_text("DATE"), Some("1997-10-21"));
	}

	#[test]
	fn year_from_multi_value_date() {
		let mut tags = TagMap::new();
		tags.insert(
			"DATE",
			vec![String::from("2003-05-01"), String::from("1999")],
		);

		do_tag_mapping(&mut tags);

		// The lexicographically smallest element wins
		assert_eq!(tags.get_text("DATE"), Some("1999"));
		assert_eq!(tags.get_int("YEAR"), Some(1999));
	}

	#[test]
	fn existing_year_wins_over_date() {
		let mut tags = TagMap::new();
		tags.insert("YEAR", 1984i64);
		tags.insert("DATE", "2001-01-01");

		do_tag_mapping(&mut tags);

		assert_eq!(tags.get_int("YEAR"), Some(1984));
	}

	#[test]
	fn bpm_truncates() {
		let mut tags = TagMap::new();
		tags.insert("BPM", "127.8");

		do_tag_mapping(&mut tags);

		assert_eq!(tags.get("BPM"), Some(&TagValue::Int(127)));
	}

	#[test]
	fn mapping_is_idempotent() {
		let mut tags = TagMap::new();
		tags.insert("TRACKNUMBER", "3");
		tags.insert("DATE", "1997-10-21");
		tags.insert("BPM", "90.5");
		tags.insert("DISC #", "2");

		do_tag_mapping(&mut tags);
		let once = tags.clone();
		do_tag_mapping(&mut tags);

		assert_eq!(tags, once);
	}
}
