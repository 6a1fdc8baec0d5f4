//! A narrow cue sheet text parser
//!
//! Parses the command set embedded FLAC cue sheets use in the wild and keys
//! the result by the 1-based TRACK ordinal. Unknown commands are skipped, not
//! errors; a cue sheet is advisory data.

use crate::tag::TagMap;
use crate::util::url::{file_url_from_path, format_seconds};

use std::collections::BTreeMap;
use std::path::Path;

/// Where the cue sheet came from
///
/// Embedded sheets always describe the file that carries them, so their
/// `FILE` commands are ignored.
#[derive(Copy, Clone, Debug)]
pub enum CueSource<'a> {
	/// A sheet embedded in the FLAC file at this path
	Embedded {
		/// The carrying file
		file: &'a Path,
	},
	/// A standalone sheet whose `FILE` commands are resolved against the base directory
	Standalone,
}

#[derive(Default)]
struct SheetState {
	album_title: Option<String>,
	album_performer: Option<String>,
	album_songwriter: Option<String>,
	year: Option<String>,
	genre: Option<String>,
	comment: Option<String>,
	end_secs: Option<f64>,
}

#[derive(Default)]
struct TrackState {
	number: u32,
	file: Option<String>,
	title: Option<String>,
	performer: Option<String>,
	songwriter: Option<String>,
	index00: Option<f64>,
	index01: Option<f64>,
}

/// Parses cue sheet `lines` into a 1-based track table
///
/// Sheet-level `TITLE`/`PERFORMER` become per-track `ALBUM`/`ALBUMARTIST`
/// (and the default `ARTIST`); track-level commands override. Each track
/// carries `URI` with a `#start-end` seconds fragment, `TRACKNUM`, `START`,
/// and `END` where derivable.
pub fn parse(lines: &[String], base_dir: &Path, source: CueSource<'_>) -> BTreeMap<u32, TagMap> {
	let mut sheet = SheetState::default();
	let mut tracks: Vec<TrackState> = Vec::new();
	let mut current_file = None;

	for line in lines {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		let (command, rest) = match line.split_once(char::is_whitespace) {
			Some((command, rest)) => (command.to_ascii_uppercase(), rest.trim()),
			None => (line.to_ascii_uppercase(), ""),
		};

		match command.as_str() {
			"FILE" => current_file = Some(unquote(rest).to_owned()),
			"TRACK" => {
				let number = rest
					.split_whitespace()
					.next()
					.and_then(|n| n.parse().ok())
					.unwrap_or(tracks.len() as u32 + 1);

				tracks.push(TrackState {
					number,
					file: current_file.clone(),
					..TrackState::default()
				});
			},
			"TITLE" => match tracks.last_mut() {
				Some(track) => track.title = Some(unquote(rest).to_owned()),
				None => sheet.album_title = Some(unquote(rest).to_owned()),
			},
			"PERFORMER" => match tracks.last_mut() {
				Some(track) => track.performer = Some(unquote(rest).to_owned()),
				None => sheet.album_performer = Some(unquote(rest).to_owned()),
			},
			"SONGWRITER" => match tracks.last_mut() {
				Some(track) => track.songwriter = Some(unquote(rest).to_owned()),
				None => sheet.album_songwriter = Some(unquote(rest).to_owned()),
			},
			"INDEX" => {
				let mut args = rest.split_whitespace();
				let index_number = args.next().and_then(|n| n.parse::<u8>().ok());
				let time = args.next().and_then(msf_to_secs);

				if let (Some(track), Some(time)) = (tracks.last_mut(), time) {
					match index_number {
						Some(0) => track.index00 = Some(time),
						Some(1) => track.index01 = Some(time),
						_ => {},
					}
				}
			},
			"REM" => parse_rem(rest, &mut sheet),
			// PREGAP/POSTGAP lengths, CATALOG, ISRC, FLAGS carry nothing the
			// track table needs
			_ => log::trace!("Skipping cue command {command}"),
		}
	}

	if tracks.is_empty() {
		return BTreeMap::new();
	}

	let file_url = |track: &TrackState| match source {
		CueSource::Embedded { file } => file_url_from_path(file),
		CueSource::Standalone => {
			let name = track.file.clone().unwrap_or_default();
			file_url_from_path(&base_dir.join(name))
		},
	};

	let mut table = BTreeMap::new();

	for (position, track) in tracks.iter().enumerate() {
		let start = track.index01.or(track.index00).unwrap_or(0.0);

		// A track ends where its successor begins; the last one at REM END
		let end = match tracks.get(position + 1) {
			Some(next) => next.index00.or(next.index01),
			None => sheet.end_secs,
		};

		let mut tags = TagMap::new();
		tags.insert("TRACKNUM", i64::from(track.number));
		tags.insert("START", start);

		let end_fragment = match end {
			Some(end) => {
				tags.insert("END", end);
				format_seconds(end)
			},
			None => String::new(),
		};

		tags.insert(
			"URI",
			format!(
				"{}#{}-{end_fragment}",
				file_url(track),
				format_seconds(start)
			),
		);

		if let Some(title) = &track.title {
			tags.insert("TITLE", title.clone());
		}
		if let Some(performer) = track.performer.as_ref().or(sheet.album_performer.as_ref()) {
			tags.insert("ARTIST", performer.clone());
		}
		if let Some(songwriter) = track
			.songwriter
			.as_ref()
			.or(sheet.album_songwriter.as_ref())
		{
			tags.insert("SONGWRITER", songwriter.clone());
		}
		if let Some(album) = &sheet.album_title {
			tags.insert("ALBUM", album.clone());
		}
		if let Some(performer) = &sheet.album_performer {
			tags.insert("ALBUMARTIST", performer.clone());
		}
		if let Some(year) = &sheet.year {
			tags.insert("YEAR", year.clone());
		}
		if let Some(genre) = &sheet.genre {
			tags.insert("GENRE", genre.clone());
		}
		if let Some(comment) = &sheet.comment {
			tags.insert("COMMENT", comment.clone());
		}

		table.insert(track.number, tags);
	}

	table
}

/// Normalizes a track's URI fragment from its `START`/`END` values
///
/// Anchors written by hand (or by other rippers) carry inconsistent decimal
/// formatting; playback matches anchors textually, so they are rewritten in
/// one canonical form.
pub fn process_anchor(track: &mut TagMap) {
	let Some(uri) = track.get_text("URI") else {
		return;
	};

	let Some((base, _)) = uri.split_once('#') else {
		return;
	};

	let start = track.get("START").and_then(|v| v.as_float()).unwrap_or(0.0);
	let end = track
		.get("END")
		.and_then(|v| v.as_float())
		.map(format_seconds)
		.unwrap_or_default();

	let uri = format!("{base}#{}-{end}", format_seconds(start));
	track.insert("URI", uri);
}

fn parse_rem(rest: &str, sheet: &mut SheetState) {
	let (keyword, value) = match rest.split_once(char::is_whitespace) {
		Some((keyword, value)) => (keyword.to_ascii_uppercase(), value.trim()),
		None => return,
	};

	match keyword.as_str() {
		"DATE" | "YEAR" => sheet.year = Some(unquote(value).to_owned()),
		"GENRE" => sheet.genre = Some(unquote(value).to_owned()),
		"COMMENT" => sheet.comment = Some(unquote(value).to_owned()),
		// The synthetic terminator appended for embedded sheets
		"END" => sheet.end_secs = value.parse().ok(),
		_ => {},
	}
}

fn unquote(value: &str) -> &str {
	let value = value.trim();
	value
		.strip_prefix('"')
		.and_then(|v| v.strip_suffix('"'))
		.unwrap_or(value)
}

// mm:ss:ff at 75 cue frames per second
fn msf_to_secs(time: &str) -> Option<f64> {
	let mut parts = time.split(':');
	let minutes: f64 = parts.next()?.parse().ok()?;
	let seconds: f64 = parts.next()?.parse().ok()?;
	let frames: f64 = match parts.next() {
		Some(frames) => frames.parse().ok()?,
		None => 0.0,
	};

	Some(minutes * 60.0 + seconds + frames / 75.0)
}
