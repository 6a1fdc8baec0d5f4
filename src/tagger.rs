//! The top-level tag reader
//!
//! Reads one FLAC file into a canonical tag map and, when the file carries an
//! embedded cue sheet, splits it into virtual per-track entries persisted
//! through the catalog.

use crate::catalog::{Catalog, UpdateOrCreate};
use crate::config::ParseOptions;
use crate::cue::{self, CueSource};
use crate::error::{ErrorKind, Result};
use crate::scan::{scan, ScanResult};
use crate::split::split_tracks;
use crate::tag::{do_tag_mapping, inject_info, resolve_artwork, TagMap};
use crate::util::url::{file_url_from_path, format_seconds};

use std::path::Path;
use std::time::UNIX_EPOCH;

/// Reads the tags of the FLAC file at `path`
///
/// For a plain file this returns the normalized tag map. For a file with an
/// embedded cue sheet, every cue track is persisted through `catalog` as a
/// virtual track and the returned map describes the file as a playlist
/// (`CT="fec"`, `AUDIO=false`). When `anchor` names one of the embedded
/// tracks, that track's map is returned instead.
///
/// An unusable container degrades to an empty map; only IO errors surface.
///
/// # Errors
///
/// * `path` cannot be opened or read
pub fn read_tags(
	path: impl AsRef<Path>,
	anchor: Option<&str>,
	catalog: &mut dyn Catalog,
	options: ParseOptions,
) -> Result<TagMap> {
	let path = path.as_ref();

	let result = match scan(path, options) {
		Ok(result) => result,
		Err(e) => {
			if let ErrorKind::Io(_) = e.kind() {
				return Err(e);
			}

			log::warn!("Unable to scan {}: {e}", path.display());
			return Ok(TagMap::new());
		},
	};

	let ScanResult { info, tags: raw } = result;

	if info.samplerate == 0 {
		log::warn!("{} has no sample rate, ignoring", path.display());
		return Ok(TagMap::new());
	}

	let mut tags = raw.items.clone();
	inject_info(&mut tags, &info);
	do_tag_mapping(&mut tags);
	resolve_artwork(&mut tags, &raw);

	// An embedded cue sheet lives either in the CUESHEET metadata block or in
	// a CUESHEET comment
	let mut lines: Vec<String> = if !raw.cuesheet_block.is_empty() {
		raw.cuesheet_block.clone()
	} else if let Some(text) = tags.get_text("CUESHEET") {
		text.split('\n').map(|l| l.trim_end().to_owned()).collect()
	} else {
		return Ok(tags);
	};

	log::debug!("{} contains an embedded cue sheet", path.display());

	// The sheet has no way to know where the last track ends
	let secs = info.song_length_ms / 1000.0;
	lines.push(format!("    REM END {}", format_seconds(secs)));

	tags.insert("FILENAME", path.to_string_lossy().into_owned());

	let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
	let mut tracks = cue::parse(&lines, base_dir, CueSource::Embedded { file: path });

	if tracks.is_empty() {
		log::warn!("Embedded cue sheet in {} is unusable", path.display());
		return Ok(tags);
	}

	let count = split_tracks(&info, &mut tags, &raw, &mut tracks, path);
	if count == 0 {
		log::warn!(
			"Unable to recover per-track metadata from {}",
			path.display()
		);
		return Ok(tags);
	}

	// The file itself becomes a playlist wrapping its virtual tracks
	tags.insert("CT", "fec");
	tags.insert("AUDIO", false);

	let title = tracks
		.get(&1)
		.and_then(|track| track.get_text("ALBUM"))
		.or_else(|| tags.get_text("ALBUM"))
		.map(str::to_owned);
	if let Some(title) = title {
		tags.insert("TITLE", title);
	}

	let file_url = file_url_from_path(path);
	let mtime = std::fs::metadata(path)
		.ok()
		.and_then(|metadata| metadata.modified().ok())
		.and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
		.map_or(0, |age| age.as_secs());

	let mut selected = None;

	for (index, track) in tracks.iter_mut() {
		track.insert("AGE", mtime);
		track.insert("FS", info.file_size);
		track.insert("VIRTUAL", true);

		cue::process_anchor(track);

		let url = track
			.get_text("URI")
			.map_or_else(|| format!("{file_url}#{index}"), str::to_owned);

		let entry = UpdateOrCreate {
			url: url.clone(),
			attributes: track.clone(),
			read_tags: false,
		};

		if let Err(e) = catalog.update_or_create(entry) {
			log::warn!("Unable to persist virtual track {index}: {e}");
		}

		if let Some(anchor) = anchor {
			if url == format!("{file_url}#{anchor}") {
				selected = Some(track.clone());
			}
		}
	}

	Ok(selected.unwrap_or(tags))
}
