//! Cover art resolution across the vendor storage conventions

use super::TagMap;
use crate::config::global_options;
use crate::picture::PICTURE_TYPE_COVER_FRONT;
use crate::scan::{RawTags, ESCIENT_ARTWORK};

use data_encoding::BASE64;

/// Picks cover art from the first applicable source and stores it under `ARTWORK`
///
/// Sources are tried in order: standard picture blocks (front cover
/// preferred), the deprecated base64 `COVERART` comment, and the Escient
/// application block. `COVER_LENGTH` always carries the byte length of the
/// resolved image; when artwork suppression is enabled the bytes themselves
/// are dropped and `ARTWORK` carries the length instead.
pub fn resolve_artwork(tags: &mut TagMap, raw: &RawTags) {
	let Some(artwork) = pick_artwork(tags, raw) else {
		return;
	};

	let length = artwork.len() as i64;

	if unsafe { global_options() }.suppress_artwork {
		tags.insert("ARTWORK", length);
	} else {
		tags.insert("ARTWORK", artwork);
	}

	tags.insert("COVER_LENGTH", length);
}

fn pick_artwork(tags: &TagMap, raw: &RawTags) -> Option<Vec<u8>> {
	// Standard picture blocks win; a front cover wins over everything else
	if !raw.pictures.is_empty() {
		let mut pictures: Vec<_> = raw.pictures.iter().collect();
		pictures.sort_by_key(|picture| picture.picture_type);

		let picture = pictures
			.iter()
			.find(|picture| picture.picture_type == PICTURE_TYPE_COVER_FRONT)
			.unwrap_or(&pictures[0]);

		return Some(picture.data.clone());
	}

	if let Some(encoded) = tags.get_text("COVERART") {
		match BASE64.decode(encoded.as_bytes()) {
			Ok(data) => return Some(data),
			Err(_) => {
				log::warn!("Unable to decode the COVERART comment, ignoring");
				return None;
			},
		}
	}

	if let Some(payload) = raw.applications.get(&ESCIENT_ARTWORK) {
		if payload.len() > 4 && &payload[..4] == b"PIC1" {
			return Some(payload[4..].to_vec());
		}
	}

	None
}
