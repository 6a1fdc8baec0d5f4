//! Rendering of the binary CUESHEET metadata block into cue text lines
//!
//! The embedded-cue pipeline only speaks cue sheet text, so the binary block
//! is rendered into the same line set an extracted `.cue` file would carry.

use crate::error::Result;
use crate::macros::decode_err;
use crate::util::text::utf8_decode_str;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

const LEAD_OUT_TRACK_CD: u8 = 170;

pub(super) fn render_cuesheet(content: &[u8], samplerate: u32) -> Result<Vec<String>> {
	let mut reader = std::io::Cursor::new(content);
	let mut lines = Vec::new();

	// Frame math needs a sample rate; a CD-DA rate is the only sane fallback
	let samplerate = if samplerate == 0 { 44_100 } else { samplerate };

	let mut catalog = [0u8; 128];
	reader.read_exact(&mut catalog)?;

	if catalog[0] != 0 {
		if let Ok(number) = utf8_decode_str(&catalog) {
			lines.push(format!("CATALOG {number}"));
		}
	}

	let lead_in = reader.read_u64::<BigEndian>()?;
	let is_cd = (reader.read_u8()? & 0x80) != 0;

	// Reserved
	reader.seek(SeekFrom::Current(258))?;

	lines.push(String::from("FILE \"CDImage.flac\" FLAC"));

	let num_tracks = reader.read_u8()?;
	let mut lead_out = None;

	for _ in 0..num_tracks {
		let track_offset = reader.read_u64::<BigEndian>()?;
		let number = reader.read_u8()?;

		let mut isrc = [0u8; 12];
		reader.read_exact(&mut isrc)?;

		let flags = reader.read_u8()?;

		// Reserved
		reader.seek(SeekFrom::Current(13))?;

		let num_indices = reader.read_u8()?;

		// The lead-out track carries no indices and ends the sheet
		if number == LEAD_OUT_TRACK_CD || (!is_cd && number == 255) {
			lead_out = Some((number, track_offset));
			continue;
		}

		lines.push(format!("  TRACK {number:02} AUDIO"));

		if flags & 0x10 != 0 {
			lines.push(String::from("    FLAGS PRE"));
		}

		if isrc[0] != 0 {
			if let Ok(isrc) = utf8_decode_str(&isrc) {
				lines.push(format!("    ISRC {isrc}"));
			}
		}

		for _ in 0..num_indices {
			let index_offset = reader.read_u64::<BigEndian>()?;
			let index_number = reader.read_u8()?;

			// Reserved
			reader.seek(SeekFrom::Current(3))?;

			lines.push(format!(
				"    INDEX {index_number:02} {}",
				msf(track_offset + index_offset, samplerate)
			));
		}
	}

	lines.push(format!("REM FLAC__lead-in {lead_in}"));

	let Some((number, offset)) = lead_out else {
		decode_err!(@BAIL "Cue sheet is missing its lead-out track");
	};
	lines.push(format!("REM FLAC__lead-out {number} {offset}"));

	Ok(lines)
}

// mm:ss:ff at 75 cue frames per second
fn msf(sample: u64, samplerate: u32) -> String {
	let total_frames = sample * 75 / u64::from(samplerate);
	let frames = total_frames % 75;
	let seconds = (total_frames / 75) % 60;
	let minutes = total_frames / 75 / 60;

	format!("{minutes:02}:{seconds:02}:{frames:02}")
}
