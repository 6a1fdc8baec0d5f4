//! Projection of container stream info into canonical tag fields

use super::TagMap;
use crate::scan::ScanInfo;

/// Writes the container-level stream info into `tags`
///
/// FLAC audio frames are self-locating, so playback starts at byte zero and
/// `OFFSET` is always 0; `LOSSLESS` is unconditionally true.
pub fn inject_info(tags: &mut TagMap, info: &ScanInfo) {
	tags.insert("SIZE", info.file_size);
	tags.insert("SECS", info.song_length_ms / 1000.0);
	tags.insert("OFFSET", 0i64);
	tags.insert("BITRATE", info.bitrate.floor() as i64);
	tags.insert("VBR_SCALE", 1i64);
	tags.insert("RATE", info.samplerate);
	tags.insert("SAMPLESIZE", i64::from(info.bits_per_sample));
	tags.insert("CHANNELS", i64::from(info.channels));
	tags.insert("LOSSLESS", true);

	if let Some(id3_version) = &info.id3_version {
		tags.insert("TAGVERSION", format!("FLAC, {id3_version}"));
	}
}
