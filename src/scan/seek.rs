//! Frame seeking through the SEEKTABLE block

use super::block::{Block, BLOCK_ID_SEEKTABLE};
use super::read::{skip_id3v2, verify_flac};
use crate::error::Result;
use crate::macros::decode_err;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

const SEEK_POINT_SIZE: usize = 18;
const PLACEHOLDER_POINT: u64 = u64::MAX;

/// Returns the byte offset of the audio frame at or before `ms`
///
/// The embedded SEEKTABLE gives exact offsets; without one, the offset is a
/// linear estimate over the audio region. The reader is expected to be
/// positioned at the start of the stream.
///
/// # Errors
///
/// * The stream is not a valid FLAC container
/// * The stream has no sample rate to resolve `ms` against
pub fn find_frame_fh<R>(data: &mut R, ms: u64) -> Result<u64>
where
	R: Read + Seek,
{
	skip_id3v2(data)?;
	let stream_info = verify_flac(data)?;

	let mut seektable = None;
	let mut last_block = stream_info.last;

	while !last_block {
		let block = Block::read(data, |block_type| block_type == BLOCK_ID_SEEKTABLE)?;
		last_block = block.last;

		if block.ty == BLOCK_ID_SEEKTABLE && !block.content.is_empty() {
			seektable = Some(block.content);
		}
	}

	let audio_offset = data.stream_position()?;
	let file_size = data.seek(SeekFrom::End(0))?;

	let info =
		super::properties::read_properties(&mut &stream_info.content[..], 0, file_size)?;

	if info.samplerate == 0 {
		decode_err!(@BAIL "File has no sample rate to seek against");
	}

	let target_sample = ms * u64::from(info.samplerate) / 1000;

	if let Some(seektable) = seektable {
		let mut best = None;

		let mut reader = &seektable[..];
		for _ in 0..seektable.len() / SEEK_POINT_SIZE {
			let sample = reader.read_u64::<BigEndian>()?;
			let offset = reader.read_u64::<BigEndian>()?;
			let _frame_samples = reader.read_u16::<BigEndian>()?;

			if sample == PLACEHOLDER_POINT {
				continue;
			}

			if sample <= target_sample {
				best = Some(offset);
			}
		}

		if let Some(offset) = best {
			return Ok(audio_offset + offset);
		}
	}

	// No usable seek point; fall back to a linear estimate
	if info.song_length_ms <= 0.0 {
		return Ok(audio_offset);
	}

	let fraction = (ms as f64 / info.song_length_ms).clamp(0.0, 1.0);
	let estimate = audio_offset as f64 + fraction * (file_size - audio_offset) as f64;

	Ok(estimate as u64)
}
