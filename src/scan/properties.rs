use crate::error::Result;

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

/// Container-level stream info for a FLAC file
///
/// A `samplerate` of zero marks an unusable container; callers degrade to an
/// empty result rather than erroring.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanInfo {
	/// Total file size in bytes
	pub file_size: u64,
	/// Duration in milliseconds, derived from the sample count
	pub song_length_ms: f64,
	/// Average audio bitrate in bits per second
	pub bitrate: f64,
	/// Sample rate (Hz)
	pub samplerate: u32,
	/// Bits per sample
	pub bits_per_sample: u8,
	/// Channel count
	pub channels: u8,
	/// Total sample count as stored; untrusted, may be bogus in the wild
	pub total_samples: i64,
	/// Byte offset of the first audio frame
	pub audio_offset: u64,
	/// Version string of a leading ID3v2 tag, when one was skipped
	pub id3_version: Option<String>,
}

pub(super) fn read_properties<R>(
	stream_info: &mut R,
	stream_length: u64,
	file_length: u64,
) -> Result<ScanInfo>
where
	R: Read,
{
	// Skip 4 bytes
	// Minimum block size (2)
	// Maximum block size (2)
	stream_info.read_u32::<BigEndian>()?;

	// Skip 6 bytes
	// Minimum frame size (3)
	// Maximum frame size (3)
	stream_info.read_uint::<BigEndian>(6)?;

	// Read 4 bytes
	// Sample rate (20 bits)
	// Number of channels (3 bits)
	// Bits per sample (5 bits)
	// Total samples (first 4 bits)
	let info = stream_info.read_u32::<BigEndian>()?;

	let sample_rate = info >> 12;
	let bits_per_sample = ((info >> 4) & 0b11111) + 1;
	let channels = ((info >> 9) & 7) + 1;

	// Read the remaining 32 bits of the total samples
	let total_samples = u64::from(stream_info.read_u32::<BigEndian>()?) | u64::from(info & 0xF) << 32;

	let mut properties = ScanInfo {
		file_size: file_length,
		samplerate: sample_rate,
		bits_per_sample: bits_per_sample as u8,
		channels: channels as u8,
		total_samples: total_samples as i64,
		..ScanInfo::default()
	};

	if sample_rate > 0 && total_samples > 0 {
		let length_ms = (total_samples as f64 * 1000.0) / f64::from(sample_rate);
		properties.song_length_ms = length_ms;

		if length_ms > 0.0 && stream_length > 0 {
			properties.bitrate = (stream_length as f64 * 8000.0) / length_ms;
		}
	}

	Ok(properties)
}

#[cfg(test)]
pub(crate) fn encode_streaminfo(
	samplerate: u32,
	channels: u8,
	bits_per_sample: u8,
	total_samples: u64,
) -> Vec<u8> {
	use byteorder::WriteBytesExt;
	use std::io::Write;

	let mut content = Vec::with_capacity(34);
	content.write_u16::<BigEndian>(4096).unwrap(); // min block size
	content.write_u16::<BigEndian>(4096).unwrap(); // max block size
	content.write_uint::<BigEndian>(0, 6).unwrap(); // frame sizes

	let packed = (samplerate << 12)
		| (u32::from(channels) - 1) << 9
		| (u32::from(bits_per_sample) - 1) << 4
		| ((total_samples >> 32) as u32 & 0xF);
	content.write_u32::<BigEndian>(packed).unwrap();
	content
		.write_u32::<BigEndian>((total_samples & 0xFFFF_FFFF) as u32)
		.unwrap();
	content.write_all(&[0u8; 16]).unwrap(); // MD5
	content
}

#[cfg(test)]
mod tests {
	use super::{encode_streaminfo, read_properties};

	#[test]
	fn streaminfo_unpacking() {
		let content = encode_streaminfo(44_100, 2, 16, 441_000);
		let info = read_properties(&mut &content[..], 1_000_000, 1_008_192).unwrap();

		assert_eq!(info.samplerate, 44_100);
		assert_eq!(info.channels, 2);
		assert_eq!(info.bits_per_sample, 16);
		assert_eq!(info.total_samples, 441_000);
		assert!((info.song_length_ms - 10_000.0).abs() < 1e-9);
		assert!((info.bitrate - 800_000.0).abs() < 1.0);
		assert_eq!(info.file_size, 1_008_192);
	}
}
