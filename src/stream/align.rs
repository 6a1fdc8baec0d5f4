//! The streaming frame aligner
//!
//! A FLAC byte stream entered at an arbitrary position (mid-stream seek,
//! resumed transfer) is not decodable until it starts on a frame boundary.
//! [`FrameAligner`] is a per-stream filter that buffers bytes until it finds a
//! frame header whose CRC-8 validates, then re-emits everything from that
//! header onward.

use super::crc::crc8;

use byteorder::{BigEndian, ByteOrder};

// Sync pattern over the 32-bit header view, bits 31..19
const SYNC_MASK: u32 = 0xFFF8_0000;

// Candidates shorter than this stay buffered; the longest possible header
// (7-byte sample number, 16-bit block size and sample rate) must fit
const MIN_SEARCH_BYTES: usize = 32;

/// A stateful byte-stream filter that aligns output on a FLAC frame boundary
///
/// One aligner is owned by exactly one logical stream. The `chunk` argument
/// of [`FrameAligner::filter`] is both input and output: it carries new bytes
/// in (starting at `offset`) and aligned bytes out.
#[derive(Clone, Debug, Default)]
pub struct FrameAligner {
	inbuf: Vec<u8>,
	aligned: bool,
	bytes: u64,
}

impl FrameAligner {
	/// Creates an aligner for a fresh stream
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether a frame boundary has been found
	pub fn is_aligned(&self) -> bool {
		self.aligned
	}

	/// Number of bytes discarded before the frame boundary
	pub fn bytes_skipped(&self) -> u64 {
		self.bytes
	}

	/// Filters one chunk of the stream
	///
	/// New bytes are taken from `chunk[offset..]`; on return, `chunk` holds
	/// the bytes to pass downstream. The return value is the number of bytes
	/// still buffered for the next call: when the drained data would overflow
	/// the caller's nominal `chunk_size`, a `chunk_size + 1` byte tail is
	/// retained and that count returned. Call sites depend on this exact
	/// convention.
	///
	/// A stream whose very first bytes are the `fLaC` marker needs no
	/// alignment at all and passes through untouched.
	pub fn filter(&mut self, chunk: &mut Vec<u8>, chunk_size: usize, offset: usize) -> usize {
		if self.aligned && self.inbuf.is_empty() {
			return 0;
		}

		if self.inbuf.is_empty() && chunk.get(offset..offset + 4) == Some(b"fLaC".as_slice()) {
			log::debug!("Stream starts at the FLAC marker, no alignment needed");
			self.aligned = true;
			return 0;
		}

		if let Some(input) = chunk.get(offset..) {
			self.inbuf.extend_from_slice(input);
		}

		let mut pos = 0;
		while !self.aligned && self.inbuf.len() - pos > MIN_SEARCH_BYTES {
			let tag = self.inbuf[pos];
			pos += 1;
			self.bytes += 1;

			if tag != 0xFF {
				continue;
			}

			let window = &self.inbuf[pos..];
			let word = BigEndian::read_u32(&window[..4]);
			let candidate = (u32::from(tag) << 24) | (word >> 8);

			if candidate & SYNC_MASK != SYNC_MASK {
				continue;
			}

			if !plausible_header(candidate) {
				continue;
			}

			// How many bytes of header follow the fixed four, starting with
			// the UTF-8 coded sample number
			let mut end = 4;
			let utf8_len = window[3].leading_ones() as usize;
			if utf8_len > 0 {
				end += utf8_len - 1;
			}

			match (candidate >> 12) & 0xF {
				6 => end += 2,
				7 => end += 1,
				_ => {},
			}
			match (candidate >> 8) & 0xF {
				12 => end += 1,
				13 | 14 => end += 2,
				_ => {},
			}

			let mut header = [0u8; 16];
			header[0] = tag;
			header[1..=end].copy_from_slice(&window[..end]);

			if crc8(&header[..=end]) == window[end] {
				log::debug!("Frame boundary found after skipping {} bytes", self.bytes);

				// The tag byte belongs to the frame; put it back
				pos -= 1;
				self.bytes -= 1;
				self.aligned = true;
			}
		}

		self.inbuf.drain(..pos);

		if !self.aligned {
			chunk.clear();
			return 0;
		}

		// Drain buffered bytes back into the caller's chunk slot
		if chunk_size < self.inbuf.len() {
			let keep = chunk_size + 1;
			let emit = self.inbuf.len() - keep;

			chunk.clear();
			chunk.extend_from_slice(&self.inbuf[..emit]);
			self.inbuf.drain(..emit);

			return keep;
		}

		chunk.clear();
		chunk.append(&mut self.inbuf);
		0
	}
}

// Field constraints that cheaply reject most false sync patterns before the
// CRC gets a say
fn plausible_header(candidate: u32) -> bool {
	let block_size = (candidate >> 12) & 0xF;
	let sample_rate = (candidate >> 8) & 0xF;
	let channels = (candidate >> 4) & 0xF;
	let sample_size = (candidate >> 1) & 0x7;

	block_size != 0 && sample_rate != 0xF && channels < 11 && !matches!(sample_size, 0b011 | 0b111)
}

#[cfg(test)]
mod tests {
	use super::FrameAligner;

	// A frame header with blocksize code 0xC, 44.1kHz, stereo, 16-bit,
	// frame number 0. CRC-8 of the first five bytes is 0xC2.
	const FRAME_HEADER: [u8; 6] = [0xFF, 0xF8, 0xC9, 0x18, 0x00, 0xC2];

	fn junk(len: usize) -> Vec<u8> {
		// Deterministic filler that never contains a sync byte
		(0..len).map(|i| (i % 0xFF) as u8).collect()
	}

	#[test]
	fn full_file_passes_through() {
		let mut aligner = FrameAligner::new();

		let mut chunk = b"fLaC\x00\x00\x00\x22rest of the stream".to_vec();
		let original = chunk.clone();

		assert_eq!(aligner.filter(&mut chunk, original.len(), 0), 0);
		assert_eq!(chunk, original);
		assert!(aligner.is_aligned());

		// Subsequent chunks take the fast path untouched
		let mut next = junk(128);
		let expected = next.clone();
		assert_eq!(aligner.filter(&mut next, 128, 0), 0);
		assert_eq!(next, expected);
	}

	#[test]
	fn mid_stream_alignment() {
		let mut aligner = FrameAligner::new();

		let skipped = 1000;
		let mut chunk = junk(skipped);
		chunk.extend_from_slice(&FRAME_HEADER);
		chunk.extend_from_slice(&junk(64));
		let total = chunk.len();

		let buffered = aligner.filter(&mut chunk, total, 0);

		assert_eq!(buffered, 0);
		assert!(aligner.is_aligned());
		assert_eq!(aligner.bytes_skipped(), skipped as u64);

		// Everything from the header onward is re-emitted
		assert_eq!(chunk.len(), FRAME_HEADER.len() + 64);
		assert_eq!(&chunk[..6], &FRAME_HEADER);
	}

	#[test]
	fn sync_without_valid_crc_is_rejected() {
		let mut aligner = FrameAligner::new();

		let mut bad_header = FRAME_HEADER;
		bad_header[5] ^= 0xFF; // break the CRC

		let mut chunk = bad_header.to_vec();
		chunk.extend_from_slice(&junk(100));

		assert_eq!(aligner.filter(&mut chunk, 106, 0), 0);
		assert!(!aligner.is_aligned());
		assert!(chunk.is_empty());

		// The false sync cost its tag byte and the search moved on
		assert!(aligner.bytes_skipped() > 0);
	}

	#[test]
	fn short_windows_stay_buffered() {
		let mut aligner = FrameAligner::new();

		// Less than the minimum search window: nothing is consumed yet
		let mut chunk = junk(20);
		assert_eq!(aligner.filter(&mut chunk, 20, 0), 0);
		assert!(chunk.is_empty());
		assert_eq!(aligner.bytes_skipped(), 0);

		// The header arrives split across calls
		let mut chunk = FRAME_HEADER.to_vec();
		chunk.extend_from_slice(&junk(64));
		let buffered = aligner.filter(&mut chunk, 70, 0);

		assert_eq!(buffered, 0);
		assert!(aligner.is_aligned());
		assert_eq!(aligner.bytes_skipped(), 20);
		assert_eq!(&chunk[..6], &FRAME_HEADER);
	}

	#[test]
	fn oversized_drain_keeps_a_tail() {
		let mut aligner = FrameAligner::new();

		let mut chunk = junk(100);
		chunk.extend_from_slice(&FRAME_HEADER);
		chunk.extend_from_slice(&junk(64));

		// The caller's nominal chunk size is much smaller than the buffer
		let chunk_size = 20;
		let buffered = aligner.filter(&mut chunk, chunk_size, 0);

		// A chunk_size + 1 byte tail stays buffered
		assert_eq!(buffered, chunk_size + 1);
		assert_eq!(chunk.len(), 70 - (chunk_size + 1));
		assert_eq!(&chunk[..6], &FRAME_HEADER);

		// The next call drains the tail
		let mut next = Vec::new();
		assert_eq!(aligner.filter(&mut next, 1024, 0), 0);
		assert_eq!(next.len(), chunk_size + 1);
	}

	#[test]
	fn offset_skips_already_seen_bytes() {
		let mut aligner = FrameAligner::new();

		let mut chunk = junk(8);
		chunk.extend_from_slice(&FRAME_HEADER);
		chunk.extend_from_slice(&junk(64));

		// The first 8 bytes are stale data the caller already consumed
		let buffered = aligner.filter(&mut chunk, 128, 8);

		assert_eq!(buffered, 0);
		assert!(aligner.is_aligned());
		assert_eq!(aligner.bytes_skipped(), 0);
		assert_eq!(&chunk[..6], &FRAME_HEADER);
	}
}
