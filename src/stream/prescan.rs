//! Duration and bitrate estimation from the head of a stream
//!
//! Remote streams surface their first bytes long before the whole file is
//! available. The prescanner spools the head to disk, runs the container
//! scanner over it, and sanity-checks the claimed duration against what the
//! spool could possibly hold.

use crate::catalog::Catalog;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::scan::{find_frame_fh, scan_fh, ScanInfo};

use std::io::{Read, Seek, SeekFrom, Write};

/// How much of the stream must be spooled before scanning
pub const PRESCAN_BYTES: usize = 32 * 1024;

// Optimistic FLAC compression ratio for the duration upper bound
const MAX_COMPRESSION_RATIO: f64 = 8.0;

/// The outcome of feeding a chunk to a [`Prescanner`]
#[derive(Clone, Debug, PartialEq)]
pub enum Prescan {
	/// Not enough data spooled yet, keep feeding
	NeedMoreData,
	/// The spool could not be parsed as FLAC (no sample rate)
	Failed,
	/// Stream info derived from the spooled head
	Ready(ScanInfo),
}

/// Accumulates the head of a stream until it can be scanned
///
/// One prescanner is owned by exactly one stream. The spool file is owned by
/// the prescanner and released when it is dropped.
#[derive(Debug, Default)]
pub struct Prescanner {
	scanbuf: Vec<u8>,
	done: bool,
}

impl Prescanner {
	/// Creates a prescanner for a fresh stream
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Feeds one chunk of the stream
	///
	/// Returns [`Prescan::NeedMoreData`] until at least [`PRESCAN_BYTES`]
	/// have accumulated, then spools the buffer to a temporary file and scans
	/// it once. `total_length`, when the transport knows it, turns the scan
	/// into an average bitrate for the whole stream.
	///
	/// The claimed sample count is checked against an upper bound assuming a
	/// compression ratio of 8; a file claiming more than that is lying
	/// (typically a bogus seek-to-EOF estimate) and gets a zero duration
	/// instead.
	///
	/// # Errors
	///
	/// * The spool file cannot be created or written
	pub fn feed(&mut self, chunk: &[u8], total_length: Option<u64>) -> Result<Prescan> {
		debug_assert!(!self.done, "a prescanner only scans once");

		self.scanbuf.extend_from_slice(chunk);

		if self.scanbuf.len() < PRESCAN_BYTES {
			return Ok(Prescan::NeedMoreData);
		}

		self.done = true;

		let mut spool = tempfile::tempfile()?;
		spool.write_all(&self.scanbuf)?;
		spool.seek(SeekFrom::Start(0))?;

		let options = ParseOptions::new().read_tags(false).read_cover_art(false);

		let Ok(result) = scan_fh(&mut spool, options) else {
			return Ok(Prescan::Failed);
		};

		let mut info = result.info;
		if info.samplerate == 0 {
			return Ok(Prescan::Failed);
		}

		let buflen = self.scanbuf.len() as u64;
		let audio_bytes = buflen.saturating_sub(info.audio_offset);

		// Upper bound on the samples this much audio data could decode to
		let bytes_per_sample_set =
			f64::from(info.channels) * (f64::from(info.bits_per_sample) / 8.0);
		let max_samples = audio_bytes as f64 * MAX_COMPRESSION_RATIO / bytes_per_sample_set;

		if info.total_samples < 0 || info.total_samples as f64 > max_samples {
			log::warn!(
				"Stream claims {} total samples but can hold at most {}, ignoring duration",
				info.total_samples,
				max_samples as u64
			);

			info.song_length_ms = 0.0;
			info.total_samples = 0;
		} else if let Some(length) = total_length {
			if info.song_length_ms > 0.0 {
				info.bitrate =
					8000.0 * length.saturating_sub(info.audio_offset) as f64 / info.song_length_ms;
			}
		}

		Ok(Prescan::Ready(info))
	}
}

/// Reports the duration of a spooled stream head; the bitrate stays unknown
///
/// A FLAC bitrate derived from a short header is unreliable, so this always
/// returns `None` for it. The derived duration is reported to the catalog as
/// a side effect.
///
/// # Errors
///
/// * IO failure while reading `reader`
pub fn scan_bitrate<R>(
	reader: &mut R,
	url: &str,
	catalog: &mut dyn Catalog,
) -> Result<(Option<u32>, Option<f64>)>
where
	R: Read + Seek,
{
	let options = ParseOptions::new().read_tags(false).read_cover_art(false);

	if let Ok(result) = scan_fh(reader, options) {
		if result.info.song_length_ms > 0.0 {
			let secs = result.info.song_length_ms / 1000.0;
			if let Err(e) = catalog.set_duration(url, secs) {
				log::warn!("Unable to report stream duration: {e}");
			}
		}
	}

	Ok((None, None))
}

/// Returns the byte offset of the frame at or before `time_sec` seconds
///
/// Thin wrapper over the container's frame seek, which wants milliseconds.
///
/// # Errors
///
/// * See [`find_frame_fh`]
pub fn find_frame_boundaries<R>(reader: &mut R, time_sec: f64) -> Result<u64>
where
	R: Read + Seek,
{
	let ms = (time_sec * 1000.0).floor() as u64;
	find_frame_fh(reader, ms)
}
