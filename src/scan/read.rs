use super::block::{
	Block, BLOCK_ID_APPLICATION, BLOCK_ID_CUESHEET, BLOCK_ID_PICTURE, BLOCK_ID_STREAMINFO,
	BLOCK_ID_VORBIS_COMMENTS,
};
use super::{RawTags, ScanResult};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::macros::{decode_err, err, try_vec};
use crate::picture::FlacPicture;
use crate::util::text::utf8_decode_str;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

/// Scans the FLAC file at `path`
///
/// # Errors
///
/// * `path` does not exist or cannot be read
/// * See [`scan_fh`]
pub fn scan(path: impl AsRef<Path>, parse_options: ParseOptions) -> Result<ScanResult> {
	let mut file = File::open(path)?;
	scan_fh(&mut file, parse_options)
}

/// Scans a FLAC stream from an open reader
///
/// The reader is expected to be positioned at the start of the stream; a
/// leading ID3v2 tag is skipped and its version recorded.
///
/// # Errors
///
/// * The stream is missing the `fLaC` marker or a valid STREAMINFO block
/// * IO failure
pub fn scan_fh<R>(data: &mut R, parse_options: ParseOptions) -> Result<ScanResult>
where
	R: Read + Seek,
{
	let mut result = ScanResult::default();

	// It is possible for a FLAC file to contain an ID3v2 tag; the frames are
	// someone else's problem, but the version is surfaced as TAGVERSION.
	let id3_version = skip_id3v2(data)?;
	if id3_version.is_some() {
		log::warn!("Encountered an ID3v2 tag in a FLAC file, skipping");
	}

	let stream_info = verify_flac(data)?;
	let stream_info_len = (stream_info.end - stream_info.start) as u32;

	if stream_info_len < 18 + 4 {
		decode_err!(@BAIL "File has an invalid STREAMINFO block size (< 18)");
	}

	let mut last_block = stream_info.last;

	// The binary cue sheet can only be rendered once the sample rate is known
	let mut pending_cuesheet: Option<Vec<u8>> = None;

	while !last_block {
		let block = Block::read(data, |block_type| match block_type {
			BLOCK_ID_VORBIS_COMMENTS | BLOCK_ID_APPLICATION | BLOCK_ID_CUESHEET => {
				parse_options.read_tags
			},
			BLOCK_ID_PICTURE => parse_options.read_cover_art,
			_ => false,
		})?;

		last_block = block.last;

		if block.content.is_empty() {
			continue;
		}

		match block.ty {
			BLOCK_ID_VORBIS_COMMENTS => {
				log::debug!("Encountered a Vorbis Comments block, parsing");

				read_comments(
					&mut &*block.content,
					block.content.len() as u64,
					&mut result.tags,
					parse_options,
				)?;
			},
			BLOCK_ID_APPLICATION if block.content.len() > 4 => {
				let id = BigEndian::read_u32(&block.content[..4]);
				log::debug!("Encountered an application block, id: {id}");

				result
					.tags
					.applications
					.insert(id, block.content[4..].to_vec());
			},
			BLOCK_ID_CUESHEET => {
				pending_cuesheet = Some(block.content);
			},
			BLOCK_ID_PICTURE => {
				log::debug!("Encountered a FLAC picture block, parsing");

				match FlacPicture::from_flac_bytes(&block.content, parse_options.parsing_mode) {
					Ok(picture) => result.tags.pictures.push(picture),
					Err(e) => {
						if parse_options.parsing_mode == ParsingMode::Strict {
							return Err(e);
						}

						log::warn!("Unable to read FLAC picture block, discarding");
						continue;
					},
				}
			},
			_ => {},
		}
	}

	let (stream_length, file_length, audio_offset) = {
		let current = data.stream_position()?;
		let end = data.seek(SeekFrom::End(0))?;

		// In the event that a block lies about its size, the current position
		// could be completely wrong.
		if current > end {
			err!(SizeMismatch);
		}

		(end - current, end, current)
	};

	result.info = super::properties::read_properties(
		&mut &stream_info.content[..],
		stream_length,
		file_length,
	)?;
	result.info.audio_offset = audio_offset;
	result.info.id3_version = id3_version;

	if let Some(content) = pending_cuesheet {
		log::debug!("Encountered a CUESHEET block, rendering to cue text");

		match super::cuesheet::render_cuesheet(&content, result.info.samplerate) {
			Ok(lines) => result.tags.cuesheet_block = lines,
			Err(e) => {
				if parse_options.parsing_mode == ParsingMode::Strict {
					return Err(e);
				}

				log::warn!("Unable to read CUESHEET block, discarding");
			},
		}
	}

	Ok(result)
}

pub(super) fn verify_flac<R>(data: &mut R) -> Result<Block>
where
	R: Read + Seek,
{
	let mut marker = [0; 4];
	data.read_exact(&mut marker)?;

	if &marker != b"fLaC" {
		decode_err!(@BAIL "File missing \"fLaC\" stream marker");
	}

	let block = Block::read(data, |_| true)?;

	if block.ty != BLOCK_ID_STREAMINFO {
		decode_err!(@BAIL "File missing mandatory STREAMINFO block");
	}

	log::debug!("File verified to be FLAC");
	Ok(block)
}

/// Skips a leading ID3v2 tag, returning its version string
pub(super) fn skip_id3v2<R>(data: &mut R) -> Result<Option<String>>
where
	R: Read + Seek,
{
	let start = data.stream_position()?;

	let mut header = [0; 10];
	let mut filled = 0;
	while filled < header.len() {
		let n = data.read(&mut header[filled..])?;
		if n == 0 {
			break;
		}
		filled += n;
	}

	if filled < header.len() || &header[..3] != b"ID3" {
		data.seek(SeekFrom::Start(start))?;
		return Ok(None);
	}

	let major = header[3];
	let revision = header[4];
	let flags = header[5];

	// Tag size is a synchsafe u28
	let size = header[6..10]
		.iter()
		.fold(0u32, |acc, byte| (acc << 7) | u32::from(byte & 0x7F));

	let mut end = start + 10 + u64::from(size);
	if flags & 0x10 == 0x10 {
		// Footer present
		end += 10;
	}

	data.seek(SeekFrom::Start(end))?;

	Ok(Some(format!("ID3v2.{major}.{revision}")))
}

fn read_comments<R>(
	data: &mut R,
	mut len: u64,
	tags: &mut RawTags,
	parse_options: ParseOptions,
) -> Result<()>
where
	R: Read,
{
	let parse_mode = parse_options.parsing_mode;

	let vendor_len = data.read_u32::<LittleEndian>()?;
	if u64::from(vendor_len) > len {
		err!(SizeMismatch);
	}

	// The vendor string is of no use to the tag pipeline
	let mut vendor = try_vec![0; vendor_len as usize];
	data.read_exact(&mut vendor)?;
	len -= u64::from(vendor_len);

	let number_of_items = data.read_u32::<LittleEndian>()?;
	if number_of_items > (len >> 2) as u32 {
		err!(SizeMismatch);
	}

	for _ in 0..number_of_items {
		let comment_len = data.read_u32::<LittleEndian>()?;
		if u64::from(comment_len) > len {
			err!(SizeMismatch);
		}

		let mut comment_bytes = try_vec![0; comment_len as usize];
		data.read_exact(&mut comment_bytes)?;

		len -= u64::from(comment_len);

		// KEY=VALUE
		let mut comment_split = comment_bytes.splitn(2, |b| *b == b'=');

		let Some(key) = comment_split.next() else {
			continue;
		};

		// Make sure there was a separator present, otherwise just move on
		let Some(value) = comment_split.next() else {
			log::warn!("No separator found in field, discarding");
			continue;
		};

		if !valid_comment_key(key) {
			if parse_mode == ParsingMode::Strict {
				decode_err!(@BAIL "Vorbis comments contain an invalid key");
			}

			// Otherwise discard invalid keys
			continue;
		}

		match utf8_decode_str(value) {
			Ok(value) => {
				// The canonical vocabulary is upper-case throughout
				let key = key.to_ascii_uppercase();
				// SAFETY: verified to be a subset of ASCII above
				let key = unsafe { String::from_utf8_unchecked(key) };

				tags.items.push_comment(key, value.to_owned());
			},
			Err(e) => {
				if parse_mode == ParsingMode::Strict {
					return Err(e);
				}

				log::warn!("Non UTF-8 value found, discarding field");
				continue;
			},
		}
	}

	Ok(())
}

fn valid_comment_key(key: &[u8]) -> bool {
	// The valid range is 0x20..=0x7D not including 0x3D
	!key.is_empty() && key.iter().all(|c| (b' '..=b'}').contains(c) && *c != b'=')
}
