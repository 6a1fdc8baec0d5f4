//! FLAC picture blocks

use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::{err, try_vec};
use crate::util::text::utf8_decode_str;

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

/// The ID3v2 APIC picture type for a front cover, shared by FLAC picture blocks
pub const PICTURE_TYPE_COVER_FRONT: u32 = 3;

/// An embedded picture, as stored in a FLAC `PICTURE` metadata block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlacPicture {
	/// The APIC picture type (3 = front cover)
	pub picture_type: u32,
	/// The image MIME type, when one was stored
	pub mime_type: Option<String>,
	/// The image description, when one was stored
	pub description: Option<String>,
	/// The raw image bytes
	pub data: Vec<u8>,
}

impl FlacPicture {
	/// Parses a `FlacPicture` from a `PICTURE` block's content
	///
	/// # Errors
	///
	/// * The content is malformed or truncated ([`ErrorKind::NotAPicture`](crate::error::ErrorKind::NotAPicture))
	pub fn from_flac_bytes(content: &[u8], parse_mode: ParsingMode) -> Result<Self> {
		let mut size = content.len();
		let mut reader = Cursor::new(content);

		if size < 32 {
			err!(NotAPicture);
		}

		let picture_type = reader.read_u32::<BigEndian>()?;
		size -= 4;

		// ID3v2 APIC uses a single byte for the picture type. Anything
		// greater is probably invalid, so we stop early when strict.
		if picture_type > 255 && parse_mode == ParsingMode::Strict {
			err!(NotAPicture);
		}

		let mime_len = reader.read_u32::<BigEndian>()? as usize;
		size -= 4;

		if mime_len > size {
			err!(SizeMismatch);
		}

		let mime_type_str = utf8_decode_str(&content[8..8 + mime_len])?;
		size -= mime_len;

		reader.seek(SeekFrom::Current(mime_len as i64))?;

		let desc_len = reader.read_u32::<BigEndian>()? as usize;
		size -= 4;

		let mut description = None;
		if desc_len > 0 && desc_len < size {
			let pos = 12 + mime_len;

			if let Ok(desc) = utf8_decode_str(&content[pos..pos + desc_len]) {
				description = Some(desc.to_owned());
			}

			size -= desc_len;
			reader.seek(SeekFrom::Current(desc_len as i64))?;
		}

		// Width, height, color depth, indexed color count
		reader.seek(SeekFrom::Current(16))?;
		let data_len = reader.read_u32::<BigEndian>()? as usize;
		size -= 20;

		if data_len <= size {
			let mut data = try_vec![0; data_len];

			if reader.read_exact(&mut data).is_ok() {
				let mime_type = if mime_type_str.is_empty() {
					None
				} else {
					Some(mime_type_str.to_owned())
				};

				return Ok(Self {
					picture_type,
					mime_type,
					description,
					data,
				});
			}
		}

		err!(NotAPicture)
	}
}
