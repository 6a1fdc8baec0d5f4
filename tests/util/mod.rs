//! Synthesized FLAC fixtures
//!
//! Tests build the exact byte streams they need instead of shipping binary
//! assets.
#![allow(dead_code)]

use std::io::Write;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

pub struct FlacBuilder {
	samplerate: u32,
	channels: u8,
	bits_per_sample: u8,
	total_samples: u64,
	comments: Vec<(String, String)>,
	pictures: Vec<(u32, Vec<u8>)>,
	applications: Vec<(u32, Vec<u8>)>,
	cuesheet_tracks: Option<Vec<u64>>,
	seek_points: Vec<(u64, u64)>,
	audio_bytes: usize,
}

impl FlacBuilder {
	pub fn new() -> Self {
		Self {
			samplerate: 44_100,
			channels: 2,
			bits_per_sample: 16,
			total_samples: 441_000,
			comments: Vec::new(),
			pictures: Vec::new(),
			applications: Vec::new(),
			cuesheet_tracks: None,
			seek_points: Vec::new(),
			audio_bytes: 4096,
		}
	}

	pub fn total_samples(mut self, total_samples: u64) -> Self {
		self.total_samples = total_samples;
		self
	}

	pub fn comment(mut self, key: &str, value: &str) -> Self {
		self.comments.push((key.to_owned(), value.to_owned()));
		self
	}

	pub fn picture(mut self, picture_type: u32, data: &[u8]) -> Self {
		self.pictures.push((picture_type, data.to_vec()));
		self
	}

	pub fn application(mut self, id: u32, payload: &[u8]) -> Self {
		self.applications.push((id, payload.to_vec()));
		self
	}

	/// Adds a binary CUESHEET block with one track per start-sample offset
	pub fn binary_cuesheet(mut self, track_offsets: &[u64]) -> Self {
		self.cuesheet_tracks = Some(track_offsets.to_vec());
		self
	}

	/// Adds a SEEKTABLE entry mapping a sample number to a byte offset
	pub fn seek_point(mut self, sample: u64, byte_offset: u64) -> Self {
		self.seek_points.push((sample, byte_offset));
		self
	}

	pub fn build(&self) -> Vec<u8> {
		let mut blocks: Vec<(u8, Vec<u8>)> = vec![(0, self.streaminfo())];

		if !self.seek_points.is_empty() {
			blocks.push((3, self.seektable()));
		}
		if !self.comments.is_empty() {
			blocks.push((4, self.vorbis_comments()));
		}
		for (id, payload) in &self.applications {
			let mut content = id.to_be_bytes().to_vec();
			content.extend_from_slice(payload);
			blocks.push((2, content));
		}
		if let Some(track_offsets) = &self.cuesheet_tracks {
			blocks.push((5, self.cuesheet(track_offsets)));
		}
		for (picture_type, data) in &self.pictures {
			blocks.push((6, picture(*picture_type, data)));
		}

		let mut out = b"fLaC".to_vec();
		let last = blocks.len() - 1;

		for (index, (ty, content)) in blocks.iter().enumerate() {
			out.push(ty | if index == last { 0x80 } else { 0 });
			out.extend_from_slice(&(content.len() as u32).to_be_bytes()[1..]);
			out.extend_from_slice(content);
		}

		out.extend(std::iter::repeat(0xAA).take(self.audio_bytes));
		out
	}

	/// Builds the file and writes it to a named temp file
	pub fn write(&self) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(&self.build()).unwrap();
		file.flush().unwrap();
		file
	}

	fn streaminfo(&self) -> Vec<u8> {
		let mut content = Vec::with_capacity(34);
		content.write_u16::<BigEndian>(4096).unwrap();
		content.write_u16::<BigEndian>(4096).unwrap();
		content.write_uint::<BigEndian>(0, 6).unwrap();

		let packed = (self.samplerate << 12)
			| (u32::from(self.channels) - 1) << 9
			| (u32::from(self.bits_per_sample) - 1) << 4
			| ((self.total_samples >> 32) as u32 & 0xF);
		content.write_u32::<BigEndian>(packed).unwrap();
		content
			.write_u32::<BigEndian>((self.total_samples & 0xFFFF_FFFF) as u32)
			.unwrap();
		content.extend_from_slice(&[0u8; 16]);
		content
	}

	fn seektable(&self) -> Vec<u8> {
		let mut content = Vec::new();
		for (sample, byte_offset) in &self.seek_points {
			content.write_u64::<BigEndian>(*sample).unwrap();
			content.write_u64::<BigEndian>(*byte_offset).unwrap();
			content.write_u16::<BigEndian>(4096).unwrap();
		}
		content
	}

	fn vorbis_comments(&self) -> Vec<u8> {
		let mut content = Vec::new();
		let vendor = b"reference libFLAC";
		content
			.write_u32::<LittleEndian>(vendor.len() as u32)
			.unwrap();
		content.write_all(vendor).unwrap();
		content
			.write_u32::<LittleEndian>(self.comments.len() as u32)
			.unwrap();

		for (key, value) in &self.comments {
			let comment = format!("{key}={value}");
			content
				.write_u32::<LittleEndian>(comment.len() as u32)
				.unwrap();
			content.write_all(comment.as_bytes()).unwrap();
		}

		content
	}

	fn cuesheet(&self, track_offsets: &[u64]) -> Vec<u8> {
		let mut content = Vec::new();
		content.extend_from_slice(&[0u8; 128]); // no catalog number
		content
			.write_u64::<BigEndian>(u64::from(self.samplerate) * 2)
			.unwrap();
		content.write_u8(0x80).unwrap(); // CD
		content.extend_from_slice(&[0u8; 258]);

		content.write_u8(track_offsets.len() as u8 + 1).unwrap();

		for (index, offset) in track_offsets.iter().enumerate() {
			content.write_u64::<BigEndian>(*offset).unwrap();
			content.write_u8(index as u8 + 1).unwrap();
			content.extend_from_slice(&[0u8; 12]);
			content.write_u8(0).unwrap();
			content.extend_from_slice(&[0u8; 13]);
			content.write_u8(1).unwrap();
			content.write_u64::<BigEndian>(0).unwrap();
			content.write_u8(1).unwrap();
			content.extend_from_slice(&[0u8; 3]);
		}

		// Lead-out
		content.write_u64::<BigEndian>(self.total_samples).unwrap();
		content.write_u8(170).unwrap();
		content.extend_from_slice(&[0u8; 12]);
		content.write_u8(0).unwrap();
		content.extend_from_slice(&[0u8; 13]);
		content.write_u8(0).unwrap();

		content
	}
}

fn picture(picture_type: u32, data: &[u8]) -> Vec<u8> {
	let mut content = Vec::new();
	content.write_u32::<BigEndian>(picture_type).unwrap();
	content.write_u32::<BigEndian>(10).unwrap();
	content.write_all(b"image/jpeg").unwrap();
	content.write_u32::<BigEndian>(0).unwrap();
	for dim in [64u32, 64, 24, 0] {
		content.write_u32::<BigEndian>(dim).unwrap();
	}
	content.write_u32::<BigEndian>(data.len() as u32).unwrap();
	content.write_all(data).unwrap();
	content
}
