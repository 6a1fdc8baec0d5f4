mod util;

use util::FlacBuilder;

use flacscan::stream::{crc8, FrameAligner, Prescan, Prescanner, PRESCAN_BYTES};

// A valid frame header: sync, 4096-sample block, 44.1kHz, stereo, 16-bit,
// frame number 0, closed by its CRC-8
fn frame_header() -> Vec<u8> {
	let mut header = vec![0xFF, 0xF8, 0xC9, 0x18, 0x00];
	let crc = crc8(&header);
	header.push(crc);
	header
}

#[test]
fn whole_file_streams_pass_through_untouched() {
	let data = FlacBuilder::new().comment("TITLE", "Song").build();

	let mut aligner = FrameAligner::new();

	let mut chunk = data.clone();
	let chunk_len = chunk.len();
	assert_eq!(aligner.filter(&mut chunk, chunk_len, 0), 0);
	assert_eq!(chunk, data);
	assert!(aligner.is_aligned());
	assert_eq!(aligner.bytes_skipped(), 0);
}

#[test]
fn mid_stream_chunks_align_on_the_frame_header() {
	let mut aligner = FrameAligner::new();

	// A seek landed mid-frame: garbage, then a frame boundary
	let garbage: Vec<u8> = (0..2000).map(|i| (i % 251) as u8).collect();

	let mut stream = garbage.clone();
	stream.extend_from_slice(&frame_header());
	stream.extend_from_slice(&vec![0x00; 512]);

	// Feed in uneven slices, as a transport would
	let mut emitted = Vec::new();
	for piece in stream.chunks(700) {
		let mut chunk = piece.to_vec();
		aligner.filter(&mut chunk, 700, 0);
		emitted.extend_from_slice(&chunk);
	}

	// Drain whatever stayed buffered
	let mut tail = Vec::new();
	aligner.filter(&mut tail, stream.len(), 0);
	emitted.extend_from_slice(&tail);

	assert!(aligner.is_aligned());
	assert_eq!(aligner.bytes_skipped(), garbage.len() as u64);

	// The emitted stream starts exactly at the frame header
	assert_eq!(&emitted[..6], &frame_header()[..]);
	assert_eq!(emitted.len(), 6 + 512);

	// Sync pattern invariant on the emitted prefix
	assert_eq!(emitted[0], 0xFF);
	assert_eq!(emitted[1] >> 2, 0b111110);
}

#[test]
fn prescan_of_a_growing_stream() {
	let data = FlacBuilder::new().total_samples(44_100).build();

	let mut prescanner = Prescanner::new();

	// First chunk: too little data
	let status = prescanner.feed(&data, None).unwrap();
	assert_eq!(status, Prescan::NeedMoreData);

	// Pad the stream head out to the spool threshold
	let padding = vec![0xAAu8; PRESCAN_BYTES];
	let Prescan::Ready(info) = prescanner.feed(&padding, Some(2_000_000)).unwrap() else {
		panic!("expected stream info");
	};

	assert_eq!(info.samplerate, 44_100);
	assert!((info.song_length_ms - 1000.0).abs() < 1e-6);
	assert!(info.bitrate > 0.0);
}

#[test]
fn frame_boundaries_come_from_the_seektable() {
	use flacscan::config::ParseOptions;
	use flacscan::scan::scan_fh;
	use flacscan::stream::find_frame_boundaries;
	use std::io::Cursor;

	// 10 seconds of audio with seek points every 5 seconds
	let data = FlacBuilder::new()
		.total_samples(441_000)
		.seek_point(0, 0)
		.seek_point(220_500, 2_000)
		.seek_point(441_000, 4_000)
		.build();

	let audio_offset = scan_fh(&mut Cursor::new(&data), ParseOptions::new())
		.unwrap()
		.info
		.audio_offset;

	// 6.5 seconds resolves to the 5-second seek point
	let offset = find_frame_boundaries(&mut Cursor::new(&data), 6.5).unwrap();
	assert_eq!(offset, audio_offset + 2_000);

	// Before the second point, the first one wins
	let offset = find_frame_boundaries(&mut Cursor::new(&data), 1.0).unwrap();
	assert_eq!(offset, audio_offset);
}

#[test]
fn frame_boundaries_fall_back_to_an_estimate() {
	use flacscan::config::ParseOptions;
	use flacscan::scan::scan_fh;
	use flacscan::stream::find_frame_boundaries;
	use std::io::Cursor;

	let data = FlacBuilder::new().total_samples(441_000).build();

	let audio_offset = scan_fh(&mut Cursor::new(&data), ParseOptions::new())
		.unwrap()
		.info
		.audio_offset;

	// Halfway through a 10 second file lands mid-way into the audio region
	let offset = find_frame_boundaries(&mut Cursor::new(&data), 5.0).unwrap();
	assert!(offset > audio_offset);
	assert!(offset < data.len() as u64);
}
