//! Byte-stream processing for FLAC playback pipelines
//!
//! [`FrameAligner`] snaps an arbitrary byte window onto a decodable frame
//! boundary; [`Prescanner`] derives duration and bitrate from the head of a
//! stream before the whole file is available.

mod align;
mod crc;
mod prescan;

pub use align::FrameAligner;
pub use crc::crc8;
pub use prescan::{find_frame_boundaries, scan_bitrate, Prescan, Prescanner, PRESCAN_BYTES};
