//! Extract playable metadata from FLAC files and align FLAC byte streams for
//! mid-stream playback.
//!
//! This crate serves the scanning side of an audio library: it normalizes the
//! raw tag universe of a FLAC file (Vorbis comments, vendor artwork
//! conventions, embedded ID3 coexistence) into one canonical vocabulary,
//! splits files that hide multiple tracks behind an embedded cue sheet into
//! per-track metadata, and snaps streamed FLAC bytes onto a decodable frame
//! boundary.
//!
//! # Examples
//!
//! ## Reading a file
//!
//! ```rust,no_run
//! # fn main() -> flacscan::error::Result<()> {
//! use flacscan::catalog::NullCatalog;
//! use flacscan::config::ParseOptions;
//!
//! // A single-track file returns its tag map directly; a cue-tracked file
//! // persists its virtual tracks through the catalog
//! let tags = flacscan::read_tags(
//! 	"album.flac",
//! 	None,
//! 	&mut NullCatalog,
//! 	ParseOptions::new(),
//! )?;
//!
//! println!("{:?}", tags.get_text("TITLE"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Aligning a stream
//!
//! ```rust
//! use flacscan::stream::FrameAligner;
//!
//! let mut aligner = FrameAligner::new();
//!
//! // Chunks arriving from a mid-stream seek are buffered until a valid
//! // frame header is found, then re-emitted from that boundary
//! let mut chunk: Vec<u8> = vec![0; 4096];
//! let buffered = aligner.filter(&mut chunk, 4096, 0);
//! assert_eq!(buffered, 0);
//! assert!(chunk.is_empty());
//! ```

pub mod catalog;
pub mod config;
pub mod cue;
pub mod error;
pub mod picture;
pub mod scan;
pub mod stream;
pub mod tag;

pub(crate) mod macros;
pub(crate) mod split;
pub(crate) mod util;

mod tagger;

pub use tagger::read_tags;
