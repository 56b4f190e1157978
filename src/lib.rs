//! MPEG audio stream parsing
//!
//! Parses MPEG-1/2/2.5 Layer I/II/III streams (the payload of `.mp3`
//! files), together with any leading ID3v2 tag container, into a
//! structured in-memory representation: an optional tag header, the
//! textual metadata tags, and every audio frame with its decoded header
//! fields and raw payload bytes.
//!
//! The parser operates on a fully materialized byte buffer and performs
//! no I/O. Actual audio decoding (Huffman, IMDCT, synthesis) is out of
//! scope; XING/VBRI frames parse as ordinary frames.
//!
//! ```
//! use mpegparse::Parser;
//!
//! // One MPEG-1 Layer III frame: 128 kbps, 44.1 kHz, stereo.
//! let mut data = vec![0xFF, 0xFB, 0x90, 0x00];
//! data.extend(std::iter::repeat(0u8).take(413));
//!
//! let audio = Parser::new(data).parse().unwrap();
//! assert_eq!(audio.frames.len(), 1);
//! assert_eq!(audio.frames[0].bitrate, 128);
//! assert_eq!(audio.frames[0].sampling_rate, 44100);
//! ```

pub mod cursor;
pub mod mpeg;
pub mod report;
pub mod stats;

pub use cursor::ByteCursor;
pub use mpeg::frame::{ChannelMode, Emphasis, Frame, Layer, ModeExtension, MpegVersion};
pub use mpeg::id3::{HeaderInfo, Tag};
pub use mpeg::parser::{AudioObject, Parser};
pub use stats::StreamStats;

use thiserror::Error;

/// Structural parse failures. All are fatal at the point raised: the
/// parser does not resynchronize mid-stream, and a failed parse
/// discards the partially built [`AudioObject`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Hex input contained a character outside `[0-9a-fA-F]`.
    #[error("invalid hex character {0:?}")]
    InvalidHexCharacter(char),

    /// The scan reached end-of-buffer without matching the 11-bit sync.
    #[error("no frame sync found before end of buffer")]
    NoFrameFound,

    /// The ID3v2 declared synchsafe size disagrees with the number of
    /// bytes actually present ahead of the first frame.
    #[error("ID3v2 size mismatch: declared {expected} bytes, found {actual}")]
    TagSizeMismatch { expected: u32, actual: u32 },

    /// A frame header was requested from four octets lacking the sync
    /// pattern.
    #[error("frame header does not start with the 11-bit sync pattern")]
    InvalidSync,

    /// The bitrate index / version / layer combination has no table
    /// entry (index 0 is free format, 15 is invalid, and MPEG-2.5 has
    /// no column mapping).
    #[error("no bitrate for index {index} (version id {version_id}, layer id {layer_id})")]
    InvalidBitrate {
        index: u8,
        version_id: u8,
        layer_id: u8,
    },

    /// The sampling-rate index resolves to the reserved table row.
    #[error("sampling rate index {0} is reserved")]
    InvalidSamplingRate(u8),

    /// The computed frame payload size came out negative.
    #[error("computed frame size {0} is negative")]
    InvalidFrameSize(i64),

    /// The stream ended before a frame's declared payload was complete.
    #[error("truncated frame: expected {expected} payload bytes, got {actual}")]
    TruncatedFrame { expected: usize, actual: usize },
}
