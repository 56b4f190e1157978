//! Top-level parse pipeline: align, read the tag container, read frames.
//!
//! Alignment is a byte-by-byte forward scan: every consumed octet lands
//! in an accumulator, and the accumulator's last four octets are tested
//! for the 11-bit sync pattern. On a match the cursor rewinds by four so
//! the sync octets are re-read as the first frame header, and whatever
//! was accumulated ahead of them is the ID3v2 container. A tag payload
//! containing a literal `FF Ex` pair will therefore trigger a false
//! alignment; the parser fails fast on such streams rather than
//! resynchronizing.

use log::{debug, warn};
use serde::Serialize;

use crate::cursor::ByteCursor;
use crate::mpeg::frame::{self, Frame};
use crate::mpeg::id3::{self, HeaderInfo, Tag};
use crate::ParseError;

/// The parsed stream: optional tag header, tags, and every frame in
/// byte-stream order. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AudioObject {
    pub header: Option<HeaderInfo>,
    pub tags: Vec<Tag>,
    pub frames: Vec<Frame>,
}

/// MPEG stream parser over a fully materialized byte buffer.
///
/// One parser instance serves one parse. The `debug` flag enables
/// diagnostic logging through the [`log`] facade and never alters
/// outputs.
pub struct Parser {
    cursor: ByteCursor,
    debug: bool,
}

impl Parser {
    pub fn new(data: Vec<u8>) -> Self {
        Parser {
            cursor: ByteCursor::new(data),
            debug: false,
        }
    }

    /// Enable diagnostic logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Run the full pipeline. Any structural violation aborts the
    /// parse and discards the partially built object.
    pub fn parse(mut self) -> Result<AudioObject, ParseError> {
        let preamble = self.align()?;
        let (header, tags) = id3::read_header(&preamble)?;
        if self.debug {
            debug!(
                "container: {} preamble bytes, {} tags",
                preamble.len(),
                tags.len()
            );
        }

        let mut frames = Vec::new();
        while self.cursor.position() < self.cursor.len() {
            let frame = self.next_frame()?;
            if self.debug {
                debug!(
                    "frame {}: {} kbps, {} Hz, {} payload bytes",
                    frames.len(),
                    frame.bitrate,
                    frame.sampling_rate,
                    frame.size
                );
            }
            frames.push(frame);
        }

        Ok(AudioObject {
            header,
            tags,
            frames,
        })
    }

    /// Scan forward one octet at a time until the accumulator ends with
    /// the sync pattern. Returns the accumulated preamble with the four
    /// sync octets removed; the cursor is rewound so they are re-read
    /// as the first frame header.
    fn align(&mut self) -> Result<Vec<u8>, ParseError> {
        let mut preamble: Vec<u8> = Vec::new();
        while self.cursor.position() <= self.cursor.len() {
            preamble.extend_from_slice(self.cursor.read(0));
            let tail = preamble.len().saturating_sub(4);
            if frame::possible_frame(&preamble[tail..]) {
                self.cursor.rewind(4);
                preamble.truncate(tail);
                if self.debug {
                    debug!("frame sync at byte offset {}", self.cursor.position() - 1);
                }
                return Ok(preamble);
            }
        }
        Err(ParseError::NoFrameFound)
    }

    /// Decode one frame header and consume exactly its payload.
    fn next_frame(&mut self) -> Result<Frame, ParseError> {
        let header = self.cursor.read(3).to_vec();
        let mut frame = match Frame::decode(&header) {
            Ok(frame) => frame,
            Err(e) => {
                if self.debug {
                    warn!("frame decode failed at position {}: {}", self.cursor.position(), e);
                }
                return Err(e);
            }
        };

        let payload = if frame.size > 0 {
            self.cursor.read(frame.size - 1).to_vec()
        } else {
            Vec::new()
        };
        if payload.len() != frame.size {
            if self.debug {
                warn!(
                    "truncated frame: wanted {} payload bytes, got {}",
                    frame.size,
                    payload.len()
                );
            }
            return Err(ParseError::TruncatedFrame {
                expected: frame.size,
                actual: payload.len(),
            });
        }
        frame.raw_data = payload;
        Ok(frame)
    }
}
