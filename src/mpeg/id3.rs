//! ID3v2 tag container
//!
//! The container precedes the first MPEG frame:
//!
//! - "ID3" signature (3 bytes, carried but not validated)
//! - version major/revision (2 bytes)
//! - flag byte: bit 7 unsynchronisation, bit 6 extended, bit 5
//!   experimental, bit 4 footer
//! - synchsafe 28-bit size (4 bytes, 7 bits per byte)
//!
//! Tag frames follow: 4-byte identifier, 4-byte size, 2-byte flags,
//! then the value. Tag-frame sizes are read as plain big-endian 32-bit
//! integers even for v2.4 (observed source behavior; v2.4 nominally
//! uses synchsafe per-frame sizes). Unsynchronisation is reported via
//! the flag but its `FF 00 -> FF` transformation is not applied.

use serde::Serialize;

use crate::cursor::{self, ByteCursor};
use crate::ParseError;

/// Decoded ID3v2 container preamble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HeaderInfo {
    /// The 3-octet signature as read from the stream.
    pub signature: String,
    /// `"ID3V2.X.Y"`.
    pub tag_version: String,
    pub unsynchronisation: u8,
    pub extended: bool,
    pub experimental: bool,
    pub has_footer: bool,
    /// Declared size of the tag area after the 10-octet preamble.
    pub tag_size: u32,
}

/// One metadata tag, carried verbatim: the value keeps its encoding
/// byte and any trailing padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// 4-character ASCII identifier, e.g. `TIT2`, `TPE1`.
    pub identifier: String,
    pub value: Vec<u8>,
    pub flags: [u8; 2],
}

/// Synchsafe 28-bit integer: 7 usable bits per octet.
fn synchsafe(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Parse the ID3v2 container accumulated ahead of the first frame.
///
/// An empty preamble is valid output: no header, no tags. Otherwise
/// the declared synchsafe size must equal the accumulated length minus
/// the 10-octet preamble, or the stream is rejected.
pub fn read_header(preamble: &[u8]) -> Result<(Option<HeaderInfo>, Vec<Tag>), ParseError> {
    if preamble.is_empty() {
        return Ok((None, Vec::new()));
    }

    let mut cursor = ByteCursor::new(preamble.to_vec());

    let signature = cursor::bytes_to_ascii(cursor.read(2));
    let version = cursor.read(1).to_vec();
    let (major, revision) = match version.as_slice() {
        [major, revision] => (*major, *revision),
        _ => (0, 0),
    };
    let flags = cursor.read(0).first().copied().unwrap_or(0);
    let expected = synchsafe(cursor.read(3));

    let actual = preamble.len().saturating_sub(10) as u32;
    if expected != actual {
        return Err(ParseError::TagSizeMismatch { expected, actual });
    }

    let header = HeaderInfo {
        signature,
        tag_version: format!("ID3V2.{}.{}", major, revision),
        unsynchronisation: (flags >> 7) & 0x01,
        extended: flags & 0x40 != 0,
        experimental: flags & 0x20 != 0,
        has_footer: flags & 0x10 != 0,
        tag_size: expected,
    };

    let mut tags = Vec::new();
    let mut offset = 0usize;
    while offset < expected as usize {
        let id_bytes = cursor.read(3).to_vec();
        let size = cursor::be_u32(cursor.read(3))? as usize;
        let flag_bytes = cursor.read(1);
        let flags = [
            flag_bytes.first().copied().unwrap_or(0),
            flag_bytes.get(1).copied().unwrap_or(0),
        ];
        let value = if size > 0 {
            cursor.read(size - 1).to_vec()
        } else {
            Vec::new()
        };

        // A zero-sized slot whose identifier starts with 0x00 is
        // padding, not a tag.
        let is_padding = size == 0 && id_bytes.first() == Some(&0);
        if !is_padding {
            tags.push(Tag {
                identifier: cursor::bytes_to_ascii(&id_bytes),
                value,
                flags,
            });
        }

        offset += 10 + size;
    }

    Ok((Some(header), tags))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ID3v2.4.0 preamble declaring `size` data bytes.
    fn preamble(size: u8) -> Vec<u8> {
        vec![0x49, 0x44, 0x33, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, size]
    }

    /// TIT2 tag with a 9-byte value: encoding byte, "Hello!", padding.
    fn tit2_tag() -> Vec<u8> {
        let mut tag = b"TIT2".to_vec();
        tag.extend_from_slice(&[0x00, 0x00, 0x00, 0x09]);
        tag.extend_from_slice(&[0x00, 0x00]);
        tag.extend_from_slice(&[0x00, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x21, 0x00, 0x00]);
        tag
    }

    #[test]
    fn test_empty_preamble_is_valid() {
        let (header, tags) = read_header(&[]).expect("empty preamble is fine");
        assert!(header.is_none());
        assert!(tags.is_empty());
    }

    #[test]
    fn test_synchsafe_decoding() {
        assert_eq!(synchsafe(&[0x00, 0x00, 0x00, 0x13]), 0x13);
        // Each octet contributes 7 bits: 0x01 0x00 -> 128.
        assert_eq!(synchsafe(&[0x01, 0x00]), 128);
        // High bits are masked off.
        assert_eq!(synchsafe(&[0x80, 0x80, 0x80, 0x80]), 0);
        assert_eq!(synchsafe(&[0x7F, 0x7F, 0x7F, 0x7F]), 0x0FFF_FFFF);
    }

    #[test]
    fn test_header_fields() {
        let mut data = preamble(0x13);
        // unsynchronisation + footer flags
        data[5] = 0x90;
        data.extend_from_slice(&tit2_tag());

        let (header, _) = read_header(&data).expect("should parse");
        let header = header.expect("header present");

        assert_eq!(header.signature, "ID3");
        assert_eq!(header.tag_version, "ID3V2.4.0");
        assert_eq!(header.unsynchronisation, 1);
        assert!(!header.extended);
        assert!(!header.experimental);
        assert!(header.has_footer);
        assert_eq!(header.tag_size, 0x13);
    }

    #[test]
    fn test_single_text_tag() {
        let mut data = preamble(0x13);
        data.extend_from_slice(&tit2_tag());

        let (_, tags) = read_header(&data).expect("should parse");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].identifier, "TIT2");
        assert_eq!(tags[0].flags, [0, 0]);
        assert_eq!(tags[0].value.len(), 9);
        // Value keeps its encoding byte and trailing padding.
        assert_eq!(&tags[0].value[1..7], b"Hello!");
    }

    #[test]
    fn test_multiple_tags_keep_stream_order() {
        // TIT2 (19 bytes) then TPE1 (14 bytes): declared size 33 = 0x21.
        let mut data = preamble(0x21);
        data.extend_from_slice(&tit2_tag());
        data.extend_from_slice(b"TPE1");
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x04]);
        data.extend_from_slice(&[0x00, 0x00]);
        data.extend_from_slice(&[0x00, 0x41, 0x42, 0x43]);

        let (_, tags) = read_header(&data).expect("should parse");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].identifier, "TIT2");
        assert_eq!(tags[1].identifier, "TPE1");
        assert_eq!(&tags[1].value[1..], b"ABC");
    }

    #[test]
    fn test_padding_slot_is_dropped() {
        // TIT2 followed by a 10-byte zero slot: declared 0x13 + 10 = 0x1D.
        let mut data = preamble(0x1D);
        data.extend_from_slice(&tit2_tag());
        data.extend_from_slice(&[0x00; 10]);

        let (_, tags) = read_header(&data).expect("should parse");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].identifier, "TIT2");
    }

    #[test]
    fn test_zero_size_with_real_identifier_is_kept() {
        // Only slots whose identifier starts with 0x00 count as padding.
        let mut data = preamble(0x1D);
        data.extend_from_slice(&tit2_tag());
        data.extend_from_slice(b"TXXX");
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&[0x00, 0x00]);

        let (_, tags) = read_header(&data).expect("should parse");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1].identifier, "TXXX");
        assert!(tags[1].value.is_empty());
    }

    #[test]
    fn test_declared_size_mismatch_is_rejected() {
        // Declared 0x14 but only 0x13 data bytes follow.
        let mut data = preamble(0x14);
        data.extend_from_slice(&tit2_tag());

        assert_eq!(
            read_header(&data),
            Err(ParseError::TagSizeMismatch {
                expected: 0x14,
                actual: 0x13,
            })
        );
    }

    #[test]
    fn test_tag_size_is_plain_big_endian() {
        // A 200-byte value: 200 > 0x7F, so a synchsafe reading would
        // disagree. The declared container size is synchsafe and spans
        // two octets: 210 = 0b1_0101_0010 -> 0x01 0x52.
        let mut data = vec![0x49, 0x44, 0x33, 0x04, 0x00, 0x00, 0x00, 0x00, 0x01, 0x52];
        data.extend_from_slice(b"APIC");
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0xC8]);
        data.extend_from_slice(&[0x00, 0x00]);
        data.extend_from_slice(&vec![0xAB; 200]);

        let (header, tags) = read_header(&data).expect("should parse");
        assert_eq!(header.unwrap().tag_size, 210);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].identifier, "APIC");
        assert_eq!(tags[0].value.len(), 200);
    }

    #[test]
    fn test_version_string_reflects_revision() {
        let mut data = preamble(0x13);
        data[3] = 0x03;
        data[4] = 0x01;
        data.extend_from_slice(&tit2_tag());

        let (header, _) = read_header(&data).expect("should parse");
        assert_eq!(header.unwrap().tag_version, "ID3V2.3.1");
    }
}
