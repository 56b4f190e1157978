//! JSON report generation

use serde::Serialize;
use std::io::{self, Write};

use crate::mpeg::parser::AudioObject;
use crate::stats::StreamStats;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct JsonReport<'a> {
    summary: StreamStats,
    audio: &'a AudioObject,
}

/// Write a parsed stream, with a frame-statistics summary, as pretty
/// JSON.
pub fn write_json<W: Write>(writer: &mut W, audio: &AudioObject) -> io::Result<()> {
    let report = JsonReport {
        summary: StreamStats::from_frames(&audio.frames),
        audio,
    };

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    writer.write_all(json.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    #[test]
    fn test_json_report_carries_contract_fields() {
        let mut data = vec![0xFF, 0xFB, 0x90, 0x00];
        data.extend(vec![0u8; 413]);
        let audio = Parser::new(data).parse().expect("should parse");

        let mut out = Vec::new();
        write_json(&mut out, &audio).expect("should serialize");
        let json = String::from_utf8(out).expect("valid utf8");

        assert!(json.contains("\"Summary\""));
        assert!(json.contains("\"Frames\""));
        assert!(json.contains("\"MPEGVersionID\": 3"));
        assert!(json.contains("\"MPEGVersion\": \"MPEG Version 1 (ISO/IEC 11172-3)\""));
        assert!(json.contains("\"Layer\": \"Layer III\""));
        assert!(json.contains("\"Channel\": \"Stereo\""));
        assert!(json.contains("\"SamplingRate\": 44100"));
        assert!(json.contains("\"Size\": 413"));
    }

    #[test]
    fn test_json_report_renders_tags_and_header() {
        let mut data = vec![0x49, 0x44, 0x33, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x13];
        data.extend_from_slice(b"TIT2");
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x09]);
        data.extend_from_slice(&[0x00, 0x00]);
        data.extend_from_slice(&[0x00, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x21, 0x00, 0x00]);
        data.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        data.extend(vec![0u8; 413]);
        let audio = Parser::new(data).parse().expect("should parse");

        let mut out = Vec::new();
        write_json(&mut out, &audio).expect("should serialize");
        let json = String::from_utf8(out).expect("valid utf8");

        assert!(json.contains("\"TagVersion\": \"ID3V2.4.0\""));
        assert!(json.contains("\"Identifier\": \"TIT2\""));
    }
}
