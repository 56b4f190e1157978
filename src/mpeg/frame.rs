//! MPEG frame header decoding
//!
//! MPEG audio frames start with a sync word (11 bits of 1s) followed by
//! header info. Frame header structure (4 bytes):
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//!
//! A = sync (11 bits)
//! B = MPEG version (2 bits): 00=2.5, 01=reserved, 10=2, 11=1
//! C = Layer (2 bits): 00=reserved, 01=III, 10=II, 11=I
//! D = Protection bit (CRC)
//! E = Bitrate index (4 bits)
//! F = Sample rate index (2 bits)
//! G = Padding bit
//! H = Private bit
//! I = Channel mode (2 bits)
//! J = Mode extension (2 bits)
//! K = Copyright
//! L = Original
//! M = Emphasis (2 bits)

use serde::{Serialize, Serializer};
use std::fmt;

use crate::cursor;
use crate::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    Mpeg25,
    Reserved,
    Mpeg2,
    Mpeg1,
}

impl MpegVersion {
    fn from_id(id: u8) -> Self {
        match id & 0x03 {
            0 => MpegVersion::Mpeg25,
            1 => MpegVersion::Reserved,
            2 => MpegVersion::Mpeg2,
            _ => MpegVersion::Mpeg1,
        }
    }
}

impl fmt::Display for MpegVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MpegVersion::Mpeg25 => write!(f, "MPEG Version 2.5 (unofficial)"),
            MpegVersion::Reserved => write!(f, "Reserved"),
            MpegVersion::Mpeg2 => write!(f, "MPEG Version 2 (ISO/IEC 13818-3)"),
            MpegVersion::Mpeg1 => write!(f, "MPEG Version 1 (ISO/IEC 11172-3)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Reserved,
    Layer3,
    Layer2,
    Layer1,
}

impl Layer {
    fn from_id(id: u8) -> Self {
        match id & 0x03 {
            1 => Layer::Layer3,
            2 => Layer::Layer2,
            3 => Layer::Layer1,
            _ => Layer::Reserved,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Reserved => write!(f, "Reserved"),
            Layer::Layer3 => write!(f, "Layer III"),
            Layer::Layer2 => write!(f, "Layer II"),
            Layer::Layer1 => write!(f, "Layer I"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl ChannelMode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => ChannelMode::Stereo,
            1 => ChannelMode::JointStereo,
            2 => ChannelMode::DualChannel,
            3 => ChannelMode::Mono,
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelMode::Stereo => write!(f, "Stereo"),
            ChannelMode::JointStereo => write!(f, "Joint Stereo"),
            ChannelMode::DualChannel => write!(f, "Dual Channel"),
            ChannelMode::Mono => write!(f, "Mono"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    None,
    FiftyFifteenMs,
    Reserved,
    CcitJ17,
}

impl Emphasis {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Emphasis::None,
            1 => Emphasis::FiftyFifteenMs,
            2 => Emphasis::Reserved,
            3 => Emphasis::CcitJ17,
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for Emphasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emphasis::None => write!(f, "None"),
            Emphasis::FiftyFifteenMs => write!(f, "50/15 ms"),
            Emphasis::Reserved => write!(f, "Reserved"),
            Emphasis::CcitJ17 => write!(f, "CCIT J.17"),
        }
    }
}

// The textual renderings above are the external contract; downstream
// code branches on these literals, so the enums serialize through
// Display rather than their variant names.
macro_rules! serialize_as_display {
    ($($ty:ty),*) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    )*};
}

serialize_as_display!(MpegVersion, Layer, ChannelMode, Emphasis);

/// Joint-stereo mode extension, decoded from header bits 27-28.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModeExtension {
    pub intensity_stereo: bool,
    pub ms_stereo: bool,
}

impl ModeExtension {
    fn from_bits(bits: u8) -> Self {
        ModeExtension {
            intensity_stereo: bits & 0x01 != 0,
            ms_stereo: bits & 0x02 != 0,
        }
    }
}

// Bitrate matrix (kbit/s), indexed [bitrate_index][column].
// Columns: MPEG-1 Layer I, MPEG-1 Layer II, MPEG-1 Layer III,
// MPEG-2 Layer III, MPEG-2 Layer I/II (shared column).
// Index 0 is free format and index 15 is invalid; both rows are zero
// and rejected at resolution time. MPEG-2.5 has no column.
const BITRATE_MATRIX: [[u32; 5]; 16] = [
    [0, 0, 0, 0, 0],
    [32, 32, 32, 8, 32],
    [64, 48, 40, 16, 48],
    [96, 56, 48, 24, 56],
    [128, 64, 56, 32, 64],
    [160, 80, 64, 40, 80],
    [192, 96, 80, 48, 96],
    [224, 112, 96, 56, 112],
    [256, 128, 112, 64, 128],
    [288, 160, 128, 80, 144],
    [320, 192, 160, 96, 160],
    [352, 224, 192, 112, 176],
    [384, 256, 224, 128, 192],
    [416, 320, 256, 144, 224],
    [448, 384, 320, 160, 256],
    [0, 0, 0, 0, 0],
];

// Sample rate matrix (Hz), indexed [sample_rate_index][column].
// Columns: MPEG-1, MPEG-2, MPEG-2.5. Row 3 is reserved.
const SAMPLE_RATE_MATRIX: [[Option<u32>; 3]; 4] = [
    [Some(44100), Some(22050), Some(11025)],
    [Some(48000), Some(24000), Some(12000)],
    [Some(32000), Some(16000), Some(8000)],
    [None, None, None],
];

/// One decoded MPEG audio frame: header fields plus the raw payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Frame {
    /// All 32 header bits, MSB first, as a binary string.
    pub raw_header_bits: String,
    pub header_bytes: [u8; 4],
    #[serde(rename = "MPEGVersionID")]
    pub mpeg_version_id: u8,
    #[serde(rename = "MPEGVersion")]
    pub mpeg_version: MpegVersion,
    #[serde(rename = "LayerID")]
    pub layer_id: u8,
    pub layer: Layer,
    /// True when the protection bit is 0 (a 16-bit CRC follows the
    /// header).
    #[serde(rename = "CRCProtected")]
    pub crc_protected: bool,
    #[serde(rename = "BitrateID")]
    pub bitrate_id: u8,
    /// kbit/s.
    pub bitrate: u32,
    #[serde(rename = "SamplingRateID")]
    pub sampling_rate_id: u8,
    /// Hz.
    pub sampling_rate: u32,
    pub padded: bool,
    pub private_bit: u8,
    pub channel: ChannelMode,
    pub mode_extension: ModeExtension,
    pub is_copyrighted: bool,
    pub is_original: bool,
    pub emphasis: Emphasis,
    /// Payload length in bytes, excluding the 4-octet header.
    pub size: usize,
    pub raw_data: Vec<u8>,
}

/// True when the window holds a full 4-octet header whose first 11
/// bits are all ones. Never true on a partial window.
pub fn possible_frame(window: &[u8]) -> bool {
    window.len() >= 4 && window[0] == 0xFF && (window[1] & 0xE0) == 0xE0
}

impl Frame {
    /// Decode a 4-octet frame header. The payload is attached by the
    /// caller once it has been consumed from the stream.
    pub fn decode(header: &[u8]) -> Result<Frame, ParseError> {
        if !possible_frame(header) {
            return Err(ParseError::InvalidSync);
        }
        let header_bytes = [header[0], header[1], header[2], header[3]];

        let mpeg_version_id = (header_bytes[1] >> 3) & 0x03;
        let layer_id = (header_bytes[1] >> 1) & 0x03;
        let crc_protected = header_bytes[1] & 0x01 == 0;
        let bitrate_id = (header_bytes[2] >> 4) & 0x0F;
        let sampling_rate_id = (header_bytes[2] >> 2) & 0x03;
        let padded = header_bytes[2] & 0x02 != 0;
        let private_bit = header_bytes[2] & 0x01;
        let channel = ChannelMode::from_bits(header_bytes[3] >> 6);
        let mode_extension = ModeExtension::from_bits((header_bytes[3] >> 4) & 0x03);
        let is_copyrighted = header_bytes[3] & 0x08 != 0;
        let is_original = header_bytes[3] & 0x04 != 0;
        let emphasis = Emphasis::from_bits(header_bytes[3] & 0x03);

        let bitrate = resolve_bitrate(mpeg_version_id, layer_id, bitrate_id)?;
        let sampling_rate = resolve_sample_rate(mpeg_version_id, sampling_rate_id)?;
        let size = frame_size(layer_id, bitrate, sampling_rate, padded)?;

        Ok(Frame {
            raw_header_bits: cursor::bytes_to_binary(&header_bytes),
            header_bytes,
            mpeg_version_id,
            mpeg_version: MpegVersion::from_id(mpeg_version_id),
            layer_id,
            layer: Layer::from_id(layer_id),
            crc_protected,
            bitrate_id,
            bitrate,
            sampling_rate_id,
            sampling_rate,
            padded,
            private_bit,
            channel,
            mode_extension,
            is_copyrighted,
            is_original,
            emphasis,
            size,
            raw_data: Vec::new(),
        })
    }
}

fn resolve_bitrate(version_id: u8, layer_id: u8, index: u8) -> Result<u32, ParseError> {
    let err = ParseError::InvalidBitrate {
        index,
        version_id,
        layer_id,
    };
    // Column map: MPEG-1 layers I/II/III use columns 0/1/2; MPEG-2
    // Layer III uses column 3 and Layers I/II share column 4.
    // MPEG-2.5 (and the reserved version) has no mapping.
    let column = match (version_id, layer_id) {
        (3, 3) => 0,
        (3, 2) => 1,
        (3, 1) => 2,
        (2, 1) => 3,
        (2, 3) | (2, 2) => 4,
        _ => return Err(err),
    };
    let kbps = BITRATE_MATRIX[index as usize][column];
    if kbps == 0 {
        return Err(err);
    }
    Ok(kbps)
}

fn resolve_sample_rate(version_id: u8, index: u8) -> Result<u32, ParseError> {
    let column = match version_id {
        3 => 0,
        2 => 1,
        _ => 2,
    };
    SAMPLE_RATE_MATRIX[index as usize][column].ok_or(ParseError::InvalidSamplingRate(index))
}

/// Payload length in bytes, excluding the already-consumed 4-octet
/// header. Computed in floating point and floored once, so the Layer I
/// expression keeps its fractional intermediate.
fn frame_size(
    layer_id: u8,
    bitrate_kbps: u32,
    sampling_rate: u32,
    padded: bool,
) -> Result<usize, ParseError> {
    let bitrate = f64::from(bitrate_kbps) * 1000.0;
    let rate = f64::from(sampling_rate);
    let pad = if padded { 1.0 } else { 0.0 };

    let size = match layer_id {
        // Layer I slots are 4 bytes wide; padding adds one slot.
        3 => ((12.0 * bitrate) / rate + 4.0 * pad) * 4.0 - 4.0,
        1 | 2 => (144.0 * bitrate) / rate + pad - 4.0,
        _ => unreachable!("bitrate resolution rejects reserved layers"),
    };

    let size = size.floor() as i64;
    if size < 0 {
        return Err(ParseError::InvalidFrameSize(size));
    }
    Ok(size as usize)
}
