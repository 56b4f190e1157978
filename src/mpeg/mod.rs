pub mod frame;
pub mod id3;
pub mod parser;

pub use frame::{ChannelMode, Emphasis, Frame, Layer, ModeExtension, MpegVersion};
pub use id3::{HeaderInfo, Tag};
pub use parser::{AudioObject, Parser};
