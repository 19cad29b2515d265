use crate::config::{BitDepth, ColorType, EncoderConfig};

use super::{ChunkType, WritableChunk};

/// Image header. Compression, filter and interlace methods are always 0:
/// deflate, adaptive filtering, no interlacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IHDRChunk {
    pub width: u32,
    pub height: u32,
    pub(crate) bit_depth: BitDepth,
    pub(crate) color_type: ColorType,
}
impl IHDRChunk {
    pub const COMPRESSION_METHOD: u8 = 0;
    pub const FILTER_METHOD: u8 = 0;
    pub const INTERLACE_METHOD: u8 = 0;

    pub fn new(width: u32, height: u32, config: &EncoderConfig) -> Self {
        Self {
            width,
            height,
            bit_depth: config.bit_depth(),
            color_type: config.color_type(),
        }
    }
}
impl WritableChunk for IHDRChunk {
    type Payload = [u8; 13];

    const HEADER: ChunkType = ChunkType::IHDR;

    fn payload(&self) -> Self::Payload {
        let mut bytes = [0; 13];
        bytes[0..4].copy_from_slice(&self.width.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.height.to_be_bytes());
        bytes[8] = self.bit_depth as u8;
        bytes[9] = self.color_type as u8;
        bytes[10] = Self::COMPRESSION_METHOD;
        bytes[11] = Self::FILTER_METHOD;
        bytes[12] = Self::INTERLACE_METHOD;
        bytes
    }
}
