pub mod bitpacking;
pub mod chunks;
pub mod config;
pub mod deflate;
pub mod filters;
mod png;
pub mod scanlines;

pub use chunks::{frame, ChunkType, RawChunk, WritableChunk};
pub use config::{BitDepth, ColorType, ConfigError, EncoderConfig, EncoderOptions};
pub use png::{PngPacker, SIGNATURE};
