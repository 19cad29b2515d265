use std::fmt::Debug;

use anyhow::bail;
use log::trace;
use miniz_oxide::deflate::core::{
    compress, create_comp_flags_from_zip_params, CompressorOxide, TDEFLFlush, TDEFLStatus,
};

use crate::config::EncoderConfig;

/// The compression parameters an [`EncoderConfig`] authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateOptions {
    pub chunk_size: usize,
    pub level: u8,
    pub strategy: u8,
}
impl From<&EncoderConfig> for DeflateOptions {
    fn from(config: &EncoderConfig) -> Self {
        Self {
            chunk_size: config.deflate_chunk_size(),
            level: config.deflate_level(),
            strategy: config.deflate_strategy(),
        }
    }
}

/// An incremental zlib stream. Every returned segment is ready to become the
/// payload of its own data chunk.
pub trait DeflateStream {
    fn write(&mut self, input: &[u8]) -> anyhow::Result<Vec<Vec<u8>>>;
    fn finish(&mut self) -> anyhow::Result<Vec<Vec<u8>>>;
}

/// Builds compression streams. Stored in the configuration so callers can
/// swap in their own compressor.
pub trait DeflateFactory: Debug + Send + Sync {
    fn create(&self, options: DeflateOptions) -> anyhow::Result<Box<dyn DeflateStream>>;
}

/// Stream factory backed by miniz_oxide, wrapped in a zlib header.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZlibDeflate;

impl DeflateFactory for ZlibDeflate {
    fn create(&self, options: DeflateOptions) -> anyhow::Result<Box<dyn DeflateStream>> {
        Ok(Box::new(ZlibStream::new(options)))
    }
}

const ZLIB_WINDOW_BITS: i32 = 15;

pub struct ZlibStream {
    compressor: CompressorOxide,
    buffer: Vec<u8>,
    filled: usize,
    done: bool,
}
impl ZlibStream {
    pub fn new(options: DeflateOptions) -> Self {
        let flags = create_comp_flags_from_zip_params(
            options.level as i32,
            ZLIB_WINDOW_BITS,
            options.strategy as i32,
        );
        Self {
            compressor: CompressorOxide::new(flags),
            buffer: vec![0; options.chunk_size.max(1)],
            filled: 0,
            done: false,
        }
    }

    fn pump(&mut self, mut input: &[u8], flush: TDEFLFlush) -> anyhow::Result<Vec<Vec<u8>>> {
        if self.done {
            bail!("deflate stream already finished");
        }
        let finishing = matches!(flush, TDEFLFlush::Finish);
        let mut segments = Vec::new();
        loop {
            let available = self.buffer.len() - self.filled;
            let (status, consumed, produced) = compress(
                &mut self.compressor,
                input,
                &mut self.buffer[self.filled..],
                flush,
            );
            input = &input[consumed..];
            self.filled += produced;
            if self.filled == self.buffer.len() {
                trace!("deflate segment of {} bytes", self.filled);
                segments.push(self.buffer.clone());
                self.filled = 0;
            }
            match status {
                TDEFLStatus::Done => {
                    if self.filled > 0 {
                        trace!("final deflate segment of {} bytes", self.filled);
                        segments.push(self.buffer[..self.filled].to_vec());
                        self.filled = 0;
                    }
                    self.done = true;
                    break;
                }
                TDEFLStatus::Okay => {
                    if !finishing && input.is_empty() && produced < available {
                        break;
                    }
                }
                TDEFLStatus::BadParam | TDEFLStatus::PutBufFailed => {
                    bail!("deflate failed with {status:?}")
                }
            }
        }
        Ok(segments)
    }
}
impl DeflateStream for ZlibStream {
    fn write(&mut self, input: &[u8]) -> anyhow::Result<Vec<Vec<u8>>> {
        self.pump(input, TDEFLFlush::None)
    }

    fn finish(&mut self) -> anyhow::Result<Vec<Vec<u8>>> {
        self.pump(&[], TDEFLFlush::Finish)
    }
}
