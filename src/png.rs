use crate::{
    bitpacking::{BitPacker, Repacker},
    chunks::{gAMAChunk, IDATChunk, IENDChunk, IHDRChunk, WritableChunk},
    config::{ConfigError, EncoderConfig, EncoderOptions},
    deflate::{DeflateFactory, DeflateOptions, DeflateStream},
    filters::{AdaptiveFilter, ScanlineFilter},
    scanlines::ScanlinePipeline,
};

/// The eight bytes every PNG file starts with. Written by whoever assembles
/// the file, ahead of the chunks produced here.
pub const SIGNATURE: [u8; 8] = *b"\x89PNG\x0d\x0a\x1a\x0a";

/// Produces the chunks of a PNG file from a validated configuration.
///
/// Ordering and output are up to the caller: signature, [`pack_ihdr`],
/// optionally [`pack_gama`], one [`pack_idat`] per deflate segment, then
/// [`pack_iend`].
///
/// [`pack_ihdr`]: PngPacker::pack_ihdr
/// [`pack_gama`]: PngPacker::pack_gama
/// [`pack_idat`]: PngPacker::pack_idat
/// [`pack_iend`]: PngPacker::pack_iend
#[derive(Debug, Clone)]
pub struct PngPacker<P = Repacker, F = AdaptiveFilter> {
    config: EncoderConfig,
    pipeline: ScanlinePipeline<P, F>,
}
impl PngPacker {
    pub fn new(options: EncoderOptions) -> Result<Self, ConfigError> {
        Ok(Self {
            config: EncoderConfig::new(options)?,
            pipeline: ScanlinePipeline::new(),
        })
    }
}
impl<P: BitPacker, F: ScanlineFilter> PngPacker<P, F> {
    pub fn with_pipeline(
        options: EncoderOptions,
        pipeline: ScanlinePipeline<P, F>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            config: EncoderConfig::new(options)?,
            pipeline,
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn deflate_options(&self) -> DeflateOptions {
        DeflateOptions::from(&self.config)
    }

    pub fn create_deflate(&self) -> anyhow::Result<Box<dyn DeflateStream>> {
        self.config
            .deflate_factory()
            .create(self.deflate_options())
    }

    pub fn filter_data(&self, pixels: &[u8], width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
        self.pipeline.process(pixels, width, height, &self.config)
    }

    pub fn pack_ihdr(&self, width: u32, height: u32) -> Vec<u8> {
        IHDRChunk::new(width, height, &self.config).to_bytes()
    }

    pub fn pack_gama(&self, gamma: f64) -> Vec<u8> {
        gAMAChunk { gamma }.to_bytes()
    }

    pub fn pack_idat(&self, data: &[u8]) -> Vec<u8> {
        IDATChunk { data }.to_bytes()
    }

    pub fn pack_iend(&self) -> Vec<u8> {
        IENDChunk.to_bytes()
    }
}
