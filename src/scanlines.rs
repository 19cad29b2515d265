use log::debug;

use crate::{
    bitpacking::{BitPacker, Repacker},
    config::EncoderConfig,
    filters::{AdaptiveFilter, ScanlineFilter},
};

/// Turns a caller's pixel buffer into filtered scanlines ready for deflate:
/// repack into the output layout, then filter row by row.
#[derive(Debug, Default, Clone)]
pub struct ScanlinePipeline<P = Repacker, F = AdaptiveFilter> {
    packer: P,
    filter: F,
}
impl ScanlinePipeline {
    pub fn new() -> Self {
        Self::default()
    }
}
impl<P: BitPacker, F: ScanlineFilter> ScanlinePipeline<P, F> {
    pub fn with_collaborators(packer: P, filter: F) -> Self {
        Self { packer, filter }
    }

    pub fn process(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        config: &EncoderConfig,
    ) -> anyhow::Result<Vec<u8>> {
        let packed = self.packer.pack(pixels, width, height, config)?;
        // Filtering sees post-repack bytes, so the step is set by the output
        // layout only.
        let bytes_per_pixel = config.bytes_per_pixel();
        let filtered = self
            .filter
            .filter(&packed, width, height, config, bytes_per_pixel)?;
        debug!(
            "filtered {width}x{height} image: {} packed bytes, {} filtered bytes, {bytes_per_pixel} bytes per pixel",
            packed.len(),
            filtered.len()
        );
        Ok(filtered)
    }
}
