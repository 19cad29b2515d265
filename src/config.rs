use std::sync::Arc;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    deflate::{DeflateFactory, ZlibDeflate},
    filters::FilterType,
};

pub const DEFAULT_DEFLATE_CHUNK_SIZE: usize = 32 * 1024;
pub const DEFAULT_DEFLATE_LEVEL: u8 = 9;
pub const DEFAULT_DEFLATE_STRATEGY: u8 = 3;

/// Errors raised while validating an [`EncoderOptions`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("option color type:{0} is not supported at present")]
    ColorType(u8),

    #[error("option input color type:{0} is not supported at present")]
    InputColorType(u8),

    #[error("option bit depth:{0} is not supported at present")]
    BitDepth(u8),

    #[error("option deflate chunk size must be positive")]
    DeflateChunkSize,

    #[error("option deflate level:{0} is outside 0..=9")]
    DeflateLevel(u8),

    #[error("option deflate strategy:{0} is outside 0..=4")]
    DeflateStrategy(u8),

    #[error("option filter type:{0} is not supported")]
    FilterType(u8),

    #[error("option filter types must name at least one filter")]
    NoFilterTypes,
}

/// Output (and input) pixel layouts this encoder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    Grayscale = 0,
    Color = 2,
    /// Grayscale with an alpha channel.
    Alpha = 4,
    ColorAlpha = 6,
}
impl TryFrom<u8> for ColorType {
    type Error = u8;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Grayscale),
            2 => Ok(Self::Color),
            4 => Ok(Self::Alpha),
            6 => Ok(Self::ColorAlpha),
            other => Err(other),
        }
    }
}
impl ColorType {
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Grayscale => 1,
            Self::Alpha => 2,
            Self::Color => 3,
            Self::ColorAlpha => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Alpha | Self::ColorAlpha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Eight = 8,
    Sixteen = 16,
}
impl TryFrom<u8> for BitDepth {
    type Error = u8;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            other => Err(other),
        }
    }
}
impl BitDepth {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
        }
    }

    pub fn max_value(&self) -> u16 {
        match self {
            Self::Eight => u8::MAX as u16,
            Self::Sixteen => u16::MAX,
        }
    }
}

/// Color that transparent input is flattened onto when the output has no
/// alpha channel. Samples are on the scale of the configured bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Background {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// A partial encoder configuration. Every `None` is replaced by its default
/// when the options are turned into an [`EncoderConfig`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncoderOptions {
    pub deflate_chunk_size: Option<usize>,
    pub deflate_level: Option<u8>,
    pub deflate_strategy: Option<u8>,
    pub input_has_alpha: Option<bool>,
    pub bit_depth: Option<u8>,
    pub color_type: Option<u8>,
    pub input_color_type: Option<u8>,
    pub filter_types: Option<Vec<u8>>,
    pub background: Option<Background>,
    #[serde(skip)]
    pub deflate_factory: Option<Arc<dyn DeflateFactory>>,
}
impl EncoderOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_deflate_factory(mut self, factory: Arc<dyn DeflateFactory>) -> Self {
        self.deflate_factory = Some(factory);
        self
    }
}

/// A validated encoder configuration. Read-only once built.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    deflate_chunk_size: usize,
    deflate_level: u8,
    deflate_strategy: u8,
    deflate_factory: Arc<dyn DeflateFactory>,
    input_has_alpha: bool,
    bit_depth: BitDepth,
    color_type: ColorType,
    input_color_type: ColorType,
    filter_types: Vec<FilterType>,
    background: Background,
}
impl EncoderConfig {
    pub fn new(options: EncoderOptions) -> Result<Self, ConfigError> {
        let color_type = options
            .color_type
            .map_or(Ok(ColorType::ColorAlpha), ColorType::try_from)
            .map_err(ConfigError::ColorType)?;
        let input_color_type = options
            .input_color_type
            .map_or(Ok(ColorType::ColorAlpha), ColorType::try_from)
            .map_err(ConfigError::InputColorType)?;
        let bit_depth = options
            .bit_depth
            .map_or(Ok(BitDepth::Eight), BitDepth::try_from)
            .map_err(ConfigError::BitDepth)?;

        let deflate_chunk_size = options
            .deflate_chunk_size
            .unwrap_or(DEFAULT_DEFLATE_CHUNK_SIZE);
        if deflate_chunk_size == 0 {
            return Err(ConfigError::DeflateChunkSize);
        }
        let deflate_level = options.deflate_level.unwrap_or(DEFAULT_DEFLATE_LEVEL);
        if deflate_level > 9 {
            return Err(ConfigError::DeflateLevel(deflate_level));
        }
        let deflate_strategy = options
            .deflate_strategy
            .unwrap_or(DEFAULT_DEFLATE_STRATEGY);
        if deflate_strategy > 4 {
            return Err(ConfigError::DeflateStrategy(deflate_strategy));
        }

        let filter_types = match options.filter_types {
            Some(codes) if codes.is_empty() => return Err(ConfigError::NoFilterTypes),
            Some(codes) => codes
                .into_iter()
                .map(|code| FilterType::try_from(code).map_err(ConfigError::FilterType))
                .collect::<Result<Vec<_>, _>>()?,
            None => FilterType::ALL.to_vec(),
        };

        let max = bit_depth.max_value();
        let background = options.background.unwrap_or(Background {
            red: max,
            green: max,
            blue: max,
        });

        let config = Self {
            deflate_chunk_size,
            deflate_level,
            deflate_strategy,
            deflate_factory: options
                .deflate_factory
                .unwrap_or_else(|| Arc::new(ZlibDeflate)),
            input_has_alpha: options.input_has_alpha.unwrap_or(true),
            bit_depth,
            color_type,
            input_color_type,
            filter_types,
            background,
        };
        debug!(
            "validated encoder config: {:?} {:?} from {:?}, level {}, strategy {}",
            config.color_type,
            config.bit_depth,
            config.input_color_type,
            config.deflate_level,
            config.deflate_strategy
        );
        Ok(config)
    }

    pub fn deflate_chunk_size(&self) -> usize {
        self.deflate_chunk_size
    }
    pub fn deflate_level(&self) -> u8 {
        self.deflate_level
    }
    pub fn deflate_strategy(&self) -> u8 {
        self.deflate_strategy
    }
    pub fn deflate_factory(&self) -> &dyn DeflateFactory {
        self.deflate_factory.as_ref()
    }
    pub fn input_has_alpha(&self) -> bool {
        self.input_has_alpha
    }
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }
    pub fn color_type(&self) -> ColorType {
        self.color_type
    }
    pub fn input_color_type(&self) -> ColorType {
        self.input_color_type
    }
    pub fn filter_types(&self) -> &[FilterType] {
        &self.filter_types
    }
    pub fn background(&self) -> Background {
        self.background
    }

    /// Bytes per complete pixel in the canonical output layout. This is the
    /// distance the filters look back for the "left" neighbour.
    pub fn bytes_per_pixel(&self) -> usize {
        self.color_type.channel_count() * self.bit_depth.bytes_per_sample()
    }
}
