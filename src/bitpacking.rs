use anyhow::ensure;

use crate::config::{BitDepth, ColorType, EncoderConfig};

/// Converts the caller's pixel buffer into the canonical layout of the
/// configured output color type and bit depth. No filtering, no compression.
pub trait BitPacker {
    fn pack(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        config: &EncoderConfig,
    ) -> anyhow::Result<Vec<u8>>;
}

/// The stock packer.
///
/// Input samples are one byte each at bit depth 8 and native-endian `u16`
/// at bit depth 16. Output samples are written big-endian.
#[derive(Debug, Default, Clone, Copy)]
pub struct Repacker;

#[derive(Debug, Clone, Copy)]
struct Rgba {
    red: u16,
    green: u16,
    blue: u16,
    alpha: u16,
}

impl Repacker {
    fn input_channels(config: &EncoderConfig) -> usize {
        match config.input_color_type() {
            ColorType::ColorAlpha if !config.input_has_alpha() => 3,
            other => other.channel_count(),
        }
    }

    fn read_rgba(samples: &[u16], config: &EncoderConfig) -> Rgba {
        let max = config.bit_depth().max_value();
        let mut rgba = match config.input_color_type() {
            ColorType::ColorAlpha => Rgba {
                red: samples[0],
                green: samples[1],
                blue: samples[2],
                alpha: samples.get(3).copied().unwrap_or(max),
            },
            ColorType::Color => Rgba {
                red: samples[0],
                green: samples[1],
                blue: samples[2],
                alpha: max,
            },
            ColorType::Alpha => Rgba {
                red: samples[0],
                green: samples[0],
                blue: samples[0],
                alpha: samples[1],
            },
            ColorType::Grayscale => Rgba {
                red: samples[0],
                green: samples[0],
                blue: samples[0],
                alpha: max,
            },
        };
        if config.input_has_alpha() && !config.color_type().has_alpha() {
            let alpha = rgba.alpha as f64 / max as f64;
            let background = config.background();
            let blend = |bg: u16, c: u16| -> u16 {
                ((1.0 - alpha) * bg as f64 + alpha * c as f64)
                    .round()
                    .clamp(0.0, max as f64) as u16
            };
            rgba.red = blend(background.red, rgba.red);
            rgba.green = blend(background.green, rgba.green);
            rgba.blue = blend(background.blue, rgba.blue);
        }
        rgba
    }

    fn write_sample(out: &mut Vec<u8>, value: u16, bit_depth: BitDepth) {
        match bit_depth {
            BitDepth::Eight => out.push(value as u8),
            BitDepth::Sixteen => out.extend(value.to_be_bytes()),
        }
    }
}

impl BitPacker for Repacker {
    fn pack(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        config: &EncoderConfig,
    ) -> anyhow::Result<Vec<u8>> {
        let bit_depth = config.bit_depth();
        let sample_bytes = bit_depth.bytes_per_sample();
        let pixel_count = width as usize * height as usize;
        let in_channels = Self::input_channels(config);
        let expected = pixel_count * in_channels * sample_bytes;
        ensure!(
            pixels.len() >= expected,
            "pixel buffer holds {} bytes but {width}x{height} {:?} needs {expected}",
            pixels.len(),
            config.input_color_type()
        );

        if in_channels == config.color_type().channel_count()
            && (bit_depth == BitDepth::Eight || cfg!(target_endian = "big"))
        {
            return Ok(pixels[..expected].to_vec());
        }

        let samples: Vec<u16> = match bit_depth {
            BitDepth::Eight => pixels[..expected].iter().map(|&b| b as u16).collect(),
            BitDepth::Sixteen => pixels[..expected]
                .chunks_exact(2)
                .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
                .collect(),
        };

        let output = config.color_type();
        let mut out = Vec::with_capacity(pixel_count * config.bytes_per_pixel());
        for pixel in samples.chunks_exact(in_channels) {
            let rgba = Self::read_rgba(pixel, config);
            match output {
                ColorType::ColorAlpha | ColorType::Color => {
                    Self::write_sample(&mut out, rgba.red, bit_depth);
                    Self::write_sample(&mut out, rgba.green, bit_depth);
                    Self::write_sample(&mut out, rgba.blue, bit_depth);
                }
                ColorType::Alpha | ColorType::Grayscale => {
                    let gray = (rgba.red as u32 + rgba.green as u32 + rgba.blue as u32) / 3;
                    Self::write_sample(&mut out, gray as u16, bit_depth);
                }
            }
            if output.has_alpha() {
                Self::write_sample(&mut out, rgba.alpha, bit_depth);
            }
        }
        Ok(out)
    }
}
