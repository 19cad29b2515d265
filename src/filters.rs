use anyhow::ensure;

use crate::config::EncoderConfig;

/// The five adaptive filter types of filter method 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    None = 0,
    Sub = 1,
    Up = 2,
    Average = 3,
    Paeth = 4,
}
impl FilterType {
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Sub,
        FilterType::Up,
        FilterType::Average,
        FilterType::Paeth,
    ];

    /// Residual for byte `x` given its left (`a`), up (`b`) and up-left (`c`)
    /// neighbours, as a signed difference in `-255..=255`.
    pub fn residual(&self, x: u8, a: u8, b: u8, c: u8) -> i16 {
        let x = x as i16;
        match self {
            FilterType::None => x,
            FilterType::Sub => x - a as i16,
            FilterType::Up => x - b as i16,
            FilterType::Average => x - ((a as i16 + b as i16) >> 1),
            FilterType::Paeth => x - paeth_predictor(a, b, c) as i16,
        }
    }

    pub fn filter(&self, x: u8, a: u8, b: u8, c: u8) -> u8 {
        self.residual(x, a, b, c) as u8
    }
}
impl TryFrom<u8> for FilterType {
    type Error = u8;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Sub),
            2 => Ok(Self::Up),
            3 => Ok(Self::Average),
            4 => Ok(Self::Paeth),
            i => Err(i),
        }
    }
}

fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let (a16, b16, c16) = (a as i16, b as i16, c as i16);
    let p = a16 + b16 - c16;
    let pa = (p - a16).abs();
    let pb = (p - b16).abs();
    let pc = (p - c16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Turns packed scanlines into filtered scanlines, each prefixed with the
/// filter type byte.
pub trait ScanlineFilter {
    fn filter(
        &self,
        packed: &[u8],
        width: u32,
        height: u32,
        config: &EncoderConfig,
        bytes_per_pixel: usize,
    ) -> anyhow::Result<Vec<u8>>;
}

/// Picks, per row, the configured filter type with the lowest sum of absolute
/// residuals. With a single configured type that type is always used.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdaptiveFilter;

impl AdaptiveFilter {
    fn filter_row(
        filter_type: FilterType,
        row: &[u8],
        previous: Option<&[u8]>,
        bytes_per_pixel: usize,
        out: &mut Vec<u8>,
    ) {
        out.push(filter_type as u8);
        out.extend(row.iter().enumerate().map(|(i, &x)| {
            let (a, b, c) = neighbours(row, previous, i, bytes_per_pixel);
            filter_type.filter(x, a, b, c)
        }));
    }

    fn residual_sum(
        filter_type: FilterType,
        row: &[u8],
        previous: Option<&[u8]>,
        bytes_per_pixel: usize,
    ) -> u64 {
        row.iter()
            .enumerate()
            .map(|(i, &x)| {
                let (a, b, c) = neighbours(row, previous, i, bytes_per_pixel);
                filter_type.residual(x, a, b, c).unsigned_abs() as u64
            })
            .sum()
    }
}

fn neighbours(row: &[u8], previous: Option<&[u8]>, i: usize, bpp: usize) -> (u8, u8, u8) {
    let a = if i >= bpp { row[i - bpp] } else { 0 };
    let (b, c) = match previous {
        Some(up) => (up[i], if i >= bpp { up[i - bpp] } else { 0 }),
        None => (0, 0),
    };
    (a, b, c)
}

impl ScanlineFilter for AdaptiveFilter {
    fn filter(
        &self,
        packed: &[u8],
        width: u32,
        height: u32,
        config: &EncoderConfig,
        bytes_per_pixel: usize,
    ) -> anyhow::Result<Vec<u8>> {
        let byte_width = width as usize * bytes_per_pixel;
        let expected = byte_width * height as usize;
        ensure!(
            packed.len() >= expected,
            "packed data holds {} bytes but {width}x{height} needs {expected}",
            packed.len()
        );
        let filter_types = config.filter_types();
        let mut out = Vec::with_capacity((byte_width + 1) * height as usize);
        if byte_width == 0 {
            // Zero-width rows still carry their filter type byte.
            out.resize(height as usize, FilterType::None as u8);
            return Ok(out);
        }

        let mut previous = None;
        for row in packed[..expected].chunks_exact(byte_width) {
            let chosen = match filter_types {
                [only] => *only,
                _ => {
                    let mut best = filter_types[0];
                    let mut best_sum = u64::MAX;
                    for &candidate in filter_types {
                        let sum = Self::residual_sum(candidate, row, previous, bytes_per_pixel);
                        if sum < best_sum {
                            best = candidate;
                            best_sum = sum;
                        }
                    }
                    best
                }
            };
            Self::filter_row(chosen, row, previous, bytes_per_pixel, &mut out);
            previous = Some(row);
        }
        Ok(out)
    }
}
