use super::{ChunkType, WritableChunk};

/// Gamma is stored as an integer: the value times this divisor, floored.
pub const GAMMA_DIVISION: u32 = 100_000;

/// Image gamma.
///
/// Gamma values that are negative, not finite, or large enough to overflow
/// the 32 bit field are the caller's responsibility: the float to integer
/// cast saturates rather than erroring.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct gAMAChunk {
    pub gamma: f64,
}
impl WritableChunk for gAMAChunk {
    type Payload = [u8; 4];

    const HEADER: ChunkType = ChunkType::gAMA;

    fn payload(&self) -> Self::Payload {
        let scaled = (self.gamma * GAMMA_DIVISION as f64).floor() as u32;
        scaled.to_be_bytes()
    }
}
