use std::fmt::{Debug, Write};

use log::trace;

pub mod crc;
pub(crate) mod gama;
pub(crate) mod idat;
pub(crate) mod iend;
pub(crate) mod ihdr;

pub use crc::{calculate_crc, Crc32};
pub use gama::{gAMAChunk, GAMMA_DIVISION};
pub use idat::IDATChunk;
pub use iend::IENDChunk;
pub use ihdr::IHDRChunk;

/// Length, type and checksum fields around every payload.
pub const CHUNK_OVERHEAD: usize = 12;

/// A four byte chunk type code. As a `u32` the bytes are packed big-endian.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const gAMA: Self = Self(*b"gAMA");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");

    pub const fn from_u32(code: u32) -> Self {
        Self(code.to_be_bytes())
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}
impl Debug for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            f.write_char(b as char)?;
        }
        Ok(())
    }
}

/// A type code and its payload, not yet framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    pub chunk_type: ChunkType,
    pub payload: &'a [u8],
}
impl<'a> RawChunk<'a> {
    pub fn new(chunk_type: ChunkType, payload: &'a [u8]) -> Self {
        Self {
            chunk_type,
            payload,
        }
    }

    /// Payloads past `u32::MAX` bytes are the caller's problem; the field is
    /// truncated, not checked.
    pub fn length(&self) -> u32 {
        self.payload.len() as u32
    }

    pub fn checksum(&self) -> u32 {
        let mut crc = Crc32::new();
        crc.update(&self.chunk_type.0);
        crc.update(self.payload);
        crc.finish()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.payload.len() + CHUNK_OVERHEAD);
        bytes.extend(self.length().to_be_bytes());
        bytes.extend(self.chunk_type.0);
        bytes.extend(self.payload);
        bytes.extend(self.checksum().to_be_bytes());
        trace!("framed {:?} chunk, {} bytes", self.chunk_type, bytes.len());
        bytes
    }
}

/// Frames `payload` as `length ++ type ++ payload ++ crc32(type ++ payload)`.
/// An empty payload stands for an absent one.
pub fn frame(chunk_type: ChunkType, payload: &[u8]) -> Vec<u8> {
    RawChunk::new(chunk_type, payload).to_bytes()
}

pub trait WritableChunk {
    type Payload: AsRef<[u8]>;
    const HEADER: ChunkType;

    fn payload(&self) -> Self::Payload;

    fn to_bytes(&self) -> Vec<u8> {
        frame(Self::HEADER, self.payload().as_ref())
    }
}
