use super::{ChunkType, WritableChunk};

/// End of the chunk stream. Always empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IENDChunk;
impl WritableChunk for IENDChunk {
    type Payload = [u8; 0];

    const HEADER: ChunkType = ChunkType::IEND;

    fn payload(&self) -> Self::Payload {
        []
    }
}
