use super::{ChunkType, WritableChunk};

/// One segment of the compressed image stream, passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IDATChunk<'a> {
    pub data: &'a [u8],
}
impl<'a> WritableChunk for IDATChunk<'a> {
    type Payload = &'a [u8];

    const HEADER: ChunkType = ChunkType::IDAT;

    fn payload(&self) -> Self::Payload {
        self.data
    }
}
