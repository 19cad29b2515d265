const CRC_TABLE: [u32; 256] = {
    let mut table = [0; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut i = 0;
        while i < 8 {
            if c & 1 != 0 {
                c = 0xedb88320 ^ (c >> 1);
            } else {
                c >>= 1;
            }
            i += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
};

/// Running CRC-32 over the bytes a chunk trailer protects: the type code
/// followed by the payload. The length field is never fed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc32(u32);

impl Crc32 {
    pub const fn new() -> Self {
        Self(0xffffffff)
    }

    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            let index = (self.0 ^ b as u32) & 0xff;
            self.0 = CRC_TABLE[index as usize] ^ (self.0 >> 8);
        }
    }

    pub const fn finish(self) -> u32 {
        self.0 ^ 0xffffffff
    }
}
impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

pub fn calculate_crc(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finish()
}
