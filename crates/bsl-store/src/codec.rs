use crate::error::{StoreError, StoreResult};

/// Reversible transformation applied to document bytes before storage.
///
/// `decode(encode(x)) == x` must hold for every input.
pub trait BlobCodec: Send + Sync {
    fn encode(&self, data: &[u8]) -> StoreResult<Vec<u8>>;

    /// Fails with [`StoreError::Codec`] when `data` is not a valid encoding.
    fn decode(&self, data: &[u8]) -> StoreResult<Vec<u8>>;
}

/// zstd compression. HTML and similar text compress several times over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub const DEFAULT_LEVEL: i32 = 3;

    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LEVEL)
    }
}

impl BlobCodec for ZstdCodec {
    fn encode(&self, data: &[u8]) -> StoreResult<Vec<u8>> {
        zstd::encode_all(data, self.level)
            .map_err(|e| StoreError::Codec(format!("compression failed: {e}")))
    }

    fn decode(&self, data: &[u8]) -> StoreResult<Vec<u8>> {
        zstd::decode_all(data)
            .map_err(|e| StoreError::Codec(format!("decompression failed: {e}")))
    }
}

/// Stores document bytes unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityCodec;

impl BlobCodec for IdentityCodec {
    fn encode(&self, data: &[u8]) -> StoreResult<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decode(&self, data: &[u8]) -> StoreResult<Vec<u8>> {
        Ok(data.to_vec())
    }
}
