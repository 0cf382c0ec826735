//! Persistence of the slot index as a single record.
//!
//! On-disk format:
//! ```text
//! [4 bytes: magic "BSLI"]
//! [4 bytes: format version (big-endian u32)]
//! [4 bytes: CRC32 of payload (big-endian u32)]
//! [N bytes: payload (zstd-compressed JSON SlotIndex)]
//! ```

use bsl_store::StorageBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IndexError, IndexResult};
use crate::slots::SlotIndex;

pub const INDEX_MAGIC: &[u8; 4] = b"BSLI";
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Header size: 4 bytes magic + 4 bytes version + 4 bytes CRC.
const HEADER_SIZE: usize = 12;

/// What [`load`] does when the persisted record cannot be used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexRecovery {
    /// Log a warning and start from an empty index. Documents written
    /// under the old index stay on disk but are no longer reachable.
    #[default]
    Reset,
    /// Surface [`IndexError::Corrupt`] to the caller.
    Fail,
}

/// Encodes a [`SlotIndex`] into the framed record format and back.
#[derive(Clone, Copy, Debug)]
pub struct IndexCodec {
    level: i32,
}

impl IndexCodec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn encode(&self, index: &SlotIndex) -> IndexResult<Vec<u8>> {
        let json =
            serde_json::to_vec(index).map_err(|e| IndexError::Serialization(e.to_string()))?;
        let payload = zstd::encode_all(json.as_slice(), self.level)
            .map_err(|e| IndexError::Serialization(format!("compression failed: {e}")))?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
        buf.extend_from_slice(INDEX_MAGIC);
        buf.extend_from_slice(&INDEX_FORMAT_VERSION.to_be_bytes());
        buf.extend_from_slice(&crc32fast::hash(&payload).to_be_bytes());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Decode a record, rejecting anything whose framing, checksum or
    /// invariants do not hold.
    pub fn decode(&self, data: &[u8]) -> IndexResult<SlotIndex> {
        if data.len() < HEADER_SIZE {
            return Err(IndexError::Corrupt(format!(
                "record too short: {} bytes",
                data.len()
            )));
        }
        let (header, payload) = data.split_at(HEADER_SIZE);
        if &header[0..4] != INDEX_MAGIC {
            return Err(IndexError::Corrupt(format!(
                "invalid magic: {:?}",
                String::from_utf8_lossy(&header[0..4])
            )));
        }
        let version = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
        if version != INDEX_FORMAT_VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported format version {version}"
            )));
        }
        let expected_crc = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
        let actual_crc = crc32fast::hash(payload);
        if expected_crc != actual_crc {
            return Err(IndexError::Corrupt(format!(
                "checksum mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"
            )));
        }

        let json = zstd::decode_all(payload)
            .map_err(|e| IndexError::Corrupt(format!("decompression failed: {e}")))?;
        let index: SlotIndex =
            serde_json::from_slice(&json).map_err(|e| IndexError::Corrupt(e.to_string()))?;
        index.check_invariants()?;
        Ok(index)
    }
}

impl Default for IndexCodec {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Load the persisted index.
///
/// Returns `Ok(None)` when no record exists. An unreadable record is handled
/// according to `recovery`.
pub fn load(
    backend: &dyn StorageBackend,
    codec: &IndexCodec,
    recovery: IndexRecovery,
) -> IndexResult<Option<SlotIndex>> {
    let loaded = backend
        .read_index()
        .map_err(IndexError::from)
        .and_then(|bytes| bytes.map(|b| codec.decode(&b)).transpose());

    match (loaded, recovery) {
        (Ok(index), _) => {
            if let Some(index) = &index {
                debug!(
                    occupied = index.occupied_count(),
                    capacity = index.capacity().get(),
                    "index loaded"
                );
            }
            Ok(index)
        }
        (Err(e), IndexRecovery::Reset) => {
            warn!(error = %e, "discarding unreadable index; starting empty");
            Ok(None)
        }
        (Err(e), IndexRecovery::Fail) => Err(e),
    }
}

/// Encode `index` and replace the persisted record.
pub fn save(
    backend: &dyn StorageBackend,
    codec: &IndexCodec,
    index: &SlotIndex,
) -> IndexResult<()> {
    let bytes = codec.encode(index)?;
    backend.write_index(&bytes)?;
    debug!(len = bytes.len(), occupied = index.occupied_count(), "index saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsl_store::InMemoryBackend;
    use bsl_types::{Capacity, SlotId};
    use serde_json::json;

    fn populated(capacity: usize, writes: &[Option<&str>]) -> SlotIndex {
        let mut idx = SlotIndex::new(Capacity::new(capacity).unwrap());
        for (i, name) in writes.iter().enumerate() {
            let slot = idx.next_slot();
            idx.record(slot, *name, json!({ "marked": false, "attempts": i }))
                .unwrap();
            idx.set_head(slot).unwrap();
        }
        idx
    }

    #[test]
    fn encode_decode_preserves_state() {
        let codec = IndexCodec::default();
        let idx = populated(3, &[Some("x"), None, Some("y"), Some("x"), None]);
        let decoded = codec.decode(&codec.encode(&idx).unwrap()).unwrap();
        assert_eq!(decoded, idx);
        assert_eq!(decoded.head(), Some(SlotId::new(1)));
        assert_eq!(decoded.lookup_by_name("x"), Some(SlotId::new(0)));
    }

    #[test]
    fn capacity_one_and_empty_states() {
        let codec = IndexCodec::default();
        for idx in [populated(1, &[]), populated(1, &[Some("only"), Some("only")])] {
            assert_eq!(codec.decode(&codec.encode(&idx).unwrap()).unwrap(), idx);
        }
    }

    #[test]
    fn record_starts_with_header() {
        let bytes = IndexCodec::default().encode(&populated(2, &[None])).unwrap();
        assert_eq!(&bytes[0..4], INDEX_MAGIC);
        assert_eq!(&bytes[4..8], &INDEX_FORMAT_VERSION.to_be_bytes());
    }

    #[test]
    fn decode_rejects_truncated_record() {
        let err = IndexCodec::default().decode(b"BSLI").unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));
    }

    #[test]
    fn decode_rejects_bad_magic() {
        let mut bytes = IndexCodec::default().encode(&populated(2, &[None])).unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            IndexCodec::default().decode(&bytes),
            Err(IndexError::Corrupt(_))
        ));
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let mut bytes = IndexCodec::default().encode(&populated(2, &[None])).unwrap();
        bytes[4..8].copy_from_slice(&99u32.to_be_bytes());
        let err = IndexCodec::default().decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn decode_detects_flipped_payload_byte() {
        let mut bytes = IndexCodec::default().encode(&populated(2, &[Some("a")])).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let err = IndexCodec::default().decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn load_missing_record_is_none() {
        let backend = InMemoryBackend::new();
        let got = load(&backend, &IndexCodec::default(), IndexRecovery::Fail).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn save_then_load() {
        let backend = InMemoryBackend::new();
        let codec = IndexCodec::default();
        let idx = populated(4, &[Some("front"), None]);
        save(&backend, &codec, &idx).unwrap();
        let loaded = load(&backend, &codec, IndexRecovery::Fail).unwrap().unwrap();
        assert_eq!(loaded, idx);
    }

    #[test]
    fn corrupt_record_resets_or_fails_by_policy() {
        let backend = InMemoryBackend::new();
        backend.write_index(b"garbage that is long enough").unwrap();
        let codec = IndexCodec::default();

        assert!(load(&backend, &codec, IndexRecovery::Reset).unwrap().is_none());
        assert!(matches!(
            load(&backend, &codec, IndexRecovery::Fail),
            Err(IndexError::Corrupt(_))
        ));
    }

    #[test]
    fn save_propagates_backend_failure() {
        let backend = InMemoryBackend::new();
        backend.set_fail_writes(true);
        let err = save(&backend, &IndexCodec::default(), &populated(2, &[None])).unwrap_err();
        assert!(matches!(err, IndexError::Store(_)));
    }

    #[test]
    fn recovery_policy_serde_names() {
        assert_eq!(serde_json::to_string(&IndexRecovery::Reset).unwrap(), "\"reset\"");
        assert_eq!(
            serde_json::from_str::<IndexRecovery>("\"fail\"").unwrap(),
            IndexRecovery::Fail
        );
    }
}
