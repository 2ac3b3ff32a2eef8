//! # Persistence Format
//!
//! Versioned JSON envelope for persisted client state.
//!
//! Storage I/O goes through `StateStorage`; this module only defines the
//! byte format and the restore policy.
//!
//! Format: `{"version": <u32>, "state": <snapshot>}`
//!
//! ## Restore Policy
//!
//! `decode_state` is strict and returns typed errors. `restore_or_default`
//! is what the stores use on startup: any failure (missing key, oversize
//! payload, bad JSON, version mismatch, storage error) yields the empty
//! default and a warning.

use crate::primitives::{MAX_STATE_PAYLOAD_SIZE, STATE_FORMAT_VERSION};
use crate::storage::StateStorage;
use crate::DetectiveError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// =============================================================================
// ENVELOPE
// =============================================================================

/// Header fields read before the snapshot itself is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceHeader {
    pub version: u32,
}

impl PersistenceHeader {
    /// Header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: STATE_FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), DetectiveError> {
        if self.version != STATE_FORMAT_VERSION {
            return Err(DetectiveError::UnsupportedVersion {
                found: self.version,
                expected: STATE_FORMAT_VERSION,
            });
        }
        Ok(())
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    state: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    state: T,
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a snapshot into the versioned envelope.
pub fn encode_state<T: Serialize>(state: &T) -> Result<Vec<u8>, DetectiveError> {
    let envelope = EnvelopeRef {
        version: STATE_FORMAT_VERSION,
        state,
    };
    serde_json::to_vec(&envelope).map_err(|e| DetectiveError::SerializationError(e.to_string()))
}

/// Deserialize a snapshot from the versioned envelope.
///
/// Validates, in order:
/// 1. Payload size (before any parsing)
/// 2. Envelope version
/// 3. Snapshot shape
pub fn decode_state<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DetectiveError> {
    if bytes.len() > MAX_STATE_PAYLOAD_SIZE {
        return Err(DetectiveError::PayloadTooLarge {
            size: bytes.len(),
            max: MAX_STATE_PAYLOAD_SIZE,
        });
    }

    let header: PersistenceHeader = serde_json::from_slice(bytes).map_err(|e| {
        DetectiveError::DeserializationError(format!("Invalid state header: {}", e))
    })?;
    header.validate()?;

    let envelope: Envelope<T> = serde_json::from_slice(bytes).map_err(|e| {
        DetectiveError::DeserializationError(format!("Failed to decode state: {}", e))
    })?;
    Ok(envelope.state)
}

// =============================================================================
// STORAGE HELPERS
// =============================================================================

/// Encode `state` and write it under `key`.
pub fn persist_state<T: Serialize>(
    storage: &dyn StateStorage,
    key: &str,
    state: &T,
) -> Result<(), DetectiveError> {
    let bytes = encode_state(state)?;
    storage.save(key, &bytes)
}

/// Restore the snapshot stored under `key`, falling back to `T::default()`.
pub fn restore_or_default<T: DeserializeOwned + Default>(
    storage: &dyn StateStorage,
    key: &str,
) -> T {
    let bytes = match storage.load(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "state storage unreadable, starting empty");
            return T::default();
        }
    };

    match decode_state(&bytes) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable persisted state");
            T::default()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
