//! # Formats
//!
//! Serialization formats for persisted client state.

pub mod persistence;

pub use persistence::{
    PersistenceHeader, decode_state, encode_state, persist_state, restore_or_default,
};
