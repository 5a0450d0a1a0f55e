//! Binary checkpoints of per-agent ODE state.
//!
//! Encoding is explicit rather than tied to the state types: each record
//! is a fixed sequence of little-endian primitives behind a magic and a
//! schema version byte. Bumping [`FORMAT_VERSION`] is the only way the
//! layout changes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod hash;
pub mod types;

pub use codec::{decode_checkpoint, decode_state, encode_checkpoint, encode_state};
pub use error::CheckpointError;
pub use hash::state_hash;
pub use types::CouplerCheckpoint;

/// Magic bytes at the start of every checkpoint.
pub const MAGIC: [u8; 4] = *b"MRPH";

/// Current checkpoint schema version.
pub const FORMAT_VERSION: u8 = 1;
