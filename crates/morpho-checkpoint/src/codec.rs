//! Binary encode/decode of agent state and coupler checkpoints.
//!
//! All integers and floats are little-endian; floats are written as
//! their IEEE-754 bit patterns, so NaN and infinities survive a round
//! trip unchanged. Layout of a checkpoint:
//!
//! ```text
//! magic        [u8; 4]  b"MRPH"
//! version      u8
//! tick         u64
//! time         f64
//! step_size    f64
//! seed         u64
//! rng_word_pos u128
//! n_params     u32
//! params       f64 * n_params
//! n_agents     u32
//! agents       (id u32, state) * n_agents
//! ```
//!
//! A state record is `activator, target_area_signal, mirrored_area,
//! internal_clock`, four `f64`s.

use std::io::{self, Read, Write};

use morpho_core::{AgentDynamicState, AgentId, TickId};

use crate::error::CheckpointError;
use crate::types::CouplerCheckpoint;
use crate::{FORMAT_VERSION, MAGIC};

/// Upper bound on pre-allocation from an untrusted length prefix.
const MAX_PREALLOC: usize = 4096;

// ── Primitive writers ───────────────────────────────────────────

fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u128_le(w: &mut dyn Write, v: u128) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), CheckpointError> {
    write_u64_le(w, v.to_bits())
}

fn write_len(w: &mut dyn Write, len: usize, what: &str) -> Result<(), CheckpointError> {
    let len = u32::try_from(len).map_err(|_| CheckpointError::Malformed {
        detail: format!("{what} count {len} exceeds u32::MAX"),
    })?;
    write_u32_le(w, len)
}

// ── Primitive readers ───────────────────────────────────────────

fn read_u8(r: &mut dyn Read) -> Result<u8, CheckpointError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32_le(r: &mut dyn Read) -> Result<u32, CheckpointError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64_le(r: &mut dyn Read) -> Result<u64, CheckpointError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u128_le(r: &mut dyn Read) -> Result<u128, CheckpointError> {
    let mut buf = [0u8; 16];
    r.read_exact(&mut buf)?;
    Ok(u128::from_le_bytes(buf))
}

fn read_f64_le(r: &mut dyn Read) -> Result<f64, CheckpointError> {
    Ok(f64::from_bits(read_u64_le(r)?))
}

// ── State records ───────────────────────────────────────────────

/// Encode one agent's state as four little-endian `f64`s.
pub fn encode_state(w: &mut dyn Write, state: &AgentDynamicState) -> Result<(), CheckpointError> {
    write_f64_le(w, state.activator)?;
    write_f64_le(w, state.target_area_signal)?;
    write_f64_le(w, state.mirrored_area)?;
    write_f64_le(w, state.internal_clock)?;
    Ok(())
}

/// Decode one agent's state written by [`encode_state`].
pub fn decode_state(r: &mut dyn Read) -> Result<AgentDynamicState, CheckpointError> {
    let activator = read_f64_le(r)?;
    let target_area_signal = read_f64_le(r)?;
    let mirrored_area = read_f64_le(r)?;
    let internal_clock = read_f64_le(r)?;
    Ok(AgentDynamicState::new(
        activator,
        target_area_signal,
        mirrored_area,
        internal_clock,
    ))
}

// ── Checkpoints ──────────────────────────────────────────────────

/// Encode a full coupler checkpoint, header first.
pub fn encode_checkpoint(
    w: &mut dyn Write,
    checkpoint: &CouplerCheckpoint,
) -> Result<(), CheckpointError> {
    w.write_all(&MAGIC)?;
    w.write_all(&[FORMAT_VERSION])?;
    write_u64_le(w, checkpoint.tick.0)?;
    write_f64_le(w, checkpoint.time)?;
    write_f64_le(w, checkpoint.step_size)?;
    write_u64_le(w, checkpoint.seed)?;
    write_u128_le(w, checkpoint.rng_word_pos)?;

    write_len(w, checkpoint.parameters.len(), "parameter")?;
    for &p in &checkpoint.parameters {
        write_f64_le(w, p)?;
    }

    write_len(w, checkpoint.agents.len(), "agent")?;
    for (id, state) in &checkpoint.agents {
        write_u32_le(w, id.0)?;
        encode_state(w, state)?;
    }
    Ok(())
}

/// Decode a checkpoint written by [`encode_checkpoint`].
///
/// # Errors
///
/// [`CheckpointError::InvalidMagic`] or
/// [`CheckpointError::UnsupportedVersion`] for a bad header, and
/// [`CheckpointError::Malformed`] if the data ends early or lists the
/// same agent twice.
pub fn decode_checkpoint(r: &mut dyn Read) -> Result<CouplerCheckpoint, CheckpointError> {
    match decode_checkpoint_inner(r) {
        Err(CheckpointError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
            Err(CheckpointError::Malformed {
                detail: "unexpected end of data".to_string(),
            })
        }
        other => other,
    }
}

fn decode_checkpoint_inner(r: &mut dyn Read) -> Result<CouplerCheckpoint, CheckpointError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(CheckpointError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(CheckpointError::UnsupportedVersion { found: version });
    }

    let tick = TickId(read_u64_le(r)?);
    let time = read_f64_le(r)?;
    let step_size = read_f64_le(r)?;
    let seed = read_u64_le(r)?;
    let rng_word_pos = read_u128_le(r)?;

    let n_params = read_u32_le(r)? as usize;
    let mut parameters = Vec::with_capacity(n_params.min(MAX_PREALLOC));
    for _ in 0..n_params {
        parameters.push(read_f64_le(r)?);
    }

    let n_agents = read_u32_le(r)? as usize;
    let mut agents: Vec<(AgentId, AgentDynamicState)> =
        Vec::with_capacity(n_agents.min(MAX_PREALLOC));
    let mut seen = std::collections::HashSet::with_capacity(n_agents.min(MAX_PREALLOC));
    for _ in 0..n_agents {
        let id = AgentId(read_u32_le(r)?);
        if !seen.insert(id) {
            return Err(CheckpointError::Malformed {
                detail: format!("agent {id} appears twice"),
            });
        }
        agents.push((id, decode_state(r)?));
    }

    Ok(CouplerCheckpoint {
        tick,
        time,
        step_size,
        seed,
        rng_word_pos,
        parameters,
        agents,
    })
}

impl CouplerCheckpoint {
    /// Encode into a fresh byte buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        let mut buf = Vec::new();
        encode_checkpoint(&mut buf, self)?;
        Ok(buf)
    }

    /// Decode from a byte slice. Trailing bytes are rejected.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint = decode_checkpoint(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(CheckpointError::Malformed {
                detail: format!("{} trailing bytes", bytes.len()),
            });
        }
        Ok(checkpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CouplerCheckpoint {
        CouplerCheckpoint {
            tick: TickId(200),
            time: 2.0,
            step_size: 0.01,
            seed: 1,
            rng_word_pos: (1u128 << 70) + 12,
            parameters: vec![0.2],
            agents: vec![
                (AgentId(0), AgentDynamicState::new(0.31, 0.79, 0.866025, 2.0)),
                (AgentId(7), AgentDynamicState::new(f64::NAN, f64::NAN, f64::INFINITY, 2.0)),
            ],
        }
    }

    #[test]
    fn state_record_is_32_bytes() {
        let mut buf = Vec::new();
        encode_state(&mut buf, &AgentDynamicState::new(1.0, 0.8, 0.8, 0.0)).unwrap();
        assert_eq!(buf.len(), 32);
        assert_eq!(&buf[..8], &1.0f64.to_le_bytes());
    }

    #[test]
    fn checkpoint_preserves_non_finite_bits() {
        let cp = sample();
        let back = CouplerCheckpoint::from_bytes(&cp.to_bytes().unwrap()).unwrap();
        assert_eq!(back.tick, cp.tick);
        assert_eq!(back.rng_word_pos, cp.rng_word_pos);
        assert_eq!(back.parameters, cp.parameters);
        let (id, s) = &back.agents[1];
        assert_eq!(*id, AgentId(7));
        assert_eq!(s.activator.to_bits(), f64::NAN.to_bits());
        assert_eq!(s.mirrored_area, f64::INFINITY);
        assert_eq!(back.agents[0], cp.agents[0]);
    }

    #[test]
    fn header_layout() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"MRPH");
        assert_eq!(bytes[4], FORMAT_VERSION);
        assert_eq!(&bytes[5..13], &200u64.to_le_bytes());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            CouplerCheckpoint::from_bytes(&bytes),
            Err(CheckpointError::InvalidMagic)
        ));
    }

    #[test]
    fn rejects_future_version() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[4] = FORMAT_VERSION + 1;
        assert!(matches!(
            CouplerCheckpoint::from_bytes(&bytes),
            Err(CheckpointError::UnsupportedVersion { found }) if found == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn truncation_is_malformed() {
        let bytes = sample().to_bytes().unwrap();
        for cut in [0, 3, 5, 20, bytes.len() - 1] {
            assert!(
                matches!(
                    CouplerCheckpoint::from_bytes(&bytes[..cut]),
                    Err(CheckpointError::Malformed { .. })
                ),
                "cut at {cut}"
            );
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(
            CouplerCheckpoint::from_bytes(&bytes),
            Err(CheckpointError::Malformed { .. })
        ));
    }

    #[test]
    fn duplicate_agent_is_rejected() {
        let mut cp = sample();
        cp.agents[1].0 = AgentId(0);
        let bytes = cp.to_bytes().unwrap();
        assert!(matches!(
            CouplerCheckpoint::from_bytes(&bytes),
            Err(CheckpointError::Malformed { detail }) if detail.contains("agent 0")
        ));
    }
}
