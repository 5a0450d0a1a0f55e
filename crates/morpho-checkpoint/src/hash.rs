//! FNV-1a hashing of per-agent state.
//!
//! Not cryptographic. Used to compare two runs for bit-identical state
//! without keeping both in memory.

use morpho_core::{AgentDynamicState, AgentId};

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash `(id, state)` pairs in iteration order.
///
/// Folds in the agent id followed by the bit patterns of all four state
/// components, so order, membership, and every bit of every value
/// matter. NaN payloads are hashed as-is. An empty population hashes to
/// the FNV offset basis.
pub fn state_hash<'a, I>(states: I) -> u64
where
    I: IntoIterator<Item = (AgentId, &'a AgentDynamicState)>,
{
    let mut hash = FNV_OFFSET;
    for (id, s) in states {
        hash = fnv1a_bytes(hash, &id.0.to_le_bytes());
        for v in [
            s.activator,
            s.target_area_signal,
            s.mirrored_area,
            s.internal_clock,
        ] {
            hash = fnv1a_bytes(hash, &v.to_bits().to_le_bytes());
        }
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(g: f64) -> AgentDynamicState {
        AgentDynamicState::new(g, 0.8, 0.866025, 0.0)
    }

    #[test]
    fn empty_is_offset_basis() {
        assert_eq!(state_hash(std::iter::empty()), FNV_OFFSET);
    }

    #[test]
    fn order_matters() {
        let a = state(0.1);
        let b = state(0.2);
        let h1 = state_hash([(AgentId(0), &a), (AgentId(1), &b)]);
        let h2 = state_hash([(AgentId(1), &b), (AgentId(0), &a)]);
        assert_ne!(h1, h2);
    }

    #[test]
    fn single_bit_changes_hash() {
        let a = state(0.5);
        let b = state(f64::from_bits(0.5f64.to_bits() + 1));
        assert_ne!(
            state_hash([(AgentId(0), &a)]),
            state_hash([(AgentId(0), &b)])
        );
    }

    #[test]
    fn id_matters() {
        let a = state(0.5);
        assert_ne!(
            state_hash([(AgentId(0), &a)]),
            state_hash([(AgentId(1), &a)])
        );
    }
}
