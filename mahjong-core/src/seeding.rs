//! Session-level seeding for reproducible rooms.
//!
//! A server started with a session seed hands every new room a seed derived
//! as `SHA-256(session_seed || room_index_le)`, truncated to its first eight
//! bytes. Each room then shuffles its own walls from that seed (see
//! `mahjong_engine::state::wall`), so a whole session can be replayed from
//! one number.

use sha2::{Digest, Sha256};

/// Hands out one seed per room, in creation order.
///
/// ```
/// use mahjong_core::seeding::SessionRng;
///
/// let mut session = SessionRng::from_u64(7);
/// let first = session.next_room_seed();
/// let second = session.next_room_seed();
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone)]
pub struct SessionRng {
    seed: [u8; 32],
    room_index: u64,
}

impl SessionRng {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            seed,
            room_index: 0,
        }
    }

    /// Expands a numeric seed into the 32-byte session seed.
    pub fn from_u64(seed: u64) -> Self {
        Self::new(Sha256::digest(seed.to_le_bytes()).into())
    }

    /// Number of seeds handed out so far.
    pub fn room_index(&self) -> u64 {
        self.room_index
    }

    /// Seed for the next room; advances the counter.
    pub fn next_room_seed(&mut self) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.room_index.to_le_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        self.room_index += 1;

        let mut buf = [0u8; 8];
        buf.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(buf)
    }
}
