//! Room-code generation.

use rand::Rng;
use wordmeld_protocol::RoomCode;

/// Length of generated codes. Short enough to read out loud, long enough
/// that collisions among live rooms stay rare (36^6 ≈ 2 billion).
pub(crate) const CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws one random code. The caller is responsible for checking it
/// against live rooms — uniqueness is the registry's contract, not ours.
pub(crate) fn random_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let raw: String = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    RoomCode::parse(&raw).expect("generated codes are valid")
}
