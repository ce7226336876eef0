//! Content-derived playlist IDs
//!
//! A playlist ID is the SHA-256 of the request's identifying fields, so
//! every delivery of one logical request maps to the same record. The nonce
//! (a per-submission request ID or a caller-supplied idempotency key) keeps
//! two identical submissions apart.

use dj_core::{PlaylistId, UserId};
use sha2::{Digest, Sha256};

/// Hex characters kept from the digest
const ID_LENGTH: usize = 32;

fn update_field(hasher: &mut Sha256, field: &[u8]) {
    // Length prefix keeps ("ab", "c") and ("a", "bc") distinct
    hasher.update((field.len() as u64).to_be_bytes());
    hasher.update(field);
}

/// Derive the playlist ID for a request
pub fn derive_playlist_id(user_id: &UserId, prompt: &str, count: u32, nonce: &str) -> PlaylistId {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, user_id.as_str().as_bytes());
    update_field(&mut hasher, prompt.as_bytes());
    update_field(&mut hasher, &count.to_be_bytes());
    update_field(&mut hasher, nonce.as_bytes());

    let hex = format!("{:x}", hasher.finalize());
    PlaylistId::new(&hex[..ID_LENGTH])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_for_same_input() {
        let user = UserId::new("u1");
        let a = derive_playlist_id(&user, "rock", 5, "n1");
        let b = derive_playlist_id(&user, "rock", 5, "n1");

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn nonce_separates_submissions() {
        let user = UserId::new("u1");
        assert_ne!(
            derive_playlist_id(&user, "rock", 5, "n1"),
            derive_playlist_id(&user, "rock", 5, "n2")
        );
    }

    #[test]
    fn fields_do_not_bleed_into_each_other() {
        assert_ne!(
            derive_playlist_id(&UserId::new("ab"), "c", 5, ""),
            derive_playlist_id(&UserId::new("a"), "bc", 5, "")
        );
    }

    #[test]
    fn count_is_part_of_the_key() {
        let user = UserId::new("u1");
        assert_ne!(
            derive_playlist_id(&user, "rock", 5, ""),
            derive_playlist_id(&user, "rock", 6, "")
        );
    }
}
