use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Salted SHA-256, stored as `salt$digest` in base64.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", STANDARD.encode(salt), STANDARD.encode(digest(&salt, password)))
}

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
pub(crate) use tests::verify_password;

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn verify_password(stored: &str, password: &str) -> bool {
        let Some((salt, expected)) = stored.split_once('$') else {
            return false;
        };
        match STANDARD.decode(salt) {
            Ok(salt) => STANDARD.encode(digest(&salt, password)) == expected,
            Err(_) => false,
        }
    }

    #[test]
    fn test_hash_verifies_and_is_salted() {
        let a = hash_password("seashells");
        let b = hash_password("seashells");
        assert_ne!(a, b);
        assert!(verify_password(&a, "seashells"));
        assert!(!verify_password(&a, "seashell"));
        assert!(!verify_password("garbage", "seashells"));
    }
}
