use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::{message_digest::MessageDigest, CipherError};

pub const SALT_LENGTH: usize = 8;
pub const DEFAULT_ITERATIONS: usize = 2048;

/// Parameters of the password based key and IV generation of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyIvGenParams {
    pub iterations: usize,
    pub digest: MessageDigest,
}

impl Default for KeyIvGenParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            digest: MessageDigest::default(),
        }
    }
}

/// Key and IV produced by [`bytes_to_key`]. Both are wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyAndIv {
    pub key: Vec<u8>,
    pub iv: Vec<u8>,
}

impl Drop for KeyAndIv {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl std::fmt::Debug for KeyAndIv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyAndIv")
            .field("key", &"[REDACTED]")
            .field("iv", &hex::encode(&self.iv))
            .finish()
    }
}

/// Derive a key of `key_len` bytes and an IV of `iv_len` bytes from a
/// password, the way OpenSSL `EVP_BytesToKey` does.
///
/// Digest blocks `Dᵢ = H^iterations(Dᵢ₋₁ || password || salt)` are
/// concatenated until `key_len + iv_len` bytes are available; the key is
/// taken first, the IV right after it.
///
/// - `digest`     : hash function `H`
/// - `salt`       : optional, exactly 8 bytes when present
/// - `password`   : password bytes
/// - `iterations` : number of times `H` is applied per block (0 acts as 1)
pub fn bytes_to_key(
    key_len: usize,
    iv_len: usize,
    digest: MessageDigest,
    salt: Option<&[u8]>,
    password: &[u8],
    iterations: usize,
) -> Result<KeyAndIv, CipherError> {
    if let Some(salt) = salt {
        if salt.len() != SALT_LENGTH {
            return Err(CipherError::InvalidSalt(salt.len()));
        }
    }
    let salt = salt.unwrap_or_default();
    let required = key_len + iv_len;
    let mut output = Zeroizing::new(Vec::with_capacity(required + digest.output_len()));
    let mut block = Zeroizing::new(Vec::<u8>::new());
    while output.len() < required {
        let mut next = Zeroizing::new(digest.digest_parts(&[block.as_slice(), password, salt]));
        for _ in 1..iterations {
            next = Zeroizing::new(digest.digest(&next));
        }
        output.extend_from_slice(&next);
        block = next;
    }
    Ok(KeyAndIv {
        key: output[..key_len].to_vec(),
        iv: output[key_len..required].to_vec(),
    })
}
