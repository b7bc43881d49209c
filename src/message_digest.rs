use std::{fmt::Display, str::FromStr};

use digest::Digest;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::CipherError;

/// The digest algorithms available to the key derivation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageDigest {
    #[default]
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

impl MessageDigest {
    /// Looks a digest up by its OpenSSL name (`"MD5"`, `"SHA1"`, `"SHA-256"`...)
    pub fn from_name(name: &str) -> Result<Self, CipherError> {
        let normalized = name.to_ascii_uppercase().replace('-', "");
        match normalized.as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA1" => Ok(Self::Sha1),
            "SHA224" => Ok(Self::Sha224),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(CipherError::UnknownDigest(name.to_string())),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha224 => "SHA224",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    /// Size in bytes of the digests produced by this algorithm
    #[must_use]
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Digest of the concatenation of `parts`, without building the
    /// concatenation in memory.
    #[must_use]
    pub fn digest_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            Self::Md5 => digest_parts::<Md5>(parts),
            Self::Sha1 => digest_parts::<Sha1>(parts),
            Self::Sha224 => digest_parts::<Sha224>(parts),
            Self::Sha256 => digest_parts::<Sha256>(parts),
            Self::Sha384 => digest_parts::<Sha384>(parts),
            Self::Sha512 => digest_parts::<Sha512>(parts),
        }
    }

    #[must_use]
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        self.digest_parts(&[data])
    }
}

impl FromStr for MessageDigest {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl Display for MessageDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
