use std::fmt::Display;

use zeroize::Zeroize;

use crate::CipherError;

/// Secret bytes, wiped on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}

/// Initialization vector; public, printed as hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iv(Vec<u8>);

impl Iv {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Iv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Key and IV of a session.
///
/// A value is only stored when it is at least as long as required; longer
/// values are accepted as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMaterial {
    key: Option<SecretBytes>,
    iv: Option<Iv>,
}

impl KeyMaterial {
    pub fn set_key(&mut self, key: &[u8], required: usize) -> Result<(), CipherError> {
        if key.len() < required {
            return Err(CipherError::KeyTooShort {
                given: key.len(),
                expected: required,
            });
        }
        self.key = Some(SecretBytes::from(key));
        Ok(())
    }

    pub fn set_iv(&mut self, iv: &[u8], required: usize) -> Result<(), CipherError> {
        if iv.len() < required {
            return Err(CipherError::IvTooShort {
                given: iv.len(),
                expected: required,
            });
        }
        self.iv = Some(Iv(iv.to_vec()));
        Ok(())
    }

    #[must_use]
    pub fn key(&self) -> Option<&[u8]> {
        self.key.as_ref().map(SecretBytes::as_bytes)
    }

    #[must_use]
    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_ref().map(Iv::as_bytes)
    }
}
