use std::fmt::Display;

use cipher::block_padding::{Iso10126, Pkcs7, RawPadding};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::CipherError;

/// Padding schemes applied to the last block, or the last byte of the
/// feedback modes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Padding {
    /// `n` bytes of value `n`
    #[default]
    Pkcs5,
    /// `n - 1` random bytes followed by `n`
    Iso10126,
    None,
}

impl Padding {
    /// Selects a padding scheme from an optional textual hint.
    ///
    /// `"0"` and `NoPadding` disable padding, `ISO10126Padding` selects
    /// ISO 10126; anything else, including no hint, selects PKCS#5.
    #[must_use]
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint {
            Some(h) if h == "0" || h.eq_ignore_ascii_case("NoPadding") => Padding::None,
            Some(h) if h.eq_ignore_ascii_case("ISO10126Padding") => Padding::Iso10126,
            _ => Padding::Pkcs5,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Padding::Pkcs5 => "PKCS5Padding",
            Padding::Iso10126 => "ISO10126Padding",
            Padding::None => "NoPadding",
        }
    }

    /// Extends `remainder`, shorter than `block_size`, to a full block.
    /// A full block of padding is produced for an empty remainder.
    pub fn pad<R: RngCore + CryptoRng>(
        &self,
        remainder: &[u8],
        block_size: usize,
        rng: &mut R,
    ) -> Vec<u8> {
        debug_assert!(remainder.len() < block_size);
        let mut block = remainder.to_vec();
        if *self == Padding::None {
            return block;
        }
        block.resize(block_size, 0);
        match self {
            Padding::Pkcs5 => Pkcs7::raw_pad(&mut block, remainder.len()),
            Padding::Iso10126 => {
                Iso10126::raw_pad(&mut block, remainder.len());
                // the filler is random, only the count byte is fixed
                rng.fill_bytes(&mut block[remainder.len()..block_size - 1]);
            }
            Padding::None => {}
        }
        block
    }

    /// Checks and strips the padding of the last decrypted `block`. A
    /// malformed padding always gives [`CipherError::Padding`].
    pub fn unpad(&self, mut block: Vec<u8>) -> Result<Vec<u8>, CipherError> {
        if *self == Padding::None {
            return Ok(block);
        }
        if block.is_empty() {
            return Err(CipherError::Padding);
        }
        let kept = match self {
            Padding::Iso10126 => Iso10126::raw_unpad(&block),
            _ => Pkcs7::raw_unpad(&block),
        }
        .map_err(|_| CipherError::Padding)?
        .len();
        block.truncate(kept);
        Ok(block)
    }
}

impl Display for Padding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
