//! Resolution of OpenSSL style cipher names (`AES-128-CBC`, `DES-EDE3`,
//! `BF-OFB`...) into a [`CipherSpec`].
//!
//! A name has one to three `-` separated tokens:
//!
//! - `BASE`: ECB mode, no variant
//! - `BASE-MODE`
//! - `BASE-VARIANT-MODE`
//!
//! When the last token is not a mode it is read as the variant and the mode
//! defaults to CBC, so `AES-128` is AES with a 128-bit key in CBC mode.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    symmetric_crypto::{family::Family, mode::Mode, padding::Padding},
    CipherError,
};

/// A resolved cipher name. Immutable: use [`CipherSpec::with_padding`] to
/// derive a spec with another padding scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherSpec {
    family: Family,
    variant: Option<String>,
    mode: Mode,
    padding: Padding,
}

impl CipherSpec {
    #[must_use]
    pub fn new(family: Family, variant: Option<String>, mode: Mode, padding: Padding) -> Self {
        Self {
            family,
            variant,
            mode,
            padding,
        }
    }

    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    #[must_use]
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn padding(&self) -> Padding {
        self.padding
    }

    #[must_use]
    pub fn with_padding(&self, padding: Padding) -> Self {
        Self {
            padding,
            ..self.clone()
        }
    }

    /// Bytes consumed and produced per step: the primitive block for block
    /// modes, a single byte for the feedback modes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        if self.mode.is_block_mode() {
            self.family.block_size()
        } else {
            1
        }
    }

    /// `family/mode/padding`, e.g. `AES/CBC/PKCS5Padding`
    #[must_use]
    pub fn canonical_name(&self) -> String {
        format!(
            "{}/{}/{}",
            self.family.canonical_name(),
            self.mode.name(),
            self.padding.name()
        )
    }
}

impl Display for CipherSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

/// Resolve a cipher `name` and an optional padding hint (see
/// [`Padding::from_hint`]) into a [`CipherSpec`].
pub fn resolve(name: &str, padding_hint: Option<&str>) -> Result<CipherSpec, CipherError> {
    let unsupported = || CipherError::UnsupportedCipher(name.to_string());
    let tokens: Vec<&str> = name.split('-').collect();
    if tokens.iter().any(|token| token.is_empty()) {
        return Err(unsupported());
    }
    let (base, variant, candidate) = match tokens.as_slice() {
        [base] => (*base, None, Mode::Ecb.name()),
        [base, mode] => (*base, None, *mode),
        [base, variant, mode] => (*base, Some(*variant), *mode),
        _ => return Err(unsupported()),
    };
    let (variant, mode) = match Mode::from_token(candidate) {
        Some(mode) => (variant, mode),
        None => (Some(candidate), Mode::Cbc),
    };
    let family = Family::lookup(base, variant).map_err(|_| unsupported())?;
    Ok(CipherSpec::new(
        family,
        variant.map(str::to_string),
        mode,
        Padding::from_hint(padding_hint),
    ))
}
