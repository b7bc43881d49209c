use std::fmt::Display;

use aes::{Aes128, Aes192, Aes256};
use blowfish::Blowfish;
use cast5::Cast5;
use cast6::Cast6;
use cipher::{InvalidLength, KeyInit};
use des::{Des, TdesEde2, TdesEde3};
use rc2::Rc2;
use serde::{Deserialize, Serialize};

use crate::{
    symmetric_crypto::{
        mode::{chain, Mode},
        BlockChain, Direction,
    },
    CipherError,
};

/// Block cipher families that can be named in a cipher string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    Aes,
    Des,
    TripleDes,
    Blowfish,
    Rc2,
    Cast5,
    Cast6,
}

/// Static properties of a family.
#[derive(Debug, Clone, Copy)]
pub struct FamilyDescriptor {
    /// lower case names accepted as the first token of a cipher string
    pub aliases: &'static [&'static str],
    pub canonical_name: &'static str,
    pub block_size: usize,
    /// whether the key size is customarily encoded in the name (`AES-256`)
    pub length_bearing: bool,
}

static AES: FamilyDescriptor = FamilyDescriptor {
    aliases: &["aes"],
    canonical_name: "AES",
    block_size: 16,
    length_bearing: true,
};

static DES: FamilyDescriptor = FamilyDescriptor {
    aliases: &["des"],
    canonical_name: "DES",
    block_size: 8,
    length_bearing: false,
};

// only reachable through `DES` + `EDE3`
static TRIPLE_DES: FamilyDescriptor = FamilyDescriptor {
    aliases: &[],
    canonical_name: "DESede",
    block_size: 8,
    length_bearing: false,
};

static BLOWFISH: FamilyDescriptor = FamilyDescriptor {
    aliases: &["bf", "blowfish"],
    canonical_name: "Blowfish",
    block_size: 8,
    length_bearing: false,
};

static RC2: FamilyDescriptor = FamilyDescriptor {
    aliases: &["rc2"],
    canonical_name: "RC2",
    block_size: 8,
    length_bearing: true,
};

static CAST5: FamilyDescriptor = FamilyDescriptor {
    aliases: &["cast5"],
    canonical_name: "CAST5",
    block_size: 8,
    length_bearing: false,
};

static CAST6: FamilyDescriptor = FamilyDescriptor {
    aliases: &["cast6"],
    canonical_name: "CAST6",
    block_size: 16,
    length_bearing: false,
};

pub const TRIPLE_DES_VARIANT: &str = "EDE3";

impl Family {
    pub const ALL: [Family; 7] = [
        Family::Aes,
        Family::Des,
        Family::TripleDes,
        Family::Blowfish,
        Family::Rc2,
        Family::Cast5,
        Family::Cast6,
    ];

    /// Resolve the family named by the first token of a cipher string.
    /// `DES` with the `EDE3` variant selects triple DES.
    pub fn lookup(base: &str, variant: Option<&str>) -> Result<Self, CipherError> {
        let base = base.to_ascii_lowercase();
        let family = Self::ALL
            .into_iter()
            .find(|f| f.descriptor().aliases.contains(&base.as_str()))
            .ok_or_else(|| CipherError::UnsupportedCipher(base.clone()))?;
        match (family, variant) {
            (Family::Des, Some(v)) if v.eq_ignore_ascii_case(TRIPLE_DES_VARIANT) => {
                Ok(Family::TripleDes)
            }
            _ => Ok(family),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &'static FamilyDescriptor {
        match self {
            Family::Aes => &AES,
            Family::Des => &DES,
            Family::TripleDes => &TRIPLE_DES,
            Family::Blowfish => &BLOWFISH,
            Family::Rc2 => &RC2,
            Family::Cast5 => &CAST5,
            Family::Cast6 => &CAST6,
        }
    }

    #[must_use]
    pub fn canonical_name(&self) -> &'static str {
        self.descriptor().canonical_name
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.descriptor().block_size
    }

    #[must_use]
    pub fn is_length_bearing(&self) -> bool {
        self.descriptor().length_bearing
    }

    #[must_use]
    pub fn is_des(&self) -> bool {
        matches!(self, Family::Des | Family::TripleDes)
    }

    /// Key the block cipher of this family with `key` and chain it in
    /// `mode` for `direction`, seeded with `iv` when the mode takes one.
    ///
    /// DES keeps the first 8 bytes of longer keys; triple DES accepts two
    /// (16 bytes) or three (24 bytes) keys; the other families take the key
    /// as is and reject the lengths they do not support.
    pub fn build(
        &self,
        key: &[u8],
        mode: Mode,
        direction: Direction,
        iv: Option<&[u8]>,
    ) -> Result<Box<dyn BlockChain>, CipherError> {
        let invalid = |_: InvalidLength| CipherError::InvalidKeyLength {
            algorithm: self.canonical_name(),
            given: key.len(),
        };
        match self {
            Family::Aes => match key.len() {
                16 => chain(Aes128::new_from_slice(key).map_err(invalid)?, mode, direction, iv),
                24 => chain(Aes192::new_from_slice(key).map_err(invalid)?, mode, direction, iv),
                32 => chain(Aes256::new_from_slice(key).map_err(invalid)?, mode, direction, iv),
                _ => Err(invalid(InvalidLength)),
            },
            Family::Des => {
                let key = key.get(..8).ok_or(InvalidLength).map_err(invalid)?;
                chain(Des::new_from_slice(key).map_err(invalid)?, mode, direction, iv)
            }
            Family::TripleDes => match key.len() {
                16 => chain(TdesEde2::new_from_slice(key).map_err(invalid)?, mode, direction, iv),
                24 => chain(TdesEde3::new_from_slice(key).map_err(invalid)?, mode, direction, iv),
                _ => Err(invalid(InvalidLength)),
            },
            Family::Blowfish => {
                let cipher: Blowfish = Blowfish::new_from_slice(key).map_err(invalid)?;
                chain(cipher, mode, direction, iv)
            }
            Family::Rc2 => {
                if key.is_empty() || key.len() > 128 {
                    return Err(invalid(InvalidLength));
                }
                // effective key bits follow the key length
                let cipher = Rc2::new_with_eff_key_len(key, key.len() * 8);
                chain(cipher, mode, direction, iv)
            }
            Family::Cast5 => {
                chain(Cast5::new_from_slice(key).map_err(invalid)?, mode, direction, iv)
            }
            Family::Cast6 => {
                chain(Cast6::new_from_slice(key).map_err(invalid)?, mode, direction, iv)
            }
        }
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() -> anyhow::Result<()> {
        assert_eq!(Family::Aes, Family::lookup("aes", None)?);
        assert_eq!(Family::Aes, Family::lookup("AeS", Some("128"))?);
        assert_eq!(Family::Blowfish, Family::lookup("BF", None)?);
        assert_eq!(Family::Blowfish, Family::lookup("blowfish", None)?);
        assert_eq!(Family::Des, Family::lookup("DES", Some("EDE"))?);
        assert_eq!(Family::TripleDes, Family::lookup("des", Some("ede3"))?);
        assert_eq!(Family::Cast6, Family::lookup("CAST6", None)?);
        for name in ["rc4", "aes128", "cast", "desede", ""] {
            assert!(matches!(
                Family::lookup(name, None),
                Err(CipherError::UnsupportedCipher(_))
            ));
        }
        Ok(())
    }

    #[test]
    fn test_descriptors() {
        let expected = [
            ("AES", 16),
            ("DES", 8),
            ("DESede", 8),
            ("Blowfish", 8),
            ("RC2", 8),
            ("CAST5", 8),
            ("CAST6", 16),
        ];
        for (family, (name, block_size)) in Family::ALL.into_iter().zip(expected) {
            assert_eq!(name, family.canonical_name());
            assert_eq!(block_size, family.block_size(), "{family}");
        }
        assert!(Family::Aes.is_length_bearing());
        assert!(!Family::Cast6.is_length_bearing());
    }

    #[test]
    fn test_build_round_trips_one_block() -> anyhow::Result<()> {
        let cases: [(Family, usize); 10] = [
            (Family::Aes, 16),
            (Family::Aes, 24),
            (Family::Aes, 32),
            (Family::Des, 8),
            (Family::TripleDes, 16),
            (Family::TripleDes, 24),
            (Family::Blowfish, 16),
            (Family::Rc2, 5),
            (Family::Cast5, 16),
            (Family::Cast6, 16),
        ];
        for (family, key_len) in cases {
            let key = vec![0x42; key_len];
            let plain = vec![0x17; family.block_size()];
            let mut block = plain.clone();
            family
                .build(&key, Mode::Ecb, Direction::Encrypt, None)?
                .process(&mut block);
            assert_ne!(plain, block, "{family}");
            family
                .build(&key, Mode::Ecb, Direction::Decrypt, None)?
                .process(&mut block);
            assert_eq!(plain, block, "{family}");
        }
        Ok(())
    }

    #[test]
    fn test_build_rejects_key_lengths() {
        for (family, key_len) in [
            (Family::Aes, 20),
            (Family::Des, 7),
            (Family::TripleDes, 8),
            (Family::Blowfish, 2),
            (Family::Rc2, 0),
            (Family::Rc2, 129),
            (Family::Cast5, 32),
        ] {
            assert!(matches!(
                family.build(&vec![0_u8; key_len], Mode::Ecb, Direction::Encrypt, None),
                Err(CipherError::InvalidKeyLength { given, .. }) if given == key_len
            ));
        }
    }

    #[test]
    fn test_des_keeps_first_eight_bytes() -> anyhow::Result<()> {
        let mut short = [0x55_u8; 8];
        let mut long = short;
        Family::Des
            .build(&[1_u8; 8], Mode::Ecb, Direction::Encrypt, None)?
            .process(&mut short);
        let mut key = vec![1_u8; 8];
        key.extend_from_slice(&[9_u8; 8]);
        Family::Des
            .build(&key, Mode::Ecb, Direction::Encrypt, None)?
            .process(&mut long);
        assert_eq!(short, long);
        Ok(())
    }
}
