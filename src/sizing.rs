use crate::{
    cipher_spec::CipherSpec,
    symmetric_crypto::family::{Family, TRIPLE_DES_VARIANT},
};

pub const DEFAULT_KEY_LENGTH: usize = 16;
pub const DES_KEY_LENGTH: usize = 8;
pub const TRIPLE_DES_KEY_LENGTH: usize = 24;
pub const DES_IV_LENGTH: usize = 8;
pub const AES_IV_LENGTH: usize = 16;
pub const DEFAULT_IV_LENGTH: usize = 8;

/// Key and IV lengths, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizing {
    pub key_len: usize,
    pub iv_len: usize,
}

/// Default key and IV lengths of a resolved cipher.
///
/// Families whose key size is part of the name (`AES-256`, `RC2-40`) take
/// it from a numeric variant. Otherwise DES uses 8 byte keys (24 for
/// `EDE3`) and 8 byte IVs, and the other families 16 byte keys. IVs are 16
/// bytes for AES and 8 bytes for everything else.
#[must_use]
pub fn sizing_defaults(spec: &CipherSpec) -> Sizing {
    let family = spec.family();
    let mut key_len = spec
        .variant()
        .filter(|_| family.is_length_bearing())
        .and_then(|variant| variant.parse::<usize>().ok())
        .map(|bits| bits / 8);
    let mut iv_len = None;
    if key_len.is_none() {
        if family.is_des() {
            iv_len = Some(DES_IV_LENGTH);
            let ede3 = spec
                .variant()
                .map_or(false, |v| v.eq_ignore_ascii_case(TRIPLE_DES_VARIANT));
            key_len = Some(if ede3 {
                TRIPLE_DES_KEY_LENGTH
            } else {
                DES_KEY_LENGTH
            });
        } else {
            key_len = Some(DEFAULT_KEY_LENGTH);
        }
    }
    let iv_len = iv_len.unwrap_or(if family == Family::Aes {
        AES_IV_LENGTH
    } else {
        DEFAULT_IV_LENGTH
    });
    Sizing {
        key_len: key_len.unwrap_or(DEFAULT_KEY_LENGTH),
        iv_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher_spec::resolve;

    fn sizing(name: &str) -> anyhow::Result<(usize, usize)> {
        let s = sizing_defaults(&resolve(name, None)?);
        Ok((s.key_len, s.iv_len))
    }

    #[test]
    fn test_aes() -> anyhow::Result<()> {
        assert_eq!((16, 16), sizing("AES-128-CBC")?);
        assert_eq!((24, 16), sizing("AES-192-OFB")?);
        assert_eq!((32, 16), sizing("AES-256-ECB")?);
        assert_eq!((32, 16), sizing("AES-256")?);
        assert_eq!((16, 16), sizing("AES-CBC")?);
        assert_eq!((16, 16), sizing("AES")?);
        Ok(())
    }

    #[test]
    fn test_des() -> anyhow::Result<()> {
        assert_eq!((24, 8), sizing("DES-EDE3-CBC")?);
        assert_eq!((24, 8), sizing("DES-EDE3")?);
        assert_eq!((8, 8), sizing("DES-CBC")?);
        assert_eq!((8, 8), sizing("DES-EDE-CFB")?);
        assert_eq!((8, 8), sizing("DES")?);
        Ok(())
    }

    #[test]
    fn test_other_families() -> anyhow::Result<()> {
        assert_eq!((5, 8), sizing("RC2-40-CBC")?);
        assert_eq!((8, 8), sizing("RC2-64-CBC")?);
        assert_eq!((16, 8), sizing("RC2")?);
        assert_eq!((16, 8), sizing("BF-CBC")?);
        assert_eq!((16, 8), sizing("CAST5-OFB")?);
        assert_eq!((16, 8), sizing("CAST6-ECB")?);
        // variants do not size families whose names carry no key size
        assert_eq!((16, 8), sizing("BF-448-CBC")?);
        // a non numeric variant falls back to the family default
        assert_eq!((16, 16), sizing("AES-XTS")?);
        Ok(())
    }
}
