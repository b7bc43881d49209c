use itertools::iproduct;
use tracing::trace;

use crate::{
    cipher_spec::resolve,
    sizing::sizing_defaults,
    symmetric_crypto::{mode::ModeWrapper, Direction},
    CipherError,
};

const BASES: [&str; 9] = [
    "AES-128", "AES-192", "AES-256", "BF", "DES", "DES-EDE", "DES-EDE3", "RC2", "CAST5",
];

const SUFFIXES: [&str; 7] = ["", "-CBC", "-CFB", "-CFB1", "-CFB8", "-ECB", "-OFB"];

const OTHERS: [&str; 10] = [
    "AES128",
    "AES192",
    "AES256",
    "BLOWFISH",
    "RC2-40-CBC",
    "RC2-64-CBC",
    "RC4",
    "RC4-40",
    "CAST",
    "CAST-CBC",
];

/// Checks that `name` resolves and that its primitive and mode can be
/// built from zeroed key and IV of the default sizes.
fn try_build(name: &str) -> Result<(), CipherError> {
    let spec = resolve(name, None)?;
    let sizing = sizing_defaults(&spec);
    let key = vec![0_u8; sizing.key_len];
    let iv = vec![0_u8; sizing.iv_len.max(spec.family().block_size())];
    ModeWrapper::new(spec.family(), &key, spec.mode(), Direction::Encrypt, Some(iv.as_slice()))?;
    Ok(())
}

/// Names of the ciphers this crate can run, each in upper case followed by
/// its lower case form.
#[must_use]
pub fn supported_ciphers() -> Vec<String> {
    let candidates = iproduct!(BASES, SUFFIXES)
        .map(|(base, suffix)| format!("{base}{suffix}"))
        .chain(OTHERS.iter().map(ToString::to_string));
    let mut names = Vec::new();
    for name in candidates {
        match try_build(&name) {
            Ok(()) => {
                let lower = name.to_ascii_lowercase();
                names.push(name);
                names.push(lower);
            }
            Err(e) => trace!("{name} left out: {e}"),
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::Cipher;

    #[test]
    fn test_pairs() {
        let names = supported_ciphers();
        assert_eq!(0, names.len() % 2);
        for pair in names.chunks(2) {
            assert_eq!(pair[0].to_ascii_lowercase(), pair[1]);
            assert_eq!(pair[0].to_ascii_uppercase(), pair[0]);
        }
    }

    #[test]
    fn test_content() {
        let names = supported_ciphers();
        let set: HashSet<&str> = names.iter().map(String::as_str).collect();
        for name in [
            "AES-128", "AES-128-CBC", "aes-256-ofb", "BF", "bf-cfb8", "DES", "DES-EDE",
            "DES-EDE3", "des-ede3-cbc", "RC2-ECB", "CAST5-CFB", "BLOWFISH", "RC2-40-CBC",
            "rc2-64-cbc",
        ] {
            assert!(set.contains(name), "{name}");
        }
        for name in [
            "AES-128-CFB1", "bf-cfb1", "AES128", "RC4", "RC4-40", "CAST", "CAST-CBC",
        ] {
            assert!(!set.contains(name), "{name}");
        }
        // 9 bases by 6 usable suffixes, and 3 other names
        assert_eq!(2 * (9 * 6 + 3), names.len());
        assert_eq!(names.len(), set.len());
    }

    #[test]
    fn test_stable_order() {
        let names = supported_ciphers();
        assert_eq!(["AES-128", "aes-128", "AES-128-CBC", "aes-128-cbc"], names[..4]);
        assert_eq!(Some("rc2-64-cbc"), names.last().map(String::as_str));
        assert_eq!(names, supported_ciphers());
    }

    #[test]
    fn test_every_listed_cipher_runs() -> anyhow::Result<()> {
        for name in supported_ciphers() {
            let mut cipher = Cipher::new(&name)?;
            cipher.set_key(&vec![1_u8; cipher.key_len()])?;
            cipher.set_iv(&vec![2_u8; cipher.iv_len()])?;
            let mut cipher_text = cipher.update(b"enumerated")?;
            cipher_text.extend(cipher.finalize()?);
            cipher.decrypt();
            let mut plain_text = cipher.update(&cipher_text)?;
            plain_text.extend(cipher.finalize()?);
            assert_eq!(b"enumerated".to_vec(), plain_text, "{name}");
        }
        Ok(())
    }
}
