//! OpenSSL style cipher sessions.
//!
//! A [`Cipher`] is created from a name, given a direction, a key and an IV,
//! then fed with `update` calls and closed with `finalize`:
//!
//! ```
//! use cosmian_legacy_cipher::Cipher;
//!
//! let mut cipher = Cipher::new("BF-CBC").unwrap();
//! cipher.encrypt();
//! cipher.set_key(b"0123456789ABCDEF").unwrap();
//! cipher.set_iv(b"ABCDEFGH").unwrap();
//! let mut cipher_text = cipher.update(b"hello world").unwrap();
//! cipher_text.extend(cipher.finalize().unwrap());
//! assert_eq!(16, cipher_text.len());
//! ```

use tracing::debug;

use crate::{
    cipher_spec::{resolve, CipherSpec},
    kdf::{bytes_to_key, KeyIvGenParams},
    sizing::sizing_defaults,
    symmetric_crypto::{key::KeyMaterial, padding::Padding, Direction},
    transform::TransformState,
    CipherError,
};

/// A symmetric cipher session.
///
/// The primitive is built lazily by the first `update` or `finalize`
/// following a change of direction, key or IV, or eagerly by
/// [`Cipher::reset`].
pub struct Cipher {
    name: String,
    key_len: usize,
    iv_len: usize,
    direction: Direction,
    material: KeyMaterial,
    state: TransformState,
}

impl Cipher {
    /// Creates a session for the cipher `name` (e.g. `AES-256-CBC`), in
    /// encryption direction, with PKCS#5 padding and the default key and
    /// IV lengths of the cipher.
    pub fn new(name: &str) -> Result<Self, CipherError> {
        let spec = resolve(name, None)?;
        let sizing = sizing_defaults(&spec);
        Ok(Self {
            name: name.to_string(),
            key_len: sizing.key_len,
            iv_len: sizing.iv_len,
            direction: Direction::default(),
            material: KeyMaterial::default(),
            state: TransformState::new(spec),
        })
    }

    /// The name the session was created with
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical `family/mode/padding` name, e.g. `AES/CBC/PKCS5Padding`
    #[must_use]
    pub fn algorithm(&self) -> String {
        self.spec().canonical_name()
    }

    #[must_use]
    pub fn spec(&self) -> &CipherSpec {
        self.state.spec()
    }

    #[must_use]
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Overrides the key length; applies to the keys set afterwards.
    pub fn set_key_len(&mut self, key_len: usize) {
        self.key_len = key_len;
        self.state.invalidate();
    }

    #[must_use]
    pub fn iv_len(&self) -> usize {
        self.iv_len
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.spec().block_size()
    }

    pub fn encrypt(&mut self) -> &mut Self {
        self.set_direction(Direction::Encrypt);
        self
    }

    pub fn decrypt(&mut self) -> &mut Self {
        self.set_direction(Direction::Decrypt);
        self
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.state.invalidate();
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Stores `key`, which must be at least `key_len()` bytes long. Only
    /// its leading `key_len()` bytes are used.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError> {
        self.material.set_key(key, self.key_len)?;
        self.state.invalidate();
        Ok(())
    }

    /// Stores `iv`, which must be at least `iv_len()` bytes long. Only its
    /// leading block bytes are used.
    pub fn set_iv(&mut self, iv: &[u8]) -> Result<(), CipherError> {
        self.material.set_iv(iv, self.iv_len)?;
        self.state.invalidate();
        Ok(())
    }

    /// Builds the primitive from the stored direction, key and IV now,
    /// discarding any buffered data.
    pub fn reset(&mut self) -> Result<(), CipherError> {
        let key = self
            .material
            .key()
            .ok_or(CipherError::MissingKey)
            .map_err(CipherError::init)?;
        let key = key.get(..self.key_len).ok_or_else(|| {
            CipherError::init(CipherError::KeyTooShort {
                given: key.len(),
                expected: self.key_len,
            })
        })?;
        let iv = if self.spec().mode().requires_iv() {
            Some(
                self.material
                    .iv()
                    .ok_or(CipherError::MissingIv)
                    .map_err(CipherError::init)?,
            )
        } else {
            None
        };
        self.state.init(key, iv, self.direction)?;
        debug!(
            "{} initialized as {}: {:?}, key {} bytes, iv {} bytes, block {} bytes",
            self.name,
            self.spec(),
            self.direction,
            self.key_len,
            self.iv_len,
            self.block_size()
        );
        Ok(())
    }

    fn ensure_initialized(&mut self) -> Result<(), CipherError> {
        if self.state.is_initialized() {
            Ok(())
        } else {
            self.reset()
        }
    }

    /// Processes `data` and returns the output that is ready. Block modes
    /// retain partial blocks until more data or [`Cipher::finalize`].
    pub fn update(&mut self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        if data.is_empty() {
            return Err(CipherError::EmptyInput);
        }
        self.ensure_initialized()?;
        self.state.update(data)
    }

    /// Flushes the retained bytes, applying or checking the padding. The
    /// next `update` starts over from the stored key and IV.
    pub fn finalize(&mut self) -> Result<Vec<u8>, CipherError> {
        self.ensure_initialized()?;
        self.state.finalize()
    }

    /// Switches the padding scheme: `"0"` or `NoPadding` disable it,
    /// `ISO10126Padding` selects ISO 10126 and anything else PKCS#5.
    ///
    /// Lengths, key, IV and direction are kept; buffered data is dropped
    /// and the primitive is rebuilt.
    pub fn set_padding(&mut self, hint: &str) -> Result<(), CipherError> {
        let spec = self.spec().with_padding(Padding::from_hint(Some(hint)));
        self.state = TransformState::new(spec);
        if self.material.key().is_some() {
            self.reset()?;
        }
        Ok(())
    }

    /// Derives and installs the key and IV from `password`, the way
    /// `EVP_BytesToKey` does, then initializes the session.
    ///
    /// `salt`, when given, must be exactly 8 bytes.
    pub fn pkcs5_keyivgen(
        &mut self,
        password: &[u8],
        salt: Option<&[u8]>,
        params: &KeyIvGenParams,
    ) -> Result<(), CipherError> {
        let derived = bytes_to_key(
            self.key_len,
            self.iv_len,
            params.digest,
            salt,
            password,
            params.iterations,
        )?;
        self.material.set_key(&derived.key, self.key_len)?;
        self.material.set_iv(&derived.iv, self.iv_len)?;
        self.reset()
    }
}

impl Clone for Cipher {
    /// The copy has the same configuration and key material, and starts
    /// uninitialized.
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            key_len: self.key_len,
            iv_len: self.iv_len,
            direction: self.direction,
            material: self.material.clone(),
            state: TransformState::new(self.spec().clone()),
        }
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher")
            .field("name", &self.name)
            .field("key_len", &self.key_len)
            .field("iv_len", &self.iv_len)
            .field("direction", &self.direction)
            .field("material", &self.material)
            .field("state", &self.state)
            .finish()
    }
}
