//! The init → update* → final state machine of a cipher session.

use rand::SeedableRng;
use rand_hc::Hc128Rng;
use tracing::{trace, warn};
use zeroize::Zeroize;

use crate::{
    cipher_spec::CipherSpec,
    symmetric_crypto::{
        mode::ModeWrapper,
        padding::Padding,
        Direction,
    },
    CipherError,
};

/// Live transform of a session: the mode wrapped primitive once
/// initialized, and the bytes waiting for a complete block.
///
/// A state belongs to one [`CipherSpec`]; changing it means building a new
/// state.
pub struct TransformState {
    spec: CipherSpec,
    wrapper: Option<ModeWrapper>,
    buffer: Vec<u8>,
    rng: Hc128Rng,
}

impl TransformState {
    /// A new, uninitialized state
    #[must_use]
    pub fn new(spec: CipherSpec) -> Self {
        Self {
            spec,
            wrapper: None,
            buffer: Vec::new(),
            rng: Hc128Rng::from_entropy(),
        }
    }

    #[must_use]
    pub fn spec(&self) -> &CipherSpec {
        &self.spec
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.wrapper.is_some()
    }

    /// Direction of the initialized transform
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.wrapper.as_ref().map(ModeWrapper::direction)
    }

    /// Drops the primitive and any buffered bytes: the next operation has
    /// to initialize again.
    pub fn invalidate(&mut self) {
        self.wrapper = None;
        self.buffer.zeroize();
    }

    /// Builds the chained primitive from `key` and `iv`. Any failure
    /// is reported as [`CipherError::CipherInit`] and leaves the state
    /// uninitialized.
    pub fn init(
        &mut self,
        key: &[u8],
        iv: Option<&[u8]>,
        direction: Direction,
    ) -> Result<(), CipherError> {
        self.invalidate();
        let iv = if self.spec.mode().requires_iv() {
            iv
        } else {
            None
        };
        let wrapper = ModeWrapper::new(self.spec.family(), key, self.spec.mode(), direction, iv)
            .map_err(CipherError::init)?;
        self.wrapper = Some(wrapper);
        Ok(())
    }

    /// Feeds `chunk` through the transform and returns the bytes that
    /// became available. The trailing partial unit (a block, or a byte in
    /// the feedback modes) is kept, and when decrypting with padding also
    /// the last complete unit, until more data or the finalization arrives.
    pub fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, CipherError> {
        let wrapper = self.wrapper.as_mut().ok_or(CipherError::NotInitialized)?;
        self.buffer.extend_from_slice(chunk);
        let unit = wrapper.unit_size();
        let mut ready = self.buffer.len() - self.buffer.len() % unit;
        let holds_last_unit =
            wrapper.direction() == Direction::Decrypt && self.spec.padding() != Padding::None;
        if holds_last_unit && ready == self.buffer.len() && ready > 0 {
            ready -= unit;
        }
        let mut pending: Vec<u8> = self.buffer.drain(..ready).collect();
        let output = wrapper.process(&pending);
        pending.zeroize();
        trace!(
            "{}: {} bytes in, {} bytes out, {} bytes buffered",
            self.spec,
            chunk.len(),
            output.len(),
            self.buffer.len()
        );
        Ok(output)
    }

    /// Flushes the buffered bytes: pads the last unit when encrypting,
    /// checks and strips the padding when decrypting. The state is
    /// uninitialized afterwards, whatever the outcome.
    pub fn finalize(&mut self) -> Result<Vec<u8>, CipherError> {
        let result = self.finish();
        self.invalidate();
        result
    }

    fn finish(&mut self) -> Result<Vec<u8>, CipherError> {
        let wrapper = self.wrapper.as_mut().ok_or(CipherError::NotInitialized)?;
        let unit = wrapper.unit_size();
        let padding = self.spec.padding();
        if padding == Padding::None {
            if !self.buffer.is_empty() {
                return Err(CipherError::NotBlockAligned {
                    len: self.buffer.len(),
                    block_size: unit,
                });
            }
            return Ok(Vec::new());
        }
        match wrapper.direction() {
            Direction::Encrypt => {
                let mut block = padding.pad(&self.buffer, unit, &mut self.rng);
                let output = wrapper.process(&block);
                block.zeroize();
                Ok(output)
            }
            Direction::Decrypt => {
                if self.buffer.len() != unit {
                    warn!(
                        "{}: {} bytes left to decrypt, expected {}",
                        self.spec,
                        self.buffer.len(),
                        unit
                    );
                    return Err(CipherError::Padding);
                }
                let block = wrapper.process(&self.buffer);
                padding.unpad(block).map_err(|e| {
                    warn!("{}: bad decrypt", self.spec);
                    e
                })
            }
        }
    }
}

impl Drop for TransformState {
    fn drop(&mut self) {
        self.buffer.zeroize();
    }
}

impl std::fmt::Debug for TransformState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformState")
            .field("spec", &self.spec.canonical_name())
            .field("initialized", &self.is_initialized())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher_spec::resolve;

    const KEY: &[u8] = b"0123456789ABCDEF";
    const IV: &[u8] = b"ABCDEFGHIJKLMNOP";

    fn state(name: &str, direction: Direction) -> anyhow::Result<TransformState> {
        let mut state = TransformState::new(resolve(name, None)?);
        state.init(KEY, Some(IV), direction)?;
        Ok(state)
    }

    #[test]
    fn test_lifecycle() -> anyhow::Result<()> {
        let mut state = TransformState::new(resolve("AES-128-CBC", None)?);
        assert!(!state.is_initialized());
        assert!(matches!(
            state.update(b"data"),
            Err(CipherError::NotInitialized)
        ));
        state.init(KEY, Some(IV), Direction::Encrypt)?;
        assert!(state.is_initialized());
        assert_eq!(Some(Direction::Encrypt), state.direction());
        state.finalize()?;
        assert!(!state.is_initialized());
        Ok(())
    }

    #[test]
    fn test_buffering_encrypt() -> anyhow::Result<()> {
        let mut state = state("AES-128-CBC", Direction::Encrypt)?;
        assert!(state.update(&[1_u8; 10])?.is_empty());
        assert_eq!(16, state.update(&[1_u8; 10])?.len());
        assert_eq!(32, state.update(&[1_u8; 28])?.len());
        // aligned input still gets a full block of padding
        assert_eq!(16, state.finalize()?.len());
        Ok(())
    }

    #[test]
    fn test_decrypt_holds_last_block() -> anyhow::Result<()> {
        let mut enc = state("AES-128-CBC", Direction::Encrypt)?;
        let mut cipher_text = enc.update(&[7_u8; 32])?;
        cipher_text.extend(enc.finalize()?);
        assert_eq!(48, cipher_text.len());

        let mut dec = state("AES-128-CBC", Direction::Decrypt)?;
        assert!(dec.update(&cipher_text[..16])?.is_empty());
        assert_eq!(vec![7_u8; 32], dec.update(&cipher_text[16..])?);
        // the held back block was all padding
        assert!(dec.finalize()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_no_padding_alignment() -> anyhow::Result<()> {
        let mut state = TransformState::new(resolve("AES-128-ECB", Some("0"))?);
        state.init(KEY, None, Direction::Encrypt)?;
        assert_eq!(16, state.update(&[0_u8; 20])?.len());
        assert!(matches!(
            state.finalize(),
            Err(CipherError::NotBlockAligned {
                len: 4,
                block_size: 16
            })
        ));
        assert!(!state.is_initialized());
        Ok(())
    }

    #[test]
    fn test_truncated_cipher_text() -> anyhow::Result<()> {
        let mut dec = state("AES-128-CBC", Direction::Decrypt)?;
        dec.update(&[0_u8; 20])?;
        assert!(matches!(dec.finalize(), Err(CipherError::Padding)));
        let mut dec = state("AES-128-CBC", Direction::Decrypt)?;
        assert!(matches!(dec.finalize(), Err(CipherError::Padding)));
        Ok(())
    }

    #[test]
    fn test_feedback_mode_pads_one_byte() -> anyhow::Result<()> {
        let mut enc = state("AES-128-CFB8", Direction::Encrypt)?;
        let mut cipher_text = enc.update(b"abc")?;
        assert_eq!(3, cipher_text.len());
        cipher_text.extend(enc.finalize()?);
        assert_eq!(4, cipher_text.len());

        let mut dec = state("AES-128-CFB8", Direction::Decrypt)?;
        // the last byte may be padding
        assert_eq!(b"abc".to_vec(), dec.update(&cipher_text)?);
        assert!(dec.finalize()?.is_empty());

        let mut dec = state("AES-128-CFB8", Direction::Decrypt)?;
        let last = cipher_text.len() - 1;
        cipher_text[last] ^= 0x01;
        dec.update(&cipher_text)?;
        assert!(matches!(dec.finalize(), Err(CipherError::Padding)));
        Ok(())
    }

    #[test]
    fn test_feedback_mode_without_padding() -> anyhow::Result<()> {
        for name in ["AES-128-CFB", "AES-128-OFB"] {
            let mut state = TransformState::new(resolve(name, Some("NoPadding"))?);
            state.init(KEY, Some(IV), Direction::Decrypt)?;
            assert_eq!(3, state.update(b"abc")?.len());
            assert!(state.finalize()?.is_empty());
        }
        Ok(())
    }

    #[test]
    fn test_init_failures() -> anyhow::Result<()> {
        let mut state = TransformState::new(resolve("AES-128-CBC", None)?);
        assert!(matches!(
            state.init(&KEY[..10], Some(IV), Direction::Encrypt),
            Err(CipherError::CipherInit(cause)) if matches!(*cause, CipherError::InvalidKeyLength { .. })
        ));
        assert!(matches!(
            state.init(KEY, None, Direction::Encrypt),
            Err(CipherError::CipherInit(cause)) if matches!(*cause, CipherError::MissingIv)
        ));
        let mut cfb1 = TransformState::new(resolve("AES-128-CFB1", None)?);
        assert!(matches!(
            cfb1.init(KEY, Some(IV), Direction::Encrypt),
            Err(CipherError::CipherInit(cause)) if matches!(*cause, CipherError::UnsupportedFeedback(_))
        ));
        assert!(!cfb1.is_initialized());
        Ok(())
    }
}
