use std::fmt::Display;

use cipher::{
    crypto_common::InnerInit, generic_array::GenericArray, Block, BlockCipher, BlockDecrypt,
    BlockDecryptMut, BlockEncrypt, BlockEncryptMut, BlockSizeUser, InnerIvInit,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{
    symmetric_crypto::{family::Family, BlockChain, Direction},
    CipherError,
};

/// Chaining modes that can be named in a cipher string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Ecb,
    Cbc,
    /// 8-bit cipher feedback, same as `Cfb8`
    Cfb,
    /// feedback of a single bit
    Cfb1,
    Cfb8,
    /// 8-bit output feedback
    Ofb,
}

const MODES: [Mode; 6] = [
    Mode::Cbc,
    Mode::Cfb,
    Mode::Cfb1,
    Mode::Cfb8,
    Mode::Ecb,
    Mode::Ofb,
];

impl Mode {
    /// Recognizes a mode token, ignoring case
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        MODES
            .iter()
            .copied()
            .find(|mode| mode.name().eq_ignore_ascii_case(token))
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Mode::Ecb => "ECB",
            Mode::Cbc => "CBC",
            Mode::Cfb => "CFB",
            Mode::Cfb1 => "CFB1",
            Mode::Cfb8 => "CFB8",
            Mode::Ofb => "OFB",
        }
    }

    #[must_use]
    pub const fn requires_iv(&self) -> bool {
        !matches!(self, Mode::Ecb)
    }

    /// Block modes process whole blocks; the feedback modes turn the
    /// primitive into a byte stream.
    #[must_use]
    pub const fn is_block_mode(&self) -> bool {
        matches!(self, Mode::Ecb | Mode::Cbc)
    }

    /// Bits consumed per primitive invocation
    #[must_use]
    pub const fn feedback_bits(&self, block_size: usize) -> usize {
        match self {
            Mode::Ecb | Mode::Cbc => block_size * 8,
            Mode::Cfb | Mode::Cfb8 | Mode::Ofb => 8,
            Mode::Cfb1 => 1,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Runs a mode encryptor over whole segments
struct Encrypting<M>(M);

impl<M: BlockEncryptMut + Send> BlockChain for Encrypting<M> {
    fn process(&mut self, data: &mut [u8]) {
        for segment in data.chunks_exact_mut(<M as BlockSizeUser>::block_size()) {
            self.0.encrypt_block_mut(GenericArray::from_mut_slice(segment));
        }
    }
}

/// Runs a mode decryptor over whole segments
struct Decrypting<M>(M);

impl<M: BlockDecryptMut + Send> BlockChain for Decrypting<M> {
    fn process(&mut self, data: &mut [u8]) {
        for segment in data.chunks_exact_mut(<M as BlockSizeUser>::block_size()) {
            self.0.decrypt_block_mut(GenericArray::from_mut_slice(segment));
        }
    }
}

/// Output feedback with 8-bit segments: each step encrypts the register,
/// uses the first output byte as key stream and shifts it into the
/// register. Both directions are the same operation.
struct Ofb8<C: BlockEncrypt> {
    cipher: C,
    register: Block<C>,
}

impl<C: BlockEncrypt + Send> BlockChain for Ofb8<C> {
    fn process(&mut self, data: &mut [u8]) {
        let mut output = self.register.clone();
        for byte in data {
            output.copy_from_slice(&self.register);
            self.cipher.encrypt_block(&mut output);
            *byte ^= output[0];
            self.register.copy_within(1.., 0);
            if let Some(last) = self.register.last_mut() {
                *last = output[0];
            }
        }
        output.as_mut_slice().zeroize();
    }
}

impl<C: BlockEncrypt> Drop for Ofb8<C> {
    fn drop(&mut self) {
        self.register.as_mut_slice().zeroize();
    }
}

/// Chains a keyed RustCrypto block cipher in `mode`.
///
/// The leading block size bytes of `iv` seed every mode but ECB, which
/// ignores it. Single bit feedback is refused.
pub(crate) fn chain<C>(
    cipher: C,
    mode: Mode,
    direction: Direction,
    iv: Option<&[u8]>,
) -> Result<Box<dyn BlockChain>, CipherError>
where
    C: BlockCipher + BlockEncrypt + BlockDecrypt + Send + 'static,
{
    if mode.feedback_bits(C::block_size()) % 8 != 0 {
        return Err(CipherError::UnsupportedFeedback(mode.name()));
    }
    if !mode.requires_iv() {
        let chain: Box<dyn BlockChain> = match direction {
            Direction::Encrypt => Box::new(Encrypting(ecb::Encryptor::<C>::inner_init(cipher))),
            Direction::Decrypt => Box::new(Decrypting(ecb::Decryptor::<C>::inner_init(cipher))),
        };
        return Ok(chain);
    }
    let iv = iv.ok_or(CipherError::MissingIv)?;
    let iv: &Block<C> = iv
        .get(..C::block_size())
        .map(GenericArray::from_slice)
        .ok_or(CipherError::IvTooShort {
            given: iv.len(),
            expected: C::block_size(),
        })?;
    let chain: Box<dyn BlockChain> = match (mode, direction) {
        (Mode::Cbc, Direction::Encrypt) => {
            Box::new(Encrypting(cbc::Encryptor::<C>::inner_iv_init(cipher, iv)))
        }
        (Mode::Cbc, Direction::Decrypt) => {
            Box::new(Decrypting(cbc::Decryptor::<C>::inner_iv_init(cipher, iv)))
        }
        (Mode::Ofb, _) => Box::new(Ofb8 {
            cipher,
            register: iv.clone(),
        }),
        (_, Direction::Encrypt) => {
            Box::new(Encrypting(cfb8::Encryptor::<C>::inner_iv_init(cipher, iv)))
        }
        (_, Direction::Decrypt) => {
            Box::new(Decrypting(cfb8::Decryptor::<C>::inner_iv_init(cipher, iv)))
        }
    };
    Ok(chain)
}

/// A block cipher of one [`Family`] chained in one of the [`Mode`]s, for
/// one direction.
///
/// ECB and CBC accept whole blocks, the feedback modes any number of bytes.
/// The chaining value carries over from one call to the next, so that
/// splitting the input never changes the output.
pub struct ModeWrapper {
    chain: Box<dyn BlockChain>,
    family: Family,
    mode: Mode,
    direction: Direction,
}

impl ModeWrapper {
    /// Keys `family` with `key` and chains it in `mode`; see
    /// [`Family::build`].
    pub fn new(
        family: Family,
        key: &[u8],
        mode: Mode,
        direction: Direction,
        iv: Option<&[u8]>,
    ) -> Result<Self, CipherError> {
        Ok(Self {
            chain: family.build(key, mode, direction, iv)?,
            family,
            mode,
            direction,
        })
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn algorithm(&self) -> &'static str {
        self.family.canonical_name()
    }

    /// Size of the underlying primitive block
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.family.block_size()
    }

    /// Bytes consumed per primitive invocation: the smallest amount
    /// `process` accepts
    #[must_use]
    pub fn unit_size(&self) -> usize {
        self.mode.feedback_bits(self.block_size()) / 8
    }

    /// Transform `input`, which must be a multiple of `unit_size()` long.
    pub fn process(&mut self, input: &[u8]) -> Vec<u8> {
        debug_assert_eq!(0, input.len() % self.unit_size());
        let mut output = input.to_vec();
        self.chain.process(&mut output);
        output
    }
}
