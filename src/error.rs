use thiserror::Error;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("unsupported cipher algorithm ({0})")]
    UnsupportedCipher(String),
    #[error("key length too short: {given} given, at least {expected} required")]
    KeyTooShort { given: usize, expected: usize },
    #[error("iv length too short: {given} given, at least {expected} required")]
    IvTooShort { given: usize, expected: usize },
    #[error("salt must be an 8-octet string, {0} bytes given")]
    InvalidSalt(usize),
    #[error("data must not be empty")]
    EmptyInput,
    #[error("cipher initialization failed: {0}")]
    CipherInit(#[source] Box<CipherError>),
    #[error("bad decrypt: padding check failed")]
    Padding,
    #[error("data not block size aligned: {len} bytes left, block size is {block_size}")]
    NotBlockAligned { len: usize, block_size: usize },
    #[error("invalid key length for {algorithm}: {given} bytes")]
    InvalidKeyLength {
        algorithm: &'static str,
        given: usize,
    },
    #[error("{0} feedback is not supported by the mode wrapper")]
    UnsupportedFeedback(&'static str),
    #[error("no key set")]
    MissingKey,
    #[error("no iv set")]
    MissingIv,
    #[error("cipher not initialized")]
    NotInitialized,
    #[error("unknown digest: {0}")]
    UnknownDigest(String),
}

impl CipherError {
    /// Wraps a failure raised while building the primitive of a session
    pub(crate) fn init(cause: CipherError) -> Self {
        CipherError::CipherInit(Box::new(cause))
    }
}
