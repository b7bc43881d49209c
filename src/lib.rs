mod error;

pub mod catalog;
pub mod cipher;
pub mod cipher_spec;
pub mod kdf;
pub mod message_digest;
pub mod sizing;
pub mod symmetric_crypto;
pub mod transform;

pub use catalog::supported_ciphers;
pub use cipher::Cipher;
pub use cipher_spec::{resolve, CipherSpec};
pub use error::CipherError;
pub use kdf::{bytes_to_key, KeyAndIv, KeyIvGenParams};
pub use message_digest::MessageDigest;
pub use sizing::{sizing_defaults, Sizing};
pub use symmetric_crypto::Direction;
