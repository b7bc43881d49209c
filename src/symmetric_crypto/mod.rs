//! Building blocks of a cipher session.
//!
//! A [`family::Family`] keys one of the supported block ciphers and chains
//! it in a [`mode::Mode`], producing a [`BlockChain`]. The
//! [`padding::Padding`] scheme extends the last partial segment when a
//! session is finalized.

pub mod family;
pub mod key;
pub mod mode;
pub mod padding;

use serde::{Deserialize, Serialize};

/// A keyed block cipher chained in one mode, for one direction.
pub trait BlockChain: Send {
    /// Transforms `data` in place. Its length must be a multiple of the
    /// segment size of the mode; the chaining value carries over from one
    /// call to the next.
    fn process(&mut self, data: &mut [u8]);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Encrypt,
    Decrypt,
}
