//! Implements the required cryptography.
//!
//! Primarily based on TR-03111.

pub mod agreement;
pub mod cipher;
mod codec;
pub mod ecdsa;
pub mod groups;
pub mod hash;
pub mod kdf;
pub mod mac;
pub mod mod_ring;
mod pki;
mod rsa;
mod signature;

pub use codec::Codec;
use rand::{CryptoRng, RngCore};

pub trait CryptoCoreRng: CryptoRng + RngCore {}

impl<T> CryptoCoreRng for T where T: CryptoRng + RngCore {}
