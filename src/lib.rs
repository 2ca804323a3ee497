//! Client-side implementation of the ICAO Doc 9303 electronic Machine
//! Readable Travel Document (eMRTD) reader protocol stack.
//!
//! This crate implements the cryptographic protocol stack that talks to the
//! contactless IC embedded in a passport or eID card over an ISO/IEC 7816-4
//! command channel: access control (BAC, PACE-GM), Secure Messaging, Chip
//! Authentication, the LDS file reader and Data Group decoder, and Passive
//! Authentication. The NFC transport, host UI, and application-facing data
//! model (MRZ/portrait/personal-details parsing) are out of scope and are
//! represented here only by the [`Transport`] trait they must implement.

pub mod asn1;
pub mod chip_authentication;
pub mod crypto;
pub mod error;
pub mod iso7816;
pub mod lds;
pub mod mrz;
pub mod nfc;
pub mod orchestrator;
pub mod passive_authentication;
pub mod secure_messaging;

pub mod access_control {
    //! BAC and PACE-GM: derive the initial Secure Messaging session from the
    //! MRZ-derived password and open the first secure channel.
    pub mod bac;
    pub mod pace;
}

pub use error::{Error, ErrorKind, Result};

/// `ensure!`-like macro that returns an [`Error`] instead of `anyhow::Error`.
#[macro_export]
macro_rules! ensure_err {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
