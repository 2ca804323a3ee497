//! Crate-wide error taxonomy.
//!
//! Subsystems that are only ever consumed internally (ASN.1 parsing details,
//! bignum arithmetic) keep using `anyhow::Result` the way the rest of this
//! crate's cryptographic core does; this module is for the error surface
//! callers of the protocol stages (access control, Secure Messaging, Chip
//! Authentication, Passive Authentication, the orchestrator) actually match
//! on, per spec §7.

use crate::iso7816::StatusWord;

/// Convenience alias for this crate's public `Result`.
pub type Result<T> = std::result::Result<T, Error>;

/// An error produced by the eMRTD protocol stack.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The classified error kind.
    pub kind: ErrorKind,
}

impl Error {
    /// Wraps an [`ErrorKind`] into an [`Error`].
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<anyhow::Error> for Error {
    fn from(source: anyhow::Error) -> Self {
        Self::new(ErrorKind::Internal(source.to_string()))
    }
}

/// The kinds of errors the protocol stack can surface, grouped per spec §7.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    // --- Transport ---
    /// The chip did not answer, or the reader reported no tag present.
    #[error("no tag in the field")]
    NoTag,
    /// More than one tag answered to selection.
    #[error("multiple tags in the field")]
    MultipleTags,
    /// The NFC session was invalidated mid-read.
    #[error("NFC connection lost")]
    ConnectionLost,
    /// The host cancelled the read.
    #[error("read cancelled by user")]
    UserCancelled,

    // --- APDU-level (derived from status word) ---
    /// The card returned a non-success status word.
    #[error("card returned {0}")]
    Apdu(StatusWord),
    /// `READ BINARY` returned fewer bytes than `Le`, with the card-reported
    /// correct length.
    #[error("wrong length, card expects Le={0}")]
    WrongLength(u8),

    // --- Cryptographic ---
    /// A Secure Messaging MAC did not verify.
    #[error("secure messaging checksum invalid")]
    InvalidChecksum,
    /// A PACE authentication token did not match the expected value.
    #[error("PACE token mismatch")]
    PaceTokenMismatch,
    /// The chip's BAC `M_IC`/response nonces did not match what was sent,
    /// meaning the chip does not hold the MRZ-derived key (or a
    /// man-in-the-middle tampered with the exchange).
    #[error("BAC mutual authentication failed")]
    BacAuthenticationFailed,
    /// A BAC or Secure Messaging decryption step failed (bad padding).
    #[error("decryption failed")]
    DecryptionFailed,
    /// KDF input was invalid (e.g. unsupported cipher/length combination).
    #[error("key derivation failed: {0}")]
    KeyDerivationFailed(&'static str),
    /// Diffie-Hellman / ECDH key agreement failed (point not on curve,
    /// invalid public value, …).
    #[error("key agreement failed: {0}")]
    KeyAgreementFailed(String),
    /// CMS `SignedData` verification failed.
    #[error("CMS signature verification failed: {0}")]
    CmsVerificationFailed(String),
    /// A Data Group's recomputed hash did not match the SOD-declared digest.
    #[error("hash mismatch for data group {0}")]
    DataGroupHashMismatch(u8),

    // --- Structural ---
    /// The ASN.1/BER structure did not match what was expected.
    #[error("unexpected ASN.1 structure: {0}")]
    UnexpectedStructure(&'static str),
    /// A TLV claimed a length that ran past the end of the buffer.
    #[error("truncated field")]
    TruncatedField,
    /// BER nesting exceeded the implementation's recursion limit.
    #[error("excessive ASN.1 nesting depth")]
    ExcessiveDepth,
    /// An unrecognized BER tag was encountered where strictness is required.
    #[error("unknown tag {0:#x}")]
    UnknownTag(u8),
    /// The outer tag did not match any known Data Group.
    #[error("unknown data group tag {0:#x}")]
    UnknownDataGroup(u8),

    // --- Configuration ---
    /// The OID did not match any known security protocol/configuration.
    #[error("unknown security configuration")]
    UnknownSecurityConfiguration,
    /// The security protocol OID could not be decoded into a configuration.
    #[error("security protocol not decodable")]
    ProtocolNotDecodable,
    /// A recognized-but-unimplemented protocol variant was invoked.
    #[error("not supported: {0}")]
    NotSupported(&'static str),

    // --- Input ---
    /// The MRZ key supplied by the caller was rejected by the chip.
    #[error("invalid MRZ key")]
    InvalidMrzKey,
    /// A caller-supplied argument was invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Catch-all for invariant violations that should not occur in a correct
    /// implementation; carries the underlying `anyhow` message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StatusWord> for ErrorKind {
    fn from(sw: StatusWord) -> Self {
        Self::Apdu(sw)
    }
}
