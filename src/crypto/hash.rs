//! Resolves a [`DigestAlgorithmIdentifier`]/[`HashAlgorithm`] to a concrete
//! hash function implementation.
//!
//! Kept as a thin dispatcher rather than folding the `sha1`/`sha2` calls
//! into `asn1::digest_algorithm_identifier` directly -- that module is pure
//! ASN.1 with no application logic, per its own doc comment.

use {
    crate::asn1::{DigestAlgorithmIdentifier, HashAlgorithm},
    sha1::Sha1,
    sha2::{Digest, Sha224, Sha256, Sha384, Sha512},
};

/// Hashes `data` with the given algorithm.
#[must_use]
pub fn hash(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        HashAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Extension trait adding the actual hash evaluation to the ASN.1
/// `DigestAlgorithmIdentifier`, once its OID has been resolved.
pub trait DigestAlgorithmExt {
    /// Hashes `data` with the algorithm this identifier names.
    ///
    /// # Panics
    ///
    /// Panics if the OID does not resolve to a recognized hash algorithm;
    /// callers are expected to have already validated the identifier (e.g.
    /// while decoding an SOD) before reaching for this.
    fn hash_bytes(&self, data: &[u8]) -> Vec<u8>;
}

impl DigestAlgorithmExt for DigestAlgorithmIdentifier {
    fn hash_bytes(&self, data: &[u8]) -> Vec<u8> {
        let algorithm = self
            .hash_algorithm()
            .expect("unrecognized digest algorithm OID");
        hash(algorithm, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_of_empty_string_matches_known_vector() {
        let digest = hash(HashAlgorithm::Sha1, b"");
        assert_eq!(
            hex::encode(digest),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn sha256_of_empty_string_matches_known_vector() {
        let digest = hash(HashAlgorithm::Sha256, b"");
        assert_eq!(
            hex::encode(digest),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }
}
