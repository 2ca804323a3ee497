//! PKI verifications

use {
    crate::{
        asn1::{
            emrtd::pki::MasterList, public_key_info::SubjectPublicKeyInfo,
            DigestAlgorithmIdentifier, SignatureAlgorithmIdentifier,
        },
        crypto::rsa::RSAPublicKey,
    },
    anyhow::{anyhow, ensure, Result},
    cms::{cert::CertificateChoices, content_info::CmsVersion},
    der::Encode,
    ruint::Uint,
};

// Out of scope: full CSCA trust-chain validation (building a path to a
// locally trusted root, checking revocation, etc.) per ICAO 9303-12 §7.
// This verifies the Master List's own CMS signature is well-formed and
// self-consistent: it is signed by a certificate contained within it whose
// subject equals its issuer.
impl MasterList {
    pub fn verify(&self) -> Result<()> {
        let sd = self.signed_data();

        // Structure checks, per ICAO 9303-12 9.1
        ensure!(sd.version == CmsVersion::V3);
        ensure!(sd.crls.is_none());

        let certificates = &self
            .signed_data()
            .certificates
            .as_ref()
            .ok_or_else(|| anyhow!("SignedData must contain the Certificates field"))?
            .0;

        // Find the self-signed certificate (subject = issuer)
        let master_cert = certificates
            .iter()
            .find_map(|choice| {
                if let CertificateChoices::Certificate(cert) = choice {
                    (cert.tbs_certificate.subject == cert.tbs_certificate.issuer).then_some(cert)
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                anyhow!("Self-signed certificate not found in SignedData.certificates")
            })?;
        let master_pubkey = &master_cert.tbs_certificate.subject_public_key_info;

        type Uint2048 = Uint<2048, 32>;
        let pubkey =
            RSAPublicKey::<Uint2048>::try_from(SubjectPublicKeyInfo::try_from(master_pubkey)?)?;

        let signer = self.signer_info();
        let signature_algo = SignatureAlgorithmIdentifier::from_oid_and_parameters(
            signer.signature_algorithm.oid,
            signer.signature_algorithm.parameters.clone(),
        )?;
        let attrs = signer
            .signed_attrs
            .as_ref()
            .ok_or_else(|| anyhow!("SignedData must contain the signedAttrs field"))?;
        let attrs_der = attrs.to_der()?;
        let signature = signer.signature.as_bytes();

        match signature_algo {
            SignatureAlgorithmIdentifier::Rsa(pss_params) => {
                pubkey.verify_pss(&attrs_der, signature, &pss_params)?;
            }
            SignatureAlgorithmIdentifier::Unknown(_) => {
                let digest_algo = DigestAlgorithmIdentifier {
                    algorithm:  signer.digest_alg.oid,
                    parameters: if signer.digest_alg.parameters.is_some() {
                        crate::asn1::DigestAlgorithmParameters::Null
                    } else {
                        crate::asn1::DigestAlgorithmParameters::Absent
                    },
                };
                pubkey.verify_pkcs1v15(&attrs_der, signature, &digest_algo)?;
            }
        }

        // Every CSCA certificate in the list must at least parse; full
        // chain validation against a local trust anchor is out of scope.
        let list = self.csca_ml()?;
        for cert in &list.cert_list {
            let _ = SubjectPublicKeyInfo::try_from(
                &cert.tbs_certificate.subject_public_key_info,
            )?;
        }

        Ok(())
    }
}
