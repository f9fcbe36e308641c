//! Provides implementations of crypto-related [`PkiEnvironment`] interfaces using libraries from the
//! [Rust Crypto](https://github.com/RustCrypto) project for support.

use der::{asn1::ObjectIdentifier, Encode};
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature as Signature256, VerifyingKey as VerifyingKey256};
use p384::ecdsa::{Signature as Signature384, VerifyingKey as VerifyingKey384};
use rsa::{pkcs8::DecodePublicKey, Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::{
    environment::pki_environment::PkiEnvironment,
    log_message,
    util::error::{Error, PathValidationStatus, Result},
    util::pdv_alg_oids::*,
    util::pdv_utilities::get_hash_alg_from_sig_alg,
    PeLogLevels,
};

/// get_padding_scheme takes an AlgorithmIdentifier containing a signature algorithm and returns
/// a corresponding PKCS #1 v1.5 padding scheme.
///
/// Only [`PKIXALG_SHA224_WITH_RSA_ENCRYPTION`], [`PKIXALG_SHA256_WITH_RSA_ENCRYPTION`],
/// [`PKIXALG_SHA384_WITH_RSA_ENCRYPTION`] and [`PKIXALG_SHA512_WITH_RSA_ENCRYPTION`] are recognized.
pub fn get_padding_scheme(signature_alg: &AlgorithmIdentifierOwned) -> Result<Pkcs1v15Sign> {
    match signature_alg.oid {
        PKIXALG_SHA256_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha256>()),
        PKIXALG_SHA384_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha384>()),
        PKIXALG_SHA224_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha224>()),
        PKIXALG_SHA512_WITH_RSA_ENCRYPTION => Ok(Pkcs1v15Sign::new::<Sha512>()),
        _ => Err(Error::Unrecognized),
    }
}

/// is_rsa returns true is the presented OID is one of [`PKIXALG_SHA224_WITH_RSA_ENCRYPTION`],
/// [`PKIXALG_SHA256_WITH_RSA_ENCRYPTION`], [`PKIXALG_SHA384_WITH_RSA_ENCRYPTION`] or
/// [`PKIXALG_SHA512_WITH_RSA_ENCRYPTION`] and false otherwise.
pub(crate) fn is_rsa(oid: &ObjectIdentifier) -> bool {
    *oid == PKIXALG_SHA256_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_SHA384_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_SHA224_WITH_RSA_ENCRYPTION
        || *oid == PKIXALG_SHA512_WITH_RSA_ENCRYPTION
}

/// is_ecdsa returns true is the presented OID is one of [`PKIXALG_ECDSA_WITH_SHA224`],
/// [`PKIXALG_ECDSA_WITH_SHA256`], [`PKIXALG_ECDSA_WITH_SHA384`] or [`PKIXALG_ECDSA_WITH_SHA512`] and false otherwise.
pub(crate) fn is_ecdsa(oid: &ObjectIdentifier) -> bool {
    *oid == PKIXALG_ECDSA_WITH_SHA256
        || *oid == PKIXALG_ECDSA_WITH_SHA384
        || *oid == PKIXALG_ECDSA_WITH_SHA224
        || *oid == PKIXALG_ECDSA_WITH_SHA512
}

/// calculate_hash_rust_crypto implements the [`CalculateHash`](crate::CalculateHash) interface for
/// [`PkiEnvironment`] using implementations from the Rust Crypto project.
///
/// It supports [`PKIXALG_SHA224`], [`PKIXALG_SHA256`], [`PKIXALG_SHA384`] and [`PKIXALG_SHA512`].
pub fn calculate_hash_rust_crypto(
    _pe: &PkiEnvironment,
    hash_alg: &AlgorithmIdentifierOwned,
    buffer_to_hash: &[u8],
) -> Result<Vec<u8>> {
    match hash_alg.oid {
        PKIXALG_SHA224 => Ok(Sha224::digest(buffer_to_hash).to_vec()),
        PKIXALG_SHA256 => Ok(Sha256::digest(buffer_to_hash).to_vec()),
        PKIXALG_SHA384 => Ok(Sha384::digest(buffer_to_hash).to_vec()),
        PKIXALG_SHA512 => Ok(Sha512::digest(buffer_to_hash).to_vec()),
        _ => Err(Error::Unrecognized),
    }
}

fn get_named_curve_parameter(alg_id: &AlgorithmIdentifierOwned) -> Result<ObjectIdentifier> {
    if let Some(params) = &alg_id.parameters {
        if let Ok(oid) = params.decode_as::<ObjectIdentifier>() {
            return Ok(oid);
        }
    }
    Err(Error::PathValidation(PathValidationStatus::EncodingError))
}

fn sig_failure() -> Error {
    Error::PathValidation(PathValidationStatus::SignatureVerificationFailure)
}

/// verify_signature_message_rust_crypto implements the [`VerifySignatureMessage`](crate::VerifySignatureMessage)
/// interface for [`PkiEnvironment`] using implementations from the [Rust Crypto](https://github.com/RustCrypto) project.
///
/// RSA PKCS #1 v1.5 signatures and ECDSA signatures on the P-256 and P-384 curves are supported.
/// ECDSA signatures are verified over a prehash so that any of the SHA-2 digests may be paired with
/// either curve.
pub fn verify_signature_message_rust_crypto(
    pe: &PkiEnvironment,
    message_to_verify: &[u8],
    signature: &[u8],
    signature_alg: &AlgorithmIdentifierOwned,
    spki: &SubjectPublicKeyInfoOwned,
) -> Result<()> {
    let hash_alg = get_hash_alg_from_sig_alg(&signature_alg.oid)?;
    let digest = calculate_hash_rust_crypto(pe, &hash_alg, message_to_verify)?;

    if is_rsa(&signature_alg.oid) {
        let enc_spki = spki.to_der()?;
        let rsa = match RsaPublicKey::from_public_key_der(&enc_spki) {
            Ok(rsa) => rsa,
            Err(e) => {
                log_message(
                    &PeLogLevels::PeError,
                    format!("Failed to parse RSA public key: {}", e).as_str(),
                );
                return Err(Error::PathValidation(PathValidationStatus::EncodingError));
            }
        };
        let ps = get_padding_scheme(signature_alg)?;
        rsa.verify(ps, digest.as_slice(), signature)
            .map_err(|_| sig_failure())
    } else if is_ecdsa(&signature_alg.oid) {
        let key_bytes = spki.subject_public_key.raw_bytes();
        match get_named_curve_parameter(&spki.algorithm)? {
            PKIXALG_SECP256R1 => {
                let ecdsa = VerifyingKey256::from_sec1_bytes(key_bytes)
                    .map_err(|_| Error::PathValidation(PathValidationStatus::EncodingError))?;
                let s = Signature256::from_der(signature).map_err(|_| sig_failure())?;
                ecdsa
                    .verify_prehash(digest.as_slice(), &s)
                    .map_err(|_| sig_failure())
            }
            PKIXALG_SECP384R1 => {
                let ecdsa = VerifyingKey384::from_sec1_bytes(key_bytes)
                    .map_err(|_| Error::PathValidation(PathValidationStatus::EncodingError))?;
                let s = Signature384::from_der(signature).map_err(|_| sig_failure())?;
                ecdsa
                    .verify_prehash(digest.as_slice(), &s)
                    .map_err(|_| sig_failure())
            }
            curve => {
                log_message(
                    &PeLogLevels::PeError,
                    format!("Unsupported named curve: {}", curve).as_str(),
                );
                Err(Error::PathValidation(PathValidationStatus::ProhibitedAlg))
            }
        }
    } else {
        log_message(
            &PeLogLevels::PeError,
            format!("Unsupported signature algorithm: {}", signature_alg.oid).as_str(),
        );
        Err(Error::PathValidation(PathValidationStatus::ProhibitedAlg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha256_vector() {
        let pe = PkiEnvironment::default();
        let alg = AlgorithmIdentifierOwned {
            oid: PKIXALG_SHA256,
            parameters: None,
        };
        let digest = calculate_hash_rust_crypto(&pe, &alg, b"abc").unwrap();
        assert_eq!(
            digest,
            hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn unknown_hash_rejected() {
        let pe = PkiEnvironment::default();
        let alg = AlgorithmIdentifierOwned {
            oid: PKIXALG_RSA_ENCRYPTION,
            parameters: None,
        };
        assert_eq!(
            Err(Error::Unrecognized),
            calculate_hash_rust_crypto(&pe, &alg, b"abc")
        );
    }

    #[test]
    fn alg_classification() {
        assert!(is_rsa(&PKIXALG_SHA384_WITH_RSA_ENCRYPTION));
        assert!(!is_rsa(&PKIXALG_ECDSA_WITH_SHA384));
        assert!(is_ecdsa(&PKIXALG_ECDSA_WITH_SHA224));
        assert!(!is_ecdsa(&PKIXALG_SHA256_WITH_RSA_ENCRYPTION));
        assert!(get_padding_scheme(&AlgorithmIdentifierOwned {
            oid: PKIXALG_ECDSA_WITH_SHA256,
            parameters: None
        })
        .is_err());
    }
}
