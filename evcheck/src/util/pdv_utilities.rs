//! Utility functions used while materializing certificates and validating certification paths

use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use log::error;
use regex::Regex;

use der::asn1::{Ia5String, PrintableStringRef, Utf8StringRef};
use der::{asn1::ObjectIdentifier, Encode, Tagged};
use spki::AlgorithmIdentifierOwned;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::Name;
use x509_cert::{certificate::TbsCertificate, Certificate};

use crate::{util::error::*, util::pdv_alg_oids::*, validator::pdv_certificate::ParsedCertificate};

lazy_static! {
    static ref WHITESPACE_RE: Option<Regex> = Regex::new(r"\s+").ok();
}

/// `get_now_as_unix_epoch` returns the current time as seconds since the Unix epoch, or zero (which
/// disables validity checks) if the system clock is set before 1970.
pub fn get_now_as_unix_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `is_self_issued` returns true if the subject field in the certificate is the same as the issuer
/// field.
pub fn is_self_issued(cert: &Certificate) -> bool {
    compare_names(&cert.tbs_certificate.issuer, &cert.tbs_certificate.subject)
}

/// `valid_at_time` evaluates the not_before and not_after fields of the given TBSCertificate instance
/// and provides an indication of validity relative to presented time of interest.
///
/// It returns the number of seconds left to live if the certificate is valid at the given time or
/// an error indicating which field failed if the certificate is not valid. The not_before field is
/// evaluated first.
///
/// To stifle logging output upon error, pass true for the stifle_log parameter.
pub fn valid_at_time(target: &TbsCertificate, toi: u64, stifle_log: bool) -> Result<u64> {
    if 0 == toi {
        // zero is used to disable validity check
        return Ok(0);
    }

    let nb = target.validity.not_before.to_unix_duration().as_secs();
    if nb > toi {
        if !stifle_log {
            log_error_for_name(
                &target.subject,
                "certificate is not yet valid, i.e., not_before is after the configured time of interest",
            );
        }
        return Err(Error::PathValidation(
            PathValidationStatus::InvalidNotBeforeDate,
        ));
    }

    let na = target.validity.not_after.to_unix_duration().as_secs();
    if na < toi {
        if !stifle_log {
            log_error_for_name(
                &target.subject,
                format!(
                    "certificate is expired relative to the configured time of interest: {}",
                    target.validity.not_after
                )
                .as_str(),
            );
        }
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate,
        ))
    } else {
        Ok(na - toi)
    }
}

/// get_hash_alg_from_sig_alg takes an ObjectIdentifier that notionally contains a signature algorithm,
/// i.e., PKIXALG_SHA256_WITH_RSA_ENCRYPTION or PKIXALG_ECDSA_WITH_SHA256, and returns the indicated hash
/// algorithm.
pub fn get_hash_alg_from_sig_alg(sig_alg: &ObjectIdentifier) -> Result<AlgorithmIdentifierOwned> {
    let oid = match *sig_alg {
        PKIXALG_SHA256_WITH_RSA_ENCRYPTION | PKIXALG_ECDSA_WITH_SHA256 => PKIXALG_SHA256,
        PKIXALG_SHA384_WITH_RSA_ENCRYPTION | PKIXALG_ECDSA_WITH_SHA384 => PKIXALG_SHA384,
        PKIXALG_SHA224_WITH_RSA_ENCRYPTION | PKIXALG_ECDSA_WITH_SHA224 => PKIXALG_SHA224,
        PKIXALG_SHA512_WITH_RSA_ENCRYPTION | PKIXALG_ECDSA_WITH_SHA512 => PKIXALG_SHA512,
        _ => return Err(Error::PathValidation(PathValidationStatus::ProhibitedAlg)),
    };
    Ok(AlgorithmIdentifierOwned {
        oid,
        parameters: None,
    })
}

pub(crate) fn log_error_for_name(name: &Name, msg: &str) {
    let name_str = name_to_string(name);
    error!(
        "Encountered error while processing certificate with subject {}: {}",
        name_str, msg
    );
}

pub(crate) fn log_error_for_ca(ca: &ParsedCertificate, msg: &str) {
    log_error_for_name(&ca.decoded_cert.tbs_certificate.subject, msg);
}

/// `oid_lookup` takes an ObjectIdentifier and returns a string with a friendly name for the OID from
/// the const-oid database or Error::NotFound.
pub fn oid_lookup(oid: &ObjectIdentifier) -> Result<String> {
    match const_oid::db::DB.by_oid(oid) {
        Some(name) => Ok(name.to_string()),
        None => Err(Error::NotFound),
    }
}

/// `name_to_string` returns an RFC 4514 string representation of given Name value.
pub fn name_to_string(name: &Name) -> String {
    name.to_string()
}

/// get_value_from_rdn returns the value from AttributeTypeAndValue as a string for use in comparing
/// values where leading whitespace may be a factor
pub fn get_value_from_rdn(atav: &AttributeTypeAndValue) -> Result<String> {
    let val = match atav.value.tag() {
        der::Tag::PrintableString => atav
            .value
            .decode_as()
            .ok()
            .map(|s: PrintableStringRef<'_>| s.to_string()),
        der::Tag::Utf8String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Utf8StringRef<'_>| s.to_string()),
        der::Tag::Ia5String => atav
            .value
            .decode_as()
            .ok()
            .map(|s: Ia5String| s.to_string()),
        _ => None,
    };

    match val {
        Some(val) => Ok(val),
        None => {
            // fall back to a hex rendering of the encoded value so unlike types never match
            let enc = atav.value.to_der()?;
            let mut s = format!("{}=#", atav.oid);
            for c in enc {
                s.push_str(format!("{:02x}", c).as_str());
            }
            Ok(s)
        }
    }
}

fn normalize_rdn_value(val: &str) -> String {
    let lower = val.trim().to_lowercase();
    match WHITESPACE_RE.as_ref() {
        Some(re) => re.replace_all(lower.as_str(), " ").to_string(),
        None => lower,
    }
}

/// [`compare_names`] compares two Name values returning true if they match and false otherwise.
///
/// Attribute values are compared after trimming, case folding and collapsing runs of whitespace
/// when a binary comparison of the RDNs fails.
pub fn compare_names(left: &Name, right: &Name) -> bool {
    // no match if not the same number of RDNs
    if left.0.len() != right.0.len() {
        return false;
    }

    for (lrdn, rrdn) in left.0.iter().zip(right.0.iter()) {
        if lrdn.0.len() != rrdn.0.len() {
            return false;
        }

        if lrdn == rrdn {
            continue;
        }

        for (l, r) in lrdn.0.iter().zip(rrdn.0.iter()) {
            if l.oid != r.oid {
                return false;
            }

            let (l_val, r_val) = match (get_value_from_rdn(l), get_value_from_rdn(r)) {
                (Ok(l), Ok(r)) => (l, r),
                _ => return false,
            };

            if normalize_rdn_value(&l_val) != normalize_rdn_value(&r_val) {
                return false;
            }
        }
    }
    true
}

#[test]
fn get_hash_alg_from_sig_alg_test() {
    assert_eq!(
        PKIXALG_SHA256,
        get_hash_alg_from_sig_alg(&PKIXALG_SHA256_WITH_RSA_ENCRYPTION)
            .unwrap()
            .oid
    );
    assert_eq!(
        PKIXALG_SHA384,
        get_hash_alg_from_sig_alg(&PKIXALG_ECDSA_WITH_SHA384)
            .unwrap()
            .oid
    );
    assert_eq!(
        PKIXALG_SHA512,
        get_hash_alg_from_sig_alg(&PKIXALG_SHA512_WITH_RSA_ENCRYPTION)
            .unwrap()
            .oid
    );
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::ProhibitedAlg)),
        get_hash_alg_from_sig_alg(&PKIXALG_SHA256)
    );
}

#[test]
fn compare_names_test() {
    use core::str::FromStr;
    let a = Name::from_str("CN=Example  Root CA,O=Example,C=US").unwrap();
    let b = Name::from_str("CN=example root ca,O=EXAMPLE,C=US").unwrap();
    let c = Name::from_str("CN=Other Root CA,O=Example,C=US").unwrap();
    let d = Name::from_str("O=Example,C=US").unwrap();
    assert!(compare_names(&a, &a));
    assert!(compare_names(&a, &b));
    assert!(!compare_names(&a, &c));
    assert!(!compare_names(&a, &d));
}

#[test]
fn valid_at_time_test() {
    use core::str::FromStr;
    use der::Decode;
    use x509_cert::serial_number::SerialNumber;
    use x509_cert::time::Validity;

    let name = Name::from_str("CN=Test").unwrap();
    let validity = Validity {
        not_before: x509_cert::time::Time::UtcTime(
            der::asn1::UtcTime::from_unix_duration(core::time::Duration::from_secs(1_000_000_000))
                .unwrap(),
        ),
        not_after: x509_cert::time::Time::UtcTime(
            der::asn1::UtcTime::from_unix_duration(core::time::Duration::from_secs(2_000_000_000))
                .unwrap(),
        ),
    };
    let spki = spki::SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: PKIXALG_EC_PUBLIC_KEY,
            parameters: None,
        },
        subject_public_key: der::asn1::BitString::from_bytes(&[4, 1, 2]).unwrap(),
    };
    let tbs = TbsCertificate {
        version: x509_cert::Version::V3,
        serial_number: SerialNumber::new(&[1]).unwrap(),
        signature: AlgorithmIdentifierOwned {
            oid: PKIXALG_ECDSA_WITH_SHA256,
            parameters: None,
        },
        issuer: name.clone(),
        validity,
        subject: name,
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    };
    let enc = tbs.to_der().unwrap();
    let tbs = TbsCertificate::from_der(&enc).unwrap();

    assert_eq!(Ok(0), valid_at_time(&tbs, 0, true));
    assert_eq!(Ok(500_000_000), valid_at_time(&tbs, 1_500_000_000, true));
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotBeforeDate
        )),
        valid_at_time(&tbs, 999_999_999, true)
    );
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate
        )),
        valid_at_time(&tbs, 2_000_000_001, true)
    );
}
