//! Functions related to certification path validation operations

use const_oid::db::rfc5280::ANY_POLICY;
use const_oid::db::rfc5912::{
    ANY_EXTENDED_KEY_USAGE, ID_CE_BASIC_CONSTRAINTS, ID_CE_EXT_KEY_USAGE, ID_CE_INHIBIT_ANY_POLICY,
    ID_CE_KEY_USAGE, ID_CE_POLICY_CONSTRAINTS,
};
use der::Decode;
use x509_cert::ext::pkix::KeyUsages;

use crate::{
    environment::pki_environment::*, path_settings::*, pdv_certificate::*, pdv_extension::*,
    util::error::*, util::logging::*, util::pdv_utilities::*, CertificationPath,
};

//-----------------------------------------------------------------------------
// Top level function used by path builders. This aggregates lower level checks.
//-----------------------------------------------------------------------------
/// `validate_path_ev` aggregates the checks performed on a candidate path before it is accepted.
///
/// - The [`PkiEnvironment`] parameter provides signature verification and digest generation.
/// - The [`CertificationPathSettings`] parameter defines the time of interest, the target type,
///   the chain length limit, the required key purposes and the required certificate policies.
/// - The [`CertificationPath`] parameter provides the target certificate to validate along with a trust
///   anchor and, if necessary, intermediate CA certificates.
///
/// The first failing check determines the returned error.
pub fn validate_path_ev(
    pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    cp: &CertificationPath<'_>,
) -> Result<()> {
    check_chain_length(cps, cp)?;
    check_validity(cps, cp)?;
    check_end_entity_or_ca(cps, cp.target)?;
    check_names(cp)?;
    check_basic_constraints(cp)?;
    check_key_usage(cp)?;
    check_extended_key_usage(cps, cp)?;
    check_certificate_policies(cps, cp)?;
    check_critical_extensions(cp)?;
    verify_signatures(pe, cp)?;
    log_message(
        &PeLogLevels::PeInfo,
        format!(
            "Successfully completed path validation checks for certificate issued to {}",
            name_to_string(cp.target.subject())
        )
        .as_str(),
    );
    Ok(())
}

//-----------------------------------------------------------------------------
// Functions that perform some small aspect of path validation
//-----------------------------------------------------------------------------
/// `check_chain_length` enforces the `PS_MAX_CHAIN_LENGTH` setting, if non-zero.
pub fn check_chain_length(cps: &CertificationPathSettings, cp: &CertificationPath<'_>) -> Result<()> {
    let max = get_max_chain_length(cps);
    if max != 0 && cp.len() > max {
        log_error_for_ca(
            cp.target,
            format!(
                "path of {} certificates exceeds the maximum chain length of {}",
                cp.len(),
                max
            )
            .as_str(),
        );
        return Err(Error::PathValidation(
            PathValidationStatus::InvalidPathLength,
        ));
    }
    Ok(())
}

/// `check_validity` evaluates every certificate in the path, including the trust anchor, against
/// the `PS_TIME_OF_INTEREST` value read from the [`CertificationPathSettings`] parameter.
pub fn check_validity(cps: &CertificationPathSettings, cp: &CertificationPath<'_>) -> Result<()> {
    let toi = get_time_of_interest(cps);
    if 0 == toi {
        log_message(
            &PeLogLevels::PeInfo,
            "check_validity invoked with no time of interest; validity check disabled",
        );
        return Ok(());
    }

    valid_at_time(&cp.trust_anchor.decoded_cert.tbs_certificate, toi, false)?;
    for cert in cp.subordinates() {
        valid_at_time(&cert.decoded_cert.tbs_certificate, toi, false)?;
    }
    Ok(())
}

/// `check_end_entity_or_ca` affirms the target is the sort of certificate required by the
/// `PS_END_ENTITY_OR_CA` setting.
pub fn check_end_entity_or_ca(
    cps: &CertificationPathSettings,
    target: &ParsedCertificate,
) -> Result<()> {
    match get_end_entity_or_ca(cps) {
        EndEntityOrCa::MustBeEndEntity if target.is_ca() => {
            log_error_for_ca(target, "CA certificate presented where an end entity is required");
            Err(Error::PathValidation(
                PathValidationStatus::CaCertUsedAsEndEntity,
            ))
        }
        EndEntityOrCa::MustBeCa if !target.is_ca() => {
            log_error_for_ca(target, "end entity certificate presented where a CA is required");
            Err(Error::PathValidation(
                PathValidationStatus::EndEntityCertUsedAsCa,
            ))
        }
        _ => Ok(()),
    }
}

/// `check_names` ensures that subject and issuer names chain appropriately throughout the certification
/// path.
pub fn check_names(cp: &CertificationPath<'_>) -> Result<()> {
    let mut working_name = cp.trust_anchor.subject();
    for cert in cp.subordinates() {
        if !compare_names(cert.issuer(), working_name) {
            log_error_for_ca(cert, "name chaining violation");
            return Err(Error::PathValidation(
                PathValidationStatus::NameChainingFailure,
            ));
        }
        working_name = cert.subject();
    }
    Ok(())
}

/// `check_basic_constraints` ensures all intermediate CA certificates feature a basicConstraints extension
/// with the cA field set to true and that the certificate path length does not violate length constraints.
///
/// A pathLenConstraint in the trust anchor, if present, is honored.
pub fn check_basic_constraints(cp: &CertificationPath<'_>) -> Result<()> {
    let mut path_len_constraint = PS_MAX_PATH_LENGTH_CONSTRAINT;
    if let Some(PDVExtension::BasicConstraints(bc)) =
        cp.trust_anchor.get_extension(&ID_CE_BASIC_CONSTRAINTS)?
    {
        if let Some(pl) = bc.path_len_constraint {
            path_len_constraint = path_len_constraint.min(pl as usize);
        }
    }

    for ca_cert in cp.intermediates.iter() {
        let bc = match ca_cert.get_extension(&ID_CE_BASIC_CONSTRAINTS)? {
            Some(PDVExtension::BasicConstraints(bc)) => bc,
            _ => {
                log_error_for_ca(ca_cert, "missing basic constraints");
                return Err(Error::PathValidation(
                    PathValidationStatus::MissingBasicConstraints,
                ));
            }
        };

        if !bc.ca {
            log_error_for_ca(ca_cert, "invalid basic constraints");
            return Err(Error::PathValidation(
                PathValidationStatus::InvalidBasicConstraints,
            ));
        }

        // self-issued certificates do not count against the path length
        if !is_self_issued(&ca_cert.decoded_cert) {
            if path_len_constraint == 0 {
                log_error_for_ca(ca_cert, "path length constraint violation");
                return Err(Error::PathValidation(
                    PathValidationStatus::InvalidPathLength,
                ));
            }
            path_len_constraint -= 1;
        }

        if let Some(pl) = bc.path_len_constraint {
            path_len_constraint = path_len_constraint.min(pl as usize);
        }
    }

    Ok(())
}

/// `check_key_usage` ensures every issuing certificate in the path, including the trust anchor,
/// that features a keyUsage extension asserts the keyCertSign bit.
pub fn check_key_usage(cp: &CertificationPath<'_>) -> Result<()> {
    if cp.subordinates().is_empty() {
        return Ok(());
    }

    let mut issuers = vec![cp.trust_anchor];
    issuers.extend(cp.intermediates.iter().copied());
    for ca_cert in issuers {
        if let Some(PDVExtension::KeyUsage(ku)) = ca_cert.get_extension(&ID_CE_KEY_USAGE)? {
            if !ku.0.contains(KeyUsages::KeyCertSign) {
                log_error_for_ca(ca_cert, "keyCertSign is not set in key usage extension");
                return Err(Error::PathValidation(PathValidationStatus::InvalidKeyUsage));
            }
        }
    }
    Ok(())
}

/// `check_extended_key_usage` affirms that every certificate below the trust anchor that features an
/// extendedKeyUsage extension lists one of the purposes from the `PS_EXTENDED_KEY_USAGE` setting
/// (or anyExtendedKeyUsage). When the setting includes anyExtendedKeyUsage, nothing is checked.
pub fn check_extended_key_usage(
    cps: &CertificationPathSettings,
    cp: &CertificationPath<'_>,
) -> Result<()> {
    let ekus_from_config = get_extended_key_usage(cps);
    if ekus_from_config.contains(&ANY_EXTENDED_KEY_USAGE) {
        return Ok(());
    }

    for cert in cp.subordinates() {
        if let Some(PDVExtension::ExtendedKeyUsage(ekus)) =
            cert.get_extension(&ID_CE_EXT_KEY_USAGE)?
        {
            let ok = ekus
                .0
                .iter()
                .any(|eku| *eku == ANY_EXTENDED_KEY_USAGE || ekus_from_config.contains(eku));
            if !ok {
                log_error_for_ca(cert, "extended key usage violation");
                return Err(Error::PathValidation(
                    PathValidationStatus::InvalidExtendedKeyUsage,
                ));
            }
        }
    }
    Ok(())
}

/// `check_certificate_policies` affirms every certificate below the trust anchor asserts one of the
/// policies from the `PS_INITIAL_POLICY_SET` setting. Intermediate CA certificates may instead
/// assert anyPolicy while an inhibitAnyPolicy constraint from the trust anchor or a superior CA
/// has not taken effect. Following RFC 5280, each certificate that is not self-issued counts
/// against skipCerts, and a self-issued intermediate may assert anyPolicy even once the constraint
/// is in effect. The target must assert a required policy explicitly.
///
/// Since every certificate must assert a policy, a requireExplicitPolicy constraint is always
/// satisfied. Policy mapping is not supported, so inhibitPolicyMapping has nothing to act on. A
/// policyConstraints extension that carries neither field is rejected.
///
/// When the setting is absent or empty, nothing is checked.
pub fn check_certificate_policies(
    cps: &CertificationPathSettings,
    cp: &CertificationPath<'_>,
) -> Result<()> {
    let required = get_initial_policy_set(cps);
    if required.is_empty() {
        return Ok(());
    }

    // number of non-self-issued certificates that may yet assert anyPolicy
    let mut inhibit_any_policy = usize::MAX;
    if let Some(PDVExtension::InhibitAnyPolicy(iap)) =
        cp.trust_anchor.get_extension(&ID_CE_INHIBIT_ANY_POLICY)?
    {
        inhibit_any_policy = inhibit_any_policy.min(iap.0 as usize);
    }

    let subordinates = cp.subordinates();
    let last = subordinates.len().saturating_sub(1);
    for (pos, cert) in subordinates.iter().enumerate() {
        if let Some(PDVExtension::PolicyConstraints(pc)) =
            cert.get_extension(&ID_CE_POLICY_CONSTRAINTS)?
        {
            if pc.require_explicit_policy.is_none() && pc.inhibit_policy_mapping.is_none() {
                log_error_for_ca(cert, "policy constraints extension is an empty sequence");
                return Err(Error::PathValidation(
                    PathValidationStatus::PolicyValidationFailure,
                ));
            }
        }

        let self_issued = is_self_issued(&cert.decoded_cert);
        let policies = cert.get_policies();
        let explicit = policies.iter().any(|p| required.contains(p));
        let any_ok = pos < last
            && (inhibit_any_policy > 0 || self_issued)
            && policies.contains(&ANY_POLICY);
        if !explicit && !any_ok {
            log_error_for_ca(
                cert,
                format!(
                    "certificate does not assert a required policy (asserts: {:?})",
                    policies.iter().map(|p| p.to_string()).collect::<Vec<_>>()
                )
                .as_str(),
            );
            return Err(Error::PathValidation(
                PathValidationStatus::PolicyValidationFailure,
            ));
        }

        if !self_issued && inhibit_any_policy != usize::MAX {
            inhibit_any_policy = inhibit_any_policy.saturating_sub(1);
        }
        if let Some(PDVExtension::InhibitAnyPolicy(iap)) =
            cert.get_extension(&ID_CE_INHIBIT_ANY_POLICY)?
        {
            inhibit_any_policy = inhibit_any_policy.min(iap.0 as usize);
        }
    }
    Ok(())
}

/// `check_critical_extensions` affirms all critical extensions in the certificates below the trust
/// anchor are among [`EXTS_OF_INTEREST`] and were parsed successfully.
pub fn check_critical_extensions(cp: &CertificationPath<'_>) -> Result<()> {
    for cert in cp.subordinates() {
        if let Some(exts) = &cert.decoded_cert.tbs_certificate.extensions {
            for ext in exts {
                if ext.critical && !cert.parsed_extensions.contains_key(&ext.extn_id) {
                    log_error_for_ca(
                        cert,
                        format!("unprocessed critical extension: {}", ext.extn_id).as_str(),
                    );
                    return Err(Error::PathValidation(
                        PathValidationStatus::UnprocessedCriticalExtension,
                    ));
                }
            }
        }
    }
    Ok(())
}

/// `verify_signatures` verifies the certificate signatures of certificates found in a certification
/// path, beginning with the certificate issued by the trust anchor.
pub fn verify_signatures(pe: &PkiEnvironment, cp: &CertificationPath<'_>) -> Result<()> {
    let mut working_spki = &cp
        .trust_anchor
        .decoded_cert
        .tbs_certificate
        .subject_public_key_info;

    for cur_cert in cp.subordinates() {
        if cur_cert.decoded_cert.signature_algorithm != cur_cert.decoded_cert.tbs_certificate.signature
        {
            log_error_for_ca(
                cur_cert,
                "signature algorithm does not match the algorithm in the TBSCertificate",
            );
            return Err(Error::PathValidation(
                PathValidationStatus::SignatureVerificationFailure,
            ));
        }

        let defer_cert = DeferDecodeSigned::from_der(cur_cert.encoded_cert.as_slice())?;
        let r = pe.verify_signature_message(
            pe,
            &defer_cert.tbs_field,
            cur_cert.decoded_cert.signature.raw_bytes(),
            &cur_cert.decoded_cert.signature_algorithm,
            working_spki,
        );
        if let Err(e) = r {
            log_error_for_ca(
                cur_cert,
                format!("signature verification error: {}", e).as_str(),
            );
            return match e {
                Error::PathValidation(PathValidationStatus::ProhibitedAlg) => Err(e),
                _ => Err(Error::PathValidation(
                    PathValidationStatus::SignatureVerificationFailure,
                )),
            };
        }

        working_spki = &cur_cert.decoded_cert.tbs_certificate.subject_public_key_info;
    }
    Ok(())
}
