//! Drives EV validation of a target certificate: the EV policy asserted by the target is located
//! first, then a path is built and validated under that policy by whichever
//! [`CertificationPathBuilder`](crate::CertificationPathBuilder) objects are registered in the
//! [`PkiEnvironment`].
//!
//! Any outcome other than a path that starts at the target and ends at a trust anchor is a failure.

use der::asn1::ObjectIdentifier;
use log::{error, info};

use const_oid::db::rfc5912::ANY_EXTENDED_KEY_USAGE;

use crate::{
    environment::pki_environment::PkiEnvironment,
    environment::pki_environment_traits::*,
    path_settings::*,
    util::error::*,
    util::pdv_utilities::{get_now_as_unix_epoch, name_to_string},
    CertificationPath, ParsedCertificate,
};

/// `ev_path_settings` returns the settings used for EV validation: the given time of interest, a
/// target that must be an end-entity, no chain length cap, any extended key usage and `policy` as
/// the sole acceptable policy.
pub fn ev_path_settings(policy: ObjectIdentifier, time_of_interest: u64) -> CertificationPathSettings {
    let mut cps = CertificationPathSettings::new();
    set_time_of_interest(&mut cps, time_of_interest);
    set_end_entity_or_ca(&mut cps, EndEntityOrCa::MustBeEndEntity);
    set_max_chain_length(&mut cps, 0);
    set_extended_key_usage(&mut cps, ObjectIdentifierSet::from([ANY_EXTENDED_KEY_USAGE]));
    set_initial_policy_set(&mut cps, ObjectIdentifierSet::from([policy]));
    cps
}

/// `check_ev_chain` validates `target` against the trust domain at the current time.
pub fn check_ev_chain<'a>(
    pe: &PkiEnvironment,
    td: &'a dyn TrustDomain,
    target: &'a ParsedCertificate,
) -> Result<CertificationPath<'a>> {
    check_ev_chain_at(pe, td, target, get_now_as_unix_epoch())
}

/// `check_ev_chain_at` validates `target` against the trust domain at `time_of_interest` (seconds
/// since the Unix epoch, 0 disables validity checks).
///
/// [`Error::PolicyNotFound`] is returned without consulting any path builder when the target does
/// not assert the trust domain's EV policy.
pub fn check_ev_chain_at<'a>(
    pe: &PkiEnvironment,
    td: &'a dyn TrustDomain,
    target: &'a ParsedCertificate,
    time_of_interest: u64,
) -> Result<CertificationPath<'a>> {
    let policy = td.get_first_ev_policy_for_cert(target)?;
    info!(
        "{} asserts EV policy {}",
        name_to_string(target.subject()),
        pe.oid_lookup(&policy)
    );

    let cps = ev_path_settings(policy, time_of_interest);
    let cp = pe.build_cert_chain(td, &cps, target)?;

    if cp.target.encoded_cert != target.encoded_cert {
        error!("Path builder returned a path for a different target");
        return Err(Error::PathValidation(
            PathValidationStatus::Misconfiguration,
        ));
    }
    if CertTrust::TrustAnchor != td.get_cert_trust(cp.trust_anchor) {
        error!(
            "Path builder returned a path ending at {}, which is not a trust anchor",
            name_to_string(cp.trust_anchor.subject())
        );
        return Err(Error::PathValidation(
            PathValidationStatus::Misconfiguration,
        ));
    }

    info!(
        "Validated path of length {} from {} to {}",
        cp.len(),
        name_to_string(target.subject()),
        name_to_string(cp.trust_anchor.subject())
    );
    Ok(cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ev_settings() {
        let policy = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.99999.1");
        let cps = ev_path_settings(policy, 1_700_000_000);
        assert_eq!(1_700_000_000, get_time_of_interest(&cps));
        assert_eq!(EndEntityOrCa::MustBeEndEntity, get_end_entity_or_ca(&cps));
        assert_eq!(0, get_max_chain_length(&cps));
        assert!(get_extended_key_usage(&cps).contains(&ANY_EXTENDED_KEY_USAGE));
        let policies = get_initial_policy_set(&cps);
        assert_eq!(1, policies.len());
        assert!(policies.contains(&policy));
    }
}
