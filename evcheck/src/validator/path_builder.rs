//! Default certification path builder. Paths are built forward from the target through issuer
//! candidates supplied by a [`TrustDomain`] and each complete candidate is validated with
//! [`validate_path_ev`].

use log::debug;

use crate::{
    environment::pki_environment::PkiEnvironment,
    environment::pki_environment_traits::*,
    path_settings::{CertificationPathSettings, PS_MAX_PATH_LENGTH_CONSTRAINT},
    path_validator::{check_end_entity_or_ca, validate_path_ev},
    util::error::*,
    util::pdv_utilities::name_to_string,
    CertificationPath, ParsedCertificate,
};

/// `PkixPathBuilder` performs a depth-first search for a valid path. Issuers already present in the
/// partial path are skipped, so cross-certified or self-issued loops terminate.
#[derive(Clone, Debug, Default)]
pub struct PkixPathBuilder {}

impl PkixPathBuilder {
    fn find_path<'a>(
        &self,
        pe: &PkiEnvironment,
        td: &'a dyn TrustDomain,
        cps: &CertificationPathSettings,
        partial: &mut Vec<&'a ParsedCertificate>,
        err: &mut Option<Error>,
    ) -> Option<CertificationPath<'a>> {
        let current = *partial.last()?;
        if partial.len() > PS_MAX_PATH_LENGTH_CONSTRAINT + 1 {
            debug!("Abandoning partial path at depth {}", partial.len());
            return None;
        }

        for issuer in td.find_issuers(current.issuer()) {
            if partial
                .iter()
                .any(|c| c.encoded_cert == issuer.encoded_cert)
            {
                continue;
            }

            partial.push(issuer);
            if CertTrust::TrustAnchor == td.get_cert_trust(issuer) {
                let cp = path_from_partial(partial);
                match validate_path_ev(pe, cps, &cp) {
                    Ok(()) => return Some(cp),
                    Err(e) => {
                        debug!(
                            "Candidate path via {} rejected: {}",
                            name_to_string(issuer.subject()),
                            e
                        );
                        *err = Some(e);
                    }
                }
            } else if let Some(cp) = self.find_path(pe, td, cps, partial, err) {
                return Some(cp);
            }
            partial.pop();
        }
        None
    }
}

/// Converts a partial path ordered from target to trust anchor into a [`CertificationPath`]
fn path_from_partial<'a>(partial: &[&'a ParsedCertificate]) -> CertificationPath<'a> {
    let target = partial[0];
    let trust_anchor = partial[partial.len() - 1];
    let intermediates = if partial.len() > 2 {
        partial[1..partial.len() - 1].iter().rev().copied().collect()
    } else {
        vec![]
    };
    CertificationPath::new(trust_anchor, intermediates, target)
}

impl CertificationPathBuilder for PkixPathBuilder {
    fn build_cert_chain<'a>(
        &self,
        pe: &PkiEnvironment,
        td: &'a dyn TrustDomain,
        cps: &CertificationPathSettings,
        target: &'a ParsedCertificate,
    ) -> Result<CertificationPath<'a>> {
        check_end_entity_or_ca(cps, target)?;

        if CertTrust::TrustAnchor == td.get_cert_trust(target) {
            let cp = CertificationPath::new(target, vec![], target);
            validate_path_ev(pe, cps, &cp)?;
            return Ok(cp);
        }

        let mut partial = vec![target];
        let mut err = None;
        match self.find_path(pe, td, cps, &mut partial, &mut err) {
            Some(cp) => Ok(cp),
            None => Err(err.unwrap_or(Error::PathValidation(
                PathValidationStatus::NoPathsFound,
            ))),
        }
    }
}
