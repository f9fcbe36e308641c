//! Trust domain bound to a single root certificate and a single EV policy

use const_oid::db::rfc5280::ANY_POLICY;
use der::asn1::ObjectIdentifier;
use log::{debug, error, info};
use x509_cert::name::Name;

use crate::{
    environment::pki_environment_traits::*, util::error::*, util::pdv_utilities::*,
    ParsedCertificate,
};

/// `EvPolicy` pairs the EV policy OID being checked with its human-readable description.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EvPolicy {
    /// Policy OID a target certificate must assert
    pub oid: ObjectIdentifier,
    /// Description emitted alongside the OID in the trust anchor literal
    pub description: String,
}

impl EvPolicy {
    /// Pairs `oid` with `description`. anyPolicy is rejected.
    pub fn new(oid: ObjectIdentifier, description: &str) -> Result<EvPolicy> {
        if oid == ANY_POLICY {
            error!("anyPolicy cannot be used as an EV policy");
            return Err(Error::PathValidation(
                PathValidationStatus::Misconfiguration,
            ));
        }
        Ok(EvPolicy {
            oid,
            description: description.to_string(),
        })
    }

    /// Parses `oid` from dotted-decimal form then behaves as [`EvPolicy::new`].
    pub fn from_dotted(oid: &str, description: &str) -> Result<EvPolicy> {
        match ObjectIdentifier::new(oid) {
            Ok(o) => Self::new(o, description),
            Err(e) => {
                error!("{} is not a valid dotted-decimal OID: {}", oid, e);
                Err(Error::ParseError)
            }
        }
    }
}

/// `EvTrustDomain` trusts exactly one root certificate and recognizes exactly one EV policy.
/// Candidate issuers are drawn from the certificates supplied at construction.
pub struct EvTrustDomain<'a> {
    root: &'a ParsedCertificate,
    policy: EvPolicy,
    candidates: Vec<&'a ParsedCertificate>,
}

impl<'a> EvTrustDomain<'a> {
    /// Creates a trust domain for `root` and `policy`. The root is added to the candidates when
    /// not already present.
    pub fn new<I>(root: &'a ParsedCertificate, policy: EvPolicy, candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a ParsedCertificate>,
    {
        let mut candidates: Vec<&'a ParsedCertificate> = candidates.into_iter().collect();
        if !candidates
            .iter()
            .any(|c| c.encoded_cert == root.encoded_cert)
        {
            candidates.push(root);
        }
        info!(
            "Trusting {} for EV policy {} ({})",
            name_to_string(root.subject()),
            policy.oid,
            policy.description
        );
        EvTrustDomain {
            root,
            policy,
            candidates,
        }
    }

    /// Returns the trusted root
    pub fn root(&self) -> &'a ParsedCertificate {
        self.root
    }

    /// Returns the recognized EV policy
    pub fn policy(&self) -> &EvPolicy {
        &self.policy
    }
}

impl TrustDomain for EvTrustDomain<'_> {
    fn get_cert_trust(&self, cert: &ParsedCertificate) -> CertTrust {
        if cert.encoded_cert == self.root.encoded_cert {
            CertTrust::TrustAnchor
        } else {
            CertTrust::InheritsTrust
        }
    }

    fn find_issuers(&self, issuer: &Name) -> Vec<&ParsedCertificate> {
        let issuers: Vec<&ParsedCertificate> = self
            .candidates
            .iter()
            .copied()
            .filter(|c| compare_names(c.subject(), issuer))
            .collect();
        debug!(
            "Found {} candidate issuer(s) for {}",
            issuers.len(),
            name_to_string(issuer)
        );
        issuers
    }

    fn get_first_ev_policy_for_cert(&self, cert: &ParsedCertificate) -> Result<ObjectIdentifier> {
        match cert
            .get_policies()
            .into_iter()
            .find(|p| *p == self.policy.oid)
        {
            Some(oid) => Ok(oid),
            None => {
                error!(
                    "{} does not assert EV policy {}",
                    name_to_string(cert.subject()),
                    self.policy.oid
                );
                Err(Error::PolicyNotFound)
            }
        }
    }
}
