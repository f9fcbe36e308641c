//! The pki_environment_traits module features trait definitions and type definitions that are used
//! by [`PkiEnvironment`] to provide functionality that supports building and validating X.509
//! certification paths.

use der::asn1::ObjectIdentifier;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::name::Name;

use crate::util::error::*;
use crate::{CertificationPath, CertificationPathSettings, ParsedCertificate, PkiEnvironment};

/// `CalculateHash` provides a function signature for implementations that perform hashing
pub type CalculateHash = fn(
    &PkiEnvironment,
    &AlgorithmIdentifierOwned, // hash alg
    &[u8],                     // buffer to hash
) -> Result<Vec<u8>>;

/// `VerifySignatureMessage` provides a function signature for implementations that perform signature
/// verification over a message.
pub type VerifySignatureMessage = fn(
    &PkiEnvironment,
    &[u8],                      // message to hash and verify
    &[u8],                      // signature
    &AlgorithmIdentifierOwned,  // signature algorithm
    &SubjectPublicKeyInfoOwned, // public key
) -> Result<()>;

/// `OidLookup` implementations take an OID and returns either a friendly name for the OID or a
/// NotFound error. Where NotFound is returned by all OidLookup implementations, the
/// [`PkiEnvironment`] returns a dot notation version of the OID.
pub type OidLookup = fn(&ObjectIdentifier) -> Result<String>;

/// `CertTrust` is the trust a [`TrustDomain`] assigns to a certificate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CertTrust {
    /// The certificate is a trust anchor; path building stops here
    TrustAnchor,
    /// The certificate is trusted only if it chains to a trust anchor
    InheritsTrust,
}

/// The [`TrustDomain`] trait is the policy a path builder consults: which certificates are trust
/// anchors, where issuers are found, and which EV policy a target claims.
pub trait TrustDomain {
    /// `get_cert_trust` reports the trust assigned to the given certificate.
    fn get_cert_trust(&self, cert: &ParsedCertificate) -> CertTrust;

    /// `find_issuers` returns the candidate issuer certificates whose subject matches `issuer`.
    fn find_issuers(&self, issuer: &Name) -> Vec<&ParsedCertificate>;

    /// `get_first_ev_policy_for_cert` returns the first recognized EV policy asserted by `cert`, or
    /// [`Error::PolicyNotFound`] when none is asserted.
    fn get_first_ev_policy_for_cert(&self, cert: &ParsedCertificate) -> Result<ObjectIdentifier>;
}

/// The [`CertificationPathBuilder`] trait defines the interface for engines that build and validate
/// a certification path from a target certificate to a trust anchor supplied by a [`TrustDomain`].
pub trait CertificationPathBuilder {
    /// `build_cert_chain` returns a path from `target` to a trust anchor that satisfies `cps`, or the
    /// error that caused the most promising candidate path to be rejected.
    fn build_cert_chain<'a>(
        &self,
        pe: &PkiEnvironment,
        td: &'a dyn TrustDomain,
        cps: &CertificationPathSettings,
        target: &'a ParsedCertificate,
    ) -> Result<CertificationPath<'a>>;
}
