//! Wrappers around asn.1 encoder/decoder structures for the extensions consulted while building and
//! validating an EV certification path

use std::collections::BTreeMap;

use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_POLICIES,
    ID_CE_EXT_KEY_USAGE, ID_CE_INHIBIT_ANY_POLICY, ID_CE_KEY_USAGE, ID_CE_POLICY_CONSTRAINTS,
    ID_CE_SUBJECT_ALT_NAME, ID_CE_SUBJECT_KEY_IDENTIFIER,
};
use der::asn1::ObjectIdentifier;
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, CertificatePolicies, ExtendedKeyUsage,
    InhibitAnyPolicy, KeyUsage, PolicyConstraints, SubjectAltName, SubjectKeyIdentifier,
};

use crate::util::error::*;

/// `EXTS_OF_INTEREST` lists the extensions that are parsed when a [`ParsedCertificate`](crate::ParsedCertificate)
/// is materialized. These are also the only extensions that may appear as critical in a certificate
/// that validates.
pub const EXTS_OF_INTEREST: &[ObjectIdentifier] = &[
    ID_CE_SUBJECT_KEY_IDENTIFIER,
    ID_CE_AUTHORITY_KEY_IDENTIFIER,
    ID_CE_BASIC_CONSTRAINTS,
    ID_CE_SUBJECT_ALT_NAME,
    ID_CE_EXT_KEY_USAGE,
    ID_CE_KEY_USAGE,
    ID_CE_POLICY_CONSTRAINTS,
    ID_CE_CERTIFICATE_POLICIES,
    ID_CE_INHIBIT_ANY_POLICY,
];

/// The [`ExtensionProcessing`] trait provides a common means of extracting extensions from objects that
/// retain copies of the decoded extension structures.
///
/// Extensions are parsed once, when the object is prepared, and are subsequently available via
/// `get_extension` without re-parsing.
pub trait ExtensionProcessing {
    /// `get_extension` takes an ObjectIdentifier that identifies an extension type and returns
    /// a previously parsed [`PDVExtension`] instance if the extension was present.
    fn get_extension(&self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>>;

    /// `parse_extension` takes an ObjectIdentifier that identifies an extension type, parses the
    /// extension if present and caches the result.
    fn parse_extension(&'_ mut self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>>;

    /// `parse_extensions` parses each extension type in `oids`, ignoring any parse failures.
    fn parse_extensions(&'_ mut self, oids: &[ObjectIdentifier]);
}

/// [`ParsedExtensions`] is a typedef of a BTreeMap map that associates [`PDVExtension`] objects with object
/// identifier values.
pub type ParsedExtensions = BTreeMap<ObjectIdentifier, PDVExtension>;

/// [`PDVExtension`] provides a wrapper for supported extension types.
#[derive(PartialEq, Clone, Eq, Debug)]
pub enum PDVExtension {
    /// Parsed BasicConstraints extension
    BasicConstraints(BasicConstraints),
    /// Parsed SubjectKeyIdentifier extension
    SubjectKeyIdentifier(SubjectKeyIdentifier),
    /// Parsed ExtendedKeyUsage extension
    ExtendedKeyUsage(ExtendedKeyUsage),
    /// Parsed KeyUsage extension
    KeyUsage(KeyUsage),
    /// Parsed SubjectAltName extension
    SubjectAltName(SubjectAltName),
    /// Parsed CertificatePolicies extension
    CertificatePolicies(CertificatePolicies),
    /// Parsed AuthorityKeyIdentifier extension
    AuthorityKeyIdentifier(AuthorityKeyIdentifier),
    /// Parsed PolicyConstraints extension
    PolicyConstraints(PolicyConstraints),
    /// Parsed InhibitAnyPolicy extension
    InhibitAnyPolicy(InhibitAnyPolicy),
}
