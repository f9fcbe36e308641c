//! Provides structure that represents a certification path including target, intermediate CAs and
//! trust anchor.

use crate::ParsedCertificate;

/// `CertificationPath` is used to represent the trust anchor, intermediate CA certificates and target certificate
/// that comprise a certification path. The path borrows certificates owned by the input chain.
#[derive(Clone)]
#[readonly::make]
pub struct CertificationPath<'a> {
    /// `target` contains the target certificate for the certification path
    #[readonly]
    pub target: &'a ParsedCertificate,
    /// `intermediates` contains zero or more intermediate CA certificates, beginning with the certificate that
    /// was issued by `trust_anchor` and proceeding in order to a certificate that issued the target, i.e.,
    /// `intermediates\[0\]` can be used to verify `intermediates\[1\]`, `intermediates\[1\]` can be used to verify
    /// `intermediates\[2\]`, etc. until `intermediates[intermediates.len() - 1]` can be used to verify `target`.
    #[readonly]
    pub intermediates: Vec<&'a ParsedCertificate>,
    /// `trust_anchor` contains the trust anchor for the certification path
    #[readonly]
    pub trust_anchor: &'a ParsedCertificate,
}

impl<'a> CertificationPath<'a> {
    /// instantiates a new CertificationPath
    pub fn new(
        trust_anchor: &'a ParsedCertificate,
        intermediates: Vec<&'a ParsedCertificate>,
        target: &'a ParsedCertificate,
    ) -> CertificationPath<'a> {
        CertificationPath {
            trust_anchor,
            intermediates,
            target,
        }
    }

    /// Number of certificates in the path, counting the target and the trust anchor once each
    pub fn len(&self) -> usize {
        if std::ptr::eq(self.target, self.trust_anchor) {
            1
        } else {
            self.intermediates.len() + 2
        }
    }

    /// A path always contains at least a target
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the intermediates followed by the target, i.e., the certificates whose signatures
    /// are checked, in order from the one issued by the trust anchor
    pub fn subordinates(&self) -> Vec<&'a ParsedCertificate> {
        let mut v = self.intermediates.clone();
        if !std::ptr::eq(self.target, self.trust_anchor) {
            v.push(self.target);
        }
        v
    }
}
