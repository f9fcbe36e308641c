//! PkiEnvironment aggregates a set of function pointers and trait objects that supply functionality
//! useful when building and validating a certification path and when rendering certificates.
//!
//! A PkiEnvironment is the process-wide cryptographic context: it is created once, passed by
//! reference to every component that needs hashing, signature verification or path building, and
//! released when it goes out of scope.
//!
//! ```
//! use der::asn1::ObjectIdentifier;
//! use evcheck::*;
//!
//! // the default PkiEnvironment uses `oid_lookup` to look up friendly names for OIDs
//! let mut pe = PkiEnvironment::default();
//!
//! // add hashing, signature verification and the default path builder
//! populate_ev_pki_environment(&mut pe);
//!
//! // OIDs without a friendly name are rendered in dotted form
//! let oid = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.99999.1");
//! assert_eq!("1.3.6.1.4.1.99999.1", pe.oid_lookup(&oid));
//! ```
//!
//! The aggregation of function pointers and trait objects allows for implementations of features to
//! vary. For example, a test may register a path builder that returns a canned result.

use der::asn1::ObjectIdentifier;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

use crate::{
    environment::pki_environment_traits::*, log_message, path_builder::PkixPathBuilder,
    util::crypto::*, util::error::*, CertificationPath, CertificationPathSettings,
    ParsedCertificate, PeLogLevels,
};

/// [`PkiEnvironment`] provides a switchboard of callback functions that allow support to vary on
/// different platforms or to allow support to be tailored for specific use cases.
pub struct PkiEnvironment {
    //--------------------------------------------------------------------------
    //Crypto interfaces
    //--------------------------------------------------------------------------
    /// List of functions that provide a message digest functionality
    calculate_hash_callbacks: Vec<CalculateHash>,

    /// List of functions that provide a signature verification functionality given a message
    verify_signature_message_callbacks: Vec<VerifySignatureMessage>,

    //--------------------------------------------------------------------------
    //Certification path processing interfaces
    //--------------------------------------------------------------------------
    /// List of trait objects that build and validate certification paths
    path_builders: Vec<Box<dyn CertificationPathBuilder>>,

    //--------------------------------------------------------------------------
    //Miscellaneous interfaces
    //--------------------------------------------------------------------------
    /// List of functions that provide OID lookup capabilities
    oid_lookups: Vec<OidLookup>,
}

impl Default for PkiEnvironment {
    /// PkiEnvironment::default returns a new [`PkiEnvironment`] with empty callback vectors for each
    /// type of callback except `oid_lookups`, which features the [`oid_lookup`](crate::oid_lookup) function.
    fn default() -> Self {
        log_message(&PeLogLevels::PeDebug, "Acquired PKI environment");
        PkiEnvironment {
            calculate_hash_callbacks: vec![],
            verify_signature_message_callbacks: vec![],
            path_builders: vec![],
            oid_lookups: vec![crate::oid_lookup],
        }
    }
}

impl Drop for PkiEnvironment {
    fn drop(&mut self) {
        log_message(&PeLogLevels::PeDebug, "Released PKI environment");
    }
}

impl PkiEnvironment {
    /// PkiEnvironment::new returns a new [`PkiEnvironment`] with empty callback vectors for each type of callback
    pub fn new() -> PkiEnvironment {
        log_message(&PeLogLevels::PeDebug, "Acquired PKI environment");
        PkiEnvironment {
            calculate_hash_callbacks: vec![],
            verify_signature_message_callbacks: vec![],
            path_builders: vec![],
            oid_lookups: vec![],
        }
    }

    /// clear_all_callbacks clears the contents of all function pointer and trait object vectors
    /// associated with an instance of [`PkiEnvironment`].
    pub fn clear_all_callbacks(&mut self) {
        self.clear_calculate_hash_callbacks();
        self.clear_verify_signature_message_callbacks();
        self.clear_path_builders();
        self.clear_oid_lookups();
    }

    /// add_calculate_hash_callback adds a [`CalculateHash`] callback to the list used by calculate_hash.
    pub fn add_calculate_hash_callback(&mut self, c: CalculateHash) {
        self.calculate_hash_callbacks.push(c);
    }

    /// clear_calculate_hash_callbacks clears the list of [`CalculateHash`] callbacks used by calculate_hash.
    pub fn clear_calculate_hash_callbacks(&mut self) {
        self.calculate_hash_callbacks.clear();
    }

    /// calculate_hash iterates over calculate_hash_callbacks until an authoritative answer is found
    /// or all options have been exhausted
    pub fn calculate_hash(
        &self,
        pe: &PkiEnvironment,
        hash_alg: &AlgorithmIdentifierOwned,
        buffer_to_hash: &[u8],
    ) -> Result<Vec<u8>> {
        for f in &self.calculate_hash_callbacks {
            if let Ok(r) = f(pe, hash_alg, buffer_to_hash) {
                return Ok(r);
            }
        }
        Err(Error::Unrecognized)
    }

    /// add_verify_signature_message_callback adds a [`VerifySignatureMessage`] callback to the list used by verify_signature_message.
    pub fn add_verify_signature_message_callback(&mut self, c: VerifySignatureMessage) {
        self.verify_signature_message_callbacks.push(c);
    }

    /// clear_verify_signature_message_callbacks clears the list of [`VerifySignatureMessage`] callbacks used by verify_signature_message.
    pub fn clear_verify_signature_message_callbacks(&mut self) {
        self.verify_signature_message_callbacks.clear();
    }

    /// verify_signature_message iterates over verify_signature_message_callbacks until an authoritative answer is found
    /// or all options have been exhausted. The last error encountered is returned when no callback
    /// succeeds.
    pub fn verify_signature_message(
        &self,
        pe: &PkiEnvironment,
        message_to_verify: &[u8],
        signature: &[u8],
        signature_alg: &AlgorithmIdentifierOwned,
        spki: &SubjectPublicKeyInfoOwned,
    ) -> Result<()> {
        let mut err = Error::Unrecognized;
        for f in &self.verify_signature_message_callbacks {
            match f(pe, message_to_verify, signature, signature_alg, spki) {
                Ok(r) => return Ok(r),
                Err(e) => err = e,
            }
        }
        Err(err)
    }

    /// add_path_builder adds a [`CertificationPathBuilder`] trait object to the list used by build_cert_chain.
    pub fn add_path_builder(&mut self, c: Box<dyn CertificationPathBuilder>) {
        self.path_builders.push(c);
    }

    /// clear_path_builders clears the list of [`CertificationPathBuilder`] trait objects used by build_cert_chain.
    pub fn clear_path_builders(&mut self) {
        self.path_builders.clear();
    }

    /// build_cert_chain iterates over path_builders until one returns a path. When none succeeds,
    /// the last error is returned. With no path builders registered, the result is always an error.
    pub fn build_cert_chain<'a>(
        &self,
        td: &'a dyn TrustDomain,
        cps: &CertificationPathSettings,
        target: &'a ParsedCertificate,
    ) -> Result<CertificationPath<'a>> {
        if self.path_builders.is_empty() {
            log_message(
                &PeLogLevels::PeError,
                "No certification path builder is available in the PKI environment",
            );
            return Err(Error::PathValidation(
                crate::PathValidationStatus::Misconfiguration,
            ));
        }

        let mut err = Error::Unrecognized;
        for b in &self.path_builders {
            match b.build_cert_chain(self, td, cps, target) {
                Ok(cp) => return Ok(cp),
                Err(e) => err = e,
            }
        }
        Err(err)
    }

    /// add_oid_lookup adds a [`OidLookup`] callback to the list used by oid_lookup.
    pub fn add_oid_lookup(&mut self, c: OidLookup) {
        self.oid_lookups.push(c);
    }

    /// clear_oid_lookups clears the list of [`OidLookup`] callbacks used by oid_lookup.
    pub fn clear_oid_lookups(&mut self) {
        self.oid_lookups.clear();
    }

    /// oid_lookup iterates over all registered oid_lookups until an authoritative answer is found
    /// or all options have been exhausted. The dotted form of the OID is returned in the latter case.
    pub fn oid_lookup(&self, oid: &ObjectIdentifier) -> String {
        for f in &self.oid_lookups {
            if let Ok(r) = f(oid) {
                return r;
            }
        }
        oid.to_string()
    }
}

/// `populate_ev_pki_environment` populates a [`PkiEnvironment`] instance with the Rust Crypto
/// hashing and signature verification callbacks and with [`PkixPathBuilder`] as the path builder.
pub fn populate_ev_pki_environment(pe: &mut PkiEnvironment) {
    pe.add_calculate_hash_callback(calculate_hash_rust_crypto);
    pe.add_verify_signature_message_callback(verify_signature_message_rust_crypto);
    pe.add_path_builder(Box::new(PkixPathBuilder::default()));
}
