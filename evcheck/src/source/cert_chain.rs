//! Assembles the ordered list of certificates that is presented for EV validation

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{error, info, warn};

use crate::{
    source::cert_materializer::materialize_certificate, source::pem_decoder::PemBlocks,
    util::error::*, util::pdv_utilities::is_self_issued, util::pdv_utilities::name_to_string,
    ParsedCertificate,
};

/// `CertificateChain` holds the certificates read from a PEM source in the order they appeared.
///
/// The first certificate is the validation target and the last one is the trust root. A chain
/// holding a single certificate uses it for both roles. A `CertificateChain` is never empty.
#[derive(Clone)]
pub struct CertificateChain {
    certs: Vec<ParsedCertificate>,
}

impl CertificateChain {
    /// `from_reader` reads every certificate block from `reader`. Blocks that cannot be decoded or
    /// parsed are logged and skipped. Reading stops at the first I/O error, which is returned.
    /// When no certificate could be materialized, `Error::NoCertificatesFound` is returned.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<CertificateChain> {
        let mut certs = vec![];
        for block in PemBlocks::new(reader, source) {
            let block = block?;
            match materialize_certificate(&block) {
                Ok(cert) => certs.push(cert),
                Err(e) => error!("Skipping certificate at {}: {}", block.locator, e),
            }
        }

        if certs.is_empty() {
            error!("No certificates were read from {}", source);
            return Err(Error::NoCertificatesFound);
        }

        if certs.len() > 1 && is_self_issued(&certs[0].decoded_cert) {
            warn!(
                "The first certificate in {} ({}) is self-issued; the first certificate is treated as the end-entity certificate and the last as the root",
                source,
                name_to_string(certs[0].subject())
            );
        }
        info!("Read {} certificate(s) from {}", certs.len(), source);
        Ok(CertificateChain { certs })
    }

    /// `from_file` opens the file at `path` and reads it with [`CertificateChain::from_reader`].
    pub fn from_file(path: &Path) -> Result<CertificateChain> {
        let f = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to open {}: {}", path.display(), e);
                return Err(e.into());
            }
        };
        let source = path.to_string_lossy();
        Self::from_reader(BufReader::new(f), &source)
    }

    /// Returns the validation target, i.e., the first certificate read
    pub fn first(&self) -> &ParsedCertificate {
        &self.certs[0]
    }

    /// Returns the trust root, i.e., the last certificate read
    pub fn last(&self) -> &ParsedCertificate {
        &self.certs[self.certs.len() - 1]
    }

    /// Returns the number of certificates in the chain
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Always false, a `CertificateChain` holds at least one certificate
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// Iterates over the certificates in the order they were read
    pub fn iter(&self) -> std::slice::Iter<'_, ParsedCertificate> {
        self.certs.iter()
    }

    /// Returns the certificates as a slice, in the order they were read
    pub fn as_slice(&self) -> &[ParsedCertificate] {
        &self.certs
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a ParsedCertificate;
    type IntoIter = std::slice::Iter<'a, ParsedCertificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.iter()
    }
}
