//! Wrappers around asn.1 encoder/decoder structures to support certification path processing

use der::{
    asn1::{BitString, ObjectIdentifier},
    Decode, DecodeValue, FixedTag, Header, Reader, Tag, TagNumber,
};
use log::error;
use spki::AlgorithmIdentifierOwned;
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, CertificatePolicies, ExtendedKeyUsage,
    InhibitAnyPolicy, KeyUsage, PolicyConstraints, SubjectAltName, SubjectKeyIdentifier,
};
use x509_cert::{name::Name, Certificate};

use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_POLICIES,
    ID_CE_EXT_KEY_USAGE, ID_CE_INHIBIT_ANY_POLICY, ID_CE_KEY_USAGE, ID_CE_POLICY_CONSTRAINTS,
    ID_CE_SUBJECT_ALT_NAME, ID_CE_SUBJECT_KEY_IDENTIFIER,
};

use crate::util::error::*;
use crate::validator::pdv_extension::*;

/// [`ParsedCertificate`] aggregates a binary, DER-encoded Certificate, the parsed Certificate, the
/// extensions of interest and the exact encodings of the identifying fields that are emitted when
/// the certificate is rendered as a trust anchor literal.
///
/// Instances are never mutated after materialization.
#[derive(Clone, Eq, PartialEq)]
#[readonly::make]
pub struct ParsedCertificate {
    /// Binary, encoded Certificate object
    pub encoded_cert: Vec<u8>,
    /// Decoded Certificate object
    pub decoded_cert: Certificate,
    /// Parsed extensions from the Certificate (see [`EXTS_OF_INTEREST`])
    pub parsed_extensions: ParsedExtensions,
    /// DER encoding of the issuer Name exactly as it appears in `encoded_cert`
    pub raw_issuer: Vec<u8>,
    /// DER encoding of the subject Name exactly as it appears in `encoded_cert`
    pub raw_subject: Vec<u8>,
    /// Where the certificate came from, i.e., `chain.pem#2`
    pub locator: String,
}

impl TryFrom<&[u8]> for ParsedCertificate {
    type Error = Error;

    fn try_from(enc_cert: &[u8]) -> Result<Self> {
        parse_cert(enc_cert, "")
    }
}

impl ParsedCertificate {
    /// Returns the issuer name of the certificate
    pub fn issuer(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.issuer
    }

    /// Returns the subject name of the certificate
    pub fn subject(&self) -> &Name {
        &self.decoded_cert.tbs_certificate.subject
    }

    /// Returns the content octets of the serial number INTEGER, including any leading zero octet
    pub fn raw_serial(&self) -> &[u8] {
        self.decoded_cert.tbs_certificate.serial_number.as_bytes()
    }

    /// Returns true if the certificate features a basicConstraints extension with cA set to true
    pub fn is_ca(&self) -> bool {
        matches!(
            self.parsed_extensions.get(&ID_CE_BASIC_CONSTRAINTS),
            Some(PDVExtension::BasicConstraints(bc)) if bc.ca
        )
    }

    /// Returns the policy OIDs asserted in the certificatePolicies extension, in the order they
    /// appear, or an empty vector if the extension is absent.
    pub fn get_policies(&self) -> Vec<ObjectIdentifier> {
        match self.parsed_extensions.get(&ID_CE_CERTIFICATE_POLICIES) {
            Some(PDVExtension::CertificatePolicies(cp)) => {
                cp.0.iter().map(|pi| pi.policy_identifier).collect()
            }
            _ => vec![],
        }
    }
}

impl ExtensionProcessing for ParsedCertificate {
    /// `get_extension` takes an ObjectIdentifier that identifies an extension type and returns
    /// a previously parsed [`PDVExtension`] instance containing the decoded extension if the extension was present.
    fn get_extension(&self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>> {
        Ok(self.parsed_extensions.get(oid))
    }

    fn parse_extensions(&'_ mut self, oids: &[ObjectIdentifier]) {
        for oid in oids {
            if let Err(e) = self.parse_extension(oid) {
                error!(
                    "Failed to parse extension {} from certificate at {}: {}",
                    oid, self.locator, e
                );
            }
        }
    }

    fn parse_extension(&mut self, oid: &ObjectIdentifier) -> Result<Option<&PDVExtension>> {
        macro_rules! add_and_return {
            ($pe:ident, $v:ident, $t:ident) => {{
                let ext = PDVExtension::$t($t::from_der($v)?);
                $pe.insert(*oid, ext);
                return Ok($pe.get(oid));
            }};
        }

        let pe = &mut self.parsed_extensions;
        if pe.contains_key(oid) {
            return Ok(pe.get(oid));
        }

        if let Some(exts) = self.decoded_cert.tbs_certificate.extensions.as_ref() {
            if let Some(i) = exts.iter().find(|&ext| ext.extn_id == *oid) {
                let v = i.extn_value.as_bytes();
                match *oid {
                    ID_CE_BASIC_CONSTRAINTS => add_and_return!(pe, v, BasicConstraints),
                    ID_CE_SUBJECT_KEY_IDENTIFIER => add_and_return!(pe, v, SubjectKeyIdentifier),
                    ID_CE_EXT_KEY_USAGE => add_and_return!(pe, v, ExtendedKeyUsage),
                    ID_CE_KEY_USAGE => add_and_return!(pe, v, KeyUsage),
                    ID_CE_SUBJECT_ALT_NAME => add_and_return!(pe, v, SubjectAltName),
                    ID_CE_CERTIFICATE_POLICIES => add_and_return!(pe, v, CertificatePolicies),
                    ID_CE_AUTHORITY_KEY_IDENTIFIER => {
                        add_and_return!(pe, v, AuthorityKeyIdentifier)
                    }
                    ID_CE_POLICY_CONSTRAINTS => add_and_return!(pe, v, PolicyConstraints),
                    ID_CE_INHIBIT_ANY_POLICY => add_and_return!(pe, v, InhibitAnyPolicy),
                    _ => {
                        // ignore unrecognized
                    }
                }
            }
        }
        Ok(None)
    }
}

/// [`DeferDecodeSigned`] used to parse only the top-level Certificate structure, without parsing the details of the
/// TBSCertificate, AlgorithmIdentifier or BIT STRING fields.
///
/// Deferred decoding is used when verifying certificates to avoid re-encoding the TBSCertificate
/// (and potentially encountering problems with structures that were not DER-encoded prior to signing).
pub struct DeferDecodeSigned {
    /// tbsCertificate       TBSCertificate,
    pub tbs_field: Vec<u8>,
    /// signatureAlgorithm   AlgorithmIdentifier,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    /// signature            BIT STRING
    pub signature: BitString,
}

impl FixedTag for DeferDecodeSigned {
    const TAG: Tag = Tag::Sequence;
}

impl<'a> DecodeValue<'a> for DeferDecodeSigned {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let tbs_certificate = reader.tlv_bytes()?;
            let signature_algorithm = reader.decode()?;
            let signature = reader.decode()?;
            Ok(Self {
                tbs_field: tbs_certificate.to_vec(),
                signature_algorithm,
                signature,
            })
        })
    }
}

/// [`DeferDecodeTbsNames`] walks a TBSCertificate and captures the issuer and subject fields as
/// encoded, skipping over everything else.
pub struct DeferDecodeTbsNames {
    /// issuer               Name,
    pub issuer: Vec<u8>,
    /// subject              Name,
    pub subject: Vec<u8>,
}

impl FixedTag for DeferDecodeTbsNames {
    const TAG: Tag = Tag::Sequence;
}

impl<'a> DecodeValue<'a> for DeferDecodeTbsNames {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let version_tag = Tag::ContextSpecific {
                constructed: true,
                number: TagNumber::N0,
            };
            if reader.peek_tag()? == version_tag {
                reader.tlv_bytes()?;
            }
            // serialNumber, signature
            reader.tlv_bytes()?;
            reader.tlv_bytes()?;
            let issuer = reader.tlv_bytes()?.to_vec();
            // validity
            reader.tlv_bytes()?;
            let subject = reader.tlv_bytes()?.to_vec();
            while !reader.is_finished() {
                reader.tlv_bytes()?;
            }
            Ok(Self { issuer, subject })
        })
    }
}

/// `parse_cert` takes a buffer containing a binary DER encoded certificate and returns
/// a [`ParsedCertificate`] containing the parsed certificate if parsing was successful.
///
/// The `locator` is retained for use in diagnostics.
pub fn parse_cert(buffer: &[u8], locator: &str) -> Result<ParsedCertificate> {
    let cert = match Certificate::from_der(buffer) {
        Ok(cert) => cert,
        Err(e) => {
            error!("Failed to parse certificate from {}: {}", locator, e);
            return Err(Error::Asn1Error(e));
        }
    };

    let defer_cert = DeferDecodeSigned::from_der(buffer)?;
    let names = DeferDecodeTbsNames::from_der(&defer_cert.tbs_field)?;

    let mut pdvcert = ParsedCertificate {
        encoded_cert: buffer.to_vec(),
        decoded_cert: cert,
        parsed_extensions: ParsedExtensions::new(),
        raw_issuer: names.issuer,
        raw_subject: names.subject,
        locator: locator.to_string(),
    };
    pdvcert.parse_extensions(EXTS_OF_INTEREST);
    Ok(pdvcert)
}
