//! Renders a root certificate as a trust anchor literal suitable for pasting into a table of EV
//! roots:
//!
//! ```text
//! // CN=Example Root,O=Example
//! "1.3.6.1.4.1.99999.1",
//! "Example EV policy",
//! SEC_OID_UNKNOWN,
//! { 0x9A, 0x1B, ..., 0x..,
//!   0x.., ..., 0x..,
//!   0x.., ..., 0x.. },
//! "MDAxFzAVBgNVBAoMDkV4YW1wbGUgUm9vdCBDQTEVMBMGA1UEAwwMRXhhbXBsZSBS",
//! "b290",
//! "AQ==",
//! ```
//!
//! Output is a pure function of the certificate bytes and the policy.

use core::fmt;

use base64ct::{Base64, Encoding};
use log::error;
use spki::AlgorithmIdentifierOwned;

use crate::{
    environment::pki_environment::PkiEnvironment, trust::ev_trust_domain::EvPolicy,
    util::error::*, util::pdv_alg_oids::PKIXALG_SHA256, util::pdv_utilities::name_to_string,
    ParsedCertificate,
};

/// Number of Base64 characters per quoted line
pub const BASE64_LINE_LEN: usize = 64;

/// Marker emitted in place of a registered OID tag
pub const SEC_OID_UNKNOWN: &str = "SEC_OID_UNKNOWN,";

/// `format_sha256_block` renders a SHA-256 digest as uppercase hex byte values grouped 11, 11 and
/// 10 per line within braces. Every value but the last is followed by `", "`, including the values
/// that end the first two lines. Digests of any length other than 32 bytes are rejected.
pub fn format_sha256_block(digest: &[u8]) -> Result<String> {
    if digest.len() != 32 {
        return Err(Error::LengthError);
    }
    let mut block = String::from("{ ");
    for (i, b) in digest.iter().enumerate() {
        block.push_str(&format!("0x{:02X}", b));
        match i {
            10 | 21 => block.push_str(", \n  "),
            31 => block.push_str(" },"),
            _ => block.push_str(", "),
        }
    }
    Ok(block)
}

/// `base64_block` renders `data` as Base64 split into quoted lines of [`BASE64_LINE_LEN`]
/// characters. Each full line stands alone and the remainder, possibly empty, is always emitted
/// last and followed by a comma. Empty input and input encoding to an exact multiple of the line
/// length therefore end with `"",`.
pub fn base64_block(data: &[u8]) -> String {
    let encoded = Base64::encode_string(data);
    let full = encoded.len() / BASE64_LINE_LEN * BASE64_LINE_LEN;
    let mut block = String::with_capacity(encoded.len() + 4 * (encoded.len() / BASE64_LINE_LEN + 1));
    for line in encoded[..full].as_bytes().chunks(BASE64_LINE_LEN) {
        // Base64 output is ASCII so byte chunks are always valid UTF-8
        block.push('"');
        block.push_str(&String::from_utf8_lossy(line));
        block.push_str("\"\n");
    }
    block.push('"');
    block.push_str(&encoded[full..]);
    block.push_str("\",");
    block
}

fn quote(s: &str) -> String {
    let mut q = String::with_capacity(s.len() + 2);
    q.push('"');
    for c in s.chars() {
        match c {
            '"' => q.push_str("\\\""),
            '\\' => q.push_str("\\\\"),
            _ => q.push(c),
        }
    }
    q.push('"');
    q
}

/// `EvLiteral` captures everything needed to render a root certificate as a trust anchor literal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EvLiteral {
    /// Issuer name of the root in string form
    pub issuer: String,
    /// Dotted-decimal EV policy OID
    pub oid: String,
    /// Description of the EV policy
    pub description: String,
    /// SHA-256 digest of the root's DER encoding, absent if hashing failed
    pub fingerprint: Option<Vec<u8>>,
    /// DER encoding of the root's issuer name
    pub raw_issuer: Vec<u8>,
    /// Content octets of the root's serial number
    pub raw_serial: Vec<u8>,
}

impl EvLiteral {
    /// Collects the fields of the literal for `root`. A hashing failure is logged and leaves
    /// `fingerprint` empty.
    pub fn new(pe: &PkiEnvironment, root: &ParsedCertificate, policy: &EvPolicy) -> Self {
        let sha256 = AlgorithmIdentifierOwned {
            oid: PKIXALG_SHA256,
            parameters: None,
        };
        let fingerprint = match pe.calculate_hash(pe, &sha256, &root.encoded_cert) {
            Ok(d) => Some(d),
            Err(e) => {
                error!(
                    "Failed to calculate SHA-256 fingerprint of {}: {}",
                    root.locator, e
                );
                None
            }
        };
        EvLiteral {
            issuer: name_to_string(root.issuer()),
            oid: policy.oid.to_string(),
            description: policy.description.clone(),
            fingerprint,
            raw_issuer: root.raw_issuer.clone(),
            raw_serial: root.raw_serial().to_vec(),
        }
    }
}

impl fmt::Display for EvLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// {}", self.issuer)?;
        writeln!(f, "{},", quote(&self.oid))?;
        writeln!(f, "{},", quote(&self.description))?;
        writeln!(f, "{}", SEC_OID_UNKNOWN)?;
        if let Some(fp) = &self.fingerprint {
            match format_sha256_block(fp) {
                Ok(block) => writeln!(f, "{}", block)?,
                Err(e) => error!("Failed to render fingerprint: {}", e),
            }
        }
        writeln!(f, "{}", base64_block(&self.raw_issuer))?;
        writeln!(f, "{}", base64_block(&self.raw_serial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn sha256_block_layout() {
        let digest = hex!("BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD");
        let expected = "{ 0xBA, 0x78, 0x16, 0xBF, 0x8F, 0x01, 0xCF, 0xEA, 0x41, 0x41, 0x40, \n  0xDE, 0x5D, 0xAE, 0x22, 0x23, 0xB0, 0x03, 0x61, 0xA3, 0x96, 0x17, \n  0x7A, 0x9C, 0xB4, 0x10, 0xFF, 0x61, 0xF2, 0x00, 0x15, 0xAD },";
        assert_eq!(expected, format_sha256_block(&digest).unwrap());

        let lines: Vec<&str> = expected.lines().collect();
        assert_eq!(11, lines[0].matches("0x").count());
        assert_eq!(11, lines[1].matches("0x").count());
        assert_eq!(10, lines[2].matches("0x").count());
        assert!(lines[0].ends_with("0x40, "));
        assert!(lines[1].ends_with("0x17, "));
    }

    #[test]
    fn sha256_block_rejects_other_lengths() {
        assert_eq!(Err(Error::LengthError), format_sha256_block(&[0u8; 20]));
        assert_eq!(Err(Error::LengthError), format_sha256_block(&[]));
    }

    #[test]
    fn base64_block_wrapping() {
        assert_eq!("\"\",", base64_block(&[]));
        assert_eq!("\"AQ==\",", base64_block(&[1]));

        // 48 bytes encode to exactly 64 characters: the full line stands alone, then an empty
        // remainder line carries the comma
        let exact = base64_block(&[0u8; 48]);
        let lines: Vec<&str> = exact.lines().collect();
        assert_eq!(2, lines.len());
        assert_eq!(format!("\"{}\"", "A".repeat(64)), lines[0]);
        assert_eq!("\"\",", lines[1]);

        let data: Vec<u8> = (0u8..=200).collect();
        let block = base64_block(&data);
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(5, lines.len());
        for l in &lines[..lines.len() - 1] {
            assert_eq!(66, l.len());
            assert!(l.starts_with('"') && l.ends_with('"'));
        }
        assert!(lines[lines.len() - 1].ends_with("\","));

        let rejoined: String = lines
            .iter()
            .map(|l| l.trim_end_matches(',').trim_matches('"'))
            .collect();
        assert_eq!(Base64::encode_string(&data), rejoined);
    }

    #[test]
    fn literal_rendering() {
        let lit = EvLiteral {
            issuer: "CN=Root".to_string(),
            oid: "1.3.6.1.4.1.99999.1".to_string(),
            description: "Test \"EV\"".to_string(),
            fingerprint: Some(vec![0xAB; 32]),
            raw_issuer: vec![0x30, 0x00],
            raw_serial: vec![0x01],
        };
        let text = lit.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!("// CN=Root", lines[0]);
        assert_eq!("\"1.3.6.1.4.1.99999.1\",", lines[1]);
        assert_eq!("\"Test \\\"EV\\\"\",", lines[2]);
        assert_eq!("SEC_OID_UNKNOWN,", lines[3]);
        assert!(lines[4].starts_with("{ 0xAB"));
        assert!(lines[6].ends_with(" },"));
        assert_eq!("\"MAA=\",", lines[7]);
        assert_eq!("\"AQ==\",", lines[8]);
        assert_eq!(9, lines.len());
    }

    #[test]
    fn literal_without_fingerprint() {
        let lit = EvLiteral {
            issuer: "CN=Root".to_string(),
            oid: "1.2.3".to_string(),
            description: "d".to_string(),
            fingerprint: None,
            raw_issuer: vec![0x30, 0x00],
            raw_serial: vec![0x01],
        };
        let text = lit.to_string();
        assert!(!text.contains("0x"));
        assert_eq!(6, text.lines().count());
    }
}
