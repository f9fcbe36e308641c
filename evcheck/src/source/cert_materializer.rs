//! Converts the Base64 payload of a PEM block into a parsed certificate

use base64ct::{Base64, Encoding};
use log::debug;

use crate::{
    source::pem_decoder::PemBlock, util::error::*, validator::pdv_certificate::parse_cert,
    ParsedCertificate,
};

/// `expected_decoded_len` returns the exact number of bytes `payload` decodes to: three bytes per
/// four characters, less one for each trailing `=`. Payloads that are empty or whose length is not
/// a multiple of four are rejected.
pub fn expected_decoded_len(payload: &str) -> Result<usize> {
    let len = payload.len();
    if len == 0 || len % 4 != 0 {
        return Err(Error::LengthError);
    }
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    if padding > 2 {
        return Err(Error::Base64Error(base64ct::Error::InvalidEncoding));
    }
    Ok(len / 4 * 3 - padding)
}

/// `decode_base64_cert` decodes `payload` into a buffer sized by [`expected_decoded_len`]. Decoding
/// that yields any other number of bytes is an error.
pub fn decode_base64_cert(payload: &str) -> Result<Vec<u8>> {
    let expected = expected_decoded_len(payload)?;
    let mut buf = vec![0u8; expected];
    let decoded_len = Base64::decode(payload.as_bytes(), &mut buf)?.len();
    if decoded_len != expected {
        debug!(
            "Base64 payload decoded to {} bytes, expected {}",
            decoded_len, expected
        );
        return Err(Error::LengthError);
    }
    Ok(buf)
}

/// `materialize_certificate` decodes the payload of `block` and parses the result as a DER encoded
/// certificate. The block's locator is attached to the resulting [`ParsedCertificate`].
pub fn materialize_certificate(block: &PemBlock) -> Result<ParsedCertificate> {
    let der = decode_base64_cert(&block.payload)?;
    parse_cert(&der, &block.locator)
}
