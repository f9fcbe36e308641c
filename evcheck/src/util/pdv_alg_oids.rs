//! Algorithm OIDs recognized when hashing and verifying certificate signatures

use der::asn1::ObjectIdentifier;

// -------------------------------------------------------------------------------------------------
// Public key algorithms and named curves (PKIXAlgs-2009)
// -------------------------------------------------------------------------------------------------

/// rsaEncryption: 1.2.840.113549.1.1.1
pub const PKIXALG_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// id-ecPublicKey: 1.2.840.10045.2.1
pub const PKIXALG_EC_PUBLIC_KEY: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// secp256r1: 1.2.840.10045.3.1.7
pub const PKIXALG_SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// secp384r1: 1.3.132.0.34
pub const PKIXALG_SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

// -------------------------------------------------------------------------------------------------
// Signature algorithms
// -------------------------------------------------------------------------------------------------

/// ecdsa-with-SHA224: 1.2.840.10045.4.3.1
pub const PKIXALG_ECDSA_WITH_SHA224: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.1");

/// ecdsa-with-SHA256: 1.2.840.10045.4.3.2
pub const PKIXALG_ECDSA_WITH_SHA256: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

/// ecdsa-with-SHA384: 1.2.840.10045.4.3.3
pub const PKIXALG_ECDSA_WITH_SHA384: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");

/// ecdsa-with-SHA512: 1.2.840.10045.4.3.4
pub const PKIXALG_ECDSA_WITH_SHA512: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");

/// sha224WithRSAEncryption: 1.2.840.113549.1.1.14
pub const PKIXALG_SHA224_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.14");

/// sha256WithRSAEncryption: 1.2.840.113549.1.1.11
pub const PKIXALG_SHA256_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");

/// sha384WithRSAEncryption: 1.2.840.113549.1.1.12
pub const PKIXALG_SHA384_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");

/// sha512WithRSAEncryption: 1.2.840.113549.1.1.13
pub const PKIXALG_SHA512_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

// -------------------------------------------------------------------------------------------------
// Hash algorithms
// -------------------------------------------------------------------------------------------------

/// id-sha224: 2.16.840.1.101.3.4.2.4
pub const PKIXALG_SHA224: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.4");

/// id-sha256: 2.16.840.1.101.3.4.2.1
pub const PKIXALG_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");

/// id-sha384: 2.16.840.1.101.3.4.2.2
pub const PKIXALG_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2");

/// id-sha512: 2.16.840.1.101.3.4.2.3
pub const PKIXALG_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");
