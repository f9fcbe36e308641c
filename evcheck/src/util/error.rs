//! Error types

use core::fmt;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Reason a certification path was rejected. Each value names the check that rejected the path and
/// doubles as the diagnostic reported to the operator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PathValidationStatus {
    /// NameChainingFailure occurs when the issuer name of a certificate does not match the subject
    /// name of the certificate that was used to verify it.
    NameChainingFailure,
    /// SignatureVerificationFailure occurs when the subject public key of a superior certificate does
    /// not verify the signature of the immediately subordinate certificate.
    SignatureVerificationFailure,
    /// InvalidNotBeforeDate occurs when a certificate contains a notBefore date that is after the
    /// time of interest used for validation.
    InvalidNotBeforeDate,
    /// InvalidNotAfterDate occurs when a certificate contains a notAfter date that is before the
    /// time of interest used for validation.
    InvalidNotAfterDate,
    /// MissingBasicConstraints occurs when an issuing certificate does not contain a
    /// basicConstraints extension.
    MissingBasicConstraints,
    /// InvalidBasicConstraints occurs when an issuing certificate contains a basicConstraints
    /// extension with the cA field set to false.
    InvalidBasicConstraints,
    /// InvalidPathLength occurs when a path is longer than permitted by a pathLenConstraint or by
    /// the maximum chain length setting.
    InvalidPathLength,
    /// InvalidKeyUsage occurs when an issuing certificate asserts a keyUsage extension without
    /// keyCertSign.
    InvalidKeyUsage,
    /// InvalidExtendedKeyUsage occurs when a certificate carries an extendedKeyUsage extension that
    /// does not include the required key purpose.
    InvalidExtendedKeyUsage,
    /// PolicyValidationFailure occurs when a certificate in the path does not assert the required
    /// certificate policy (or anyPolicy, for CA certificates).
    PolicyValidationFailure,
    /// UnprocessedCriticalExtension occurs when a certificate features a critical extension that
    /// is not understood.
    UnprocessedCriticalExtension,
    /// CaCertUsedAsEndEntity occurs when the target must be an end entity but is a CA certificate.
    CaCertUsedAsEndEntity,
    /// EndEntityCertUsedAsCa occurs when the target must be a CA but is an end entity certificate.
    EndEntityCertUsedAsCa,
    /// ProhibitedAlg occurs when a signature or public key algorithm is not supported.
    ProhibitedAlg,
    /// EncodingError occurs when an object cannot be parsed.
    EncodingError,
    /// NoPathsFound occurs when no issuer could be found for a certificate in the path.
    NoPathsFound,
    /// A configuration error was detected. See textual log output for more details.
    Misconfiguration,
}

/// Error type
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// PathValidationError encountered
    PathValidation(PathValidationStatus),
    /// NotFound occurs when an action failed because a necessary artifact was not found.
    NotFound,
    /// PolicyNotFound occurs when a certificate asserts no recognized EV policy.
    PolicyNotFound,
    /// NoCertificatesFound occurs when an input yields no usable certificates.
    NoCertificatesFound,
    /// Unrecognized occurs when an error conditions does not match anything else here.
    Unrecognized,
    /// An artifact did not conform to length requirements
    LengthError,
    /// An artifact could not be parsed
    ParseError,
    /// Asn1Error is used to propagate error information from the der and x509-cert crates.
    Asn1Error(der::Error),
    /// Base64Error is used to propagate error information from the base64ct crate.
    Base64Error(base64ct::Error),
    /// Error encapsulates an error derived from [std::io::ErrorKind]
    StdIoError(std::io::ErrorKind),
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1Error(err)
    }
}

impl From<base64ct::Error> for Error {
    fn from(err: base64ct::Error) -> Error {
        Error::Base64Error(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::StdIoError(err.kind())
    }
}

impl fmt::Display for PathValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValidationStatus::NameChainingFailure => write!(f, "Name chaining failure"),
            PathValidationStatus::SignatureVerificationFailure => {
                write!(f, "Signature verification failure")
            }
            PathValidationStatus::InvalidNotBeforeDate => write!(f, "InvalidNotBeforeDate"),
            PathValidationStatus::InvalidNotAfterDate => write!(f, "InvalidNotAfterDate"),
            PathValidationStatus::MissingBasicConstraints => write!(f, "MissingBasicConstraints"),
            PathValidationStatus::InvalidBasicConstraints => write!(f, "InvalidBasicConstraints"),
            PathValidationStatus::InvalidPathLength => write!(f, "InvalidPathLength"),
            PathValidationStatus::InvalidKeyUsage => write!(f, "InvalidKeyUsage"),
            PathValidationStatus::InvalidExtendedKeyUsage => write!(f, "InvalidExtendedKeyUsage"),
            PathValidationStatus::PolicyValidationFailure => write!(f, "PolicyValidationFailure"),
            PathValidationStatus::UnprocessedCriticalExtension => {
                write!(f, "UnprocessedCriticalExtension")
            }
            PathValidationStatus::CaCertUsedAsEndEntity => write!(f, "CaCertUsedAsEndEntity"),
            PathValidationStatus::EndEntityCertUsedAsCa => write!(f, "EndEntityCertUsedAsCa"),
            PathValidationStatus::ProhibitedAlg => write!(f, "ProhibitedAlg"),
            PathValidationStatus::EncodingError => write!(f, "EncodingError"),
            PathValidationStatus::NoPathsFound => write!(f, "NoPathsFound"),
            PathValidationStatus::Misconfiguration => write!(f, "Misconfiguration"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PathValidation(err) => write!(f, "PathValidationError: {}", err),
            Error::NotFound => write!(f, "NotFound"),
            Error::PolicyNotFound => write!(f, "PolicyNotFound"),
            Error::NoCertificatesFound => write!(f, "NoCertificatesFound"),
            Error::Unrecognized => write!(f, "Unrecognized"),
            Error::LengthError => write!(f, "LengthError"),
            Error::ParseError => write!(f, "ParseError"),
            Error::Asn1Error(err) => write!(f, "Asn1Error: {}", err),
            Error::Base64Error(err) => write!(f, "Base64Error: {}", err),
            Error::StdIoError(err) => write!(f, "StdError: {:?}", err),
        }
    }
}

impl std::error::Error for Error {}

#[test]
fn error_test() {
    assert_eq!("NoPathsFound", format!("{}", PathValidationStatus::NoPathsFound));
    assert_eq!(
        "Name chaining failure",
        format!("{}", PathValidationStatus::NameChainingFailure)
    );
    assert_eq!(
        "PathValidationError: Signature verification failure",
        format!(
            "{}",
            Error::PathValidation(PathValidationStatus::SignatureVerificationFailure)
        )
    );
    assert_eq!(
        "PathValidationError: PolicyValidationFailure",
        format!(
            "{}",
            Error::PathValidation(PathValidationStatus::PolicyValidationFailure)
        )
    );
    assert_eq!("PolicyNotFound", format!("{}", Error::PolicyNotFound));
    assert_eq!(
        "StdError: NotFound",
        format!("{}", Error::StdIoError(std::io::ErrorKind::NotFound))
    );
    let _s = format!("{}", Error::Base64Error(base64ct::Error::InvalidEncoding));
    let _s = format!("{}", Error::Base64Error(base64ct::Error::InvalidLength));
    let _s = format!("{}", PathValidationStatus::CaCertUsedAsEndEntity);
    let _s = format!("{}", PathValidationStatus::UnprocessedCriticalExtension);
}
