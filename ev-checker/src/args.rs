//! Command line arguments for ev-checker

use std::path::PathBuf;

use clap::Parser;
use der::asn1::ObjectIdentifier;

/// Usage text printed to standard error when the command line cannot be parsed
pub const USAGE: &str = "Usage: ev-checker <-c certificate list file (PEM format)> <-o dotted EV policy OID> <-d EV policy description>

(the certificate list is expected to have the root first, followed by one or more intermediates, followed by the end-entity certificate)";

/// Checks that an end-entity certificate validates to a root under an EV policy and prints the
/// root's trust anchor literal
///
/// Only `-c`, `-o` and `-d` are recognized. The built-in help and version flags are disabled so
/// that `-h` and `-V` are treated like any other unrecognized flag.
#[derive(Parser, Debug)]
#[clap(author, about, long_about = None, disable_help_flag = true, disable_version_flag = true)]
pub struct EvCheckerArgs {
    /// Certificate list file (PEM format). The first certificate is validated and the last is
    /// used as the root.
    #[clap(short = 'c', long = "certs")]
    pub certs: PathBuf,

    /// Dotted EV policy OID, i.e., 2.23.140.1.1
    #[clap(short = 'o', long = "oid", value_parser = parse_dotted_oid)]
    pub oid: ObjectIdentifier,

    /// EV policy description
    #[clap(short = 'd', long = "description")]
    pub description: String,
}

/// Parses a dotted-decimal OID
fn parse_dotted_oid(s: &str) -> Result<ObjectIdentifier, String> {
    ObjectIdentifier::new(s).map_err(|e| format!("{s} is not a dotted EV policy OID: {e}"))
}
