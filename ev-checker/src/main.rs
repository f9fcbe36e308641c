#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

mod args;

use std::env;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, LevelFilter};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use evcheck::*;

use crate::args::*;

/// Names a YAML-formatted log4rs configuration file used in place of the default configuration
const LOG_CONFIG_VAR: &str = "EV_CHECKER_LOG_CONFIG";

/// Sends log output to standard error, using the file named by `EV_CHECKER_LOG_CONFIG` if present.
fn configure_logging() {
    if let Ok(logging_config) = env::var(LOG_CONFIG_VAR) {
        match log4rs::init_file(&logging_config, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!(
                "ERROR: failed to configure logging using {} with {:?}. Continuing with default logging.",
                logging_config, e
            ),
        }
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();
    match Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn))
    {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!(
                    "ERROR: failed to configure logging for stderr with {:?}. Continuing without logging.",
                    e
                );
            }
        }
        Err(e) => {
            eprintln!(
                "ERROR: failed to prepare default logging configuration with {:?}. Continuing without logging",
                e
            );
        }
    }
}

/// Reads the chain, prints the root's literal then validates the first certificate under the EV
/// policy. Every failure maps to exit code 1.
fn run(args: &EvCheckerArgs) -> ExitCode {
    let policy = match EvPolicy::new(args.oid, &args.description) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{} cannot be used as an EV policy: {}", args.oid, e);
            return ExitCode::from(1);
        }
    };

    let mut pe = PkiEnvironment::default();
    populate_ev_pki_environment(&mut pe);

    let chain = match CertificateChain::from_file(&args.certs) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Couldn't read certificates from '{}': {}",
                args.certs.display(),
                e
            );
            return ExitCode::from(1);
        }
    };
    let root = chain.last();
    let ee = chain.first();

    print!("{}", EvLiteral::new(&pe, root, &policy));

    let td = EvTrustDomain::new(root, policy, chain.iter());
    match check_ev_chain(&pe, &td, ee) {
        Ok(_) => {
            println!("Success!");
            ExitCode::SUCCESS
        }
        Err(Error::PolicyNotFound) => {
            eprintln!(
                "GetFirstEVPolicyForCert failed: {} does not assert EV policy {}",
                name_to_string(ee.subject()),
                args.oid
            );
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("BuildCertChain failed: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Point of entry for ev-checker.
fn main() -> ExitCode {
    let args = match EvCheckerArgs::try_parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: {}", e.kind());
            eprintln!("{}", USAGE);
            return ExitCode::from(1);
        }
    };

    configure_logging();
    debug!("ev-checker start");
    let rv = run(&args);
    debug!("ev-checker end");
    rv
}
