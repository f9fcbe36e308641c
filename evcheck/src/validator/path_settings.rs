//! Structures and functions related to configuring certification path processing operations

use std::collections::{BTreeMap, BTreeSet};

use const_oid::db::rfc5912::ANY_EXTENDED_KEY_USAGE;
use der::asn1::ObjectIdentifier;

use crate::util::pdv_utilities::get_now_as_unix_epoch;

/// `ObjectIdentifierSet` is a typedef for a set of ObjectIdentifier values.
pub type ObjectIdentifierSet = BTreeSet<ObjectIdentifier>;

/// `CertificationPathSettings` is a variant map keyed by the `PS_*` names defined in this module.
/// Values are read and written via the `get_*` and `set_*` functions, which supply defaults for
/// absent entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificationPathSettings(pub BTreeMap<String, CertificationPathProcessingTypes>);

impl CertificationPathSettings {
    /// Creates a new empty [`CertificationPathSettings`]
    pub fn new() -> Self {
        Self::default()
    }
}

/// `EndEntityOrCa` indicates what sort of certificate the target of a certification path must be.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EndEntityOrCa {
    /// The target must not be a CA certificate
    MustBeEndEntity,
    /// The target must be a CA certificate
    MustBeCa,
    /// Either sort of certificate is acceptable
    Either,
}

/// `CertificationPathProcessingTypes` is used to define a variant map with types associated with
/// performing certification path building and validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CertificationPathProcessingTypes {
    /// Represents u64 values
    U64(u64),
    /// Represents usize values
    Usize(usize),
    /// Represents EndEntityOrCa values
    EndEntityOrCa(EndEntityOrCa),
    /// Represents sets of object identifiers
    ObjectIdentifierSet(ObjectIdentifierSet),
}

/// `PS_TIME_OF_INTEREST` is used to retrieve a u64 value containing seconds since Unix epoch. The
/// validity periods of certificates in the path are evaluated against it. Zero disables the check.
/// By default, the value is set to current time.
pub static PS_TIME_OF_INTEREST: &str = "psTimeOfInterest";

/// `PS_END_ENTITY_OR_CA` is used to retrieve an [`EndEntityOrCa`] value governing the target
/// certificate. By default, the target must be an end entity.
pub static PS_END_ENTITY_OR_CA: &str = "psEndEntityOrCa";

/// `PS_MAX_CHAIN_LENGTH` is used to retrieve a usize value limiting the number of certificates in a
/// path, counting both the target and the trust anchor. By default, the value is 0, meaning no limit.
pub static PS_MAX_CHAIN_LENGTH: &str = "psMaxChainLength";

/// `PS_EXTENDED_KEY_USAGE` is used to retrieve an ObjectIdentifierSet containing acceptable key
/// purposes. By default, the set contains only anyExtendedKeyUsage, which disables EKU checks.
pub static PS_EXTENDED_KEY_USAGE: &str = "psExtendedKeyUsage";

/// `PS_INITIAL_POLICY_SET` is used to retrieve an ObjectIdentifierSet containing the certificate
/// policies that are acceptable. There is no default; an absent or empty set means no policy is
/// required.
pub static PS_INITIAL_POLICY_SET: &str = "psInitialPolicySet";

/// `PS_MAX_PATH_LENGTH_CONSTRAINT` caps the depth explored while building paths
pub static PS_MAX_PATH_LENGTH_CONSTRAINT: usize = 15;

/// Returns the time of interest from the settings, or the current time if absent
pub fn get_time_of_interest(cps: &CertificationPathSettings) -> u64 {
    match cps.0.get(PS_TIME_OF_INTEREST) {
        Some(CertificationPathProcessingTypes::U64(v)) => *v,
        _ => get_now_as_unix_epoch(),
    }
}

/// Sets the time of interest, expressed as seconds since Unix epoch
pub fn set_time_of_interest(cps: &mut CertificationPathSettings, v: u64) {
    cps.0.insert(
        PS_TIME_OF_INTEREST.to_string(),
        CertificationPathProcessingTypes::U64(v),
    );
}

/// Returns the end entity or CA discriminator from the settings
pub fn get_end_entity_or_ca(cps: &CertificationPathSettings) -> EndEntityOrCa {
    match cps.0.get(PS_END_ENTITY_OR_CA) {
        Some(CertificationPathProcessingTypes::EndEntityOrCa(v)) => *v,
        _ => EndEntityOrCa::MustBeEndEntity,
    }
}

/// Sets the end entity or CA discriminator
pub fn set_end_entity_or_ca(cps: &mut CertificationPathSettings, v: EndEntityOrCa) {
    cps.0.insert(
        PS_END_ENTITY_OR_CA.to_string(),
        CertificationPathProcessingTypes::EndEntityOrCa(v),
    );
}

/// Returns the maximum chain length from the settings, where 0 means unbounded
pub fn get_max_chain_length(cps: &CertificationPathSettings) -> usize {
    match cps.0.get(PS_MAX_CHAIN_LENGTH) {
        Some(CertificationPathProcessingTypes::Usize(v)) => *v,
        _ => 0,
    }
}

/// Sets the maximum chain length, where 0 means unbounded
pub fn set_max_chain_length(cps: &mut CertificationPathSettings, v: usize) {
    cps.0.insert(
        PS_MAX_CHAIN_LENGTH.to_string(),
        CertificationPathProcessingTypes::Usize(v),
    );
}

/// Returns the acceptable key purposes from the settings
pub fn get_extended_key_usage(cps: &CertificationPathSettings) -> ObjectIdentifierSet {
    match cps.0.get(PS_EXTENDED_KEY_USAGE) {
        Some(CertificationPathProcessingTypes::ObjectIdentifierSet(v)) => v.clone(),
        _ => BTreeSet::from([ANY_EXTENDED_KEY_USAGE]),
    }
}

/// Sets the acceptable key purposes
pub fn set_extended_key_usage(cps: &mut CertificationPathSettings, v: ObjectIdentifierSet) {
    cps.0.insert(
        PS_EXTENDED_KEY_USAGE.to_string(),
        CertificationPathProcessingTypes::ObjectIdentifierSet(v),
    );
}

/// Returns the acceptable certificate policies from the settings, if any
pub fn get_initial_policy_set(cps: &CertificationPathSettings) -> ObjectIdentifierSet {
    match cps.0.get(PS_INITIAL_POLICY_SET) {
        Some(CertificationPathProcessingTypes::ObjectIdentifierSet(v)) => v.clone(),
        _ => BTreeSet::new(),
    }
}

/// Sets the acceptable certificate policies
pub fn set_initial_policy_set(cps: &mut CertificationPathSettings, v: ObjectIdentifierSet) {
    cps.0.insert(
        PS_INITIAL_POLICY_SET.to_string(),
        CertificationPathProcessingTypes::ObjectIdentifierSet(v),
    );
}

#[test]
fn path_settings_defaults() {
    let mut cps = CertificationPathSettings::new();
    assert!(get_time_of_interest(&cps) > 1_600_000_000);
    assert_eq!(EndEntityOrCa::MustBeEndEntity, get_end_entity_or_ca(&cps));
    assert_eq!(0, get_max_chain_length(&cps));
    assert!(get_extended_key_usage(&cps).contains(&ANY_EXTENDED_KEY_USAGE));
    assert!(get_initial_policy_set(&cps).is_empty());

    set_time_of_interest(&mut cps, 0);
    set_end_entity_or_ca(&mut cps, EndEntityOrCa::MustBeCa);
    set_max_chain_length(&mut cps, 3);
    let policy = ObjectIdentifier::new_unwrap("2.23.140.1.1");
    set_initial_policy_set(&mut cps, BTreeSet::from([policy]));
    assert_eq!(0, get_time_of_interest(&cps));
    assert_eq!(EndEntityOrCa::MustBeCa, get_end_entity_or_ca(&cps));
    assert_eq!(3, get_max_chain_length(&cps));
    assert!(get_initial_policy_set(&cps).contains(&policy));
}
