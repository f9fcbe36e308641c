mod common;

use std::io::Cursor;

use const_oid::db::rfc5912::{ANY_EXTENDED_KEY_USAGE, ID_KP_CODE_SIGNING, ID_KP_SERVER_AUTH};
use der::asn1::ObjectIdentifier;

use common::*;
use evcheck::*;

fn read_chain(text: &str) -> CertificateChain {
    CertificateChain::from_reader(Cursor::new(text.as_bytes().to_vec()), "pv").unwrap()
}

fn settings() -> CertificationPathSettings {
    ev_path_settings(ObjectIdentifier::new_unwrap(EV_OID), get_now_as_unix_epoch())
}

#[test]
fn manual_path() {
    let chain = read_chain(&default_chain().pem());
    let certs = chain.as_slice();
    let (ee, ca, ta) = (&certs[0], &certs[1], &certs[2]);

    let mut pe = PkiEnvironment::default();
    populate_ev_pki_environment(&mut pe);
    let cps = settings();

    let cp = CertificationPath::new(ta, vec![ca], ee);
    assert_eq!(3, cp.len());
    assert_eq!(2, cp.subordinates().len());
    assert!(validate_path_ev(&pe, &cps, &cp).is_ok());

    // skipping the intermediate breaks name chaining
    let cp = CertificationPath::new(ta, vec![], ee);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::NameChainingFailure)),
        check_names(&cp)
    );

    // an end entity in the intermediate position
    let cp = CertificationPath::new(ta, vec![ee], ee);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::InvalidBasicConstraints)),
        check_basic_constraints(&cp)
    );
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::InvalidKeyUsage)),
        check_key_usage(&cp)
    );

    // no signature support
    let cp = CertificationPath::new(ta, vec![ca], ee);
    let empty = PkiEnvironment::new();
    assert!(verify_signatures(&empty, &cp).is_err());
}

#[test]
fn trust_anchor_alone() {
    let chain = read_chain(&default_chain().pem());
    let ta = chain.last();
    let cp = CertificationPath::new(ta, vec![], ta);
    assert_eq!(1, cp.len());
    assert!(cp.subordinates().is_empty());
    assert!(check_names(&cp).is_ok());
    assert!(check_key_usage(&cp).is_ok());
}

#[test]
fn chain_length_limit() {
    let chain = read_chain(&default_chain().pem());
    let certs = chain.as_slice();
    let cp = CertificationPath::new(&certs[2], vec![&certs[1]], &certs[0]);

    let mut cps = settings();
    set_max_chain_length(&mut cps, 2);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::InvalidPathLength)),
        check_chain_length(&cps, &cp)
    );
    set_max_chain_length(&mut cps, 3);
    assert!(check_chain_length(&cps, &cp).is_ok());
}

#[test]
fn extended_key_usage() {
    let chain = read_chain(&default_chain().pem());
    let certs = chain.as_slice();
    let cp = CertificationPath::new(&certs[2], vec![&certs[1]], &certs[0]);

    let mut cps = settings();
    set_extended_key_usage(&mut cps, ObjectIdentifierSet::from([ID_KP_CODE_SIGNING]));
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::InvalidExtendedKeyUsage)),
        check_extended_key_usage(&cps, &cp)
    );
    set_extended_key_usage(&mut cps, ObjectIdentifierSet::from([ID_KP_SERVER_AUTH]));
    assert!(check_extended_key_usage(&cps, &cp).is_ok());
    set_extended_key_usage(&mut cps, ObjectIdentifierSet::from([ANY_EXTENDED_KEY_USAGE]));
    assert!(check_extended_key_usage(&cps, &cp).is_ok());
}

#[test]
fn policies() {
    let chain = read_chain(&default_chain().pem());
    let certs = chain.as_slice();
    let cp = CertificationPath::new(&certs[2], vec![&certs[1]], &certs[0]);

    let mut cps = settings();
    assert!(check_certificate_policies(&cps, &cp).is_ok());

    set_initial_policy_set(
        &mut cps,
        ObjectIdentifierSet::from([ObjectIdentifier::new_unwrap(OTHER_OID)]),
    );
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::PolicyValidationFailure)),
        check_certificate_policies(&cps, &cp)
    );

    // no required policy means nothing is checked
    set_initial_policy_set(&mut cps, ObjectIdentifierSet::new());
    assert!(check_certificate_policies(&cps, &cp).is_ok());
}

#[test]
fn end_entity_or_ca() {
    let chain = read_chain(&default_chain().pem());
    let mut cps = settings();
    assert!(check_end_entity_or_ca(&cps, chain.first()).is_ok());
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::CaCertUsedAsEndEntity)),
        check_end_entity_or_ca(&cps, chain.last())
    );

    set_end_entity_or_ca(&mut cps, EndEntityOrCa::MustBeCa);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::EndEntityCertUsedAsCa)),
        check_end_entity_or_ca(&cps, chain.first())
    );
    set_end_entity_or_ca(&mut cps, EndEntityOrCa::Either);
    assert!(check_end_entity_or_ca(&cps, chain.first()).is_ok());
}

#[test]
fn builder_finds_path_among_extra_certificates() {
    let tc = default_chain();
    let noise = build_chain(&ChainSpec {
        root_cn: "Unrelated Root",
        ..Default::default()
    });
    // unrelated certificates between the target and the root are ignored by the builder
    let text = format!(
        "{}{}{}{}{}",
        tc.ee, noise.intermediate, noise.ee, tc.intermediate, tc.root
    );
    let chain = read_chain(&text);
    assert_eq!(5, chain.len());

    let mut pe = PkiEnvironment::default();
    populate_ev_pki_environment(&mut pe);
    let policy = EvPolicy::from_dotted(EV_OID, "Test EV policy").unwrap();
    let td = EvTrustDomain::new(chain.last(), policy, chain.iter());
    let cp = pe.build_cert_chain(&td, &settings(), chain.first()).unwrap();
    assert_eq!(3, cp.len());
    assert_eq!(tc.root_der, cp.trust_anchor.encoded_cert);
}

#[test]
fn intermediates_ordered_from_trust_anchor() {
    let tc = build_chain(&ChainSpec {
        sub_ca: Some(SubCaSpec::default()),
        ..Default::default()
    });
    let chain = read_chain(&tc.pem());
    let certs = chain.as_slice();
    let (ee, issuing, ca, ta) = (&certs[0], &certs[1], &certs[2], &certs[3]);

    let mut pe = PkiEnvironment::default();
    populate_ev_pki_environment(&mut pe);
    let cps = settings();

    let cp = CertificationPath::new(ta, vec![ca, issuing], ee);
    assert_eq!(4, cp.len());
    assert!(validate_path_ev(&pe, &cps, &cp).is_ok());

    let cp = CertificationPath::new(ta, vec![issuing, ca], ee);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::NameChainingFailure)),
        check_names(&cp)
    );
    assert!(verify_signatures(&pe, &cp).is_err());
}

#[test]
fn self_issued_ca_and_inhibit_any_policy() {
    let tc = build_chain(&ChainSpec {
        intermediate_extensions: vec![inhibit_any_policy_extension(0)],
        sub_ca: Some(SubCaSpec {
            policies: vec![ANY_POLICY_OID],
            self_issued: true,
            ..Default::default()
        }),
        ..Default::default()
    });
    let chain = read_chain(&tc.pem());
    let certs = chain.as_slice();
    let (ee, rollover, ca, ta) = (&certs[0], &certs[1], &certs[2], &certs[3]);
    let cps = settings();

    let cp = CertificationPath::new(ta, vec![ca, rollover], ee);
    assert!(check_certificate_policies(&cps, &cp).is_ok());
    assert!(check_critical_extensions(&cp).is_ok());

    // the same anyPolicy certificate is not acceptable in the target position
    let cp = CertificationPath::new(ta, vec![ca], rollover);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::PolicyValidationFailure)),
        check_certificate_policies(&cps, &cp)
    );
}
