mod util;

use certcenter::cert::extensions::{ExtendedKeyUsageOption, KeyUsages};
use certcenter::error::CertCenterError;
use certcenter::key::KeyType;
use certcenter::serial::SerialNumber;
use std::collections::HashSet;
use time::{Duration, OffsetDateTime};

#[test]
fn root_certificate_is_self_signed_ca() {
    let controller = util::controller();
    let root = util::generate_root(&controller, KeyType::EcdsaP384);
    let cert = &root.cert;

    assert!(cert.is_ca());
    assert!(cert.is_root_certificate());
    assert!(!cert.is_intermediate_certificate());
    assert_eq!(cert.signed_by(), cert.serial_number());
    assert_eq!(cert.serial_number(), root.key.serial_number());
    assert_eq!(cert.organization(), "myca");
    assert_eq!(cert.organization_name(), "MyCA Ltd");
    assert_eq!(cert.common_name(), "myca.local");

    let x509 = cert.certificate();
    assert_eq!(x509.organization(), util::organization().names().to_vec());
    assert_eq!(x509.max_path_len(), None);
    assert!(x509.key_usage().contains(KeyUsages::DigitalSignature));
    assert!(x509.key_usage().contains(KeyUsages::KeyCertSign));
    assert_eq!(
        x509.extended_key_usage(),
        &[
            ExtendedKeyUsageOption::ServerAuth,
            ExtendedKeyUsageOption::ClientAuth
        ]
    );
    assert_eq!(x509.public_key(), &root.key.public_key().unwrap());
    assert!(x509.authority_key_id().is_none());
}

#[test]
fn intermediate_certificate_has_zero_path_length() {
    let controller = util::controller();
    let root = util::generate_root(&controller, KeyType::EcdsaP256);
    let intermediate = util::generate_intermediate(
        &controller,
        &root,
        "intermediate.myca.local",
        KeyType::EcdsaP256,
    );
    let cert = &intermediate.cert;

    assert!(cert.is_ca());
    assert!(cert.is_intermediate_certificate());
    assert!(!cert.is_self_signed());
    assert_eq!(cert.certificate().max_path_len(), Some(0));
    assert_eq!(cert.signed_by(), root.cert.serial_number());
    assert_eq!(
        cert.certificate().authority_key_id(),
        root.cert.certificate().subject_key_id()
    );
    assert_eq!(
        cert.certificate().issuer_name(),
        root.cert.certificate().subject_name()
    );
}

#[test]
fn server_certificate_uses_first_dns_name() {
    let controller = util::controller();
    let root = util::generate_root(&controller, KeyType::EcdsaP256);
    let intermediate = util::generate_intermediate(
        &controller,
        &root,
        "intermediate.myca.local",
        KeyType::EcdsaP256,
    );
    let server = util::generate_server(
        &controller,
        &intermediate,
        KeyType::Ed25519,
        &["example.com", "www.example.com"],
    );
    let cert = &server.cert;

    assert!(cert.certificate().basic_constraints_valid());
    assert!(!cert.is_ca());
    assert!(cert.is_server_certificate());
    assert!(!cert.is_client_certificate());
    assert_eq!(cert.common_name(), "example.com");
    assert_eq!(
        cert.dns_names(),
        &["example.com".to_string(), "www.example.com".to_string()]
    );
    assert!(cert.certificate().key_usage().contains(KeyUsages::KeyEncipherment));
    assert!(!cert.certificate().key_usage().contains(KeyUsages::KeyCertSign));
    assert_eq!(cert.signed_by(), intermediate.cert.serial_number());
}

#[test]
fn client_certificate_has_only_client_auth() {
    let controller = util::controller();
    let root = util::generate_root(&controller, KeyType::EcdsaP256);
    let client = util::generate_client(&controller, &root, KeyType::EcdsaP521);
    let cert = &client.cert;

    assert!(cert.certificate().basic_constraints_valid());
    assert!(!cert.is_ca());
    assert_eq!(cert.certificate().max_path_len(), None);
    assert!(cert.is_client_certificate());
    assert!(!cert.is_server_certificate());
    assert_eq!(
        cert.certificate().extended_key_usage(),
        &[ExtendedKeyUsageOption::ClientAuth]
    );
    assert_eq!(cert.common_name(), "client.myca.local");
}

#[test]
fn rsa_root_signs_every_key_type() {
    let controller = util::controller();
    let root = util::generate_root(&controller, KeyType::Rsa);
    for key_type in [
        KeyType::EcdsaP224,
        KeyType::EcdsaP256,
        KeyType::EcdsaP384,
        KeyType::EcdsaP521,
        KeyType::Ed25519,
    ] {
        let client = util::generate_client(&controller, &root, key_type);
        assert_eq!(client.cert.certificate().public_key().key_type(), key_type);
    }
}

#[test]
fn validity_window_follows_expiration() {
    let controller = util::controller();
    let key = util::new_key(&controller, KeyType::EcdsaP256);
    let before = OffsetDateTime::now_utc() - Duration::seconds(1);
    let root = controller
        .new_root_certificate(&util::organization(), "short", &key, Duration::days(2))
        .unwrap();
    let after = OffsetDateTime::now_utc() + Duration::seconds(1);

    let x509 = root.certificate();
    assert!(x509.not_before() >= before && x509.not_before() <= after);
    let lifetime = x509.not_after() - x509.not_before();
    assert!((lifetime - Duration::days(2)).abs() <= Duration::seconds(1));
}

#[test]
fn far_future_expiration_round_trips() {
    let controller = util::controller();
    let key = util::new_key(&controller, KeyType::EcdsaP256);
    let root = controller
        .new_root_certificate(
            &util::organization(),
            "long",
            &key,
            Duration::days(365 * 60),
        )
        .unwrap();
    assert!(root.certificate().not_after().year() >= 2080);
}

#[test]
fn pem_output_parses_back() {
    let controller = util::controller();
    let root = util::generate_root(&controller, KeyType::EcdsaP256);
    let pem = root.cert.to_pem();
    assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));

    let parsed = certcenter::cert::X509Certificate::from_pem(&pem).unwrap();
    assert_eq!(&parsed, root.cert.certificate());
    assert_eq!(parsed.reencode().unwrap(), parsed.to_der());
}

#[test]
fn serial_numbers_are_unique_and_positive() {
    let controller = util::controller();
    let serials: HashSet<String> = (0..100)
        .map(|_| {
            let serial = controller.new_serial_number().unwrap();
            assert!(serial.is_positive());
            serial.to_string()
        })
        .collect();
    assert_eq!(serials.len(), 100);
}

#[test]
fn intermediate_with_stub_parent_key_fails() {
    let controller = util::controller();
    let root = util::generate_root(&controller, KeyType::EcdsaP256);
    let stub = certcenter::key::PrivateKey::new(
        root.key.serial_number().clone(),
        KeyType::EcdsaP256,
        None,
    );
    let subject = util::new_key(&controller, KeyType::EcdsaP256);

    let err = controller
        .new_intermediate_certificate(
            &util::organization(),
            "intermediate",
            SerialNumber::from(10u64),
            &subject.public_key().unwrap(),
            &root.cert,
            &stub,
            Duration::days(1),
        )
        .unwrap_err();
    assert!(matches!(err, CertCenterError::InvalidInput(_)));
}

#[test]
fn leaf_signed_with_foreign_key_is_refused() {
    let controller = util::controller();
    let root = util::generate_root(&controller, KeyType::EcdsaP256);
    let stranger = util::new_key(&controller, KeyType::EcdsaP256);
    let subject = util::new_key(&controller, KeyType::EcdsaP256);

    let err = controller
        .new_client_certificate(
            &util::organization(),
            "client.myca.local",
            subject.serial_number().clone(),
            &subject.public_key().unwrap(),
            &root.cert,
            &stranger,
            Duration::days(1),
        )
        .unwrap_err();
    assert!(matches!(err, CertCenterError::InvalidInput(_)));
}

#[test]
fn overlong_expiration_is_an_error() {
    let controller = util::controller();
    let key = util::new_key(&controller, KeyType::EcdsaP256);
    let err = controller
        .new_root_certificate(
            &util::organization(),
            "myca.local",
            &key,
            Duration::days(4_000_000),
        )
        .unwrap_err();
    assert!(matches!(err, CertCenterError::InvalidInput(_)));
}
