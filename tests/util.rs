#![allow(dead_code)]

use std::sync::{Arc, Once};

use certcenter::backend::X509Backend;
use certcenter::controller::ChainController;
use certcenter::key::{KeyType, PrivateKey, generate_private_key};
use certcenter::model::{Certificate, Organization};
use time::Duration;

static TRACING: Once = Once::new();

/// Routes library logs to the test output; `RUST_LOG=certcenter=debug` shows them.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn controller() -> ChainController {
    init_tracing();
    ChainController::new(Arc::new(X509Backend::default()))
}

pub fn organization() -> Organization {
    Organization::new(
        "myca",
        vec!["MyCA Ltd".to_string(), "MyCA Engineering".to_string()],
    )
    .unwrap()
}

pub fn new_key(controller: &ChainController, key_type: KeyType) -> PrivateKey {
    generate_private_key(controller.new_serial_number().unwrap(), key_type, 2048).unwrap()
}

/// A certificate together with the key that signs its children.
pub struct Issued {
    pub cert: Certificate,
    pub key: PrivateKey,
}

pub fn generate_root(controller: &ChainController, key_type: KeyType) -> Issued {
    let key = new_key(controller, key_type);
    let cert = controller
        .new_root_certificate(&organization(), "myca.local", &key, Duration::days(3650))
        .unwrap();
    Issued { cert, key }
}

pub fn generate_intermediate(
    controller: &ChainController,
    parent: &Issued,
    common_name: &str,
    key_type: KeyType,
) -> Issued {
    let key = new_key(controller, key_type);
    let cert = controller
        .new_intermediate_certificate(
            &organization(),
            common_name,
            key.serial_number().clone(),
            &key.public_key().unwrap(),
            &parent.cert,
            &parent.key,
            Duration::days(1825),
        )
        .unwrap();
    Issued { cert, key }
}

pub fn generate_server(
    controller: &ChainController,
    parent: &Issued,
    key_type: KeyType,
    dns_names: &[&str],
) -> Issued {
    let key = new_key(controller, key_type);
    let dns_names: Vec<String> = dns_names.iter().map(|name| name.to_string()).collect();
    let cert = controller
        .new_server_certificate(
            &organization(),
            key.serial_number().clone(),
            &key.public_key().unwrap(),
            &parent.cert,
            &parent.key,
            &dns_names,
            Duration::days(365),
        )
        .unwrap();
    Issued { cert, key }
}

pub fn generate_client(controller: &ChainController, parent: &Issued, key_type: KeyType) -> Issued {
    let key = new_key(controller, key_type);
    let cert = controller
        .new_client_certificate(
            &organization(),
            "client.myca.local",
            key.serial_number().clone(),
            &key.public_key().unwrap(),
            &parent.cert,
            &parent.key,
            Duration::days(365),
        )
        .unwrap();
    Issued { cert, key }
}
