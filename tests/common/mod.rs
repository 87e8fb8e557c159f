use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use axum::{Router, http::StatusCode, routing::get};
use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, KeyPair};
use trust_bundle::pki::CaCertificate;

/// DER TLV with a short-form length
fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    assert!(content.len() < 0x80);
    let mut out = vec![tag, content.len() as u8];
    out.extend_from_slice(content);
    out
}

/// Minimal unsigned CRL carrying the given UTCTime nextUpdate
pub fn crl_der(next_update: &str) -> Vec<u8> {
    let algorithm = tlv(
        0x30,
        &[
            0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B, 0x05, 0x00,
        ],
    );
    let cn = [tlv(0x06, &[0x55, 0x04, 0x03]), tlv(0x0C, b"Test CA")].concat();
    let issuer = tlv(0x30, &tlv(0x31, &tlv(0x30, &cn)));
    let tbs = [
        algorithm.clone(),
        issuer,
        tlv(0x17, b"240101000000Z"),
        tlv(0x17, next_update.as_bytes()),
    ]
    .concat();

    let body = [tlv(0x30, &tbs), algorithm, tlv(0x03, &[0x00, 0x00])].concat();
    tlv(0x30, &body)
}

/// Self-signed CA certificate under the ICP-Brasil v10 naming scheme
pub fn ca_cert(common_name: &str) -> CaCertificate {
    let mut params = CertificateParams::default();
    let key_pair = KeyPair::generate().unwrap();

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CountryName, "BR");
    dn.push(DnType::OrganizationName, "ICP-Brasil");
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;

    params.is_ca = rcgen::IsCa::Ca(BasicConstraints::Unconstrained);
    let cert = params.self_signed(&key_pair).unwrap();
    CaCertificate::from_der(cert.der()).unwrap()
}

/// Fake CRL distribution server.
///
/// Serves `/one.crl` and `/two.crl`, answers `/broken.crl` with a 500 and
/// counts every request it receives.
pub struct CrlServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl CrlServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

// Helper function to spawn a CRL server on a random port
pub async fn spawn_crl_server(one: Vec<u8>, two: Vec<u8>) -> CrlServer {
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    let one_route = get(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let body = one.clone();
        async move { body }
    });
    let counter = hits.clone();
    let two_route = get(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let body = two.clone();
        async move { body }
    });
    let counter = hits.clone();
    let broken_route = get(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { StatusCode::INTERNAL_SERVER_ERROR }
    });

    let app = Router::new()
        .route("/one.crl", one_route)
        .route("/two.crl", two_route)
        .route("/broken.crl", broken_route);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("failed to run server");
    });

    CrlServer {
        base_url: format!("http://{addr}"),
        hits,
    }
}
