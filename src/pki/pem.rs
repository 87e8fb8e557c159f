use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Line width of the base64 body inside a PEM block
pub const PEM_LINE_WIDTH: usize = 64;

pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
pub const X509_CRL_LABEL: &str = "X509 CRL";

/// Wrap DER bytes into a PEM block with the given label.
///
/// The base64 body is broken every 64 characters and the footer line ends
/// with a newline, so blocks can be concatenated as-is.
pub fn encode(label: &str, der: &[u8]) -> String {
    let body = STANDARD.encode(der);

    let mut pem = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 64);
    pem.push_str("-----BEGIN ");
    pem.push_str(label);
    pem.push_str("-----\n");

    // base64 output is pure ASCII so byte chunks are valid str slices
    for line in body.as_bytes().chunks(PEM_LINE_WIDTH) {
        pem.push_str(std::str::from_utf8(line).unwrap_or_default());
        pem.push('\n');
    }

    pem.push_str("-----END ");
    pem.push_str(label);
    pem.push_str("-----\n");
    pem
}
