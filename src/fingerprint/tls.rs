//! Compiled ClientHello specification.
//!
//! Field order everywhere in [`ClientHelloSpec`] is significant and is
//! handed to the TLS engine verbatim.

use sha2::{Digest, Sha256};

use super::extension::{Extension, COMPRESSION_NONE};

/// Cipher suite codes used by the built-in profiles.
pub mod cipher {
    pub const TLS_AES_128_GCM_SHA256: u16 = 0x1301;
    pub const TLS_AES_256_GCM_SHA384: u16 = 0x1302;
    pub const TLS_CHACHA20_POLY1305_SHA256: u16 = 0x1303;
    pub const TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256: u16 = 0xc02b;
    pub const TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256: u16 = 0xc02f;
    pub const TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384: u16 = 0xc02c;
    pub const TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384: u16 = 0xc030;
    pub const TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256: u16 = 0xcca9;
    pub const TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256: u16 = 0xcca8;
    pub const TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA: u16 = 0xc009;
    pub const TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA: u16 = 0xc00a;
    pub const TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA: u16 = 0xc013;
    pub const TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA: u16 = 0xc014;
    pub const TLS_RSA_WITH_AES_128_GCM_SHA256: u16 = 0x009c;
    pub const TLS_RSA_WITH_AES_256_GCM_SHA384: u16 = 0x009d;
    pub const TLS_RSA_WITH_AES_128_CBC_SHA: u16 = 0x002f;
    pub const TLS_RSA_WITH_AES_256_CBC_SHA: u16 = 0x0035;
    pub const TLS_ECDHE_ECDSA_WITH_3DES_EDE_CBC_SHA: u16 = 0xc008;
    pub const TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA: u16 = 0xc012;
    pub const TLS_RSA_WITH_3DES_EDE_CBC_SHA: u16 = 0x000a;
}

/// How the session id of the ClientHello is derived.
///
/// Session ids only need to be reproducible for a given connection; this is
/// not a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionIdDerivation {
    /// SHA-256 over the connection-binding input.
    #[default]
    Sha256,
}

impl SessionIdDerivation {
    /// Derive the 32-byte session id for `input`.
    pub fn derive(&self, input: &[u8]) -> [u8; 32] {
        match self {
            SessionIdDerivation::Sha256 => Sha256::digest(input).into(),
        }
    }
}

/// Fully ordered ClientHello specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientHelloSpec {
    /// Cipher suites in order.
    pub cipher_suites: Vec<u16>,
    /// Compression methods in order.
    pub compression_methods: Vec<u8>,
    /// Extensions in order.
    pub extensions: Vec<Extension>,
    pub session_id: SessionIdDerivation,
}

impl ClientHelloSpec {
    /// Specification with the single `null` compression method and SHA-256
    /// session ids.
    pub fn new(cipher_suites: Vec<u16>, extensions: Vec<Extension>) -> Self {
        Self {
            cipher_suites,
            compression_methods: vec![COMPRESSION_NONE],
            extensions,
            session_id: SessionIdDerivation::Sha256,
        }
    }

    /// Extension ids in wire order.
    pub fn extension_ids(&self) -> Vec<u16> {
        self.extensions.iter().map(Extension::id).collect()
    }

    /// First extension with the given id.
    pub fn extension(&self, id: u16) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_pure() {
        let derivation = SessionIdDerivation::Sha256;
        let a = derivation.derive(b"example.com:443");
        let b = derivation.derive(b"example.com:443");
        let c = derivation.derive(b"example.org:443");
        assert_eq!(a, b);
        assert_ne!(a, c);
        // SHA-256 of the empty string.
        assert_eq!(
            derivation.derive(b"")[..4],
            [0xe3, 0xb0, 0xc4, 0x42]
        );
    }

    #[test]
    fn test_new_uses_null_compression() {
        let spec = ClientHelloSpec::new(vec![cipher::TLS_AES_128_GCM_SHA256], vec![Extension::ServerName]);
        assert_eq!(spec.compression_methods, vec![0]);
        assert_eq!(spec.extension_ids(), vec![0]);
        assert!(spec.extension(0).is_some());
        assert!(spec.extension(16).is_none());
    }
}
