//! Parameter resolvers for the negotiable extension families.
//!
//! Callers describe signature algorithms, TLS versions, key-share curves and
//! the certificate compression algorithm by name. Unknown signature
//! algorithms fall back to a hex code and fail hard if that does not parse;
//! unknown versions and curves are dropped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::extension::{CertCompressionAlgo, KeyShare, GREASE_PLACEHOLDER};
use crate::error::{Error, Result};

/// Signature scheme codes (RFC 8446 section 4.2.3).
pub mod sig {
    pub const PKCS1_WITH_SHA256: u16 = 0x0401;
    pub const PKCS1_WITH_SHA384: u16 = 0x0501;
    pub const PKCS1_WITH_SHA512: u16 = 0x0601;
    pub const PSS_WITH_SHA256: u16 = 0x0804;
    pub const PSS_WITH_SHA384: u16 = 0x0805;
    pub const PSS_WITH_SHA512: u16 = 0x0806;
    pub const ECDSA_WITH_P256_AND_SHA256: u16 = 0x0403;
    pub const ECDSA_WITH_P384_AND_SHA384: u16 = 0x0503;
    pub const ECDSA_WITH_P521_AND_SHA512: u16 = 0x0603;
    pub const ED25519: u16 = 0x0807;
    pub const PKCS1_WITH_SHA1: u16 = 0x0201;
    pub const ECDSA_WITH_SHA1: u16 = 0x0203;
    pub const SHA224_RSA: u16 = 0x0301;
    pub const SHA224_ECDSA: u16 = 0x0303;
}

/// Protocol version codes.
pub mod version {
    pub const TLS10: u16 = 0x0301;
    pub const TLS11: u16 = 0x0302;
    pub const TLS12: u16 = 0x0303;
    pub const TLS13: u16 = 0x0304;
}

/// Named group codes, including post-quantum hybrids.
pub mod curve {
    pub const P256: u16 = 23;
    pub const P384: u16 = 24;
    pub const P521: u16 = 25;
    pub const X25519: u16 = 29;
    pub const FFDHE2048: u16 = 256;
    pub const FFDHE3072: u16 = 257;
    pub const X25519_MLKEM768: u16 = 0x11ec;
    pub const X25519_KYBER768_DRAFT00: u16 = 0x6399;
    pub const X25519_KYBER512_DRAFT00: u16 = 0xfe30;
    pub const P256_KYBER768_DRAFT00: u16 = 0xfe32;
}

/// Literal curve token that marks a GREASE key share.
pub const GREASE_TOKEN: &str = "GREASE";

const SIGNATURE_ALGORITHMS: &[(&str, u16)] = &[
    ("PKCS1WithSHA256", sig::PKCS1_WITH_SHA256),
    ("PKCS1WithSHA384", sig::PKCS1_WITH_SHA384),
    ("PKCS1WithSHA512", sig::PKCS1_WITH_SHA512),
    ("PSSWithSHA256", sig::PSS_WITH_SHA256),
    ("PSSWithSHA384", sig::PSS_WITH_SHA384),
    ("PSSWithSHA512", sig::PSS_WITH_SHA512),
    ("ECDSAWithP256AndSHA256", sig::ECDSA_WITH_P256_AND_SHA256),
    ("ECDSAWithP384AndSHA384", sig::ECDSA_WITH_P384_AND_SHA384),
    ("ECDSAWithP521AndSHA512", sig::ECDSA_WITH_P521_AND_SHA512),
    ("PKCS1WithSHA1", sig::PKCS1_WITH_SHA1),
    ("ECDSAWithSHA1", sig::ECDSA_WITH_SHA1),
    ("Ed25519", sig::ED25519),
    ("SHA224_RSA", sig::SHA224_RSA),
    ("SHA224_ECDSA", sig::SHA224_ECDSA),
];

const TLS_VERSIONS: &[(&str, u16)] = &[
    (GREASE_TOKEN, GREASE_PLACEHOLDER),
    ("1.3", version::TLS13),
    ("1.2", version::TLS12),
    ("1.1", version::TLS11),
    ("1.0", version::TLS10),
];

const CURVES: &[(&str, u16)] = &[
    (GREASE_TOKEN, GREASE_PLACEHOLDER),
    ("P256", curve::P256),
    ("P384", curve::P384),
    ("P521", curve::P521),
    ("X25519", curve::X25519),
    ("X25519Kyber512Draft00", curve::X25519_KYBER512_DRAFT00),
    ("X25519Kyber768", curve::X25519_KYBER768_DRAFT00),
    ("P256Kyber768", curve::P256_KYBER768_DRAFT00),
    ("X25519MLKEM768", curve::X25519_MLKEM768),
    ("ffdhe2048", curve::FFDHE2048),
    ("ffdhe3072", curve::FFDHE3072),
];

const CERT_COMPRESSION: &[(&str, CertCompressionAlgo)] = &[
    ("zlib", CertCompressionAlgo::Zlib),
    ("brotli", CertCompressionAlgo::Brotli),
    ("zstd", CertCompressionAlgo::Zstd),
];

/// Name tables used to resolve negotiable parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterTables {
    signature_algorithms: HashMap<String, u16>,
    versions: HashMap<String, u16>,
    curves: HashMap<String, u16>,
    cert_compression: HashMap<String, CertCompressionAlgo>,
}

impl ParameterTables {
    /// Tables with no names at all.
    pub fn empty() -> Self {
        Self {
            signature_algorithms: HashMap::new(),
            versions: HashMap::new(),
            curves: HashMap::new(),
            cert_compression: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        fn table<V: Copy>(entries: &[(&str, V)]) -> HashMap<String, V> {
            entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        }

        Self {
            signature_algorithms: table(SIGNATURE_ALGORITHMS),
            versions: table(TLS_VERSIONS),
            curves: table(CURVES),
            cert_compression: table(CERT_COMPRESSION),
        }
    }

    pub fn with_signature_algorithm(mut self, name: impl Into<String>, code: u16) -> Self {
        self.signature_algorithms.insert(name.into(), code);
        self
    }

    pub fn with_version(mut self, name: impl Into<String>, code: u16) -> Self {
        self.versions.insert(name.into(), code);
        self
    }

    pub fn with_curve(mut self, name: impl Into<String>, code: u16) -> Self {
        self.curves.insert(name.into(), code);
        self
    }

    pub fn with_cert_compression(mut self, name: impl Into<String>, algo: CertCompressionAlgo) -> Self {
        self.cert_compression.insert(name.into(), algo);
        self
    }

    /// Resolve signature algorithm tokens in order.
    ///
    /// Names missing from the table are parsed as 16-bit hex codes so that
    /// schemes not yet named here can still be sent.
    pub fn resolve_signature_algorithms<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<u16>> {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                match self.signature_algorithms.get(token) {
                    Some(code) => Ok(*code),
                    None => parse_hex_u16(token)
                        .ok_or_else(|| Error::InvalidSignatureAlgorithm(token.to_string())),
                }
            })
            .collect()
    }

    /// Resolve TLS version tokens in order, dropping unknown names.
    pub fn resolve_versions<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u16> {
        tokens
            .iter()
            .filter_map(|token| {
                let token = token.as_ref();
                let code = self.versions.get(token).copied();
                if code.is_none() {
                    tracing::debug!("Dropping unknown TLS version {:?}", token);
                }
                code
            })
            .collect()
    }

    /// Resolve key-share curve tokens in order, dropping unknown names.
    ///
    /// `GREASE` produces a share carrying one zero byte; every other curve
    /// produces an empty share.
    pub fn resolve_key_shares<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<KeyShare> {
        tokens
            .iter()
            .filter_map(|token| {
                let token = token.as_ref();
                let Some(group) = self.curves.get(token).copied() else {
                    tracing::debug!("Dropping unknown key share curve {:?}", token);
                    return None;
                };
                let mut share = KeyShare::new(group);
                if token == GREASE_TOKEN {
                    share.data = vec![0];
                }
                Some(share)
            })
            .collect()
    }

    /// Resolve the certificate compression algorithm. Unknown or absent
    /// names yield `None`.
    pub fn resolve_cert_compression(&self, token: Option<&str>) -> Option<CertCompressionAlgo> {
        token.and_then(|t| self.cert_compression.get(t).copied())
    }

    /// Resolve a full parameter set.
    pub fn resolve(&self, params: &NegotiableParams) -> Result<ResolvedParams> {
        Ok(ResolvedParams {
            signature_algorithms: self.resolve_signature_algorithms(&params.signature_algorithms)?,
            versions: self.resolve_versions(&params.supported_versions),
            key_shares: self.resolve_key_shares(&params.key_share_curves),
            cert_compression: self.resolve_cert_compression(params.cert_compression.as_deref()),
        })
    }
}

impl Default for ParameterTables {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Negotiable parameters supplied next to a JA3 string, as names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NegotiableParams {
    pub signature_algorithms: Vec<String>,
    pub supported_versions: Vec<String>,
    pub key_share_curves: Vec<String>,
    pub cert_compression: Option<String>,
}

impl NegotiableParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signature_algorithms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signature_algorithms = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn supported_versions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_versions = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn key_share_curves<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_share_curves = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn cert_compression(mut self, name: impl Into<String>) -> Self {
        self.cert_compression = Some(name.into());
        self
    }
}

/// Negotiable parameters resolved to protocol values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedParams {
    pub signature_algorithms: Vec<u16>,
    pub versions: Vec<u16>,
    pub key_shares: Vec<KeyShare>,
    pub cert_compression: Option<CertCompressionAlgo>,
}

fn parse_hex_u16(token: &str) -> Option<u16> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u16::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_names_and_hex_fallback() {
        let tables = ParameterTables::builtin();
        let resolved = tables
            .resolve_signature_algorithms(&["ECDSAWithP256AndSHA256", "0805", "0x0807", "fe00"])
            .unwrap();
        assert_eq!(resolved, vec![0x0403, 0x0805, 0x0807, 0xfe00]);
    }

    #[test]
    fn test_signature_unparseable_is_fatal() {
        let tables = ParameterTables::builtin();
        let err = tables
            .resolve_signature_algorithms(&["PSSWithSHA256", "NotAScheme"])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSignatureAlgorithm(ref t) if t == "NotAScheme"));

        // Out of 16-bit range.
        assert!(tables.resolve_signature_algorithms(&["12345"]).is_err());
    }

    #[test]
    fn test_unknown_versions_dropped() {
        let tables = ParameterTables::builtin();
        let resolved = tables.resolve_versions(&["GREASE", "1.3", "2.0", "1.2"]);
        assert_eq!(resolved, vec![GREASE_PLACEHOLDER, version::TLS13, version::TLS12]);
    }

    #[test]
    fn test_key_shares_grease_placeholder() {
        let tables = ParameterTables::builtin();
        let shares = tables.resolve_key_shares(&["GREASE", "X25519Kyber768", "bogus", "X25519"]);
        assert_eq!(
            shares,
            vec![
                KeyShare {
                    group: GREASE_PLACEHOLDER,
                    data: vec![0]
                },
                KeyShare::new(curve::X25519_KYBER768_DRAFT00),
                KeyShare::new(curve::X25519),
            ]
        );
    }

    #[test]
    fn test_cert_compression_miss_is_none() {
        let tables = ParameterTables::builtin();
        assert_eq!(
            tables.resolve_cert_compression(Some("brotli")),
            Some(CertCompressionAlgo::Brotli)
        );
        assert_eq!(tables.resolve_cert_compression(Some("lzma")), None);
        assert_eq!(tables.resolve_cert_compression(None), None);
    }

    #[test]
    fn test_injected_tables() {
        let tables = ParameterTables::empty().with_curve("custom", 0x1234);
        assert_eq!(tables.resolve_key_shares(&["custom", "X25519"]), vec![KeyShare::new(0x1234)]);
    }
}
