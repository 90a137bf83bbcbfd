//! Pinned ClientHello specifications, captured from real browsers and apps.
//!
//! These are data: each function returns the exact ordered specification a
//! given client sends.

use super::extension::{
    CertCompressionAlgo, Extension, KeyShare, PaddingStyle, Renegotiation,
    FIREFOX_RECORD_SIZE_LIMIT, GREASE_PLACEHOLDER, POINT_FORMAT_UNCOMPRESSED, PSK_MODE_DHE,
};
use super::params::{curve, sig, version};
use super::tls::{cipher::*, ClientHelloSpec};

const CHROME_CIPHER_SUITES: &[u16] = &[
    GREASE_PLACEHOLDER,
    TLS_AES_128_GCM_SHA256,
    TLS_AES_256_GCM_SHA384,
    TLS_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
    TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA,
    TLS_RSA_WITH_AES_128_GCM_SHA256,
    TLS_RSA_WITH_AES_256_GCM_SHA384,
    TLS_RSA_WITH_AES_128_CBC_SHA,
    TLS_RSA_WITH_AES_256_CBC_SHA,
];

const CHROME_SIGNATURE_ALGORITHMS: &[u16] = &[
    sig::ECDSA_WITH_P256_AND_SHA256,
    sig::PSS_WITH_SHA256,
    sig::PKCS1_WITH_SHA256,
    sig::ECDSA_WITH_P384_AND_SHA384,
    sig::PSS_WITH_SHA384,
    sig::PKCS1_WITH_SHA384,
    sig::PSS_WITH_SHA512,
    sig::PKCS1_WITH_SHA512,
];

const CHROME_CURVES: &[u16] = &[GREASE_PLACEHOLDER, curve::X25519, curve::P256, curve::P384];

const CHROME_PQ_CURVES: &[u16] = &[
    GREASE_PLACEHOLDER,
    curve::X25519_KYBER768_DRAFT00,
    curve::X25519,
    curve::P256,
    curve::P384,
];

const FIREFOX_CIPHER_SUITES: &[u16] = &[
    TLS_AES_128_GCM_SHA256,
    TLS_CHACHA20_POLY1305_SHA256,
    TLS_AES_256_GCM_SHA384,
    TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA,
    TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA,
    TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
    TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA,
    TLS_RSA_WITH_AES_128_GCM_SHA256,
    TLS_RSA_WITH_AES_256_GCM_SHA384,
    TLS_RSA_WITH_AES_128_CBC_SHA,
    TLS_RSA_WITH_AES_256_CBC_SHA,
];

const FIREFOX_CURVES: &[u16] = &[
    curve::X25519,
    curve::P256,
    curve::P384,
    curve::P521,
    curve::FFDHE2048,
    curve::FFDHE3072,
];

const FIREFOX_SIGNATURE_ALGORITHMS: &[u16] = &[
    sig::ECDSA_WITH_P256_AND_SHA256,
    sig::ECDSA_WITH_P384_AND_SHA384,
    sig::ECDSA_WITH_P521_AND_SHA512,
    sig::PSS_WITH_SHA256,
    sig::PSS_WITH_SHA384,
    sig::PSS_WITH_SHA512,
    sig::PKCS1_WITH_SHA256,
    sig::PKCS1_WITH_SHA384,
    sig::PKCS1_WITH_SHA512,
    sig::ECDSA_WITH_SHA1,
    sig::PKCS1_WITH_SHA1,
];

const FIREFOX_DELEGATED_CREDENTIALS: &[u16] = &[
    sig::ECDSA_WITH_P256_AND_SHA256,
    sig::ECDSA_WITH_P384_AND_SHA384,
    sig::ECDSA_WITH_P521_AND_SHA512,
    sig::ECDSA_WITH_SHA1,
];

const OKHTTP_CIPHER_SUITES: &[u16] = &[
    TLS_AES_128_GCM_SHA256,
    TLS_AES_256_GCM_SHA384,
    TLS_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
    TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA,
    TLS_RSA_WITH_AES_128_GCM_SHA256,
    TLS_RSA_WITH_AES_256_GCM_SHA384,
    TLS_RSA_WITH_AES_128_CBC_SHA,
    TLS_RSA_WITH_AES_256_CBC_SHA,
];

const CFNETWORK_CIPHER_SUITES: &[u16] = &[
    GREASE_PLACEHOLDER,
    TLS_AES_128_GCM_SHA256,
    TLS_AES_256_GCM_SHA384,
    TLS_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA,
    TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA,
    TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA,
    TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
    TLS_RSA_WITH_AES_256_GCM_SHA384,
    TLS_RSA_WITH_AES_128_GCM_SHA256,
    TLS_RSA_WITH_AES_256_CBC_SHA,
    TLS_RSA_WITH_AES_128_CBC_SHA,
    TLS_ECDHE_ECDSA_WITH_3DES_EDE_CBC_SHA,
    TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA,
    TLS_RSA_WITH_3DES_EDE_CBC_SHA,
];

// CFNetwork really does send rsa_pss_rsae_sha384 twice.
const CFNETWORK_SIGNATURE_ALGORITHMS: &[u16] = &[
    sig::ECDSA_WITH_P256_AND_SHA256,
    sig::PSS_WITH_SHA256,
    sig::PKCS1_WITH_SHA256,
    sig::ECDSA_WITH_P384_AND_SHA384,
    sig::ECDSA_WITH_SHA1,
    sig::PSS_WITH_SHA384,
    sig::PSS_WITH_SHA384,
    sig::PKCS1_WITH_SHA384,
    sig::PSS_WITH_SHA512,
    sig::PKCS1_WITH_SHA512,
    sig::PKCS1_WITH_SHA1,
];

fn points() -> Extension {
    Extension::SupportedPoints(vec![POINT_FORMAT_UNCOMPRESSED])
}

fn psk_modes() -> Extension {
    Extension::PskKeyExchangeModes(vec![PSK_MODE_DHE])
}

fn renegotiation() -> Extension {
    Extension::RenegotiationInfo(Renegotiation::OnceAsClient)
}

fn chrome_versions() -> Extension {
    Extension::SupportedVersions(vec![GREASE_PLACEHOLDER, version::TLS13, version::TLS12])
}

fn firefox_versions() -> Extension {
    Extension::SupportedVersions(vec![version::TLS13, version::TLS12])
}

fn brotli() -> Extension {
    Extension::CompressCertificate(vec![CertCompressionAlgo::Brotli])
}

fn chrome_key_share() -> Extension {
    Extension::KeyShare(vec![KeyShare::grease(), KeyShare::new(curve::X25519)])
}

fn firefox_key_share() -> Extension {
    Extension::KeyShare(vec![KeyShare::new(curve::X25519), KeyShare::new(curve::P256)])
}

/// Chrome 117 extension order, shared with its PSK variant.
fn chrome_117_extensions() -> Vec<Extension> {
    vec![
        Extension::Grease,
        psk_modes(),
        Extension::ServerName,
        Extension::alpn_h2_http11(),
        Extension::SignatureAlgorithms(CHROME_SIGNATURE_ALGORITHMS.to_vec()),
        chrome_versions(),
        Extension::alps_h2(),
        Extension::SupportedCurves(CHROME_CURVES.to_vec()),
        Extension::ExtendedMasterSecret,
        Extension::SessionTicket,
        brotli(),
        Extension::Sct,
        Extension::StatusRequest,
        chrome_key_share(),
        renegotiation(),
        points(),
        Extension::Grease,
        Extension::Padding(PaddingStyle::Boring),
    ]
}

pub fn chrome_117() -> ClientHelloSpec {
    ClientHelloSpec::new(CHROME_CIPHER_SUITES.to_vec(), chrome_117_extensions())
}

pub fn chrome_117_psk() -> ClientHelloSpec {
    let mut extensions = chrome_117_extensions();
    extensions.push(Extension::PreSharedKey);
    ClientHelloSpec::new(CHROME_CIPHER_SUITES.to_vec(), extensions)
}

pub fn chrome_120() -> ClientHelloSpec {
    ClientHelloSpec::new(
        CHROME_CIPHER_SUITES.to_vec(),
        vec![
            Extension::Grease,
            Extension::ServerName,
            psk_modes(),
            chrome_versions(),
            Extension::StatusRequest,
            Extension::ExtendedMasterSecret,
            Extension::SessionTicket,
            Extension::SignatureAlgorithms(CHROME_SIGNATURE_ALGORITHMS.to_vec()),
            renegotiation(),
            Extension::alpn_h2_http11(),
            Extension::EchGrease,
            Extension::Sct,
            chrome_key_share(),
            Extension::SupportedCurves(CHROME_CURVES.to_vec()),
            points(),
            Extension::alps_h2(),
            brotli(),
            Extension::Grease,
        ],
    )
}

/// Chrome 120 with a Kyber hybrid key share and session resumption.
pub fn chrome_120_psk() -> ClientHelloSpec {
    ClientHelloSpec::new(
        CHROME_CIPHER_SUITES.to_vec(),
        vec![
            Extension::Grease,
            Extension::ServerName,
            psk_modes(),
            chrome_versions(),
            Extension::StatusRequest,
            Extension::ExtendedMasterSecret,
            Extension::SessionTicket,
            Extension::SignatureAlgorithms(CHROME_SIGNATURE_ALGORITHMS.to_vec()),
            renegotiation(),
            Extension::alpn_h2_http11(),
            Extension::EchGrease,
            Extension::Sct,
            Extension::KeyShare(vec![
                KeyShare::grease(),
                KeyShare::new(curve::X25519_KYBER768_DRAFT00),
                KeyShare::new(curve::X25519),
            ]),
            Extension::SupportedCurves(CHROME_PQ_CURVES.to_vec()),
            points(),
            Extension::alps_h2(),
            brotli(),
            Extension::Grease,
            Extension::PreSharedKey,
        ],
    )
}

fn firefox_curves() -> Extension {
    Extension::SupportedCurves(FIREFOX_CURVES.to_vec())
}

fn firefox_signature_algorithms() -> Extension {
    Extension::SignatureAlgorithms(FIREFOX_SIGNATURE_ALGORITHMS.to_vec())
}

fn firefox_delegated_credentials() -> Extension {
    Extension::DelegatedCredentials(FIREFOX_DELEGATED_CREDENTIALS.to_vec())
}

pub fn firefox_117() -> ClientHelloSpec {
    ClientHelloSpec::new(
        FIREFOX_CIPHER_SUITES.to_vec(),
        vec![
            Extension::ServerName,
            Extension::ExtendedMasterSecret,
            renegotiation(),
            firefox_curves(),
            points(),
            Extension::SessionTicket,
            Extension::alpn_h2_http11(),
            Extension::StatusRequest,
            firefox_delegated_credentials(),
            firefox_key_share(),
            firefox_versions(),
            firefox_signature_algorithms(),
            psk_modes(),
            Extension::RecordSizeLimit(FIREFOX_RECORD_SIZE_LIMIT),
            Extension::Padding(PaddingStyle::Boring),
        ],
    )
}

pub fn firefox_120() -> ClientHelloSpec {
    ClientHelloSpec::new(
        FIREFOX_CIPHER_SUITES.to_vec(),
        vec![
            Extension::ServerName,
            Extension::ExtendedMasterSecret,
            renegotiation(),
            firefox_curves(),
            points(),
            Extension::alpn_h2_http11(),
            Extension::StatusRequest,
            firefox_delegated_credentials(),
            firefox_key_share(),
            firefox_versions(),
            firefox_signature_algorithms(),
            Extension::RecordSizeLimit(FIREFOX_RECORD_SIZE_LIMIT),
            Extension::EchGrease,
        ],
    )
}

pub fn firefox_123() -> ClientHelloSpec {
    ClientHelloSpec::new(
        FIREFOX_CIPHER_SUITES.to_vec(),
        vec![
            Extension::ServerName,
            Extension::ExtendedMasterSecret,
            renegotiation(),
            firefox_curves(),
            points(),
            Extension::SessionTicket,
            Extension::alpn_h2_http11(),
            Extension::StatusRequest,
            firefox_delegated_credentials(),
            firefox_key_share(),
            firefox_versions(),
            firefox_signature_algorithms(),
            psk_modes(),
            Extension::RecordSizeLimit(FIREFOX_RECORD_SIZE_LIMIT),
            Extension::EchGrease,
        ],
    )
}

/// OkHttp 4 on Android (Conscrypt).
pub fn okhttp_android() -> ClientHelloSpec {
    let mut signature_algorithms = CHROME_SIGNATURE_ALGORITHMS.to_vec();
    signature_algorithms.push(sig::PKCS1_WITH_SHA1);

    ClientHelloSpec::new(
        OKHTTP_CIPHER_SUITES.to_vec(),
        vec![
            Extension::ServerName,
            Extension::ExtendedMasterSecret,
            renegotiation(),
            Extension::SupportedCurves(vec![curve::X25519, curve::P256, curve::P384]),
            points(),
            Extension::SessionTicket,
            Extension::alpn_h2_http11(),
            Extension::StatusRequest,
            Extension::SignatureAlgorithms(signature_algorithms),
            Extension::KeyShare(vec![KeyShare::new(curve::X25519)]),
            psk_modes(),
            firefox_versions(),
            Extension::Padding(PaddingStyle::Boring),
        ],
    )
}

/// CFNetwork on iOS, as used by native apps.
pub fn cfnetwork_ios() -> ClientHelloSpec {
    ClientHelloSpec::new(
        CFNETWORK_CIPHER_SUITES.to_vec(),
        vec![
            Extension::Grease,
            Extension::ServerName,
            Extension::ExtendedMasterSecret,
            renegotiation(),
            Extension::SupportedCurves(vec![
                GREASE_PLACEHOLDER,
                curve::X25519,
                curve::P256,
                curve::P384,
                curve::P521,
            ]),
            points(),
            Extension::alpn_h2_http11(),
            Extension::StatusRequest,
            Extension::SignatureAlgorithms(CFNETWORK_SIGNATURE_ALGORITHMS.to_vec()),
            Extension::Sct,
            chrome_key_share(),
            psk_modes(),
            Extension::SupportedVersions(vec![
                GREASE_PLACEHOLDER,
                version::TLS13,
                version::TLS12,
                version::TLS11,
                version::TLS10,
            ]),
            Extension::CompressCertificate(vec![CertCompressionAlgo::Zlib]),
            Extension::Grease,
            Extension::Padding(PaddingStyle::Boring),
        ],
    )
}

/// Chromium-style hello pinned for Cloudflare-fronted targets.
pub fn cloudflare_custom() -> ClientHelloSpec {
    ClientHelloSpec::new(
        CHROME_CIPHER_SUITES.to_vec(),
        vec![
            Extension::Grease,
            Extension::ServerName,
            Extension::ExtendedMasterSecret,
            renegotiation(),
            Extension::SupportedCurves(CHROME_CURVES.to_vec()),
            points(),
            Extension::SessionTicket,
            Extension::alpn_h2_http11(),
            Extension::StatusRequest,
            Extension::SignatureAlgorithms(CHROME_SIGNATURE_ALGORITHMS.to_vec()),
            Extension::Sct,
            chrome_key_share(),
            psk_modes(),
            chrome_versions(),
            brotli(),
            Extension::alps_h2(),
            Extension::Grease,
            Extension::Padding(PaddingStyle::Boring),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::extension::ids;

    #[test]
    fn test_chrome_grease_bookends() {
        for spec in [chrome_117(), chrome_120(), chrome_117_psk(), chrome_120_psk()] {
            assert_eq!(spec.cipher_suites[0], GREASE_PLACEHOLDER);
            assert!(spec.extensions[0].is_grease());
            assert_eq!(spec.extensions.iter().filter(|e| e.is_grease()).count(), 2);
        }
    }

    #[test]
    fn test_psk_is_last() {
        assert_eq!(chrome_117_psk().extensions.last(), Some(&Extension::PreSharedKey));
        assert_eq!(chrome_120_psk().extensions.last(), Some(&Extension::PreSharedKey));
        assert_eq!(
            chrome_117_psk().extensions.len(),
            chrome_117().extensions.len() + 1
        );
    }

    #[test]
    fn test_firefox_has_no_grease() {
        for spec in [firefox_117(), firefox_120(), firefox_123()] {
            assert!(spec.cipher_suites.iter().all(|c| *c != GREASE_PLACEHOLDER));
            assert!(!spec.extensions.iter().any(Extension::is_grease));
            assert_eq!(
                spec.extension(ids::RECORD_SIZE_LIMIT),
                Some(&Extension::RecordSizeLimit(0x4001))
            );
        }
        // Firefox 120 dropped session tickets, 123 brought them back.
        assert!(firefox_120().extension(ids::SESSION_TICKET).is_none());
        assert!(firefox_123().extension(ids::SESSION_TICKET).is_some());
    }
}
