//! TLS extension descriptors.
//!
//! Every extension a ClientHello can carry is one variant of [`Extension`],
//! holding exactly the parameters that shape its bytes on the wire. The
//! external TLS engine serializes these verbatim, in the order given.

/// GREASE placeholder value (RFC 8701). The TLS engine swaps in a random
/// GREASE value of the same class at handshake time.
pub const GREASE_PLACEHOLDER: u16 = 0x0a0a;

/// Extension type codes.
pub mod ids {
    pub const SERVER_NAME: u16 = 0;
    pub const STATUS_REQUEST: u16 = 5;
    pub const SUPPORTED_CURVES: u16 = 10;
    pub const SUPPORTED_POINTS: u16 = 11;
    pub const SIGNATURE_ALGORITHMS: u16 = 13;
    pub const ALPN: u16 = 16;
    pub const SCT: u16 = 18;
    pub const PADDING: u16 = 21;
    pub const EXTENDED_MASTER_SECRET: u16 = 23;
    pub const COMPRESS_CERTIFICATE: u16 = 27;
    pub const RECORD_SIZE_LIMIT: u16 = 28;
    pub const DELEGATED_CREDENTIALS: u16 = 34;
    pub const SESSION_TICKET: u16 = 35;
    pub const PRE_SHARED_KEY: u16 = 41;
    pub const EARLY_DATA: u16 = 42;
    pub const SUPPORTED_VERSIONS: u16 = 43;
    pub const COOKIE: u16 = 44;
    pub const PSK_MODES: u16 = 45;
    pub const KEY_SHARE: u16 = 51;
    pub const NEXT_PROTO_NEG: u16 = 13172;
    pub const APPLICATION_SETTINGS: u16 = 17513;
    pub const ENCRYPTED_CLIENT_HELLO: u16 = 65037;
    pub const RENEGOTIATION_INFO: u16 = 65281;
}

/// PSK key exchange mode `psk_dhe_ke`.
pub const PSK_MODE_DHE: u8 = 1;

/// EC point format `uncompressed`.
pub const POINT_FORMAT_UNCOMPRESSED: u8 = 0;

/// Compression method `null`.
pub const COMPRESSION_NONE: u8 = 0;

/// Record size limit Firefox advertises.
pub const FIREFOX_RECORD_SIZE_LIMIT: u16 = 0x4001;

/// Certificate compression algorithms (RFC 8879).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CertCompressionAlgo {
    Zlib = 1,
    Brotli = 2,
    Zstd = 3,
}

impl CertCompressionAlgo {
    /// Wire code.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// One entry of the key_share extension.
///
/// A non-empty `data` is only used as a placeholder for GREASE shares; real
/// key material is generated by the TLS engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyShare {
    pub group: u16,
    pub data: Vec<u8>,
}

impl KeyShare {
    /// Key share for a real group; key material is left to the TLS engine.
    pub fn new(group: u16) -> Self {
        Self {
            group,
            data: Vec::new(),
        }
    }

    /// GREASE key share carrying the single zero placeholder byte.
    pub fn grease() -> Self {
        Self {
            group: GREASE_PLACEHOLDER,
            data: vec![0],
        }
    }
}

/// Padding length policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaddingStyle {
    /// BoringSSL: pad ClientHellos between 256 and 511 bytes up to 512.
    Boring,
}

impl PaddingStyle {
    /// Padding extension payload length for an unpadded ClientHello of `hello_len` bytes.
    /// `None` means the extension is omitted.
    pub fn padding_len(self, hello_len: usize) -> Option<usize> {
        match self {
            PaddingStyle::Boring => {
                if hello_len > 0xff && hello_len < 0x200 {
                    // 4 bytes go to the extension header itself.
                    let padding = 0x200 - hello_len;
                    Some(padding.saturating_sub(4).max(1))
                } else {
                    None
                }
            }
        }
    }
}

/// Renegotiation support advertised in renegotiation_info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Renegotiation {
    Never,
    OnceAsClient,
    FreelyAsClient,
}

/// A TLS extension with its typed payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// GREASE extension (empty payload, random GREASE id at send time).
    Grease,
    ServerName,
    StatusRequest,
    SupportedCurves(Vec<u16>),
    SupportedPoints(Vec<u8>),
    SignatureAlgorithms(Vec<u16>),
    Alpn(Vec<String>),
    Sct,
    Padding(PaddingStyle),
    ExtendedMasterSecret,
    CompressCertificate(Vec<CertCompressionAlgo>),
    RecordSizeLimit(u16),
    DelegatedCredentials(Vec<u16>),
    SessionTicket,
    PreSharedKey,
    SupportedVersions(Vec<u16>),
    Cookie,
    PskKeyExchangeModes(Vec<u8>),
    KeyShare(Vec<KeyShare>),
    NextProtoNeg,
    ApplicationSettings(Vec<String>),
    /// GREASE encrypted_client_hello as sent by BoringSSL.
    EchGrease,
    RenegotiationInfo(Renegotiation),
    /// Extension carried as raw bytes (early_data).
    Generic { id: u16, data: Vec<u8> },
}

impl Extension {
    /// Extension type code. GREASE reports the placeholder value.
    pub fn id(&self) -> u16 {
        match self {
            Extension::Grease => GREASE_PLACEHOLDER,
            Extension::ServerName => ids::SERVER_NAME,
            Extension::StatusRequest => ids::STATUS_REQUEST,
            Extension::SupportedCurves(_) => ids::SUPPORTED_CURVES,
            Extension::SupportedPoints(_) => ids::SUPPORTED_POINTS,
            Extension::SignatureAlgorithms(_) => ids::SIGNATURE_ALGORITHMS,
            Extension::Alpn(_) => ids::ALPN,
            Extension::Sct => ids::SCT,
            Extension::Padding(_) => ids::PADDING,
            Extension::ExtendedMasterSecret => ids::EXTENDED_MASTER_SECRET,
            Extension::CompressCertificate(_) => ids::COMPRESS_CERTIFICATE,
            Extension::RecordSizeLimit(_) => ids::RECORD_SIZE_LIMIT,
            Extension::DelegatedCredentials(_) => ids::DELEGATED_CREDENTIALS,
            Extension::SessionTicket => ids::SESSION_TICKET,
            Extension::PreSharedKey => ids::PRE_SHARED_KEY,
            Extension::SupportedVersions(_) => ids::SUPPORTED_VERSIONS,
            Extension::Cookie => ids::COOKIE,
            Extension::PskKeyExchangeModes(_) => ids::PSK_MODES,
            Extension::KeyShare(_) => ids::KEY_SHARE,
            Extension::NextProtoNeg => ids::NEXT_PROTO_NEG,
            Extension::ApplicationSettings(_) => ids::APPLICATION_SETTINGS,
            Extension::EchGrease => ids::ENCRYPTED_CLIENT_HELLO,
            Extension::RenegotiationInfo(_) => ids::RENEGOTIATION_INFO,
            Extension::Generic { id, .. } => *id,
        }
    }

    pub fn is_grease(&self) -> bool {
        matches!(self, Extension::Grease)
    }

    /// ALPN extension advertising `h2` then `http/1.1`.
    pub fn alpn_h2_http11() -> Self {
        Extension::Alpn(vec!["h2".to_string(), "http/1.1".to_string()])
    }

    /// ALPS extension advertising `h2`.
    pub fn alps_h2() -> Self {
        Extension::ApplicationSettings(vec!["h2".to_string()])
    }
}

/// Check if a u16 value is a GREASE value (RFC 8701).
///
/// GREASE values follow the pattern 0x?A?A where both bytes are identical.
pub fn is_grease_u16(val: u16) -> bool {
    let hi = (val >> 8) as u8;
    let lo = val as u8;
    hi == lo && (hi & 0x0f) == 0x0a
}
